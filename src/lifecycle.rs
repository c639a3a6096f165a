// Copyright 2025 Cowboy AI, LLC.

//! Scope lifecycle state machine
//!
//! A scope moves `Unentered → Active → Exited`, once. Transitions are
//! checked against the table below and recorded with a timestamp so a
//! finished scope can report what it went through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::{CatError, CatResult};

/// Trait for types that can be used as states in a state machine
pub trait State: Debug + Clone + PartialEq + Eq + Send + Sync {
    /// Get the name of this state for logging/debugging
    fn name(&self) -> &'static str;

    /// Check if this is a terminal state
    fn is_terminal(&self) -> bool {
        false
    }

    /// Check if a transition to the target state is valid
    fn can_transition_to(&self, target: &Self) -> bool;
}

/// Lifecycle states of a categorical scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeState {
    /// Constructed, integer widths snapshotted, nothing categorized yet
    Unentered,
    /// Datasets categorized and unified; overlay operations available
    Active,
    /// Overlay gone, integers restored if configured (terminal)
    Exited,
}

impl State for ScopeState {
    fn name(&self) -> &'static str {
        match self {
            ScopeState::Unentered => "Unentered",
            ScopeState::Active => "Active",
            ScopeState::Exited => "Exited",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, ScopeState::Exited)
    }

    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (ScopeState::Unentered, ScopeState::Active) | (ScopeState::Active, ScopeState::Exited)
        )
    }
}

/// Record of a state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<S> {
    /// The state before the transition
    pub from: S,
    /// The state after the transition
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// A state plus its transition history
#[derive(Debug, Clone)]
pub struct Lifecycle<S: State> {
    current: S,
    history: Vec<StateTransition<S>>,
}

impl<S: State> Lifecycle<S> {
    /// Start in `initial`
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            history: Vec::new(),
        }
    }

    /// Current state
    pub fn current(&self) -> &S {
        &self.current
    }

    /// Fail unless a transition to `target` is allowed now
    pub fn check(&self, target: &S) -> CatResult<()> {
        if self.current.is_terminal() || !self.current.can_transition_to(target) {
            return Err(CatError::InvalidStateTransition {
                from: self.current.name().to_string(),
                to: target.name().to_string(),
            });
        }
        Ok(())
    }

    /// Move to `target`
    pub fn transition_to(&mut self, target: S) -> CatResult<&StateTransition<S>> {
        self.check(&target)?;
        let from = std::mem::replace(&mut self.current, target.clone());
        self.history.push(StateTransition {
            from,
            to: target,
            timestamp: Utc::now(),
        });
        Ok(&self.history[self.history.len() - 1])
    }

    /// Transitions so far
    pub fn history(&self) -> &[StateTransition<S>] {
        &self.history
    }
}
