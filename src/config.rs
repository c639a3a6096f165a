// Copyright 2025 Cowboy AI, LLC.

//! Scope configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CatResult;

/// What unification does when same-named columns hold different value kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MixedDomainPolicy {
    /// Fail with `DomainTypeMismatch` before touching any dataset
    #[default]
    Reject,
    /// Stringify every category of the participating columns, then unify
    CoerceToString,
}

/// Behaviour of a categorical scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScopeConfig {
    /// Restore integer columns to their original width at exit
    pub cast_back_integers: bool,
    /// Reset every dataset's row index to `0..n` at entry (never undone)
    pub reset_index: bool,
    /// Policy for unifying domains of different value kinds
    pub mixed_domain_policy: MixedDomainPolicy,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            cast_back_integers: true,
            reset_index: true,
            mixed_domain_policy: MixedDomainPolicy::Reject,
        }
    }
}

impl ScopeConfig {
    /// Load from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> CatResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set `cast_back_integers`
    pub fn with_cast_back_integers(mut self, enabled: bool) -> Self {
        self.cast_back_integers = enabled;
        self
    }

    /// Set `reset_index`
    pub fn with_reset_index(mut self, enabled: bool) -> Self {
        self.reset_index = enabled;
        self
    }

    /// Set the mixed-domain policy
    pub fn with_mixed_domain_policy(mut self, policy: MixedDomainPolicy) -> Self {
        self.mixed_domain_policy = policy;
        self
    }
}
