//! Tunables for grammar derivation.

use serde::{Deserialize, Serialize};

/// Limits applied by `Grammar::derive_with`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveConfig {
    /// Rewrites allowed before the derivation counts as stalled.
    pub max_steps: usize,
}

fn default_max_steps() -> usize {
    1000
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self { max_steps: default_max_steps() }
    }
}
