//! Worker registry model.

use serde::{Deserialize, Serialize};

/// A worker known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Stable worker identifier, the key schedules and outcomes use.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Identifiers presence logs use for this worker (agent emails, vendor ids).
    #[serde(default)]
    pub presence_identifiers: Vec<String>,
}

impl Worker {
    /// Returns true if `identifier` names this worker in presence data.
    ///
    /// Comparison ignores surrounding whitespace and ASCII case.
    pub fn answers_to(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        self.presence_identifiers
            .iter()
            .any(|known| known.trim().eq_ignore_ascii_case(identifier))
    }
}
