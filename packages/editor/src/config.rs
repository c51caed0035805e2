//! Per-session tuning, read from the `session` section of the project config

use crate::history::DEFAULT_HISTORY_DEPTH;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Quiet period after the last edit before an autosave commit
    pub autosave_debounce_ms: u64,

    /// Undo levels kept per document
    pub history_depth: usize,

    /// Refuse an explicit save while the publish gate reports hard issues
    pub gate_on_save: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            history_depth: DEFAULT_HISTORY_DEPTH,
            gate_on_save: true,
        }
    }
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{ "historyDepth": 3 }"#).unwrap();
        assert_eq!(config.history_depth, 3);
        assert_eq!(config.debounce(), Duration::from_millis(800));
        assert!(config.gate_on_save);
    }
}
