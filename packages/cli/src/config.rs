use pagecraft_editor::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding stored template documents
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// Default tracing filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Treat validation errors as failures in `check`
    #[serde(default)]
    pub strict: bool,

    /// Editing session tuning
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the templates directory
    pub fn get_templates_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.templates_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            log_level: default_log_level(),
            strict: false,
            session: SessionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "templatesDir": "sites",
            "logLevel": "debug",
            "strict": true,
            "session": { "autosaveDebounceMs": 1500, "gateOnSave": false }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.templates_dir, "sites");
        assert_eq!(config.log_level, "debug");
        assert!(config.strict);
        assert_eq!(config.session.autosave_debounce_ms, 1500);
        assert!(!config.session.gate_on_save);
        assert_eq!(config.session.history_depth, 10);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.templates_dir, "templates");
        assert_eq!(config.log_level, "info");
        assert!(!config.strict);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_string_lossy().to_string();

        let missing = Config::load(&cwd).unwrap();
        assert_eq!(missing.templates_dir, "templates");

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "strict": true }"#).unwrap();
        let loaded = Config::load(&cwd).unwrap();
        assert!(loaded.strict);
        assert_eq!(loaded.get_templates_dir(&cwd), dir.path().join("templates"));
    }
}
