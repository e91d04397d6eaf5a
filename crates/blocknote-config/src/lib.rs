use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Entries kept for undo when the config does not say otherwise
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Largest accepted UTC offset, in minutes either way
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60 - 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalidError { config_path: PathBuf, reason: String },
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub notes_path: PathBuf,

    /// Undo depth per open note
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Zone for block timestamps, in minutes east of UTC; the machine's
    /// local zone when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl Config {
    pub fn new(notes_path: impl Into<PathBuf>) -> Self {
        Self {
            notes_path: notes_path.into(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            utc_offset_minutes: None,
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if let Err(reason) = config.validate() {
            return Err(ConfigError::ConfigInvalidError {
                config_path: config_path.to_path_buf(),
                reason,
            });
        }

        // Expand shell variables and tilde in the loaded notes path
        config.notes_path = Self::expand_path(&config.notes_path).unwrap_or(config.notes_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blocknote");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn validate(&self) -> Result<(), String> {
        if self.history_limit == 0 {
            return Err("history_limit must be at least 1".to_string());
        }
        if let Some(minutes) = self.utc_offset_minutes
            && minutes.abs() > MAX_UTC_OFFSET_MINUTES
        {
            return Err(format!("utc_offset_minutes {minutes} is more than a day"));
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let config_file = dir.path().join("config.toml");
        std::fs::write(&config_file, content).unwrap();
        config_file
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/blocknote/config.toml"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "notes_path = \"/tmp/notes\"\n");

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config, Config::new("/tmp/notes"));
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.utc_offset_minutes, None);
    }

    #[test]
    fn test_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(
            &temp_dir,
            r#"
notes_path = "/srv/notes"
history_limit = 10
utc_offset_minutes = -300
"#,
        );

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.history_limit, 10);
        assert_eq!(config.utc_offset_minutes, Some(-300));
    }

    #[test]
    fn test_zero_history_limit_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "notes_path = \"/n\"\nhistory_limit = 0\n");

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigInvalidError { .. })));
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file =
            write_config(&temp_dir, "notes_path = \"/n\"\nutc_offset_minutes = 1440\n");

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(err.to_string().contains("utc_offset_minutes"));
    }

    #[test]
    fn test_malformed_config_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "notes_path = [oops");

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_unset_offset_is_not_written() {
        let toml_str = toml::to_string(&Config::new("/tmp/test-notes")).unwrap();

        assert!(!toml_str.contains("utc_offset_minutes"));
        assert!(toml_str.contains("history_limit = 50"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("BLOCKNOTE_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$BLOCKNOTE_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("BLOCKNOTE_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        for raw in ["/absolute/path", "relative/path"] {
            let path = PathBuf::from(raw);
            assert_eq!(Config::expand_path(&path).unwrap(), path);
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config::new("/tmp/test-notes");
        test_config.utc_offset_minutes = Some(60);

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_notes_path_env_var_expanded_on_load() {
        unsafe {
            env::set_var("BLOCKNOTE_NOTES_ROOT", "/custom/notes");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file =
            write_config(&temp_dir, "notes_path = \"$BLOCKNOTE_NOTES_ROOT/my-notes\"\n");

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.notes_path, PathBuf::from("/custom/notes/my-notes"));
        unsafe {
            env::remove_var("BLOCKNOTE_NOTES_ROOT");
        }
    }
}
