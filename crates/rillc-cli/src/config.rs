//! Configuration for the `rill` CLI.
//!
//! Loads resource bounds (max loop iterations, max call-stack depth) and
//! REPL display options from an optional TOML file, overriding the
//! evaluator's own defaults from `rillc_eval::EvalConfig::default()`.

use dirs::{config_dir, home_dir};
use rillc_eval::EvalConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "rill.toml";

/// Application configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Global verbose setting.
    #[serde(default)]
    pub verbose: bool,

    /// Maximum iterations a single loop may run before erroring.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Maximum call-stack depth before erroring with a stack overflow.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,

    /// REPL-specific display options.
    #[serde(default)]
    pub repl: ReplConfig,
}

/// REPL-specific configuration options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplConfig {
    /// Prompt string shown before each input line.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Whether to print the type name alongside each result.
    #[serde(default)]
    pub show_type: bool,
}

fn default_max_iterations() -> usize {
    EvalConfig::default().max_iterations
}

fn default_max_call_depth() -> usize {
    EvalConfig::default().max_call_depth
}

fn default_prompt() -> String {
    "rill> ".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            max_iterations: default_max_iterations(),
            max_call_depth: default_max_call_depth(),
            repl: ReplConfig::default(),
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            show_type: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Searches for configuration in the following order:
    /// 1. Current directory
    /// 2. User's home directory (`~/.config/rill/rill.toml`)
    /// 3. System configuration directory
    ///
    /// Returns the default configuration if no config file is found.
    pub fn load() -> Result<Self> {
        match Self::find_config_file()? {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse configuration: {}", e)))
    }

    /// Save configuration to a specific path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize configuration: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts this configuration into the evaluator's resource bounds.
    pub fn eval_config(&self) -> EvalConfig {
        EvalConfig {
            max_iterations: self.max_iterations,
            max_call_depth: self.max_call_depth,
        }
    }

    fn check_current_dir_config() -> Option<PathBuf> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        path.exists().then_some(path)
    }

    fn check_home_config() -> Option<PathBuf> {
        home_dir()
            .map(|dir| dir.join(".config").join("rill").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    fn check_system_config() -> Option<PathBuf> {
        config_dir()
            .map(|dir| dir.join("rill").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    /// Find the configuration file in standard locations.
    fn find_config_file() -> Result<Option<PathBuf>> {
        Ok(Self::check_current_dir_config()
            .or_else(Self::check_home_config)
            .or_else(Self::check_system_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config() -> Config {
        Config {
            verbose: true,
            max_iterations: 500,
            max_call_depth: 64,
            repl: ReplConfig {
                prompt: ">> ".to_string(),
                show_type: true,
            },
        }
    }

    #[test]
    fn default_config_matches_evaluator_defaults() {
        let config = Config::default();
        assert!(!config.verbose);
        assert_eq!(config.max_iterations, 1_000_000);
        assert_eq!(config.max_call_depth, 1000);
        assert_eq!(config.repl.prompt, "rill> ");
        assert!(!config.repl.show_type);
    }

    #[test]
    fn config_save_and_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let original_config = create_test_config();
        original_config.save_to_path(&config_path).unwrap();

        let loaded_config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn load_from_nonexistent_path_is_an_error() {
        let result = Config::load_from_path(Path::new("/nonexistent/path/rill.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn eval_config_carries_resource_bounds_through() {
        let config = create_test_config();
        let eval_config = config.eval_config();
        assert_eq!(eval_config.max_iterations, 500);
        assert_eq!(eval_config.max_call_depth, 64);
    }
}
