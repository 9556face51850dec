//! Evaluation settings shared by every rule set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::priority::{Priority, UnknownPriority};

/// Top-level evaluation configuration.
///
/// Only the keys listed here are read; other tables in the same file
/// (layers, graph) are ignored and belong to the rule crates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Priority at or above which a violated rule fails the run (default: `medium`).
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Keep at most this many violations per rule.
    #[serde(default)]
    pub max_violations: Option<usize>,

    /// Evaluation options.
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, `fail_on` names no priority
    /// or `max_violations` is zero.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.fail_on()?;
        if config.max_violations == Some(0) {
            return Err(ConfigError::Parse {
                message: "max_violations must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    /// Returns the failure threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPriority`] if `fail_on` is not a priority name.
    pub fn fail_on(&self) -> Result<Priority, ConfigError> {
        self.fail_on
            .as_deref()
            .map_or(Ok(Priority::Medium), str::parse::<Priority>)
            .map_err(ConfigError::from)
    }

    /// Checks if a rule is enabled. Unlisted rules are enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the priority override for a rule.
    #[must_use]
    pub fn rule_priority(&self, rule_name: &str) -> Option<Priority> {
        self.rules.get(rule_name).and_then(|c| c.priority)
    }
}

/// Evaluation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Evaluate sub-rules of composite rules in parallel.
    #[serde(default)]
    pub parallel: bool,
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Priority override for this rule.
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(arch_verdict::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(arch_verdict::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// `fail_on` names no known priority.
    #[error(transparent)]
    #[diagnostic(
        code(arch_verdict::config::priority),
        help("use one of: low, medium, high")
    )]
    UnknownPriority(#[from] UnknownPriority),
}
