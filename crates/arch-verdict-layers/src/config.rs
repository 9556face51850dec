//! TOML configuration for layer rules.
//!
//! Reads the `[graph]`, `[[layers]]`, `[dependencies]` and `[[constraints]]`
//! sections. Evaluation settings in the same file are read by
//! [`arch_verdict_core::Config`].

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use arch_verdict_core::Priority;

/// Constraint type forbidding dependencies on matching targets.
pub const NO_DEPENDENCY_PATTERN: &str = "no-dependency-pattern";

/// Constraint type tying dependencies to class names.
pub const NAMING_RULE: &str = "naming-rule";

/// Layer rule configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerConfig {
    /// Where the element graph lives and what to leave out of it.
    #[serde(default)]
    pub graph: GraphSection,

    /// Layer definitions.
    #[serde(default)]
    pub layers: Vec<LayerDef>,

    /// Dependency rules: layer name -> layers it may depend on.
    #[serde(default)]
    pub dependencies: HashMap<String, Vec<String>>,

    /// Custom constraints.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

/// The `[graph]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphSection {
    /// Path to the element graph JSON, relative to the config file's project.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Glob patterns over element names to leave out.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// A named architecture layer.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDef {
    /// Layer name (e.g., `"domain"`).
    pub name: String,
    /// Package prefixes belonging to this layer.
    pub packages: Vec<String>,
}

/// A custom constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Constraint {
    /// `"no-dependency-pattern"` or `"naming-rule"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Target substring that must not be depended upon (`no-dependency-pattern`).
    #[serde(default)]
    pub pattern: String,

    /// Layers whose classes this constraint applies to.
    #[serde(default)]
    pub in_layers: Vec<String>,

    /// Priority of violations; the rule default applies when absent.
    #[serde(default)]
    pub priority: Option<Priority>,

    /// Replaces the generated rule description.
    #[serde(default)]
    pub message: String,

    /// Dependency target must contain this substring to trigger (`naming-rule`).
    #[serde(default)]
    pub target_matches: String,

    /// Depending class name must contain this substring (`naming-rule`).
    #[serde(default)]
    pub name_must_match: String,

    /// Depending class name must not contain this substring (`naming-rule`).
    #[serde(default)]
    pub name_must_not_match: String,
}

/// Errors when loading layer configuration.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LayerConfigError {
    /// Failed to read config file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(arch_verdict::layers::io))]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML.
    #[error("invalid config: {message}")]
    #[diagnostic(code(arch_verdict::layers::parse))]
    Parse {
        /// Parse error detail.
        message: String,
    },
    /// Config is structurally invalid.
    #[error("config validation: {0}")]
    #[diagnostic(code(arch_verdict::layers::validation))]
    Validation(String),
}

impl LayerConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, LayerConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| LayerConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, LayerConfigError> {
        toml::from_str(content).map_err(|e| LayerConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Returns `true` if no layers are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Allowed target layers of `layer`.
    #[must_use]
    pub fn allowed_dependencies(&self, layer: &str) -> &[String] {
        self.dependencies
            .get(layer)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Validate config consistency.
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found.
    pub fn validate(&self) -> Result<(), LayerConfigError> {
        let mut layer_names: HashSet<&str> = HashSet::new();
        for l in &self.layers {
            if !layer_names.insert(l.name.as_str()) {
                return Err(LayerConfigError::Validation(format!(
                    "layer '{}' is defined twice",
                    l.name
                )));
            }
        }

        let mut deps: Vec<(&String, &Vec<String>)> = self.dependencies.iter().collect();
        deps.sort_by_key(|(layer, _)| *layer);
        for (layer, allowed) in deps {
            if !layer_names.contains(layer.as_str()) {
                return Err(LayerConfigError::Validation(format!(
                    "dependencies.{layer}: unknown layer"
                )));
            }
            for dep in allowed {
                if !layer_names.contains(dep.as_str()) {
                    return Err(LayerConfigError::Validation(format!(
                        "dependencies.{layer}: unknown dep '{dep}'"
                    )));
                }
            }
            if allowed.contains(layer) {
                return Err(LayerConfigError::Validation(format!(
                    "dependencies.{layer}: self-dependency"
                )));
            }
        }

        for (i, c) in self.constraints.iter().enumerate() {
            match c.kind.as_str() {
                NO_DEPENDENCY_PATTERN if c.pattern.is_empty() => {
                    return Err(LayerConfigError::Validation(format!(
                        "constraints[{i}]: {NO_DEPENDENCY_PATTERN} needs a pattern"
                    )));
                }
                NAMING_RULE
                    if c.target_matches.is_empty()
                        || (c.name_must_match.is_empty() && c.name_must_not_match.is_empty()) =>
                {
                    return Err(LayerConfigError::Validation(format!(
                        "constraints[{i}]: {NAMING_RULE} needs target_matches and name_must_match or name_must_not_match"
                    )));
                }
                NO_DEPENDENCY_PATTERN | NAMING_RULE => {}
                other => {
                    return Err(LayerConfigError::Validation(format!(
                        "constraints[{i}]: unknown type '{other}'"
                    )));
                }
            }
            for l in &c.in_layers {
                if !layer_names.contains(l.as_str()) {
                    return Err(LayerConfigError::Validation(format!(
                        "constraints[{i}]: unknown layer '{l}'"
                    )));
                }
            }
        }

        for l in &self.layers {
            if !self.dependencies.contains_key(&l.name) {
                return Err(LayerConfigError::Validation(format!(
                    "layer '{}' has no entry in [dependencies]",
                    l.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[[layers]]
name = "domain"
packages = ["com.example.domain"]

[dependencies]
domain = []
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        assert_eq!(config.layers.len(), 1);
        assert_eq!(config.layers[0].name, "domain");
        assert!(config.graph.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
fail_on = "high"

[graph]
path = "build/arch-graph.json"
exclude = ["com.example.generated.*"]

[[layers]]
name = "domain"
packages = ["com.example.domain"]

[[layers]]
name = "app"
packages = ["com.example.app"]

[dependencies]
domain = []
app = ["domain"]

[[constraints]]
type = "no-dependency-pattern"
pattern = "java.sql"
in_layers = ["domain"]
priority = "low"
message = "No JDBC in domain"

[[constraints]]
type = "naming-rule"
target_matches = "RepositoryImpl"
name_must_match = "Service"
in_layers = ["app"]
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        assert_eq!(
            config.graph.path.as_deref(),
            Some(Path::new("build/arch-graph.json"))
        );
        assert_eq!(config.graph.exclude, vec!["com.example.generated.*"]);
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.constraints.len(), 2);
        assert_eq!(config.constraints[0].priority, Some(Priority::Low));
        assert_eq!(config.allowed_dependencies("app"), ["domain".to_string()]);
        assert!(config.allowed_dependencies("unknown").is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_catches_unknown_layer_in_deps() {
        let toml = r#"
[[layers]]
name = "domain"
packages = ["com.example.domain"]

[dependencies]
domain = ["nonexistent"]
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_missing_dep_entry() {
        let toml = r#"
[[layers]]
name = "domain"
packages = ["com.example.domain"]

[[layers]]
name = "app"
packages = ["com.example.app"]

[dependencies]
domain = []
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("app"));
    }

    #[test]
    fn validate_catches_self_dependency() {
        let toml = r#"
[[layers]]
name = "domain"
packages = ["com.example.domain"]

[dependencies]
domain = ["domain"]
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_duplicate_layer() {
        let toml = r#"
[[layers]]
name = "domain"
packages = ["a"]

[[layers]]
name = "domain"
packages = ["b"]

[dependencies]
domain = []
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn validate_catches_unknown_constraint_type() {
        let toml = r#"
[[layers]]
name = "domain"
packages = ["a"]

[dependencies]
domain = []

[[constraints]]
type = "no-import-pattern"
pattern = "java.sql"
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown type 'no-import-pattern'"));
    }

    #[test]
    fn validate_catches_incomplete_naming_rule() {
        let toml = r#"
[[layers]]
name = "app"
packages = ["a"]

[dependencies]
app = []

[[constraints]]
type = "naming-rule"
target_matches = "RepositoryImpl"
in_layers = ["app"]
"#;
        let config = LayerConfig::parse(toml).expect("parse failed");
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_error_is_reported() {
        let err = LayerConfig::parse("[[layers]]\nname = 1").unwrap_err();
        assert!(matches!(err, LayerConfigError::Parse { .. }));
    }
}
