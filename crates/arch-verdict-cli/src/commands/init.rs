//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# arch-verdict configuration

# Violated rules at or above this priority make `arch-verdict check` fail.
fail_on = "medium"

# Keep at most this many violations per rule in reports.
# max_violations = 100

[evaluation]
# Evaluate per-layer rules in parallel.
parallel = false

# Per-rule settings: enabled flag and priority override.
[rules.layer-dependencies]
enabled = true
priority = "high"

# [rules.naming]
# enabled = false

[graph]
# Element graph exported by your build (JSON).
path = "build/arch-graph.json"
# Element name patterns to leave out.
exclude = ["com.example.generated.*"]

# Layer definitions
# Each layer has a name and a list of package prefixes.
# Elements whose name matches a prefix belong to that layer.

[[layers]]
name = "domain"
packages = ["com.example.domain"]

[[layers]]
name = "application"
packages = ["com.example.app"]

[[layers]]
name = "infrastructure"
packages = ["com.example.infra"]

# Which layers may depend on which.
# A layer may always depend on itself.

[dependencies]
domain = []
application = ["domain"]
infrastructure = ["domain", "application"]

# Custom constraints (optional)

# [[constraints]]
# type = "no-dependency-pattern"
# pattern = "java.sql"
# in_layers = ["domain", "application"]
# priority = "low"
# message = "Avoid direct JDBC usage outside infrastructure"

# [[constraints]]
# type = "naming-rule"
# target_matches = "RepositoryImpl"
# name_must_match = "Service"
# in_layers = ["application"]
"#;

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = write_config(dir, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit [[layers]] and [dependencies] for your project");
    println!("  2. Export the element graph to the [graph] path");
    println!("  3. Run: arch-verdict check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join("arch-verdict.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_verdict_core::{Config, Priority};
    use arch_verdict_layers::LayerConfig;
    use tempfile::TempDir;

    #[test]
    fn template_is_a_valid_config() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.fail_on().unwrap(), Priority::Medium);
        assert_eq!(
            config.rule_priority("layer-dependencies"),
            Some(Priority::High)
        );

        let layers = LayerConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(layers.layers.len(), 3);
        layers.validate().unwrap();
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("arch-verdict.toml"), "# mine").unwrap();

        let err = write_config(tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("arch-verdict.toml")).unwrap(),
            "# mine"
        );

        let path = write_config(tmp.path(), true).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("[[layers]]"));
    }
}
