//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path in this order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/arch-verdict.toml` or `.arch-verdict.toml`
//! 3. `$ARCH_VERDICT_CONFIG_DIR/config.toml` or `~/.arch-verdict/config.toml`
//! 4. No config found → defaults

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Directory relative paths in the config are resolved against.
    ///
    /// Global configs live outside the project, so their relative paths
    /// point into `project_dir` instead.
    #[must_use]
    pub fn base_dir(&self, project_dir: &Path) -> PathBuf {
        match self {
            Self::Explicit(p) | Self::Project(p) => p
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map_or_else(|| project_dir.to_path_buf(), Path::to_path_buf),
            Self::Global(_) | Self::Default => project_dir.to_path_buf(),
        }
    }
}

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["arch-verdict.toml", ".arch-verdict.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Takes `global_dir` as a parameter so tests need no env vars.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(candidate) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.exists())
    {
        tracing::debug!("Found project config: {}", candidate.display());
        return ConfigSource::Project(candidate);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(candidate) if candidate.exists() => {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        }
        _ => ConfigSource::Default,
    }
}

/// Returns the global config directory path.
///
/// Resolution: `$ARCH_VERDICT_CONFIG_DIR` > `~/.arch-verdict/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ARCH_VERDICT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".arch-verdict"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_over_project_config() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "").unwrap();
        fs::write(tmp.path().join("arch-verdict.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(&explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn explicit_path_is_not_checked() {
        let result = resolve_inner(
            Path::new("/tmp"),
            Some(Path::new("/nonexistent.toml")),
            None,
        );
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".arch-verdict.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join(".arch-verdict.toml"))
        );

        fs::write(tmp.path().join("arch-verdict.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join("arch-verdict.toml"))
        );
    }

    #[test]
    fn global_used_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(
            result,
            ConfigSource::Global(global.path().join("config.toml"))
        );
        assert!(result.is_global());

        fs::write(project.path().join("arch-verdict.toml"), "").unwrap();
        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn empty_global_dir_yields_default() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }

    #[test]
    fn base_dir_follows_config_location() {
        let project = Path::new("/work/shop");
        assert_eq!(
            ConfigSource::Explicit(PathBuf::from("/etc/verdict/rules.toml")).base_dir(project),
            PathBuf::from("/etc/verdict")
        );
        assert_eq!(
            ConfigSource::Explicit(PathBuf::from("rules.toml")).base_dir(project),
            PathBuf::from("/work/shop")
        );
        assert_eq!(
            ConfigSource::Global(PathBuf::from("/home/u/.arch-verdict/config.toml"))
                .base_dir(project),
            PathBuf::from("/work/shop")
        );
    }
}
