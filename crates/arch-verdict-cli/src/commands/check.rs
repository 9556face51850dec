//! Check command implementation.

use anyhow::{bail, Context, Result};
use arch_verdict_core::{Config, EvaluationResult, FailureReport, Priority};
use arch_verdict_layers::{ArchRuleEngine, ElementGraph, LayerConfig};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options of the check command.
pub struct CheckOptions {
    /// Graph path given on the command line.
    pub graph: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
}

/// Runs the check command. Returns `false` if a violated rule reaches `fail_on`.
pub fn run(options: &CheckOptions, source: &ConfigSource) -> Result<bool> {
    let (results, threshold) = evaluate(options, source, Path::new("."))?;

    let reports: Vec<FailureReport> = results
        .iter()
        .map(EvaluationResult::failure_report)
        .collect();
    super::output::print(&reports, options.format)?;

    let failing = count_failing(&results, threshold);
    if failing > 0 {
        tracing::debug!("{failing} rule(s) at or above {threshold} were violated");
    }
    Ok(failing == 0)
}

/// Loads config and graph, then evaluates the selected rules.
fn evaluate(
    options: &CheckOptions,
    source: &ConfigSource,
    project_dir: &Path,
) -> Result<(Vec<EvaluationResult>, Priority)> {
    let Some(config_path) = source.path() else {
        bail!("No arch-verdict.toml found. Run `arch-verdict init` to create one.");
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", config_path.display());
    }

    let config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    let mut layers = LayerConfig::from_file(config_path)
        .with_context(|| format!("Failed to load layers: {}", config_path.display()))?;
    layers.graph.exclude.extend(options.exclude.iter().cloned());

    let graph_path = graph_path(options.graph.as_deref(), &layers, source, project_dir)?;
    let graph = ElementGraph::from_file(&graph_path)
        .with_context(|| format!("Failed to load element graph: {}", graph_path.display()))?;
    tracing::info!(
        "Loaded {} elements and {} dependencies from {}",
        graph.elements.len(),
        graph.dependencies.len(),
        graph_path.display()
    );

    let engine = ArchRuleEngine::new(&layers, &config).context("Config validation failed")?;
    let only = parse_rule_filter(options.rules.as_deref());
    let results = engine
        .evaluate_only(&graph, &only)
        .context("Evaluation failed")?;

    Ok((results, config.fail_on()?))
}

/// The command-line graph wins; a configured path is relative to the config.
fn graph_path(
    explicit: Option<&Path>,
    layers: &LayerConfig,
    source: &ConfigSource,
    project_dir: &Path,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match &layers.graph.path {
        Some(path) if path.is_absolute() => Ok(path.clone()),
        Some(path) => Ok(source.base_dir(project_dir).join(path)),
        None => bail!("No element graph given. Pass GRAPH or set [graph] path in the config."),
    }
}

fn parse_rule_filter(rules: Option<&str>) -> Vec<String> {
    rules
        .map(|filter| {
            filter
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Number of violated results at or above `threshold`.
fn count_failing(results: &[EvaluationResult], threshold: Priority) -> usize {
    results
        .iter()
        .filter(|r| r.has_violation() && r.priority() >= threshold)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
fail_on = "high"

[rules.layer-dependencies]
priority = "high"

[graph]
path = "graph.json"

[[layers]]
name = "domain"
packages = ["a.domain"]

[[layers]]
name = "infra"
packages = ["a.infra"]

[dependencies]
domain = []
infra = ["domain"]

[[constraints]]
type = "no-dependency-pattern"
pattern = "java.sql"
in_layers = ["domain"]
"#;

    const GRAPH: &str = r#"{
        "elements": [{"name": "a.domain.User"}, {"name": "a.infra.Db"}],
        "dependencies": [
            {"origin": "a.domain.User", "target": "a.infra.Db", "kind": "field-type"},
            {"origin": "a.domain.User", "target": "java.sql.Date"},
            {"origin": "a.infra.Db", "target": "a.domain.User"}
        ]
    }"#;

    fn options() -> CheckOptions {
        CheckOptions {
            graph: None,
            format: OutputFormat::Text,
            rules: None,
            exclude: Vec::new(),
        }
    }

    fn project() -> (TempDir, ConfigSource) {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("arch-verdict.toml");
        fs::write(&config, CONFIG).unwrap();
        fs::write(tmp.path().join("graph.json"), GRAPH).unwrap();
        (tmp, ConfigSource::Project(config))
    }

    #[test]
    fn evaluates_configured_graph() {
        let (tmp, source) = project();
        let (results, threshold) = evaluate(&options(), &source, tmp.path()).unwrap();

        assert_eq!(threshold, Priority::High);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(EvaluationResult::has_violation));
        assert_eq!(count_failing(&results, threshold), 1);
        assert_eq!(count_failing(&results, Priority::Low), 2);
    }

    #[test]
    fn rule_filter_and_excludes_apply() {
        let (tmp, source) = project();
        let mut opts = options();
        opts.rules = Some("layer-dependencies, ".to_string());
        opts.exclude = vec!["a.infra.*".to_string()];

        let (results, _) = evaluate(&opts, &source, tmp.path()).unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].has_violation());
    }

    #[test]
    fn explicit_graph_wins_over_config() {
        let (tmp, source) = project();
        let other = tmp.path().join("empty.json");
        fs::write(&other, "{}").unwrap();
        let mut opts = options();
        opts.graph = Some(other);

        let (results, threshold) = evaluate(&opts, &source, tmp.path()).unwrap();
        assert_eq!(count_failing(&results, threshold), 0);
    }

    #[test]
    fn missing_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = evaluate(&options(), &ConfigSource::Default, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("arch-verdict init"));
    }

    #[test]
    fn missing_graph_path_is_an_error() {
        let layers = LayerConfig::default();
        let err = graph_path(None, &layers, &ConfigSource::Default, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("No element graph"));
    }

    #[test]
    fn rule_filter_is_split_and_trimmed() {
        assert_eq!(
            parse_rule_filter(Some("naming , layer-dependencies,,")),
            vec!["naming", "layer-dependencies"]
        );
        assert!(parse_rule_filter(None).is_empty());
    }
}
