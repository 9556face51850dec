//! Architecture rule engine.
//!
//! Builds the enabled rules from a [`LayerConfig`] and the shared evaluation
//! [`Config`], then evaluates them against an [`ElementGraph`].

use std::sync::Arc;

use arch_verdict_core::{ArchRule, ArchRuleBox, Config, EvaluationResult, Priority};
use tracing::{debug, info, warn};

use crate::config::{LayerConfig, LayerConfigError, NAMING_RULE, NO_DEPENDENCY_PATTERN};
use crate::graph::ElementGraph;
use crate::layer::LayerResolver;
use crate::rules::{
    DependencyPatternRule, LayeredArchitectureRule, NamingRule, RuleSettings, DEPENDENCY_PATTERN,
    LAYER_DEPENDENCIES, NAMING,
};

/// Name and summary of every rule the engine can build.
pub const AVAILABLE_RULES: &[(&str, &str)] = &[
    (
        LAYER_DEPENDENCIES,
        "Layers may only depend on the layers listed in [dependencies]",
    ),
    (
        DEPENDENCY_PATTERN,
        "Classes must not depend on targets containing a pattern (no-dependency-pattern)",
    ),
    (
        NAMING,
        "Dependencies on matching targets require matching class names (naming-rule)",
    ),
];

/// Evaluates architecture rules against an element graph.
pub struct ArchRuleEngine {
    rules: Vec<ArchRuleBox<ElementGraph>>,
    exclude: Vec<String>,
}

impl ArchRuleEngine {
    /// Create a new engine from config.
    ///
    /// Disabled rules are not built. Priorities come from `[rules.<name>]`,
    /// then from the constraint, then default to medium.
    ///
    /// # Errors
    ///
    /// Returns error if the layer configuration is inconsistent.
    pub fn new(layer_config: &LayerConfig, config: &Config) -> Result<Self, LayerConfigError> {
        layer_config.validate()?;

        let resolver = Arc::new(LayerResolver::new(layer_config));
        let settings = |name: &str, constraint_priority: Option<Priority>| RuleSettings {
            priority: config
                .rule_priority(name)
                .or(constraint_priority)
                .unwrap_or_default(),
            violation_limit: config.max_violations,
        };

        let mut rules: Vec<ArchRuleBox<ElementGraph>> = Vec::new();

        if config.is_rule_enabled(LAYER_DEPENDENCIES) && !layer_config.is_empty() {
            rules.push(Box::new(
                LayeredArchitectureRule::new(
                    layer_config,
                    Arc::clone(&resolver),
                    settings(LAYER_DEPENDENCIES, None),
                )
                .parallel(config.evaluation.parallel),
            ));
        }

        for constraint in &layer_config.constraints {
            let rule: ArchRuleBox<ElementGraph> = match constraint.kind.as_str() {
                NO_DEPENDENCY_PATTERN if config.is_rule_enabled(DEPENDENCY_PATTERN) => {
                    Box::new(DependencyPatternRule::new(
                        constraint,
                        Arc::clone(&resolver),
                        settings(DEPENDENCY_PATTERN, constraint.priority),
                    ))
                }
                NAMING_RULE if config.is_rule_enabled(NAMING) => Box::new(NamingRule::new(
                    constraint,
                    Arc::clone(&resolver),
                    settings(NAMING, constraint.priority),
                )),
                _ => continue,
            };
            rules.push(rule);
        }

        debug!("Built {} rules", rules.len());

        Ok(Self {
            rules,
            exclude: layer_config.graph.exclude.clone(),
        })
    }

    /// The rules that will be evaluated.
    #[must_use]
    pub fn rules(&self) -> &[ArchRuleBox<ElementGraph>] {
        &self.rules
    }

    /// Evaluates every rule, in build order.
    ///
    /// # Errors
    ///
    /// Returns error if an exclude pattern is invalid.
    pub fn evaluate(
        &self,
        graph: &ElementGraph,
    ) -> Result<Vec<EvaluationResult>, crate::GraphError> {
        self.evaluate_only(graph, &[])
    }

    /// Evaluates the rules named in `only`; an empty list selects all rules.
    ///
    /// Names that match no known rule are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns error if an exclude pattern is invalid.
    pub fn evaluate_only(
        &self,
        graph: &ElementGraph,
        only: &[String],
    ) -> Result<Vec<EvaluationResult>, crate::GraphError> {
        for name in only {
            if !AVAILABLE_RULES.iter().any(|(known, _)| known == name) {
                warn!("Unknown rule '{name}' ignored");
            }
        }

        let graph = graph.without_excluded(&self.exclude)?;
        let results: Vec<EvaluationResult> = self
            .rules
            .iter()
            .filter(|rule| only.is_empty() || only.iter().any(|n| n == rule.name()))
            .map(|rule| {
                debug!("Evaluating rule {}", rule.name());
                rule.evaluate(&graph)
            })
            .collect();

        info!(
            "Evaluated {} rules against {} dependencies, {} violated",
            results.len(),
            graph.dependencies.len(),
            results.iter().filter(|r| r.has_violation()).count()
        );
        Ok(results)
    }
}
