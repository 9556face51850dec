//! Rules evaluated against an [`ElementGraph`].
//!
//! Every rule records one event per checked dependency (or element) so that
//! results can be inverted, filtered and dispatched by the core crate.

use std::sync::Arc;

use arch_verdict_core::{
    check_all, ArchCondition, ArchRule, CompositeArchRule, ConditionEvents, CorrespondingObject,
    EvaluationResult, HasDescription, Never, Priority, SimpleConditionEvent,
};
use tracing::debug;

use crate::config::{Constraint, LayerConfig};
use crate::graph::{CodeElement, Dependency, ElementGraph};
use crate::layer::LayerResolver;

/// Name of [`LayeredArchitectureRule`].
pub const LAYER_DEPENDENCIES: &str = "layer-dependencies";

/// Name of [`DependencyPatternRule`].
pub const DEPENDENCY_PATTERN: &str = "dependency-pattern";

/// Name of [`NamingRule`].
pub const NAMING: &str = "naming";

/// Settings applied to every rule the engine builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSettings {
    /// Priority reported with violations.
    pub priority: Priority,
    /// Keep at most this many violations.
    pub violation_limit: Option<usize>,
}

impl RuleSettings {
    fn events(self) -> ConditionEvents {
        self.violation_limit
            .map_or_else(ConditionEvents::new, ConditionEvents::with_violation_limit)
    }
}

fn list(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

/// An empty layer list selects every element.
fn in_layers(resolver: &LayerResolver, layers: &[String], name: &str) -> bool {
    layers.is_empty()
        || resolver
            .resolve(name)
            .is_some_and(|layer| layers.iter().any(|l| l == layer))
}

fn classes_in(layers: &[String]) -> String {
    if layers.is_empty() {
        "classes".to_string()
    } else {
        format!("classes in layers {}", list(layers))
    }
}

// ---------------------------------------------------------------------------
// layer-dependencies
// ---------------------------------------------------------------------------

/// Target must resolve to the own layer, an allowed layer, or no layer.
struct OnlyDependOnLayers {
    layer: String,
    allowed: Vec<String>,
    resolver: Arc<LayerResolver>,
}

impl ArchCondition<Dependency> for OnlyDependOnLayers {
    fn description(&self) -> String {
        if self.allowed.is_empty() {
            "not depend on any other layer".to_string()
        } else {
            format!("only depend on layers {}", list(&self.allowed))
        }
    }

    fn check(&self, dependency: &Dependency, events: &mut ConditionEvents) {
        let satisfied = match self.resolver.resolve(&dependency.target) {
            Some(target) => target == self.layer || self.allowed.iter().any(|a| a == target),
            None => true,
        };
        events.add(SimpleConditionEvent::new(
            CorrespondingObject::new(dependency.clone()),
            satisfied,
            dependency.description(),
        ));
    }
}

/// Checks the outgoing dependencies of one layer.
struct LayerDependencyRule {
    condition: OnlyDependOnLayers,
    settings: RuleSettings,
}

impl HasDescription for LayerDependencyRule {
    fn description(&self) -> String {
        format!(
            "Layer '{}' should {}",
            self.condition.layer,
            self.condition.description()
        )
    }
}

impl ArchRule<ElementGraph> for LayerDependencyRule {
    fn name(&self) -> &str {
        LAYER_DEPENDENCIES
    }

    fn priority(&self) -> Priority {
        self.settings.priority
    }

    fn evaluate(&self, graph: &ElementGraph) -> EvaluationResult {
        let mut events = self.settings.events();
        let layer = self.condition.layer.as_str();
        let outgoing = graph
            .dependencies
            .iter()
            .filter(|d| self.condition.resolver.is_in(&d.origin, layer));
        check_all(&self.condition, outgoing, &mut events);
        debug!("Layer '{layer}': {} dependencies checked", events.len());
        EvaluationResult::from_events(self, &events, self.settings.priority)
    }
}

/// Enforces `[dependencies]`: one sub-rule per layer, merged into one result.
pub struct LayeredArchitectureRule {
    inner: CompositeArchRule<ElementGraph>,
}

impl LayeredArchitectureRule {
    /// Builds the rule from the layer definitions in `config`.
    #[must_use]
    pub fn new(config: &LayerConfig, resolver: Arc<LayerResolver>, settings: RuleSettings) -> Self {
        let mut inner = CompositeArchRule::new(LAYER_DEPENDENCIES, settings.priority)
            .described_as(format!(
                "Layered architecture consisting of layers {}",
                list(resolver.layers())
            ))
            .violation_limit(settings.violation_limit);
        let per_layer = RuleSettings {
            violation_limit: None,
            ..settings
        };
        for layer in resolver.layers() {
            inner = inner.rule(LayerDependencyRule {
                condition: OnlyDependOnLayers {
                    layer: layer.clone(),
                    allowed: config.allowed_dependencies(layer).to_vec(),
                    resolver: Arc::clone(&resolver),
                },
                settings: per_layer,
            });
        }
        Self { inner }
    }

    /// Evaluates the per-layer sub-rules on the rayon thread pool.
    #[must_use]
    pub fn parallel(self, parallel: bool) -> Self {
        Self {
            inner: self.inner.parallel(parallel),
        }
    }
}

impl HasDescription for LayeredArchitectureRule {
    fn description(&self) -> String {
        self.inner.description()
    }
}

impl ArchRule<ElementGraph> for LayeredArchitectureRule {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn priority(&self) -> Priority {
        self.inner.priority()
    }

    fn evaluate(&self, graph: &ElementGraph) -> EvaluationResult {
        self.inner.evaluate(graph)
    }
}

// ---------------------------------------------------------------------------
// dependency-pattern
// ---------------------------------------------------------------------------

struct DependOnTargetsContaining(String);

impl ArchCondition<Dependency> for DependOnTargetsContaining {
    fn description(&self) -> String {
        format!("depend on targets containing '{}'", self.0)
    }

    fn check(&self, dependency: &Dependency, events: &mut ConditionEvents) {
        events.add(SimpleConditionEvent::new(
            CorrespondingObject::new(dependency.clone()),
            dependency.target.contains(&self.0),
            dependency.description(),
        ));
    }
}

/// Forbids dependencies on targets containing a pattern (`no-dependency-pattern`).
pub struct DependencyPatternRule {
    layers: Vec<String>,
    condition: Never<DependOnTargetsContaining>,
    message: String,
    resolver: Arc<LayerResolver>,
    settings: RuleSettings,
}

impl DependencyPatternRule {
    /// Builds the rule from a `no-dependency-pattern` constraint.
    #[must_use]
    pub fn new(constraint: &Constraint, resolver: Arc<LayerResolver>, settings: RuleSettings) -> Self {
        Self {
            layers: constraint.in_layers.clone(),
            condition: Never::new(DependOnTargetsContaining(constraint.pattern.clone())),
            message: constraint.message.clone(),
            resolver,
            settings,
        }
    }
}

impl HasDescription for DependencyPatternRule {
    fn description(&self) -> String {
        if !self.message.is_empty() {
            return self.message.clone();
        }
        format!(
            "{} should {}",
            classes_in(&self.layers),
            ArchCondition::<Dependency>::description(&self.condition)
        )
    }
}

impl ArchRule<ElementGraph> for DependencyPatternRule {
    fn name(&self) -> &str {
        DEPENDENCY_PATTERN
    }

    fn priority(&self) -> Priority {
        self.settings.priority
    }

    fn evaluate(&self, graph: &ElementGraph) -> EvaluationResult {
        let mut events = self.settings.events();
        let relevant = graph
            .dependencies
            .iter()
            .filter(|d| in_layers(&self.resolver, &self.layers, &d.origin));
        check_all(&self.condition, relevant, &mut events);
        debug!("{}: {} dependencies checked", DEPENDENCY_PATTERN, events.len());
        EvaluationResult::from_events(self, &events, self.settings.priority)
    }
}

// ---------------------------------------------------------------------------
// naming
// ---------------------------------------------------------------------------

/// Ties dependencies on matching targets to class names (`naming-rule`).
///
/// One event is recorded per element with at least one matching dependency;
/// its lines list every such dependency.
pub struct NamingRule {
    layers: Vec<String>,
    target_matches: String,
    name_must_match: String,
    name_must_not_match: String,
    message: String,
    resolver: Arc<LayerResolver>,
    settings: RuleSettings,
}

impl NamingRule {
    /// Builds the rule from a `naming-rule` constraint.
    #[must_use]
    pub fn new(constraint: &Constraint, resolver: Arc<LayerResolver>, settings: RuleSettings) -> Self {
        Self {
            layers: constraint.in_layers.clone(),
            target_matches: constraint.target_matches.clone(),
            name_must_match: constraint.name_must_match.clone(),
            name_must_not_match: constraint.name_must_not_match.clone(),
            message: constraint.message.clone(),
            resolver,
            settings,
        }
    }

    /// `None` if the name is acceptable, otherwise why it is not.
    fn name_problem(&self, simple_name: &str) -> Option<String> {
        if !self.name_must_match.is_empty() && !simple_name.contains(&self.name_must_match) {
            return Some(format!("name does not contain '{}'", self.name_must_match));
        }
        if !self.name_must_not_match.is_empty() && simple_name.contains(&self.name_must_not_match)
        {
            return Some(format!("name contains '{}'", self.name_must_not_match));
        }
        None
    }

    fn check_element(&self, element: &CodeElement, graph: &ElementGraph, events: &mut ConditionEvents) {
        let matching: Vec<&Dependency> = graph
            .dependencies_from(&element.name)
            .filter(|d| d.target.contains(&self.target_matches))
            .collect();
        if matching.is_empty() {
            return;
        }

        let problem = self.name_problem(element.simple_name());
        let lines = matching
            .iter()
            .map(|d| match &problem {
                Some(problem) => format!("{}, but its {problem}", d.description()),
                None => d.description(),
            })
            .collect();
        events.add(SimpleConditionEvent::with_objects(
            vec![CorrespondingObject::new(element.clone())],
            problem.is_none(),
            lines,
        ));
    }
}

impl HasDescription for NamingRule {
    fn description(&self) -> String {
        if !self.message.is_empty() {
            return self.message.clone();
        }
        let mut requirement = Vec::new();
        if !self.name_must_match.is_empty() {
            requirement.push(format!("containing '{}'", self.name_must_match));
        }
        if !self.name_must_not_match.is_empty() {
            requirement.push(format!("not containing '{}'", self.name_must_not_match));
        }
        format!(
            "{} that depend on targets containing '{}' should have names {}",
            classes_in(&self.layers),
            self.target_matches,
            requirement.join(" and ")
        )
    }
}

impl ArchRule<ElementGraph> for NamingRule {
    fn name(&self) -> &str {
        NAMING
    }

    fn priority(&self) -> Priority {
        self.settings.priority
    }

    fn evaluate(&self, graph: &ElementGraph) -> EvaluationResult {
        let mut events = self.settings.events();
        for element in &graph.elements {
            if in_layers(&self.resolver, &self.layers, &element.name) {
                self.check_element(element, graph, &mut events);
            }
        }
        debug!("{}: {} elements matched", NAMING, events.len());
        EvaluationResult::from_events(self, &events, self.settings.priority)
    }
}
