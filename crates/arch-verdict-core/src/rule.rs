//! Rule and condition traits.

use rayon::prelude::*;
use tracing::debug;

use crate::events::ConditionEvents;
use crate::priority::Priority;
use crate::result::EvaluationResult;

/// Anything with a human-readable description.
pub trait HasDescription {
    /// Returns the description.
    fn description(&self) -> String;
}

impl HasDescription for str {
    fn description(&self) -> String {
        self.to_string()
    }
}

impl HasDescription for String {
    fn description(&self) -> String {
        self.clone()
    }
}

/// Check logic run against each item of a rule.
///
/// A condition records one event per item: satisfied or violated.
pub trait ArchCondition<T: ?Sized>: Send + Sync {
    /// Returns a description such as `"not depend on layer 'infra'"`.
    fn description(&self) -> String;

    /// Checks `item` and records the outcome in `events`.
    fn check(&self, item: &T, events: &mut ConditionEvents);
}

/// Runs `condition` against every item.
pub fn check_all<'a, T, C>(
    condition: &C,
    items: impl IntoIterator<Item = &'a T>,
    events: &mut ConditionEvents,
) where
    T: 'a,
    C: ArchCondition<T> + ?Sized,
{
    for item in items {
        condition.check(item, events);
    }
}

/// Inverts another condition: every event it records is added inverted.
pub struct Never<C> {
    condition: C,
}

impl<C> Never<C> {
    /// Wraps `condition`.
    #[must_use]
    pub fn new(condition: C) -> Self {
        Self { condition }
    }
}

impl<T: ?Sized, C: ArchCondition<T>> ArchCondition<T> for Never<C> {
    fn description(&self) -> String {
        format!("never {}", self.condition.description())
    }

    fn check(&self, item: &T, events: &mut ConditionEvents) {
        let mut inner = ConditionEvents::new();
        self.condition.check(item, &mut inner);
        for event in inner.iter() {
            event.add_inverted_to(events);
        }
    }
}

/// A rule evaluated against an input such as an element graph.
///
/// # Example
///
/// ```ignore
/// use arch_verdict_core::{ArchRule, ConditionEvents, EvaluationResult, HasDescription, Priority};
///
/// struct NoCycles;
///
/// impl HasDescription for NoCycles {
///     fn description(&self) -> String { "slices should be free of cycles".into() }
/// }
///
/// impl ArchRule<Graph> for NoCycles {
///     fn name(&self) -> &str { "no-cycles" }
///
///     fn evaluate(&self, graph: &Graph) -> EvaluationResult {
///         let mut events = ConditionEvents::new();
///         // record one event per cycle candidate
///         EvaluationResult::from_events(self, &events, self.priority())
///     }
/// }
/// ```
pub trait ArchRule<G: ?Sized>: HasDescription + Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., `"layer-dependencies"`).
    fn name(&self) -> &str;

    /// Returns the priority reported with violations.
    fn priority(&self) -> Priority {
        Priority::Medium
    }

    /// Evaluates the rule against `input`.
    fn evaluate(&self, input: &G) -> EvaluationResult;
}

/// Type alias for boxed [`ArchRule`] trait objects.
pub type ArchRuleBox<G> = Box<dyn ArchRule<G>>;

/// A rule made of sub-rules whose results are merged in order.
pub struct CompositeArchRule<G: ?Sized> {
    name: String,
    description: Option<String>,
    priority: Priority,
    rules: Vec<ArchRuleBox<G>>,
    parallel: bool,
    violation_limit: Option<usize>,
}

impl<G: ?Sized> CompositeArchRule<G> {
    /// Creates an empty composite.
    #[must_use]
    pub fn new(name: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: name.into(),
            description: None,
            priority,
            rules: Vec::new(),
            parallel: false,
            violation_limit: None,
        }
    }

    /// Adds a sub-rule.
    #[must_use]
    pub fn rule<R: ArchRule<G> + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed sub-rule.
    #[must_use]
    pub fn rule_box(mut self, rule: ArchRuleBox<G>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replaces the generated description.
    #[must_use]
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Evaluates sub-rules on the rayon thread pool.
    ///
    /// Merging still happens on the calling thread, in sub-rule order.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Keeps at most `limit` violations of the merged result.
    ///
    /// Sub-rules should be unlimited; the cap applies once, across all of them.
    #[must_use]
    pub fn violation_limit(mut self, limit: Option<usize>) -> Self {
        self.violation_limit = limit;
        self
    }

    /// Number of sub-rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no sub-rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<G: ?Sized> HasDescription for CompositeArchRule<G> {
    fn description(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        self.rules
            .iter()
            .map(|rule| rule.description())
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

impl<G: ?Sized + Sync> ArchRule<G> for CompositeArchRule<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn evaluate(&self, input: &G) -> EvaluationResult {
        debug!(
            "Evaluating composite rule {} with {} sub-rules",
            self.name,
            self.rules.len()
        );

        let parts: Vec<EvaluationResult> = if self.parallel {
            self.rules.par_iter().map(|rule| rule.evaluate(input)).collect()
        } else {
            self.rules.iter().map(|rule| rule.evaluate(input)).collect()
        };

        let mut result = EvaluationResult::new(self, self.priority);
        for part in &parts {
            result.add(part);
        }
        match self.violation_limit {
            Some(limit) => result.limited_to(limit),
            None => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SimpleConditionEvent;

    struct IsEven;

    impl ArchCondition<u32> for IsEven {
        fn description(&self) -> String {
            "be even".to_string()
        }

        fn check(&self, item: &u32, events: &mut ConditionEvents) {
            let satisfied = item % 2 == 0;
            let verb = if satisfied { "is" } else { "is not" };
            events.add(SimpleConditionEvent::new(
                crate::CorrespondingObject::new(*item),
                satisfied,
                format!("{item} {verb} even"),
            ));
        }
    }

    struct NumbersRule {
        name: &'static str,
        numbers: Vec<u32>,
    }

    impl HasDescription for NumbersRule {
        fn description(&self) -> String {
            format!("{} should be even", self.name)
        }
    }

    impl ArchRule<()> for NumbersRule {
        fn name(&self) -> &str {
            self.name
        }

        fn evaluate(&self, _input: &()) -> EvaluationResult {
            let mut events = ConditionEvents::new();
            check_all(&IsEven, &self.numbers, &mut events);
            EvaluationResult::from_events(self, &events, self.priority())
        }
    }

    fn composite(parallel: bool) -> CompositeArchRule<()> {
        CompositeArchRule::new("numbers", Priority::High)
            .rule(NumbersRule {
                name: "small",
                numbers: vec![1, 2, 3],
            })
            .rule(NumbersRule {
                name: "large",
                numbers: vec![10, 11],
            })
            .parallel(parallel)
    }

    #[test]
    fn check_all_records_one_event_per_item() {
        let mut events = ConditionEvents::new();
        check_all(&IsEven, &[1_u32, 2, 3], &mut events);

        assert_eq!(events.len(), 3);
        assert_eq!(events.violating().len(), 2);
    }

    #[test]
    fn never_inverts_events() {
        let mut events = ConditionEvents::new();
        let never = Never::new(IsEven);
        check_all(&never, &[1_u32, 2], &mut events);

        assert_eq!(
            ArchCondition::<u32>::description(&never),
            "never be even"
        );
        let violating: Vec<String> = events
            .violating()
            .iter()
            .flat_map(|e| e.description_lines())
            .collect();
        assert_eq!(violating, vec!["2 is even"]);
    }

    #[test]
    fn composite_description_joins_sub_rules() {
        let rule = composite(false);
        assert_eq!(
            rule.description(),
            "small should be even and large should be even"
        );
        assert_eq!(rule.len(), 2);
    }

    #[test]
    fn described_as_overrides_description() {
        let rule = composite(false).described_as("all numbers should be even");
        assert_eq!(rule.description(), "all numbers should be even");
    }

    #[test]
    fn composite_merges_sub_results_with_own_priority() {
        let result = composite(false).evaluate(&());

        assert_eq!(result.priority(), Priority::High);
        assert_eq!(result.violation_count(), 3);
        assert_eq!(
            result.failure_report().details(),
            ["1 is not even", "11 is not even", "3 is not even"]
        );
    }

    #[test]
    fn parallel_evaluation_yields_same_report() {
        let sequential = composite(false).evaluate(&()).failure_report();
        let parallel = composite(true).evaluate(&()).failure_report();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn violation_limit_applies_across_sub_rules() {
        let result = composite(true).violation_limit(Some(2)).evaluate(&());
        let report = result.failure_report();

        assert_eq!(report.details(), ["1 is not even", "3 is not even"]);
        assert_eq!(
            report.messages().information_about_number_of_violations(),
            "3 times, only the first 2 are listed"
        );
    }

    #[test]
    fn empty_composite_passes() {
        let rule: CompositeArchRule<()> = CompositeArchRule::new("empty", Priority::Low);
        assert!(rule.is_empty());
        assert!(!rule.evaluate(&()).has_violation());
    }
}
