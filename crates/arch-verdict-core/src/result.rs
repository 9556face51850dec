//! Evaluation results: the violating events of one rule.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::event::{ConditionEvent, CorrespondingObject, EventHandler, EventRef};
use crate::events::ConditionEvents;
use crate::handler::ViolationHandler;
use crate::priority::Priority;
use crate::report::{FailureMessages, FailureReport};
use crate::rule::HasDescription;

type LinePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Result of evaluating a rule against a whole element graph.
///
/// Only violating events are retained; satisfied events are dropped when the
/// result is built and cannot be recovered. Results of composite rules are
/// accumulated with [`add`](Self::add).
///
/// ```ignore
/// let mut result = EvaluationResult::from_events("layers are respected", &events, Priority::High);
/// result.add(&other_part);
/// if result.has_violation() {
///     println!("{}", result.failure_report());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    rule: String,
    priority: Priority,
    violations: Vec<EventRef>,
    information_about_number_of_violations: Option<String>,
}

impl EvaluationResult {
    /// Creates a result without violations.
    #[must_use]
    pub fn new(rule: &(impl HasDescription + ?Sized), priority: Priority) -> Self {
        Self::from_events(rule, &ConditionEvents::new(), priority)
    }

    /// Creates a result from the violating subset of `events`.
    ///
    /// The violations are captured now; later additions to `events` are not seen.
    #[must_use]
    pub fn from_events(
        rule: &(impl HasDescription + ?Sized),
        events: &ConditionEvents,
        priority: Priority,
    ) -> Self {
        Self {
            rule: rule.description(),
            priority,
            violations: events.violating(),
            information_about_number_of_violations: events.information_about_number_of_violations(),
        }
    }

    /// Appends the violations of `part` to this result.
    ///
    /// A truncation note already present on this result wins; otherwise the
    /// note of `part` is taken over.
    pub fn add(&mut self, part: &EvaluationResult) {
        self.violations.extend(part.violations.iter().cloned());
        if self.information_about_number_of_violations.is_none() {
            self.information_about_number_of_violations
                .clone_from(&part.information_about_number_of_violations);
        }
    }

    /// Returns `true` if at least one violation was recorded.
    #[must_use]
    pub fn has_violation(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Number of violating events.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Priority of the evaluated rule.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Description of the evaluated rule.
    #[must_use]
    pub fn rule_description(&self) -> &str {
        &self.rule
    }

    /// Renders all violation lines, sorted, into a report.
    ///
    /// Equal lines stay adjacent and are not deduplicated.
    #[must_use]
    pub fn failure_report(&self) -> FailureReport {
        let mut lines: Vec<String> = self
            .violations
            .iter()
            .flat_map(|event| event.description_lines())
            .collect();
        lines.sort();

        let messages =
            FailureMessages::new(lines, self.information_about_number_of_violations.clone());
        FailureReport::new(self.rule.clone(), self.priority, messages)
    }

    /// Returns a new result whose events only keep description lines matching
    /// `line_predicate`.
    ///
    /// An event with no matching line left is no longer a violation. `self` is
    /// not modified.
    #[must_use]
    pub fn filter_descriptions_matching<P>(&self, line_predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let line_predicate: LinePredicate = Arc::new(line_predicate);
        let mut filtered = ConditionEvents::new();
        for event in &self.violations {
            filtered.add(FilteredEvent {
                delegate: Arc::clone(event),
                line_predicate: Arc::clone(&line_predicate),
            });
        }
        Self::from_events(self.rule.as_str(), &filtered, self.priority)
    }

    /// Returns a new result keeping at most `limit` violations.
    ///
    /// Used after merging, so the note counts every violation of the merged
    /// result. A note already present on `self` is kept.
    #[must_use]
    pub fn limited_to(&self, limit: usize) -> Self {
        let mut limited = ConditionEvents::with_violation_limit(limit);
        for event in &self.violations {
            limited.add_ref(Arc::clone(event));
        }
        let mut result = Self::from_events(self.rule.as_str(), &limited, self.priority);
        if self.information_about_number_of_violations.is_some() {
            result
                .information_about_number_of_violations
                .clone_from(&self.information_about_number_of_violations);
        }
        result
    }

    /// Passes violations whose corresponding objects are all of type `T` to
    /// `violation_handler`.
    ///
    /// The type parameter is the witness: events carrying any object of another
    /// type are skipped without error.
    pub fn handle_violations<T, H>(&self, violation_handler: &mut H)
    where
        T: Any,
        H: ViolationHandler<T> + ?Sized,
    {
        let mut event_handler = |objects: &[CorrespondingObject], message: &str| {
            let typed: Option<Vec<&T>> = objects
                .iter()
                .map(CorrespondingObject::downcast_ref::<T>)
                .collect();
            match typed {
                Some(typed) => violation_handler.handle(&typed, message),
                None => {
                    trace!(
                        expected = std::any::type_name::<T>(),
                        "skipping violation with foreign payload: {message}"
                    );
                }
            }
        };
        for event in &self.violations {
            event.handle_with(&mut event_handler);
        }
    }

    /// Passes every violation to `handler` with its untyped objects.
    pub fn handle_all_violations(&self, handler: &mut dyn EventHandler) {
        for event in &self.violations {
            event.handle_with(handler);
        }
    }
}

/// View over an event that only keeps lines matching a predicate.
struct FilteredEvent {
    delegate: EventRef,
    line_predicate: LinePredicate,
}

impl fmt::Debug for FilteredEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredEvent")
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

impl ConditionEvent for FilteredEvent {
    fn is_violation(&self) -> bool {
        self.delegate.is_violation() && !self.description_lines().is_empty()
    }

    fn description_lines(&self) -> Vec<String> {
        self.delegate
            .description_lines()
            .into_iter()
            .filter(|line| (self.line_predicate)(line.as_str()))
            .collect()
    }

    fn handle_with(&self, handler: &mut dyn EventHandler) {
        let mut filtered = FilteredHandler {
            delegate: handler,
            line_predicate: &self.line_predicate,
        };
        self.delegate.handle_with(&mut filtered);
    }

    fn add_inverted_to(&self, events: &mut ConditionEvents) {
        self.delegate.add_inverted_to(events);
    }
}

/// Forwards only messages matching the predicate.
struct FilteredHandler<'a, 'h> {
    delegate: &'a mut (dyn EventHandler + 'h),
    line_predicate: &'a LinePredicate,
}

impl EventHandler for FilteredHandler<'_, '_> {
    fn handle(&mut self, corresponding_objects: &[CorrespondingObject], message: &str) {
        if (self.line_predicate)(message) {
            self.delegate.handle(corresponding_objects, message);
        }
    }
}
