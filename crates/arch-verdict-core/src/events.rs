//! Event collection for a single rule evaluation pass.

use std::sync::Arc;

use crate::event::{ConditionEvent, EventRef};

/// Ordered collection of events produced while evaluating one rule.
///
/// Insertion order is kept for iteration. Reports re-sort their lines, so the
/// order here only affects handler dispatch.
#[derive(Debug, Default)]
pub struct ConditionEvents {
    events: Vec<EventRef>,
    violation_count: usize,
    information_about_number_of_violations: Option<String>,
    violation_limit: Option<usize>,
    omitted_violations: usize,
}

impl ConditionEvents {
    /// Creates an empty, unlimited collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection that keeps at most `limit` violating events.
    ///
    /// Further violations are counted but dropped, and
    /// [`information_about_number_of_violations`](Self::information_about_number_of_violations)
    /// reports the real total.
    #[must_use]
    pub fn with_violation_limit(limit: usize) -> Self {
        Self {
            violation_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Appends an event.
    pub fn add<E: ConditionEvent + 'static>(&mut self, event: E) {
        self.add_ref(Arc::new(event));
    }

    /// Appends an already shared event.
    pub fn add_ref(&mut self, event: EventRef) {
        if event.is_violation() {
            if self
                .violation_limit
                .is_some_and(|limit| self.violation_count >= limit)
            {
                self.omitted_violations += 1;
                return;
            }
            self.violation_count += 1;
        }
        self.events.push(event);
    }

    /// Returns the violating events in insertion order.
    #[must_use]
    pub fn violating(&self) -> Vec<EventRef> {
        self.events
            .iter()
            .filter(|e| e.is_violation())
            .cloned()
            .collect()
    }

    /// Returns the non-violating events in insertion order.
    #[must_use]
    pub fn allowed(&self) -> Vec<EventRef> {
        self.events
            .iter()
            .filter(|e| !e.is_violation())
            .cloned()
            .collect()
    }

    /// Returns `true` if at least one violating event was recorded.
    #[must_use]
    pub fn contains_violation(&self) -> bool {
        self.events.iter().any(|e| e.is_violation())
    }

    /// Sets a free-text note about the number of violations.
    ///
    /// Producers set this when they stopped short of reporting every violation.
    pub fn set_information_about_number_of_violations(&mut self, note: impl Into<String>) {
        self.information_about_number_of_violations = Some(note.into());
    }

    /// Returns the truncation note, if any.
    ///
    /// An explicitly set note wins over the one derived from the violation limit.
    #[must_use]
    pub fn information_about_number_of_violations(&self) -> Option<String> {
        if let Some(note) = &self.information_about_number_of_violations {
            return Some(note.clone());
        }
        match self.violation_limit {
            Some(limit) if self.omitted_violations > 0 => Some(format!(
                "{} times, only the first {limit} are listed",
                limit + self.omitted_violations
            )),
            _ => None,
        }
    }

    /// Number of violations dropped because of the limit.
    #[must_use]
    pub fn omitted_violations(&self) -> usize {
        self.omitted_violations
    }

    /// Iterates over all recorded events.
    pub fn iter(&self) -> impl Iterator<Item = &EventRef> {
        self.events.iter()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
