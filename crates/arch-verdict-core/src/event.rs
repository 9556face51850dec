//! Condition events: the atomic outcome of checking one element.
//!
//! A condition emits one [`ConditionEvent`] per checked element. Events carry
//! the objects that caused them as type-erased [`CorrespondingObject`]s, so a
//! single result can hold dependency edges next to class references.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::events::ConditionEvents;

/// Shared handle to an immutable event.
pub type EventRef = Arc<dyn ConditionEvent>;

/// Outcome of testing one code element against one condition.
pub trait ConditionEvent: fmt::Debug + Send + Sync {
    /// Returns `true` if this event represents a rule violation.
    fn is_violation(&self) -> bool;

    /// Human-readable explanation, one entry per line.
    fn description_lines(&self) -> Vec<String>;

    /// Passes the corresponding objects and the joined description to `handler`.
    fn handle_with(&self, handler: &mut dyn EventHandler);

    /// Adds the logical inverse of this event to `events`.
    ///
    /// Negating conditions use this to turn satisfied checks into violations
    /// and vice versa.
    fn add_inverted_to(&self, events: &mut ConditionEvents);
}

/// Receives the raw payload of an event.
///
/// Any `FnMut(&[CorrespondingObject], &str)` closure is a handler.
pub trait EventHandler {
    /// Handles one event's corresponding objects and message.
    fn handle(&mut self, corresponding_objects: &[CorrespondingObject], message: &str);
}

impl<F> EventHandler for F
where
    F: FnMut(&[CorrespondingObject], &str),
{
    fn handle(&mut self, corresponding_objects: &[CorrespondingObject], message: &str) {
        self(corresponding_objects, message);
    }
}

/// A type-erased code element (or relation) that caused an event.
#[derive(Clone)]
pub struct CorrespondingObject {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CorrespondingObject {
    /// Wraps `value`, remembering its concrete type.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        (*self.value).is::<T>()
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }

    /// Name of the concrete type, for diagnostics only.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CorrespondingObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CorrespondingObject")
            .field(&self.type_name)
            .finish()
    }
}

/// The standard event: objects, a satisfied flag and a description.
#[derive(Debug, Clone)]
pub struct SimpleConditionEvent {
    corresponding_objects: Vec<CorrespondingObject>,
    condition_satisfied: bool,
    description_lines: Vec<String>,
}

impl SimpleConditionEvent {
    /// Creates an event for a single object.
    ///
    /// The event is a violation when `condition_satisfied` is `false`.
    #[must_use]
    pub fn new(
        corresponding_object: CorrespondingObject,
        condition_satisfied: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            corresponding_objects: vec![corresponding_object],
            condition_satisfied,
            description_lines: vec![message.into()],
        }
    }

    /// Creates a violating event for `object`.
    #[must_use]
    pub fn violated<T: Any + Send + Sync>(object: T, message: impl Into<String>) -> Self {
        Self::new(CorrespondingObject::new(object), false, message)
    }

    /// Creates a satisfied event for `object`.
    #[must_use]
    pub fn satisfied<T: Any + Send + Sync>(object: T, message: impl Into<String>) -> Self {
        Self::new(CorrespondingObject::new(object), true, message)
    }

    /// Creates an event over several objects with a multi-line description.
    #[must_use]
    pub fn with_objects(
        corresponding_objects: Vec<CorrespondingObject>,
        condition_satisfied: bool,
        description_lines: Vec<String>,
    ) -> Self {
        Self {
            corresponding_objects,
            condition_satisfied,
            description_lines,
        }
    }

    /// The objects this event was raised for.
    #[must_use]
    pub fn corresponding_objects(&self) -> &[CorrespondingObject] {
        &self.corresponding_objects
    }
}

impl ConditionEvent for SimpleConditionEvent {
    fn is_violation(&self) -> bool {
        !self.condition_satisfied
    }

    fn description_lines(&self) -> Vec<String> {
        self.description_lines.clone()
    }

    fn handle_with(&self, handler: &mut dyn EventHandler) {
        handler.handle(
            &self.corresponding_objects,
            &self.description_lines.join("\n"),
        );
    }

    fn add_inverted_to(&self, events: &mut ConditionEvents) {
        events.add(Self {
            condition_satisfied: !self.condition_satisfied,
            ..self.clone()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_is_inverse_of_satisfied() {
        assert!(SimpleConditionEvent::violated("a", "msg").is_violation());
        assert!(!SimpleConditionEvent::satisfied("a", "msg").is_violation());
    }

    #[test]
    fn corresponding_object_downcasts_to_its_own_type_only() {
        let object = CorrespondingObject::new(42_u32);
        assert!(object.is::<u32>());
        assert_eq!(object.downcast_ref::<u32>(), Some(&42));
        assert!(object.downcast_ref::<i64>().is_none());
        assert_eq!(object.type_name(), "u32");
    }

    #[test]
    fn handle_with_joins_description_lines() {
        let event = SimpleConditionEvent::with_objects(
            vec![CorrespondingObject::new("x"), CorrespondingObject::new("y")],
            false,
            vec!["first".to_string(), "second".to_string()],
        );

        let mut seen = Vec::new();
        event.handle_with(&mut |objects: &[CorrespondingObject], message: &str| {
            seen.push((objects.len(), message.to_string()));
        });

        assert_eq!(seen, vec![(2, "first\nsecond".to_string())]);
    }

    #[test]
    fn add_inverted_to_flips_violation() {
        let mut events = ConditionEvents::new();
        SimpleConditionEvent::satisfied("a", "was fine").add_inverted_to(&mut events);

        assert!(events.contains_violation());
        assert_eq!(
            events.violating()[0].description_lines(),
            vec!["was fine".to_string()]
        );
    }
}
