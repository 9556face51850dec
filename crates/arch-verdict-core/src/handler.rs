//! Typed violation handlers.

/// Callback receiving the violating objects of one event, already narrowed to `T`.
///
/// Passed to [`EvaluationResult::handle_violations`](crate::EvaluationResult::handle_violations).
/// Events whose corresponding objects are not all of type `T` never reach the
/// handler. Any `FnMut(&[&T], &str)` closure is a handler.
///
/// ```ignore
/// result.handle_violations::<Dependency, _>(&mut |deps: &[&Dependency], message: &str| {
///     for dep in deps {
///         println!("{} -> {}: {message}", dep.origin, dep.target);
///     }
/// });
/// ```
pub trait ViolationHandler<T> {
    /// Handles the objects and message of one violating event.
    fn handle(&mut self, violating_objects: &[&T], message: &str);
}

impl<T, F> ViolationHandler<T> for F
where
    F: FnMut(&[&T], &str),
{
    fn handle(&mut self, violating_objects: &[&T], message: &str) {
        self(violating_objects, message);
    }
}
