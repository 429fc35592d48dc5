/// Receives events and decides how a long-running operation should proceed.
///
/// Observers let callers monitor or steer integrators, estimators, and
/// solvers without changing their APIs. They are the only channel through
/// which the library reports progress and diagnostics; nothing prints.
///
/// The `observe` method returns `Option<A>`, where `Some(action)` requests an
/// operation-specific action and `None` lets the operation continue unchanged.
/// Operations that accept no actions use [`std::convert::Infallible`] as `A`.
///
/// Closures automatically implement `Observer`, and a built-in impl for `()`
/// provides a no-op observer that always returns `None`.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

/// Blanket implementation for observer closures.
impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

/// A no-op observer that always returns `None`.
impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
