//! Spies: record calls to a fixed function without changing its behavior.

use crate::deferred::MockReturn;
use crate::engine::MockFn;
use crate::outcome::Outcome;
use std::fmt;

/// A recording wrapper around a fixed function.
///
/// Shares the ledger model of [`MockFn`] but exposes no way to swap the
/// behavior. Panics raised by the wrapped function are recorded as
/// [`Outcome::Thrown`] and keep unwinding.
pub struct Spy<A, R: MockReturn> {
    inner: MockFn<A, R>,
}

impl<A, R: MockReturn> Clone for Spy<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A, R: MockReturn> fmt::Debug for Spy<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spy").field("inner", &self.inner).finish()
    }
}

/// Wrap `f` in a [`Spy`]
pub fn spy<A, R, F>(f: F) -> Spy<A, R>
where
    A: Clone + 'static,
    R: MockReturn,
    F: Fn(A) -> R + 'static,
{
    Spy::new(f)
}

impl<A, R> Spy<A, R>
where
    A: Clone + 'static,
    R: MockReturn,
{
    /// Wrap `f`
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) -> R + 'static,
    {
        Self {
            inner: MockFn::new(f),
        }
    }

    /// Call the wrapped function
    pub fn call(&self, args: A) -> R {
        self.inner.call(args)
    }

    /// Whether the spy has been called
    #[must_use]
    pub fn called(&self) -> bool {
        self.inner.called()
    }

    /// Number of recorded calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }

    /// Arguments of every recorded call
    #[must_use]
    pub fn calls(&self) -> Vec<A> {
        self.inner.calls()
    }

    /// Arguments of the most recent call
    #[must_use]
    pub fn last_call(&self) -> Option<A> {
        self.inner.last_call()
    }

    /// Outcome of every recorded call
    #[must_use]
    pub fn results(&self) -> Vec<Outcome<R>> {
        self.inner.results()
    }

    /// Returned values; `None` where the call panicked
    #[must_use]
    pub fn returns(&self) -> Vec<Option<R>> {
        self.inner.returns()
    }

    /// Global invocation stamps of every recorded call
    #[must_use]
    pub fn invocation_order(&self) -> Vec<u64> {
        self.inner.invocation_order()
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.name()
    }

    /// Forget recorded calls
    pub fn clear(&self) -> &Self {
        self.inner.clear();
        self
    }
}
