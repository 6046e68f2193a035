//! Return-value capabilities and deferred (future-backed) return values.
//!
//! A mock needs two things from the type it returns: a value to hand back
//! when nothing is configured, and a way to observe the value if it
//! concludes later. [`MockReturn`] carries both. Plain values conclude
//! immediately and never settle; [`Deferred`] settles when its future
//! completes.

use crate::outcome::{Settlement, SettlementLog};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A type a mock can return.
pub trait MockReturn: Clone + 'static {
    /// Settlement record appended when a returned value concludes.
    /// [`Infallible`] for values that are complete on return.
    type Settlement: Clone + 'static;

    /// Value returned when no implementation is configured.
    fn absent() -> Self;

    /// Attach a completion observer. The default returns `self` untouched.
    fn observe(self, _log: &SettlementLog<Self::Settlement>) -> Self {
        self
    }
}

/// Implement [`MockReturn`] for types whose absent value is `Default::default()`
/// and which are complete as soon as they are returned.
///
/// ```rust,ignore
/// #[derive(Clone, Default)]
/// struct User { id: u32 }
///
/// probar_mock::mock_return!(User);
/// ```
#[macro_export]
macro_rules! mock_return {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::MockReturn for $ty {
                type Settlement = ::std::convert::Infallible;

                fn absent() -> Self {
                    <$ty as ::std::default::Default>::default()
                }
            }
        )*
    };
}

mock_return!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

impl MockReturn for serde_json::Value {
    type Settlement = Infallible;

    fn absent() -> Self {
        Self::Null
    }
}

impl<T: Clone + 'static> MockReturn for Option<T> {
    type Settlement = Infallible;

    fn absent() -> Self {
        None
    }
}

impl<T: Clone + 'static> MockReturn for Vec<T> {
    type Settlement = Infallible;

    fn absent() -> Self {
        Vec::new()
    }
}

impl<K: Clone + Eq + Hash + 'static, V: Clone + 'static> MockReturn for HashMap<K, V> {
    type Settlement = Infallible;

    fn absent() -> Self {
        HashMap::new()
    }
}

impl<K: Clone + Ord + 'static, V: Clone + 'static> MockReturn for BTreeMap<K, V> {
    type Settlement = Infallible;

    fn absent() -> Self {
        BTreeMap::new()
    }
}

impl<T: MockReturn, E: Clone + 'static> MockReturn for Result<T, E> {
    type Settlement = Infallible;

    fn absent() -> Self {
        Ok(T::absent())
    }
}

impl<T: MockReturn> MockReturn for Box<T> {
    type Settlement = Infallible;

    fn absent() -> Self {
        Box::new(T::absent())
    }
}

impl<T: Default + 'static> MockReturn for Rc<T> {
    type Settlement = Infallible;

    fn absent() -> Self {
        Rc::default()
    }
}

impl<T: Default + 'static> MockReturn for Arc<T> {
    type Settlement = Infallible;

    fn absent() -> Self {
        Arc::default()
    }
}

impl<A: MockReturn, B: MockReturn> MockReturn for (A, B) {
    type Settlement = Infallible;

    fn absent() -> Self {
        (A::absent(), B::absent())
    }
}

impl<A: MockReturn, B: MockReturn, C: MockReturn> MockReturn for (A, B, C) {
    type Settlement = Infallible;

    fn absent() -> Self {
        (A::absent(), B::absent(), C::absent())
    }
}

/// A deferred return value: a shared future concluding in `Ok(T)` or `Err(E)`.
///
/// Clones poll the same underlying future, so the value concludes once no
/// matter how many holders await it. Like every Rust future it is inert
/// until polled; a settlement is recorded the first time any holder drives
/// it to completion.
pub struct Deferred<T, E> {
    inner: Shared<LocalBoxFuture<'static, Result<T, E>>>,
}

impl<T: Clone + 'static, E: Clone + 'static> Deferred<T, E> {
    /// Wrap a future
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + 'static,
    {
        Self {
            inner: future.boxed_local().shared(),
        }
    }

    /// A deferred value that resolves to `value` on first poll
    #[must_use]
    pub fn resolved(value: T) -> Self {
        Self::from_future(futures::future::ready(Ok(value)))
    }

    /// A deferred value that rejects with `error` on first poll
    #[must_use]
    pub fn rejected(error: E) -> Self {
        Self::from_future(futures::future::ready(Err(error)))
    }

    /// The conclusion, if some holder has already driven it to completion
    #[must_use]
    pub fn peek(&self) -> Option<&Result<T, E>> {
        self.inner.peek()
    }

    /// Whether the deferred value has concluded
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.peek().is_some()
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.inner.peek().is_some())
            .finish()
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Future for Deferred<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T: MockReturn, E: Clone + 'static> MockReturn for Deferred<T, E> {
    type Settlement = Settlement<T, E>;

    fn absent() -> Self {
        Self::resolved(T::absent())
    }

    fn observe(self, log: &SettlementLog<Self::Settlement>) -> Self {
        let log = log.clone();
        Self::from_future(async move {
            let result = self.await;
            tracing::debug!(resolved = result.is_ok(), "deferred mock value settled");
            log.record(Settlement::from(&result));
            result
        })
    }
}
