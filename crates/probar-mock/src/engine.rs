//! Mock functions.
//!
//! A [`MockFn`] stands in for a function (or method) under test. Every
//! invocation is stamped and appended to a ledger before the active
//! implementation runs; the outcome is filled in when it returns or panics.
//!
//! ## Override chain
//!
//! The implementation for a call is resolved in strict priority order:
//!
//! 1. the most recently installed temporary override still in scope
//! 2. the next queued one-shot override (consumed)
//! 3. the permanent override
//! 4. the base implementation
//!
//! With none of these configured the call returns [`MockReturn::absent`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use probar_mock::prelude::*;
//!
//! let mock = mock_fn(|(x,): (i32,)| x * 2);
//! mock.queue_implementation_once(|(x,)| x * 10);
//!
//! assert_eq!(mock.call((1,)), 10);
//! assert_eq!(mock.call((2,)), 4);
//! assert_eq!(mock.calls(), vec![(1,), (2,)]);
//! ```

use crate::config::MockConfig;
use crate::deferred::{Deferred, MockReturn};
use crate::ledger::{CallKind, Ledger, LedgerEntry};
use crate::outcome::{panic_message, Outcome, SettlementLog};
use crate::sequence::next_invocation_stamp;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Behavior a mock can run. Receives the bound receiver, if any, and the
/// arguments.
pub type Behavior<A, R, C> = Rc<dyn Fn(Option<&C>, A) -> R>;

fn plain<A, R, C, F>(f: F) -> Behavior<A, R, C>
where
    A: 'static,
    R: 'static,
    C: 'static,
    F: Fn(A) -> R + 'static,
{
    Rc::new(move |_: Option<&C>, args: A| f(args))
}

/// Layer of the override chain that served a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Temporary,
    Once,
    Permanent,
    Base,
}

impl Layer {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Temporary => "temporary",
            Self::Once => "once",
            Self::Permanent => "permanent",
            Self::Base => "base",
        }
    }
}

/// A temporary override pushed by one scope. `live` is cleared by the
/// scope's guard; dead layers are pruned before resolution.
struct TemporaryLayer<A, R, C> {
    behavior: Behavior<A, R, C>,
    live: Rc<Cell<bool>>,
}

/// The base, permanent and queued layers, as captured by a synchronous scope
struct LayerSnapshot<A, R, C> {
    base: Option<Behavior<A, R, C>>,
    permanent: Option<Behavior<A, R, C>>,
    queued: VecDeque<Behavior<A, R, C>>,
}

struct OverrideChain<A, R, C> {
    base: Option<Behavior<A, R, C>>,
    permanent: Option<Behavior<A, R, C>>,
    queued: VecDeque<Behavior<A, R, C>>,
    temporaries: Vec<TemporaryLayer<A, R, C>>,
}

impl<A, R, C> OverrideChain<A, R, C> {
    fn resolve(&mut self) -> Option<(Behavior<A, R, C>, Layer)> {
        self.temporaries.retain(|layer| layer.live.get());
        if let Some(temporary) = self.temporaries.last() {
            return Some((Rc::clone(&temporary.behavior), Layer::Temporary));
        }
        if let Some(once) = self.queued.pop_front() {
            return Some((once, Layer::Once));
        }
        if let Some(permanent) = &self.permanent {
            return Some((Rc::clone(permanent), Layer::Permanent));
        }
        self.base
            .as_ref()
            .map(|base| (Rc::clone(base), Layer::Base))
    }

    fn live_temporaries(&self) -> usize {
        self.temporaries
            .iter()
            .filter(|layer| layer.live.get())
            .count()
    }

    fn snapshot(&self) -> LayerSnapshot<A, R, C> {
        LayerSnapshot {
            base: self.base.clone(),
            permanent: self.permanent.clone(),
            queued: self.queued.clone(),
        }
    }

    /// Put `snapshot` back, returning the layers it displaced
    fn apply(&mut self, snapshot: LayerSnapshot<A, R, C>) -> LayerSnapshot<A, R, C> {
        LayerSnapshot {
            base: mem::replace(&mut self.base, snapshot.base),
            permanent: mem::replace(&mut self.permanent, snapshot.permanent),
            queued: mem::replace(&mut self.queued, snapshot.queued),
        }
    }
}

struct MockState<A, R, C> {
    config: MockConfig,
    chain: OverrideChain<A, R, C>,
    original_base: Option<Behavior<A, R, C>>,
    ledger: Ledger<A, R, C>,
    last_call: Option<A>,
}

/// Ends one temporary override when dropped, including on unwinding.
///
/// Only the guard's own layer is retired. A synchronous scope also carries
/// the base, permanent and queued layers it started with and puts them back,
/// undoing configuration changes made inside the scope.
struct TemporaryGuard<A, R, C> {
    state: Rc<RefCell<MockState<A, R, C>>>,
    live: Rc<Cell<bool>>,
    rollback: Option<LayerSnapshot<A, R, C>>,
}

impl<A, R, C> Drop for TemporaryGuard<A, R, C> {
    fn drop(&mut self) {
        self.live.set(false);
        let Ok(mut state) = self.state.try_borrow_mut() else {
            warn!(
                rollback_skipped = self.rollback.is_some(),
                "mock state busy when temporary scope ended, override retired on next call"
            );
            return;
        };
        let (live, retired): (Vec<_>, Vec<_>) = state
            .chain
            .temporaries
            .drain(..)
            .partition(|layer| layer.live.get());
        state.chain.temporaries = live;
        let displaced = self
            .rollback
            .take()
            .map(|snapshot| state.chain.apply(snapshot));
        debug!(
            mock = %state.config.name,
            remaining = state.chain.temporaries.len(),
            "temporary implementation removed"
        );
        drop(state);
        // Dropped outside the borrow: captured values may call back into the mock.
        drop((retired, displaced));
    }
}

/// An instrumented stand-in for a function.
///
/// `A` is the argument tuple, `R` the return type and `C` the receiver type
/// for bound and constructor-style calls. Clones are handles onto the same
/// ledger and override chain.
pub struct MockFn<A, R: MockReturn, C = ()> {
    id: Uuid,
    state: Rc<RefCell<MockState<A, R, C>>>,
    settlements: SettlementLog<R::Settlement>,
}

impl<A, R: MockReturn, C> Clone for MockFn<A, R, C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            state: Rc::clone(&self.state),
            settlements: self.settlements.clone(),
        }
    }
}

impl<A, R: MockReturn, C> fmt::Debug for MockFn<A, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MockFn")
            .field("id", &self.id)
            .field("name", &state.config.name)
            .field("call_count", &state.ledger.len())
            .field("queued", &state.chain.queued.len())
            .field("settlements", &self.settlements.len())
            .finish()
    }
}

impl<A, R, C> Default for MockFn<A, R, C>
where
    A: Clone + 'static,
    R: MockReturn,
    C: Clone + 'static,
{
    fn default() -> Self {
        Self::from_parts(None, MockConfig::default())
    }
}

/// Create a mock around `base`, with no receiver type.
pub fn mock_fn<A, R, F>(base: F) -> MockFn<A, R>
where
    A: Clone + 'static,
    R: MockReturn,
    F: Fn(A) -> R + 'static,
{
    MockFn::new(base)
}

impl<A, R, C> MockFn<A, R, C>
where
    A: Clone + 'static,
    R: MockReturn,
    C: Clone + 'static,
{
    /// Create a mock whose base implementation is `base`
    pub fn new<F>(base: F) -> Self
    where
        F: Fn(A) -> R + 'static,
    {
        Self::with_config(base, MockConfig::default())
    }

    /// Create a mock whose base implementation also receives the receiver
    pub fn new_with_context<F>(base: F) -> Self
    where
        F: Fn(Option<&C>, A) -> R + 'static,
    {
        Self::from_parts(Some(Rc::new(base)), MockConfig::default())
    }

    /// Create a mock with explicit configuration
    pub fn with_config<F>(base: F, config: MockConfig) -> Self
    where
        F: Fn(A) -> R + 'static,
    {
        Self::from_parts(Some(plain(base)), config)
    }

    /// Create a named mock with no implementation
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::from_parts(None, MockConfig::new().with_name(name))
    }

    fn from_parts(base: Option<Behavior<A, R, C>>, config: MockConfig) -> Self {
        let state = MockState {
            config,
            chain: OverrideChain {
                base: base.clone(),
                permanent: None,
                queued: VecDeque::new(),
                temporaries: Vec::new(),
            },
            original_base: base,
            ledger: Ledger::default(),
            last_call: None,
        };
        Self {
            id: Uuid::new_v4(),
            state: Rc::new(RefCell::new(state)),
            settlements: SettlementLog::new(),
        }
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Call the mock without a receiver
    pub fn call(&self, args: A) -> R {
        self.invoke(CallKind::Call, None, args)
    }

    /// Call the mock with `context` bound as its receiver
    pub fn call_with(&self, context: C, args: A) -> R {
        self.invoke(CallKind::Call, Some(context), args)
    }

    /// Constructor-style call: a fresh `C::default()` receiver is created,
    /// recorded as both context and instance, and returned.
    pub fn construct(&self, args: A) -> C
    where
        C: Default,
    {
        self.construct_from(C::default(), args)
    }

    /// Constructor-style call with a caller-supplied fresh receiver.
    ///
    /// Always yields `receiver`. Whatever the implementation returns is
    /// recorded in the ledger (see [`MockFn::results`]) and otherwise dropped.
    pub fn construct_from(&self, receiver: C, args: A) -> C {
        let _ = self.invoke(CallKind::Construct, Some(receiver.clone()), args);
        receiver
    }

    /// A closure forwarding to this mock, for injection into code under test
    pub fn as_fn(&self) -> impl Fn(A) -> R + 'static {
        let mock = self.clone();
        move |args| mock.call(args)
    }

    fn invoke(&self, kind: CallKind, context: Option<C>, args: A) -> R {
        let order = next_invocation_stamp();
        let (resolved, capture_settlements) = {
            let mut state = self.state.borrow_mut();
            state.last_call = Some(args.clone());
            let instance = match kind {
                CallKind::Construct => context.clone(),
                CallKind::Call => None,
            };
            state.ledger.push(LedgerEntry {
                args: args.clone(),
                context: context.clone(),
                kind,
                instance,
                outcome: Outcome::Pending,
                order,
            });
            let resolved = state.chain.resolve();
            if state.config.trace_calls {
                trace!(
                    mock = %state.config.name,
                    id = %self.id,
                    order,
                    ?kind,
                    layer = resolved.as_ref().map_or("none", |(_, layer)| layer.as_str()),
                    "mock invoked"
                );
            }
            (resolved, state.config.capture_settlements)
        };

        let Some((behavior, _)) = resolved else {
            let value = R::absent();
            self.record(order, Outcome::Success(value.clone()));
            return value;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| behavior(context.as_ref(), args))) {
            Ok(value) => {
                let value = if capture_settlements {
                    value.observe(&self.settlements)
                } else {
                    value
                };
                self.record(order, Outcome::Success(value.clone()));
                value
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                debug!(mock = %self.name(), order, %message, "mock implementation panicked");
                self.record(order, Outcome::Thrown(message));
                panic::resume_unwind(payload)
            }
        }
    }

    fn record(&self, order: u64, outcome: Outcome<R>) {
        let mut state = self.state.borrow_mut();
        if !state.ledger.settle(order, outcome) {
            trace!(mock = %state.config.name, order, "outcome dropped, ledger cleared mid-call");
        }
    }

    // ========================================================================
    // Override configuration
    // ========================================================================

    /// Install the permanent override, replacing any previous one
    pub fn set_implementation<F>(&self, f: F) -> &Self
    where
        F: Fn(A) -> R + 'static,
    {
        self.state.borrow_mut().chain.permanent = Some(plain(f));
        self
    }

    /// Install a context-aware permanent override
    pub fn set_implementation_with_context<F>(&self, f: F) -> &Self
    where
        F: Fn(Option<&C>, A) -> R + 'static,
    {
        self.state.borrow_mut().chain.permanent = Some(Rc::new(f));
        self
    }

    /// Queue a one-shot override; queued overrides run first-in first-out
    pub fn queue_implementation_once<F>(&self, f: F) -> &Self
    where
        F: Fn(A) -> R + 'static,
    {
        self.state.borrow_mut().chain.queued.push_back(plain(f));
        self
    }

    /// Queue a context-aware one-shot override
    pub fn queue_implementation_once_with_context<F>(&self, f: F) -> &Self
    where
        F: Fn(Option<&C>, A) -> R + 'static,
    {
        self.state.borrow_mut().chain.queued.push_back(Rc::new(f));
        self
    }

    /// Return `value` from every call that reaches the permanent override
    pub fn return_value_always(&self, value: R) -> &Self {
        self.set_implementation(move |_| value.clone())
    }

    /// Return `value` from the next call that reaches the queue
    pub fn return_value_once(&self, value: R) -> &Self {
        self.queue_implementation_once(move |_| value.clone())
    }

    /// Reassign the base implementation. [`MockFn::restore`] undoes this.
    pub fn set_base_implementation<F>(&self, f: F) -> &Self
    where
        F: Fn(A) -> R + 'static,
    {
        self.state.borrow_mut().chain.base = Some(plain(f));
        self
    }

    /// Run `scope` with `f` taking priority over every other layer. When the
    /// scope ends, whether it returns or unwinds, the override is removed and
    /// the base, permanent and queued layers are put back as they were before
    /// the scope, undoing changes `scope` made to them.
    pub fn with_temporary_implementation<F, S, T>(&self, f: F, scope: S) -> T
    where
        F: Fn(A) -> R + 'static,
        S: FnOnce() -> T,
    {
        let _guard = self.install_temporary(plain(f), true);
        scope()
    }

    /// Async form of [`MockFn::with_temporary_implementation`]. The override
    /// stays active until `scope` completes or is dropped.
    ///
    /// Other tasks may reconfigure the mock while `scope` is suspended, so
    /// only this scope's override is removed at the end; other layers are
    /// left as they are. When scopes overlap, the most recently installed one
    /// still running wins.
    #[allow(clippy::future_not_send)]
    pub async fn with_temporary_implementation_async<F, Fut, T>(&self, f: F, scope: Fut) -> T
    where
        F: Fn(A) -> R + 'static,
        Fut: Future<Output = T>,
    {
        let _guard = self.install_temporary(plain(f), false);
        scope.await
    }

    fn install_temporary(
        &self,
        behavior: Behavior<A, R, C>,
        rollback: bool,
    ) -> TemporaryGuard<A, R, C> {
        let live = Rc::new(Cell::new(true));
        let mut state = self.state.borrow_mut();
        let rollback = rollback.then(|| state.chain.snapshot());
        state.chain.temporaries.push(TemporaryLayer {
            behavior,
            live: Rc::clone(&live),
        });
        debug!(
            mock = %state.config.name,
            depth = state.chain.temporaries.len(),
            "temporary implementation installed"
        );
        TemporaryGuard {
            state: Rc::clone(&self.state),
            live,
            rollback,
        }
    }

    // ========================================================================
    // Ledger lifecycle
    // ========================================================================

    /// Empty the ledger and settlement log. Keeps the last call and every
    /// override.
    pub fn clear(&self) -> &Self {
        let mut state = self.state.borrow_mut();
        state.ledger.clear();
        self.settlements.clear();
        debug!(mock = %state.config.name, "mock cleared");
        self
    }

    /// [`MockFn::clear`], then drop the permanent and queued overrides
    pub fn reset(&self) -> &Self {
        self.clear();
        let mut state = self.state.borrow_mut();
        state.chain.permanent = None;
        state.chain.queued.clear();
        debug!(mock = %state.config.name, "mock reset");
        self
    }

    /// [`MockFn::reset`], then reinstate the base implementation given at
    /// construction and drop every temporary override
    pub fn restore(&self) -> &Self {
        self.reset();
        let mut state = self.state.borrow_mut();
        state.chain.base = state.original_base.clone();
        state.chain.temporaries.clear();
        debug!(mock = %state.config.name, "mock restored");
        self
    }

    // ========================================================================
    // Naming
    // ========================================================================

    /// Unique id of this mock (shared by clones)
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> String {
        self.state.borrow().config.name.clone()
    }

    /// Change the display name
    pub fn set_name(&self, name: impl Into<String>) -> &Self {
        self.state.borrow_mut().config.name = name.into();
        self
    }

    /// Current configuration, including any name set since construction
    #[must_use]
    pub fn config(&self) -> MockConfig {
        self.state.borrow().config.clone()
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Number of recorded calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.borrow().ledger.len()
    }

    /// Whether any call is recorded
    #[must_use]
    pub fn called(&self) -> bool {
        self.call_count() > 0
    }

    /// Arguments of every recorded call
    #[must_use]
    pub fn calls(&self) -> Vec<A> {
        self.state.borrow().ledger.calls()
    }

    /// Receivers of every recorded call; `None` for unbound calls
    #[must_use]
    pub fn contexts(&self) -> Vec<Option<C>> {
        self.state.borrow().ledger.contexts()
    }

    /// Constructed receivers; `None` for calls that were not constructions
    #[must_use]
    pub fn instances(&self) -> Vec<Option<C>> {
        self.state.borrow().ledger.instances()
    }

    /// Arguments of the most recent call. Survives `clear` and `reset`.
    #[must_use]
    pub fn last_call(&self) -> Option<A> {
        self.state.borrow().last_call.clone()
    }

    /// Outcome of every recorded call
    #[must_use]
    pub fn results(&self) -> Vec<Outcome<R>> {
        self.state.borrow().ledger.results()
    }

    /// Returned values, index-aligned with [`MockFn::calls`]; `None` where
    /// the call panicked or is still running
    #[must_use]
    pub fn returns(&self) -> Vec<Option<R>> {
        self.state.borrow().ledger.returns()
    }

    /// Settlements of deferred return values, in completion order
    #[must_use]
    pub fn settlements(&self) -> Vec<R::Settlement> {
        self.settlements.snapshot()
    }

    /// Global invocation stamps of every recorded call
    #[must_use]
    pub fn invocation_order(&self) -> Vec<u64> {
        self.state.borrow().ledger.invocation_order()
    }

    /// Full ledger rows
    #[must_use]
    pub fn entries(&self) -> Vec<LedgerEntry<A, R, C>> {
        self.state.borrow().ledger.entries().to_vec()
    }

    /// Number of one-shot overrides still queued
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.state.borrow().chain.queued.len()
    }

    /// Number of temporary overrides whose scope is still running
    #[must_use]
    pub fn temporary_count(&self) -> usize {
        self.state.borrow().chain.live_temporaries()
    }
}

impl<A, R, C> MockFn<A, R, C>
where
    A: Clone + 'static,
    R: MockReturn,
    C: Clone + Into<R> + 'static,
{
    /// Return the receiver captured for each call. Unbound calls return
    /// [`MockReturn::absent`].
    pub fn return_context_always(&self) -> &Self {
        self.set_implementation_with_context(|context: Option<&C>, _| {
            context.cloned().map_or_else(R::absent, Into::into)
        })
    }
}

impl<A, T, E, C> MockFn<A, Deferred<T, E>, C>
where
    A: Clone + 'static,
    T: MockReturn,
    E: Clone + 'static,
    C: Clone + 'static,
{
    /// Every call returns a deferred value resolving to `value`
    pub fn resolve_value_always(&self, value: T) -> &Self {
        self.set_implementation(move |_| Deferred::resolved(value.clone()))
    }

    /// The next queued call returns a deferred value resolving to `value`
    pub fn resolve_value_once(&self, value: T) -> &Self {
        self.queue_implementation_once(move |_| Deferred::resolved(value.clone()))
    }

    /// Every call returns a deferred value rejecting with `error`
    pub fn reject_value_always(&self, error: E) -> &Self {
        self.set_implementation(move |_| Deferred::rejected(error.clone()))
    }

    /// The next queued call returns a deferred value rejecting with `error`
    pub fn reject_value_once(&self, error: E) -> &Self {
        self.queue_implementation_once(move |_| Deferred::rejected(error.clone()))
    }
}
