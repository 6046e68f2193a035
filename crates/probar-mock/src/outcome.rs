//! Per-call outcomes and deferred settlements.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// How a recorded invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    /// The call started but has not returned yet
    Pending,
    /// The implementation returned a value
    Success(R),
    /// The implementation panicked; holds the panic message.
    ///
    /// Only `&str` and `String` payloads carry text. Any other payload
    /// (`std::panic::panic_any`) is recorded as [`OPAQUE_PANIC_PAYLOAD`];
    /// the payload itself still reaches the caller unchanged.
    Thrown(String),
}

impl<R> Outcome<R> {
    /// Returns true for [`Outcome::Success`]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for [`Outcome::Thrown`]
    #[must_use]
    pub const fn is_thrown(&self) -> bool {
        matches!(self, Self::Thrown(_))
    }

    /// Returns true for [`Outcome::Pending`]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The returned value, if the call succeeded
    #[must_use]
    pub const fn value(&self) -> Option<&R> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Kind of this outcome without its payload
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Pending => OutcomeKind::Pending,
            Self::Success(_) => OutcomeKind::Success,
            Self::Thrown(_) => OutcomeKind::Thrown,
        }
    }
}

/// Payload-free classification of an [`Outcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Call in progress
    Pending,
    /// Call returned
    Success,
    /// Call panicked
    Thrown,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Thrown => "thrown",
        };
        f.write_str(label)
    }
}

/// Eventual conclusion of a deferred return value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
    /// The deferred value resolved
    Resolved(T),
    /// The deferred value rejected
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    /// Returns true for [`Settlement::Resolved`]
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns true for [`Settlement::Rejected`]
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl<T: Clone, E: Clone> From<&Result<T, E>> for Settlement<T, E> {
    fn from(result: &Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Resolved(value.clone()),
            Err(error) => Self::Rejected(error.clone()),
        }
    }
}

/// Shared, append-only log of settlements, in completion order.
///
/// Clones share the same underlying log.
pub struct SettlementLog<S> {
    entries: Rc<RefCell<Vec<S>>>,
}

impl<S> Clone for SettlementLog<S> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<S> Default for SettlementLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for SettlementLog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettlementLog")
            .field("len", &self.entries.borrow().len())
            .finish()
    }
}

impl<S> SettlementLog<S> {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Append a settlement
    pub fn record(&self, settlement: S) {
        self.entries.borrow_mut().push(settlement);
    }

    /// Number of settlements recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing has settled yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every recorded settlement
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<S: Clone> SettlementLog<S> {
    /// Copy of the settlements recorded so far
    #[must_use]
    pub fn snapshot(&self) -> Vec<S> {
        self.entries.borrow().clone()
    }
}

/// Recorded message for panic payloads that are neither `&str` nor `String`
pub const OPAQUE_PANIC_PAYLOAD: &str = "Box<dyn Any>";

/// Best-effort text of a panic payload. The concrete type of an opaque
/// payload is not recoverable through `dyn Any`, so those map to
/// [`OPAQUE_PANIC_PAYLOAD`].
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        OPAQUE_PANIC_PAYLOAD.to_string()
    }
}
