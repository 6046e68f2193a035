//! Probar Mock: instrumented test doubles for Rust
//!
//! Mock functions record every invocation (arguments, bound receiver,
//! outcome and a global invocation stamp) and let tests swap the behavior
//! through a layered override chain.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       MockFn<A, R, C>                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  call ──► stamp ──► ledger entry (Pending) ──► resolve layer  │
//! │                                                 │             │
//! │      temporary > queued once > permanent > base > absent     │
//! │                                                 │             │
//! │      Success / Thrown ◄── run implementation ◄──┘             │
//! │      Deferred ──► settlement log (completion order)           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use probar_mock::prelude::*;
//!
//! let fetch = mock_fn(|(id,): (u32,)| format!("user-{id}"));
//! fetch.return_value_once("cached".to_string());
//!
//! assert_eq!(fetch.call((1,)), "cached");
//! assert_eq!(fetch.call((2,)), "user-2");
//! MockAssertion::nth_called_with(&fetch, 2, &(2,)).unwrap();
//! ```

#![warn(missing_docs)]

mod assertion;
mod config;
#[allow(clippy::missing_const_for_fn)]
mod deferred;
#[allow(clippy::missing_const_for_fn, clippy::type_complexity)]
mod engine;
mod ledger;
#[cfg(not(target_arch = "wasm32"))]
mod logging;
mod outcome;
mod result;
mod sequence;
mod spy;
#[allow(clippy::type_complexity)]
mod spy_on;

pub use assertion::{AssertionResult, CallRecord, MockAssertion};
pub use config::{MockConfig, DEFAULT_MOCK_NAME};
pub use deferred::{Deferred, MockReturn};
pub use engine::{mock_fn, Behavior, MockFn};
pub use ledger::{CallKind, LedgerEntry};
#[cfg(not(target_arch = "wasm32"))]
pub use logging::{init_test_logging, DEFAULT_LOG_FILTER};
pub use outcome::{
    panic_message, Outcome, OutcomeKind, Settlement, SettlementLog, OPAQUE_PANIC_PAYLOAD,
};
pub use result::{MockError, MockResult};
pub use sequence::{next_invocation_stamp, peek_invocation_stamp};
pub use spy::{spy, Spy};
pub use spy_on::{spy_on, Method, MethodHost, MethodTable, Property};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::config::*;
    pub use super::deferred::{Deferred, MockReturn};
    pub use super::engine::{mock_fn, MockFn};
    pub use super::ledger::*;
    pub use super::outcome::{Outcome, OutcomeKind, Settlement};
    pub use super::result::*;
    pub use super::spy::*;
    pub use super::spy_on::*;
}
