//! Process-wide invocation sequence.
//!
//! Every invocation of every mock takes one stamp from a single atomic
//! counter. Stamps start at 1, only ever grow, and are never reset, so they
//! order calls across distinct mocks and across threads.

use std::sync::atomic::{AtomicU64, Ordering};

static INVOCATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Take the next global invocation stamp.
#[must_use]
pub fn next_invocation_stamp() -> u64 {
    INVOCATION_SEQUENCE.fetch_add(1, Ordering::SeqCst)
}

/// The stamp the next invocation will receive. Informational only: another
/// thread may take it first.
#[must_use]
pub fn peek_invocation_stamp() -> u64 {
    INVOCATION_SEQUENCE.load(Ordering::SeqCst)
}
