//! Property-based tests for the call ledger and override chain.
//!
//! Uses proptest to check that ledger projections stay aligned for arbitrary
//! call sequences.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use probar_mock::prelude::*;
use proptest::prelude::*;
use std::panic::{self, AssertUnwindSafe};

// === Ledger Alignment ===

proptest! {
    /// Every projection has one row per call, in call order.
    #[test]
    fn prop_projections_align(args in prop::collection::vec(any::<i32>(), 0..40)) {
        let mock = mock_fn(|(x,): (i32,)| x.wrapping_mul(2));
        for &x in &args {
            mock.call((x,));
        }

        let wrapped: Vec<(i32,)> = args.iter().map(|&x| (x,)).collect();
        prop_assert_eq!(mock.call_count(), args.len());
        prop_assert_eq!(mock.calls(), wrapped);
        prop_assert_eq!(mock.returns().len(), args.len());
        prop_assert_eq!(mock.results().len(), args.len());
        prop_assert_eq!(mock.contexts().len(), args.len());
        prop_assert_eq!(mock.last_call(), args.last().map(|&x| (x,)));
    }

    /// Panicking calls still occupy their slot, with no return value.
    #[test]
    fn prop_thrown_calls_keep_alignment(args in prop::collection::vec(-20_i32..20, 1..30)) {
        let mock = mock_fn(|(x,): (i32,)| {
            assert!(x >= 0, "negative");
            x
        });
        for &x in &args {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| mock.call((x,))));
        }

        let expected: Vec<Option<i32>> =
            args.iter().map(|&x| (x >= 0).then_some(x)).collect();
        prop_assert_eq!(mock.returns(), expected);
        let thrown = mock.results().iter().filter(|o| o.is_thrown()).count();
        prop_assert_eq!(thrown, args.iter().filter(|&&x| x < 0).count());
    }

    /// Stamps of one mock strictly increase.
    #[test]
    fn prop_stamps_strictly_increase(calls in 1_usize..50) {
        let mock: MockFn<(), ()> = MockFn::default();
        for _ in 0..calls {
            mock.call(());
        }
        let order = mock.invocation_order();
        prop_assert_eq!(order.len(), calls);
        prop_assert!(order.windows(2).all(|w| w[0] < w[1]));
    }
}

// === Override Chain ===

proptest! {
    /// One-shot overrides are consumed first-in first-out, then the
    /// permanent override takes over.
    #[test]
    fn prop_once_queue_is_fifo(
        queued in prop::collection::vec(any::<u16>(), 0..20),
        fallback in any::<u16>(),
        extra in 1_usize..5,
    ) {
        let mock: MockFn<(), u16> = MockFn::default();
        mock.return_value_always(fallback);
        for &value in &queued {
            mock.return_value_once(value);
        }
        prop_assert_eq!(mock.queued_count(), queued.len());

        let seen: Vec<u16> = (0..queued.len() + extra).map(|_| mock.call(())).collect();
        let mut expected = queued.clone();
        expected.extend(std::iter::repeat(fallback).take(extra));
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(mock.queued_count(), 0);
    }

    /// Clearing keeps the most recent arguments and every override.
    #[test]
    fn prop_clear_keeps_last_call_and_overrides(
        args in prop::collection::vec(any::<i8>(), 1..20),
        value in any::<i8>(),
    ) {
        let mock: MockFn<(i8,), i8> = MockFn::default();
        mock.return_value_always(value);
        for &x in &args {
            mock.call((x,));
        }
        mock.clear();

        prop_assert!(!mock.called());
        prop_assert_eq!(mock.last_call(), args.last().map(|&x| (x,)));
        prop_assert_eq!(mock.call((0,)), value);
    }
}
