//! Assertions over recorded calls.

use crate::deferred::MockReturn;
use crate::engine::MockFn;
use crate::result::{MockError, MockResult};
use crate::spy::Spy;
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a `Result`, failing with [`MockError::AssertionFailed`]
    pub fn into_result(self) -> MockResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(MockError::assertion_failed(self.message))
        }
    }

    /// Panic with the failure message if the assertion failed
    ///
    /// # Panics
    ///
    /// Panics when `passed` is false.
    pub fn unwrap(self) {
        assert!(self.passed, "{}", self.message);
    }
}

/// Read access to a call ledger, shared by mocks and spies
pub trait CallRecord {
    /// Argument tuple
    type Args;
    /// Return type
    type Output;

    /// Display name for messages
    fn record_name(&self) -> String;

    /// Arguments of every recorded call
    fn recorded_calls(&self) -> Vec<Self::Args>;

    /// Returned values, `None` where the call did not return
    fn recorded_returns(&self) -> Vec<Option<Self::Output>>;

    /// Global invocation stamps
    fn recorded_order(&self) -> Vec<u64>;
}

impl<A, R, C> CallRecord for MockFn<A, R, C>
where
    A: Clone + 'static,
    R: MockReturn,
    C: Clone + 'static,
{
    type Args = A;
    type Output = R;

    fn record_name(&self) -> String {
        self.name()
    }

    fn recorded_calls(&self) -> Vec<A> {
        self.calls()
    }

    fn recorded_returns(&self) -> Vec<Option<R>> {
        self.returns()
    }

    fn recorded_order(&self) -> Vec<u64> {
        self.invocation_order()
    }
}

impl<A, R> CallRecord for Spy<A, R>
where
    A: Clone + 'static,
    R: MockReturn,
{
    type Args = A;
    type Output = R;

    fn record_name(&self) -> String {
        self.name()
    }

    fn recorded_calls(&self) -> Vec<A> {
        self.calls()
    }

    fn recorded_returns(&self) -> Vec<Option<R>> {
        self.returns()
    }

    fn recorded_order(&self) -> Vec<u64> {
        self.invocation_order()
    }
}

/// Assertion helpers for mocks and spies
#[derive(Debug, Clone, Copy)]
pub struct MockAssertion;

impl MockAssertion {
    /// At least one call was recorded
    #[must_use]
    pub fn called<M: CallRecord>(mock: &M) -> AssertionResult {
        if mock.recorded_calls().is_empty() {
            AssertionResult::fail(format!("expected {} to be called", mock.record_name()))
        } else {
            AssertionResult::pass()
        }
    }

    /// No call was recorded
    #[must_use]
    pub fn not_called<M: CallRecord>(mock: &M) -> AssertionResult {
        let count = mock.recorded_calls().len();
        if count == 0 {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected {} not to be called, got {count} calls",
                mock.record_name()
            ))
        }
    }

    /// Exactly `expected` calls were recorded
    #[must_use]
    pub fn called_times<M: CallRecord>(mock: &M, expected: usize) -> AssertionResult {
        let count = mock.recorded_calls().len();
        if count == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected {} to be called {expected} times, got {count}",
                mock.record_name()
            ))
        }
    }

    /// Some recorded call received `args`
    #[must_use]
    pub fn called_with<M>(mock: &M, args: &M::Args) -> AssertionResult
    where
        M: CallRecord,
        M::Args: PartialEq + Debug,
    {
        let calls = mock.recorded_calls();
        if calls.iter().any(|call| call == args) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected {} to be called with {args:?}, calls were {calls:?}",
                mock.record_name()
            ))
        }
    }

    /// The most recent recorded call received `args`
    #[must_use]
    pub fn last_called_with<M>(mock: &M, args: &M::Args) -> AssertionResult
    where
        M: CallRecord,
        M::Args: PartialEq + Debug,
    {
        match mock.recorded_calls().last() {
            Some(last) if last == args => AssertionResult::pass(),
            Some(last) => AssertionResult::fail(format!(
                "expected last call of {} to be {args:?}, got {last:?}",
                mock.record_name()
            )),
            None => AssertionResult::fail(format!(
                "expected last call of {} to be {args:?}, but it was never called",
                mock.record_name()
            )),
        }
    }

    /// The `nth` recorded call (1-based) received `args`
    #[must_use]
    pub fn nth_called_with<M>(mock: &M, nth: usize, args: &M::Args) -> AssertionResult
    where
        M: CallRecord,
        M::Args: PartialEq + Debug,
    {
        let calls = mock.recorded_calls();
        match nth.checked_sub(1).and_then(|index| calls.get(index)) {
            Some(call) if call == args => AssertionResult::pass(),
            Some(call) => AssertionResult::fail(format!(
                "expected call #{nth} of {} to be {args:?}, got {call:?}",
                mock.record_name()
            )),
            None => AssertionResult::fail(format!(
                "expected call #{nth} of {}, only {} recorded",
                mock.record_name(),
                calls.len()
            )),
        }
    }

    /// Some recorded call returned `value`
    #[must_use]
    pub fn returned_with<M>(mock: &M, value: &M::Output) -> AssertionResult
    where
        M: CallRecord,
        M::Output: PartialEq + Debug,
    {
        let returns = mock.recorded_returns();
        if returns.iter().flatten().any(|returned| returned == value) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected {} to return {value:?}, returns were {returns:?}",
                mock.record_name()
            ))
        }
    }

    /// The first call of `first` happened before the first call of `second`
    #[must_use]
    pub fn called_before<M: CallRecord, N: CallRecord>(first: &M, second: &N) -> AssertionResult {
        let first_stamp = first.recorded_order().first().copied();
        let second_stamp = second.recorded_order().first().copied();
        match (first_stamp, second_stamp) {
            (Some(a), Some(b)) if a < b => AssertionResult::pass(),
            (Some(_), Some(_)) => AssertionResult::fail(format!(
                "expected {} to be called before {}",
                first.record_name(),
                second.record_name()
            )),
            _ => AssertionResult::fail(format!(
                "expected both {} and {} to be called",
                first.record_name(),
                second.record_name()
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::mock_fn;
    use crate::spy::spy;

    fn add() -> MockFn<(i32, i32), i32> {
        mock_fn(|(a, b)| a + b)
    }

    #[test]
    fn test_into_result() {
        assert!(AssertionResult::pass().into_result().is_ok());
        let err = AssertionResult::fail("nope").into_result().unwrap_err();
        assert!(matches!(err, MockError::AssertionFailed { .. }));
    }

    #[test]
    #[should_panic(expected = "expected mock to be called")]
    fn test_unwrap_panics_on_failure() {
        MockAssertion::called(&add()).unwrap();
    }

    #[test]
    fn test_call_count_assertions() {
        let mock = add();
        assert!(MockAssertion::not_called(&mock).passed);
        mock.call((1, 2));
        assert!(MockAssertion::called(&mock).passed);
        assert!(MockAssertion::called_times(&mock, 1).passed);

        let failed = MockAssertion::called_times(&mock, 3);
        assert!(!failed.passed);
        assert!(failed.message.contains("called 3 times, got 1"));
    }

    #[test]
    fn test_argument_assertions() {
        let mock = add();
        mock.set_name("add");
        mock.call((1, 2));
        mock.call((3, 4));

        assert!(MockAssertion::called_with(&mock, &(1, 2)).passed);
        assert!(!MockAssertion::called_with(&mock, &(9, 9)).passed);
        assert!(MockAssertion::last_called_with(&mock, &(3, 4)).passed);
        assert!(MockAssertion::nth_called_with(&mock, 1, &(1, 2)).passed);

        let out_of_range = MockAssertion::nth_called_with(&mock, 3, &(1, 2));
        assert!(out_of_range.message.contains("only 2 recorded"));
        assert!(!MockAssertion::nth_called_with(&mock, 0, &(1, 2)).passed);
    }

    #[test]
    fn test_returned_with() {
        let mock = add();
        mock.call((2, 2));
        assert!(MockAssertion::returned_with(&mock, &4).passed);
        assert!(!MockAssertion::returned_with(&mock, &5).passed);
    }

    #[test]
    fn test_called_before_across_mock_and_spy() {
        let mock = add();
        let spied = spy(|(): ()| true);

        assert!(!MockAssertion::called_before(&mock, &spied).passed);
        mock.call((0, 0));
        spied.call(());

        assert!(MockAssertion::called_before(&mock, &spied).passed);
        assert!(!MockAssertion::called_before(&spied, &mock).passed);
    }
}
