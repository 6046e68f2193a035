//! Call ledger: one entry per invocation, in call order.

use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// How a mock was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// Ordinary call, with or without a bound receiver
    Call,
    /// Constructor-style call producing a fresh receiver
    Construct,
}

/// One recorded invocation
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry<A, R, C> {
    /// Arguments as received
    pub args: A,
    /// Receiver bound at call time, `None` for an unbound call
    pub context: Option<C>,
    /// Ordinary call or construction
    pub kind: CallKind,
    /// The freshly created receiver, for constructor-style calls
    pub instance: Option<C>,
    /// How the call ended
    pub outcome: Outcome<R>,
    /// Global invocation stamp
    pub order: u64,
}

/// Ordered, append-until-cleared record of invocations
#[derive(Debug, Clone)]
pub(crate) struct Ledger<A, R, C> {
    entries: Vec<LedgerEntry<A, R, C>>,
}

impl<A, R, C> Default for Ledger<A, R, C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A, R, C> Ledger<A, R, C> {
    pub(crate) fn push(&mut self, entry: LedgerEntry<A, R, C>) {
        self.entries.push(entry);
    }

    /// Replace the outcome of the entry stamped `order`. The entry may be
    /// gone if the ledger was cleared while the call was running.
    pub(crate) fn settle(&mut self, order: u64, outcome: Outcome<R>) -> bool {
        match self.entries.iter_mut().rev().find(|e| e.order == order) {
            Some(entry) => {
                entry.outcome = outcome;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries(&self) -> &[LedgerEntry<A, R, C>] {
        &self.entries
    }
}

impl<A: Clone, R: Clone, C: Clone> Ledger<A, R, C> {
    pub(crate) fn calls(&self) -> Vec<A> {
        self.entries.iter().map(|e| e.args.clone()).collect()
    }

    pub(crate) fn contexts(&self) -> Vec<Option<C>> {
        self.entries.iter().map(|e| e.context.clone()).collect()
    }

    pub(crate) fn instances(&self) -> Vec<Option<C>> {
        self.entries.iter().map(|e| e.instance.clone()).collect()
    }

    pub(crate) fn results(&self) -> Vec<Outcome<R>> {
        self.entries.iter().map(|e| e.outcome.clone()).collect()
    }

    pub(crate) fn returns(&self) -> Vec<Option<R>> {
        self.entries
            .iter()
            .map(|e| e.outcome.value().cloned())
            .collect()
    }

    pub(crate) fn invocation_order(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.order).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(arg: i32, order: u64) -> LedgerEntry<(i32,), i32, ()> {
        LedgerEntry {
            args: (arg,),
            context: None,
            kind: CallKind::Call,
            instance: None,
            outcome: Outcome::Pending,
            order,
        }
    }

    #[test]
    fn test_settle_by_stamp() {
        let mut ledger = Ledger::default();
        ledger.push(entry(1, 10));
        ledger.push(entry(2, 11));

        assert!(ledger.settle(10, Outcome::Success(2)));
        assert!(ledger.settle(11, Outcome::Thrown("bad".to_string())));

        assert_eq!(ledger.returns(), vec![Some(2), None]);
        assert_eq!(ledger.invocation_order(), vec![10, 11]);
    }

    #[test]
    fn test_settle_after_clear_is_ignored() {
        let mut ledger = Ledger::default();
        ledger.push(entry(1, 5));
        ledger.clear();
        assert!(!ledger.settle(5, Outcome::Success(1)));
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_projections_align() {
        let mut ledger = Ledger::default();
        for (i, order) in (1..=3).zip(20..) {
            ledger.push(entry(i, order));
        }
        assert_eq!(ledger.calls(), vec![(1,), (2,), (3,)]);
        assert_eq!(ledger.contexts(), vec![None, None, None]);
        assert_eq!(ledger.instances().len(), 3);
        assert!(ledger.results().iter().all(Outcome::is_pending));
    }

    #[test]
    fn test_call_kind_serde() {
        assert_eq!(
            serde_json::to_string(&CallKind::Construct).unwrap(),
            "\"construct\""
        );
    }
}
