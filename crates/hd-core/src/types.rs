//! Common data types for histdrift

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

/// Tri-state outcome of a compatibility check or of a matched item.
///
/// `Inconclusive` means "no check could be applied" (e.g. an empty reference
/// histogram). It is an expected, first-class outcome, not an error marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// All applicable evidence is compatible.
    Success,
    /// At least one applicable check found an incompatibility.
    Failure,
    /// No check could be applied.
    Inconclusive,
}

impl Status {
    /// Dominance rule over a set of outcomes: any `Failure` wins; otherwise
    /// any `Success` wins; otherwise `Inconclusive`.
    ///
    /// The rule is asymmetric on purpose: a single success among
    /// inconclusives promotes the set to `Success`, while a single failure
    /// demotes everything to `Failure`. Kept exactly as the product
    /// behavior requires; see DESIGN.md before changing it.
    pub fn aggregate<I>(outcomes: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        let mut any_success = false;
        for s in outcomes {
            match s {
                Status::Failure => return Status::Failure,
                Status::Success => any_success = true,
                Status::Inconclusive => {}
            }
        }
        if any_success {
            Status::Success
        } else {
            Status::Inconclusive
        }
    }

    /// True for `Status::Success`.
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

/// A compute-once cell for lazily derived, then immutable, attributes.
///
/// The first access runs the initializer; every later access returns the
/// cached value. Single-writer discipline: if item evaluation is ever
/// sharded across workers, each owning instance must stay confined to one
/// worker (there is no concurrent first-evaluation protection).
#[derive(Debug, Default)]
pub struct Memo<T>(OnceCell<T>);

impl<T> Memo<T> {
    /// Empty cell.
    pub fn new() -> Self {
        Memo(OnceCell::new())
    }

    /// Value, computing it on first access.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(init)
    }

    /// Value if already computed.
    pub fn get(&self) -> Option<&T> {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_failure_dominates() {
        let s = Status::aggregate([Status::Failure, Status::Success, Status::Inconclusive]);
        assert_eq!(s, Status::Failure);
    }

    #[test]
    fn test_aggregate_success_beats_inconclusive() {
        let s = Status::aggregate([Status::Success, Status::Inconclusive]);
        assert_eq!(s, Status::Success);
    }

    #[test]
    fn test_aggregate_all_inconclusive() {
        let s = Status::aggregate([Status::Inconclusive, Status::Inconclusive]);
        assert_eq!(s, Status::Inconclusive);
        assert_eq!(Status::aggregate(std::iter::empty::<Status>()), Status::Inconclusive);
    }

    #[test]
    fn test_memo_computes_once() {
        let cell: Memo<i32> = Memo::new();
        let mut calls = 0;
        let v1 = *cell.get_or_init(|| {
            calls += 1;
            42
        });
        let v2 = *cell.get_or_init(|| unreachable!("second init must not run"));
        assert_eq!(v1, 42);
        assert_eq!(v2, 42);
        assert_eq!(calls, 1);
        assert_eq!(cell.get(), Some(&42));
    }
}
