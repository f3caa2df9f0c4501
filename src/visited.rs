//! C1: Visited Set — mutually-excluding "first-seen" test over titles.

use dashmap::DashSet;

use crate::types::Title;

/// Concurrency-safe set of titles with an atomic test-and-insert.
///
/// `DashSet::insert` already is the single atomic step the spec requires: a
/// two-phase contains-then-insert would let two workers both see "absent"
/// and both fetch the same title.
#[derive(Default)]
pub struct VisitedSet {
    set: DashSet<Title>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self { set: DashSet::new() }
    }

    /// Returns `true` if `title` was already present (caller should skip
    /// work); otherwise inserts it and returns `false`.
    pub fn mark(&self, title: &Title) -> bool {
        !self.set.insert(title.clone())
    }

    /// Current cardinality. Monotonic within a job; may lag the true size
    /// by at most one in-flight `mark`.
    pub fn size(&self) -> usize {
        self.set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_mark_returns_false() {
        let v = VisitedSet::new();
        assert!(!v.mark(&"Mike Tyson".to_string()));
        assert_eq!(v.size(), 1);
    }

    #[test]
    fn second_mark_returns_true() {
        let v = VisitedSet::new();
        assert!(!v.mark(&"AAA".to_string()));
        assert!(v.mark(&"AAA".to_string()));
        assert_eq!(v.size(), 1);
    }

    #[test]
    fn concurrent_marks_admit_exactly_one_winner() {
        use std::sync::Arc;

        let v = Arc::new(VisitedSet::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let v = v.clone();
            handles.push(std::thread::spawn(move || v.mark(&"Ukraine".to_string())));
        }
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|already| !**already).count(), 1);
        assert_eq!(v.size(), 1);
    }
}
