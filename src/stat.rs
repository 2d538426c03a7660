use std::sync::atomic::{AtomicUsize, Ordering};

/// Operation counters of a concurrent stack.
///
/// Counters are updated with relaxed ordering, so a snapshot taken while other threads are running
/// is not a consistent cut.
#[derive(Debug, Default)]
pub struct StackStat {
    push: AtomicUsize,
    pop: AtomicUsize,
    push_conflict: AtomicUsize,
    pop_conflict: AtomicUsize,
    empty: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackStatSnapshot {
    /// successful pushes
    pub push: usize,
    /// successful pops
    pub pop: usize,
    /// failed CAS attempts while pushing
    pub push_conflict: usize,
    /// failed CAS attempts while popping
    pub pop_conflict: usize,
    /// pops that observed an empty stack
    pub empty: usize,
}

impl StackStat {
    pub(crate) fn add_push(&self) {
        self.push.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_pop(&self) {
        self.pop.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_push_conflict(&self) {
        self.push_conflict.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_pop_conflict(&self) {
        self.pop_conflict.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StackStatSnapshot {
        StackStatSnapshot {
            push: self.push.load(Ordering::Relaxed),
            pop: self.pop.load(Ordering::Relaxed),
            push_conflict: self.push_conflict.load(Ordering::Relaxed),
            pop_conflict: self.pop_conflict.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
        }
    }
}

impl StackStatSnapshot {
    /// Number of values the stack should hold once all operations have finished.
    ///
    /// A push is counted after its CAS, so a snapshot taken mid-run may see a pop of a value whose
    /// push is not counted yet. The difference saturates at zero in that case.
    pub fn remaining(&self) -> usize {
        self.push.saturating_sub(self.pop)
    }

    pub fn conflicts(&self) -> usize {
        self.push_conflict + self.pop_conflict
    }
}
