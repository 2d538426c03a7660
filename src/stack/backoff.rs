/*
 Unbounded lock-free LIFO stack. Pushes and pops synchronize at a single location (`top`) with
 CAS, and a failed CAS is followed by a randomized exponential backoff.
 Refer to Herlihy & Shavit, "The Art of Multiprocessor Programming", 11.2.
*/

use std::{mem::ManuallyDrop, ptr, sync::atomic::Ordering};

use crossbeam_epoch::{pin, unprotected, Atomic, Guard, Owned};
use crossbeam_utils::CachePadded;
use tracing::trace;

use crate::{
    backoff::{Backoff, BackoffConfig},
    error::EmptyStackError,
};
#[cfg(feature = "concurrent_stat")]
use crate::stat::{StackStat, StackStatSnapshot};

use super::ConcurrentStack;

pub struct BackoffStack<V> {
    top: CachePadded<Atomic<Node<V>>>,
    config: BackoffConfig,
    #[cfg(feature = "concurrent_stat")]
    stat: StackStat,
}

struct Node<V> {
    value: ManuallyDrop<V>,
    next: Atomic<Node<V>>,
}

impl<V> Node<V> {
    fn new(value: V) -> Self {
        Self {
            value: ManuallyDrop::new(value),
            next: Atomic::null(),
        }
    }
}

// A value is only ever reached by the single thread whose CAS unlinked its node.
unsafe impl<V: Send> Send for BackoffStack<V> {}
unsafe impl<V: Send> Sync for BackoffStack<V> {}

impl<V> BackoffStack<V> {
    pub fn new() -> Self {
        Self::with_config(BackoffConfig::default())
    }

    pub fn with_config(config: BackoffConfig) -> Self {
        Self {
            top: CachePadded::new(Atomic::null()),
            config,
            #[cfg(feature = "concurrent_stat")]
            stat: StackStat::default(),
        }
    }

    pub fn config(&self) -> BackoffConfig {
        self.config
    }

    /// Racy snapshot: another thread may push or pop right after it is taken.
    pub fn is_empty(&self) -> bool {
        let guard = pin();

        self.top.load(Ordering::Relaxed, &guard).is_null()
    }

    #[cfg(feature = "concurrent_stat")]
    pub fn stat(&self) -> StackStatSnapshot {
        self.stat.snapshot()
    }

    /// Link `node` on top of the currently observed top.
    ///
    /// On a lost race the node is handed back so that the caller can retry with it.
    fn try_push(&self, mut node: Owned<Node<V>>, guard: &Guard) -> Result<(), Owned<Node<V>>> {
        let top = self.top.load(Ordering::Relaxed, guard);
        node.next.store(top, Ordering::Relaxed);

        match self
            .top
            .compare_exchange(top, node, Ordering::Release, Ordering::Relaxed, guard)
        {
            Ok(_) => Ok(()),
            Err(e) => Err(e.new),
        }
    }

    /// Unlink the currently observed top.
    ///
    /// Returns `Ok(None)` on a lost race, and fails only if the observed top is null.
    ///
    /// `guard` must stay pinned until the call returns; `pop` pins one per attempt.
    fn try_pop(&self, guard: &Guard) -> Result<Option<V>, EmptyStackError> {
        let top = self.top.load(Ordering::Acquire, guard);
        // SAFETY: `top` was loaded under `guard`, which the caller keeps pinned for the whole
        // attempt. A concurrent pop may unlink this node, but it only defers the free, so the
        // memory outlives `guard` and reading `next` is sound even after a lost race.
        let node = unsafe { top.as_ref() }.ok_or(EmptyStackError)?;
        let next = node.next.load(Ordering::Relaxed, guard);

        if self
            .top
            .compare_exchange(top, next, Ordering::Relaxed, Ordering::Relaxed, guard)
            .is_err()
        {
            return Ok(None);
        }

        // The CAS succeeded, so `top` is unreachable for new readers and this thread is the only
        // one that takes its value. Threads that loaded it earlier keep the memory alive through
        // their own guards until they unpin.
        unsafe {
            guard.defer_destroy(top);
            Ok(Some(ManuallyDrop::into_inner(ptr::read(&node.value))))
        }
    }
}

impl<V> ConcurrentStack<V> for BackoffStack<V> {
    fn new() -> Self {
        BackoffStack::new()
    }

    fn push(&self, value: V) {
        let mut node = Owned::new(Node::new(value));
        let mut backoff = Backoff::new(self.config);

        loop {
            // do not stay pinned while sleeping, or the epoch cannot advance
            let result = {
                let guard = pin();
                self.try_push(node, &guard)
            };

            match result {
                Ok(()) => break,
                Err(n) => node = n,
            }

            #[cfg(feature = "concurrent_stat")]
            self.stat.add_push_conflict();

            backoff.snooze();
        }

        #[cfg(feature = "concurrent_stat")]
        self.stat.add_push();
    }

    fn pop(&self) -> Result<V, EmptyStackError> {
        let mut backoff = Backoff::new(self.config);

        loop {
            let result = {
                let guard = pin();
                self.try_pop(&guard)
            };

            match result {
                Ok(Some(value)) => {
                    #[cfg(feature = "concurrent_stat")]
                    self.stat.add_pop();

                    return Ok(value);
                }
                Ok(None) => {
                    #[cfg(feature = "concurrent_stat")]
                    self.stat.add_pop_conflict();
                }
                Err(e) => {
                    trace!("pop observed an empty stack");

                    #[cfg(feature = "concurrent_stat")]
                    self.stat.add_empty();

                    return Err(e);
                }
            }

            backoff.snooze();
        }
    }
}

impl<V> Default for BackoffStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for BackoffStack<V> {
    fn drop(&mut self) {
        unsafe {
            let guard = unprotected();
            let mut top = self.top.load(Ordering::Relaxed, guard);

            while let Some(node) = top.as_ref() {
                let next = node.next.load(Ordering::Relaxed, guard);

                let mut owned = top.into_owned();
                ManuallyDrop::drop(&mut owned.value);

                top = next;
            }
        }
    }
}
