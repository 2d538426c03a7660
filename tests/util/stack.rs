use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use bstack::{ok_or, ConcurrentStack, EmptyStackError};
use crossbeam_queue::SegQueue;

pub fn test_sequential_concurrent_stack<S: ConcurrentStack<u64>>() {
    let stack = S::new();

    for i in 0..1_000 {
        stack.push(i);
    }

    for i in (0..1_000).rev() {
        assert_eq!(stack.pop(), Ok(i));
    }

    assert_eq!(stack.pop(), Err(EmptyStackError));
}

pub fn test_empty_concurrent_stack<S: ConcurrentStack<u64>>() {
    let stack = S::new();

    assert_eq!(stack.pop(), Err(EmptyStackError));

    stack.push(1);
    assert_eq!(stack.pop(), Ok(1));
    assert_eq!(stack.pop(), Err(EmptyStackError));
}

pub fn test_simple_concurrent_stack<S: Sync + ConcurrentStack<u64>>() {
    let stack = S::new();

    thread::scope(|scope| {
        for _ in 0..10 {
            scope.spawn(|| {
                for i in 0..1_000 {
                    stack.push(i);
                    // this thread's own push is still there, maybe below others' pushes
                    assert!(stack.pop().is_ok());
                }
            });
        }
    });

    assert!(stack.pop().is_err());
}

// `pusher_num * per_thread` distinct values pushed, `popper_num * per_thread` pops attempted
pub fn test_conservation_concurrent_stack<S: Sync + ConcurrentStack<u64>>(
    pusher_num: u64,
    popper_num: u64,
    per_thread: u64,
) {
    assert!(popper_num <= pusher_num);

    let stack = S::new();
    let popped = SegQueue::new();

    thread::scope(|scope| {
        for t in 0..pusher_num {
            let stack = &stack;

            scope.spawn(move || {
                for i in 0..per_thread {
                    stack.push(t * per_thread + i);
                }
            });
        }

        for _ in 0..popper_num {
            scope.spawn(|| {
                let mut count = 0;

                while count < per_thread {
                    let value = ok_or!(stack.pop(), {
                        thread::yield_now();
                        continue;
                    });

                    popped.push(value);
                    count += 1;
                }
            });
        }
    });

    let total = pusher_num * per_thread;
    let mut seen = HashSet::new();

    while let Some(value) = popped.pop() {
        assert!(value < total, "fabricated value {}", value);
        assert!(seen.insert(value), "value {} popped twice", value);
    }
    assert_eq!(seen.len() as u64, popper_num * per_thread);

    while let Ok(value) = stack.pop() {
        assert!(value < total, "fabricated value {}", value);
        assert!(seen.insert(value), "value {} popped twice", value);
    }
    assert_eq!(seen.len() as u64, total);
}

pub fn test_no_lost_update_concurrent_stack<S: Sync + ConcurrentStack<u64>>(
    thread_num: u64,
    per_thread: u64,
) {
    let stack = S::new();

    thread::scope(|scope| {
        for t in 0..thread_num {
            let stack = &stack;

            scope.spawn(move || {
                for i in 0..per_thread {
                    stack.push(t * per_thread + i);
                }
            });
        }
    });

    let mut result = Vec::new();
    while let Ok(value) = stack.pop() {
        result.push(value);
    }

    // each thread's values come out in reverse push order
    for t in 0..thread_num {
        let own = result
            .iter()
            .copied()
            .filter(|v| v / per_thread == t)
            .collect::<Vec<_>>();
        let expected = (t * per_thread..(t + 1) * per_thread).rev().collect::<Vec<_>>();

        assert_eq!(own, expected);
    }

    result.sort_unstable();
    assert_eq!(result, (0..thread_num * per_thread).collect::<Vec<_>>());
}

// two pushers of disjoint ranges and one popper that retries on an empty stack
pub fn test_two_pushers_one_popper<S: Sync + ConcurrentStack<u64>>() {
    let stack = S::new();
    let finished = AtomicUsize::new(0);

    let mut popped = thread::scope(|scope| {
        for range in [0..1_000, 1_000..2_000] {
            let stack = &stack;
            let finished = &finished;

            scope.spawn(move || {
                for i in range {
                    stack.push(i);
                }

                finished.fetch_add(1, Ordering::Release);
            });
        }

        let popper = scope.spawn(|| {
            let mut popped = Vec::new();

            loop {
                let done = finished.load(Ordering::Acquire) == 2;

                let value = ok_or!(stack.pop(), {
                    if done {
                        break;
                    }

                    thread::sleep(Duration::from_micros(100));
                    continue;
                });

                popped.push(value);
            }

            popped
        });

        popper.join().unwrap()
    });

    popped.sort_unstable();
    assert_eq!(popped, (0..2_000).collect::<Vec<_>>());
}
