use thiserror::Error;

/// Returned by `pop` when the attempt observes an empty stack.
///
/// This is an ordinary outcome under concurrency: another thread may push right after, so callers
/// usually retry or move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stack is empty")]
pub struct EmptyStackError;
