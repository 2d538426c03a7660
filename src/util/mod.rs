/// Unwrap a `Result`, or evaluate `$err` (typically `continue`, `break` or `return`) on `Err`.
///
/// Meant for callers retrying `pop` on `EmptyStackError`, e.g. consumer loops in tests and
/// benchmarks. The stack's own retry loops keep the error value and do not use it.
#[macro_export]
macro_rules! ok_or {
    ($e:expr, $err:expr) => {{
        match $e {
            Ok(r) => r,
            Err(_) => $err,
        }
    }};
}
