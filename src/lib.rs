pub mod backoff;
pub mod error;
#[cfg(feature = "concurrent_stat")]
pub mod stat;
pub mod stack;
pub mod util;

pub use backoff::{Backoff, BackoffConfig};
pub use error::EmptyStackError;
pub use stack::{BackoffStack, ConcurrentStack};
