//! Settle-once promises backed by OS threads.
//!
//! A [`Promise`] runs its executor on a thread of its own and settles exactly
//! once, either fulfilled with a value or rejected with an [`Error`]. The
//! settlement is broadcast: any number of chained promises and blocking or
//! async waiters observe the same result.
//!
//! # Examples
//!
//! ```
//! use promise_chain::Promise;
//!
//! let promise = Promise::new(|resolve, _reject| resolve.resolve(3))
//!     .then(|value| value + 1, Err)
//!     .catch(|_| Ok(0));
//!
//! assert_eq!(promise.await_promise(), Ok(4));
//! ```
use std::sync::Arc;

mod chain;
mod config;
mod panic;
mod promise;
mod state;

pub use config::Config;
pub use promise::{Promise, Rejecter, Resolver};
pub use state::State;

/// Why a promise was rejected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Rejected by an executor or a handler.
    #[error("{0}")]
    Rejected(Arc<dyn std::error::Error + Send + Sync>),
    #[error("panic recovery with nil error")]
    PanicNil,
    #[error("panic recovery with error: {0}")]
    PanicError(String),
    #[error("panic recovery with unknown error: {0}")]
    PanicUnknown(String),
    /// Every resolver was dropped while the promise was still pending.
    #[error("promise abandoned without being settled")]
    Abandoned,
    /// A promise was resolved with itself.
    #[error("promise resolved with itself")]
    Cycle,
    #[error("failed to spawn executor thread: {0}")]
    Spawn(String),
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl Error {
    /// Wraps any error as a rejection reason.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Rejected(Arc::new(err))
    }

    /// A rejection reason carrying only a message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Error::new(Message(msg.into()))
    }
}

/// Two rejections compare equal when they are the same shared error or
/// when their messages match, whatever the underlying error types are.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Rejected(a), Error::Rejected(b)) => {
                Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
            }
            (Error::PanicNil, Error::PanicNil) => true,
            (Error::PanicError(a), Error::PanicError(b)) => a == b,
            (Error::PanicUnknown(a), Error::PanicUnknown(b)) => a == b,
            (Error::Abandoned, Error::Abandoned) => true,
            (Error::Cycle, Error::Cycle) => true,
            (Error::Spawn(a), Error::Spawn(b)) => a == b,
            _ => false,
        }
    }
}
