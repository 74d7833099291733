use std::thread;

/// How executor threads are spawned.
///
/// Promises built by [`then`](crate::Promise::then) and the other
/// combinators reuse the configuration of the promise they were chained on.
///
/// # Examples
///
/// ```
/// use promise_chain::{Config, Promise};
///
/// let config = Config::default().thread_name("fetch").stack_size(256 * 1024);
/// let promise = Promise::with_config(config, |resolve, _| {
///     resolve.resolve(std::thread::current().name().map(str::to_owned))
/// });
/// assert_eq!(promise.await_promise(), Ok(Some("fetch".to_owned())));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    thread_name: Option<String>,
    stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread_name: Some("promise-executor".to_owned()),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// Leaves executor threads unnamed.
    pub fn unnamed(mut self) -> Self {
        self.thread_name = None;
        self
    }

    /// Stack size in bytes. The platform default is used when unset.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub(crate) fn builder(&self) -> thread::Builder {
        let mut builder = thread::Builder::new();
        if let Some(name) = &self.thread_name {
            builder = builder.name(name.clone());
        }
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }
        builder
    }
}
