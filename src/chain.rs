use crate::promise::{Promise, Rejecter, Resolver};
use crate::Error;

impl<T: Clone + Send + 'static> Promise<T> {
    /// Chains handlers for both outcomes of this promise.
    ///
    /// `on_fulfill` maps the value; `on_reject` either passes an error on
    /// with `Err` or heals the chain with `Ok`. Exactly one of them runs, on
    /// the new promise's own thread, so a panicking handler rejects the new
    /// promise. This promise is left untouched and may be chained again.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::{Error, Promise};
    ///
    /// let doubled = Promise::resolve(21).then(|v| v * 2, Err);
    /// assert_eq!(doubled.await_promise(), Ok(42));
    ///
    /// let healed = Promise::<i32>::reject(Error::msg("nope")).then(|v| v * 2, |_| Ok(0));
    /// assert_eq!(healed.await_promise(), Ok(0));
    /// ```
    pub fn then<U, F, R>(&self, on_fulfill: F, on_reject: R) -> Promise<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
        R: FnOnce(Error) -> Result<U, Error> + Send + 'static,
    {
        let parent = self.clone();
        self.chain(move |resolve, reject| match parent.await_promise() {
            Ok(value) => resolve.resolve(on_fulfill(value)),
            Err(err) => settle(on_reject(err), &resolve, &reject),
        })
    }

    /// Like [`then`](Self::then), for a fulfillment handler that starts
    /// another promise. The new promise settles the way that one does.
    pub fn then_promise<U, F, R>(&self, on_fulfill: F, on_reject: R) -> Promise<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Promise<U> + Send + 'static,
        R: FnOnce(Error) -> Result<U, Error> + Send + 'static,
    {
        let parent = self.clone();
        self.chain(move |resolve, reject| match parent.await_promise() {
            Ok(value) => resolve.resolve_promise(on_fulfill(value)),
            Err(err) => settle(on_reject(err), &resolve, &reject),
        })
    }

    /// Handles a rejection. A fulfillment passes through and `on_reject`
    /// is never called.
    pub fn catch<R>(&self, on_reject: R) -> Promise<T>
    where
        R: FnOnce(Error) -> Result<T, Error> + Send + 'static,
    {
        let parent = self.clone();
        self.chain(move |resolve, reject| match parent.await_promise() {
            Ok(value) => resolve.resolve(value),
            Err(err) => settle(on_reject(err), &resolve, &reject),
        })
    }

    /// Runs `on_finally` once this promise settles, either way. The new
    /// promise settles exactly like this one; `on_finally` runs right after.
    pub fn finally<F>(&self, on_finally: F) -> Promise<T>
    where
        F: FnOnce() + Send + 'static,
    {
        let parent = self.clone();
        self.chain(move |resolve, reject| {
            settle(parent.await_promise(), &resolve, &reject);
            on_finally();
        })
    }

    fn chain<U, F>(&self, executor: F) -> Promise<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Resolver<U>, Rejecter<U>) + Send + 'static,
    {
        Promise::spawn(self.config.clone(), executor)
    }
}

fn settle<T: Clone + Send + 'static>(
    result: Result<T, Error>,
    resolve: &Resolver<T>,
    reject: &Rejecter<T>,
) {
    match result {
        Ok(value) => resolve.resolve(value),
        Err(err) => reject.reject(err),
    }
}
