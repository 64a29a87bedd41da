use std::sync::Arc;

use crate::Update;

/// A partial projection `Update -> Option<T>`, supplied by the user to
/// describe what a scenario step is waiting for.
///
/// `Expect` values are cheap to clone (an `Arc` around the closure) so the
/// same expectation can be reused across scenario instances.
pub struct Expect<T> {
    f: Arc<dyn Fn(&Update) -> Option<T> + Send + Sync>,
}

impl<T> Clone for Expect<T> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<T> Expect<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Update) -> Option<T> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    pub fn eval(&self, update: &Update) -> Option<T> {
        (self.f)(update)
    }
}

impl<T: Send + Sync + 'static> Expect<T> {
    /// Narrow this expectation with an extra predicate over the matched
    /// value. Fails to match (falls through) when the predicate is false.
    pub fn when<P>(self, predicate: P) -> Expect<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Expect::new(move |u| self.eval(u).filter(|v| predicate(v)))
    }

    /// Transform a matched value.
    pub fn map<U, F>(self, f: F) -> Expect<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Expect::new(move |u| self.eval(u).map(&f))
    }

    /// Kleisli composition: transform a matched value into another partial
    /// projection over the *same* update.
    pub fn and_then<U, F>(self, f: F) -> Expect<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        Expect::new(move |u| self.eval(u).and_then(&f))
    }

    /// Try this expectation, falling back to `other` if it doesn't match.
    pub fn or(self, other: Expect<T>) -> Expect<T> {
        Expect::new(move |u| self.eval(u).or_else(|| other.eval(u)))
    }
}
