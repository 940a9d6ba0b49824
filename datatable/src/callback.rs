//! Change callbacks and state updaters.

use std::fmt;
use std::sync::Arc;

/// A shared change callback.
///
/// Cheap to clone. Callbacks are always invoked outside the engine lock, so a
/// callback may read or update the table it was registered on.
pub struct Callback<T>(Arc<dyn Fn(T) + Send + Sync>);

impl<T> Callback<T> {
    /// Wrap a closure.
    pub fn new(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, value: T) {
        (self.0)(value)
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Next value for a state slice: either a replacement or a function of the
/// current value.
pub enum Updater<T> {
    Set(T),
    Update(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Updater<T> {
    /// Build an updater from a closure over the current value.
    pub fn with(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Updater::Update(Box::new(f))
    }

    /// Resolve the next value against `current`.
    pub fn apply(self, current: &T) -> T {
        match self {
            Updater::Set(value) => value,
            Updater::Update(f) => f(current),
        }
    }
}

impl<T> From<T> for Updater<T> {
    fn from(value: T) -> Self {
        Updater::Set(value)
    }
}

impl From<&str> for Updater<String> {
    fn from(value: &str) -> Self {
        Updater::Set(value.to_string())
    }
}

impl<T: fmt::Debug> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Updater::Set(value) => f.debug_tuple("Set").field(value).finish(),
            Updater::Update(_) => f.write_str("Update(..)"),
        }
    }
}
