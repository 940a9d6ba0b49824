//! Controlled/uncontrolled state slices.
//!
//! Every piece of table state (sorting, filters, visibility, selection,
//! pagination) is a [`Slice`]. Whether the table or its caller owns the value
//! is decided once per set of options by [`SliceSource::resolve`] and is an
//! explicit value rather than a presence check scattered through the engine.

use crate::callback::{Callback, Updater};

/// Where a slice's authoritative value lives.
#[derive(Debug, Clone)]
pub enum SliceSource<T> {
    /// The caller owns the value; writes are forwarded, never stored.
    Controlled { value: T, on_change: Callback<T> },
    /// The table owns the value. `initial` seeds it at construction and any
    /// supplied callback is still notified of changes.
    Uncontrolled {
        initial: Option<T>,
        on_change: Option<Callback<T>>,
    },
}

impl<T> SliceSource<T> {
    /// Decide ownership from the optional value/callback pair.
    ///
    /// A slice is controlled only when both are present. A value without a
    /// callback degrades to an uncontrolled slice seeded with that value.
    pub fn resolve(name: &str, value: Option<T>, on_change: Option<Callback<T>>) -> Self {
        match (value, on_change) {
            (Some(value), Some(on_change)) => SliceSource::Controlled { value, on_change },
            (Some(value), None) => {
                log::warn!("{name}: value supplied without a change callback, treating as uncontrolled");
                SliceSource::Uncontrolled {
                    initial: Some(value),
                    on_change: None,
                }
            }
            (None, on_change) => SliceSource::Uncontrolled {
                initial: None,
                on_change,
            },
        }
    }

    /// Check whether the caller owns this slice.
    pub fn is_controlled(&self) -> bool {
        matches!(self, SliceSource::Controlled { .. })
    }

    fn callback(&self) -> Option<&Callback<T>> {
        match self {
            SliceSource::Controlled { on_change, .. } => Some(on_change),
            SliceSource::Uncontrolled { on_change, .. } => on_change.as_ref(),
        }
    }
}

/// A callback invocation deferred until the engine lock is released.
#[derive(Debug)]
pub struct Notify<T> {
    callback: Callback<T>,
    value: T,
}

impl<T> Notify<T> {
    /// Deliver the value to the callback.
    pub fn fire(self) {
        self.callback.call(self.value);
    }
}

/// One state slice: the internal copy plus its resolved source.
#[derive(Debug, Clone)]
pub struct Slice<T> {
    name: &'static str,
    internal: T,
    source: SliceSource<T>,
}

impl<T: Clone> Slice<T> {
    /// Create a slice, seeding the internal value from the source's initial
    /// value or `default`.
    pub fn new(name: &'static str, default: T, source: SliceSource<T>) -> Self {
        let internal = match &source {
            SliceSource::Uncontrolled {
                initial: Some(initial),
                ..
            } => initial.clone(),
            _ => default,
        };
        Self {
            name,
            internal,
            source,
        }
    }

    /// The value the table renders.
    pub fn value(&self) -> &T {
        match &self.source {
            SliceSource::Controlled { value, .. } => value,
            SliceSource::Uncontrolled { .. } => &self.internal,
        }
    }

    /// Check whether the caller owns this slice.
    pub fn is_controlled(&self) -> bool {
        self.source.is_controlled()
    }

    /// Compute the next value and route it to its owner.
    ///
    /// Controlled slices keep rendering the caller's value until the caller
    /// feeds the next one back through new options. Returns the next value and
    /// the notification to fire once the engine lock is released.
    pub fn apply(&mut self, updater: Updater<T>) -> (T, Option<Notify<T>>) {
        let next = updater.apply(self.value());
        if !self.is_controlled() {
            self.internal = next.clone();
        }
        log::debug!(
            "{}: change ({})",
            self.name,
            if self.is_controlled() { "controlled" } else { "uncontrolled" }
        );
        let notify = self.source.callback().map(|callback| Notify {
            callback: callback.clone(),
            value: next.clone(),
        });
        (next, notify)
    }

    /// Swap in a freshly resolved source on re-render.
    ///
    /// Internal state survives. A slice leaving controlled mode continues from
    /// the last value its owner supplied.
    pub fn resync(&mut self, source: SliceSource<T>) {
        if let SliceSource::Controlled { value, .. } = &self.source
            && !source.is_controlled()
        {
            self.internal = value.clone();
        }
        self.source = source;
    }
}
