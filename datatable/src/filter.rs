//! Debounced search text.
//!
//! The [`FilterController`] keeps a local text buffer that follows every
//! keystroke, and forwards it to its owner only after the input has been idle
//! for the debounce delay. The delay runs on a [`DebounceTimer`], a tokio task
//! raced against a cancellation token; dropping or re-arming the timer cancels
//! it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::callback::Callback;

// =============================================================================
// DebounceTimer
// =============================================================================

/// A cancellable one-shot timer. Cancelled when dropped.
#[derive(Debug)]
pub struct DebounceTimer {
    token: CancellationToken,
}

impl DebounceTimer {
    /// Run `f` after `delay` unless cancelled first.
    ///
    /// Returns `None` when called outside a tokio runtime.
    pub fn start(delay: Duration, f: impl FnOnce() + Send + 'static) -> Option<Self> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let token = CancellationToken::new();
        let child = token.clone();
        handle.spawn(async move {
            tokio::select! {
                biased;
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    // Mark finished before running so `is_pending` is false
                    // inside `f`.
                    child.cancel();
                    f();
                }
            }
        });
        Some(Self { token })
    }

    /// Cancel the timer if it has not fired.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the timer is still waiting.
    pub fn is_pending(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// =============================================================================
// FilterController
// =============================================================================

#[derive(Debug, Default)]
struct FilterText {
    /// What the input shows.
    buffer: String,
    /// Last value the owner has seen, either from us or from outside.
    acknowledged: String,
}

/// Debounced search input bound to an external value.
///
/// All methods take `&self`; the callback is never invoked with an internal
/// lock held.
#[derive(Debug)]
pub struct FilterController {
    text: Arc<Mutex<FilterText>>,
    timer: Mutex<Option<DebounceTimer>>,
    delay: Duration,
    on_change: Callback<String>,
}

impl FilterController {
    pub fn new(initial: impl Into<String>, delay: Duration, on_change: Callback<String>) -> Self {
        let initial = initial.into();
        Self {
            text: Arc::new(Mutex::new(FilterText {
                buffer: initial.clone(),
                acknowledged: initial,
            })),
            timer: Mutex::new(None),
            delay,
            on_change,
        }
    }

    /// Current contents of the input.
    pub fn buffer(&self) -> String {
        self.text
            .lock()
            .map(|t| t.buffer.clone())
            .unwrap_or_default()
    }

    /// Check if a debounced change is waiting to be forwarded.
    pub fn has_pending(&self) -> bool {
        self.timer
            .lock()
            .map(|t| t.as_ref().is_some_and(DebounceTimer::is_pending))
            .unwrap_or(false)
    }

    /// Reconcile with the owner's value.
    ///
    /// A value different from the last acknowledged one replaces the buffer
    /// and drops any pending local edit. Re-supplying the same value leaves
    /// in-progress typing alone.
    pub fn sync_external(&self, value: &str) {
        let changed = match self.text.lock() {
            Ok(mut text) if text.acknowledged != value => {
                text.acknowledged = value.to_string();
                text.buffer = value.to_string();
                true
            }
            _ => false,
        };
        if changed {
            self.replace_timer(None);
        }
    }

    /// Record a keystroke and (re)start the debounce delay.
    pub fn input(&self, value: impl Into<String>) {
        if let Ok(mut text) = self.text.lock() {
            text.buffer = value.into();
        }
        // Cancel the previous timer before arming the next one.
        self.replace_timer(None);

        let text = Arc::clone(&self.text);
        let on_change = self.on_change.clone();
        match DebounceTimer::start(self.delay, move || flush(&text, &on_change)) {
            Some(timer) => self.replace_timer(Some(timer)),
            None => {
                log::debug!("filter: no runtime for debounce, forwarding immediately");
                flush(&self.text, &self.on_change);
            }
        }
    }

    /// Clear the input, bypassing the debounce.
    pub fn clear(&self) {
        self.replace_timer(None);
        let forward = match self.text.lock() {
            Ok(mut text) => {
                text.buffer.clear();
                if text.acknowledged.is_empty() {
                    false
                } else {
                    text.acknowledged.clear();
                    true
                }
            }
            Err(_) => false,
        };
        if forward {
            self.on_change.call(String::new());
        }
    }

    fn replace_timer(&self, timer: Option<DebounceTimer>) {
        let previous = match self.timer.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, timer),
            Err(_) => None,
        };
        drop(previous);
    }
}

/// Forward the buffer if it differs from what the owner last saw.
fn flush(text: &Mutex<FilterText>, on_change: &Callback<String>) {
    let value = match text.lock() {
        Ok(mut text) if text.buffer != text.acknowledged => {
            text.acknowledged = text.buffer.clone();
            Some(text.buffer.clone())
        }
        _ => None,
    };
    if let Some(value) = value {
        log::debug!("filter: forwarding {:?}", value);
        on_change.call(value);
    }
}
