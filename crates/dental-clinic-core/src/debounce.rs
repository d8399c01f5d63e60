//! Cancel-and-restart debouncing driven by an external clock.

use chrono::{DateTime, Duration, Utc};

/// Default delay for the email-exists check.
pub const DEFAULT_DEBOUNCE_MS: i64 = 500;

/// Holds at most one pending value; every new input restarts the delay.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, DateTime<Utc>)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the timer.
    pub fn input(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some((value, now + self.delay));
    }

    /// Yield the pending value once its deadline has passed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_DEBOUNCE_MS))
    }
}
