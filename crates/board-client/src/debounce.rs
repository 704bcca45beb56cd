//! Trailing-edge debounce for values that are expensive to send.

use std::time::Duration;

use tokio::time::Instant;

/// Holds the latest scheduled value until a quiet period has passed
/// without another one arriving.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replace any pending value and restart the quiet period from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its quiet period is over.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_value_fires() {
        let quiet = Duration::from_millis(500);
        let mut debouncer = Debouncer::new(quiet);
        let t0 = Instant::now();

        debouncer.schedule(1, t0);
        debouncer.schedule(2, t0 + Duration::from_millis(300));
        // The first value's window has passed, but it was replaced
        assert_eq!(debouncer.take_due(t0 + Duration::from_millis(600)), None);
        assert_eq!(debouncer.take_due(t0 + Duration::from_millis(800)), Some(2));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_deadline_moves_with_each_change() {
        let quiet = Duration::from_millis(500);
        let mut debouncer = Debouncer::new(quiet);
        assert_eq!(debouncer.deadline(), None);

        let t0 = Instant::now();
        debouncer.schedule("a", t0);
        assert_eq!(debouncer.deadline(), Some(t0 + quiet));
        let t1 = t0 + Duration::from_millis(100);
        debouncer.schedule("b", t1);
        assert_eq!(debouncer.deadline(), Some(t1 + quiet));

        assert_eq!(debouncer.cancel(), Some("b"));
        assert_eq!(debouncer.deadline(), None);
    }
}
