use web_time::{Duration, Instant};

pub const DEFAULT_PERSIST_DEBOUNCE: Duration = Duration::from_millis(500);

/// Coalesces bursts of triggers into one firing after a quiet period.
///
/// Time is passed in by the caller so the frame loop (and tests) decide
/// what "now" is.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_PERSIST_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, deadline: None }
    }

    /// (Re)start the quiet window, superseding any pending firing
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the pending firing, zero if already due
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// True exactly once when the quiet period has elapsed
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule(start);

        assert!(!debouncer.fire_due(start + Duration::from_millis(499)));
        assert!(debouncer.fire_due(start + Duration::from_millis(500)));
        assert!(!debouncer.fire_due(start + Duration::from_millis(1000)));
    }

    #[test]
    fn test_reschedule_restarts_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(400));

        assert!(!debouncer.fire_due(start + Duration::from_millis(600)));
        assert!(debouncer.fire_due(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_remaining_counts_down_to_zero() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.remaining(start), None);

        debouncer.schedule(start);
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(800)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire_due(start + Duration::from_secs(1)));
    }
}
