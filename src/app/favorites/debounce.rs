use std::time::Duration;

use tokio::time::Instant;

/// A zero interval passes every input straight through.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    interval: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn push(&mut self, text: String, now: Instant) -> Option<String> {
        if self.interval.is_zero() {
            self.pending = None;
            return Some(text);
        }
        self.pending = Some((text, now));
        None
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|(_, received_at)| *received_at + self.interval)
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.pending.take().map(|(text, _)| text)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_applies_immediately() {
        let mut debouncer = SearchDebouncer::new(Duration::ZERO);
        let now = Instant::now();
        assert_eq!(debouncer.push("al".to_string(), now), Some("al".to_string()));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn only_last_input_survives_the_quiet_period() {
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        assert_eq!(debouncer.push("a".to_string(), start), None);
        assert_eq!(debouncer.push("al".to_string(), start + Duration::from_millis(100)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(350)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(400)),
            Some("al".to_string())
        );
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn cancel_drops_pending_input() {
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(50));
        let start = Instant::now();
        debouncer.push("alien".to_string(), start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
