use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Per-symbol alert suppression window.
///
/// Holds the last alert time for each symbol for the lifetime of the
/// process. Not synchronized: the scanner owns it and visits symbols one at
/// a time.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    window: Duration,
    last_alert: HashMap<String, DateTime<Utc>>,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_alert: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True if `symbol` has never alerted, or its last alert is at least
    /// `window` before `now`. A `now` earlier than the recorded alert
    /// (clock stepped back) counts as still cooling down.
    pub fn should_alert(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        match self.last_alert.get(symbol) {
            None => true,
            Some(&last) => match (now - last).to_std() {
                Ok(elapsed) => elapsed >= self.window,
                Err(_) => false,
            },
        }
    }

    pub fn record(&mut self, symbol: &str, now: DateTime<Utc>) {
        self.last_alert.insert(symbol.to_string(), now);
    }

    pub fn last_alert(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_alert.get(symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn unknown_symbol_may_alert() {
        let tracker = CooldownTracker::new(Duration::from_secs(300));
        assert!(tracker.should_alert("EURUSD=X", t0()));
        assert!(tracker.last_alert("EURUSD=X").is_none());
    }

    #[test]
    fn suppressed_inside_window_released_at_boundary() {
        let mut tracker = CooldownTracker::new(Duration::from_secs(300));
        tracker.record("EURUSD=X", t0());

        assert!(!tracker.should_alert("EURUSD=X", t0()));
        assert!(!tracker.should_alert("EURUSD=X", t0() + chrono::Duration::seconds(299)));
        assert!(!tracker.should_alert(
            "EURUSD=X",
            t0() + chrono::Duration::milliseconds(299_999)
        ));
        assert!(tracker.should_alert("EURUSD=X", t0() + chrono::Duration::seconds(300)));
        assert!(tracker.should_alert("EURUSD=X", t0() + chrono::Duration::hours(2)));
    }

    #[test]
    fn symbols_are_independent() {
        let mut tracker = CooldownTracker::new(Duration::from_secs(300));
        tracker.record("EURUSD=X", t0());
        assert!(tracker.should_alert("GBPUSD=X", t0()));
    }

    #[test]
    fn record_moves_the_window() {
        let mut tracker = CooldownTracker::new(Duration::from_secs(60));
        tracker.record("USDJPY=X", t0());
        let later = t0() + chrono::Duration::seconds(90);
        tracker.record("USDJPY=X", later);
        assert_eq!(tracker.last_alert("USDJPY=X"), Some(later));
        assert!(!tracker.should_alert("USDJPY=X", later + chrono::Duration::seconds(30)));
    }

    #[test]
    fn clock_going_backwards_stays_suppressed() {
        let mut tracker = CooldownTracker::new(Duration::from_secs(60));
        tracker.record("AUDUSD=X", t0());
        assert!(!tracker.should_alert("AUDUSD=X", t0() - chrono::Duration::seconds(5)));
    }
}
