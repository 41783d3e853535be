use std::time::{SystemTime, UNIX_EPOCH};

/// Host-side arrival clock: epoch seconds with microsecond resolution.
pub struct Clock(f64);

impl Clock {
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let timestamp = now.as_secs() as f64 + now.subsec_micros() as f64 * 1e-6;
        Self(timestamp)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_now_is_recent() {
        let clock = Clock::now();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let timestamp = now.as_secs() as f64 + now.subsec_micros() as f64 * 1e-6;
        assert!((clock.as_secs() - timestamp).abs() < 1.0);
    }

    #[test]
    fn test_clock_is_monotonic_enough() {
        let first = Clock::now();
        let second = Clock::now();
        assert!(second.as_secs() >= first.as_secs());
    }
}
