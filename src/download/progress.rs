//! Progress throttling.
//!
//! Fetchers report after every chunk; the interactive thread only needs a
//! few updates per second.

use std::time::{Duration, Instant};

/// Rate-limiter for progress updates.
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// Whether `(done, total)` should be forwarded. The first and the final
    /// update always are.
    pub fn should_emit(&mut self, done: u64, total: Option<u64>) -> bool {
        let now = Instant::now();
        let finished = total.map(|t| done >= t).unwrap_or(false);
        match self.last_emit {
            Some(last) if !finished && now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_final_always_emit() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));
        assert!(throttle.should_emit(0, Some(100)));
        assert!(!throttle.should_emit(50, Some(100)));
        assert!(throttle.should_emit(100, Some(100)));
    }

    #[test]
    fn test_unknown_total_respects_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(30));
        assert!(throttle.should_emit(1, None));
        assert!(!throttle.should_emit(2, None));

        std::thread::sleep(Duration::from_millis(40));
        assert!(throttle.should_emit(3, None));
    }
}
