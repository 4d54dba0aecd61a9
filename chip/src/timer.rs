use std::time::Instant;

use crate::definitions::timer::INTERVAL;

/// Represents a timer inside of the chip infrastructure, it will count down to
/// zero from whatever number is given at 60Hz of wall clock time. The host
/// reports the time, so the decrement rate does not depend on how many
/// instructions are executed per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timer {
    /// will store the value of the timer
    value: u8,
    /// the last time the interval elapsed, `None` until the first tick
    last: Option<Instant>,
}

impl Timer {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self { value, last: None }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Will decrement the timer by one if at least one interval passed since
    /// the last decrement. Returns whether a decrement happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        let last = match self.last {
            Some(last) => last,
            None => {
                self.last = Some(now);
                return false;
            }
        };

        if now.saturating_duration_since(last) < INTERVAL {
            return false;
        }
        self.last = Some(now);

        if self.value > 0 {
            self.value -= 1;
            true
        } else {
            false
        }
    }

    /// Sets the timer back to zero and forgets the last tick.
    pub fn reset(&mut self) {
        self.value = 0;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::definitions::timer::HERZ;

    #[test]
    fn test_first_tick_sets_baseline() {
        let now = Instant::now();
        let mut timer = Timer::new(5);
        assert!(!timer.tick(now));
        assert_eq!(timer.get_value(), 5);
        assert!(timer.tick(now + INTERVAL));
        assert_eq!(timer.get_value(), 4);
    }

    #[test]
    fn test_at_most_one_per_interval() {
        let start = Instant::now();
        let mut timer = Timer::new(10);
        timer.tick(start);
        // a very late tick still only takes one off
        assert!(timer.tick(start + Duration::from_secs(1)));
        assert_eq!(timer.get_value(), 9);
        // too early
        assert!(!timer.tick(start + Duration::from_secs(1) + INTERVAL / 2));
        assert_eq!(timer.get_value(), 9);
    }

    #[test]
    fn test_stops_at_zero() {
        let start = Instant::now();
        let mut timer = Timer::new(1);
        timer.tick(start);
        assert!(timer.tick(start + INTERVAL));
        assert!(!timer.tick(start + INTERVAL * 2));
        assert_eq!(timer.get_value(), 0);
    }

    #[test]
    fn test_one_second_cadence() {
        // simulated clock advancing in 1/120s increments
        let step = Duration::from_nanos(1_000_000_000 / (2 * HERZ));
        let start = Instant::now();
        let mut timer = Timer::new(HERZ as u8);
        let mut now = start;
        timer.tick(now);

        while timer.get_value() > 0 {
            let before = timer.get_value();
            now += step;
            timer.tick(now);
            assert!(before - timer.get_value() <= 1);
            assert!(now - start < Duration::from_secs(2), "timer never reached zero");
        }

        let elapsed = now - start;
        assert!(elapsed >= Duration::from_millis(990), "{:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(1020), "{:?}", elapsed);
    }

    #[test]
    fn test_reset() {
        let start = Instant::now();
        let mut timer = Timer::new(3);
        timer.tick(start);
        timer.reset();
        assert_eq!(timer.get_value(), 0);
        timer.set_value(3);
        // baseline is taken again
        assert!(!timer.tick(start + INTERVAL));
    }
}
