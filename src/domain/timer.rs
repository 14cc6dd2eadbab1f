/// Level countdown.
///
/// Only ever decreases: `tick` subtracts elapsed time and `penalize`
/// subtracts a fixed amount. Both clamp at zero. Negative or NaN inputs
/// are treated as zero so the clock can never run backwards.

/// Default time budget of every level, in seconds.
pub const LEVEL_SECONDS: f32 = 120.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Countdown {
    total: f32,
    remaining: f32,
}

impl Countdown {
    pub fn new(total: f32) -> Self {
        let total = sanitize(total);
        Countdown { total, remaining: total }
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - sanitize(dt)).max(0.0);
    }

    /// Remove `secs` from the remaining time (miss penalty).
    pub fn penalize(&mut self, secs: f32) {
        self.tick(secs);
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn total(&self) -> f32 {
        self.total
    }

    pub fn expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Whole seconds left, rounded up (what the HUD shows).
    pub fn whole_seconds(&self) -> u32 {
        self.remaining.ceil() as u32
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Countdown::new(LEVEL_SECONDS)
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clamps_at_zero() {
        let mut c = Countdown::new(1.0);
        c.tick(0.4);
        assert!((c.remaining() - 0.6).abs() < 1e-6);
        c.tick(5.0);
        assert_eq!(c.remaining(), 0.0);
        assert!(c.expired());
        c.tick(1.0);
        assert_eq!(c.remaining(), 0.0);
    }

    #[test]
    fn negative_dt_never_adds_time() {
        let mut c = Countdown::new(10.0);
        c.tick(-3.0);
        c.penalize(-1.0);
        c.tick(f32::NAN);
        assert_eq!(c.remaining(), 10.0);
    }

    #[test]
    fn whole_seconds_rounds_up() {
        let mut c = Countdown::new(120.0);
        c.tick(0.25);
        assert_eq!(c.whole_seconds(), 120);
        c.tick(0.75);
        assert_eq!(c.whole_seconds(), 119);
    }

    proptest! {
        #[test]
        fn monotonic_and_non_negative(steps in prop::collection::vec(-2.0f32..5.0, 0..200)) {
            let mut c = Countdown::new(LEVEL_SECONDS);
            let mut prev = c.remaining();
            for dt in steps {
                c.tick(dt);
                prop_assert!(c.remaining() <= prev);
                prop_assert!(c.remaining() >= 0.0);
                prev = c.remaining();
            }
        }
    }
}
