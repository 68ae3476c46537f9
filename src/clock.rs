/// Per-scene animation angle in degrees.
///
/// Starts at zero and grows by a fixed step each frame, independent of wall
/// time, so motion speed follows the display's refresh cadence. The angle is
/// kept in `f64` so it keeps advancing over long sessions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationClock {
    angle: f64,
    step: f64,
}

impl AnimationClock {
    /// Creates a clock at zero. A negative step is treated as zero.
    pub fn new(step: f32) -> Self {
        Self {
            angle: 0.0,
            step: f64::from(step.max(0.0)),
        }
    }

    /// Advances one frame and returns the new angle.
    pub fn tick(&mut self) -> f64 {
        self.angle += self.step;
        self.angle
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }
}

/// Radians turned after `clock` units at `rate` degrees per unit.
///
/// The product is reduced into `[0, 360)` degrees before narrowing to `f32`.
pub fn turn_radians(clock: f64, rate: f32) -> f32 {
    (clock * f64::from(rate)).rem_euclid(360.0).to_radians() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_advances_by_step() {
        let mut clock = AnimationClock::new(0.5);
        assert_eq!(clock.angle(), 0.0);
        assert_eq!(clock.tick(), 0.5);
        assert_eq!(clock.tick(), 1.0);
        assert_eq!(clock.angle(), 1.0);
    }

    #[test]
    fn never_decreases() {
        let mut clock = AnimationClock::new(-3.0);
        let before = clock.angle();
        clock.tick();
        assert!(clock.angle() >= before);
    }

    #[test]
    fn keeps_advancing_past_single_precision() {
        // A 32-bit accumulator stops moving once it reaches 2^24 with a unit step.
        let mut clock = AnimationClock::new(1.0);
        for _ in 0..(1 << 24) {
            clock.tick();
        }
        let before = clock.angle();
        assert_eq!(clock.tick(), before + 1.0);
    }

    #[test]
    fn turn_wraps_whole_revolutions() {
        let quarter = std::f32::consts::FRAC_PI_2;
        assert!((turn_radians(30.0, 3.0) - quarter).abs() < 1e-6);
        assert!((turn_radians(360.0 * 1e6 + 30.0, 3.0) - quarter).abs() < 1e-6);
        assert!(turn_radians(-90.0, 1.0) > 0.0);
    }
}
