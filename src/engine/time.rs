/// Splits variable frame deltas into whole fixed physics steps.
pub struct FixedStepClock {
    step: f32,
    accumulator: f32,
    max_steps: usize,
}

impl FixedStepClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_steps: 8,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame's delta and return how many fixed steps to run now.
    /// Time beyond `max_steps` is dropped so a long hitch cannot spiral.
    pub fn advance(&mut self, frame_dt: f32) -> usize {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
            if steps == self.max_steps {
                self.accumulator = 0.0;
                break;
            }
        }
        steps
    }

    /// Fraction of a step left in the accumulator.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_partial_frames() {
        let mut clock = FixedStepClock::new(0.1);
        assert_eq!(clock.advance(0.05), 0);
        assert_eq!(clock.advance(0.07), 1);
        assert!((clock.alpha() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = FixedStepClock::new(0.01);
        assert_eq!(clock.advance(1.0), 8);
        assert_eq!(clock.alpha(), 0.0);
    }
}
