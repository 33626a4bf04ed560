//! Stepped linear volume ramps.

use std::time::Duration;

/// A linear volume ramp split into a fixed number of discrete steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeRamp {
    from: f32,
    to: f32,
    steps: u32,
    duration: Duration,
}

impl FadeRamp {
    /// Create a ramp from `from` to `to` over `duration`, in `steps` steps.
    pub fn new(from: f32, to: f32, duration: Duration, steps: u32) -> Self {
        Self {
            from: from.max(0.0),
            to: to.max(0.0),
            steps: steps.max(1),
            duration,
        }
    }

    /// Total number of steps.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Time between two steps.
    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps
    }

    /// Volume after `step` steps. Never overshoots either end of the ramp.
    pub fn volume_at(&self, step: u32) -> f32 {
        if step >= self.steps {
            return self.to;
        }
        let progress = step as f32 / self.steps as f32;
        let volume = self.from + (self.to - self.from) * progress;
        let (low, high) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        volume.clamp(low, high)
    }

    /// Whether `step` is the final step.
    pub fn is_complete(&self, step: u32) -> bool {
        step >= self.steps
    }
}
