//! Audio engine tuning.

use std::time::Duration;

use crate::fade::FadeRamp;

/// Timing and volume parameters for the [`AudioEngine`](crate::AudioEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Length of a fade-in.
    pub fade_in: Duration,
    /// Length of a fade-out.
    pub fade_out: Duration,
    /// Number of discrete volume steps per fade.
    pub fade_steps: u32,
    /// Volume a fade-in ends at.
    pub target_volume: f32,
    /// How often the loop window is checked while playing.
    pub loop_check_interval: Duration,
    /// How long a track may take to become playable.
    pub load_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(800),
            fade_out: Duration::from_millis(600),
            fade_steps: 20,
            target_volume: 0.6,
            loop_check_interval: Duration::from_millis(100),
            load_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineConfig {
    /// The ramp for fading `from` up to the target volume.
    pub fn fade_in_ramp(&self, from: f32) -> FadeRamp {
        FadeRamp::new(from, self.target_volume, self.fade_in, self.fade_steps)
    }

    /// The ramp for fading `from` down to silence.
    pub fn fade_out_ramp(&self, from: f32) -> FadeRamp {
        FadeRamp::new(from, 0.0, self.fade_out, self.fade_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.fade_in_ramp(0.0).step_interval(), Duration::from_millis(40));
        assert_eq!(config.fade_out_ramp(0.6).step_interval(), Duration::from_millis(30));
        assert_eq!(config.fade_in_ramp(0.0).volume_at(20), 0.6);
    }
}
