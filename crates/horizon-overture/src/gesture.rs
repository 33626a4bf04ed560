//! Swipe recognition.
//!
//! [`SwipeRecognizer`] turns a press and a release into at most one
//! [`SwipeEvent`] per stroke; intermediate moves are ignored. A stroke counts
//! as a swipe when it travels at least [`SwipeConfig::min_distance`] pixels at
//! an average speed of at least [`SwipeConfig::min_velocity`] pixels per second.
//!
//! Timestamps are supplied by the host so recognition is deterministic; any
//! monotonic origin works.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_overture::gesture::{Point, SwipeDirection, SwipeRecognizer};
//!
//! let mut recognizer = SwipeRecognizer::new();
//! recognizer.press(Point::new(200.0, 600.0), Duration::ZERO);
//! let swipe = recognizer.release(Point::new(200.0, 400.0), Duration::from_millis(100));
//!
//! assert_eq!(swipe.map(|s| s.direction), Some(SwipeDirection::Up));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default minimum velocity for a swipe in pixels per second.
pub const DEFAULT_SWIPE_MIN_VELOCITY: f32 = 300.0;

/// Default minimum distance for a swipe in pixels.
pub const DEFAULT_SWIPE_MIN_DISTANCE: f32 = 50.0;

/// A position in viewport pixels. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The direction the finger travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    /// Whether this is an up or down swipe.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// A recognized swipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeEvent {
    /// Dominant direction of travel.
    pub direction: SwipeDirection,
    /// Straight-line distance from press to release, in pixels.
    pub distance: f32,
    /// Average speed over the stroke, in pixels per second.
    pub velocity: f32,
}

/// Thresholds for swipe recognition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Minimum distance for a swipe.
    pub min_distance: f32,
    /// Minimum velocity for a swipe.
    pub min_velocity: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_SWIPE_MIN_DISTANCE,
            min_velocity: DEFAULT_SWIPE_MIN_VELOCITY,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Stroke {
    start_pos: Point,
    start_time: Duration,
}

/// Recognizes swipes from a single pointer.
#[derive(Debug, Clone, Default)]
pub struct SwipeRecognizer {
    config: SwipeConfig,
    stroke: Option<Stroke>,
}

impl SwipeRecognizer {
    /// Create a recognizer with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recognizer with custom thresholds.
    pub fn with_config(config: SwipeConfig) -> Self {
        Self { config, stroke: None }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// Whether a stroke is in progress.
    pub fn is_tracking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Begin a stroke. A press during a stroke restarts it.
    pub fn press(&mut self, position: Point, at: Duration) {
        self.stroke = Some(Stroke {
            start_pos: position,
            start_time: at,
        });
    }

    /// End the stroke and return the swipe it made, if any.
    pub fn release(&mut self, position: Point, at: Duration) -> Option<SwipeEvent> {
        let stroke = self.stroke.take()?;

        let dx = position.x - stroke.start_pos.x;
        let dy = position.y - stroke.start_pos.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < self.config.min_distance {
            return None;
        }

        // A zero-length stroke in time is as fast as it gets.
        let duration_secs = at.saturating_sub(stroke.start_time).as_secs_f32();
        let velocity = if duration_secs > 0.0 {
            distance / duration_secs
        } else {
            f32::INFINITY
        };
        if velocity < self.config.min_velocity {
            return None;
        }

        Some(SwipeEvent {
            direction: determine_swipe_direction(dx, dy),
            distance,
            velocity,
        })
    }

    /// Abandon the stroke without recognizing anything.
    pub fn cancel(&mut self) {
        self.stroke = None;
    }
}

fn determine_swipe_direction(dx: f32, dy: f32) -> SwipeDirection {
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if dy > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(recognizer: &mut SwipeRecognizer, from: Point, to: Point, ms: u64) -> Option<SwipeEvent> {
        recognizer.press(from, Duration::from_secs(1));
        recognizer.release(to, Duration::from_secs(1) + Duration::from_millis(ms))
    }

    #[test]
    fn test_swipe_directions() {
        let mut recognizer = SwipeRecognizer::new();
        let origin = Point::new(300.0, 300.0);

        let up = stroke(&mut recognizer, origin, Point::new(300.0, 150.0), 100).unwrap();
        assert_eq!(up.direction, SwipeDirection::Up);
        assert!(up.direction.is_vertical());

        let down = stroke(&mut recognizer, origin, Point::new(310.0, 450.0), 100).unwrap();
        assert_eq!(down.direction, SwipeDirection::Down);

        let left = stroke(&mut recognizer, origin, Point::new(150.0, 320.0), 100).unwrap();
        assert_eq!(left.direction, SwipeDirection::Left);
        assert!(!left.direction.is_vertical());

        let right = stroke(&mut recognizer, origin, Point::new(450.0, 300.0), 100).unwrap();
        assert_eq!(right.direction, SwipeDirection::Right);
    }

    #[test]
    fn test_distance_threshold() {
        let mut recognizer = SwipeRecognizer::new();
        let origin = Point::new(0.0, 100.0);

        // 40 px in 10 ms is fast but too short
        assert!(stroke(&mut recognizer, origin, Point::new(0.0, 60.0), 10).is_none());

        let swipe = stroke(&mut recognizer, origin, Point::new(0.0, 40.0), 10).unwrap();
        assert_eq!(swipe.distance, 60.0);
    }

    #[test]
    fn test_velocity_threshold() {
        let mut recognizer = SwipeRecognizer::new();
        let origin = Point::new(0.0, 500.0);

        // 200 px over one second is a drag, not a swipe
        assert!(stroke(&mut recognizer, origin, Point::new(0.0, 300.0), 1000).is_none());

        let swipe = stroke(&mut recognizer, origin, Point::new(0.0, 300.0), 500).unwrap();
        assert!((swipe.velocity - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_custom_thresholds() {
        let mut recognizer = SwipeRecognizer::with_config(SwipeConfig {
            min_distance: 10.0,
            min_velocity: 0.0,
        });
        let swipe = stroke(&mut recognizer, Point::new(0.0, 0.0), Point::new(20.0, 0.0), 5000);
        assert_eq!(swipe.map(|s| s.direction), Some(SwipeDirection::Right));
    }

    #[test]
    fn test_release_without_press() {
        let mut recognizer = SwipeRecognizer::new();
        assert!(!recognizer.is_tracking());
        assert!(recognizer.release(Point::new(0.0, 500.0), Duration::ZERO).is_none());
    }

    #[test]
    fn test_cancel_drops_stroke() {
        let mut recognizer = SwipeRecognizer::new();
        recognizer.press(Point::new(0.0, 500.0), Duration::ZERO);
        assert!(recognizer.is_tracking());

        recognizer.cancel();
        assert!(!recognizer.is_tracking());
        assert!(recognizer
            .release(Point::new(0.0, 0.0), Duration::from_millis(50))
            .is_none());
    }

    #[test]
    fn test_instant_stroke() {
        let mut recognizer = SwipeRecognizer::new();
        let swipe = stroke(&mut recognizer, Point::new(0.0, 200.0), Point::new(0.0, 0.0), 0).unwrap();
        assert_eq!(swipe.direction, SwipeDirection::Up);
        assert!(swipe.velocity.is_infinite());
    }
}
