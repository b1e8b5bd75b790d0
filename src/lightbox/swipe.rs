use super::Direction;

/// Minimum horizontal travel, in logical pixels, for a touch to count as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 50.0;

/// Recognizes one horizontal swipe from a touch-start / touch-end pair.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f64,
    start_x: Option<f64>,
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.abs(),
            start_x: None,
        }
    }

    pub fn begin(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Finishes the gesture. Moving the finger leftward means "next".
    pub fn end(&mut self, x: f64) -> Option<Direction> {
        let start = self.start_x.take()?;
        classify(start - x, self.threshold)
    }

    pub fn reset(&mut self) {
        self.start_x = None;
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

fn classify(delta: f64, threshold: f64) -> Option<Direction> {
    if delta.abs() < threshold {
        None
    } else if delta > 0.0 {
        Some(Direction::Forward)
    } else {
        Some(Direction::Backward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe(from: f64, to: f64) -> Option<Direction> {
        let mut t = SwipeTracker::default();
        t.begin(from);
        t.end(to)
    }

    #[test]
    fn short_moves_are_taps() {
        assert_eq!(swipe(200.0, 200.0), None);
        assert_eq!(swipe(200.0, 151.0), None);
        assert_eq!(swipe(200.0, 249.0), None);
    }

    #[test]
    fn leftward_goes_forward_rightward_goes_back() {
        assert_eq!(swipe(300.0, 240.0), Some(Direction::Forward));
        assert_eq!(swipe(240.0, 300.0), Some(Direction::Backward));
    }

    #[test]
    fn threshold_distance_itself_counts() {
        assert_eq!(swipe(100.0, 50.0), Some(Direction::Forward));
    }

    #[test]
    fn end_without_begin_is_ignored() {
        let mut t = SwipeTracker::default();
        assert_eq!(t.end(0.0), None);
        t.begin(500.0);
        t.reset();
        assert_eq!(t.end(0.0), None);
    }
}
