use std::time::{Duration, Instant};

/// Lowest content scale, reached when fully hidden.
const HIDDEN_SCALE: f32 = 0.95;

/// Opacity/scale transition bound to a shown/hidden flag.
///
/// Mirrors a declarative style transition: the owner only flips the flag,
/// and the fade runs from wherever it currently is toward the new target.
#[derive(Debug, Clone)]
pub struct Fade {
    from: f32,
    to: f32,
    started: Option<Instant>,
    duration: Duration,
}

impl Fade {
    pub fn new(duration: Duration, shown: bool) -> Self {
        let v = if shown { 1.0 } else { 0.0 };
        Self {
            from: v,
            to: v,
            started: None,
            duration,
        }
    }

    pub fn set_shown(&mut self, shown: bool, now: Instant) {
        let target = if shown { 1.0 } else { 0.0 };
        if target == self.to {
            return;
        }
        self.from = self.value(now);
        self.to = target;
        self.started = Some(now);
    }

    fn progress(&self, now: Instant) -> f32 {
        match self.started {
            Some(start) if !self.duration.is_zero() => {
                let t = now.saturating_duration_since(start).as_secs_f32()
                    / self.duration.as_secs_f32();
                t.clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Opacity in `0.0..=1.0`.
    pub fn value(&self, now: Instant) -> f32 {
        let t = self.progress(now);
        let eased = t * t * (3.0 - 2.0 * t);
        self.from + (self.to - self.from) * eased
    }

    pub fn scale(&self, now: Instant) -> f32 {
        HIDDEN_SCALE + (1.0 - HIDDEN_SCALE) * self.value(now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.progress(now) < 1.0
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.value(now) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fades_in_over_duration() {
        let t0 = Instant::now();
        let mut fade = Fade::new(300 * MS, false);
        assert_eq!(fade.value(t0), 0.0);
        assert!(!fade.is_visible(t0));

        fade.set_shown(true, t0);
        assert!(fade.is_animating(t0 + 100 * MS));
        let mid = fade.value(t0 + 150 * MS);
        assert!((mid - 0.5).abs() < 1e-4);
        assert_eq!(fade.value(t0 + 300 * MS), 1.0);
        assert_eq!(fade.scale(t0 + 300 * MS), 1.0);
        assert!(!fade.is_animating(t0 + 300 * MS));
    }

    #[test]
    fn reversal_starts_from_current_value() {
        let t0 = Instant::now();
        let mut fade = Fade::new(300 * MS, false);
        fade.set_shown(true, t0);
        let t1 = t0 + 150 * MS;
        let at_flip = fade.value(t1);
        fade.set_shown(false, t1);
        assert!((fade.value(t1) - at_flip).abs() < 1e-6);
        assert_eq!(fade.value(t1 + 300 * MS), 0.0);
        assert!((fade.scale(t1 + 300 * MS) - HIDDEN_SCALE).abs() < 1e-6);
    }

    #[test]
    fn repeated_flag_does_not_restart() {
        let t0 = Instant::now();
        let mut fade = Fade::new(300 * MS, false);
        fade.set_shown(true, t0);
        fade.set_shown(true, t0 + 200 * MS);
        assert_eq!(fade.value(t0 + 300 * MS), 1.0);
    }
}
