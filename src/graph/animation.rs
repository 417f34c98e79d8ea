//! Fixed-duration eased transitions for the viewport
//!
//! A `TransformTween` interpolates between two viewport transforms over a
//! fixed duration. It is advanced with `tick(dt)` from the host's frame loop
//! and clamps to its final value once the duration has elapsed.
//!
//! # EGUI-RULES Compliance
//! - Animation state is UI-only (not server data)
//! - No callbacks - values are polled each frame via `current()`

use super::camera::ViewportTransform;

/// Easing curve applied to normalized progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Cubic in-out: slow start, fast middle, slow end
    #[default]
    CubicInOut,
    CubicOut,
}

impl Easing {
    /// Map progress in [0, 1] to eased progress in [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Easing::CubicOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
        }
    }
}

/// Linear interpolation for f32
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// =============================================================================
// TRANSFORM TWEEN
// =============================================================================

/// One in-flight viewport animation
#[derive(Debug, Clone, PartialEq)]
pub struct TransformTween {
    from: ViewportTransform,
    to: ViewportTransform,
    /// Seconds elapsed
    elapsed: f32,
    /// Seconds total
    duration: f32,
    easing: Easing,
}

impl TransformTween {
    pub fn new(from: ViewportTransform, to: ViewportTransform, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration: duration_ms as f32 / 1000.0,
            easing: Easing::default(),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Advance by `dt` seconds. Returns true once finished.
    pub fn tick(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }

    /// Normalized progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Transform at the current point of the animation
    pub fn current(&self) -> ViewportTransform {
        if self.is_finished() {
            return self.to;
        }
        let t = self.easing.apply(self.progress());
        ViewportTransform {
            translate_x: lerp_f32(self.from.translate_x, self.to.translate_x, t),
            translate_y: lerp_f32(self.from.translate_y, self.to.translate_y, t),
            scale: lerp_f32(self.from.scale, self.to.scale, t),
        }
    }

    pub fn target(&self) -> ViewportTransform {
        self.to
    }

    pub fn start(&self) -> ViewportTransform {
        self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::CubicInOut, Easing::CubicOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
            assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_easing_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = Easing::CubicInOut.apply(i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_tween_reaches_target() {
        let from = ViewportTransform::IDENTITY;
        let to = ViewportTransform::new(100.0, -50.0, 2.0);
        let mut tween = TransformTween::new(from, to, 300);

        // Simulate 0.5 seconds at 60fps
        let mut finished = false;
        for _ in 0..30 {
            finished = tween.tick(1.0 / 60.0);
        }

        assert!(finished);
        assert_eq!(tween.current(), to);
    }

    #[test]
    fn test_tween_midway() {
        let to = ViewportTransform::new(100.0, 0.0, 3.0);
        let mut tween =
            TransformTween::new(ViewportTransform::IDENTITY, to, 1000).with_easing(Easing::Linear);
        tween.tick(0.25);

        let cur = tween.current();
        assert!((cur.translate_x - 25.0).abs() < 1e-3);
        assert!((cur.scale - 1.5).abs() < 1e-3);
        assert!(!tween.is_finished());
    }

    #[test]
    fn test_overshoot_clamps_to_final() {
        let to = ViewportTransform::new(10.0, 10.0, 0.5);
        let mut tween = TransformTween::new(ViewportTransform::IDENTITY, to, 300);
        tween.tick(10.0);
        assert_eq!(tween.progress(), 1.0);
        assert_eq!(tween.current(), to);
    }

    #[test]
    fn test_zero_duration_is_immediate() {
        let to = ViewportTransform::new(1.0, 2.0, 3.0);
        let tween = TransformTween::new(ViewportTransform::IDENTITY, to, 0);
        assert!(tween.is_finished());
        assert_eq!(tween.current(), to);
    }

    #[test]
    fn test_bad_dt_ignored() {
        let mut tween =
            TransformTween::new(ViewportTransform::IDENTITY, ViewportTransform::IDENTITY, 300);
        tween.tick(f32::NAN);
        tween.tick(-1.0);
        assert_eq!(tween.progress(), 0.0);
    }
}
