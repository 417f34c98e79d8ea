//! Link curves between a partner and its direct referrals
//!
//! Vertical cubic bezier: both control points sit at the vertical midpoint,
//! one above the child and one below the parent, so links leave and enter
//! nodes vertically.

use egui::{Pos2, Vec2};

use super::camera::ViewportTransform;

// =============================================================================
// BEZIER CURVE
// =============================================================================

/// Cubic bezier from a parent to a child
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCurve {
    pub from: Pos2,
    pub control1: Pos2,
    pub control2: Pos2,
    pub to: Pos2,
}

/// Build the link curve for a parent/child coordinate pair
pub fn link_path(parent: Pos2, child: Pos2) -> LinkCurve {
    let mid_y = (parent.y + child.y) / 2.0;
    LinkCurve {
        from: parent,
        control1: Pos2::new(parent.x, mid_y),
        control2: Pos2::new(child.x, mid_y),
        to: child,
    }
}

impl LinkCurve {
    /// Control polygon as an array (from, c1, c2, to)
    pub fn points(&self) -> [Pos2; 4] {
        [self.from, self.control1, self.control2, self.to]
    }

    /// Get point on curve at parameter t (0.0 to 1.0)
    pub fn point_at(&self, t: f32) -> Pos2 {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;

        Pos2::new(
            self.from.x * a + self.control1.x * b + self.control2.x * c + self.to.x * d,
            self.from.y * a + self.control1.y * b + self.control2.y * c + self.to.y * d,
        )
    }

    /// Get tangent direction at parameter t
    pub fn tangent_at(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        let d = (self.control1 - self.from) * (3.0 * mt * mt)
            + (self.control2 - self.control1) * (6.0 * mt * t)
            + (self.to - self.control2) * (3.0 * t * t);
        d.normalized()
    }

    pub fn midpoint(&self) -> Pos2 {
        self.point_at(0.5)
    }

    /// Sample the curve into `segments + 1` points
    pub fn flatten(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }

    /// Map every control point through a viewport transform
    pub fn transformed(&self, transform: &ViewportTransform) -> Self {
        Self {
            from: transform.apply(self.from),
            control1: transform.apply(self.control1),
            control2: transform.apply(self.control2),
            to: transform.apply(self.to),
        }
    }

    /// SVG path data (`M x,y C x1,y1 x2,y2 x,y`)
    pub fn to_svg_path(&self) -> String {
        format!(
            "M{},{}C{},{} {},{} {},{}",
            self.from.x,
            self.from.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.to.x,
            self.to.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_and_controls() {
        let curve = link_path(Pos2::new(100.0, 40.0), Pos2::new(20.0, 140.0));
        assert_eq!(curve.from, Pos2::new(100.0, 40.0));
        assert_eq!(curve.to, Pos2::new(20.0, 140.0));
        assert_eq!(curve.control1, Pos2::new(100.0, 90.0));
        assert_eq!(curve.control2, Pos2::new(20.0, 90.0));

        assert_eq!(curve.point_at(0.0), curve.from);
        assert_eq!(curve.point_at(1.0), curve.to);
    }

    #[test]
    fn test_midpoint_is_centered() {
        let curve = link_path(Pos2::new(0.0, 0.0), Pos2::new(80.0, 100.0));
        let mid = curve.midpoint();
        assert!((mid.x - 40.0).abs() < 1e-4);
        assert!((mid.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_tangents_at_ends() {
        let curve = link_path(Pos2::new(0.0, 0.0), Pos2::new(60.0, 100.0));
        let start = curve.tangent_at(0.0);
        let end = curve.tangent_at(1.0);
        assert!(start.x.abs() < 1e-4 && start.y > 0.99);
        assert!(end.x.abs() < 1e-4 && end.y > 0.99);
    }

    #[test]
    fn test_straight_when_aligned() {
        let curve = link_path(Pos2::new(50.0, 0.0), Pos2::new(50.0, 100.0));
        for p in curve.flatten(8) {
            assert!((p.x - 50.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_flatten_count() {
        let curve = link_path(Pos2::ZERO, Pos2::new(10.0, 10.0));
        assert_eq!(curve.flatten(16).len(), 17);
        assert_eq!(curve.flatten(0).len(), 2);
    }

    #[test]
    fn test_svg_path() {
        let curve = link_path(Pos2::new(0.0, 0.0), Pos2::new(10.0, 20.0));
        assert_eq!(curve.to_svg_path(), "M0,0C0,10 10,10 10,20");
    }

    #[test]
    fn test_transformed() {
        let curve = link_path(Pos2::new(0.0, 0.0), Pos2::new(10.0, 20.0));
        let t = ViewportTransform::new(5.0, -5.0, 2.0);
        let moved = curve.transformed(&t);
        assert_eq!(moved.from, Pos2::new(5.0, -5.0));
        assert_eq!(moved.to, Pos2::new(25.0, 35.0));
        assert_eq!(moved.control1, Pos2::new(5.0, 15.0));
    }
}
