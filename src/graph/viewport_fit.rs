//! Viewport auto-fit logic
//!
//! Computes the transform that fits the laid-out network into the viewport.
//! User can override by zooming or panning; reset returns to auto.

use egui::{Rect, Vec2};

use super::camera::ViewportTransform;
use super::types::NetworkLayout;
use crate::error::{GraphError, GraphResult};

/// Bounds narrower than this (layout units) count as degenerate
const MIN_EXTENT: f32 = 1e-3;

// =============================================================================
// FIT TRANSFORM
// =============================================================================

/// Transform that centers `bounds` in a viewport of `viewport_size`.
///
/// `scale = min(w / bw, h / bh) * margin`, clamped to `[min_scale, max_scale]`.
/// Zero-width or zero-height bounds are `LayoutOverflow`.
pub fn fit_transform(
    bounds: Rect,
    viewport_size: Vec2,
    margin: f32,
    min_scale: f32,
    max_scale: f32,
) -> GraphResult<ViewportTransform> {
    let finite = bounds.min.x.is_finite()
        && bounds.min.y.is_finite()
        && bounds.max.x.is_finite()
        && bounds.max.y.is_finite();
    if !finite {
        return Err(GraphError::LayoutOverflow {
            reason: "non-finite content bounds".to_string(),
        });
    }
    if bounds.width() < MIN_EXTENT || bounds.height() < MIN_EXTENT {
        return Err(GraphError::LayoutOverflow {
            reason: format!(
                "content bounds have no area ({} x {})",
                bounds.width(),
                bounds.height()
            ),
        });
    }
    if !(viewport_size.x > 0.0 && viewport_size.y > 0.0) {
        return Err(GraphError::LayoutOverflow {
            reason: format!("viewport has no area ({:?})", viewport_size),
        });
    }

    let zoom_x = viewport_size.x / bounds.width();
    let zoom_y = viewport_size.y / bounds.height();
    let scale = (zoom_x.min(zoom_y) * margin).clamp(min_scale, max_scale);

    let center = bounds.center();
    let transform = ViewportTransform::new(
        viewport_size.x / 2.0 - center.x * scale,
        viewport_size.y / 2.0 - center.y * scale,
        scale,
    );
    if !transform.is_finite() {
        return Err(GraphError::LayoutOverflow {
            reason: "fit produced a non-finite transform".to_string(),
        });
    }
    Ok(transform)
}

// =============================================================================
// VIEWPORT FIT
// =============================================================================

/// Auto-fit state for the viewport
#[derive(Debug, Clone)]
pub struct ViewportFit {
    /// Whether auto-fit is active (user hasn't manually zoomed)
    pub auto_enabled: bool,

    /// Bounding box of all node coordinates in layout space
    pub content_bounds: Option<Rect>,

    /// Set until the first fit has been applied; that fit is immediate
    pub first_load: bool,
}

impl Default for ViewportFit {
    fn default() -> Self {
        Self {
            auto_enabled: true,
            content_bounds: None,
            first_load: true,
        }
    }
}

impl ViewportFit {
    /// Create a new ViewportFit in auto mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bounds of freshly computed layout content
    pub fn on_content_change(&mut self, layout: &NetworkLayout) {
        self.content_bounds = layout.bounds();
    }

    /// Disable auto-fit (user has taken manual control)
    pub fn disable_auto(&mut self) {
        if self.auto_enabled {
            tracing::debug!("Auto-fit disabled by user gesture");
        }
        self.auto_enabled = false;
    }

    /// Re-enable auto-fit (reset command)
    pub fn enable_auto(&mut self) {
        self.auto_enabled = true;
    }

    /// Check if auto-fit should apply viewport changes
    pub fn should_apply(&self) -> bool {
        self.auto_enabled && self.content_bounds.is_some()
    }

    /// Whether the next fit should animate; consumes the first-load flag
    pub fn take_animate(&mut self) -> bool {
        let animate = !self.first_load;
        self.first_load = false;
        animate
    }
}
