//! ViewportController - pan/zoom with eased, preemptible animation
//!
//! Owns the `ViewportTransform` mapping layout space to viewport space:
//! `screen = translate + world * scale`, with screen coordinates relative to
//! the top-left corner of the drawing surface.
//!
//! The controller holds no callbacks. Call `tick(dt)` once per frame, then
//! read `transform()` for drawing and hit testing.
//!
//! # Animation Methods
//! - `zoom_in(factor)` / `zoom_out(factor)` - scale about the viewport center
//! - `fit_to_content(bounds, animate)` - show the whole layout
//! - `center_on(pos)` - bring a layout position to the viewport center
//!
//! At most one animation is in flight; every new request replaces it,
//! starting from whatever transform is currently displayed.

use egui::{Pos2, Rect, Vec2};

use super::animation::TransformTween;
use super::types::PositionedNode;
use super::viewport_fit::fit_transform;
use crate::config::ViewportSettings;

// =============================================================================
// VIEWPORT TRANSFORM
// =============================================================================

/// Translate + uniform scale from layout space to viewport space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn new(translate_x: f32, translate_y: f32, scale: f32) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Layout position to viewport position
    pub fn apply(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            self.translate_x + world.x * self.scale,
            self.translate_y + world.y * self.scale,
        )
    }

    /// Viewport position to layout position
    pub fn invert(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }

    pub fn apply_rect(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.apply(world.min), self.apply(world.max))
    }

    pub fn is_finite(&self) -> bool {
        self.translate_x.is_finite() && self.translate_y.is_finite() && self.scale.is_finite()
    }
}

// =============================================================================
// VIEWPORT CONTROLLER
// =============================================================================

/// Current transform plus at most one in-flight animation
#[derive(Debug, Clone)]
pub struct ViewportController {
    current: ViewportTransform,
    animation: Option<TransformTween>,
    viewport_size: Vec2,
    settings: ViewportSettings,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(&ViewportSettings::default())
    }
}

impl ViewportController {
    pub fn new(settings: &ViewportSettings) -> Self {
        Self {
            current: ViewportTransform::IDENTITY,
            animation: None,
            viewport_size: Vec2::new(800.0, 600.0),
            settings: settings.clone(),
        }
    }

    // =========================================================================
    // CURRENT VALUES (for reading)
    // =========================================================================

    /// Transform to draw with this frame
    pub fn transform(&self) -> ViewportTransform {
        self.current
    }

    /// Where the viewport will be once the current animation settles
    pub fn target(&self) -> ViewportTransform {
        self.animation
            .as_ref()
            .map(|a| a.target())
            .unwrap_or(self.current)
    }

    pub fn scale(&self) -> f32 {
        self.current.scale
    }

    pub fn min_scale(&self) -> f32 {
        self.settings.min_scale
    }

    pub fn max_scale(&self) -> f32 {
        self.settings.max_scale
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    pub fn viewport_center(&self) -> Pos2 {
        Pos2::new(self.viewport_size.x / 2.0, self.viewport_size.y / 2.0)
    }

    // =========================================================================
    // ANIMATION UPDATE
    // =========================================================================

    /// Advance the in-flight animation. Returns true while still animating.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(tween) = self.animation.as_mut() else {
            return false;
        };
        let finished = tween.tick(dt);
        self.current = tween.current();
        if finished {
            self.animation = None;
        }
        !finished
    }

    /// Jump to the animation's final value
    pub fn snap_to_target(&mut self) {
        if let Some(tween) = self.animation.take() {
            self.current = tween.target();
        }
    }

    /// Drop the in-flight animation, keeping the displayed transform
    pub fn cancel_animation(&mut self) {
        self.animation = None;
    }

    pub fn set_viewport_size(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 {
            self.viewport_size = size;
        }
    }

    // =========================================================================
    // CONTROLLER OPERATIONS
    // =========================================================================

    /// Multiply the scale by `factor` about the viewport center (animated).
    ///
    /// Repeated calls compose against the pending target, so three quick
    /// `zoom_in(1.5)` calls end at `1.5^3` (clamped).
    pub fn zoom_in(&mut self, factor: f32) -> ViewportTransform {
        self.zoom_by(factor)
    }

    /// Divide the scale by `factor` about the viewport center (animated)
    pub fn zoom_out(&mut self, factor: f32) -> ViewportTransform {
        if factor > 0.0 && factor.is_finite() {
            self.zoom_by(1.0 / factor)
        } else {
            self.target()
        }
    }

    fn zoom_by(&mut self, factor: f32) -> ViewportTransform {
        if !(factor > 0.0 && factor.is_finite()) {
            tracing::debug!("Ignoring zoom factor {}", factor);
            return self.target();
        }
        let base = self.target();
        let center = self.viewport_center();
        let target = self.scaled_about(base, base.scale * factor, center);
        self.animate_to(target, self.settings.zoom_duration_ms);
        target
    }

    /// Wheel zoom keeping `screen_point` fixed (immediate)
    pub fn zoom_at(&mut self, factor: f32, screen_point: Pos2) {
        if !(factor > 0.0 && factor.is_finite()) {
            return;
        }
        self.animation = None;
        self.current = self.scaled_about(self.current, self.current.scale * factor, screen_point);
    }

    /// Pan by a screen-space delta (immediate, cancels any animation)
    pub fn pan_by(&mut self, screen_delta: Vec2) {
        if !(screen_delta.x.is_finite() && screen_delta.y.is_finite()) {
            return;
        }
        self.animation = None;
        self.current.translate_x += screen_delta.x;
        self.current.translate_y += screen_delta.y;
    }

    /// Scale and center so `bounds` (layout space) fills the viewport.
    ///
    /// Degenerate or missing bounds fall back to the identity transform.
    pub fn fit_to_content(&mut self, bounds: Option<Rect>, animate: bool) -> ViewportTransform {
        let target = match bounds {
            Some(bounds) => fit_transform(
                bounds,
                self.viewport_size,
                self.settings.fit_margin,
                self.settings.min_scale,
                self.settings.max_scale,
            )
            .unwrap_or_else(|err| {
                tracing::debug!("fit_to_content: {}; using identity", err);
                ViewportTransform::IDENTITY
            }),
            None => ViewportTransform::IDENTITY,
        };

        if animate {
            self.animate_to(target, self.settings.fit_duration_ms);
        } else {
            self.animation = None;
            self.current = target;
        }
        target
    }

    /// Bring a layout position to the viewport center, keeping the scale
    pub fn center_on(&mut self, world_pos: Pos2) -> ViewportTransform {
        let scale = self.target().scale;
        let center = self.viewport_center();
        let target = ViewportTransform::new(
            center.x - world_pos.x * scale,
            center.y - world_pos.y * scale,
            scale,
        );
        self.animate_to(target, self.settings.center_duration_ms);
        target
    }

    pub fn center_on_node(&mut self, node: &PositionedNode) -> ViewportTransform {
        tracing::debug!("Centering on node {}", node.id);
        self.center_on(node.position())
    }

    /// Back to identity immediately
    pub fn reset(&mut self) {
        self.animation = None;
        self.current = ViewportTransform::IDENTITY;
    }

    /// Replace the transform immediately (scale is clamped)
    pub fn set_transform(&mut self, transform: ViewportTransform) {
        self.animation = None;
        self.current = self.sanitize(transform);
    }

    // =========================================================================
    // COORDINATE TRANSFORMS
    // =========================================================================

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        self.current.apply(world)
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        self.current.invert(screen)
    }

    /// Layout-space rectangle currently visible
    pub fn visible_world_rect(&self) -> Rect {
        Rect::from_min_max(
            self.screen_to_world(Pos2::ZERO),
            self.screen_to_world(self.viewport_size.to_pos2()),
        )
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.settings.min_scale, self.settings.max_scale)
    }

    /// Rescale `base` to `new_scale`, keeping `anchor` (screen) fixed
    fn scaled_about(&self, base: ViewportTransform, new_scale: f32, anchor: Pos2) -> ViewportTransform {
        let new_scale = self.clamp_scale(new_scale);
        let world = base.invert(anchor);
        ViewportTransform::new(
            anchor.x - world.x * new_scale,
            anchor.y - world.y * new_scale,
            new_scale,
        )
    }

    fn sanitize(&self, transform: ViewportTransform) -> ViewportTransform {
        if !transform.is_finite() {
            tracing::warn!("Non-finite viewport transform {:?}; using identity", transform);
            return ViewportTransform::IDENTITY;
        }
        ViewportTransform {
            scale: self.clamp_scale(transform.scale),
            ..transform
        }
    }

    /// Start a new animation from the displayed transform (last write wins)
    fn animate_to(&mut self, target: ViewportTransform, duration_ms: u64) {
        let target = self.sanitize(target);
        if duration_ms == 0 {
            self.animation = None;
            self.current = target;
            return;
        }
        if self.animation.is_some() {
            tracing::trace!("Preempting in-flight viewport animation");
        }
        self.animation = Some(TransformTween::new(self.current, target, duration_ms));
    }
}
