//! Partner Network Graph Visualization Module
//!
//! Lays out an Introducing Broker referral tree and draws it with pan/zoom,
//! fit-to-content and click-to-center navigation.
//!
//! # Architecture
//!
//! ```text
//! TreeNode (from the network-tree endpoint)
//!        │
//!        ▼
//! NetworkTree (validated pre-order arena) ──► TreeMetrics
//!        │
//!        ▼
//! LayoutEngine (tidy tree) ──► NetworkLayout (positioned nodes + link curves)
//!        │
//!        ├──► GraphRenderer (scene of draw commands ──► egui::Painter)
//!        │
//!        └──► InteractionLayer (hover / click, R-tree hit testing)
//!                    │
//!                    ▼
//!              ViewportController (translate + scale, eased animations)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut widget = NetworkGraphWidget::new(GraphSettings::default());
//! widget.set_tree(Some(tree));
//! widget.ui(ui);
//! for event in widget.take_events() { /* tooltips, analytics */ }
//! ```

pub mod animation;
pub mod camera;
pub mod colors;
pub mod edges;
pub mod hover_card;
pub mod input;
pub mod layout;
pub mod metrics;
pub mod network;
pub mod render;
pub mod session;
pub mod spatial;
pub mod types;
pub mod viewport_fit;

pub use camera::{ViewportController, ViewportTransform};
pub use edges::{link_path, LinkCurve};
pub use input::{HoverEvent, InteractionEvent, InteractionLayer, InteractionSink};
pub use layout::LayoutEngine;
pub use metrics::{SubtreeMetrics, TreeMetrics};
pub use network::{NetworkNode, NetworkTree};
pub use render::{paint_scene, DrawCommand, GraphRenderer, RenderOutcome, Scene};
pub use session::LayoutSession;
pub use types::*;

use egui::{Color32, Pos2, Rect, Sense, Vec2};

use crate::config::GraphSettings;
use crate::error::GraphError;
use viewport_fit::ViewportFit;

// =============================================================================
// NETWORK GRAPH WIDGET
// =============================================================================

/// Owns one visualization: layout session, viewport, interaction state
#[derive(Debug)]
pub struct NetworkGraphWidget {
    settings: GraphSettings,
    session: LayoutSession,
    viewport: ViewportController,
    fit: ViewportFit,
    interaction: InteractionLayer,
    renderer: GraphRenderer,
}

impl Default for NetworkGraphWidget {
    fn default() -> Self {
        Self::new(GraphSettings::default())
    }
}

impl NetworkGraphWidget {
    pub fn new(settings: GraphSettings) -> Self {
        Self {
            session: LayoutSession::new(
                LayoutEngine::new(&settings.layout),
                settings.render.placeholder.clone(),
            ),
            viewport: ViewportController::new(&settings.viewport),
            fit: ViewportFit::new(),
            interaction: InteractionLayer::new(&settings.interaction),
            renderer: GraphRenderer::new(&settings.render),
            settings,
        }
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Supply a freshly fetched tree (`None` when the backend had no data)
    pub fn set_tree(&mut self, tree: Option<TreeNode>) {
        if let Some(ref tree) = tree {
            tracing::info!("Network tree loaded: {} nodes", tree.node_count());
        }
        self.session.set_tree(tree);
    }

    /// Parse and supply a network-tree response body
    pub fn set_tree_json(&mut self, json: &str) {
        match TreeNode::from_json(json) {
            Ok(tree) => self.set_tree(Some(tree)),
            Err(err) => {
                tracing::warn!("No usable network tree: {}", err);
                self.set_tree(None);
            }
        }
    }

    pub fn clear(&mut self) {
        self.session.set_tree(None);
    }

    pub fn layout(&self) -> &NetworkLayout {
        self.session.layout()
    }

    /// Problems found in the current tree (cycles, placeholders, ...)
    pub fn diagnostics(&self) -> &[GraphError] {
        &self.session.layout().diagnostics
    }

    pub fn has_data(&self) -> bool {
        !self.session.layout().is_empty()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    pub fn set_sink(&mut self, sink: Box<dyn InteractionSink>) {
        self.interaction.set_sink(sink);
    }

    pub fn take_events(&mut self) -> Vec<InteractionEvent> {
        self.interaction.take_events()
    }

    pub fn hover(&self) -> Option<&HoverEvent> {
        self.interaction.current_hover()
    }

    // =========================================================================
    // CONTROLS
    // =========================================================================

    pub fn zoom_in(&mut self) -> ViewportTransform {
        self.fit.disable_auto();
        self.viewport.zoom_in(self.settings.viewport.zoom_step)
    }

    pub fn zoom_out(&mut self) -> ViewportTransform {
        self.fit.disable_auto();
        self.viewport.zoom_out(self.settings.viewport.zoom_step)
    }

    /// Fit the whole tree (animated) and return to auto-fit mode
    pub fn fit_to_content(&mut self) -> ViewportTransform {
        self.fit.enable_auto();
        self.viewport
            .fit_to_content(self.session.layout().bounds(), true)
    }

    /// Center on a node by id
    pub fn center_on(&mut self, node_id: &str) -> Option<ViewportTransform> {
        let node = self.session.layout().get_node(node_id)?;
        self.fit.disable_auto();
        Some(self.viewport.center_on_node(node))
    }

    // =========================================================================
    // FRAME UPDATE
    // =========================================================================

    /// Per-frame bookkeeping independent of egui: record the surface size,
    /// re-layout if needed, advance the viewport animation.
    ///
    /// Returns true while something is still changing.
    pub fn update(&mut self, size: Vec2, dt: f32) -> bool {
        self.viewport.set_viewport_size(size);
        self.session.resize(size);
        let relaid = self.session.run_pending();
        if relaid {
            self.on_new_layout();
        }
        let animating = self.viewport.tick(dt);
        relaid || animating
    }

    fn on_new_layout(&mut self) {
        let layout = self.session.layout();
        self.interaction
            .on_layout_changed(layout, &self.settings.render);
        self.fit.on_content_change(layout);

        for diagnostic in layout.diagnostics.iter().filter(|d| d.is_structural()) {
            tracing::warn!("Rendered with a subtree removed: {}", diagnostic);
        }

        if self.fit.should_apply() {
            let animate = self.fit.take_animate();
            self.viewport.fit_to_content(self.fit.content_bounds, animate);
        }
    }

    /// Main UI function
    pub fn ui(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let screen_rect = response.rect;
        let origin = screen_rect.min.to_vec2();

        let dt = ui.input(|i| i.stable_dt);
        let mut needs_repaint = self.update(screen_rect.size(), dt);

        needs_repaint |= self.handle_gestures(ui, &response, origin);

        painter.rect_filled(screen_rect, 0.0, colors::panel_background());

        let surface = Rect::from_min_size(Pos2::ZERO, screen_rect.size());
        let outcome = self.renderer.build_scene(
            self.session.layout(),
            &self.viewport.transform(),
            surface,
            self.interaction.hovered(),
        );
        match outcome {
            RenderOutcome::NoData => self.render_empty_state(&painter, screen_rect),
            RenderOutcome::Scene(scene) => {
                paint_scene(&painter, &scene, origin);
                self.render_chrome(&painter, screen_rect, &scene);
            }
        }

        self.render_controls(ui, screen_rect);

        if let Some(hover) = self.interaction.current_hover() {
            let mut card = hover.clone();
            card.screen_pos += origin;
            hover_card::render_hover_card(ui.ctx(), &card);
        }

        if needs_repaint || self.viewport.is_animating() {
            ui.ctx().request_repaint();
        }
        response
    }

    /// Pointer hover/click, drag to pan, wheel to zoom
    fn handle_gestures(&mut self, ui: &egui::Ui, response: &egui::Response, origin: Vec2) -> bool {
        let mut changed = false;
        let layout = self.session.layout();
        let pointer = response.hover_pos().map(|p| p - origin);

        self.interaction
            .pointer_moved(pointer, layout, &self.viewport.transform());

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if self
                    .interaction
                    .click(pos - origin, layout, &mut self.viewport)
                    .is_some()
                {
                    self.fit.disable_auto();
                }
                changed = true;
            }
        }

        if response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                self.viewport.pan_by(delta);
                self.fit.disable_auto();
                changed = true;
            }
        }

        if let Some(pointer) = pointer {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                let factor = (scroll * self.settings.viewport.wheel_sensitivity).exp();
                self.viewport.zoom_at(factor, pointer);
                self.fit.disable_auto();
                changed = true;
            }
        }

        changed
    }

    /// Zoom and fit buttons in the top-right corner
    fn render_controls(&mut self, ui: &mut egui::Ui, screen_rect: Rect) {
        let size = Vec2::new(28.0, 24.0);
        let mut pos = screen_rect.right_top() + Vec2::new(-10.0 - size.x, 10.0);

        let mut button = |ui: &mut egui::Ui, label: &str, hint: &str| {
            let rect = Rect::from_min_size(pos, size);
            pos.x -= size.x + 4.0;
            ui.put(rect, egui::Button::new(label)).on_hover_text(hint).clicked()
        };

        if button(ui, "⤢", "Fit to content") {
            self.fit_to_content();
        }
        if button(ui, "−", "Zoom out") {
            self.zoom_out();
        }
        if button(ui, "+", "Zoom in") {
            self.zoom_in();
        }
    }

    /// Render empty state when no tree is loaded
    fn render_empty_state(&self, painter: &egui::Painter, screen_rect: Rect) {
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "No network data",
            egui::FontId::proportional(14.0),
            colors::secondary_text_color(),
        );
    }

    /// Render UI chrome (stats, zoom, diagnostics)
    fn render_chrome(&self, painter: &egui::Painter, screen_rect: Rect, scene: &Scene) {
        let layout = self.session.layout();
        let stats_text = format!(
            "{} partners | {} links | {} visible",
            layout.nodes.len(),
            layout.links.len(),
            scene.visible_nodes
        );
        painter.text(
            screen_rect.left_top() + Vec2::new(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            stats_text,
            egui::FontId::proportional(12.0),
            colors::secondary_text_color(),
        );

        let structural = layout
            .diagnostics
            .iter()
            .filter(|d| d.is_structural())
            .count();
        if structural > 0 {
            painter.text(
                screen_rect.left_top() + Vec2::new(10.0, 28.0),
                egui::Align2::LEFT_TOP,
                format!("{} subtree(s) skipped: invalid structure", structural),
                egui::FontId::proportional(11.0),
                Color32::from_rgb(248, 113, 113),
            );
        }

        let zoom_text = format!("Zoom: {:.0}%", self.viewport.scale() * 100.0);
        painter.text(
            screen_rect.left_bottom() + Vec2::new(10.0, -30.0),
            egui::Align2::LEFT_BOTTOM,
            zoom_text,
            egui::FontId::proportional(11.0),
            Color32::from_rgb(120, 120, 120),
        );

        let hints = "Drag: Pan | Scroll: Zoom | Click: Center";
        painter.text(
            screen_rect.left_bottom() + Vec2::new(10.0, -10.0),
            egui::Align2::LEFT_BOTTOM,
            hints,
            egui::FontId::proportional(10.0),
            Color32::from_rgb(100, 100, 100),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> TreeNode {
        TreeNode::new("r").with_children((0..3).map(|i| {
            TreeNode::new(format!("c{}", i))
                .with_children((0..2).map(move |j| TreeNode::new(format!("c{}-{}", i, j))))
        }))
    }

    #[test]
    fn test_first_layout_fits_immediately() {
        let mut widget = NetworkGraphWidget::default();
        widget.set_tree(Some(tree()));
        widget.update(Vec2::new(800.0, 600.0), 0.0);

        assert!(widget.has_data());
        assert!(!widget.viewport().is_animating());
        let bounds = widget.layout().bounds().unwrap_or(Rect::NOTHING);
        let screen = widget.transform().apply_rect(bounds);
        let surface = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        assert!(surface.contains_rect(screen));
    }

    #[test]
    fn test_no_tree_shows_no_data() {
        let mut widget = NetworkGraphWidget::default();
        widget.set_tree_json("null");
        widget.update(Vec2::new(800.0, 600.0), 0.0);
        assert!(!widget.has_data());
        assert_eq!(widget.diagnostics(), &[GraphError::MissingData]);
    }

    #[test]
    fn test_resize_relayouts() {
        let mut widget = NetworkGraphWidget::default();
        widget.set_tree(Some(tree()));
        widget.update(Vec2::new(800.0, 600.0), 0.0);
        let before = widget.layout().canvas_width;
        widget.update(Vec2::new(1200.0, 600.0), 0.0);
        assert_eq!(before, 800.0);
        assert_eq!(widget.layout().canvas_width, 1200.0);
    }

    #[test]
    fn test_manual_zoom_survives_resize() {
        let mut widget = NetworkGraphWidget::default();
        widget.set_tree(Some(tree()));
        widget.update(Vec2::new(800.0, 600.0), 0.0);
        widget.zoom_in();
        widget.update(Vec2::new(800.0, 600.0), 1.0);
        let zoomed = widget.transform().scale;

        widget.update(Vec2::new(900.0, 700.0), 1.0);
        assert_eq!(widget.transform().scale, zoomed);
    }

    #[test]
    fn test_center_on_by_id() {
        let mut widget = NetworkGraphWidget::default();
        widget.set_tree(Some(tree()));
        widget.update(Vec2::new(800.0, 600.0), 0.0);

        assert!(widget.center_on("missing").is_none());
        assert!(widget.center_on("c2-1").is_some());
        widget.update(Vec2::new(800.0, 600.0), 1.0);

        let node = widget.layout().get_node("c2-1").map(|n| n.position());
        let screen = node.map(|p| widget.transform().apply(p));
        let screen = screen.unwrap_or(Pos2::ZERO);
        assert!((screen.x - 400.0).abs() < 1.0);
        assert!((screen.y - 300.0).abs() < 1.0);
    }
}
