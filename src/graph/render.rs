//! Rendering - turns a positioned network into draw commands
//!
//! `GraphRenderer::build_scene` is pure: layout + transform + hover state in,
//! a list of primitives in viewport coordinates out. `paint_scene` is the
//! thin egui adapter that replays those primitives on a `Painter`.

use egui::{Align2, Color32, FontId, Pos2, Rect, Shape, Stroke, Vec2};

use super::camera::ViewportTransform;
use super::colors::{hover_ring_color, node_fill, node_outline, node_radius, rgb};
use super::types::NetworkLayout;
use crate::config::RenderSettings;

/// Gap between a node's edge and its first label
const LABEL_GAP: f32 = 4.0;

// =============================================================================
// SCENE
// =============================================================================

/// One drawing primitive, in viewport coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Flattened link curve
    Link { points: Vec<Pos2>, stroke: Stroke },
    /// Node marker
    Node {
        index: usize,
        center: Pos2,
        radius: f32,
        fill: Color32,
        outline: Stroke,
    },
    /// Highlight around the hovered node
    HoverRing {
        center: Pos2,
        radius: f32,
        stroke: Stroke,
    },
    Label {
        pos: Pos2,
        anchor: Align2,
        text: String,
        font_size: f32,
        color: Color32,
    },
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    /// Nodes that survived culling
    pub visible_nodes: usize,
    pub culled_nodes: usize,
}

impl Scene {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn node_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Node { .. }))
            .count()
    }
}

/// Result of a render pass
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// Nothing to draw; the host shows its empty state
    NoData,
    Scene(Scene),
}

impl RenderOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, RenderOutcome::NoData)
    }

    pub fn scene(&self) -> Option<&Scene> {
        match self {
            RenderOutcome::Scene(scene) => Some(scene),
            RenderOutcome::NoData => None,
        }
    }
}

// =============================================================================
// GRAPH RENDERER
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    settings: RenderSettings,
}

impl GraphRenderer {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Build the draw list for one frame.
    ///
    /// `viewport` is the drawing surface in viewport coordinates (origin at
    /// its top-left); anything fully outside it is culled.
    pub fn build_scene(
        &self,
        layout: &NetworkLayout,
        transform: &ViewportTransform,
        viewport: Rect,
        hovered: Option<usize>,
    ) -> RenderOutcome {
        if layout.is_empty() {
            return RenderOutcome::NoData;
        }

        let s = &self.settings;
        let mut scene = Scene::default();

        // Links first (below nodes)
        let link_stroke = Stroke::new(s.link_width, rgb(s.link_color));
        for link in &layout.links {
            let curve = link.curve.transformed(transform);
            let hull = Rect::from_points(&curve.points());
            if !hull.intersects(viewport) {
                continue;
            }
            scene.commands.push(DrawCommand::Link {
                points: curve.flatten(s.curve_segments),
                stroke: link_stroke,
            });
        }

        let show_labels = transform.scale >= s.label_min_scale;
        let mut labels = Vec::new();

        for (index, node) in layout.nodes.iter().enumerate() {
            let center = transform.apply(node.position());
            let radius = node_radius(node.role, s) * transform.scale;
            if !viewport.expand(radius).contains(center) {
                scene.culled_nodes += 1;
                continue;
            }
            scene.visible_nodes += 1;

            scene.commands.push(DrawCommand::Node {
                index,
                center,
                radius,
                fill: node_fill(node.role, node.level, s),
                outline: node_outline(node.role, s),
            });

            if hovered == Some(index) {
                scene.commands.push(DrawCommand::HoverRing {
                    center,
                    radius: radius + 3.0,
                    stroke: Stroke::new(2.0, hover_ring_color()),
                });
            }

            if show_labels {
                let color = rgb(s.label_color);
                let name_pos = center + Vec2::new(0.0, radius + LABEL_GAP);
                labels.push(DrawCommand::Label {
                    pos: name_pos,
                    anchor: Align2::CENTER_TOP,
                    text: truncate_label(&node.display_name, s.label_max_chars, &s.placeholder),
                    font_size: s.label_font_size,
                    color,
                });
                labels.push(DrawCommand::Label {
                    pos: name_pos + Vec2::new(0.0, s.label_font_size + 2.0),
                    anchor: Align2::CENTER_TOP,
                    text: truncate_label(&node.referral_code, s.label_max_chars, &s.placeholder),
                    font_size: s.label_font_size * 0.85,
                    color: color.gamma_multiply(0.7),
                });
            }
        }

        // Labels on top of every marker
        scene.commands.extend(labels);

        RenderOutcome::Scene(scene)
    }
}

/// Shorten a label to `max_chars` characters plus "...".
///
/// Blank text becomes the placeholder.
pub fn truncate_label(text: &str, max_chars: usize, placeholder: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return placeholder.to_string();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

// =============================================================================
// EGUI ADAPTER
// =============================================================================

/// Replay a scene on an egui painter, offset by the surface's screen origin
pub fn paint_scene(painter: &egui::Painter, scene: &Scene, origin: Vec2) {
    for command in &scene.commands {
        match command {
            DrawCommand::Link { points, stroke } => {
                let points = points.iter().map(|p| *p + origin).collect::<Vec<_>>();
                painter.add(Shape::line(points, *stroke));
            }
            DrawCommand::Node {
                center,
                radius,
                fill,
                outline,
                ..
            } => {
                painter.circle(*center + origin, *radius, *fill, *outline);
            }
            DrawCommand::HoverRing {
                center,
                radius,
                stroke,
            } => {
                painter.circle_stroke(*center + origin, *radius, *stroke);
            }
            DrawCommand::Label {
                pos,
                anchor,
                text,
                font_size,
                color,
            } => {
                painter.text(
                    *pos + origin,
                    *anchor,
                    text,
                    FontId::proportional(*font_size),
                    *color,
                );
            }
        }
    }
}
