//! Color palettes for the partner network
//!
//! Visual encoding by role: ROOT is the largest, most saturated marker, SELF
//! gets a highlighted outline, DOWNLINE cycles through the level palette.

use egui::{Color32, Stroke};

use super::types::NodeRole;
use crate::config::RenderSettings;

/// Convert a settings triple into an egui color
pub fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

/// Palette entry for a level (`level mod palette size`)
pub fn level_color(level: u32, settings: &RenderSettings) -> Color32 {
    match settings.level_palette.len() {
        0 => Color32::GRAY,
        n => rgb(settings.level_palette[level as usize % n]),
    }
}

// =============================================================================
// NODE ENCODING
// =============================================================================

/// Fill color for a node
pub fn node_fill(role: NodeRole, level: u32, settings: &RenderSettings) -> Color32 {
    match role {
        NodeRole::Root => rgb(settings.root_color),
        NodeRole::SelfNode => rgb(settings.self_color),
        NodeRole::Downline => level_color(level, settings),
    }
}

/// Outline for a node
pub fn node_outline(role: NodeRole, settings: &RenderSettings) -> Stroke {
    match role {
        NodeRole::SelfNode => Stroke::new(settings.self_outline_width, rgb(settings.self_outline_color)),
        NodeRole::Root => Stroke::new(settings.outline_width, Color32::WHITE),
        NodeRole::Downline => Stroke::new(settings.outline_width, Color32::from_gray(30)),
    }
}

/// Marker radius in layout units
pub fn node_radius(role: NodeRole, settings: &RenderSettings) -> f32 {
    match role {
        NodeRole::Root => settings.root_radius,
        NodeRole::SelfNode => settings.self_radius,
        NodeRole::Downline => settings.downline_radius,
    }
}

/// Ring drawn around the hovered node
pub fn hover_ring_color() -> Color32 {
    Color32::from_rgb(255, 255, 255) // White
}

// =============================================================================
// PANEL COLORS
// =============================================================================

pub fn panel_background() -> Color32 {
    Color32::from_rgb(15, 23, 42)
}

pub fn secondary_text_color() -> Color32 {
    Color32::from_rgb(148, 163, 184)
}
