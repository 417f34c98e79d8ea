//! Graph settings
//!
//! Layout constants, viewport limits, animation timings and visual encoding
//! are read from YAML (see `config/graph_settings.yaml`). Every field has a
//! default so partial files are accepted.
//!
//! Settings are a plain value owned by the host widget and passed down by
//! reference; nothing here is global.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GraphSettings {
    pub layout: LayoutSettings,
    pub viewport: ViewportSettings,
    pub render: RenderSettings,
    pub interaction: InteractionSettings,
}

impl GraphSettings {
    /// Parse settings from a YAML string and validate them
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings: GraphSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_yaml_str(&yaml)?;
        tracing::debug!("Loaded graph settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.viewport;
        if !(v.min_scale > 0.0) {
            return Err(ConfigError::Invalid {
                field: "viewport.min_scale",
                reason: format!("must be positive, got {}", v.min_scale),
            });
        }
        if v.max_scale < v.min_scale {
            return Err(ConfigError::Invalid {
                field: "viewport.max_scale",
                reason: format!("{} is below min_scale {}", v.max_scale, v.min_scale),
            });
        }
        if !(v.fit_margin > 0.0 && v.fit_margin <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "viewport.fit_margin",
                reason: format!("must be in (0, 1], got {}", v.fit_margin),
            });
        }
        if !(v.zoom_step > 0.0) {
            return Err(ConfigError::Invalid {
                field: "viewport.zoom_step",
                reason: format!("must be positive, got {}", v.zoom_step),
            });
        }

        let l = &self.layout;
        if !(l.min_node_radius > 0.0) {
            return Err(ConfigError::Invalid {
                field: "layout.min_node_radius",
                reason: format!("must be positive, got {}", l.min_node_radius),
            });
        }
        if l.sibling_spacing < 1.0 || l.cousin_spacing < l.sibling_spacing {
            return Err(ConfigError::Invalid {
                field: "layout.sibling_spacing",
                reason: "need 1.0 <= sibling_spacing <= cousin_spacing".to_string(),
            });
        }
        if l.depth_factor < 0.0 {
            return Err(ConfigError::Invalid {
                field: "layout.depth_factor",
                reason: format!("must not be negative, got {}", l.depth_factor),
            });
        }
        if !(l.vertical_fraction > 0.0 && l.vertical_fraction <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "layout.vertical_fraction",
                reason: format!("must be in (0, 1], got {}", l.vertical_fraction),
            });
        }
        if !(l.min_row_height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "layout.min_row_height",
                reason: format!("must be positive, got {}", l.min_row_height),
            });
        }

        // Spacing assumes no marker is drawn wider than min_node_radius
        let r = &self.render;
        for (field, radius) in [
            ("render.root_radius", r.root_radius),
            ("render.self_radius", r.self_radius),
            ("render.downline_radius", r.downline_radius),
        ] {
            if !(radius > 0.0 && radius <= l.min_node_radius) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!(
                        "must be in (0, layout.min_node_radius = {}], got {}",
                        l.min_node_radius, radius
                    ),
                });
            }
        }

        if self.render.level_palette.is_empty() {
            return Err(ConfigError::Invalid {
                field: "render.level_palette",
                reason: "at least one color required".to_string(),
            });
        }
        if self.render.label_max_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "render.label_max_chars",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Constants for the tidy tree layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Largest node radius the renderer will draw
    pub min_node_radius: f32,
    /// Minimum center-to-center distance between full siblings
    pub min_sibling_separation: f32,
    /// Separation multiplier for nodes sharing a parent
    pub sibling_spacing: f32,
    /// Separation multiplier for adjacent nodes with different parents
    pub cousin_spacing: f32,
    /// Per-depth growth of the separation (`1 + depth_factor * depth`)
    pub depth_factor: f32,
    /// Fraction of the canvas height used for the tree body
    pub vertical_fraction: f32,
    /// Y of the root row
    pub top_offset: f32,
    /// Rows never get closer than this
    pub min_row_height: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            min_node_radius: 18.0,
            min_sibling_separation: 48.0,
            sibling_spacing: 1.0,
            cousin_spacing: 1.5,
            depth_factor: 0.2,
            vertical_fraction: 0.8,
            top_offset: 40.0,
            min_row_height: 90.0,
        }
    }
}

impl LayoutSettings {
    /// Base horizontal distance for a separation multiplier of 1.0
    pub fn spacing_unit(&self) -> f32 {
        (self.min_node_radius * 2.0).max(self.min_sibling_separation)
    }

    /// `1 + depth_factor * depth`
    pub fn depth_multiplier(&self, depth: usize) -> f32 {
        1.0 + self.depth_factor * depth as f32
    }
}

/// Zoom limits and animation timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Factor used by the zoom-in / zoom-out buttons
    pub zoom_step: f32,
    pub zoom_duration_ms: u64,
    pub center_duration_ms: u64,
    pub fit_duration_ms: u64,
    /// Share of the viewport the content may occupy after fit-to-content
    pub fit_margin: f32,
    /// Scale change per scroll unit for wheel zoom
    pub wheel_sensitivity: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            zoom_step: 1.5,
            zoom_duration_ms: 300,
            center_duration_ms: 750,
            fit_duration_ms: 500,
            fit_margin: 0.8,
            wheel_sensitivity: 0.0015,
        }
    }
}

/// Visual encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub root_radius: f32,
    pub self_radius: f32,
    pub downline_radius: f32,
    pub outline_width: f32,
    pub self_outline_width: f32,
    pub root_color: [u8; 3],
    pub self_color: [u8; 3],
    pub self_outline_color: [u8; 3],
    /// Cyclic palette for downline nodes, indexed by `level mod len`
    pub level_palette: Vec<[u8; 3]>,
    pub link_color: [u8; 3],
    pub link_width: f32,
    pub label_color: [u8; 3],
    pub label_font_size: f32,
    pub label_max_chars: usize,
    /// Shown instead of empty or missing descriptive fields
    pub placeholder: String,
    /// Labels are hidden below this scale
    pub label_min_scale: f32,
    /// Segments used when flattening link curves
    pub curve_segments: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            root_radius: 18.0,
            self_radius: 14.0,
            downline_radius: 10.0,
            outline_width: 1.5,
            self_outline_width: 3.5,
            root_color: [220, 38, 38],
            self_color: [37, 99, 235],
            self_outline_color: [250, 204, 21],
            level_palette: vec![
                [16, 185, 129],
                [245, 158, 11],
                [139, 92, 246],
                [236, 72, 153],
                [20, 184, 166],
                [100, 116, 139],
            ],
            link_color: [148, 163, 184],
            link_width: 1.5,
            label_color: [226, 232, 240],
            label_font_size: 11.0,
            label_max_chars: 16,
            placeholder: "N/A".to_string(),
            label_min_scale: 0.45,
            curve_segments: 16,
        }
    }
}

/// Pointer handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Extra screen pixels around a node that still count as a hit
    pub hit_slop_px: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self { hit_slop_px: 4.0 }
    }
}
