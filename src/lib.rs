//! IB Partner Network Graph
//!
//! Layout, viewport and interaction engine for Introducing Broker referral
//! trees, with an egui widget on top. Pure geometry (metrics, layout, link
//! curves, fit transforms) lives beside a thin egui adapter so it can be
//! tested without a drawing surface.

pub mod config;
pub mod error;
pub mod graph;

pub use config::GraphSettings;
pub use error::{ConfigError, GraphError, GraphResult};
pub use graph::{
    // Input / output data
    LinkCurve,
    LinkSegment,
    NetworkLayout,
    NodeRole,
    PositionedNode,
    TreeNode,
    // Engine
    LayoutEngine,
    LayoutSession,
    TreeMetrics,
    ViewportController,
    ViewportTransform,
    // Interaction and rendering
    GraphRenderer,
    HoverEvent,
    InteractionEvent,
    InteractionLayer,
    InteractionSink,
    RenderOutcome,
    // Widget
    NetworkGraphWidget,
};
