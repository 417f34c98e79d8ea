//! Interaction layer - hover and click handling for network nodes
//!
//! Hit tests pointer positions against the laid-out nodes, tracks the single
//! hovered node and turns clicks into `center_on` requests. Results are
//! queued as `InteractionEvent`s for the host to poll, and optionally pushed
//! to an `InteractionSink`.
//!
//! Every handler body runs behind a guard: an error or a panic while building
//! a hover payload or dispatching to the sink is logged and dropped, so the
//! frame loop never sees it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use egui::Pos2;

use super::camera::{ViewportController, ViewportTransform};
use super::spatial::SpatialIndex;
use super::types::{NetworkLayout, PositionedNode};
use crate::config::{InteractionSettings, RenderSettings};
use crate::error::{GraphError, GraphResult};

// =============================================================================
// EVENTS
// =============================================================================

/// Descriptive payload for a hover overlay
#[derive(Debug, Clone, PartialEq)]
pub struct HoverEvent {
    pub node_id: String,
    pub display_name: String,
    pub email_address: String,
    pub referral_code: String,
    /// "Root" or "Level N"
    pub level_label: String,
    /// Direct referrals
    pub child_count: usize,
    /// Pointer position in screen coordinates
    pub screen_pos: Pos2,
}

impl HoverEvent {
    fn from_node(node: &PositionedNode, screen_pos: Pos2) -> Self {
        Self {
            node_id: node.id.clone(),
            display_name: node.display_name.clone(),
            email_address: node.email_address.clone(),
            referral_code: node.referral_code.clone(),
            level_label: node.level_label(),
            child_count: node.child_count,
            screen_pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// Pointer entered a node
    HoverStart(HoverEvent),
    /// Pointer left the hovered node
    HoverEnd { node_id: String },
    /// Node clicked; the viewport is now centering on it
    NodeClicked { node_id: String },
    /// Click that hit no node
    BackgroundClicked,
}

/// Host callbacks, invoked after the event has been queued
pub trait InteractionSink {
    fn on_hover(&mut self, _event: &HoverEvent) -> GraphResult<()> {
        Ok(())
    }

    fn on_hover_end(&mut self, _node_id: &str) -> GraphResult<()> {
        Ok(())
    }

    fn on_click(&mut self, _node: &PositionedNode) -> GraphResult<()> {
        Ok(())
    }
}

// =============================================================================
// INTERACTION LAYER
// =============================================================================

#[derive(Default)]
pub struct InteractionLayer {
    settings: InteractionSettings,
    index: SpatialIndex,
    hovered: Option<usize>,
    hover: Option<HoverEvent>,
    events: Vec<InteractionEvent>,
    sink: Option<Box<dyn InteractionSink>>,
    last_error: Option<GraphError>,
}

impl std::fmt::Debug for InteractionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionLayer")
            .field("hovered", &self.hovered)
            .field("pending_events", &self.events.len())
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl InteractionLayer {
    pub fn new(settings: &InteractionSettings) -> Self {
        Self {
            settings: settings.clone(),
            ..Default::default()
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn InteractionSink>) {
        self.sink = Some(sink);
    }

    /// Re-index after a new layout; any hover is dropped
    pub fn on_layout_changed(&mut self, layout: &NetworkLayout, render: &RenderSettings) {
        self.index = SpatialIndex::from_layout(layout, render);
        if let Some(node_id) = self.hover.take().map(|h| h.node_id) {
            self.events.push(InteractionEvent::HoverEnd { node_id });
        }
        self.hovered = None;
    }

    /// Index of the hovered node in the current layout
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Payload for the hovered node, tracking the pointer
    pub fn current_hover(&self) -> Option<&HoverEvent> {
        self.hover.as_ref()
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Most recent handler failure
    pub fn last_error(&self) -> Option<&GraphError> {
        self.last_error.as_ref()
    }

    /// Node under a screen position, if any
    pub fn hit_test(&self, screen_pos: Pos2, transform: &ViewportTransform) -> Option<usize> {
        if transform.scale <= 0.0 {
            return None;
        }
        let world = transform.invert(screen_pos);
        let slop = self.settings.hit_slop_px / transform.scale;
        self.index.node_at(world, slop)
    }

    /// Pointer moved to `screen_pos`, or left the surface when `None`
    pub fn pointer_moved(
        &mut self,
        screen_pos: Option<Pos2>,
        layout: &NetworkLayout,
        transform: &ViewportTransform,
    ) {
        let hit = screen_pos.and_then(|pos| self.hit_test(pos, transform));

        if hit == self.hovered {
            if let (Some(hover), Some(pos)) = (self.hover.as_mut(), screen_pos) {
                hover.screen_pos = pos;
            }
            return;
        }

        self.clear_hover();

        let (Some(index), Some(pos)) = (hit, screen_pos) else {
            return;
        };
        let payload = guarded("hover payload", || {
            layout
                .nodes
                .get(index)
                .map(|node| HoverEvent::from_node(node, pos))
                .ok_or_else(|| GraphError::Interaction(format!("no node at index {}", index)))
        });

        match payload {
            Ok(event) => {
                self.hovered = Some(index);
                self.hover = Some(event.clone());
                self.events.push(InteractionEvent::HoverStart(event.clone()));
                if let Some(sink) = self.sink.as_mut() {
                    let result = guarded("hover handler", || sink.on_hover(&event));
                    self.record(result);
                }
            }
            Err(err) => self.record::<()>(Err(err)),
        }
    }

    /// Pointer left the drawing surface
    pub fn pointer_left(&mut self) {
        self.clear_hover();
    }

    /// Click at a screen position. A node hit requests `center_on`.
    ///
    /// Returns the clicked node index.
    pub fn click(
        &mut self,
        screen_pos: Pos2,
        layout: &NetworkLayout,
        viewport: &mut ViewportController,
    ) -> Option<usize> {
        let Some(index) = self.hit_test(screen_pos, &viewport.transform()) else {
            self.events.push(InteractionEvent::BackgroundClicked);
            return None;
        };

        let Some(node) = layout.nodes.get(index) else {
            self.record::<()>(Err(GraphError::Interaction(format!(
                "click hit stale node index {}",
                index
            ))));
            return None;
        };

        tracing::debug!("Node clicked: {}", node.id);
        viewport.center_on_node(node);
        self.events.push(InteractionEvent::NodeClicked {
            node_id: node.id.clone(),
        });
        if let Some(sink) = self.sink.as_mut() {
            let result = guarded("click handler", || sink.on_click(node));
            self.record(result);
        }
        Some(index)
    }

    fn clear_hover(&mut self) {
        self.hovered = None;
        let Some(hover) = self.hover.take() else {
            return;
        };
        self.events.push(InteractionEvent::HoverEnd {
            node_id: hover.node_id.clone(),
        });
        if let Some(sink) = self.sink.as_mut() {
            let result = guarded("hover-end handler", || sink.on_hover_end(&hover.node_id));
            self.record(result);
        }
    }

    fn record<T>(&mut self, result: GraphResult<T>) {
        if let Err(err) = result {
            tracing::warn!("{}", err);
            self.last_error = Some(err);
        }
    }
}

/// Run a handler, turning panics into `GraphError::Interaction`
fn guarded<T>(what: &str, f: impl FnOnce() -> GraphResult<T>) -> GraphResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(GraphError::Interaction(format!(
            "{} panicked: {}",
            what,
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
