//! Hover card - floating partner details next to the pointer
//!
//! Renders an `InteractionLayer` hover payload as a tooltip-order `egui::Area`.

use egui::{Color32, Pos2, Rect, RichText, Ui, Vec2};

use super::colors::secondary_text_color;
use super::input::HoverEvent;

/// Expected card footprint, used to keep it on screen
const CARD_SIZE: Vec2 = Vec2::new(240.0, 120.0);

/// Offset from the pointer
const POINTER_OFFSET: Vec2 = Vec2::new(14.0, 14.0);

/// Label/value rows shown on the card
pub fn card_rows(event: &HoverEvent) -> Vec<(&'static str, String)> {
    vec![
        ("Email", event.email_address.clone()),
        ("Referral code", event.referral_code.clone()),
        ("Level", event.level_label.clone()),
        ("Direct referrals", event.child_count.to_string()),
    ]
}

/// Top-left corner for the card: beside the pointer, flipped to stay inside
/// `screen`
pub fn card_position(pointer: Pos2, screen: Rect) -> Pos2 {
    let mut pos = pointer + POINTER_OFFSET;
    if pos.x + CARD_SIZE.x > screen.max.x {
        pos.x = pointer.x - POINTER_OFFSET.x - CARD_SIZE.x;
    }
    if pos.y + CARD_SIZE.y > screen.max.y {
        pos.y = pointer.y - POINTER_OFFSET.y - CARD_SIZE.y;
    }
    Pos2::new(pos.x.max(screen.min.x), pos.y.max(screen.min.y))
}

/// Show the card. `screen_pos` in the event must already be in egui screen
/// coordinates.
pub fn render_hover_card(ctx: &egui::Context, event: &HoverEvent) {
    let pos = card_position(event.screen_pos, ctx.screen_rect());
    egui::Area::new(egui::Id::new("network_hover_card"))
        .fixed_pos(pos)
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(CARD_SIZE.x);
                render_card_content(ui, event);
            });
        });
}

fn render_card_content(ui: &mut Ui, event: &HoverEvent) {
    ui.label(RichText::new(&event.display_name).strong().color(Color32::WHITE));
    ui.add_space(4.0);
    egui::Grid::new("hover_card_grid")
        .num_columns(2)
        .spacing([8.0, 2.0])
        .show(ui, |ui| {
            for (label, value) in card_rows(event) {
                ui.label(RichText::new(label).small().color(secondary_text_color()));
                ui.label(RichText::new(value).small());
                ui.end_row();
            }
        });
}
