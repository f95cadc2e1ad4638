use eframe::egui::{self, Align, Context, Layout, Pos2, RichText};

use crate::market::BubbleRecord;
use crate::util::{format_change, format_market_cap, format_price};

use super::super::render_utils::{TOOLTIP_SIZE, accent_color};

pub(in crate::app) fn show_tooltip(ctx: &Context, origin: Pos2, record: &BubbleRecord) {
    let name = if record.name.is_empty() {
        record.id.as_str()
    } else {
        record.name.as_str()
    };

    egui::Area::new(egui::Id::new("bubble_tooltip"))
        .order(egui::Order::Tooltip)
        .fixed_pos(origin)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(TOOLTIP_SIZE.x - 16.0);
                ui.horizontal(|ui| {
                    ui.label(RichText::new(name).strong().size(18.0));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(RichText::new(record.display_symbol()).small().weak());
                    });
                });
                ui.add_space(6.0);

                egui::Grid::new("bubble_tooltip_rows")
                    .num_columns(2)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Price").weak());
                        ui.label(format_price(record.price));
                        ui.end_row();

                        ui.label(RichText::new("Market Cap").weak());
                        ui.label(format_market_cap(record.market_cap));
                        ui.end_row();

                        ui.label(RichText::new("24h Change").weak());
                        ui.colored_label(
                            accent_color(record.change_category()),
                            format_change(record.change_24h),
                        );
                        ui.end_row();
                    });
            });
        });
}
