use eframe::egui::{self, Align2, Color32, Context, FontId, Painter, Rect, vec2};

use crate::util::format_age;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, is_refreshing: bool) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = self.draw_bubbles(ui);
                self.draw_header(&ui.painter_at(rect), rect, is_refreshing);
            });
    }

    /// Title block in the top-left corner; painted only, so it never takes
    /// pointer input away from the bubbles underneath.
    fn draw_header(&self, painter: &Painter, rect: Rect, is_refreshing: bool) {
        let origin = rect.left_top() + vec2(20.0, 20.0);
        painter.text(
            origin,
            Align2::LEFT_TOP,
            "Crypto Market Map",
            FontId::proportional(24.0),
            Color32::WHITE,
        );
        painter.text(
            origin + vec2(0.0, 32.0),
            Align2::LEFT_TOP,
            format!("Top {} Coins by Market Cap", self.records.len()),
            FontId::proportional(14.0),
            Color32::from_white_alpha(178),
        );

        let (status, color) = self.status_line(is_refreshing);
        painter.text(
            origin + vec2(0.0, 54.0),
            Align2::LEFT_TOP,
            status,
            FontId::proportional(12.0),
            color,
        );
    }

    fn status_line(&self, is_refreshing: bool) -> (String, Color32) {
        let age = format_age(self.refreshed_at.elapsed());
        if is_refreshing {
            ("Refreshing...".to_owned(), Color32::from_gray(150))
        } else if let Some(error) = &self.refresh_error {
            (
                format!("Refresh failed ({error}); showing data from {age} ago"),
                Color32::from_rgb(0xEF, 0x44, 0x44),
            )
        } else {
            (format!("Updated {age} ago"), Color32::from_gray(120))
        }
    }
}
