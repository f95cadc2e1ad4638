use eframe::egui::{
    self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, epaint::QuadraticBezierShape,
};
use tracing::trace;

use super::super::physics::{EngineState, TickOutcome, Viewport};
use super::super::render_utils::{
    BubbleStyle, TOOLTIP_SIZE, blend_color, draw_background, label_font_size, radial_disc,
    shine_points, tooltip_origin,
};
use super::super::ui::show_tooltip;
use super::super::ViewModel;
use super::interaction::{node_at, route_pointer};

impl ViewModel {
    pub(in crate::app) fn draw_bubbles(&mut self, ui: &mut Ui) -> Rect {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.ensure_layout(Viewport::new(rect.width(), rect.height()));
        if let Some(simulation) = self.simulation.as_mut() {
            route_pointer(&mut self.drag, simulation, ui, rect, &response);
            if let TickOutcome::Ticked {
                displacement,
                bounced,
            } = simulation.tick()
            {
                trace!(displacement, bounced, alpha = simulation.alpha(), "layout ticked");
            }
            if simulation.state() == EngineState::Active || self.drag.dragged().is_some() {
                ui.ctx().request_repaint();
            }
        }

        let Some(simulation) = self.simulation.as_ref() else {
            return rect;
        };
        let nodes = simulation.nodes();
        if nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No market data",
                FontId::proportional(16.0),
                Color32::from_gray(160),
            );
            return rect;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));
        let hovered = self
            .drag
            .dragged()
            .or_else(|| pointer.and_then(|pointer| node_at(nodes, pointer - rect.min)));

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.drag.dragged().is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        let shine = Stroke::new(2.0, Color32::from_white_alpha(102));
        for node in nodes {
            let Some(record) = self.record_for(&node.id) else {
                continue;
            };
            let center = rect.min + node.position;
            let style = BubbleStyle::for_category(record.change_category());

            painter.add(radial_disc(center, node.radius, style.core, style.rim));
            painter.circle_stroke(center, node.radius, Stroke::new(1.5, style.stroke));
            painter.add(QuadraticBezierShape::from_points_stroke(
                shine_points(center, node.radius),
                false,
                Color32::TRANSPARENT,
                shine,
            ));
        }

        if let Some(index) = hovered
            && let Some(node) = nodes.get(index)
            && let Some(record) = self.record_for(&node.id)
        {
            let center = rect.min + node.position;
            let style = BubbleStyle::for_category(record.change_category());
            let glow = blend_color(style.stroke, Color32::from_white_alpha(70), 0.6);

            painter.circle_stroke(center, node.radius + 3.0, Stroke::new(6.0, glow));
            painter.circle_stroke(center, node.radius, Stroke::new(3.0, Color32::WHITE));
            painter.text(
                center,
                Align2::CENTER_CENTER,
                record.display_symbol(),
                FontId::proportional(label_font_size(node.radius)),
                Color32::WHITE,
            );

            if let Some(pointer) = pointer {
                let origin = tooltip_origin(pointer - rect.min, rect.size(), TOOLTIP_SIZE);
                show_tooltip(ui.ctx(), rect.min + origin, record);
            }
        }

        rect
    }
}
