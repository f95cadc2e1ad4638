use eframe::egui::{self, Rect, Ui, Vec2};

use super::super::physics::{DragController, LayoutNode, Simulation};

/// Topmost disc containing `point`; later nodes are painted over earlier ones.
pub(super) fn node_at(nodes: &[LayoutNode], point: Vec2) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .rev()
        .find(|(_, node)| (node.position - point).length() <= node.radius)
        .map(|(index, _)| index)
}

/// Feeds primary-button drags on the canvas into the drag controller.
/// Positions are converted to engine space (relative to the canvas origin)
/// and kept on the canvas.
pub(super) fn route_pointer(
    drag: &mut DragController,
    simulation: &mut Simulation,
    ui: &Ui,
    rect: Rect,
    response: &egui::Response,
) {
    if response.drag_started_by(egui::PointerButton::Primary) {
        let origin = ui.input(|input| input.pointer.press_origin());
        if let Some(index) = origin.and_then(|origin| node_at(simulation.nodes(), origin - rect.min))
        {
            drag.start(simulation, index);
        }
    }

    if drag.dragged().is_none() {
        return;
    }

    if response.drag_stopped() || !response.dragged() {
        drag.end(simulation);
        return;
    }

    if let Some(pointer) = response.interact_pointer_pos() {
        let local = (pointer - rect.min).clamp(Vec2::ZERO, rect.size());
        drag.move_to(simulation, local);
    }
}
