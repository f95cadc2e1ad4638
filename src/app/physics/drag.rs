use eframe::egui::Vec2;
use tracing::debug;

use super::Simulation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        index: usize,
    },
}

#[derive(Debug, Default)]
pub(in crate::app) struct DragController {
    state: DragState,
}

impl DragController {
    /// Pins `index` where it currently is and re-heats the layout.
    /// Ignored while another drag is in progress.
    pub(in crate::app) fn start(&mut self, simulation: &mut Simulation, index: usize) -> bool {
        if let DragState::Dragging { index: current } = self.state {
            debug!(current, requested = index, "drag already active, ignoring start");
            return false;
        }

        let Some(position) = simulation.nodes().get(index).map(|node| node.position) else {
            return false;
        };
        if !simulation.pin(index, position) {
            return false;
        }

        let level = simulation.config().drag_alpha_target;
        simulation.reheat(level);
        self.state = DragState::Dragging { index };
        debug!(index, id = %simulation.nodes()[index].id, "drag started");
        true
    }

    pub(in crate::app) fn move_to(&mut self, simulation: &mut Simulation, pointer: Vec2) {
        if let DragState::Dragging { index } = self.state {
            simulation.pin(index, pointer);
        }
    }

    /// Releases the held node; also used for cancelled drags.
    pub(in crate::app) fn end(&mut self, simulation: &mut Simulation) {
        if let DragState::Dragging { index } = self.state {
            simulation.release(index);
            simulation.cool();
            debug!(index, "drag ended");
        }
        self.state = DragState::Idle;
    }

    pub(in crate::app) fn dragged(&self) -> Option<usize> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { index } => Some(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::super::{EngineState, Viewport};
    use super::*;
    use crate::config::BubbleConfig;
    use crate::market::record;

    fn simulation() -> Simulation {
        let records = (1..=12)
            .map(|index| record(&format!("c{index}"), Some(index as f64 * 1e7), Some(-1.0)))
            .collect::<Vec<_>>();
        let mut rng = StdRng::seed_from_u64(99);
        Simulation::build(
            &records,
            Viewport::new(600.0, 400.0),
            BubbleConfig::default(),
            &mut rng,
        )
    }

    fn pinned_count(simulation: &Simulation) -> usize {
        simulation
            .nodes()
            .iter()
            .filter(|node| node.is_pinned())
            .count()
    }

    #[test]
    fn start_pins_at_current_position() {
        let mut simulation = simulation();
        let mut drag = DragController::default();
        let before = simulation.nodes()[3].position;

        assert!(drag.start(&mut simulation, 3));
        assert_eq!(drag.dragged(), Some(3));
        assert_eq!(simulation.nodes()[3].pin(), Some(before));
        assert_eq!(pinned_count(&simulation), 1);
    }

    #[test]
    fn pinned_node_follows_pointer_exactly_every_tick() {
        let mut simulation = simulation();
        let mut drag = DragController::default();
        drag.start(&mut simulation, 0);

        let path = [vec2(10.0, 10.0), vec2(300.0, 200.0), vec2(-40.0, 450.0)];
        for pointer in path {
            drag.move_to(&mut simulation, pointer);
            for _ in 0..5 {
                simulation.tick();
                assert_eq!(simulation.nodes()[0].position, pointer);
            }
        }
    }

    #[test]
    fn drag_keeps_engine_warm_then_cools_after_end() {
        let mut simulation = simulation();
        let mut drag = DragController::default();
        while simulation.tick() != super::super::TickOutcome::Settled {}

        drag.start(&mut simulation, 2);
        assert_eq!(simulation.state(), EngineState::Active);
        for _ in 0..600 {
            simulation.tick();
        }
        assert_eq!(simulation.state(), EngineState::Active);
        assert!(simulation.alpha() >= BubbleConfig::default().drag_alpha_target - 1e-3);

        drag.end(&mut simulation);
        assert_eq!(drag.dragged(), None);
        assert_eq!(pinned_count(&simulation), 0);
        for _ in 0..1000 {
            simulation.tick();
        }
        assert_eq!(simulation.state(), EngineState::Settled);
    }

    #[test]
    fn second_start_is_ignored() {
        let mut simulation = simulation();
        let mut drag = DragController::default();
        assert!(drag.start(&mut simulation, 1));
        assert!(!drag.start(&mut simulation, 4));
        assert_eq!(drag.dragged(), Some(1));
        assert_eq!(pinned_count(&simulation), 1);
        assert!(simulation.nodes()[1].is_pinned());
    }

    #[test]
    fn released_node_rejoins_simulation() {
        let mut simulation = simulation();
        let mut drag = DragController::default();
        drag.start(&mut simulation, 5);
        drag.move_to(&mut simulation, vec2(-100.0, -100.0));
        simulation.tick();
        drag.end(&mut simulation);
        simulation.tick();

        let node = &simulation.nodes()[5];
        assert!(!node.is_pinned());
        assert!(node.position.x >= node.radius && node.position.y >= node.radius);
    }

    #[test]
    fn invalid_targets_are_rejected() {
        let mut simulation = simulation();
        let mut drag = DragController::default();
        assert!(!drag.start(&mut simulation, 99));
        assert_eq!(drag.dragged(), None);

        drag.start(&mut simulation, 0);
        let held = simulation.nodes()[0].position;
        drag.move_to(&mut simulation, vec2(f32::NAN, 3.0));
        assert_eq!(simulation.nodes()[0].pin(), Some(held));
    }

    #[test]
    fn end_without_start_is_harmless() {
        let mut simulation = simulation();
        let mut drag = DragController::default();
        drag.end(&mut simulation);
        assert_eq!(drag.dragged(), None);
        assert_eq!(pinned_count(&simulation), 0);
    }
}
