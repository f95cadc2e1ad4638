mod boundary;
mod drag;
mod forces;
mod node;
mod quadtree;
mod scale;

use eframe::egui::{Vec2, vec2};
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::config::BubbleConfig;
use crate::market::{BubbleRecord, magnitude_domain};

use boundary::resolve_bounds;
pub(in crate::app) use drag::DragController;
use forces::{Axis, AxisPull, Center, Collide, Force, ManyBody};
pub(in crate::app) use node::{LayoutNode, Viewport};
pub(in crate::app) use scale::SqrtScale;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum EngineState {
    Active,
    Settled,
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum TickOutcome {
    /// A full tick ran; `displacement` is the summed distance moved by all nodes
    /// and `bounced` counts nodes reflected off a viewport edge.
    Ticked { displacement: f32, bounced: usize },
    Settled,
    Halted,
}

pub(in crate::app) struct Simulation {
    nodes: Vec<LayoutNode>,
    forces: Vec<Box<dyn Force>>,
    viewport: Viewport,
    scale: SqrtScale,
    config: BubbleConfig,
    alpha: f32,
    alpha_target: f32,
    state: EngineState,
}

impl Simulation {
    /// Seeds one node per record at a uniformly random spot in `viewport`.
    pub(in crate::app) fn build<R: Rng>(
        records: &[BubbleRecord],
        viewport: Viewport,
        config: BubbleConfig,
        rng: &mut R,
    ) -> Self {
        let range_min = config.min_radius;
        let range_max = (viewport.shorter_side() * config.max_radius_fraction).max(range_min);
        let domain = magnitude_domain(records).unwrap_or((0.0, 0.0));
        let scale = SqrtScale::new(domain, (range_min, range_max));

        let mut simulation = Self {
            nodes: Vec::new(),
            forces: Self::forces_for(&config, viewport),
            viewport,
            scale,
            alpha: config.alpha_initial,
            alpha_target: config.rest_alpha_target,
            state: EngineState::Active,
            config,
        };

        if viewport.is_degenerate() || records.is_empty() {
            simulation.state = EngineState::Settled;
            debug!(
                records = records.len(),
                width = viewport.width,
                height = viewport.height,
                "nothing to lay out"
            );
            return simulation;
        }

        simulation.nodes.reserve(records.len());
        for record in records {
            let radius = scale.radius(record.magnitude());
            let position = vec2(
                rng.random::<f32>() * viewport.width,
                rng.random::<f32>() * viewport.height,
            );
            simulation
                .nodes
                .push(LayoutNode::new(record.id.clone(), radius, position));
        }

        debug!(
            nodes = simulation.nodes.len(),
            width = viewport.width,
            height = viewport.height,
            "layout seeded"
        );
        simulation
    }

    fn forces_for(config: &BubbleConfig, viewport: Viewport) -> Vec<Box<dyn Force>> {
        let center = viewport.center();
        vec![
            Box::new(ManyBody::new(config.repulsion_strength)),
            Box::new(Collide::new(
                config.collision_padding,
                config.collision_strength,
                config.collision_iterations,
            )),
            Box::new(Center::new(center, config.center_strength)),
            Box::new(AxisPull::new(
                Axis::Horizontal,
                center.x,
                config.axis_strength,
            )),
            Box::new(AxisPull::new(Axis::Vertical, center.y, config.axis_strength)),
        ]
    }

    pub(in crate::app) fn tick(&mut self) -> TickOutcome {
        match self.state {
            EngineState::Halted => return TickOutcome::Halted,
            EngineState::Settled => return TickOutcome::Settled,
            EngineState::Active => {}
        }

        if self.nodes.is_empty() {
            self.state = EngineState::Settled;
            return TickOutcome::Settled;
        }

        for force in &mut self.forces {
            force.apply(&mut self.nodes, self.alpha);
            trace!(force = force.name(), "force applied");
        }

        let retain = 1.0 - self.config.velocity_decay;
        let mut displacement = 0.0_f32;
        for node in &mut self.nodes {
            let before = node.position;
            match node.pin() {
                Some(pin) => {
                    node.position = pin;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= retain;
                    node.position += node.velocity;
                }
            }
            let moved = (node.position - before).length();
            if moved.is_finite() {
                displacement += moved;
            }
        }

        let report = resolve_bounds(&mut self.nodes, self.viewport, self.config.restitution);
        if report.repaired > 0 {
            warn!(repaired = report.repaired, "replaced non-finite node state");
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        if self.alpha < self.config.alpha_min {
            self.state = EngineState::Settled;
            debug!(alpha = self.alpha, "layout settled");
        }

        TickOutcome::Ticked {
            displacement,
            bounced: report.bounced,
        }
    }

    /// Stops the engine for good; only a rebuild brings it back.
    pub(in crate::app) fn stop(&mut self) {
        if self.state != EngineState::Halted {
            debug!(nodes = self.nodes.len(), "layout engine halted");
        }
        self.state = EngineState::Halted;
    }

    /// Raises alpha to at least `level`, holds it there, and wakes a
    /// settled engine.
    pub(in crate::app) fn reheat(&mut self, level: f32) {
        self.alpha_target = level;
        self.alpha = self.alpha.max(level);
        if self.state == EngineState::Settled && !self.nodes.is_empty() {
            self.state = EngineState::Active;
        }
    }

    /// Lets alpha drift back to the resting target.
    pub(in crate::app) fn cool(&mut self) {
        self.alpha_target = self.config.rest_alpha_target;
    }

    pub(in crate::app) fn pin(&mut self, index: usize, position: Vec2) -> bool {
        let Some(node) = self.nodes.get_mut(index) else {
            return false;
        };
        if !position.x.is_finite() || !position.y.is_finite() {
            return false;
        }
        node.authority = node::Authority::Pointer(position);
        node.position = position;
        node.velocity = Vec2::ZERO;
        true
    }

    pub(in crate::app) fn release(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.authority = node::Authority::Simulation;
        }
    }

    pub(in crate::app) fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub(in crate::app) fn state(&self) -> EngineState {
        self.state
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(in crate::app) fn scale(&self) -> SqrtScale {
        self.scale
    }

    pub(in crate::app) fn config(&self) -> &BubbleConfig {
        &self.config
    }

    #[cfg(test)]
    fn node_mut(&mut self, index: usize) -> &mut LayoutNode {
        &mut self.nodes[index]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::market::record;

    fn records(caps: &[f64]) -> Vec<BubbleRecord> {
        caps.iter()
            .enumerate()
            .map(|(index, cap)| record(&format!("coin-{index}"), Some(*cap), Some(1.0)))
            .collect()
    }

    fn build(records: &[BubbleRecord], width: f32, height: f32, seed: u64) -> Simulation {
        let mut rng = StdRng::seed_from_u64(seed);
        Simulation::build(
            records,
            Viewport::new(width, height),
            BubbleConfig::default(),
            &mut rng,
        )
    }

    fn assert_contained(simulation: &Simulation) {
        let viewport = simulation.viewport();
        for node in simulation.nodes() {
            assert!(node.position.x.is_finite() && node.position.y.is_finite());
            if node.is_pinned() {
                continue;
            }
            assert!(node.position.x - node.radius >= -1e-3, "{node:?}");
            assert!(node.position.y - node.radius >= -1e-3, "{node:?}");
            assert!(node.position.x + node.radius <= viewport.width + 1e-3, "{node:?}");
            assert!(node.position.y + node.radius <= viewport.height + 1e-3, "{node:?}");
        }
    }

    #[test]
    fn one_node_per_record_with_scaled_radii() {
        let simulation = build(&records(&[1e9, 4e9, 2e9]), 800.0, 600.0, 1);
        let (range_min, range_max) = simulation.scale().range();

        assert_eq!(simulation.nodes().len(), 3);
        assert_eq!(range_max, 600.0 * 0.18);
        assert_eq!(simulation.nodes()[0].radius, range_min);
        assert_eq!(simulation.nodes()[1].radius, range_max);
        for node in simulation.nodes() {
            assert!(node.position.x >= 0.0 && node.position.x <= 800.0);
            assert!(node.position.y >= 0.0 && node.position.y <= 600.0);
            assert_eq!(node.velocity, Vec2::ZERO);
        }
        assert_eq!(simulation.nodes()[2].id, "coin-2");
    }

    #[test]
    fn same_seed_same_trajectory() {
        let input = records(&[1e9, 3e9, 5e9, 7e9, 9e9]);
        let mut first = build(&input, 500.0, 400.0, 42);
        let mut second = build(&input, 500.0, 400.0, 42);
        for _ in 0..25 {
            first.tick();
            second.tick();
        }
        for (a, b) in first.nodes().iter().zip(second.nodes()) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn rebuild_with_new_records_recomputes_domain() {
        let first = build(&records(&[1.0, 100.0]), 400.0, 400.0, 3);
        let second = build(&records(&[100.0, 400.0, 900.0, 1600.0]), 400.0, 400.0, 3);

        assert_eq!(second.nodes().len(), 4);
        assert_eq!(first.nodes()[1].radius, second.scale().range().1);
        assert_eq!(second.nodes()[0].radius, second.scale().range().0);
    }

    #[test]
    fn missing_magnitude_gets_minimum_radius() {
        let mut input = records(&[1e6, 2e6]);
        input.push(record("mystery", None, None));
        let simulation = build(&input, 400.0, 400.0, 5);
        assert_eq!(simulation.nodes().len(), 3);
        assert_eq!(simulation.nodes()[2].radius, BubbleConfig::default().min_radius);
    }

    #[test]
    fn degenerate_inputs_produce_empty_settled_layout() {
        let mut empty = build(&[], 400.0, 400.0, 1);
        assert!(empty.nodes().is_empty());
        assert_eq!(empty.tick(), TickOutcome::Settled);

        let mut flat = build(&records(&[1.0, 2.0]), 0.0, 400.0, 1);
        assert!(flat.nodes().is_empty());
        assert_eq!(flat.tick(), TickOutcome::Settled);
    }

    #[test]
    fn escaped_node_is_pulled_back_and_bounced() {
        let mut simulation = build(&records(&[1.0]), 100.0, 100.0, 9);
        {
            let node = simulation.node_mut(0);
            node.radius = 20.0;
            node.position = vec2(-40.0, 50.0);
            node.velocity = vec2(-50.0, 0.0);
        }

        assert!(matches!(
            simulation.tick(),
            TickOutcome::Ticked { bounced: 1, .. }
        ));
        let node = &simulation.nodes()[0];
        assert_eq!(node.position.x, 20.0);
        assert!(node.position.y >= 20.0 && node.position.y <= 80.0);
        assert!(node.velocity.x > 0.0);
        assert!(node.velocity.x < 50.0);
    }

    #[test]
    fn coincident_large_nodes_separate() {
        let mut simulation = build(&records(&[1.0, 1.0]), 400.0, 400.0, 11);
        for index in 0..2 {
            let node = simulation.node_mut(index);
            node.radius = 30.0;
            node.position = vec2(200.0, 200.0);
        }

        for _ in 0..60 {
            simulation.tick();
            assert_contained(&simulation);
        }

        let gap = (simulation.nodes()[0].position - simulation.nodes()[1].position).length();
        let padding = BubbleConfig::default().collision_padding;
        assert!(gap >= 30.0 + 30.0 + padding, "gap {gap}");
    }

    #[test]
    fn settles_without_interaction() {
        let caps = (1..=40)
            .map(|rank| 1e12 / (rank * rank) as f64)
            .collect::<Vec<_>>();
        let mut simulation = build(&records(&caps), 900.0, 700.0, 7);

        let mut displacements = Vec::new();
        for _ in 0..1000 {
            match simulation.tick() {
                TickOutcome::Ticked { displacement, .. } => displacements.push(displacement),
                TickOutcome::Settled => break,
                TickOutcome::Halted => unreachable!(),
            }
            assert_contained(&simulation);
        }

        assert_eq!(simulation.state(), EngineState::Settled);
        let early = displacements[..10].iter().sum::<f32>();
        let late = displacements[displacements.len() - 10..].iter().sum::<f32>();
        assert!(late < early * 0.05, "early {early} late {late}");
        assert!(late / 10.0 < 1.0);
    }

    #[test]
    fn stop_halts_future_ticks() {
        let mut simulation = build(&records(&[1.0, 2.0, 3.0]), 300.0, 300.0, 2);
        assert!(matches!(simulation.tick(), TickOutcome::Ticked { .. }));
        simulation.stop();
        let before = simulation
            .nodes()
            .iter()
            .map(|node| node.position)
            .collect::<Vec<_>>();

        assert_eq!(simulation.tick(), TickOutcome::Halted);
        simulation.reheat(0.5);
        assert_eq!(simulation.tick(), TickOutcome::Halted);
        for (node, position) in simulation.nodes().iter().zip(before) {
            assert_eq!(node.position, position);
        }
    }

    #[test]
    fn reheat_wakes_settled_engine() {
        let mut simulation = build(&records(&[1.0, 2.0]), 300.0, 300.0, 4);
        while simulation.tick() != TickOutcome::Settled {}

        simulation.reheat(0.1);
        assert_eq!(simulation.state(), EngineState::Active);
        assert!(simulation.alpha() >= 0.1);
        for _ in 0..500 {
            simulation.tick();
        }
        assert_eq!(simulation.state(), EngineState::Active);
        assert!((simulation.alpha() - 0.1).abs() < 1e-3);

        simulation.cool();
        for _ in 0..1000 {
            simulation.tick();
        }
        assert_eq!(simulation.state(), EngineState::Settled);
    }
}
