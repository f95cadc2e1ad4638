use eframe::egui::{Vec2, vec2};

use super::node::{LayoutNode, separation_vector};
use super::quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.9;
const MIN_DISTANCE_SQ: f32 = 1.0;
const COINCIDENT_OFFSET: f32 = 1.0e-3;

/// Forces run in registration order. They read positions and write
/// velocities, except the centering force, which translates positions.
pub(super) trait Force {
    fn name(&self) -> &'static str;

    fn apply(&mut self, nodes: &mut [LayoutNode], alpha: f32);
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

impl Scratch {
    fn load(&mut self, nodes: &[LayoutNode], padding: f32, predicted: bool) {
        self.positions.clear();
        self.radii.clear();
        self.positions
            .reserve(nodes.len().saturating_sub(self.positions.capacity()));
        self.radii
            .reserve(nodes.len().saturating_sub(self.radii.capacity()));
        for node in nodes {
            let position = if predicted {
                node.position + node.velocity
            } else {
                node.position
            };
            self.positions.push(position);
            self.radii.push(node.radius + padding);
        }
    }
}

/// Weak mutual repulsion between every pair, approximated with Barnes-Hut.
pub(super) struct ManyBody {
    strength: f32,
    scratch: Scratch,
}

impl ManyBody {
    pub(super) fn new(strength: f32) -> Self {
        Self {
            strength,
            scratch: Scratch::default(),
        }
    }
}

fn repulsion_from(delta: Vec2, mass: f32, strength: f32, alpha: f32) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < MIN_DISTANCE_SQ {
        distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
    }
    delta * (strength * mass * alpha / distance_sq)
}

fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    alpha: f32,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let mut delta = point - positions[other_index];
            if delta.length_sq() <= 0.0 {
                delta = separation_vector(index, other_index, COINCIDENT_OFFSET);
            }
            *velocity += repulsion_from(delta, 1.0, strength, alpha);
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance = delta.length();
    let can_approximate = !node.bounds.contains(point)
        && distance > 0.0
        && (node.bounds.side_length() / distance) < BARNES_HUT_THETA;

    if can_approximate {
        *velocity += repulsion_from(delta, node.mass, strength, alpha);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, strength, alpha, velocity);
    }
}

impl Force for ManyBody {
    fn name(&self) -> &'static str {
        "many-body"
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], alpha: f32) {
        if nodes.len() < 2 || self.strength <= 0.0 {
            return;
        }

        self.scratch.load(nodes, 0.0, false);
        let Some(tree) = QuadNode::build(&self.scratch.positions, &self.scratch.radii) else {
            return;
        };

        for (index, node) in nodes.iter_mut().enumerate() {
            accumulate_repulsion_for_node(
                &tree,
                index,
                &self.scratch.positions,
                self.strength,
                alpha,
                &mut node.velocity,
            );
        }
    }
}

/// Pushes overlapping discs (radius plus padding) apart. Several relaxation
/// passes per tick; each pass works on positions predicted one step ahead.
pub(super) struct Collide {
    padding: f32,
    strength: f32,
    iterations: usize,
    scratch: Scratch,
}

impl Collide {
    pub(super) fn new(padding: f32, strength: f32, iterations: usize) -> Self {
        Self {
            padding,
            strength,
            iterations,
            scratch: Scratch::default(),
        }
    }
}

fn resolve_collisions_for_node(
    cell: &QuadNode,
    index: usize,
    predicted: Vec2,
    radii: &[f32],
    strength: f32,
    nodes: &mut [LayoutNode],
) {
    let radius = radii[index];
    if cell.bounds.out_of_reach(predicted, radius + cell.max_radius) {
        return;
    }

    if !cell.is_leaf() {
        for child in cell.children.iter().flatten() {
            resolve_collisions_for_node(child, index, predicted, radii, strength, nodes);
        }
        return;
    }

    for &other in &cell.indices {
        if other <= index {
            continue;
        }

        let other_radius = radii[other];
        let reach = radius + other_radius;
        let mut delta = predicted - nodes[other].position - nodes[other].velocity;
        let mut distance_sq = delta.length_sq();
        if distance_sq >= reach * reach {
            continue;
        }

        let jiggle = separation_vector(index, other, COINCIDENT_OFFSET);
        if delta.x == 0.0 {
            delta.x = jiggle.x;
            distance_sq += delta.x * delta.x;
        }
        if delta.y == 0.0 {
            delta.y = jiggle.y;
            distance_sq += delta.y * delta.y;
        }

        let distance = distance_sq.sqrt();
        let push = delta * ((reach - distance) / distance * strength);
        let own_sq = radius * radius;
        let other_sq = other_radius * other_radius;
        let share = if own_sq + other_sq > 0.0 {
            other_sq / (own_sq + other_sq)
        } else {
            0.5
        };

        nodes[index].velocity += push * share;
        nodes[other].velocity -= push * (1.0 - share);
    }
}

impl Force for Collide {
    fn name(&self) -> &'static str {
        "collide"
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], _alpha: f32) {
        if nodes.len() < 2 || self.strength <= 0.0 {
            return;
        }

        for _ in 0..self.iterations {
            self.scratch.load(nodes, self.padding, true);
            let Some(tree) = QuadNode::build(&self.scratch.positions, &self.scratch.radii) else {
                return;
            };

            for index in 0..nodes.len() {
                let predicted = nodes[index].position + nodes[index].velocity;
                resolve_collisions_for_node(
                    &tree,
                    index,
                    predicted,
                    &self.scratch.radii,
                    self.strength,
                    nodes,
                );
            }
        }
    }
}

/// Translates the free nodes so their common centroid moves toward `target`.
pub(super) struct Center {
    target: Vec2,
    strength: f32,
}

impl Center {
    pub(super) fn new(target: Vec2, strength: f32) -> Self {
        Self { target, strength }
    }
}

impl Force for Center {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], _alpha: f32) {
        if nodes.is_empty() || self.strength <= 0.0 {
            return;
        }

        let mut centroid = Vec2::ZERO;
        for node in nodes.iter() {
            centroid += node.position;
        }
        centroid /= nodes.len() as f32;

        let shift = (centroid - self.target) * self.strength;
        if !shift.x.is_finite() || !shift.y.is_finite() {
            return;
        }

        for node in nodes.iter_mut().filter(|node| !node.is_pinned()) {
            node.position -= shift;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Axis {
    Horizontal,
    Vertical,
}

/// Spring toward a single coordinate on one axis, scaled by alpha.
pub(super) struct AxisPull {
    axis: Axis,
    target: f32,
    strength: f32,
}

impl AxisPull {
    pub(super) fn new(axis: Axis, target: f32, strength: f32) -> Self {
        Self {
            axis,
            target,
            strength,
        }
    }
}

impl Force for AxisPull {
    fn name(&self) -> &'static str {
        match self.axis {
            Axis::Horizontal => "axis-x",
            Axis::Vertical => "axis-y",
        }
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], alpha: f32) {
        let gain = self.strength * alpha;
        if gain <= 0.0 {
            return;
        }

        for node in nodes.iter_mut() {
            match self.axis {
                Axis::Horizontal => node.velocity += vec2((self.target - node.position.x) * gain, 0.0),
                Axis::Vertical => node.velocity += vec2(0.0, (self.target - node.position.y) * gain),
            }
        }
    }
}
