use eframe::egui::Vec2;

use super::node::{LayoutNode, Viewport, separation_vector};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct BoundaryReport {
    pub(super) bounced: usize,
    pub(super) repaired: usize,
}

/// Keeps every free disc fully inside the viewport, reflecting the outward
/// velocity component with `restitution`, and replaces non-finite state.
/// Pointer-held nodes are left where the pointer put them.
pub(super) fn resolve_bounds(
    nodes: &mut [LayoutNode],
    viewport: Viewport,
    restitution: f32,
) -> BoundaryReport {
    let mut report = BoundaryReport::default();
    let center = viewport.center();

    for (index, node) in nodes.iter_mut().enumerate() {
        if node.is_pinned() {
            continue;
        }

        if !node.position.x.is_finite() || !node.position.y.is_finite() {
            node.position = center + separation_vector(index, index + 1, node.radius.max(1.0));
            node.velocity = Vec2::ZERO;
            report.repaired += 1;
        } else if !node.velocity.x.is_finite() || !node.velocity.y.is_finite() {
            node.velocity = Vec2::ZERO;
            report.repaired += 1;
        }

        let (x, vx, x_bounced) = contain_axis(
            node.position.x,
            node.velocity.x,
            node.radius,
            viewport.width,
            restitution,
        );
        let (y, vy, y_bounced) = contain_axis(
            node.position.y,
            node.velocity.y,
            node.radius,
            viewport.height,
            restitution,
        );

        node.position.x = x;
        node.position.y = y;
        node.velocity.x = vx;
        node.velocity.y = vy;
        if x_bounced || y_bounced {
            report.bounced += 1;
        }
    }

    report
}

fn contain_axis(
    position: f32,
    velocity: f32,
    radius: f32,
    extent: f32,
    restitution: f32,
) -> (f32, f32, bool) {
    if radius * 2.0 >= extent {
        return (extent * 0.5, 0.0, false);
    }

    let low = radius;
    let high = extent - radius;
    if position < low {
        let velocity = if velocity < 0.0 {
            -velocity * restitution
        } else {
            velocity
        };
        (low, velocity, true)
    } else if position > high {
        let velocity = if velocity > 0.0 {
            -velocity * restitution
        } else {
            velocity
        };
        (high, velocity, true)
    } else {
        (position, velocity, false)
    }
}
