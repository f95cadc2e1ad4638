use eframe::egui::{Vec2, vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum Authority {
    Simulation,
    Pointer(Vec2),
}

#[derive(Clone, Debug)]
pub(in crate::app) struct LayoutNode {
    pub(in crate::app) id: String,
    pub(in crate::app) radius: f32,
    pub(in crate::app) position: Vec2,
    pub(in crate::app) velocity: Vec2,
    pub(in crate::app) authority: Authority,
}

impl LayoutNode {
    pub(super) fn new(id: String, radius: f32, position: Vec2) -> Self {
        Self {
            id,
            radius,
            position,
            velocity: Vec2::ZERO,
            authority: Authority::Simulation,
        }
    }

    pub(in crate::app) fn pin(&self) -> Option<Vec2> {
        match self.authority {
            Authority::Simulation => None,
            Authority::Pointer(pin) => Some(pin),
        }
    }

    pub(in crate::app) fn is_pinned(&self) -> bool {
        self.pin().is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Viewport {
    pub(in crate::app) width: f32,
    pub(in crate::app) height: f32,
}

impl Viewport {
    pub(in crate::app) fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub(in crate::app) fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub(in crate::app) fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub(in crate::app) fn shorter_side(self) -> f32 {
        self.width.min(self.height)
    }

    /// Within half a pixel on both axes; sub-pixel jitter from the window
    /// manager must not trigger a rebuild.
    pub(in crate::app) fn approx_eq(self, other: Self) -> bool {
        (self.width - other.width).abs() < 0.5 && (self.height - other.height).abs() < 0.5
    }
}

/// Small, deterministic, direction-varying offset used wherever two points
/// coincide and a separation axis is needed.
pub(super) fn separation_vector(first: usize, second: usize, length: f32) -> Vec2 {
    let angle =
        ((first as f32) * 0.618_034 + (second as f32) * 0.414_214 + 0.11) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * length
}
