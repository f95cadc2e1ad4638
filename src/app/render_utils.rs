use std::f32::consts::TAU;

use eframe::egui::{Color32, Mesh, Painter, Pos2, Rect, Shape, Vec2, vec2};

use crate::market::ChangeCategory;

pub(super) const TOOLTIP_SIZE: Vec2 = vec2(220.0, 150.0);
const TOOLTIP_OFFSET: f32 = 20.0;

const BACKGROUND_CENTER: Color32 = Color32::from_rgb(0x1F, 0x29, 0x37);
pub(super) const BACKGROUND_EDGE: Color32 = Color32::from_rgb(0x11, 0x18, 0x27);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct BubbleStyle {
    pub(super) core: Color32,
    pub(super) rim: Color32,
    pub(super) stroke: Color32,
}

impl BubbleStyle {
    pub(super) fn for_category(category: ChangeCategory) -> Self {
        let (start, end) = category_colors(category);

        Self {
            core: Color32::from_rgba_unmultiplied(start[0], start[1], start[2], 153),
            rim: Color32::from_rgba_unmultiplied(end[0], end[1], end[2], 77),
            stroke: Color32::from_rgba_unmultiplied(start[0], start[1], start[2], 153),
        }
    }
}

fn category_colors(category: ChangeCategory) -> ([u8; 3], [u8; 3]) {
    match category {
        ChangeCategory::Gain => ([0x34, 0xD3, 0x99], [0x05, 0x96, 0x69]),
        ChangeCategory::Loss => ([0xFB, 0x71, 0x85], [0xE1, 0x1D, 0x48]),
        ChangeCategory::Unknown => ([0x9C, 0xA3, 0xAF], [0x4B, 0x55, 0x63]),
    }
}

pub(super) fn accent_color(category: ChangeCategory) -> Color32 {
    let (start, _) = category_colors(category);
    Color32::from_rgb(start[0], start[1], start[2])
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Triangle fan shading from `inner` at the centre to `outer` at the rim.
pub(super) fn radial_disc(center: Pos2, radius: f32, inner: Color32, outer: Color32) -> Shape {
    let segments = ((radius * 0.8) as u32).clamp(16, 64);
    let mut mesh = Mesh::default();
    mesh.colored_vertex(center, inner);
    for segment in 0..segments {
        let angle = segment as f32 / segments as f32 * TAU;
        mesh.colored_vertex(center + Vec2::angled(angle) * radius, outer);
    }
    for segment in 0..segments {
        let current = segment + 1;
        let next = (segment + 1) % segments + 1;
        mesh.add_triangle(0, current, next);
    }
    Shape::mesh(mesh)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, BACKGROUND_EDGE);
    let reach = rect.size().length() * 0.5;
    painter.add(radial_disc(
        rect.center(),
        reach,
        BACKGROUND_CENTER,
        BACKGROUND_EDGE,
    ));
}

/// Control points of the highlight arc drawn across a bubble's upper left.
pub(super) fn shine_points(center: Pos2, radius: f32) -> [Pos2; 3] {
    [
        center + vec2(-radius * 0.6, -radius * 0.2),
        center + vec2(-radius * 0.3, -radius * 0.6),
        center + vec2(radius * 0.2, -radius * 0.6),
    ]
}

pub(super) fn label_font_size(radius: f32) -> f32 {
    (radius / 1.5).min(20.0)
}

/// Tooltip origin relative to the canvas: pointer plus a fixed offset,
/// flipped to the other side of the pointer on any axis it would overflow.
pub(super) fn tooltip_origin(pointer: Vec2, canvas: Vec2, tooltip: Vec2) -> Vec2 {
    let place = |pointer: f32, extent: f32, size: f32| {
        let forward = pointer + TOOLTIP_OFFSET;
        if forward + size > extent {
            (pointer - size - TOOLTIP_OFFSET).max(0.0)
        } else {
            forward
        }
    };

    vec2(
        place(pointer.x, canvas.x, tooltip.x),
        place(pointer.y, canvas.y, tooltip.y),
    )
}
