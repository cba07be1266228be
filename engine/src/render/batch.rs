use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect, scale_to_fit};

/// One vertex of a triangle batch. `color` is premultiplied.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub dst: [f32; 2],
    pub src: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(dst: Point, src: Point, color: [f32; 4]) -> Self {
        Self {
            dst: [dst.x as f32, dst.y as f32],
            src: [src.x as f32, src.y as f32],
            color,
        }
    }
}

/// Corners of a rect clockwise from the top left.
pub fn rect_corners(rect: Rect) -> [Point; 4] {
    [
        rect.min,
        Point {
            x: rect.max.x,
            y: rect.min.y,
        },
        rect.max,
        Point {
            x: rect.min.x,
            y: rect.max.y,
        },
    ]
}

/// Vertex and index storage reused across frames. Only the length is reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViBuffer {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ViBuffer {
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    pub fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// Appends a quad. `dst` and `src` are corners in clockwise order.
    pub fn push_quad(&mut self, dst: [Point; 4], src: [Point; 4], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        for (d, s) in dst.into_iter().zip(src) {
            self.vertices.push(Vertex::new(d, s, color));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Appends a quad whose source corners are rotated by `turns` quarter turns.
    pub fn push_rotated_quad(&mut self, dst: Rect, src: Rect, turns: u8, color: [f32; 4]) {
        let dst = rect_corners(dst);
        let src_corners = rect_corners(src);
        let turns = turns as usize;
        let src = std::array::from_fn(|i| src_corners[(i + turns * 3) % 4]);
        self.push_quad(dst, src, color);
    }

    pub fn push_rect(&mut self, dst: Rect, src: Rect, color: [f32; 4]) {
        self.push_quad(rect_corners(dst), rect_corners(src), color);
    }

    /// Fits `src` inside `rect`, scales it by `scale` and centers it on the
    /// rect center moved by `offset`.
    pub fn push_sprite_in(&mut self, rect: Rect, scale: f64, offset: Point, src: Rect, color: [f32; 4]) {
        let fit = scale_to_fit(src.width(), src.height(), rect.width(), rect.height()) * scale;
        let dst = Rect::from_wh(src.width() * fit, src.height() * fit).centered_at(rect.center() + offset);
        self.push_rect(dst, src, color);
    }

    /// Pushes a fan around `center` through `ring`, untextured.
    pub fn push_fan(&mut self, center: Point, ring: &[Point], color: [f32; 4]) {
        if ring.len() < 2 {
            return;
        }
        let base = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(center, center, color));
        for &p in ring {
            self.vertices.push(Vertex::new(p, p, color));
        }
        let n = ring.len() as u32;
        for i in 0..n {
            let next = (i + 1) % n;
            self.indices
                .extend_from_slice(&[base, base + 1 + i, base + 1 + next]);
        }
    }
}
