use smallvec::SmallVec;

use crate::geom::{Point, Rect, pt};

use super::batch::ViBuffer;

/// Corner radius of UI round rects, relative to half the shorter side.
pub const ROUND_RECT_RADIUS: f64 = 0.4;
pub const ROUND_RECT_SEGMENTS: usize = 6;

/// Outline of a rect with quarter-circle corners, clockwise from the top
/// left arc. `radius` is relative to half the shorter side.
pub fn round_rect_ring(rect: Rect, radius: f64, segments: usize) -> SmallVec<[Point; 32]> {
    use std::f64::consts::FRAC_PI_2;

    let r = (rect.width().min(rect.height()) * 0.5 * radius.clamp(0.0, 1.0)).max(0.0);
    let segments = segments.max(1);

    // arc centers and start angles, clockwise from the top left
    let corners = [
        (pt(rect.min.x + r, rect.min.y + r), 2.0 * FRAC_PI_2),
        (pt(rect.max.x - r, rect.min.y + r), 3.0 * FRAC_PI_2),
        (pt(rect.max.x - r, rect.max.y - r), 0.0),
        (pt(rect.min.x + r, rect.max.y - r), FRAC_PI_2),
    ];

    let mut ring = SmallVec::new();
    for (center, start) in corners {
        for i in 0..=segments {
            let angle = start + FRAC_PI_2 * (i as f64 / segments as f64);
            ring.push(center + pt(angle.cos(), angle.sin()) * r);
        }
    }
    ring
}

/// Fills a round rect into an untextured batch.
pub fn push_round_rect(buffer: &mut ViBuffer, rect: Rect, radius: f64, segments: usize, color: [f32; 4]) {
    if rect.is_empty() {
        return;
    }
    let ring = round_rect_ring(rect, radius, segments);
    buffer.push_fan(rect.center(), &ring, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_stays_inside_rect() {
        let rect = Rect::from_xywh(10.0, 20.0, 100.0, 40.0);
        let ring = round_rect_ring(rect, ROUND_RECT_RADIUS, ROUND_RECT_SEGMENTS);
        assert_eq!(ring.len(), 4 * (ROUND_RECT_SEGMENTS + 1));
        for p in &ring {
            assert!(p.x >= rect.min.x - 1e-9 && p.x <= rect.max.x + 1e-9);
            assert!(p.y >= rect.min.y - 1e-9 && p.y <= rect.max.y + 1e-9);
        }
        // top left arc starts on the left edge
        assert!((ring[0].x - rect.min.x).abs() < 1e-9);
    }

    #[test]
    fn empty_rect_pushes_nothing() {
        let mut buffer = ViBuffer::default();
        push_round_rect(&mut buffer, Rect::ZERO, 0.4, 6, [1.0; 4]);
        assert!(buffer.is_empty());
    }
}
