use serde::{Deserialize, Serialize};
use tilesweeper_core::{Coord, Coord2};

use crate::geom::{Point, Rect, pt};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 8.0;
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Size of one tile of a `size` board drawn into `board_rect`.
pub fn tile_size(board_rect: Rect, size: Coord2) -> (f64, f64) {
    (
        board_rect.width() / size.0.max(1) as f64,
        board_rect.height() / size.1.max(1) as f64,
    )
}

/// Screen rect of tile `(x, y)`, snapped to whole pixels.
pub fn tile_rect(board_rect: Rect, size: Coord2, (x, y): Coord2) -> Rect {
    let (tile_w, tile_h) = tile_size(board_rect, size);
    let rect = Rect {
        min: pt(x as f64 * tile_w, y as f64 * tile_h) + board_rect.min,
        max: pt((x + 1) as f64 * tile_w, (y + 1) as f64 * tile_h) + board_rect.min,
    };
    rect.snapped()
}

/// Board cell under a screen point. May fall outside the board.
pub fn screen_to_board(board_rect: Rect, size: Coord2, p: Point) -> Coord2 {
    let (tile_w, tile_h) = tile_size(board_rect, size);
    let local = p - board_rect.min;
    (
        (local.x / tile_w).floor() as Coord,
        (local.y / tile_h).floor() as Coord,
    )
}

/// Checkerboard parity of a tile.
pub fn is_odd_tile((x, y): Coord2) -> bool {
    if y % 2 == 0 { x % 2 != 0 } else { x % 2 == 0 }
}

/// Zoom and pan applied to the untransformed board rect.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub zoom: f64,
    pub offset: Point,
}

impl Default for BoardView {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BoardView {
    pub const IDENTITY: Self = Self {
        zoom: 1.0,
        offset: Point::ZERO,
    };

    /// Scales `base` around its center, then translates by `offset`.
    pub fn transform(&self, base: Rect) -> Rect {
        base.scale_centered(self.zoom, self.zoom).translate(self.offset)
    }

    /// Multiplies the zoom by `factor`, keeping the world point under
    /// `anchor` fixed on screen.
    pub fn zoom_at(&mut self, base: Rect, factor: f64, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let center = base.center();
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        // world point under the anchor, relative to the base center
        let world = (anchor - center - self.offset) / old_zoom;
        self.offset = anchor - center - world * new_zoom;
        self.zoom = new_zoom;
    }

    pub fn pan(&mut self, delta: Point) {
        self.offset += delta;
    }

    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            zoom: crate::ease::lerp(self.zoom, other.zoom, t),
            offset: self.offset.lerp(other.offset, t),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_rects_tile_the_board() {
        let board = Rect::from_xywh(10.0, 20.0, 100.0, 60.0);
        assert_eq!(tile_rect(board, (10, 6), (0, 0)), Rect::new(10.0, 20.0, 20.0, 30.0));
        assert_eq!(tile_rect(board, (10, 6), (9, 5)), Rect::new(100.0, 70.0, 110.0, 80.0));
    }

    #[test]
    fn screen_to_board_floors() {
        let board = Rect::from_xywh(10.0, 20.0, 100.0, 60.0);
        assert_eq!(screen_to_board(board, (10, 6), pt(10.0, 20.0)), (0, 0));
        assert_eq!(screen_to_board(board, (10, 6), pt(29.9, 39.9)), (1, 1));
        assert_eq!(screen_to_board(board, (10, 6), pt(5.0, 10.0)), (-1, -1));
    }

    #[test]
    fn checkerboard_parity() {
        assert!(!is_odd_tile((0, 0)));
        assert!(is_odd_tile((1, 0)));
        assert!(is_odd_tile((0, 1)));
        assert!(!is_odd_tile((1, 1)));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let base = Rect::from_wh(200.0, 100.0);
        let mut view = BoardView::IDENTITY;
        let anchor = pt(50.0, 30.0);

        let before = view.transform(base);
        let rel = (anchor - before.min) / before.width();

        view.zoom_at(base, 2.0, anchor);
        let after = view.transform(base);
        let rel_after = (anchor - after.min) / after.width();

        assert_eq!(view.zoom, 2.0);
        assert!((rel - rel_after).length() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let base = Rect::from_wh(100.0, 100.0);
        let mut view = BoardView::IDENTITY;
        view.zoom_at(base, 100.0, base.center());
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_at(base, 0.0001, base.center());
        assert_eq!(view.zoom, MIN_ZOOM);
    }
}
