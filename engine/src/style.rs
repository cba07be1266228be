use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tilesweeper_core::{Board, Coord2, grid_shape};

use crate::color::Nrgba;
use crate::ease::close_to;
use crate::tables::{ColorName, Tables};
use crate::view::is_odd_tile;

const FIRM_EPSILON: f64 = 0.08;
const VISIBLE_EPSILON: f64 = 0.001;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FgType {
    None,
    Number,
    Flag,
}

impl Default for FgType {
    fn default() -> Self {
        Self::None
    }
}

/// How one tile is drawn this frame. Offsets are in pixels before zoom.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileStyle {
    pub draw_bg: bool,
    pub bg_scale: f64,
    pub bg_offset_x: f64,
    pub bg_offset_y: f64,
    pub bg_fill_color: Nrgba,
    /// Bomb reveal flash progress.
    pub bg_bomb_anim: f64,
    pub bg_alpha: f64,

    /// Does not affect the foreground.
    pub draw_tile: bool,
    pub tile_scale: f64,
    pub tile_offset_x: f64,
    pub tile_offset_y: f64,
    pub tile_fill_color: Nrgba,
    pub tile_stroke_color: Nrgba,
    pub tile_alpha: f64,

    pub draw_fg: bool,
    pub fg_type: FgType,
    /// Relative to the tile scale.
    pub fg_scale: f64,
    /// Relative to the tile center.
    pub fg_offset_x: f64,
    pub fg_offset_y: f64,
    pub fg_color: Nrgba,
    pub fg_alpha: f64,
    pub fg_flag_anim: f64,
    pub fg_number: u8,

    pub highlight: f64,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            draw_bg: false,
            bg_scale: 1.0,
            bg_offset_x: 0.0,
            bg_offset_y: 0.0,
            bg_fill_color: Nrgba::TRANSPARENT,
            bg_bomb_anim: 0.0,
            bg_alpha: 1.0,

            draw_tile: false,
            tile_scale: 1.0,
            tile_offset_x: 0.0,
            tile_offset_y: 0.0,
            tile_fill_color: Nrgba::TRANSPARENT,
            tile_stroke_color: Nrgba::TRANSPARENT,
            tile_alpha: 1.0,

            draw_fg: false,
            fg_type: FgType::None,
            fg_scale: 1.0,
            fg_offset_x: 0.0,
            fg_offset_y: 0.0,
            fg_color: Nrgba::TRANSPARENT,
            fg_alpha: 1.0,
            fg_flag_anim: 0.0,
            fg_number: 0,

            highlight: 0.0,
        }
    }
}

impl TileStyle {
    /// Revealed, at rest and visible, so it merges with its neighbors.
    pub fn is_firmly_placed(&self) -> bool {
        self.draw_tile
            && close_to(self.tile_scale, 1.0, FIRM_EPSILON)
            && close_to(self.tile_offset_x, 0.0, FIRM_EPSILON)
            && close_to(self.tile_offset_y, 0.0, FIRM_EPSILON)
            && self.tile_alpha > FIRM_EPSILON
    }

    pub fn should_draw_bg(&self) -> bool {
        self.draw_bg
            && !self.draw_tile
            && self.bg_scale > VISIBLE_EPSILON
            && self.bg_alpha > VISIBLE_EPSILON
    }

    pub fn should_draw_tile(&self) -> bool {
        self.draw_tile && self.tile_scale > VISIBLE_EPSILON && self.tile_alpha > VISIBLE_EPSILON
    }

    pub fn should_draw_fg(&self) -> bool {
        self.draw_fg
            && self.fg_type != FgType::None
            && self.tile_scale > VISIBLE_EPSILON
            && self.fg_scale > VISIBLE_EPSILON
            && self.fg_alpha > VISIBLE_EPSILON
    }
}

/// The resting style of the tile at `coords` for the current board.
pub fn target_style(board: &Board, tables: &Tables, coords: Coord2) -> TileStyle {
    let odd = is_odd_tile(coords);
    let mut style = TileStyle {
        draw_bg: true,
        bg_fill_color: tables.color(if odd {
            ColorName::TileNormal2
        } else {
            ColorName::TileNormal1
        }),
        ..TileStyle::default()
    };

    if !board.contains(coords) {
        return style;
    }

    if board.is_revealed(coords) {
        style.draw_tile = true;
        style.tile_fill_color = tables.color(if odd {
            ColorName::TileRevealed2
        } else {
            ColorName::TileRevealed1
        });
        style.tile_stroke_color = tables.color(ColorName::TileRevealedStroke);

        let count = board.neighbor_mine_count(coords);
        if (1..=8).contains(&count) {
            style.draw_fg = true;
            style.fg_type = FgType::Number;
            style.fg_number = count;
            style.fg_color = tables.color(ColorName::number(count));
        }
    }

    if board.is_flagged(coords) {
        style.draw_fg = true;
        style.fg_type = FgType::Flag;
        style.fg_color = tables.color(ColorName::Flag);
        style.fg_flag_anim = 1.0;
    }

    style
}

/// Resting styles of a whole board.
pub fn target_styles(board: &Board, tables: &Tables) -> Array2<TileStyle> {
    Array2::from_shape_fn(grid_shape(board.size()), |(y, x)| {
        target_style(board, tables, (x as i32, y as i32))
    })
}

/// Per-tile styles sized for a board, all default.
pub fn style_grid(size: Coord2) -> Array2<TileStyle> {
    Array2::default(grid_shape(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilesweeper_core::ToNdIndex;

    #[test]
    fn revealed_number_gets_tile_and_digit() {
        let board = Board::from_layout(&["@*", ".."]).unwrap();
        let tables = Tables::default();
        let style = target_style(&board, &tables, (0, 0));

        assert!(style.draw_tile && style.draw_fg);
        assert_eq!(style.fg_type, FgType::Number);
        assert_eq!(style.fg_number, 1);
        assert_eq!(style.fg_color, tables.color(ColorName::Number1));
        assert!(style.is_firmly_placed());
        assert!(!style.should_draw_bg());
    }

    #[test]
    fn flagged_cell_shows_flag_over_bg() {
        let board = Board::from_layout(&["+."]).unwrap();
        let tables = Tables::default();
        let style = target_style(&board, &tables, (0, 0));
        assert!(style.should_draw_bg());
        assert!(style.should_draw_fg());
        assert_eq!(style.fg_type, FgType::Flag);
    }

    #[test]
    fn checkerboard_background() {
        let board = Board::new((2, 1));
        let tables = Tables::default();
        let styles = target_styles(&board, &tables);
        assert_eq!(
            styles[(0, 0).to_nd_index()].bg_fill_color,
            tables.color(ColorName::TileNormal1)
        );
        assert_eq!(
            styles[(1, 0).to_nd_index()].bg_fill_color,
            tables.color(ColorName::TileNormal2)
        );
    }

    #[test]
    fn moving_tile_is_not_firm() {
        let style = TileStyle {
            draw_tile: true,
            tile_offset_y: 3.0,
            ..TileStyle::default()
        };
        assert!(!style.is_firmly_placed());
        assert!(style.should_draw_tile());
    }
}
