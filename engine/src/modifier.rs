//! Per-frame style passes layered over the animated base styles.

use ndarray::Array2;
use smallvec::SmallVec;
use tilesweeper_core::{Board, BoardIter, Coord2, GameState, ToNdIndex};

use crate::geom::{Point, Rect};
use crate::input::{GameInput, InputFrame, InputKind, MouseButtons, TouchTable};
use crate::style::TileStyle;
use crate::tables::Tables;
use crate::timer::{Seconds, Timer, ms};
use crate::view::screen_to_board;

pub const CLICK_DURATION: Seconds = ms(100.0);
pub const CLICK_SCALE: f64 = 0.07;

/// What a modifier may look at. Only the render styles are written.
pub struct ModifierCtx<'a> {
    pub prev_board: &'a Board,
    pub board: &'a Board,
    /// Transformed board rect.
    pub board_rect: Rect,
    pub input: GameInput,
    pub frame: &'a InputFrame,
    pub touches: &'a TouchTable,
    /// Game state or board changed this tick.
    pub state_changed: bool,
    pub prev_state: GameState,
    pub state: GameState,
    pub dt: Seconds,
    pub now: Seconds,
    pub tables: &'a Tables,
}

impl ModifierCtx<'_> {
    /// Where the player is pointing: the newest live touch, else the cursor.
    pub fn pointer(&self) -> Point {
        self.touches
            .active()
            .last()
            .map(|info| info.last_pos)
            .unwrap_or(self.frame.cursor)
    }

    fn pointer_cell(&self) -> Coord2 {
        screen_to_board(self.board_rect, self.board.size(), self.pointer())
    }
}

pub trait StyleModifier {
    /// Rewrites `styles` for this frame. Returns whether a redraw is needed.
    fn modify(&mut self, ctx: &ModifierCtx<'_>, styles: &mut Array2<TileStyle>) -> bool;
}

/// Highlights the hovered tile, or the chord neighborhood while a chord is
/// held.
#[derive(Clone, Debug, Default)]
pub struct HighlightModifier {
    wide: bool,
    tiles: SmallVec<[Coord2; 9]>,
}

impl HighlightModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlighted(&self) -> &[Coord2] {
        &self.tiles
    }
}

impl StyleModifier for HighlightModifier {
    fn modify(&mut self, ctx: &ModifierCtx<'_>, styles: &mut Array2<TileStyle>) -> bool {
        if ctx.state != GameState::Playing {
            self.wide = false;
            self.tiles.clear();
            return ctx.prev_state != ctx.state;
        }

        let board = ctx.board;
        let input = ctx.input;
        let center = input.coords();
        let mut tiles: SmallVec<[Coord2; 9]> = SmallVec::new();

        if !input.is_none() {
            let chord = matches!(input.kind, InputKind::Check | InputKind::HL);
            if chord
                && board.contains(center)
                && ctx.prev_board.is_revealed(center)
                && !ctx.state_changed
            {
                self.wide = true;
            }
        }

        let pressed = ctx.frame.pressed;
        let holding_chord = pressed.contains(MouseButtons::LEFT | MouseButtons::RIGHT)
            || pressed.contains(MouseButtons::MIDDLE)
            || ctx.touches.active_count() > 0;
        if !holding_chord || input.is_none() {
            self.wide = false;
        }

        if !input.is_none() {
            let area = if self.wide {
                BoardIter::around(center)
            } else {
                BoardIter::new(center.0, center.1, center.0, center.1)
            };
            for coords in area {
                if !board.contains(coords) || board.is_revealed(coords) {
                    continue;
                }
                if self.wide && board.is_flagged(coords) {
                    continue;
                }
                tiles.push(coords);
            }

            if board.contains(center)
                && board.is_revealed(center)
                && board.neighbor_mine_count(center) > 0
            {
                tiles.push(center);
            }
        }

        for &coords in &tiles {
            styles[coords.to_nd_index()].highlight = 1.0;
        }

        tiles.sort_unstable();
        let changed = tiles != self.tiles;
        self.tiles = tiles;
        changed
    }
}

/// Briefly swells a tile's foreground when it is pressed.
#[derive(Clone, Debug)]
pub struct ClickFeedback {
    timer: Timer,
    cell: Coord2,
    focused: bool,
}

impl Default for ClickFeedback {
    fn default() -> Self {
        Self {
            timer: Timer::new(CLICK_DURATION),
            cell: (0, 0),
            focused: false,
        }
    }
}

impl ClickFeedback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StyleModifier for ClickFeedback {
    fn modify(&mut self, ctx: &ModifierCtx<'_>, styles: &mut Array2<TileStyle>) -> bool {
        if ctx.state != GameState::Playing {
            return ctx.state != ctx.prev_state;
        }

        let board = ctx.board;
        let cell = ctx.pointer_cell();
        let mut redraw = false;

        let on_fg = board.contains(cell) && styles[cell.to_nd_index()].draw_fg;
        if on_fg && ctx.frame.any_just_pressed() {
            self.timer.current = self.timer.duration;
            self.cell = cell;
            self.focused = true;
            redraw = true;
        }

        if !ctx.frame.any_pressed() || cell != self.cell {
            self.focused = false;
        }

        if !self.focused {
            if self.timer.current >= 0.0 {
                redraw = true;
            }
            self.timer.tick_down(ctx.dt);
        }

        if self.timer.current > 0.0 && board.contains(self.cell) {
            styles[self.cell.to_nd_index()].fg_scale *= 1.0 + self.timer.normalize() * CLICK_SCALE;
        }

        redraw
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geom::pt;
    use crate::style::target_styles;

    pub(crate) struct Scene {
        pub board: Board,
        pub tables: Tables,
        pub frame: InputFrame,
        pub touches: TouchTable,
        pub input: GameInput,
        pub state: GameState,
    }

    impl Scene {
        pub fn new(layout: &[&str]) -> Self {
            Self {
                board: Board::from_layout(layout).unwrap(),
                tables: Tables::default(),
                frame: InputFrame::default(),
                touches: TouchTable::new(),
                input: GameInput::NONE,
                state: GameState::Playing,
            }
        }

        /// Each tile is 10×10 pixels.
        pub fn rect(&self) -> Rect {
            let (w, h) = self.board.size();
            Rect::from_wh(w as f64 * 10.0, h as f64 * 10.0)
        }

        pub fn ctx(&self) -> ModifierCtx<'_> {
            ModifierCtx {
                prev_board: &self.board,
                board: &self.board,
                board_rect: self.rect(),
                input: self.input,
                frame: &self.frame,
                touches: &self.touches,
                state_changed: false,
                prev_state: self.state,
                state: self.state,
                dt: 1.0 / 64.0,
                now: 0.0,
                tables: &self.tables,
            }
        }

        pub fn styles(&self) -> Array2<TileStyle> {
            target_styles(&self.board, &self.tables)
        }
    }

    fn lit(styles: &Array2<TileStyle>) -> Vec<Coord2> {
        let mut out = Vec::new();
        for ((y, x), style) in styles.indexed_iter() {
            if style.highlight > 0.0 {
                out.push((x as i32, y as i32));
            }
        }
        out
    }

    #[test]
    fn hover_lights_one_hidden_tile() {
        let mut scene = Scene::new(&["...", ".@.", "..*"]);
        scene.input = GameInput::new(InputKind::Hover, (0, 0), false);
        let mut modifier = HighlightModifier::new();

        let mut styles = scene.styles();
        assert!(modifier.modify(&scene.ctx(), &mut styles));
        assert_eq!(lit(&styles), [(0, 0)]);

        // same set next tick, nothing to redraw
        let mut styles = scene.styles();
        assert!(!modifier.modify(&scene.ctx(), &mut styles));
    }

    #[test]
    fn held_chord_lights_neighborhood_except_flags() {
        let mut scene = Scene::new(&["+..", ".@.", "..*"]);
        scene.frame.pressed = MouseButtons::LEFT | MouseButtons::RIGHT;
        scene.input = GameInput::new(InputKind::HL, (1, 1), false);
        let mut modifier = HighlightModifier::new();

        let mut styles = scene.styles();
        modifier.modify(&scene.ctx(), &mut styles);
        let tiles = lit(&styles);
        assert_eq!(tiles.len(), 8);
        assert!(!tiles.contains(&(0, 0)));
        assert!(tiles.contains(&(1, 1)));

        scene.frame.pressed = MouseButtons::empty();
        scene.input = GameInput::new(InputKind::Hover, (1, 1), false);
        let mut styles = scene.styles();
        assert!(modifier.modify(&scene.ctx(), &mut styles));
        assert_eq!(lit(&styles), [(1, 1)]);
    }

    #[test]
    fn finished_game_clears_highlights() {
        let mut scene = Scene::new(&["..*"]);
        scene.input = GameInput::new(InputKind::Hover, (0, 0), false);
        let mut modifier = HighlightModifier::new();
        modifier.modify(&scene.ctx(), &mut scene.styles());

        scene.state = GameState::Lost;
        let mut ctx = scene.ctx();
        ctx.prev_state = GameState::Playing;
        let mut styles = scene.styles();
        assert!(modifier.modify(&ctx, &mut styles));
        assert!(lit(&styles).is_empty());
        assert!(modifier.highlighted().is_empty());
    }

    #[test]
    fn click_swells_foreground_then_decays() {
        let mut scene = Scene::new(&["@*"]);
        scene.frame.cursor = pt(5.0, 5.0);
        scene.frame.pressed = MouseButtons::LEFT;
        scene.frame.just_pressed = MouseButtons::LEFT;
        let mut click = ClickFeedback::new();

        let mut styles = scene.styles();
        assert!(click.modify(&scene.ctx(), &mut styles));
        assert!((styles[[0, 0]].fg_scale - 1.07).abs() < 1e-9);

        scene.frame.pressed = MouseButtons::empty();
        scene.frame.just_pressed = MouseButtons::empty();
        let mut ticks = 0;
        loop {
            let mut styles = scene.styles();
            let redraw = click.modify(&scene.ctx(), &mut styles);
            ticks += 1;
            if !redraw {
                assert_eq!(styles[[0, 0]].fg_scale, 1.0);
                break;
            }
            assert!(ticks < 20);
        }
    }

    #[test]
    fn click_on_hidden_tile_does_nothing() {
        let mut scene = Scene::new(&[".*"]);
        scene.frame.cursor = pt(5.0, 5.0);
        scene.frame.pressed = MouseButtons::LEFT;
        scene.frame.just_pressed = MouseButtons::LEFT;
        let mut click = ClickFeedback::new();
        let mut styles = scene.styles();
        click.modify(&scene.ctx(), &mut styles);
        assert_eq!(styles[[0, 0]].fg_scale, 1.0);
    }
}
