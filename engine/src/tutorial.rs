//! Drag-to-flag hint shown to touch players who have never placed a flag.

use ndarray::Array2;
use tilesweeper_core::{Board, BoardIter, Coord2, GameState, ToNdIndex};

use crate::assets::Assets;
use crate::ease::{clamp01, ease_in_circ};
use crate::geom::{Point, Rect, pt};
use crate::input::GameInput;
use crate::modifier::{ModifierCtx, StyleModifier};
use crate::render::batch::ViBuffer;
use crate::render::{Surface, Target, TriangleOptions};
use crate::sprite::{UI_CURSOR, UI_DRAG_SIGN};
use crate::style::{FgType, TileStyle};
use crate::tables::{ColorName, Tables};
use crate::timer::{Seconds, Timer};
use crate::view::{screen_to_board, tile_rect, tile_size};

pub const TUTORIAL_DURATION: Seconds = 1.9;

const FADE_IN_END: f64 = 0.15;
const TRAVEL_END: f64 = 0.55;
const FLAG_END: f64 = 0.8;

/// Cursor size relative to a tile.
const CURSOR_SCALE: f64 = 0.9;
const DRAG_SIGN_SCALE: f64 = 0.6;

/// A numbered tile and the hidden mine next to it the hint drags onto.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Lesson {
    pub number: Coord2,
    pub flag: Coord2,
}

/// Values of one point on the looping timeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TutorialFrame {
    pub alpha: f64,
    /// Cursor progress from the number tile to the flag tile.
    pub travel: f64,
    /// Flag raise on the flag tile.
    pub flag: f64,
}

impl TutorialFrame {
    pub fn at(t: f64) -> Self {
        let alpha = if t < FADE_IN_END {
            t / FADE_IN_END
        } else if t < FLAG_END {
            1.0
        } else {
            (1.0 - t) / (1.0 - FLAG_END)
        };
        let travel = ease_in_circ(clamp01((t - FADE_IN_END) / (TRAVEL_END - FADE_IN_END)));
        let flag = clamp01((t - TRAVEL_END) / (FLAG_END - TRAVEL_END));
        Self {
            alpha: clamp01(alpha),
            travel,
            flag,
        }
    }
}

/// Finds the teaching tile nearest to `center` by walking square rings
/// outward. Both tiles must lie fully inside `screen`.
pub fn find_lesson(board: &Board, board_rect: Rect, screen: Rect, center: Coord2) -> Option<Lesson> {
    let size = board.size();
    let visible = |coords| tile_rect(board_rect, size, coords).is_inside(&screen);
    let max_ring = size.0.max(size.1);

    for ring in 0..=max_ring {
        let (cx, cy) = center;
        for coords in BoardIter::new(cx - ring, cy - ring, cx + ring, cy + ring) {
            let on_ring = (coords.0 - cx).abs() == ring || (coords.1 - cy).abs() == ring;
            if !on_ring || !board.contains(coords) || !board.is_revealed(coords) {
                continue;
            }
            if board.neighbor_mine_count(coords) == 0 || !visible(coords) {
                continue;
            }
            let flag = board.iter_neighbors(coords).find(|&pos| {
                board.is_mine(pos) && !board.is_revealed(pos) && !board.is_flagged(pos) && visible(pos)
            });
            if let Some(flag) = flag {
                return Some(Lesson {
                    number: coords,
                    flag,
                });
            }
        }
    }
    None
}

#[derive(Clone, Debug)]
pub struct FlagTutorial {
    revealed_by_touch: bool,
    ever_flagged: bool,
    timer: Timer,
    lesson: Option<Lesson>,
    buffer: ViBuffer,
}

impl Default for FlagTutorial {
    fn default() -> Self {
        Self {
            revealed_by_touch: false,
            ever_flagged: false,
            timer: Timer::new(TUTORIAL_DURATION),
            lesson: None,
            buffer: ViBuffer::with_capacity(2),
        }
    }
}

impl FlagTutorial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.revealed_by_touch && !self.ever_flagged
    }

    pub fn lesson(&self) -> Option<Lesson> {
        self.lesson
    }

    pub fn frame(&self) -> TutorialFrame {
        TutorialFrame::at(self.timer.normalize())
    }

    /// Records what an interaction taught the player.
    pub fn observe(&mut self, input: GameInput, prev_board: &Board, board: &Board) {
        if board.flag_count() > prev_board.flag_count() && !self.ever_flagged {
            log::debug!("Player placed a flag, tutorial retired");
            self.ever_flagged = true;
            self.lesson = None;
        }
        if input.by_touch && board.revealed_count() > prev_board.revealed_count() && !self.revealed_by_touch {
            log::debug!("Revealed by touch, flag tutorial armed");
            self.revealed_by_touch = true;
            self.timer.reset();
        }
    }

    /// Advances the loop. The lesson is searched again at the start of each
    /// loop. Hidden once the game is over. Returns whether anything is shown.
    pub fn update(&mut self, board: &Board, state: GameState, board_rect: Rect, screen: Rect, dt: Seconds) -> bool {
        if !self.is_active() || state.is_finished() {
            self.lesson = None;
            self.timer.reset();
            return false;
        }

        if self.timer.current <= 0.0 || self.lesson.is_none() {
            let center = screen_to_board(board_rect, board.size(), screen.center());
            let (w, h) = board.size();
            let center = (center.0.clamp(0, w - 1), center.1.clamp(0, h - 1));
            self.lesson = find_lesson(board, board_rect, screen, center);
            if self.lesson.is_none() {
                self.timer.reset();
                return false;
            }
        }

        self.timer.tick_up(dt);
        if self.timer.is_done() {
            self.timer.reset();
        }
        true
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, assets: &Assets, tables: &Tables, board_rect: Rect, size: Coord2) {
        let Some(lesson) = self.lesson else {
            return;
        };
        let frame = self.frame();
        if frame.alpha <= 0.0 {
            return;
        }

        let (tile_w, tile_h) = tile_size(board_rect, size);
        let unit = tile_w.min(tile_h);
        let from = tile_rect(board_rect, size, lesson.number).center();
        let to = tile_rect(board_rect, size, lesson.flag).center();
        let at = from.lerp(to, frame.travel);

        self.buffer.reset();
        let sign_alpha = frame.alpha * (1.0 - frame.flag);
        if sign_alpha > 0.0 {
            let sign_rect = Rect::from_wh(unit, unit).centered_at(at - pt(0.0, unit));
            self.buffer.push_sprite_in(
                sign_rect,
                DRAG_SIGN_SCALE,
                Point::ZERO,
                assets.ui.rect(UI_DRAG_SIGN),
                tables.color(ColorName::TutorialDragSign).fade(sign_alpha).to_premultiplied_f32(),
            );
        }
        self.buffer.push_sprite_in(
            Rect::from_wh(unit, unit).centered_at(at),
            CURSOR_SCALE,
            Point::ZERO,
            assets.ui.rect(UI_CURSOR),
            tables.color(ColorName::TutorialCursor).fade(frame.alpha).to_premultiplied_f32(),
        );

        surface.triangles(
            Target::Screen,
            &self.buffer.vertices,
            &self.buffer.indices,
            Some(assets.ui.image.id),
            &TriangleOptions::default(),
        );
    }
}

impl StyleModifier for FlagTutorial {
    fn modify(&mut self, ctx: &ModifierCtx<'_>, styles: &mut Array2<TileStyle>) -> bool {
        let Some(lesson) = self.lesson else {
            return false;
        };
        if ctx.state.is_finished() {
            return false;
        }
        let frame = self.frame();

        for coords in BoardIter::around(lesson.number) {
            if ctx.board.contains(coords) {
                let style = &mut styles[coords.to_nd_index()];
                style.highlight = style.highlight.max(frame.alpha);
            }
        }

        if frame.flag > 0.0 && ctx.board.contains(lesson.flag) {
            let style = &mut styles[lesson.flag.to_nd_index()];
            style.draw_fg = true;
            style.fg_type = FgType::Flag;
            style.fg_color = ctx.tables.color(ColorName::Flag);
            style.fg_flag_anim = frame.flag;
            style.fg_alpha = frame.alpha;
        }
        true
    }
}
