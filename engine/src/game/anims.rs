//! Builders that fill the tile and game queues for each board event.

use rand::prelude::*;
use tilesweeper_core::{BoardIter, Coord2, ToNdIndex};

use super::Game;
use crate::anim::{GameAnim, TileAnim};
use crate::ease::lerp;
use crate::geom::{Point, pt};
use crate::retry::retry_button_rect;
use crate::style::target_style;
use crate::timer::{Seconds, ms};
use crate::view::tile_rect;

pub const REVEAL_STRIDE: Seconds = ms(20.0);
pub const REVEAL_MIN_DURATION: Seconds = ms(5.0);

pub const DEFEAT_SHELL_STRIDE: Seconds = ms(100.0);
/// The second shell waits this many strides after the first.
pub const DEFEAT_FIRST_SHELL_GAP: f64 = 16.0 / 6.0;
pub const DEFEAT_GRACE: Seconds = ms(10.0);

pub const WIN_MAX_DURATION: Seconds = ms(1000.0);
pub const WIN_MIN_DURATION: Seconds = ms(50.0);
pub const WIN_DELAY_PER_TILE: Seconds = ms(3.0);
pub const WIN_GRACE: Seconds = ms(100.0);

pub const RETRY_TILE_MAX_DELAY: Seconds = ms(200.0);

pub const HIDE_MIN_DURATION: Seconds = ms(120.0);
pub const HIDE_MAX_DURATION: Seconds = ms(400.0);
pub const HIDE_BUTTON_DURATION: Seconds = HIDE_MAX_DURATION * 0.6;
pub const HIDE_GRACE: Seconds = ms(200.0);

pub const SHOW_MIN_DURATION: Seconds = ms(80.0);
pub const SHOW_MAX_DURATION: Seconds = ms(200.0);

fn distance((x, y): Coord2, origin: Point) -> f64 {
    pt(x as f64, y as f64).distance(origin)
}

fn distance_squared((x, y): Coord2, (ox, oy): Coord2) -> i64 {
    let (dx, dy) = (i64::from(x - ox), i64::from(y - oy));
    dx * dx + dy * dy
}

/// Delay of the `shell`-th ring of bombs around the losing cell.
pub fn defeat_shell_delay(shell: usize) -> Seconds {
    match shell {
        0 => 0.0,
        n => DEFEAT_SHELL_STRIDE * (DEFEAT_FIRST_SHELL_GAP + (n - 1) as f64),
    }
}

impl Game {
    /// Tiles farther from `origin` start later and run longer.
    pub(super) fn enqueue_reveal(&mut self, revealed: &[Coord2], origin: Coord2) {
        let origin = pt(origin.0 as f64, origin.1 as f64);
        let min_dist = revealed
            .iter()
            .map(|&coords| distance(coords, origin))
            .fold(f64::INFINITY, f64::min);

        let mut farthest: Option<(Coord2, f64)> = None;
        for &coords in revealed {
            let d = distance(coords, origin) - min_dist;
            let target = target_style(self.play.board(), &self.tables, coords);
            self.tile_queues[coords.to_nd_index()].enqueue(TileAnim::reveal(
                d * REVEAL_STRIDE + REVEAL_MIN_DURATION,
                d * REVEAL_STRIDE,
                target,
            ));
            if farthest.is_none_or(|(_, best)| d > best) {
                farthest = Some((coords, d));
            }
        }
        self.reveal_sounds
            .begin(revealed.len(), farthest.map(|(coords, _)| coords));
    }

    /// Pops wrong flags, then sets off the remaining mines ring by ring.
    pub(super) fn queue_defeat(&mut self, origin: Coord2) {
        self.skip_all_animations();
        let board = self.play.board();

        let mut mines = Vec::new();
        for coords in BoardIter::whole(board.size()) {
            if board.is_flagged(coords) && !board.is_mine(coords) {
                self.tile_queues[coords.to_nd_index()].enqueue(TileAnim::remove_flag());
            }
            if board.is_mine(coords) && !board.is_flagged(coords) {
                mines.push(coords);
            }
        }
        mines.sort_by_key(|&coords| distance_squared(coords, origin));

        let mut longest: Seconds = 0.0;
        let mut shell = 0;
        let mut shell_dist = mines.first().map(|&coords| distance_squared(coords, origin));
        for &coords in &mines {
            let dist = distance_squared(coords, origin);
            if shell_dist.is_some_and(|record| dist > record) {
                shell_dist = Some(dist);
                shell += 1;
            }
            let anim = TileAnim::bomb(defeat_shell_delay(shell));
            longest = longest.max(anim.remaining());
            self.tile_queues[coords.to_nd_index()].enqueue(anim);
        }

        log::debug!("Defeat at {:?}, {} mines in {} shells", origin, mines.len(), shell + 1);
        self.game_queue
            .enqueue(GameAnim::defeat(longest + DEFEAT_GRACE));
    }

    /// Every tile bounces, spreading out from `origin`, while water fills in.
    pub(super) fn queue_win(&mut self, origin: Coord2) {
        self.skip_all_animations();
        let (width, height) = self.play.size();
        let max_dist = (width as f64).hypot(height as f64);
        let origin = pt(origin.0 as f64, origin.1 as f64);

        let mut longest: Seconds = 0.0;
        for coords in BoardIter::whole((width, height)) {
            let d = distance(coords, origin);
            let duration = (WIN_MAX_DURATION * d / max_dist).max(WIN_MIN_DURATION);
            let anim = TileAnim::win(duration, d * WIN_DELAY_PER_TILE);
            longest = longest.max(anim.remaining());
            self.tile_queues[coords.to_nd_index()].enqueue(anim);
        }

        self.game_queue
            .enqueue(GameAnim::win(longest + WIN_GRACE));
    }

    /// Lifts the tiles under the retry button, then pops the button in.
    pub(super) fn enqueue_retry_reveal(&mut self) {
        self.with_tile_queues(|queue, ctx| queue.skip_all(ctx));

        let size = self.play.size();
        let button = retry_button_rect(self.board_rect, self.config.retry_button_size);
        let button = button.inset(-button.width().max(button.height()) * 0.03);

        let mut longest: Seconds = 0.0;
        for coords in BoardIter::whole(size) {
            if !tile_rect(self.board_rect, size, coords).overlaps(&button) {
                continue;
            }
            let delay = self.rng.random_range(0.0..RETRY_TILE_MAX_DELAY);
            let anim = TileAnim::retry_reveal(delay);
            longest = longest.max(anim.remaining());
            self.tile_queues[coords.to_nd_index()].enqueue(anim);
        }

        self.game_queue
            .enqueue(GameAnim::retry_button_reveal(longest * 0.8));
    }

    /// Starts the retry sequence: the board sinks away, is rebuilt, and
    /// rises again from the center.
    pub fn queue_reset_board(&mut self) {
        self.skip_all_animations();
        let (width, height) = self.play.size();
        let center = pt((width - 1) as f64 * 0.5, (height - 1) as f64 * 0.5);
        let max_dist = (width as f64 * 0.5).hypot(height as f64 * 0.5);

        let mut longest: Seconds = 0.0;
        for coords in BoardIter::whole((width, height)) {
            let t = 1.0 - distance(coords, center) / max_dist;
            let anim = TileAnim::hide_board(lerp(HIDE_MIN_DURATION, HIDE_MAX_DURATION, t));
            longest = longest.max(anim.remaining());
            self.tile_queues[coords.to_nd_index()].enqueue(anim);
        }

        self.game_queue
            .enqueue(GameAnim::hide_board(HIDE_BUTTON_DURATION, longest + HIDE_GRACE));
    }

    /// Tiles drop in from `origin` outward. The game is playable once the
    /// last one lands.
    pub(super) fn enqueue_show(&mut self, origin: Coord2) {
        self.skip_all_animations();
        let (width, height) = self.play.size();
        let origin = pt(origin.0 as f64, origin.1 as f64);
        let (right, bottom) = ((width - 1) as f64, (height - 1) as f64);
        let max_dist = [pt(0.0, 0.0), pt(right, 0.0), pt(0.0, bottom), pt(right, bottom)]
            .into_iter()
            .map(|corner| corner.distance(origin))
            .fold(0.0, f64::max);

        let mut longest: Seconds = 0.0;
        for coords in BoardIter::whole((width, height)) {
            let t = if max_dist > 0.0 {
                distance(coords, origin) / max_dist
            } else {
                0.0
            };
            let target = target_style(self.play.board(), &self.tables, coords);
            let anim = TileAnim::show_board(lerp(SHOW_MIN_DURATION, SHOW_MAX_DURATION, t), target);
            longest = longest.max(anim.remaining());
            self.tile_queues[coords.to_nd_index()].enqueue(anim);
        }

        self.game_queue
            .enqueue(GameAnim::show_board(longest));
    }
}
