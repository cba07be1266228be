use rand::prelude::*;
use tilesweeper_core::{Board, Coord2};

use crate::color::Nrgba;
use crate::ease::{clamp01, ease_in_cubic, ease_in_quint, ease_out_elastic, ease_out_quint, lerp};
use crate::geom::{Point, pt};
use crate::particle::{ColorCurve, Particle, Particles};
use crate::render::SubView;
use crate::sound::{SoundName, SoundQueue};
use crate::style::{FgType, TileStyle};
use crate::tables::{BezierName, ColorName, Tables};
use crate::timer::{Seconds, Timer, ms};

use super::{Animation, AnimationTag};

pub const REVEAL_SOUND_VOLUME: f64 = 0.3;
pub const REVEAL_SOUND_INTERVAL: Seconds = ms(50.0);
pub const FLAG_SOUND_VOLUME: f64 = 0.5;
pub const POP_SOUND_VOLUME: f64 = 0.3;

/// Everything a tile animation may touch while it runs.
pub struct TileCtx<'a> {
    pub coords: Coord2,
    pub style: &'a mut TileStyle,
    pub dt: Seconds,
    pub now: Seconds,
    pub board: &'a Board,
    pub tables: &'a Tables,
    pub sounds: &'a mut SoundQueue,
    pub reveal_sounds: &'a mut RevealSounds,
    pub particles: &'a mut Particles,
    pub rng: &'a mut SmallRng,
    /// Sprite the flag ejecta particle uses.
    pub flag_sprite: SubView,
}

/// Reveal sound policy for one cascade: a sound when the first tile starts,
/// one at the farthest tile, and periodic ones in between for larger
/// cascades.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RevealSounds {
    count: usize,
    farthest: Option<Coord2>,
    played_first: bool,
    last_played: Seconds,
}

impl RevealSounds {
    pub fn begin(&mut self, count: usize, farthest: Option<Coord2>) {
        *self = Self {
            count,
            farthest,
            ..Self::default()
        };
    }

    fn on_tile_start(&mut self, coords: Coord2, now: Seconds, sounds: &mut SoundQueue) {
        let play = if !self.played_first {
            self.played_first = true;
            true
        } else if self.count >= 3 {
            self.farthest == Some(coords) || now - self.last_played >= REVEAL_SOUND_INTERVAL
        } else {
            false
        };
        if play {
            self.last_played = now;
            sounds.play(SoundName::TileReveal, REVEAL_SOUND_VOLUME);
        }
    }
}

/// Keyframe routines that write one tile's base style.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TileAnim {
    Reveal {
        timer: Timer,
        target: TileStyle,
        started: bool,
    },
    AddFlag {
        timer: Timer,
        sounded: bool,
    },
    RemoveFlag {
        done: bool,
    },
    /// Bomb flash on an unflagged mine after a loss.
    Bomb {
        timer: Timer,
        sounded: bool,
    },
    Win {
        timer: Timer,
        original_fg: Option<Nrgba>,
    },
    RetryReveal {
        timer: Timer,
    },
    HideBoard {
        timer: Timer,
    },
    ShowBoard {
        timer: Timer,
        target: TileStyle,
    },
}

impl TileAnim {
    /// `delay` is how long the tile waits before it starts growing in.
    pub fn reveal(duration: Seconds, delay: Seconds, target: TileStyle) -> Self {
        Self::Reveal {
            timer: Timer::delayed(duration, delay),
            target,
            started: false,
        }
    }

    pub fn add_flag() -> Self {
        Self::AddFlag {
            timer: Timer::new(ms(110.0)),
            sounded: false,
        }
    }

    pub fn remove_flag() -> Self {
        Self::RemoveFlag { done: false }
    }

    pub fn bomb(delay: Seconds) -> Self {
        Self::Bomb {
            timer: Timer::delayed(ms(150.0), delay),
            sounded: false,
        }
    }

    pub fn win(duration: Seconds, delay: Seconds) -> Self {
        Self::Win {
            timer: Timer::delayed(duration, delay),
            original_fg: None,
        }
    }

    pub fn retry_reveal(delay: Seconds) -> Self {
        Self::RetryReveal {
            timer: Timer::delayed(ms(300.0), delay),
        }
    }

    pub fn hide_board(duration: Seconds) -> Self {
        Self::HideBoard {
            timer: Timer::new(duration),
        }
    }

    pub fn show_board(duration: Seconds, target: TileStyle) -> Self {
        Self::ShowBoard {
            timer: Timer::new(duration),
            target,
        }
    }

    /// Time from now until the animation is done.
    pub fn remaining(&self) -> Seconds {
        match self {
            Self::Reveal { timer, .. }
            | Self::AddFlag { timer, .. }
            | Self::Bomb { timer, .. }
            | Self::Win { timer, .. }
            | Self::RetryReveal { timer }
            | Self::HideBoard { timer }
            | Self::ShowBoard { timer, .. } => timer.duration - timer.current,
            Self::RemoveFlag { .. } => 0.0,
        }
    }

    fn timer_mut(&mut self) -> Option<&mut Timer> {
        match self {
            Self::Reveal { timer, .. }
            | Self::AddFlag { timer, .. }
            | Self::Bomb { timer, .. }
            | Self::Win { timer, .. }
            | Self::RetryReveal { timer }
            | Self::HideBoard { timer }
            | Self::ShowBoard { timer, .. } => Some(timer),
            Self::RemoveFlag { .. } => None,
        }
    }
}

fn spawn_flag_ejecta(ctx: &mut TileCtx<'_>) {
    let flag = ctx.tables.color(ColorName::Flag);

    let mut velocity_x = ctx.rng.random_range(0.01..0.03);
    if ctx.rng.random_range(0..2) == 0 {
        velocity_x = -velocity_x;
    }
    let velocity_y = ctx.rng.random_range(-0.2..-0.17);
    let rot_velocity = ctx.rng.random_range(-0.1..0.1);

    ctx.particles.add(Particle {
        sprite: ctx.flag_sprite,
        color_start: flag,
        color_end: flag.fade(0.0),
        color_curve: ColorCurve::EaseInQuint,
        board_x: ctx.coords.0,
        board_y: ctx.coords.1,
        width: 1.0,
        height: 1.0,
        offset: Point::ZERO,
        velocity: pt(velocity_x, velocity_y),
        gravity: pt(0.0, 0.007),
        rotation: 0.0,
        rot_velocity,
        timer: Timer::new(ms(700.0)),
        dead: false,
    });
}

impl<'a> Animation<TileCtx<'a>> for TileAnim {
    fn tag(&self) -> AnimationTag {
        match self {
            Self::Reveal { .. } => AnimationTag::TileReveal,
            Self::AddFlag { .. } => AnimationTag::AddFlag,
            Self::RemoveFlag { .. } => AnimationTag::RemoveFlag,
            Self::Bomb { .. } => AnimationTag::Defeat,
            Self::Win { .. } => AnimationTag::Win,
            Self::RetryReveal { .. } => AnimationTag::RetryButtonReveal,
            Self::HideBoard { .. } => AnimationTag::HideBoard,
            Self::ShowBoard { .. } => AnimationTag::ShowBoard,
        }
    }

    fn update(&mut self, ctx: &mut TileCtx<'a>) {
        match self {
            Self::Reveal {
                timer,
                target,
                started,
            } => {
                timer.tick_up(ctx.dt);
                if !timer.has_started() {
                    ctx.style.draw_tile = false;
                    ctx.style.draw_fg = false;
                    return;
                }
                if !*started {
                    *started = true;
                    ctx.reveal_sounds
                        .on_tile_start(ctx.coords, ctx.now, ctx.sounds);
                }
                *ctx.style = *target;
                if !timer.is_done() {
                    let t = timer.normalize();
                    ctx.style.tile_scale = ctx.tables.graph(BezierName::TileRevealScale, t);
                    ctx.style.tile_offset_y =
                        ctx.tables.graph(BezierName::TileRevealOffsetY, t) * 10.0;
                }
            }
            Self::AddFlag { timer, sounded } => {
                if !*sounded {
                    *sounded = true;
                    ctx.sounds
                        .play_once_per_tick(SoundName::Flag, FLAG_SOUND_VOLUME);
                }
                timer.tick_up(ctx.dt);
                ctx.style.draw_fg = true;
                ctx.style.fg_type = FgType::Flag;
                ctx.style.fg_color = ctx.tables.color(ColorName::Flag);
                ctx.style.fg_flag_anim = timer.normalize();
            }
            Self::RemoveFlag { done } => {
                if *done {
                    return;
                }
                *done = true;
                // a flood that swept over the flag already set the number
                if !ctx.board.is_revealed(ctx.coords) {
                    ctx.style.draw_fg = false;
                    ctx.style.fg_type = FgType::None;
                }
                spawn_flag_ejecta(ctx);
                ctx.sounds
                    .play_once_per_tick(SoundName::Unflag, FLAG_SOUND_VOLUME);
            }
            Self::Bomb { timer, sounded } => {
                if timer.current > 0.0 && !*sounded {
                    *sounded = true;
                    ctx.sounds
                        .play_once_per_tick(SoundName::Pop, POP_SOUND_VOLUME);
                }
                timer.tick_up(ctx.dt);
                ctx.style.bg_bomb_anim = timer.normalize();
            }
            Self::Win { timer, original_fg } => {
                timer.tick_up(ctx.dt);

                let elastic = ease_out_elastic(clamp01(timer.normalize_unclamped() * 0.8));
                // the tail forces the scale back to exactly one
                let scale = elastic.max(ease_in_quint(timer.normalize()));
                ctx.style.tile_scale = scale;
                ctx.style.fg_scale = clamp01(scale);

                let color_t = clamp01(ease_out_quint(timer.normalize()));
                let original = *original_fg.get_or_insert(ctx.style.fg_color);
                if ctx.board.is_revealed(ctx.coords) {
                    ctx.style.fg_color =
                        original.lerp(ctx.tables.color(ColorName::ElementWon), color_t);
                } else {
                    ctx.style.fg_alpha = 1.0 - color_t;
                }
                ctx.style.bg_alpha = 1.0 - color_t;
            }
            Self::RetryReveal { timer } => {
                timer.tick_up(ctx.dt);
                let t = timer.normalize();

                ctx.style.tile_offset_y = -ease_in_quint(t) * 20.0;

                const LIMIT: f64 = 0.8;
                if t > LIMIT {
                    let fade = clamp01((t - LIMIT) / (1.0 - LIMIT));
                    ctx.style.tile_alpha = 1.0 - fade;
                    ctx.style.fg_alpha = 1.0 - fade;
                }

                let bg_t = ease_in_cubic(t);
                ctx.style.bg_alpha = ctx.style.bg_alpha.min(1.0 - bg_t);
                ctx.style.bg_scale = 1.0 - bg_t;
                ctx.style.bg_offset_y = bg_t * 3.0;
            }
            Self::HideBoard { timer } => {
                timer.tick_up(ctx.dt);
                let t = timer.normalize();

                let tile_t = ctx.tables.graph(BezierName::BoardHideTile, t);
                let alpha_t = clamp01(ctx.tables.graph(BezierName::BoardHideTileAlpha, t));

                ctx.style.bg_offset_y = lerp(0.0, 30.0, tile_t);
                ctx.style.tile_offset_y = lerp(0.0, 30.0, tile_t);

                ctx.style.bg_alpha = alpha_t;
                ctx.style.tile_alpha = alpha_t;
                ctx.style.fg_alpha = alpha_t;

                let size_t = 1.0 - tile_t;
                ctx.style.tile_scale = size_t;
                ctx.style.bg_scale = clamp01(size_t) * clamp01(size_t);
            }
            Self::ShowBoard { timer, target } => {
                timer.tick_up(ctx.dt);
                let t = timer.normalize();

                *ctx.style = *target;
                if !timer.is_done() {
                    ctx.style.bg_offset_y =
                        ctx.tables.graph(BezierName::BoardShowTileOffsetY, t) * 50.0;
                    ctx.style.bg_alpha = ctx.tables.graph(BezierName::BoardShowTileAlpha, t);
                    ctx.style.bg_scale = ctx.tables.graph(BezierName::BoardShowTileScale, t);
                }
            }
        }
    }

    fn skip(&mut self, ctx: &mut TileCtx<'a>) {
        match self {
            Self::Reveal { started, .. } => *started = true,
            Self::AddFlag { sounded, .. } | Self::Bomb { sounded, .. } => *sounded = true,
            _ => {}
        }
        if let Some(timer) = self.timer_mut() {
            timer.finish();
        }
        self.update(ctx);
    }

    fn is_done(&self) -> bool {
        match self {
            Self::RemoveFlag { done } => *done,
            Self::Reveal { timer, .. }
            | Self::AddFlag { timer, .. }
            | Self::Bomb { timer, .. }
            | Self::Win { timer, .. }
            | Self::RetryReveal { timer }
            | Self::HideBoard { timer }
            | Self::ShowBoard { timer, .. } => timer.is_done(),
        }
    }

    fn after_done(&mut self, ctx: &mut TileCtx<'a>) {
        match self {
            Self::AddFlag { .. } => ctx.style.fg_flag_anim = 1.0,
            Self::Win { .. } => {
                if !ctx.board.is_revealed(ctx.coords) {
                    ctx.style.draw_fg = false;
                }
                ctx.style.draw_bg = false;
            }
            Self::RetryReveal { .. } | Self::HideBoard { .. } => {
                ctx.style.draw_bg = false;
                ctx.style.draw_tile = false;
                ctx.style.draw_fg = false;
            }
            _ => {}
        }
    }
}
