use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ease::{ease_out_elastic, ease_out_quint};
use crate::tables::{BezierName, Tables};
use crate::timer::{Seconds, Timer, ms};
use crate::view::BoardView;

use super::{Animation, AnimationTag};

pub const ZOOM_OUT_DURATION: Seconds = ms(500.0);
pub const RETRY_BUTTON_REVEAL_DURATION: Seconds = ms(400.0);
pub const WATER_FLOW_DISTANCE: f64 = 10.0;

/// Board-wide presentation values that game animations drive.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameFx {
    pub water_alpha: f64,
    pub water_flow_offset: f64,
    pub draw_retry: bool,
    pub retry_scale: f64,
    pub retry_offset_y: f64,
    pub retry_disabled: bool,
    /// User zoom and pan are ignored while set.
    pub view_locked: bool,
}

impl Default for GameFx {
    fn default() -> Self {
        Self {
            water_alpha: 0.0,
            water_flow_offset: 0.0,
            draw_retry: false,
            retry_scale: 1.0,
            retry_offset_y: 0.0,
            retry_disabled: true,
            view_locked: false,
        }
    }
}

/// Work a game animation hands back to the orchestrator once it retires,
/// because it needs more than the animation context can reach.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUp {
    ZoomOut(AnimationTag),
    RetryReveal,
    ResetAndShow,
    SetPlaying,
}

pub struct GameCtx<'a> {
    pub dt: Seconds,
    pub tables: &'a Tables,
    pub fx: &'a mut GameFx,
    pub view: &'a mut BoardView,
    pub follow_ups: &'a mut SmallVec<[FollowUp; 2]>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GameAnim {
    /// Waits out the bomb flashes.
    Defeat {
        timer: Timer,
    },
    /// Floods the board with water while the tiles celebrate.
    Win {
        timer: Timer,
    },
    ZoomOut {
        tag: AnimationTag,
        timer: Timer,
        from: Option<BoardView>,
    },
    RetryButtonReveal {
        timer: Timer,
    },
    HideBoard {
        button: Timer,
        reset: Timer,
    },
    ShowBoard {
        timer: Timer,
    },
}

impl GameAnim {
    pub fn defeat(duration: Seconds) -> Self {
        Self::Defeat {
            timer: Timer::new(duration),
        }
    }

    pub fn win(duration: Seconds) -> Self {
        Self::Win {
            timer: Timer::new(duration),
        }
    }

    /// `tag` is the end animation this zoom belongs to.
    pub fn zoom_out(tag: AnimationTag) -> Self {
        Self::ZoomOut {
            tag,
            timer: Timer::new(ZOOM_OUT_DURATION),
            from: None,
        }
    }

    pub fn retry_button_reveal(delay: Seconds) -> Self {
        Self::RetryButtonReveal {
            timer: Timer::delayed(RETRY_BUTTON_REVEAL_DURATION, delay),
        }
    }

    pub fn hide_board(button_duration: Seconds, reset_after: Seconds) -> Self {
        Self::HideBoard {
            button: Timer::new(button_duration),
            reset: Timer::new(reset_after),
        }
    }

    pub fn show_board(duration: Seconds) -> Self {
        Self::ShowBoard {
            timer: Timer::new(duration),
        }
    }
}

impl<'a> Animation<GameCtx<'a>> for GameAnim {
    fn tag(&self) -> AnimationTag {
        match self {
            Self::Defeat { .. } => AnimationTag::Defeat,
            Self::Win { .. } => AnimationTag::Win,
            Self::ZoomOut { tag, .. } => *tag,
            Self::RetryButtonReveal { .. } => AnimationTag::RetryButtonReveal,
            Self::HideBoard { .. } => AnimationTag::HideBoard,
            Self::ShowBoard { .. } => AnimationTag::ShowBoard,
        }
    }

    fn update(&mut self, ctx: &mut GameCtx<'a>) {
        match self {
            Self::Defeat { timer } | Self::ShowBoard { timer } => timer.tick_up(ctx.dt),
            Self::Win { timer } => {
                timer.tick_up(ctx.dt);
                let t = ease_out_quint(timer.normalize());
                ctx.fx.water_alpha = t;
                ctx.fx.water_flow_offset = t * WATER_FLOW_DISTANCE;
            }
            Self::ZoomOut { timer, from, .. } => {
                timer.tick_up(ctx.dt);
                ctx.fx.view_locked = true;
                let from = *from.get_or_insert(*ctx.view);
                let t = ctx.tables.graph(BezierName::BoardZoomOut, timer.normalize());
                *ctx.view = from.lerp(&BoardView::IDENTITY, t);
            }
            Self::RetryButtonReveal { timer } => {
                timer.tick_up(ctx.dt);
                ctx.fx.draw_retry = true;
                ctx.fx.retry_scale = ease_out_elastic(timer.normalize());
                ctx.fx.retry_disabled = ctx.fx.retry_scale <= 0.5;
            }
            Self::HideBoard { button, reset } => {
                button.tick_up(ctx.dt);
                reset.tick_up(ctx.dt);
                let t = ctx.tables.graph(BezierName::BoardHideButton, button.normalize());
                ctx.fx.retry_scale = (1.0 - t).max(0.0);
                ctx.fx.retry_disabled = true;
            }
        }
    }

    fn skip(&mut self, ctx: &mut GameCtx<'a>) {
        match self {
            Self::Defeat { timer }
            | Self::Win { timer }
            | Self::ZoomOut { timer, .. }
            | Self::RetryButtonReveal { timer }
            | Self::ShowBoard { timer } => timer.finish(),
            Self::HideBoard { button, reset } => {
                button.finish();
                reset.finish();
            }
        }
        self.update(ctx);
    }

    fn is_done(&self) -> bool {
        match self {
            Self::Defeat { timer }
            | Self::Win { timer }
            | Self::ZoomOut { timer, .. }
            | Self::RetryButtonReveal { timer }
            | Self::ShowBoard { timer } => timer.is_done(),
            Self::HideBoard { button, reset } => button.is_done() && reset.is_done(),
        }
    }

    fn after_done(&mut self, ctx: &mut GameCtx<'a>) {
        match self {
            Self::Defeat { .. } => ctx.follow_ups.push(FollowUp::ZoomOut(AnimationTag::Defeat)),
            Self::Win { .. } => ctx.follow_ups.push(FollowUp::ZoomOut(AnimationTag::Win)),
            Self::ZoomOut { .. } => {
                ctx.fx.view_locked = false;
                ctx.follow_ups.push(FollowUp::RetryReveal);
            }
            Self::RetryButtonReveal { .. } => {}
            Self::HideBoard { .. } => ctx.follow_ups.push(FollowUp::ResetAndShow),
            Self::ShowBoard { .. } => ctx.follow_ups.push(FollowUp::SetPlaying),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::AnimationQueue;
    use crate::geom::pt;

    const TICK: Seconds = 1.0 / 64.0;

    struct Fixture {
        tables: Tables,
        fx: GameFx,
        view: BoardView,
        follow_ups: SmallVec<[FollowUp; 2]>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tables: Tables::default(),
                fx: GameFx::default(),
                view: BoardView::default(),
                follow_ups: SmallVec::new(),
            }
        }

        fn ctx(&mut self) -> GameCtx<'_> {
            GameCtx {
                dt: TICK,
                tables: &self.tables,
                fx: &mut self.fx,
                view: &mut self.view,
                follow_ups: &mut self.follow_ups,
            }
        }
    }

    #[test]
    fn zoom_out_returns_to_identity() {
        let mut fixture = Fixture::new();
        fixture.view = BoardView {
            zoom: 3.0,
            offset: pt(40.0, -20.0),
        };
        let mut queue = AnimationQueue::new(10);
        queue.enqueue(GameAnim::zoom_out(AnimationTag::Defeat));

        queue.update(&mut fixture.ctx());
        assert!(fixture.fx.view_locked);
        assert!(fixture.view.zoom < 3.0);

        while !queue.is_empty() {
            queue.update(&mut fixture.ctx());
        }
        assert!(fixture.view.is_identity());
        assert!(!fixture.fx.view_locked);
        assert_eq!(fixture.follow_ups.as_slice(), [FollowUp::RetryReveal]);
    }

    #[test]
    fn retry_button_enables_past_half_scale() {
        let mut fixture = Fixture::new();
        let mut anim = GameAnim::retry_button_reveal(0.0);
        anim.update(&mut fixture.ctx());
        assert!(fixture.fx.draw_retry);
        assert!(fixture.fx.retry_disabled);

        anim.skip(&mut fixture.ctx());
        assert_eq!(fixture.fx.retry_scale, 1.0);
        assert!(!fixture.fx.retry_disabled);
    }

    #[test]
    fn hide_board_waits_for_both_timers() {
        let mut fixture = Fixture::new();
        let mut queue = AnimationQueue::new(10);
        queue.enqueue(GameAnim::hide_board(2.0 * TICK, 5.0 * TICK));

        for _ in 0..2 {
            queue.update(&mut fixture.ctx());
        }
        assert_eq!(queue.len(), 1);
        assert!(fixture.fx.retry_disabled);

        for _ in 0..3 {
            queue.update(&mut fixture.ctx());
        }
        assert!(queue.is_empty());
        assert_eq!(fixture.follow_ups.as_slice(), [FollowUp::ResetAndShow]);
    }

    #[test]
    fn end_animations_hand_off_to_zoom_out() {
        let mut fixture = Fixture::new();
        let mut queue = AnimationQueue::new(10);
        queue.enqueue(GameAnim::win(ms(100.0)));
        queue.skip_until_tag(&mut fixture.ctx(), &[AnimationTag::RetryButtonReveal]);
        assert_eq!(fixture.fx.water_alpha, 1.0);
        assert_eq!(fixture.fx.water_flow_offset, WATER_FLOW_DISTANCE);
        assert_eq!(
            fixture.follow_ups.as_slice(),
            [FollowUp::ZoomOut(AnimationTag::Win)]
        );
    }
}
