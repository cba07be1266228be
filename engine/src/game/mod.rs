//! The orchestrator: owns the board, the style grids and every animation
//! queue, and runs them in a fixed order once per tick.

use ndarray::Array2;
use rand::prelude::*;
use smallvec::SmallVec;
use tilesweeper_core::{
    Board, BoardIter, CellCount, Coord, Coord2, GameConfig, GameState, PlayBoard, Seed, ToNdIndex, grid_shape,
};

use crate::anim::{
    AnimationQueue, FollowUp, GAME_QUEUE_CAPACITY, GameAnim, GameCtx, GameFx, RevealSounds, TILE_QUEUE_CAPACITY,
    TileAnim, TileCtx,
};
use crate::assets::Assets;
use crate::config::EngineConfig;
use crate::error::ConfigResult;
use crate::geom::{Rect, pt};
use crate::input::{GameInput, InputFrame, InputInterpreter, KeyRepeat};
use crate::modifier::{ClickFeedback, HighlightModifier, ModifierCtx, StyleModifier};
use crate::particle::{Particles, UnitConverter};
use crate::redraw::RedrawGovernor;
use crate::render::batch::ViBuffer;
use crate::render::water::WaterPass;
use crate::render::{BoardFrame, Surface, Target, TileRenderer, TriangleOptions};
use crate::retry::{RetryButton, transformed_retry_button_rect};
use crate::sound::{AudioGate, SoundName, SoundQueue, SoundRequest};
use crate::style::{TileStyle, style_grid, target_styles};
use crate::tables::Tables;
use crate::timer::Clock;
use crate::tutorial::FlagTutorial;
use crate::view::BoardView;

mod anims;
mod dev;

pub const DEFEAT_SOUND_VOLUME: f64 = 0.7;
pub const VICTORY_SOUND_VOLUME: f64 = 0.6;
/// Share of the screen the default board layout fills.
pub const BOARD_SCREEN_FILL: f64 = 0.9;

type FollowUps = SmallVec<[FollowUp; 2]>;

/// Hooks for the embedding UI.
#[derive(Default)]
struct Callbacks {
    before_board_reset: Option<Box<dyn FnMut()>>,
    after_board_reset: Option<Box<dyn FnMut()>>,
    game_end: Option<Box<dyn FnMut(bool)>>,
    first_interaction: Option<Box<dyn FnMut()>>,
}

/// Largest whole-pixel tile grid that fits the screen, centered.
pub fn fit_board_rect(screen: Rect, (width, height): Coord2) -> Rect {
    let tile = (screen.width() * BOARD_SCREEN_FILL / width as f64)
        .min(screen.height() * BOARD_SCREEN_FILL / height as f64)
        .floor()
        .max(1.0);
    Rect::from_wh(tile * width as f64, tile * height as f64)
        .centered_at(screen.center())
        .snapped()
}

fn newly_revealed(before: &Board, after: &Board) -> Vec<Coord2> {
    BoardIter::whole(after.size())
        .filter(|&coords| after.is_revealed(coords) && !before.is_revealed(coords))
        .collect()
}

/// Cells whose flag changed, with whether the flag is now set.
fn changed_flags(before: &Board, after: &Board) -> Vec<(Coord2, bool)> {
    BoardIter::whole(after.size())
        .filter(|&coords| after.is_flagged(coords) != before.is_flagged(coords))
        .map(|coords| (coords, after.is_flagged(coords)))
        .collect()
}

pub struct Game {
    config: EngineConfig,
    game_config: GameConfig,
    assets: Assets,
    tables: Tables,
    clock: Clock,
    redraw: RedrawGovernor,
    rng: SmallRng,

    play: PlayBoard,
    prev_board: Board,
    base_styles: Array2<TileStyle>,
    render_styles: Array2<TileStyle>,
    tile_queues: Array2<AnimationQueue<TileAnim>>,
    game_queue: AnimationQueue<GameAnim>,
    fx: GameFx,
    view: BoardView,
    zooming: bool,

    input: InputInterpreter,
    highlight: HighlightModifier,
    click: ClickFeedback,
    tutorial: FlagTutorial,

    particles: Particles,
    sounds: SoundQueue,
    audio: AudioGate,
    reveal_sounds: RevealSounds,

    renderer: TileRenderer,
    particle_buffer: ViBuffer,
    retry: RetryButton,
    repeat: KeyRepeat,

    screen: Rect,
    board_rect: Rect,
    zones: Vec<Rect>,
    callbacks: Callbacks,
    first_interaction_pending: bool,
}

impl Game {
    pub fn new(config: EngineConfig, assets: Assets, tables: Tables) -> ConfigResult<Self> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(config.rng_seed);
        let seed = match config.fixed_seed()? {
            Some(seed) => seed,
            None => Seed::from_u64(rng.random()),
        };
        let game_config = config.game_config();
        let screen = Rect::from_wh(config.screen_width, config.screen_height);
        let board_rect = fit_board_rect(screen, game_config.size);
        let clock = Clock::new(config.tps);
        let redraw = RedrawGovernor::new(clock.now(), config.always_draw);

        log::info!(
            "New game {}x{} with {} mines, seed {}",
            game_config.size.0,
            game_config.size.1,
            game_config.mines,
            seed
        );

        let play = PlayBoard::new(game_config, seed);
        let size = play.size();
        let mut game = Self {
            config,
            game_config,
            assets,
            tables,
            clock,
            redraw,
            rng,
            prev_board: Board::new(size),
            base_styles: style_grid(size),
            render_styles: style_grid(size),
            tile_queues: Array2::from_shape_fn(grid_shape(size), |_| AnimationQueue::new(TILE_QUEUE_CAPACITY)),
            game_queue: AnimationQueue::new(GAME_QUEUE_CAPACITY),
            play,
            fx: GameFx::default(),
            view: BoardView::IDENTITY,
            zooming: false,
            input: InputInterpreter::new(),
            highlight: HighlightModifier::new(),
            click: ClickFeedback::new(),
            tutorial: FlagTutorial::new(),
            particles: Particles::with_capacity(256),
            sounds: SoundQueue::new(),
            audio: AudioGate::ready(),
            reveal_sounds: RevealSounds::default(),
            renderer: TileRenderer::new(),
            particle_buffer: ViBuffer::with_capacity(16),
            retry: RetryButton::new(),
            repeat: KeyRepeat::new(),
            screen,
            board_rect,
            zones: Vec::new(),
            callbacks: Callbacks::default(),
            first_interaction_pending: true,
        };
        game.apply_target_styles();
        Ok(game)
    }

    // ---------------------------------------------------------------------
    // queries

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        self.play.board()
    }

    pub fn state(&self) -> GameState {
        self.play.state()
    }

    pub fn size(&self) -> Coord2 {
        self.play.size()
    }

    pub fn seed(&self) -> Seed {
        self.play.seed()
    }

    pub fn mine_count(&self) -> CellCount {
        self.play.mine_count()
    }

    pub fn flag_count(&self) -> CellCount {
        self.play.board().flag_count()
    }

    pub fn losing_cell(&self) -> Option<Coord2> {
        self.play.losing_cell()
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn fx(&self) -> &GameFx {
        &self.fx
    }

    pub fn view(&self) -> BoardView {
        self.view
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn base_styles(&self) -> &Array2<TileStyle> {
        &self.base_styles
    }

    pub fn render_styles(&self) -> &Array2<TileStyle> {
        &self.render_styles
    }

    pub fn tile_queue(&self, coords: Coord2) -> &AnimationQueue<TileAnim> {
        &self.tile_queues[coords.to_nd_index()]
    }

    pub fn game_queue(&self) -> &AnimationQueue<GameAnim> {
        &self.game_queue
    }

    pub fn is_animating(&self) -> bool {
        !self.game_queue.is_empty() || self.tile_queues.iter().any(|queue| !queue.is_empty())
    }

    pub fn tutorial(&self) -> &FlagTutorial {
        &self.tutorial
    }

    /// Untransformed board rect.
    pub fn board_rect(&self) -> Rect {
        self.board_rect
    }

    /// Board rect with the player's zoom and pan applied.
    pub fn transformed_board_rect(&self) -> Rect {
        self.view.transform(self.board_rect)
    }

    /// Where the retry button is this tick.
    pub fn retry_button_rect(&self) -> Rect {
        transformed_retry_button_rect(
            self.board_rect,
            self.config.retry_button_size,
            self.fx.retry_scale,
            pt(0.0, self.fx.retry_offset_y),
        )
    }

    pub fn retry_button(&self) -> &RetryButton {
        &self.retry
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn should_draw(&self) -> bool {
        self.redraw.should_draw(self.clock.now())
    }

    // ---------------------------------------------------------------------
    // embedding

    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        self.screen = Rect::from_wh(width, height);
        self.request_redraw();
    }

    pub fn set_board_rect(&mut self, rect: Rect) {
        self.board_rect = rect;
        self.request_redraw();
    }

    /// Screen areas owned by other UI. Board input starting there is ignored.
    pub fn add_no_input_zone(&mut self, zone: Rect) {
        self.zones.push(zone);
    }

    pub fn clear_no_input_zones(&mut self) {
        self.zones.clear();
    }

    pub fn no_input_zones(&self) -> &[Rect] {
        &self.zones
    }

    pub fn set_always_draw(&mut self, always_draw: bool) {
        self.redraw.set_always_draw(always_draw);
    }

    pub fn set_audio_gate(&mut self, gate: AudioGate) {
        self.audio = gate;
    }

    /// Swaps the tuning tables and redraws everything.
    pub fn set_tables(&mut self, tables: Tables) {
        log::info!("Tuning tables replaced");
        self.tables = tables;
        if !self.is_animating() {
            self.apply_target_styles();
        }
        self.request_redraw();
    }

    /// Sound requests since the last drain. Dropped until audio is ready.
    pub fn drain_sounds(&mut self) -> Vec<SoundRequest> {
        if !self.audio.poll() {
            self.sounds.clear();
            return Vec::new();
        }
        self.sounds.drain().collect()
    }

    pub fn on_before_board_reset(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.before_board_reset = Some(Box::new(callback));
    }

    pub fn on_after_board_reset(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.after_board_reset = Some(Box::new(callback));
    }

    /// Called with `true` on a win and `false` on a loss.
    pub fn on_game_end(&mut self, callback: impl FnMut(bool) + 'static) {
        self.callbacks.game_end = Some(Box::new(callback));
    }

    /// Called on the first board change after each reset.
    pub fn on_first_interaction(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.first_interaction = Some(Box::new(callback));
    }

    // ---------------------------------------------------------------------
    // resets

    /// Starts a new board with a fresh seed, without animation.
    pub fn reset_board(&mut self) {
        let seed = self.next_seed();
        self.reset_board_with_seed(seed);
    }

    pub fn reset_board_with_seed(&mut self, seed: Seed) {
        self.reset_with_no_styles(PlayBoard::new(self.game_config, seed));
        self.apply_target_styles();
    }

    /// Replaces the board with one whose mines are already decided.
    pub fn load_board(&mut self, play: PlayBoard) {
        self.reset_with_no_styles(play);
        self.apply_target_styles();
    }

    fn next_seed(&mut self) -> Seed {
        Seed::from_u64(self.rng.random())
    }

    /// Swaps in `play` with blank styles and empty queues.
    fn reset_with_no_styles(&mut self, play: PlayBoard) {
        if let Some(callback) = &mut self.callbacks.before_board_reset {
            callback();
        }

        let size = play.size();
        log::debug!("Board reset to {}x{}, seed {}", size.0, size.1, play.seed());

        self.game_config = GameConfig::new(size, play.mine_count());
        self.first_interaction_pending = true;
        self.play = play;
        self.prev_board = Board::new(size);
        self.game_queue.clear();
        self.fx = GameFx::default();
        self.base_styles = style_grid(size);
        self.render_styles = style_grid(size);
        self.tile_queues = Array2::from_shape_fn(grid_shape(size), |_| AnimationQueue::new(TILE_QUEUE_CAPACITY));
        self.particles.clear();
        self.request_redraw();

        if let Some(callback) = &mut self.callbacks.after_board_reset {
            callback();
        }
    }

    fn apply_target_styles(&mut self) {
        self.base_styles = target_styles(self.play.board(), &self.tables);
        self.render_styles.clone_from(&self.base_styles);
    }

    fn request_redraw(&mut self) {
        self.redraw.set_redraw(self.clock.now());
    }

    // ---------------------------------------------------------------------
    // tick

    /// Advances one fixed tick with the input gathered for it.
    pub fn update(&mut self, frame: &InputFrame) {
        self.clock.tick();
        self.sounds.begin_tick();
        let now = self.clock.now();
        let dt = self.clock.update_delta();
        let view_before = self.view;

        // input and view
        let board_rect = self.view.transform(self.board_rect);
        let (input, delta) = self
            .input
            .update(frame, now, self.play.board(), board_rect, &self.zones);
        if !self.fx.view_locked && !delta.is_none() {
            if delta.zoom != 1.0 {
                self.view.zoom_at(self.board_rect, delta.zoom, delta.anchor);
            }
            self.view.pan(delta.pan);
        }

        // interaction
        let prev_state = self.play.state();
        self.prev_board.clone_from(self.play.board());
        let mut state_changed = false;
        let mut reveal_origin = input.coords();

        if prev_state == GameState::Playing {
            if let Some(interaction) = input.interaction() {
                let state = self.play.interact(input.coords(), interaction);
                state_changed = state != prev_state || self.play.board().differs_from(&self.prev_board);
                log::debug!(
                    "{:?} at ({}, {}) -> {:?}{}",
                    interaction,
                    input.board_x,
                    input.board_y,
                    state,
                    if state_changed { "" } else { ", nothing changed" }
                );
            }
        }
        self.tutorial.observe(input, &self.prev_board, self.play.board());

        if self.config.dev_mode {
            for &key in &frame.keys {
                if self.handle_dev_key(key) {
                    state_changed = true;
                    reveal_origin = (0, 0);
                }
            }
        }

        if state_changed {
            self.on_state_changed(prev_state, reveal_origin);
        }

        // animations
        let follow_ups = self.with_game_queue(|queue, ctx| queue.update(ctx));
        self.apply_follow_ups(follow_ups);
        self.with_tile_queues(|queue, ctx| queue.update(ctx));
        self.render_styles.clone_from(&self.base_styles);
        if self.is_animating() {
            self.request_redraw();
        }

        // modifiers
        let board_rect = self.view.transform(self.board_rect);
        if self
            .tutorial
            .update(self.play.board(), self.play.state(), board_rect, self.screen, dt)
        {
            self.request_redraw();
        }
        if self.run_modifiers(input, frame, board_rect, state_changed, prev_state) {
            self.request_redraw();
        }

        // anything pressed after the game ended fast-forwards to the button
        if prev_state.is_finished() && frame.any_just_pressed() {
            self.skip_until_retry_reveal();
        }

        // particles
        let units = UnitConverter {
            board_size: self.play.size(),
            board_rect,
        };
        if self.particles.step(dt, &units, self.screen.height()) {
            self.request_redraw();
        }

        // retry button
        let rect = self.retry_button_rect();
        let disabled = self.fx.retry_disabled || !self.fx.draw_retry;
        let outcome = self.retry.update(
            rect,
            disabled,
            frame,
            self.input.touches(),
            &mut self.repeat,
            now,
            &mut self.sounds,
        );
        if outcome.redraw {
            self.request_redraw();
        }
        if outcome.retry {
            log::info!("Retry pressed, hiding board");
            self.queue_reset_board();
        }

        self.zooming = self.view.zoom != view_before.zoom;
        if self.view != view_before {
            self.request_redraw();
        }
    }

    fn on_state_changed(&mut self, prev_state: GameState, origin: Coord2) {
        self.request_redraw();
        let state = self.play.state();

        let revealed = newly_revealed(&self.prev_board, self.play.board());
        let flags = changed_flags(&self.prev_board, self.play.board());

        self.skip_all_animations();
        if !revealed.is_empty() {
            self.enqueue_reveal(&revealed, origin);
        }
        for (coords, added) in flags {
            let anim = if added {
                TileAnim::add_flag()
            } else {
                TileAnim::remove_flag()
            };
            self.tile_queues[coords.to_nd_index()].enqueue(anim);
        }

        if state != prev_state {
            match state {
                GameState::Lost => {
                    self.sounds.play(SoundName::Defeat, DEFEAT_SOUND_VOLUME);
                    let origin = self.play.losing_cell().unwrap_or(origin);
                    self.queue_defeat(origin);
                }
                GameState::Won => {
                    self.queue_win(origin);
                    self.sounds.play(SoundName::Victory, VICTORY_SOUND_VOLUME);
                }
                GameState::Playing => {}
            }
        }

        if self.first_interaction_pending {
            self.first_interaction_pending = false;
            if let Some(callback) = &mut self.callbacks.first_interaction {
                callback();
            }
        }

        if state != prev_state && state.is_finished() {
            let won = state == GameState::Won;
            log::info!("Game over, {}", if won { "won" } else { "lost" });
            if let Some(callback) = &mut self.callbacks.game_end {
                callback(won);
            }
        }
    }

    fn run_modifiers(
        &mut self,
        input: GameInput,
        frame: &InputFrame,
        board_rect: Rect,
        state_changed: bool,
        prev_state: GameState,
    ) -> bool {
        let ctx = ModifierCtx {
            prev_board: &self.prev_board,
            board: self.play.board(),
            board_rect,
            input,
            frame,
            touches: self.input.touches(),
            state_changed,
            prev_state,
            state: self.play.state(),
            dt: self.clock.update_delta(),
            now: self.clock.now(),
            tables: &self.tables,
        };

        let mut redraw = false;
        let modifiers: [&mut dyn StyleModifier; 3] = [&mut self.highlight, &mut self.click, &mut self.tutorial];
        for modifier in modifiers {
            redraw |= modifier.modify(&ctx, &mut self.render_styles);
        }
        redraw
    }

    // ---------------------------------------------------------------------
    // queue plumbing

    /// Runs `f` on every non-empty tile queue with that tile's context.
    fn with_tile_queues(&mut self, mut f: impl FnMut(&mut AnimationQueue<TileAnim>, &mut TileCtx<'_>)) {
        let dt = self.clock.update_delta();
        let now = self.clock.now();
        let flag_sprite = self.assets.flags.subview(self.assets.flags.frame_at(1.0));
        let board = self.play.board();

        for ((y, x), queue) in self.tile_queues.indexed_iter_mut() {
            if queue.is_empty() {
                continue;
            }
            let mut ctx = TileCtx {
                coords: (x as Coord, y as Coord),
                style: &mut self.base_styles[(y, x)],
                dt,
                now,
                board,
                tables: &self.tables,
                sounds: &mut self.sounds,
                reveal_sounds: &mut self.reveal_sounds,
                particles: &mut self.particles,
                rng: &mut self.rng,
                flag_sprite,
            };
            f(queue, &mut ctx);
        }
    }

    /// Runs `f` on the game queue and returns the follow-ups it produced.
    fn with_game_queue(&mut self, f: impl FnOnce(&mut AnimationQueue<GameAnim>, &mut GameCtx<'_>)) -> FollowUps {
        let mut follow_ups = FollowUps::new();
        let mut ctx = GameCtx {
            dt: self.clock.update_delta(),
            tables: &self.tables,
            fx: &mut self.fx,
            view: &mut self.view,
            follow_ups: &mut follow_ups,
        };
        f(&mut self.game_queue, &mut ctx);
        follow_ups
    }

    fn apply_follow_ups(&mut self, follow_ups: FollowUps) {
        for follow_up in follow_ups {
            log::debug!("Follow-up {:?}", follow_up);
            match follow_up {
                FollowUp::ZoomOut(tag) => self.game_queue.enqueue(GameAnim::zoom_out(tag)),
                FollowUp::RetryReveal => self.enqueue_retry_reveal(),
                FollowUp::ResetAndShow => {
                    let seed = self.next_seed();
                    self.reset_with_no_styles(PlayBoard::new(self.game_config, seed));
                    let (width, height) = self.play.size();
                    self.enqueue_show((width / 2, height / 2));
                }
                FollowUp::SetPlaying => self.play.set_state(GameState::Playing),
            }
        }
    }

    /// Finishes every queued animation, including whatever their follow-ups
    /// queue.
    fn skip_all_animations(&mut self) {
        loop {
            self.with_tile_queues(|queue, ctx| queue.skip_all(ctx));
            let follow_ups = self.with_game_queue(|queue, ctx| queue.skip_all(ctx));
            if follow_ups.is_empty() {
                break;
            }
            self.apply_follow_ups(follow_ups);
        }
    }

    /// Finishes everything up to the retry button reveal.
    fn skip_until_retry_reveal(&mut self) {
        use crate::anim::AnimationTag::RetryButtonReveal;

        loop {
            self.with_tile_queues(|queue, ctx| queue.skip_until_tag(ctx, &[RetryButtonReveal]));
            let follow_ups = self.with_game_queue(|queue, ctx| queue.skip_until_tag(ctx, &[RetryButtonReveal]));
            if follow_ups.is_empty() {
                break;
            }
            self.apply_follow_ups(follow_ups);
        }
    }

    // ---------------------------------------------------------------------
    // draw

    /// Draws the background, the board, the tutorial, the retry button and
    /// the particles, in that order.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        let now = self.clock.now();
        surface.fill(Target::Screen, self.tables.background());

        let board_rect = self.view.transform(self.board_rect);
        let water = (self.play.state() == GameState::Won).then_some(WaterPass {
            alpha: self.fx.water_alpha,
            flow_offset: self.fx.water_flow_offset,
            time: now,
        });
        if water.is_some() {
            self.redraw.set_redraw(now);
        }

        let frame = BoardFrame {
            board: self.play.board(),
            board_rect,
            styles: &self.render_styles,
            water,
            zooming: self.zooming,
        };
        self.renderer
            .draw(surface, &self.assets, &self.tables, &frame);

        self.tutorial.draw(
            surface,
            &self.assets,
            &self.tables,
            board_rect,
            self.play.size(),
        );

        if self.fx.draw_retry {
            self.retry
                .draw(surface, &self.assets, &self.tables, water);
        }

        let units = UnitConverter {
            board_size: self.play.size(),
            board_rect,
        };
        self.particle_buffer.reset();
        self.particles
            .append_to(&mut self.particle_buffer, &units);
        if !self.particle_buffer.is_empty() {
            surface.triangles(
                Target::Screen,
                &self.particle_buffer.vertices,
                &self.particle_buffer.indices,
                Some(self.assets.flags.image.id),
                &TriangleOptions::default(),
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::anim::{Animation, AnimationTag};
    use crate::assets::MemoryAssets;
    use crate::input::{DevKey, MouseButtons};
    use crate::render::{DrawCall, RecordingSurface};
    use crate::style::target_style;
    use smallvec::smallvec;

    /// A game whose board sits at the origin with 10 px tiles.
    pub(crate) fn game_with(layout: &[&str]) -> Game {
        let board = Board::from_layout(layout).unwrap();
        let size = board.size();
        let config = EngineConfig {
            board_width: size.0,
            board_height: size.1,
            mines: board.mine_count(),
            dev_mode: false,
            screen_width: 100.0,
            screen_height: 100.0,
            ..EngineConfig::default()
        };
        let assets = Assets::load(&MemoryAssets::builtin()).unwrap();
        let mut game = Game::new(config, assets, Tables::default()).unwrap();
        game.set_board_rect(Rect::from_wh(size.0 as f64 * 10.0, size.1 as f64 * 10.0));
        game.load_board(PlayBoard::with_mines(board, Seed::ZERO).unwrap());
        game
    }

    fn click(coords: Coord2, button: MouseButtons) -> InputFrame {
        InputFrame {
            cursor: pt(coords.0 as f64 * 10.0 + 5.0, coords.1 as f64 * 10.0 + 5.0),
            pressed: button,
            just_pressed: button,
            ..InputFrame::default()
        }
    }

    fn idle(game: &mut Game, ticks: usize) {
        for _ in 0..ticks {
            game.update(&InputFrame::default());
        }
    }

    fn settle(game: &mut Game) {
        for _ in 0..2000 {
            if !game.is_animating() {
                return;
            }
            game.update(&InputFrame::default());
        }
        panic!("animations never settled");
    }

    fn head_tag(queue: &AnimationQueue<TileAnim>) -> Option<AnimationTag> {
        queue.iter().next().map(|anim| anim.tag())
    }

    const POCKET: [&str; 5] = ["...*.", "...*.", "****.", ".....", "....."];

    #[test]
    fn default_layout_fits_the_screen() {
        let rect = fit_board_rect(Rect::from_wh(600.0, 800.0), (10, 12));
        assert_eq!(rect.width(), 540.0);
        assert_eq!(rect.height(), 648.0);
        assert_eq!(rect.center(), pt(300.0, 400.0));
    }

    #[test]
    fn fresh_game_rests_on_target_styles() {
        let game = game_with(&POCKET);
        assert_eq!(game.state(), GameState::Playing);
        assert!(!game.is_animating());
        assert_eq!(*game.base_styles(), target_styles(game.board(), game.tables()));
    }

    #[test]
    fn step_queues_staggered_reveals() {
        let mut game = game_with(&POCKET);
        game.update(&click((0, 0), MouseButtons::LEFT));

        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.board().revealed_count(), 6);
        // the origin finishes in one tick, farther tiles wait their turn
        assert!(game.tile_queue((0, 0)).is_empty());
        assert_eq!(head_tag(game.tile_queue((2, 0))), Some(AnimationTag::TileReveal));
        let sounds: Vec<_> = game.drain_sounds().into_iter().map(|s| s.name).collect();
        assert_eq!(sounds, [SoundName::TileReveal]);

        settle(&mut game);
        for coords in BoardIter::whole(game.size()) {
            assert_eq!(
                game.base_styles()[coords.to_nd_index()],
                target_style(game.board(), game.tables(), coords),
                "{coords:?}"
            );
        }
    }

    #[test]
    fn flood_over_flags_settles_on_numbers() {
        // (0, 1) is a flagged zero, (2, 1) a flagged 1, both reached by the flood
        let mut game = game_with(&["....*", "!.!.*", "...**", "*****", "....."]);
        game.update(&click((0, 0), MouseButtons::LEFT));

        assert!(game.board().is_revealed((0, 1)) && game.board().is_revealed((2, 1)));
        assert!(!game.board().is_flagged((0, 1)) && !game.board().is_flagged((2, 1)));
        assert_eq!(head_tag(game.tile_queue((2, 1))), Some(AnimationTag::TileReveal));

        settle(&mut game);
        for coords in BoardIter::whole(game.size()) {
            assert_eq!(
                game.base_styles()[coords.to_nd_index()],
                target_style(game.board(), game.tables(), coords),
                "{coords:?}"
            );
        }
        let number = game.base_styles()[(2, 1).to_nd_index()];
        assert!(number.draw_fg);
        assert_eq!(number.fg_type, crate::style::FgType::Number);
        assert_eq!(game.particles().alive_count(), 2);
    }

    #[test]
    fn flagging_animates_the_flag_in() {
        let mut game = game_with(&POCKET);
        game.update(&click((4, 4), MouseButtons::RIGHT));
        assert!(game.board().is_flagged((4, 4)));
        assert_eq!(game.flag_count(), 1);
        assert_eq!(head_tag(game.tile_queue((4, 4))), Some(AnimationTag::AddFlag));

        settle(&mut game);
        assert_eq!(game.base_styles()[(4, 4)].fg_flag_anim, 1.0);

        game.update(&click((4, 4), MouseButtons::RIGHT));
        assert!(!game.board().is_flagged((4, 4)));
        assert_eq!(game.particles().alive_count(), 1);
    }

    #[test]
    fn first_interaction_fires_once_per_board() {
        let mut game = game_with(&POCKET);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        game.on_first_interaction(move || counter.set(counter.get() + 1));

        game.update(&click((4, 4), MouseButtons::RIGHT));
        game.update(&click((4, 3), MouseButtons::RIGHT));
        assert_eq!(calls.get(), 1);

        game.reset_board();
        game.update(&click((0, 0), MouseButtons::RIGHT));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn reset_callbacks_wrap_the_swap() {
        let mut game = game_with(&POCKET);
        let order = Rc::new(Cell::new(0));
        let before = order.clone();
        game.on_before_board_reset(move || before.set(before.get() * 10 + 1));
        let after = order.clone();
        game.on_after_board_reset(move || after.set(after.get() * 10 + 2));

        game.reset_board();
        assert_eq!(order.get(), 12);
        assert_eq!(game.board().revealed_count(), 0);
    }

    #[test]
    fn no_input_zone_swallows_clicks() {
        let mut game = game_with(&POCKET);
        game.add_no_input_zone(Rect::from_wh(20.0, 20.0));
        game.update(&click((0, 0), MouseButtons::LEFT));
        assert_eq!(game.board().revealed_count(), 0);

        game.clear_no_input_zones();
        game.update(&click((0, 0), MouseButtons::LEFT));
        assert_eq!(game.board().revealed_count(), 6);
    }

    #[test]
    fn wrong_chord_loses_and_fast_forwards_to_the_button() {
        let mut game = game_with(&[".@.", "!*."]);
        let ended = Rc::new(Cell::new(None));
        let sink = ended.clone();
        game.on_game_end(move |won| sink.set(Some(won)));

        game.update(&click((1, 0), MouseButtons::MIDDLE));
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.losing_cell(), Some((1, 0)));
        assert_eq!(ended.get(), Some(false));
        // the wrong flag pops off and the mine flashes
        assert_eq!(game.particles().alive_count(), 1);
        assert_eq!(head_tag(game.tile_queue((1, 1))), Some(AnimationTag::Defeat));
        let sounds: Vec<_> = game.drain_sounds().into_iter().map(|s| s.name).collect();
        assert!(sounds.contains(&SoundName::Defeat));

        let elsewhere = InputFrame {
            cursor: pt(90.0, 90.0),
            pressed: MouseButtons::LEFT,
            just_pressed: MouseButtons::LEFT,
            ..InputFrame::default()
        };
        game.update(&elsewhere);
        assert_eq!(
            game.game_queue().iter().next().map(|anim| anim.tag()),
            Some(AnimationTag::RetryButtonReveal)
        );
        assert_eq!(game.base_styles()[(1, 1)].bg_bomb_anim, 1.0);
        assert!(!game.fx().view_locked);
        assert!(game.view().is_identity());
    }

    #[test]
    fn chord_win_ends_with_an_enabled_retry_button() {
        let mut game = game_with(&["+@", "@."]);
        let ended = Rc::new(Cell::new(None));
        let sink = ended.clone();
        game.on_game_end(move |won| sink.set(Some(won)));

        game.update(&click((1, 0), MouseButtons::MIDDLE));
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(ended.get(), Some(true));
        assert_eq!(game.game_queue().iter().next().map(|anim| anim.tag()), Some(AnimationTag::Win));
        let sounds: Vec<_> = game.drain_sounds().into_iter().map(|s| s.name).collect();
        assert!(sounds.contains(&SoundName::Victory));

        settle(&mut game);
        assert!(game.fx().draw_retry);
        assert!(!game.fx().retry_disabled);
        assert_eq!(game.fx().water_alpha, 1.0);
    }

    #[test]
    fn retry_cycle_rebuilds_the_board() {
        let mut game = game_with(&["+@", "@."]);
        game.update(&click((1, 0), MouseButtons::MIDDLE));
        settle(&mut game);
        let old_seed = game.seed();

        let press = InputFrame {
            cursor: game.retry_button_rect().center(),
            pressed: MouseButtons::LEFT,
            just_pressed: MouseButtons::LEFT,
            ..InputFrame::default()
        };
        game.update(&press);
        assert_eq!(
            game.game_queue().iter().next().map(|anim| anim.tag()),
            Some(AnimationTag::HideBoard)
        );

        settle(&mut game);
        assert_eq!(game.state(), GameState::Playing);
        assert_ne!(game.seed(), old_seed);
        assert_eq!(game.size(), (2, 2));
        assert_eq!(game.board().revealed_count(), 0);
        assert!(!game.fx().draw_retry);
        assert_eq!(*game.base_styles(), target_styles(game.board(), game.tables()));
    }

    #[test]
    fn idle_board_stops_drawing() {
        let mut game = game_with(&POCKET);
        assert!(game.should_draw());
        idle(&mut game, 60);
        assert!(!game.should_draw());

        game.update(&click((0, 0), MouseButtons::LEFT));
        assert!(game.should_draw());
    }

    #[test]
    fn wheel_zooms_around_the_cursor() {
        let mut game = game_with(&POCKET);
        let wheel = InputFrame {
            cursor: pt(25.0, 25.0),
            wheel: 2.0,
            ..InputFrame::default()
        };
        game.update(&wheel);
        assert!(game.view().zoom > 1.0);
        assert_eq!(game.transformed_board_rect().center(), pt(25.0, 25.0));
    }

    #[test]
    fn draw_paints_background_first() {
        let mut game = game_with(&POCKET);
        game.update(&click((4, 4), MouseButtons::RIGHT));
        game.update(&click((4, 4), MouseButtons::RIGHT));

        let mut surface = RecordingSurface::new(100, 100);
        game.draw(&mut surface);
        assert!(matches!(
            surface.calls.first(),
            Some(DrawCall::Fill {
                target: Target::Screen,
                ..
            })
        ));
        assert!(surface.triangle_count() > 0);
        assert_eq!(surface.shader_calls(), 0);
        // the ejected flag is the last batch
        assert!(matches!(
            surface.calls.last(),
            Some(DrawCall::Triangles { image: Some(id), .. }) if *id == game.assets.flags.image.id
        ));
    }

    #[test]
    fn dev_keys_need_dev_mode() {
        let mut game = game_with(&POCKET);
        let frame = InputFrame {
            keys: smallvec![DevKey::InstantWin],
            ..InputFrame::default()
        };
        game.update(&frame);
        assert_eq!(game.board().revealed_count(), 0);

        game.config.dev_mode = true;
        game.update(&frame);
        let safe = game.board().total_cells() - game.board().mine_count();
        assert_eq!(game.board().revealed_count(), safe - 1);
        assert_eq!(game.state(), GameState::Playing);
    }
}
