//! Headless driver: plays one scripted round of tilesweeper against a
//! recording surface and prints what the engine did.

use std::error::Error;

use clap::Parser;
use tilesweeper_core::{BoardIter, Coord2, GameState};
use tilesweeper_engine::assets::{Assets, MemoryAssets};
use tilesweeper_engine::geom::Point;
use tilesweeper_engine::input::{InputFrame, MouseButtons};
use tilesweeper_engine::render::RecordingSurface;
use tilesweeper_engine::tables::Tables;
use tilesweeper_engine::timer::ProfTimer;
use tilesweeper_engine::view::tile_rect;
use tilesweeper_engine::{EngineConfig, Game, LaunchArgs};

/// Gives up if a round takes longer than this many ticks.
const MAX_TICKS: usize = 20_000;

#[derive(Debug, Default)]
struct Stats {
    ticks: usize,
    frames_drawn: usize,
    triangle_batches: usize,
    moves: usize,
    sounds: usize,
}

/// Next move of a player that can see the mines: flag a hidden mine, or step
/// on a hidden safe cell.
fn next_move(game: &Game) -> Option<(Coord2, MouseButtons)> {
    let board = game.board();
    let first_step = board.revealed_count() == 0;
    if first_step {
        let (width, height) = board.size();
        return Some(((width / 2, height / 2), MouseButtons::LEFT));
    }
    BoardIter::whole(board.size())
        .find(|&coords| !board.is_revealed(coords) && !(board.is_mine(coords) && board.is_flagged(coords)))
        .map(|coords| {
            let button = if board.is_mine(coords) {
                MouseButtons::RIGHT
            } else {
                MouseButtons::LEFT
            };
            (coords, button)
        })
}

fn press_at(cursor: Point, button: MouseButtons) -> InputFrame {
    InputFrame {
        cursor,
        pressed: button,
        just_pressed: button,
        ..InputFrame::default()
    }
}

fn release_at(cursor: Point, button: MouseButtons) -> InputFrame {
    InputFrame {
        cursor,
        just_released: button,
        ..InputFrame::default()
    }
}

fn tick(game: &mut Game, surface: &mut RecordingSurface, stats: &mut Stats, frame: &InputFrame) {
    game.update(frame);
    stats.ticks += 1;
    stats.sounds += game.drain_sounds().len();
    if game.should_draw() {
        surface.clear_calls();
        game.draw(surface);
        stats.frames_drawn += 1;
        stats.triangle_batches += surface.triangle_count();
    }
}

fn idle_until(
    game: &mut Game,
    surface: &mut RecordingSurface,
    stats: &mut Stats,
    done: impl Fn(&Game) -> bool,
) -> bool {
    let idle = InputFrame::default();
    while stats.ticks < MAX_TICKS {
        if done(game) {
            return true;
        }
        tick(game, surface, stats, &idle);
    }
    false
}

fn play_round(game: &mut Game, surface: &mut RecordingSurface, stats: &mut Stats) -> GameState {
    while game.state() == GameState::Playing && stats.ticks < MAX_TICKS {
        let Some((coords, button)) = next_move(game) else {
            break;
        };
        let cursor = tile_rect(game.transformed_board_rect(), game.size(), coords).center();
        log::debug!("Move {} at {:?} with {:?}", stats.moves, coords, button);
        tick(game, surface, stats, &press_at(cursor, button));
        tick(game, surface, stats, &release_at(cursor, button));
        stats.moves += 1;
    }
    game.state()
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = LaunchArgs::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = args.apply(EngineConfig::default())?;
    log::debug!("Config: {}", config.to_json()?);

    let source = MemoryAssets::builtin();
    let assets = Assets::load(&source)?;
    let tables = Tables::load(&source);
    let mut game = Game::new(config.clone(), assets, tables)?;
    let mut surface = RecordingSurface::new(config.screen_width as u32, config.screen_height as u32);
    let mut stats = Stats::default();

    let prof = ProfTimer::new("round");
    let seed = game.seed();
    let outcome = play_round(&mut game, &mut surface, &mut stats);
    log::info!("Round ended {:?} after {} moves", outcome, stats.moves);

    // let the end sequence run, then press retry
    let retry_ready = idle_until(&mut game, &mut surface, &mut stats, |game| {
        !game.fx().retry_disabled && !game.is_animating()
    });
    if retry_ready {
        let cursor = game.retry_button_rect().center();
        tick(&mut game, &mut surface, &mut stats, &press_at(cursor, MouseButtons::LEFT));
        tick(&mut game, &mut surface, &mut stats, &release_at(cursor, MouseButtons::LEFT));
        idle_until(&mut game, &mut surface, &mut stats, |game| {
            game.state() == GameState::Playing && !game.is_animating()
        });
    } else {
        log::warn!("Retry button never became available");
    }
    prof.report();

    let prof = ProfTimer::new("draw");
    surface.clear_calls();
    game.draw(&mut surface);
    prof.report();
    log::debug!("Final frame: {} triangle batches", surface.triangle_count());

    let summary = serde_json::json!({
        "seed": seed.to_string(),
        "size": game.size(),
        "mines": game.mine_count(),
        "outcome": format!("{outcome:?}"),
        "moves": stats.moves,
        "ticks": stats.ticks,
        "frames_drawn": stats.frames_drawn,
        "triangle_batches": stats.triangle_batches,
        "sounds": stats.sounds,
        "next_seed": game.seed().to_string(),
        "restarted": retry_ready && game.state() == GameState::Playing,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
