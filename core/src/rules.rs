use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    Step,
    Flag,
    Check,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Playing
    }
}

/// A board plus the rules that drive it. Mines are placed lazily on the first
/// `Step`, seeded by [`Seed`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayBoard {
    board: Board,
    state: GameState,
    mine_count: CellCount,
    seed: Seed,
    mines_placed: bool,
    losing_cell: Option<Coord2>,
}

impl PlayBoard {
    pub fn new(config: GameConfig, seed: Seed) -> Self {
        Self {
            board: Board::new(config.size),
            state: GameState::Playing,
            mine_count: config.mines,
            seed,
            mines_placed: false,
            losing_cell: None,
        }
    }

    /// Wraps a board whose mines are already decided.
    pub fn with_mines(board: Board, seed: Seed) -> Result<Self> {
        if board.mine_count() >= board.total_cells() {
            return Err(GameError::TooManyMines);
        }
        let mine_count = board.mine_count();
        let mut play_board = Self {
            board,
            state: GameState::Playing,
            mine_count,
            seed,
            mines_placed: true,
            losing_cell: None,
        };
        if play_board.board.is_cleared() && play_board.board.revealed_count() > 0 {
            play_board.state = GameState::Won;
        }
        Ok(play_board)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct access for developer tooling. Callers own the invariants.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// The cell whose reveal lost the game.
    pub fn losing_cell(&self) -> Option<Coord2> {
        self.losing_cell
    }

    /// Places mines as if the first step happened at `first`. No-op once mines exist.
    pub fn place_mines(&mut self, first: Coord2) {
        if self.mines_placed {
            return;
        }
        let mask = MinePlacer::new(self.seed, first, StartTile::AlwaysZero)
            .place(self.board.size(), self.mine_count);
        self.board.set_mine_mask(mask);
        self.mine_count = self.board.mine_count();
        self.mines_placed = true;
        log::debug!("placed {} mines, first step at {:?}", self.mine_count, first);
    }

    /// Applies one interaction and returns the resulting state. Interactions
    /// outside the board or after the game ended leave everything unchanged.
    pub fn interact(&mut self, coords: Coord2, interaction: Interaction) -> GameState {
        use Interaction::*;

        if self.state.is_finished() || !self.board.contains(coords) {
            return self.state;
        }

        let lost = match interaction {
            Step => self.step(coords),
            Flag => {
                self.flag(coords);
                false
            }
            Check => self.check(coords),
        };

        self.board.clear_revealed_flags();

        self.state = if lost {
            self.losing_cell = Some(coords);
            GameState::Lost
        } else if self.board.is_cleared() {
            GameState::Won
        } else {
            GameState::Playing
        };
        self.state
    }

    /// Like [`PlayBoard::interact`], but reports why an interaction was ignored.
    pub fn try_interact(&mut self, coords: Coord2, interaction: Interaction) -> Result<GameState> {
        if self.state.is_finished() {
            return Err(GameError::AlreadyEnded);
        }
        if !self.board.contains(coords) {
            return Err(GameError::InvalidCoords);
        }
        Ok(self.interact(coords, interaction))
    }

    /// Forces the state, for the end of developer shortcuts and board rebuilds.
    pub fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    fn step(&mut self, coords: Coord2) -> bool {
        self.place_mines(coords);

        if self.board.is_flagged(coords) {
            return false;
        }
        if self.board.is_mine(coords) {
            return true;
        }
        self.board.spread_safe_area(coords);
        false
    }

    fn flag(&mut self, coords: Coord2) {
        if !self.board.is_revealed(coords) {
            let flagged = self.board.is_flagged(coords);
            self.board.set_flag(coords, !flagged);
        }
    }

    fn check(&mut self, coords: Coord2) -> bool {
        if !self.board.is_revealed(coords) {
            return false;
        }
        let mine_count = self.board.neighbor_mine_count(coords);
        if mine_count == 0 || mine_count != self.board.neighbor_flag_count(coords) {
            return false;
        }

        let wrong_flag = self
            .board
            .iter_neighbors(coords)
            .any(|pos| self.board.is_flagged(pos) && !self.board.is_mine(pos));
        if wrong_flag {
            return true;
        }

        for pos in self.board.iter_neighbors(coords) {
            if !self.board.is_flagged(pos) {
                self.board.spread_safe_area(pos);
            }
        }
        false
    }
}
