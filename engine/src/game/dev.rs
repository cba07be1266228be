//! Developer shortcuts, only reachable in dev mode.

use rand::prelude::*;
use tilesweeper_core::{Board, BoardIter, Coord, PlayBoard};

use super::Game;
use crate::input::DevKey;

/// `.` hidden, `@` revealed, `*` mine, `+` flagged mine.
const DECORATION: [&str; 5] = [
    "....@*@*@*",
    "......@.@*",
    "***+****..",
    "*@+@*@*...",
    "++**.*....",
];

/// Chance in percent for the random fill around the fixed pattern.
const DECORATION_FILL: u32 = 30;

impl Game {
    /// Applies one developer key. Returns whether the board was rewritten in
    /// a way the reveal and flag animations should pick up.
    pub(super) fn handle_dev_key(&mut self, key: DevKey) -> bool {
        log::info!("Dev key {:?}", key);
        match key {
            DevKey::Reset => {
                self.reset_board();
                false
            }
            DevKey::ResetSameSeed => {
                let seed = self.play.seed();
                self.reset_board_with_seed(seed);
                false
            }
            DevKey::InstantWin => {
                self.set_board_for_instant_win();
                true
            }
            DevKey::DecorationBoard => {
                self.set_board_for_decoration();
                true
            }
            // handled by the embedder
            DevKey::ResourceEditor | DevKey::ReloadAssets | DevKey::SaveAssets | DevKey::Screenshot => false,
        }
    }

    /// Reveals every safe cell but one, so the next step wins.
    pub fn set_board_for_instant_win(&mut self) {
        let (width, height) = self.play.size();
        self.play.place_mines((width - 1, height - 1));

        let board = self.play.board_mut();
        let mut to_reveal = BoardIter::whole(board.size())
            .filter(|&coords| !board.is_mine(coords) && !board.is_revealed(coords))
            .count();
        for coords in BoardIter::whole(board.size()) {
            if to_reveal <= 1 {
                break;
            }
            if !board.is_mine(coords) && !board.is_revealed(coords) {
                board.set_revealed(coords, true);
                to_reveal -= 1;
            }
        }
        board.clear_revealed_flags();
    }

    /// Loads a showcase board with every kind of tile on it.
    pub fn set_board_for_decoration(&mut self) {
        let (width, height) = self.play.size();
        let pattern_w = DECORATION[0].len() as Coord;
        let pattern_h = DECORATION.len() as Coord;
        let size = (width.max(pattern_w), height.max(pattern_h));

        let mut board = Board::new(size);
        for (y, row) in DECORATION.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let coords = (x as Coord, y as Coord);
                match ch {
                    '@' => board.set_revealed(coords, true),
                    '*' => board.set_mine(coords, true),
                    '+' => {
                        board.set_mine(coords, true);
                        board.set_flag(coords, true);
                    }
                    _ => {}
                }
            }
        }

        for coords in BoardIter::whole(size) {
            let inside = coords.0 < pattern_w + 1 && coords.1 < pattern_h + 1;
            if !inside && !board.is_mine(coords) && self.rng.random_range(0..100) < DECORATION_FILL {
                board.set_mine(coords, true);
            }
        }
        for coords in BoardIter::whole(size) {
            if board.is_mine(coords) || self.rng.random_range(0..100) >= DECORATION_FILL {
                continue;
            }
            for around in BoardIter::around(coords) {
                if board.contains(around) && board.is_mine(around) {
                    board.set_flag(around, true);
                }
            }
            board.spread_safe_area(coords);
        }

        let seed = self.play.seed();
        match PlayBoard::with_mines(board, seed) {
            Ok(play) => {
                self.load_board(play);
                let (width, height) = self.play.size();
                self.enqueue_show(((width - 1) / 2, (height - 1) / 2));
            }
            Err(err) => log::warn!("Decoration board rejected: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::game_with;
    use tilesweeper_core::GameState;

    #[test]
    fn instant_win_leaves_one_safe_cell() {
        let mut game = game_with(&["..*", "!..", "..."]);
        game.set_board_for_instant_win();

        let board = game.board();
        assert_eq!(board.revealed_count(), 7);
        let hidden_safe: Vec<_> = BoardIter::whole(board.size())
            .filter(|&c| !board.is_mine(c) && !board.is_revealed(c))
            .collect();
        assert_eq!(hidden_safe.len(), 1);
        assert!(!board.is_flagged((0, 1)));
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn decoration_keeps_the_fixed_pattern() {
        let mut game = game_with(&["..", ".*"]);
        game.set_board_for_decoration();

        let board = game.board();
        assert_eq!(board.size(), (10, 5));
        assert!(board.is_revealed((4, 0)));
        assert!(board.is_mine((5, 0)));
        assert!(board.is_mine((3, 2)) && board.is_flagged((3, 2)));
        assert!(board.is_mine((0, 4)) && board.is_flagged((0, 4)));
        assert!(game.is_animating());
    }

    #[test]
    fn reset_same_seed_keeps_the_seed() {
        let mut game = game_with(&["..", ".*"]);
        let seed = game.seed();
        assert!(!game.handle_dev_key(DevKey::ResetSameSeed));
        assert_eq!(game.seed(), seed);
        assert!(!game.handle_dev_key(DevKey::Screenshot));
    }
}
