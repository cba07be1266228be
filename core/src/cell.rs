use serde::{Deserialize, Serialize};

/// Player-visible state of one cell, as the input layer and tutorial see it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
}

impl CellView {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    /// A revealed cell showing a digit.
    pub const fn number(self) -> Option<u8> {
        match self {
            Self::Revealed(count) if count > 0 => Some(count),
            _ => None,
        }
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}
