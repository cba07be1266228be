use thiserror::Error;

/// Failures while loading the asset bundle. Only mandatory assets produce these.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Missing mandatory asset {0:?}")]
    Missing(&'static str),
    #[error("Sprite metadata for {name:?} is invalid: {reason}")]
    InvalidSprite { name: &'static str, reason: String },
    #[error("Malformed JSON in {name:?}")]
    Json {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed configuration")]
    Json(#[from] serde_json::Error),
    #[error("Board must be between 1x1 and 255x255, got {0}x{1}")]
    InvalidBoardSize(i32, i32),
    #[error("Tick rate must be positive, got {0}")]
    InvalidTickRate(f64),
    #[error(transparent)]
    Seed(#[from] tilesweeper_core::GameError),
    #[error(transparent)]
    Args(#[from] clap::Error),
}

pub type AssetResult<T> = std::result::Result<T, AssetError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
