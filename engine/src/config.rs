use clap::Parser;
use serde::{Deserialize, Serialize};
use tilesweeper_core::{Coord, GameConfig, Seed};

use crate::error::{ConfigError, ConfigResult};

/// Knobs the embedder hands to [`crate::Game::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_width: Coord,
    pub board_height: Coord,
    pub mines: u32,
    /// Ticks per second of the fixed update loop.
    pub tps: f64,
    /// Ideal retry button side in pixels.
    pub retry_button_size: f64,
    pub always_draw: bool,
    /// Enables developer hotkeys.
    pub dev_mode: bool,
    /// Fixed first seed as 64 hex digits. Random when absent.
    pub seed: Option<String>,
    /// Seeds presentation randomness (particles, retry tiles, new seeds).
    pub rng_seed: u64,
    pub screen_width: f64,
    pub screen_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: 10,
            board_height: 12,
            mines: 20,
            tps: 120.0,
            retry_button_size: 120.0,
            always_draw: false,
            dev_mode: cfg!(debug_assertions),
            seed: None,
            rng_seed: 0,
            screen_width: 600.0,
            screen_height: 800.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let valid = 1..=u8::MAX as Coord;
        if !valid.contains(&self.board_width) || !valid.contains(&self.board_height) {
            return Err(ConfigError::InvalidBoardSize(
                self.board_width,
                self.board_height,
            ));
        }
        if !(self.tps.is_finite() && self.tps > 0.0) {
            return Err(ConfigError::InvalidTickRate(self.tps));
        }
        self.fixed_seed()?;
        Ok(())
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new((self.board_width, self.board_height), self.mines)
    }

    pub fn fixed_seed(&self) -> ConfigResult<Option<Seed>> {
        self.seed
            .as_deref()
            .map(Seed::from_hex)
            .transpose()
            .map_err(ConfigError::from)
    }
}

/// Launch arguments, either from a command line or from a `#key=value&...`
/// fragment split by the embedder.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct LaunchArgs {
    /// What log level to use
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<String>,

    /// Board width in tiles
    #[arg(long)]
    pub width: Option<Coord>,

    /// Board height in tiles
    #[arg(long)]
    pub height: Option<Coord>,

    /// Number of mines
    #[arg(short, long)]
    pub mines: Option<u32>,

    /// Ticks per second
    #[arg(long)]
    pub tps: Option<f64>,

    /// Draw every frame
    #[arg(long)]
    pub always_draw: bool,

    /// Enable developer hotkeys
    #[arg(long)]
    pub dev: bool,
}

impl LaunchArgs {
    /// Parses a URL style fragment such as `#seed=ab..&width=8`.
    pub fn from_fragment(fragment: &str) -> ConfigResult<Self> {
        let args = fragment
            .split(['#', '&'])
            .enumerate()
            .filter(|(i, part)| *i == 0 || !part.is_empty())
            .map(|(i, part)| {
                if i == 0 || part.starts_with('-') {
                    part.to_string()
                } else {
                    format!("--{part}")
                }
            });
        Ok(Self::try_parse_from(args)?)
    }

    /// Overlays the given options on `config` and validates the result.
    pub fn apply(&self, mut config: EngineConfig) -> ConfigResult<EngineConfig> {
        if let Some(seed) = &self.seed {
            config.seed = Some(seed.clone());
        }
        if let Some(width) = self.width {
            config.board_width = width;
        }
        if let Some(height) = self.height {
            config.board_height = height;
        }
        if let Some(mines) = self.mines {
            config.mines = mines;
        }
        if let Some(tps) = self.tps {
            config.tps = tps;
        }
        config.always_draw |= self.always_draw;
        config.dev_mode |= self.dev;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game_config().size, (10, 12));
        assert_eq!(config.game_config().mines, 20);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"board_width": 8, "mines": 5}"#).unwrap();
        assert_eq!(config.board_width, 8);
        assert_eq!(config.board_height, 12);
        assert_eq!(config.mines, 5);
        assert_eq!(config.tps, 120.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"board_width": 0}"#),
            Err(ConfigError::InvalidBoardSize(0, 12))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"tps": -1.0}"#),
            Err(ConfigError::InvalidTickRate(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"seed": "xyz"}"#),
            Err(ConfigError::Seed(_))
        ));
        assert!(matches!(
            EngineConfig::from_json("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn args_overlay_config() {
        let args =
            LaunchArgs::try_parse_from(["tilesweeper", "--width", "6", "-m", "3", "--dev"]).unwrap();
        let config = args.apply(EngineConfig::default()).unwrap();
        assert_eq!(config.board_width, 6);
        assert_eq!(config.mines, 3);
        assert!(config.dev_mode);
    }

    #[test]
    fn fragment_is_parsed_like_arguments() {
        let seed = Seed::from_u64(9).to_string();
        let args = LaunchArgs::from_fragment(&format!("#seed={seed}&height=7&always-draw")).unwrap();
        assert_eq!(args.height, Some(7));
        assert!(args.always_draw);
        let config = args.apply(EngineConfig::default()).unwrap();
        assert_eq!(config.fixed_seed().unwrap(), Some(Seed::from_u64(9)));
    }
}
