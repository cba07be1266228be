//! Board presentation for tilesweeper: input interpretation, tile animation,
//! style modifiers and drawing through a backend-neutral [`render::Surface`].

pub use config::{EngineConfig, LaunchArgs};
pub use error::*;
pub use game::Game;

pub mod anim;
pub mod assets;
pub mod button;
pub mod color;
pub mod config;
pub mod ease;
pub mod game;
pub mod geom;
pub mod input;
pub mod modifier;
pub mod particle;
pub mod redraw;
pub mod render;
pub mod retry;
pub mod sound;
pub mod sprite;
pub mod style;
pub mod tables;
pub mod timer;
pub mod tutorial;
pub mod view;

mod error;
