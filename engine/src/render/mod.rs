//! Drawing: the backend seam, vertex batching and the board passes.

pub use recording::*;
pub use surface::*;
pub use tiles::*;

pub mod batch;
pub mod shapes;
pub mod water;

mod recording;
mod surface;
mod tiles;
