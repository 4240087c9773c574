//! Tile scheduling and denoise feature transforms for an offline path
//! tracer.
//!
//! The [`TileManager`] partitions an image into a grid of tiles, hands them
//! out to render devices and walks each tile through the render → denoise
//! lifecycle, honoring the 3x3 neighborhood dependencies between the two
//! phases. [`denoise::construct_transform`] builds the per-pixel reduced
//! feature basis the denoising filter projects against.

pub mod buffers;
pub mod denoise;
pub mod error;
pub mod math;
pub mod tile;

pub use buffers::{BufferParams, TileBuffers};
pub use error::{TileError, TileResult};
pub use tile::{
    Tile, TileCompletion, TileConfig, TileManager, TileOrder, TileState, UNLIMITED_SAMPLES,
    UNLIMITED_START_RESOLUTION,
};
