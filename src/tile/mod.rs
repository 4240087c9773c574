mod hilbert;
mod manager;

use std::sync::Arc;

use crate::buffers::TileBuffers;

pub use manager::{TileConfig, TileManager, UNLIMITED_SAMPLES, UNLIMITED_START_RESOLUTION};

/// Lifecycle of a tile. States only ever advance:
/// Render < Rendered < Denoise < Denoised < Done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TileState {
    /// The tile has to be rendered.
    #[default]
    Render,
    /// Rendered, but can't be denoised yet (waiting for neighbors).
    Rendered,
    /// The tile can be denoised now.
    Denoise,
    /// Denoised, but its buffers can't be freed yet (waiting for neighbors).
    Denoised,
    /// Finished; no queue references it anymore.
    Done,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileOrder {
    #[default]
    Center,
    RightToLeft,
    LeftToRight,
    TopToBottom,
    BottomToTop,
    HilbertSpiral,
}

/// One rectangular unit of work. The pixel rectangle is in the effective
/// image at the current resolution divider; `index` addresses the dense
/// tile grid inside the manager.
#[derive(Clone, Default)]
pub struct Tile {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub device: usize,
    pub state: TileState,
    pub buffers: Option<Arc<TileBuffers>>,
}

impl Tile {
    #[allow(clippy::too_many_arguments)]
    fn new(
        index: usize,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        device: usize,
        state: TileState,
        buffers: Option<Arc<TileBuffers>>,
    ) -> Self {
        Self {
            index,
            x,
            y,
            w,
            h,
            device,
            state,
            buffers,
        }
    }
}

/// What the caller must do after returning a tile: write out its pixels,
/// and release its buffers now rather than waiting for a neighbor to do it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileCompletion {
    pub should_write: bool,
    pub may_delete: bool,
}
