use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use glam::IVec4;

/// Rows are padded so that pixel rows start on 4-pixel boundaries.
#[inline]
pub fn align_up(x: i32, multiple: i32) -> i32 {
    (x + multiple - 1) / multiple * multiple
}

/// Describes the region of the image a buffer covers: the effective
/// (possibly cropped and resolution-divided) size plus where it sits
/// inside the full frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferParams {
    pub width: i32,
    pub height: i32,
    pub full_x: i32,
    pub full_y: i32,
    pub full_width: i32,
    pub full_height: i32,
    pub denoising_passes: bool,
    pub selective_denoising: bool,
    pub frames: i32,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            full_x: 0,
            full_y: 0,
            full_width: 0,
            full_height: 0,
            denoising_passes: false,
            selective_denoising: false,
            frames: 1,
        }
    }
}

impl BufferParams {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            full_width: width,
            full_height: height,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// The same region at a preview resolution divider.
    pub fn scaled(&self, divider: i32) -> Self {
        debug_assert!(divider >= 1);
        debug_assert!(self.width <= self.full_width && self.height <= self.full_height);
        debug_assert!(self.full_x >= 0 && self.full_y >= 0);
        Self {
            width: (self.width / divider).max(1),
            height: (self.height / divider).max(1),
            full_x: self.full_x / divider,
            full_y: self.full_y / divider,
            full_width: (self.full_width / divider).max(1),
            full_height: (self.full_height / divider).max(1),
            ..*self
        }
    }
}

/// Offset of a pixel's first float inside a sample buffer covering `rect`.
/// Layout is interleaved: `pass_stride` floats per pixel, rows aligned up
/// to 4 pixels.
#[inline]
pub fn pixel_offset(rect: IVec4, px: i32, py: i32, pass_stride: usize) -> usize {
    let buffer_w = align_up(rect.z - rect.x, 4);
    ((py - rect.y) as usize * buffer_w as usize + (px - rect.x) as usize) * pass_stride
}

/// Number of floats needed for a sample buffer covering `rect`.
pub fn buffer_len(rect: IVec4, pass_stride: usize) -> usize {
    let buffer_w = align_up(rect.z - rect.x, 4);
    buffer_w as usize * (rect.w - rect.y) as usize * pass_stride
}

/// Accumulated sample storage for one tile (or, in denoise-only runs, the
/// whole frame). The render worker that owns the tile writes through
/// `samples_mut`; denoise workers read neighbor tiles through `samples`.
/// The tile manager is the sole releaser of the owning handle.
pub struct TileBuffers {
    pub params: BufferParams,
    pub pass_stride: usize,
    samples: RwLock<Vec<f32>>,
}

impl TileBuffers {
    pub fn new(params: BufferParams, pass_stride: usize) -> Self {
        let rect = IVec4::new(0, 0, params.width, params.height);
        let samples = RwLock::new(vec![0.0; buffer_len(rect, pass_stride)]);
        Self {
            params,
            pass_stride,
            samples,
        }
    }

    pub fn samples(&self) -> RwLockReadGuard<'_, Vec<f32>> {
        self.samples.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn samples_mut(&self) -> RwLockWriteGuard<'_, Vec<f32>> {
        self.samples.write().unwrap_or_else(|e| e.into_inner())
    }
}
