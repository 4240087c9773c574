use std::cmp::Reverse;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use glam::{IVec2, Vec2};
use log::debug;

use crate::buffers::{BufferParams, TileBuffers};
use crate::error::{TileError, TileResult};
use crate::tile::hilbert::{hilbert_index_to_pos, SpiralDirection};
use crate::tile::{Tile, TileCompletion, TileOrder, TileState};

/// Sentinel disabling progress accounting.
pub const UNLIMITED_SAMPLES: i32 = i32::MAX;
/// Sentinel disabling progressive resolution staging.
pub const UNLIMITED_START_RESOLUTION: i32 = i32::MAX;

pub struct TileConfig {
    pub progressive: bool,
    pub num_samples: i32,
    pub tile_size: IVec2,
    pub start_resolution: i32,
    /// When set, every physical device keeps its own queue and gets back the
    /// tiles generated for it. Otherwise one shared queue serves them all.
    pub preserve_tile_device: bool,
    /// Background/batch renders pool tiles over all devices; viewport
    /// renders slice the image horizontally, one slice per device.
    pub background: bool,
    pub tile_order: TileOrder,
    pub num_devices: usize,
    /// Generate tiles for denoising only, not for rendering.
    pub only_denoise: bool,
    /// Schedule tiles for denoising as their neighborhoods finish rendering.
    pub schedule_denoising: bool,
    pub range_start_sample: i32,
    /// -1 renders the full sample count instead of a sub-range.
    pub range_num_samples: i32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            progressive: false,
            num_samples: 1,
            tile_size: IVec2::new(64, 64),
            start_resolution: UNLIMITED_START_RESOLUTION,
            preserve_tile_device: false,
            background: true,
            tile_order: TileOrder::Center,
            num_devices: 1,
            only_denoise: false,
            schedule_denoising: false,
            range_start_sample: 0,
            range_num_samples: -1,
        }
    }
}

#[derive(Default)]
struct TileManagerState {
    tiles: Vec<Tile>,
    tile_stride: usize,
    buffer: BufferParams,
    global_buffers: Option<Weak<TileBuffers>>,
    sample: i32,
    /// Samples rendered in the current phase, not the configured total.
    num_samples: i32,
    resolution_divider: i32,
    num_tiles: usize,
    num_rendered_tiles: usize,
    /// Total samples over all pixels. Generally `num_samples * num_pixels`,
    /// but higher with progressive staging or scheduled denoising.
    total_pixel_samples: u64,
    render_tiles: Vec<VecDeque<usize>>,
    denoise_tiles: Vec<VecDeque<usize>>,
}

/// Hands out tiles to devices and drives each tile through its lifecycle,
/// honoring the 3x3 neighborhood dependencies between the render and
/// denoise phases. All entry points must be serialized by the caller.
pub struct TileManager {
    params: BufferParams,
    progressive: bool,
    num_samples: i32,
    tile_size: IVec2,
    start_resolution: i32,
    preserve_tile_device: bool,
    background: bool,
    tile_order: TileOrder,
    num_devices: usize,
    only_denoise: bool,
    schedule_denoising: bool,
    range_start_sample: i32,
    range_num_samples: i32,
    state: TileManagerState,
}

impl TileManager {
    pub fn new(config: TileConfig) -> TileResult<Self> {
        if config.num_devices == 0 {
            return Err(TileError::InvalidConfiguration(
                "at least one device is required".into(),
            ));
        }
        if config.tile_size.x <= 0 || config.tile_size.y <= 0 {
            return Err(TileError::InvalidConfiguration(format!(
                "tile size {}x{} must be positive",
                config.tile_size.x, config.tile_size.y
            )));
        }
        if config.tile_order == TileOrder::HilbertSpiral && !config.background {
            return Err(TileError::InvalidConfiguration(
                "hilbert spiral order requires pooled tile distribution".into(),
            ));
        }
        if config.schedule_denoising && !config.background {
            return Err(TileError::InvalidConfiguration(
                "scheduled denoising requires pooled tile distribution".into(),
            ));
        }

        let mut manager = Self {
            params: BufferParams::default(),
            progressive: config.progressive,
            num_samples: config.num_samples,
            tile_size: config.tile_size,
            start_resolution: config.start_resolution,
            preserve_tile_device: config.preserve_tile_device,
            background: config.background,
            tile_order: config.tile_order,
            num_devices: config.num_devices,
            only_denoise: config.only_denoise,
            schedule_denoising: config.schedule_denoising,
            range_start_sample: config.range_start_sample,
            range_num_samples: config.range_num_samples,
            state: TileManagerState::default(),
        };
        manager.reset(BufferParams::default(), 0);
        Ok(manager)
    }

    /// Start over for a new image region.
    pub fn reset(&mut self, params: BufferParams, num_samples: i32) {
        self.params = params;
        self.set_samples(num_samples);

        self.state.buffer = BufferParams::default();
        self.state.global_buffers = None;
        self.state.sample = self.range_start_sample - 1;
        self.state.num_tiles = 0;
        self.state.num_rendered_tiles = 0;
        self.state.num_samples = 0;
        self.state.resolution_divider =
            get_divider(params.width, params.height, self.start_resolution);
        self.state.render_tiles.clear();
        self.state.denoise_tiles.clear();
        self.state.tiles.clear();

        debug!(
            "tile manager reset: {}x{} effective pixels, starting at 1/{} resolution",
            params.width, params.height, self.state.resolution_divider
        );
    }

    pub fn set_samples(&mut self, num_samples: i32) {
        self.num_samples = num_samples;

        // No real progress indication is possible with unlimited samples.
        self.state.total_pixel_samples = if num_samples == UNLIMITED_SAMPLES {
            0
        } else if self.only_denoise {
            self.params.width as u64 * self.params.height as u64
        } else {
            let mut pixel_samples: u64 = 0;
            // Preview phases render at successively halved dividers before
            // the full-resolution sampling starts, so they add extra work.
            let mut divider =
                get_divider(self.params.width, self.params.height, self.start_resolution) / 2;
            while divider > 1 {
                let image_w = (self.params.width / divider).max(1) as u64;
                let image_h = (self.params.height / divider).max(1) as u64;
                pixel_samples += image_w * image_h;
                divider >>= 1;
            }

            let pixels = self.params.width as u64 * self.params.height as u64;
            let mut total = pixel_samples + self.num_effective_samples() as u64 * pixels;
            if self.schedule_denoising {
                total += pixels;
            }
            total
        };
    }

    /// Number of samples actually rendered, honoring a configured sub-range.
    pub fn num_effective_samples(&self) -> i32 {
        if self.only_denoise {
            1
        } else if self.range_num_samples == -1 {
            self.num_samples
        } else {
            self.range_num_samples
        }
    }

    pub fn set_tile_order(&mut self, tile_order: TileOrder) -> TileResult<()> {
        if tile_order == TileOrder::HilbertSpiral && !self.background {
            return Err(TileError::InvalidConfiguration(
                "hilbert spiral order requires pooled tile distribution".into(),
            ));
        }
        self.tile_order = tile_order;
        Ok(())
    }

    pub fn done(&self) -> bool {
        let end_sample = if self.range_num_samples == -1 {
            self.num_samples
        } else {
            self.range_start_sample + self.range_num_samples
        };
        self.state.resolution_divider == 1
            && self.state.sample.saturating_add(self.state.num_samples) >= end_sample
    }

    /// Advance to the next phase, regenerating the tile set. Returns false
    /// once all phases have been handed out.
    pub fn next(&mut self) -> bool {
        if self.done() {
            return false;
        }

        if self.progressive && self.state.resolution_divider > 1 {
            self.state.sample = 0;
            self.state.resolution_divider /= 2;
            self.state.num_samples = 1;
            self.set_tiles();
        } else {
            self.state.sample += 1;

            self.state.num_samples = if self.progressive {
                1
            } else if self.range_num_samples == -1 {
                self.num_samples
            } else {
                self.range_num_samples
            };

            self.state.resolution_divider = 1;
            self.set_tiles();
        }

        true
    }

    /// Dequeue the next tile for a device, preferring denoise work since
    /// finishing it releases buffers sooner.
    pub fn next_tile(&mut self, device: usize) -> Option<Tile> {
        let logical_device = if self.preserve_tile_device { device } else { 0 };

        if logical_device >= self.state.render_tiles.len() {
            return None;
        }

        if let Some(idx) = self.state.denoise_tiles[logical_device].pop_front() {
            if self.only_denoise {
                self.state.num_rendered_tiles += 1;
            }
            return Some(self.state.tiles[idx].clone());
        }

        let idx = self.state.render_tiles[logical_device].pop_front()?;
        self.state.num_rendered_tiles += 1;
        Some(self.state.tiles[idx].clone())
    }

    /// Report a tile as finished with its current phase and advance the
    /// state machine. Eligible neighbors move on when the returned tile
    /// completes their 3x3 neighborhood; the scan runs row-major with the
    /// returned tile itself last.
    pub fn return_tile(&mut self, index: usize) -> TileResult<TileCompletion> {
        const DX: [i32; 9] = [-1, 0, 1, -1, 1, -1, 0, 1, 0];
        const DY: [i32; 9] = [-1, -1, -1, 0, 0, 1, 1, 1, 0];

        let res = self.state.resolution_divider;
        let image_w = (self.params.width / res).max(1);
        let image_h = (self.params.height / res).max(1);
        let tile_w = tile_count(image_w, self.tile_size.x);
        let tile_h = tile_count(image_h, self.tile_size.y);
        let stride = self.state.tile_stride as i32;

        let state = self.state.tiles[index].state;
        match state {
            TileState::Render if !self.only_denoise => {
                if !self.schedule_denoising {
                    self.state.tiles[index].state = TileState::Done;
                    self.state.tiles[index].buffers = None;
                    return Ok(TileCompletion {
                        should_write: true,
                        may_delete: true,
                    });
                }

                self.state.tiles[index].state = TileState::Rendered;

                // For each neighbor and the tile itself, check whether all
                // of its neighbors have been rendered. If so, it can be
                // denoised.
                let tx = self.state.tiles[index].x / self.tile_size.x;
                let ty = self.state.tiles[index].y / self.tile_size.y;
                for n in 0..9 {
                    let nx = tx + DX[n];
                    let ny = ty + DY[n];
                    if nx < 0 || ny < 0 || nx >= tile_w || ny >= tile_h {
                        continue;
                    }
                    let nindex = (ny * stride + nx) as usize;
                    if self.state.tiles[nindex].state != TileState::Rendered {
                        continue;
                    }
                    if self.neighborhood_reached(nx, ny, tile_w, tile_h, TileState::Rendered) {
                        self.state.tiles[nindex].state = TileState::Denoise;
                        let device = self.state.tiles[nindex].device;
                        self.state.denoise_tiles[device].push_back(nindex);
                    }
                }
                Ok(TileCompletion::default())
            }
            TileState::Denoise => {
                if self.only_denoise {
                    // The caller still owns the frame-wide buffers here.
                    self.state.tiles[index].state = TileState::Done;
                    return Ok(TileCompletion {
                        should_write: true,
                        may_delete: false,
                    });
                }

                self.state.tiles[index].state = TileState::Denoised;

                let mut may_delete = false;
                // For each neighbor and the tile itself, check whether all
                // of its neighbors have been denoised. If so, its buffers
                // can be released.
                let tx = self.state.tiles[index].x / self.tile_size.x;
                let ty = self.state.tiles[index].y / self.tile_size.y;
                for n in 0..9 {
                    let nx = tx + DX[n];
                    let ny = ty + DY[n];
                    if nx < 0 || ny < 0 || nx >= tile_w || ny >= tile_h {
                        continue;
                    }
                    let nindex = (ny * stride + nx) as usize;
                    if self.state.tiles[nindex].state != TileState::Denoised {
                        continue;
                    }
                    if self.neighborhood_reached(nx, ny, tile_w, tile_h, TileState::Denoised) {
                        self.state.tiles[nindex].state = TileState::Done;
                        self.state.tiles[nindex].buffers = None;
                        // The returned tile itself still has to be written
                        // before its buffers go away; the caller's handle
                        // keeps them alive until then.
                        if n == 8 {
                            may_delete = true;
                        }
                    }
                }
                Ok(TileCompletion {
                    should_write: true,
                    may_delete,
                })
            }
            state => Err(TileError::InvalidTransition { index, state }),
        }
    }

    /// Whether the tile at grid position (x, y) and all its in-grid
    /// neighbors have reached `target`.
    fn neighborhood_reached(
        &self,
        x: i32,
        y: i32,
        tile_w: i32,
        tile_h: i32,
        target: TileState,
    ) -> bool {
        const DX: [i32; 8] = [-1, 0, 1, -1, 1, -1, 0, 1];
        const DY: [i32; 8] = [-1, -1, -1, 0, 0, 1, 1, 1];

        let stride = self.state.tile_stride as i32;
        for n in 0..8 {
            let nx = x + DX[n];
            let ny = y + DY[n];
            if nx < 0 || ny < 0 || nx >= tile_w || ny >= tile_h {
                continue;
            }
            let nindex = (ny * stride + nx) as usize;
            if self.state.tiles[nindex].state < target {
                return false;
            }
        }
        true
    }

    /// Drop every tile's buffers before the device goes away.
    pub fn free_device(&mut self) {
        if self.schedule_denoising {
            for tile in &mut self.state.tiles {
                tile.buffers = None;
            }
        }
    }

    pub fn sample(&self) -> i32 {
        self.state.sample
    }

    pub fn samples_this_phase(&self) -> i32 {
        self.state.num_samples
    }

    pub fn resolution_divider(&self) -> i32 {
        self.state.resolution_divider
    }

    pub fn num_tiles(&self) -> usize {
        self.state.num_tiles
    }

    pub fn num_rendered_tiles(&self) -> usize {
        self.state.num_rendered_tiles
    }

    pub fn total_pixel_samples(&self) -> u64 {
        self.state.total_pixel_samples
    }

    /// Buffer parameters for the current resolution divider.
    pub fn current_buffer_params(&self) -> BufferParams {
        self.state.buffer
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.state.tiles.get(index)
    }

    /// Install per-tile sample storage, typically right after the tile was
    /// acquired. The manager releases it at the lifecycle points.
    pub fn set_tile_buffers(&mut self, index: usize, buffers: Option<Arc<TileBuffers>>) {
        if let Some(tile) = self.state.tiles.get_mut(index) {
            tile.buffers = buffers;
        }
    }

    /// Non-owning handle to a frame-wide accumulation buffer; newly
    /// generated tiles reference it until per-tile storage replaces it.
    pub fn set_global_buffers(&mut self, buffers: Weak<TileBuffers>) {
        self.state.global_buffers = Some(buffers);
    }

    fn set_tiles(&mut self) {
        let res = self.state.resolution_divider;
        self.state.num_tiles = self.gen_tiles(!self.background);
        self.state.buffer = self.params.scaled(res);

        debug!(
            "generated {} tiles at 1/{} resolution, sample {}",
            self.state.num_tiles, res, self.state.sample
        );
    }

    /// Splits the image into tiles and pools them over the devices in
    /// contiguous chunks, or slices the image horizontally with one slice
    /// per device.
    fn gen_tiles(&mut self, sliced: bool) -> usize {
        self.state.tiles.clear();
        self.state.render_tiles.clear();
        self.state.denoise_tiles.clear();

        if self.params.is_empty() {
            return 0;
        }

        let res = self.state.resolution_divider;
        let image_w = (self.params.width / res).max(1);
        let image_h = (self.params.height / res).max(1);
        let center = IVec2::new(image_w / 2, image_h / 2);

        let num_logical_devices = if self.preserve_tile_device {
            self.num_devices
        } else {
            1
        };
        let num = num_logical_devices.min(image_h as usize).max(1);
        let slice_num = if sliced { num } else { 1 };

        let tile_w = tile_count(image_w, self.tile_size.x);
        let tile_h = tile_count(image_h, self.tile_size.y);

        self.state.render_tiles.resize_with(num, VecDeque::new);
        self.state.denoise_tiles.resize_with(num, VecDeque::new);
        self.state.tile_stride = tile_w as usize;

        let initial_state = if self.only_denoise {
            TileState::Denoise
        } else {
            TileState::Render
        };
        let global = self
            .state
            .global_buffers
            .as_ref()
            .and_then(Weak::upgrade);

        if self.tile_order == TileOrder::HilbertSpiral {
            return self.gen_tiles_hilbert_spiral(
                image_w,
                image_h,
                tile_w,
                tile_h,
                num,
                initial_state,
                global,
            );
        }

        for slice in 0..slice_num as i32 {
            let slice_y = (image_h / slice_num as i32) * slice;
            let slice_h = if slice == slice_num as i32 - 1 {
                image_h - slice * (image_h / slice_num as i32)
            } else {
                image_h / slice_num as i32
            };

            let tile_slice_h = tile_count(slice_h, self.tile_size.y);
            let mut slice_indices = Vec::with_capacity((tile_slice_h * tile_w) as usize);

            for tile_y in 0..tile_slice_h {
                for tile_x in 0..tile_w {
                    let x = tile_x * self.tile_size.x;
                    let y = tile_y * self.tile_size.y;
                    let w = if tile_x == tile_w - 1 {
                        image_w - x
                    } else {
                        self.tile_size.x
                    };
                    let h = if tile_y == tile_slice_h - 1 {
                        slice_h - y
                    } else {
                        self.tile_size.y
                    };

                    let idx = self.state.tiles.len();
                    self.state.tiles.push(Tile::new(
                        idx,
                        x,
                        y + slice_y,
                        w,
                        h,
                        if sliced { slice as usize } else { 0 },
                        initial_state,
                        global.clone(),
                    ));
                    if sliced {
                        slice_indices.push(idx);
                    }
                }
            }

            if sliced {
                // Slices honor only the vertical sweep direction.
                if self.tile_order == TileOrder::TopToBottom {
                    sort_tile_indices(
                        &mut slice_indices,
                        self.tile_order,
                        center,
                        &self.state.tiles,
                    );
                }
                let queue = if self.only_denoise {
                    &mut self.state.denoise_tiles[slice as usize]
                } else {
                    &mut self.state.render_tiles[slice as usize]
                };
                queue.extend(slice_indices);
            }
        }

        if !sliced {
            let total = self.state.tiles.len();
            let tiles_per_device = (total + num - 1) / num;
            let mut start = 0;
            let mut device = 0;
            while start < total {
                let end = (start + tiles_per_device).min(total);
                let mut chunk: Vec<usize> = (start..end).collect();
                // Tiles are generated bottom-to-top already.
                if self.tile_order != TileOrder::BottomToTop {
                    sort_tile_indices(&mut chunk, self.tile_order, center, &self.state.tiles);
                }
                for &idx in &chunk {
                    self.state.tiles[idx].device = device;
                }
                let queue = if self.only_denoise {
                    &mut self.state.denoise_tiles[device]
                } else {
                    &mut self.state.render_tiles[device]
                };
                queue.extend(chunk);
                start = end;
                device += 1;
            }
        }

        self.state.tiles.len()
    }

    /// Square spiral over blocks of tiles, each block walked along a
    /// Hilbert curve rotated to match the current spiral leg. Tiles are
    /// front-inserted so the innermost blocks are dequeued first.
    #[allow(clippy::too_many_arguments)]
    fn gen_tiles_hilbert_spiral(
        &mut self,
        image_w: i32,
        image_h: i32,
        tile_w: i32,
        tile_h: i32,
        num: usize,
        initial_state: TileState,
        global: Option<Arc<TileBuffers>>,
    ) -> usize {
        // Block size in tiles, must be a power of two.
        let hilbert_size: i32 = if self.tile_size.max_element() <= 12 { 8 } else { 4 };

        let total = (tile_w * tile_h) as usize;
        let tiles_per_device = (total + num - 1) / num;
        let mut cur_device = 0usize;
        let mut cur_tiles = 0usize;

        let block_size = self.tile_size * hilbert_size;
        let blocks_x = tile_count(image_w, block_size.x);
        let blocks_y = tile_count(image_h, block_size.y);
        // Side length of the spiral, must be odd.
        let n = blocks_x.max(blocks_y) | 0x1;
        // Keep the spiral centered, rounded to a tile border.
        let mut offset = IVec2::new(
            (image_w - n * block_size.x) / 2,
            (image_h - n * block_size.y) / 2,
        );
        offset = (offset / self.tile_size) * self.tile_size;

        self.state.tiles = vec![Tile::default(); total];

        let mut block = IVec2::ZERO;
        let mut prev_dir = SpiralDirection::Up;
        let mut dir = SpiralDirection::Up;
        let mut i = 0;
        loop {
            for hilbert_index in 0..hilbert_size * hilbert_size {
                let hilbert_pos = hilbert_index_to_pos(hilbert_size, hilbert_index);
                // Rotate the block according to the spiral direction.
                let tile = if prev_dir == SpiralDirection::Up && dir == SpiralDirection::Up {
                    IVec2::new(hilbert_pos.y, hilbert_pos.x)
                } else if dir == SpiralDirection::Left || prev_dir == SpiralDirection::Left {
                    hilbert_pos
                } else if dir == SpiralDirection::Down {
                    IVec2::new(
                        hilbert_size - 1 - hilbert_pos.y,
                        hilbert_size - 1 - hilbert_pos.x,
                    )
                } else {
                    IVec2::new(
                        hilbert_size - 1 - hilbert_pos.x,
                        hilbert_size - 1 - hilbert_pos.y,
                    )
                };

                let pos = block * block_size + tile * self.tile_size + offset;
                // The spiral is square, so skip positions outside the image.
                if pos.x < 0 || pos.y < 0 || pos.x >= image_w || pos.y >= image_h {
                    continue;
                }

                let w = self.tile_size.x.min(image_w - pos.x);
                let h = self.tile_size.y.min(image_h - pos.y);
                let ipos = pos / self.tile_size;
                let idx = (ipos.y * tile_w + ipos.x) as usize;
                self.state.tiles[idx] = Tile::new(
                    idx,
                    pos.x,
                    pos.y,
                    w,
                    h,
                    cur_device,
                    initial_state,
                    global.clone(),
                );
                let queue = if self.only_denoise {
                    &mut self.state.denoise_tiles[cur_device]
                } else {
                    &mut self.state.render_tiles[cur_device]
                };
                queue.push_front(idx);
                cur_tiles += 1;

                if cur_tiles == tiles_per_device {
                    cur_tiles = 0;
                    cur_device += 1;
                }
            }

            // The spiral ends at the center block.
            if block.x == (n - 1) / 2 && block.y == (n - 1) / 2 {
                break;
            }

            prev_dir = dir;
            match dir {
                SpiralDirection::Up => {
                    block.y += 1;
                    if block.y == n - i - 1 {
                        dir = SpiralDirection::Left;
                    }
                }
                SpiralDirection::Left => {
                    block.x += 1;
                    if block.x == n - i - 1 {
                        dir = SpiralDirection::Down;
                    }
                }
                SpiralDirection::Down => {
                    block.y -= 1;
                    if block.y == i {
                        dir = SpiralDirection::Right;
                    }
                }
                SpiralDirection::Right => {
                    block.x -= 1;
                    if block.x == i + 1 {
                        dir = SpiralDirection::Up;
                        i += 1;
                    }
                }
            }
        }

        total
    }
}

fn get_divider(mut w: i32, mut h: i32, start_resolution: i32) -> i32 {
    let mut divider = 1;
    if start_resolution != UNLIMITED_START_RESOLUTION {
        while w as i64 * h as i64 > start_resolution as i64 * start_resolution as i64 {
            w = (w / 2).max(1);
            h = (h / 2).max(1);
            divider <<= 1;
        }
    }
    divider
}

fn tile_count(size: i32, tile: i32) -> i32 {
    if tile >= size {
        1
    } else {
        (size + tile - 1) / tile
    }
}

fn sort_tile_indices(indices: &mut [usize], order: TileOrder, center: IVec2, tiles: &[Tile]) {
    match order {
        TileOrder::Center => {
            indices.sort_by(|&a, &b| {
                let da = center_distance_sq(&tiles[a], center);
                let db = center_distance_sq(&tiles[b], center);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        TileOrder::LeftToRight => indices.sort_by_key(|&i| (tiles[i].x, tiles[i].y)),
        TileOrder::RightToLeft => indices.sort_by_key(|&i| (Reverse(tiles[i].x), tiles[i].y)),
        TileOrder::TopToBottom => indices.sort_by_key(|&i| (Reverse(tiles[i].y), tiles[i].x)),
        TileOrder::BottomToTop => indices.sort_by_key(|&i| (tiles[i].y, tiles[i].x)),
        TileOrder::HilbertSpiral => {}
    }
}

fn center_distance_sq(tile: &Tile, center: IVec2) -> f32 {
    let dist = Vec2::new(
        (center.x - (tile.x + tile.w / 2)) as f32,
        (center.y - (tile.y + tile.h / 2)) as f32,
    );
    dist.length_squared()
}
