//! Reel compositor: draws the selected reel layer(s) into the composite buffer one scanline at a
//! time

use crate::gfx::GfxRom;
use crate::lineselect::{LineSelectTable, LineSelection, ReelDraw};
use crate::scroll::{REEL_PIXEL_MASK, ScrollRegisters};
use crate::tiles::{NUM_REELS, REEL_COLS, TileCell, TileStore};
use std::ops::{Deref, DerefMut};

pub const SCREEN_WIDTH: usize = 512;
pub const SCREEN_HEIGHT: usize = 288;

pub const COMPOSITE_WIDTH: usize = 1024;
pub const COMPOSITE_HEIGHT: usize = 512;
const COMPOSITE_LEN: usize = COMPOSITE_WIDTH * COMPOSITE_HEIGHT;

/// Set on composite pixels that draw in front of the foreground layer
pub const FRONT_TAG: u16 = 0x100;

const REEL_TILE_WIDTH: u16 = 8;
const REEL_TILE_HEIGHT: u16 = 32;

/// Reel layer output for a full frame. Each entry is a pen, plus [`FRONT_TAG`] if the source tile
/// has its priority flag set.
#[derive(Debug, Clone)]
pub struct CompositeBuffer(Box<[u16]>);

impl CompositeBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self(vec![0; COMPOSITE_LEN].into_boxed_slice())
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[u16] {
        let start = (y % COMPOSITE_HEIGHT) * COMPOSITE_WIDTH;
        &self.0[start..start + COMPOSITE_WIDTH]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u16] {
        let start = (y % COMPOSITE_HEIGHT) * COMPOSITE_WIDTH;
        &mut self.0[start..start + COMPOSITE_WIDTH]
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.row(y)[x % COMPOSITE_WIDTH]
    }
}

impl Default for CompositeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for CompositeBuffer {
    type Target = [u16];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for CompositeBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorState {
    Idle,
    Scanline(u16),
    Done,
}

pub struct CompositorArgs<'a> {
    pub tiles: &'a TileStore,
    pub scroll: &'a ScrollRegisters,
    pub line_select: &'a LineSelectTable,
    pub reel_gfx: &'a GfxRom,
    pub reels_enabled: [bool; NUM_REELS],
}

#[derive(Debug, Clone)]
pub struct ReelCompositor {
    state: CompositorState,
    // Current X scroll of each reel layer; all four are always set from the same table
    x_scroll: [u16; NUM_REELS],
    selections: Vec<LineSelection>,
}

impl ReelCompositor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CompositorState::Idle,
            x_scroll: [0; NUM_REELS],
            selections: Vec::with_capacity(SCREEN_HEIGHT),
        }
    }

    #[must_use]
    pub fn state(&self) -> CompositorState {
        self.state
    }

    /// Line selections used for each scanline composited so far in the current frame.
    #[must_use]
    pub fn selections(&self) -> &[LineSelection] {
        &self.selections
    }

    pub fn begin_frame(&mut self, buffer: &mut CompositeBuffer) {
        buffer.fill(0);
        self.selections.clear();
        self.state = CompositorState::Scanline(0);
    }

    /// Composite the next scanline. Does nothing unless a frame is in progress.
    pub fn step(
        &mut self,
        args: &CompositorArgs<'_>,
        buffer: &mut CompositeBuffer,
    ) -> CompositorState {
        let CompositorState::Scanline(scanline) = self.state else {
            return self.state;
        };

        let selection = args.line_select.select(args.scroll, scanline);

        let x_scroll = args.scroll.horizontal_scroll(selection.scroll_reel(), scanline);
        self.x_scroll = [x_scroll; NUM_REELS];

        for ReelDraw { reel, category } in selection.reels_to_draw() {
            if !args.reels_enabled[reel] {
                continue;
            }

            log::trace!("Line {scanline}: drawing reel {reel} (category {category})");
            self.draw_strip(args, buffer, reel, scanline);
        }

        self.selections.push(selection);

        self.state = if usize::from(scanline) + 1 < SCREEN_HEIGHT {
            CompositorState::Scanline(scanline + 1)
        } else {
            CompositorState::Done
        };
        self.state
    }

    pub fn run_frame(&mut self, args: &CompositorArgs<'_>, buffer: &mut CompositeBuffer) {
        self.begin_frame(buffer);
        while self.step(args, buffer) != CompositorState::Done {}
    }

    /// Draw a one pixel tall strip of a reel layer into row `scanline` of the composite buffer.
    /// Reel strips are opaque; every visible pixel of the row is overwritten.
    pub(crate) fn draw_strip(
        &self,
        args: &CompositorArgs<'_>,
        buffer: &mut CompositeBuffer,
        reel: usize,
        scanline: u16,
    ) {
        let layer = args.tiles.reel(reel);
        let x_scroll = self.x_scroll[reel % NUM_REELS];
        let row = buffer.row_mut(scanline.into());

        let mut cached_cell_idx = usize::MAX;
        let mut cell = TileCell::default();

        for (pixel, out) in (0..SCREEN_WIDTH as u16).zip(&mut row[..SCREEN_WIDTH]) {
            let map_x = pixel.wrapping_add(x_scroll) & REEL_PIXEL_MASK;
            let map_col = map_x / REEL_TILE_WIDTH;

            let map_y = scanline.wrapping_add(args.scroll.vertical_scroll(reel, map_col))
                & REEL_PIXEL_MASK;
            let map_row = map_y / REEL_TILE_HEIGHT;

            let cell_idx = usize::from(map_row) * REEL_COLS + usize::from(map_col);
            if cell_idx != cached_cell_idx {
                cell = layer.cell(cell_idx);
                cached_cell_idx = cell_idx;
            }

            let tile_col = map_x % REEL_TILE_WIDTH;
            let tile_col = if cell.flip_x { REEL_TILE_WIDTH - 1 - tile_col } else { tile_col };
            let pen = args.reel_gfx.pixel(cell.tile_code, tile_col, map_y % REEL_TILE_HEIGHT);

            *out = u16::from(pen) | if cell.priority { FRONT_TAG } else { 0 };
        }
    }
}

impl Default for ReelCompositor {
    fn default() -> Self {
        Self::new()
    }
}
