//! Final frame assembly from the reel composite buffer and the foreground layer

use crate::gfx::GfxRom;
use crate::render::{CompositeBuffer, FRONT_TAG, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::scroll::{FG_X_PIXEL_MASK, FG_Y_PIXEL_MASK, ScrollRegisters};
use crate::tiles::{FG_COLS, TileCell, TileStore};
use reelvdp_config::DebugView;
use std::ops::{Deref, DerefMut};

const FRAME_LEN: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

pub const BACKDROP_PEN: u8 = 0;

// Pens used by the depth tag debug view
pub const DEPTH_BEHIND_PEN: u8 = 1;
pub const DEPTH_FRONT_PEN: u8 = 2;
pub const DEPTH_FOREGROUND_PEN: u8 = 3;

const FG_TILE_SIZE: u16 = 8;

/// Displayed frame, one pen per visible pixel.
#[derive(Debug, Clone)]
pub struct FinalFrame(Box<[u8]>);

impl FinalFrame {
    #[must_use]
    pub fn new() -> Self {
        Self(vec![BACKDROP_PEN; FRAME_LEN].into_boxed_slice())
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.0[y * SCREEN_WIDTH + x]
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.0[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH]
    }
}

impl Default for FinalFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for FinalFrame {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for FinalFrame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompositePass {
    Behind,
    Front,
}

impl CompositePass {
    fn accepts(self, value: u16) -> bool {
        match self {
            Self::Behind => value & FRONT_TAG == 0,
            Self::Front => value & FRONT_TAG != 0,
        }
    }
}

pub struct MergeArgs<'a> {
    pub composite: &'a CompositeBuffer,
    pub tiles: &'a TileStore,
    pub scroll: &'a ScrollRegisters,
    pub fg_gfx: &'a GfxRom,
    pub foreground_enabled: bool,
    pub debug_view: DebugView,
}

pub fn merge_frame(args: &MergeArgs<'_>, frame: &mut FinalFrame) {
    frame.fill(BACKDROP_PEN);

    let depth_tags = args.debug_view == DebugView::DepthTags;

    if args.debug_view.draws_reels() {
        copy_composite(args.composite, frame, CompositePass::Behind, depth_tags);
    }

    if args.foreground_enabled && args.debug_view.draws_foreground() {
        draw_foreground(args, frame, depth_tags);
    }

    if args.debug_view.draws_reels() {
        copy_composite(args.composite, frame, CompositePass::Front, depth_tags);
    }
}

fn copy_composite(
    composite: &CompositeBuffer,
    frame: &mut FinalFrame,
    pass: CompositePass,
    depth_tags: bool,
) {
    for y in 0..SCREEN_HEIGHT {
        let src = &composite.row(y)[..SCREEN_WIDTH];
        let dest = &mut frame[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH];

        for (&value, out) in src.iter().zip(dest) {
            if !pass.accepts(value) {
                continue;
            }

            *out = match (depth_tags, pass) {
                (false, _) => (value & !FRONT_TAG) as u8,
                (true, CompositePass::Behind) => DEPTH_BEHIND_PEN,
                (true, CompositePass::Front) => DEPTH_FRONT_PEN,
            };
        }
    }
}

fn draw_foreground(args: &MergeArgs<'_>, frame: &mut FinalFrame, depth_tags: bool) {
    let layer = args.tiles.foreground();
    let y_scroll = args.scroll.fg_vertical_scroll();

    for y in 0..SCREEN_HEIGHT {
        let map_y = (y as u16).wrapping_add(y_scroll) & FG_Y_PIXEL_MASK;
        let map_row = map_y / FG_TILE_SIZE;
        let x_scroll = args.scroll.fg_horizontal_scroll(map_y);

        let mut cached_cell_idx = usize::MAX;
        let mut cell = TileCell::default();

        let dest = &mut frame[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH];
        for (pixel, out) in (0..SCREEN_WIDTH as u16).zip(dest) {
            let map_x = pixel.wrapping_add(x_scroll) & FG_X_PIXEL_MASK;

            let cell_idx = usize::from(map_row) * FG_COLS + usize::from(map_x / FG_TILE_SIZE);
            if cell_idx != cached_cell_idx {
                cell = layer.cell(cell_idx);
                cached_cell_idx = cell_idx;
            }

            // Tile 0 is always blank
            if cell.tile_code == 0 {
                continue;
            }

            let tile_col = map_x % FG_TILE_SIZE;
            let tile_col = if cell.flip_x { FG_TILE_SIZE - 1 - tile_col } else { tile_col };
            let tile_row = map_y % FG_TILE_SIZE;
            let tile_row = if cell.flip_y { FG_TILE_SIZE - 1 - tile_row } else { tile_row };

            let pen = args.fg_gfx.pixel(cell.tile_code, tile_col, tile_row);
            if pen != 0 {
                *out = if depth_tags { DEPTH_FOREGROUND_PEN } else { pen };
            }
        }
    }
}
