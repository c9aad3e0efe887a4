//! Global scroll registers and the per-row / per-column scroll tables

use crate::tiles::NUM_REELS;
use bincode::{Decode, Encode};

pub const SCROLL_TABLE_LEN: usize = 64;

// Reel tilemaps are 512x512 pixels (64x16 cells of 8x32)
pub const REEL_PIXEL_MASK: u16 = 0x01FF;

// Foreground tilemap is 1024x512 pixels (128x64 cells of 8x8)
pub const FG_X_PIXEL_MASK: u16 = 0x03FF;
pub const FG_Y_PIXEL_MASK: u16 = 0x01FF;

// The reel global offsets are biased by 8 pixels before every use
const REEL_SCROLL_BIAS: u16 = 8;

pub const SCROLL_REGISTER_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum GlobalScroll {
    ForegroundX,
    ForegroundY,
    ReelX,
    ReelY,
}

impl GlobalScroll {
    const ALL: [Self; 4] = [Self::ForegroundX, Self::ForegroundY, Self::ReelX, Self::ReelY];

    fn from_register(register: usize) -> Self {
        Self::ALL[(register / 2) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct ScrollRegisters {
    fg_x: u16,
    fg_y: u16,
    reel_x: u16,
    reel_y: u16,
    fg_row_scroll: [u16; SCROLL_TABLE_LEN],
    reel_col_scroll: [[u16; SCROLL_TABLE_LEN]; NUM_REELS],
    reel_row_scroll: [[u16; SCROLL_TABLE_LEN]; NUM_REELS],
}

fn table_index(index: usize) -> usize {
    debug_assert!(index < SCROLL_TABLE_LEN, "scroll table index {index} out of range");
    index % SCROLL_TABLE_LEN
}

fn reel_index(reel: usize) -> usize {
    debug_assert!(reel < NUM_REELS, "invalid reel index {reel}");
    reel % NUM_REELS
}

impl ScrollRegisters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fg_x: 0,
            fg_y: 0,
            reel_x: 0,
            reel_y: 0,
            fg_row_scroll: [0; SCROLL_TABLE_LEN],
            reel_col_scroll: [[0; SCROLL_TABLE_LEN]; NUM_REELS],
            reel_row_scroll: [[0; SCROLL_TABLE_LEN]; NUM_REELS],
        }
    }

    #[must_use]
    pub fn global(&self, register: GlobalScroll) -> u16 {
        match register {
            GlobalScroll::ForegroundX => self.fg_x,
            GlobalScroll::ForegroundY => self.fg_y,
            GlobalScroll::ReelX => self.reel_x,
            GlobalScroll::ReelY => self.reel_y,
        }
    }

    pub fn set_global(&mut self, register: GlobalScroll, value: u16) {
        let field = match register {
            GlobalScroll::ForegroundX => &mut self.fg_x,
            GlobalScroll::ForegroundY => &mut self.fg_y,
            GlobalScroll::ReelX => &mut self.reel_x,
            GlobalScroll::ReelY => &mut self.reel_y,
        };
        *field = value;

        log::trace!("Global scroll {register:?} set to {value:04X}");
    }

    /// Byte-wide access to the global scroll register block; even registers hold the low byte.
    #[must_use]
    pub fn read_register(&self, register: usize) -> u8 {
        let value = self.global(GlobalScroll::from_register(register));
        if register % 2 == 0 { value as u8 } else { (value >> 8) as u8 }
    }

    pub fn write_register(&mut self, register: usize, value: u8) {
        debug_assert!(register < SCROLL_REGISTER_COUNT, "invalid scroll register {register}");

        let global = GlobalScroll::from_register(register);
        let current = self.global(global);
        let updated = if register % 2 == 0 {
            (current & 0xFF00) | u16::from(value)
        } else {
            (current & 0x00FF) | (u16::from(value) << 8)
        };
        self.set_global(global, updated);
    }

    #[must_use]
    pub fn fg_row_scroll(&self, row: usize) -> u16 {
        self.fg_row_scroll[table_index(row)]
    }

    pub fn set_fg_row_scroll(&mut self, row: usize, value: u16) {
        self.fg_row_scroll[table_index(row)] = value;
    }

    #[must_use]
    pub fn reel_col_scroll(&self, reel: usize, col: usize) -> u16 {
        self.reel_col_scroll[reel_index(reel)][table_index(col)]
    }

    pub fn set_reel_col_scroll(&mut self, reel: usize, col: usize, value: u16) {
        self.reel_col_scroll[reel_index(reel)][table_index(col)] = value;
    }

    #[must_use]
    pub fn reel_row_scroll(&self, reel: usize, block: usize) -> u16 {
        self.reel_row_scroll[reel_index(reel)][table_index(block)]
    }

    pub fn set_reel_row_scroll(&mut self, reel: usize, block: usize, value: u16) {
        self.reel_row_scroll[reel_index(reel)][table_index(block)] = value;
    }

    /// Horizontal scroll for a reel layer on the given scanline, in reel tilemap pixels.
    #[must_use]
    pub fn horizontal_scroll(&self, reel: usize, scanline: u16) -> u16 {
        let block = usize::from(scanline / 8) % SCROLL_TABLE_LEN;
        self.reel_x
            .wrapping_add(REEL_SCROLL_BIAS)
            .wrapping_add(self.reel_row_scroll[reel_index(reel)][block])
            & REEL_PIXEL_MASK
    }

    /// Vertical scroll for one column of a reel layer, in reel tilemap pixels.
    #[must_use]
    pub fn vertical_scroll(&self, reel: usize, col: u16) -> u16 {
        let col = usize::from(col) % SCROLL_TABLE_LEN;
        self.reel_y
            .wrapping_add(REEL_SCROLL_BIAS)
            .wrapping_add(self.reel_col_scroll[reel_index(reel)][col])
            & REEL_PIXEL_MASK
    }

    /// Offset added to a scanline number to find its entry in the line select table.
    #[must_use]
    pub fn line_select_offset(&self) -> u16 {
        self.reel_y.wrapping_add(REEL_SCROLL_BIAS)
    }

    /// Foreground Y scroll, in foreground tilemap pixels.
    #[must_use]
    pub fn fg_vertical_scroll(&self) -> u16 {
        self.fg_y & FG_Y_PIXEL_MASK
    }

    /// Foreground X scroll for the tilemap pixel row `map_y`, in foreground tilemap pixels.
    #[must_use]
    pub fn fg_horizontal_scroll(&self, map_y: u16) -> u16 {
        let row = usize::from((map_y & FG_Y_PIXEL_MASK) / 8);
        self.fg_x.wrapping_add(self.fg_row_scroll[row]) & FG_X_PIXEL_MASK
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for ScrollRegisters {
    fn default() -> Self {
        Self::new()
    }
}
