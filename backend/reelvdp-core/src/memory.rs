//! Video RAM address decoding
//!
//! The CPU sees tile cells, scroll tables and the line select table through one byte-addressed
//! window. 16-bit values are little-endian: the even byte holds bits 0-7.

use crate::lineselect::{LINE_SELECT_LEN, LineSelectTable};
use crate::palette::Palette;
use crate::scroll::ScrollRegisters;
use crate::tiles::{Layer, TileStore};
use bincode::{Decode, Encode};

pub const VRAM_WINDOW_LEN: usize = 0x8000;
const VRAM_ADDRESS_MASK: u16 = (VRAM_WINDOW_LEN as u16) - 1;

/// Length of a contiguous dump covering every mapped region
pub const VRAM_DUMP_LEN: usize = 0x6800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VramRegion {
    FgCells { byte: usize },
    ReelCells { reel: usize, byte: usize },
    ReelColScroll { reel: usize, byte: usize },
    FgRowScroll { byte: usize },
    ReelRowScroll { reel: usize, byte: usize },
    LineSelect { line: usize },
    Unmapped,
}

impl VramRegion {
    fn decode(address: u16) -> Self {
        let address = address & VRAM_ADDRESS_MASK;
        let offset = usize::from(address);

        match address {
            0x0000..=0x3FFF => Self::FgCells { byte: offset },
            0x4000..=0x5FFF => {
                let offset = offset - 0x4000;
                Self::ReelCells { reel: offset / 0x800, byte: offset % 0x800 }
            }
            0x6000..=0x61FF => {
                let offset = offset - 0x6000;
                Self::ReelColScroll { reel: offset / 0x80, byte: offset % 0x80 }
            }
            0x6200..=0x627F => Self::FgRowScroll { byte: offset - 0x6200 },
            0x6400..=0x65FF => {
                let offset = offset - 0x6400;
                Self::ReelRowScroll { reel: offset / 0x80, byte: offset % 0x80 }
            }
            0x6600..=0x67FF => Self::LineSelect { line: offset - 0x6600 },
            _ => Self::Unmapped,
        }
    }
}

fn word_byte(word: u16, byte: usize) -> u8 {
    if byte % 2 == 0 { word as u8 } else { (word >> 8) as u8 }
}

fn with_word_byte(word: u16, byte: usize, value: u8) -> u16 {
    if byte % 2 == 0 {
        (word & 0xFF00) | u16::from(value)
    } else {
        (word & 0x00FF) | (u16::from(value) << 8)
    }
}

/// All CPU-writable video state: tile cells, scroll registers and tables, line select bytes,
/// and the palette.
#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct VideoMemory {
    pub tiles: TileStore,
    pub scroll: ScrollRegisters,
    pub line_select: LineSelectTable,
    pub palette: Palette,
}

impl VideoMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn read_vram(&self, address: u16) -> u8 {
        match VramRegion::decode(address) {
            VramRegion::FgCells { byte } => {
                word_byte(self.tiles.raw_cell(Layer::Foreground, byte / 2), byte)
            }
            VramRegion::ReelCells { reel, byte } => {
                word_byte(self.tiles.raw_cell(Layer::Reel(reel), byte / 2), byte)
            }
            VramRegion::ReelColScroll { reel, byte } => {
                word_byte(self.scroll.reel_col_scroll(reel, byte / 2), byte)
            }
            VramRegion::FgRowScroll { byte } => {
                word_byte(self.scroll.fg_row_scroll(byte / 2), byte)
            }
            VramRegion::ReelRowScroll { reel, byte } => {
                word_byte(self.scroll.reel_row_scroll(reel, byte / 2), byte)
            }
            VramRegion::LineSelect { line } => self.line_select.get(line),
            VramRegion::Unmapped => {
                log::trace!("Unmapped video RAM read {address:04X}");
                0
            }
        }
    }

    pub fn write_vram(&mut self, address: u16, value: u8) {
        match VramRegion::decode(address) {
            VramRegion::FgCells { byte } => {
                let word = self.tiles.raw_cell(Layer::Foreground, byte / 2);
                self.tiles.set_cell(Layer::Foreground, byte / 2, with_word_byte(word, byte, value));
            }
            VramRegion::ReelCells { reel, byte } => {
                let layer = Layer::Reel(reel);
                let word = self.tiles.raw_cell(layer, byte / 2);
                self.tiles.set_cell(layer, byte / 2, with_word_byte(word, byte, value));
            }
            VramRegion::ReelColScroll { reel, byte } => {
                let word = self.scroll.reel_col_scroll(reel, byte / 2);
                self.scroll.set_reel_col_scroll(reel, byte / 2, with_word_byte(word, byte, value));
            }
            VramRegion::FgRowScroll { byte } => {
                let word = self.scroll.fg_row_scroll(byte / 2);
                self.scroll.set_fg_row_scroll(byte / 2, with_word_byte(word, byte, value));
            }
            VramRegion::ReelRowScroll { reel, byte } => {
                let word = self.scroll.reel_row_scroll(reel, byte / 2);
                self.scroll.set_reel_row_scroll(reel, byte / 2, with_word_byte(word, byte, value));
            }
            VramRegion::LineSelect { line } => {
                debug_assert!(line < LINE_SELECT_LEN);
                self.line_select.set(line, value);
            }
            VramRegion::Unmapped => {
                log::trace!("Unmapped video RAM write {address:04X} {value:02X}");
            }
        }
    }

    /// Write a 16-bit value at an even address.
    pub fn write_vram_word(&mut self, address: u16, value: u16) {
        debug_assert!(address % 2 == 0, "unaligned video RAM word write {address:04X}");
        let [lsb, msb] = value.to_le_bytes();
        self.write_vram(address, lsb);
        self.write_vram(address.wrapping_add(1), msb);
    }

    /// Load a contiguous dump starting at address 0. Palette and global scroll registers are not
    /// part of the dump and are left unchanged.
    pub fn load_vram_dump(&mut self, dump: &[u8]) {
        for (address, &value) in dump.iter().enumerate().take(VRAM_DUMP_LEN) {
            self.write_vram(address as u16, value);
        }
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.scroll.clear();
        self.line_select.clear();
        self.palette.clear();
    }
}
