//! Per-scanline reel selection
//!
//! Every logical scanline has a select byte. Bits 0-1 (`row_sel`) pick the reel layer whose
//! horizontal scroll table applies to the line and which is drawn on it; bits 2-3 (`row_sel2`)
//! pick a second reel layer that is also drawn on the line but never contributes scroll.

use crate::scroll::ScrollRegisters;
use crate::tiles::NUM_REELS;
use bincode::{Decode, Encode};

pub const LINE_SELECT_LEN: usize = 512;

const LINE_MASK: u16 = (LINE_SELECT_LEN as u16) - 1;

// Draw category for each reel layer. Not monotonic in the reel index; treat as opaque
// hardware values
const REEL_CATEGORY: [u8; NUM_REELS] = [3, 2, 1, 4];

#[must_use]
pub fn reel_category(reel: usize) -> u8 {
    REEL_CATEGORY[reel % NUM_REELS]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReelDraw {
    pub reel: usize,
    pub category: u8,
}

impl ReelDraw {
    fn new(reel: usize) -> Self {
        Self { reel, category: reel_category(reel) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSelection {
    /// Index into the line select table
    pub line: u16,
    pub select_byte: u8,
    pub row_sel: u8,
    pub row_sel2: u8,
}

impl LineSelection {
    #[must_use]
    pub fn from_select_byte(line: u16, select_byte: u8) -> Self {
        Self { line, select_byte, row_sel: select_byte & 0x03, row_sel2: (select_byte >> 2) & 0x03 }
    }

    /// Reel whose horizontal scroll table is applied to every reel layer on this line.
    #[must_use]
    pub fn scroll_reel(&self) -> usize {
        self.row_sel.into()
    }

    /// Reel layers to draw on this line, in draw order. The `row_sel` layer is drawn first and the
    /// `row_sel2` layer second, so `row_sel2` wins when the two differ. A layer selected by both
    /// fields is drawn once.
    pub fn reels_to_draw(&self) -> impl Iterator<Item = ReelDraw> {
        let first = ReelDraw::new(self.row_sel.into());
        let second = (self.row_sel2 != self.row_sel).then(|| ReelDraw::new(self.row_sel2.into()));
        [Some(first), second].into_iter().flatten()
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LineSelectTable {
    bytes: [u8; LINE_SELECT_LEN],
}

impl LineSelectTable {
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: [0; LINE_SELECT_LEN] }
    }

    #[must_use]
    pub fn get(&self, line: usize) -> u8 {
        debug_assert!(line < LINE_SELECT_LEN, "line select index {line} out of range");
        self.bytes[line % LINE_SELECT_LEN]
    }

    pub fn set(&mut self, line: usize, value: u8) {
        debug_assert!(line < LINE_SELECT_LEN, "line select index {line} out of range");
        self.bytes[line % LINE_SELECT_LEN] = value;
    }

    /// Decode the selection for screen scanline `scanline`.
    #[must_use]
    pub fn select(&self, scroll: &ScrollRegisters, scanline: u16) -> LineSelection {
        let line = scanline.wrapping_add(scroll.line_select_offset()) & LINE_MASK;
        LineSelection::from_select_byte(line, self.bytes[usize::from(line)])
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

impl Default for LineSelectTable {
    fn default() -> Self {
        Self::new()
    }
}
