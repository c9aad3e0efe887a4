//! Tile attribute memory for the foreground layer and the four reel layers
//!
//! Each layer stores the raw 16-bit words written by the CPU alongside a decoded copy of every
//! cell. Writes only mark a cell dirty; dirty cells are re-decoded in bulk by
//! [`TileStore::refresh`] before a frame is rendered, so the renderer can read decoded cells
//! through a shared reference.
//!
//! Save states hold only the raw words. Every cell is dirty after a load.

use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};

pub const NUM_REELS: usize = 4;

pub const FG_COLS: usize = 128;
pub const FG_ROWS: usize = 64;
pub const FG_CELLS: usize = FG_COLS * FG_ROWS;

pub const REEL_COLS: usize = 64;
pub const REEL_ROWS: usize = 16;
pub const REEL_CELLS: usize = REEL_COLS * REEL_ROWS;

const FG_TILE_CODE_MASK: u16 = 0x3FFF;
const REEL_TILE_CODE_MASK: u16 = 0x1FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Foreground,
    Reel(usize),
}

impl Layer {
    #[must_use]
    pub const fn cell_count(self) -> usize {
        match self {
            Self::Foreground => FG_CELLS,
            Self::Reel(_) => REEL_CELLS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileCell {
    pub tile_code: u16,
    pub flip_x: bool,
    // Foreground cells only
    pub flip_y: bool,
    // Reel cells only; set means the tile draws in front of the foreground layer
    pub priority: bool,
}

impl TileCell {
    #[must_use]
    pub fn decode(layer: Layer, word: u16) -> Self {
        let flip_x = word & 0x8000 != 0;
        let bit_14 = word & 0x4000 != 0;

        match layer {
            Layer::Foreground => Self {
                tile_code: word & FG_TILE_CODE_MASK,
                flip_x,
                flip_y: bit_14,
                priority: false,
            },
            Layer::Reel(_) => Self {
                tile_code: word & REEL_TILE_CODE_MASK,
                flip_x,
                flip_y: false,
                priority: bit_14,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    layer: Layer,
    raw: Vec<u16>,
    cells: Vec<TileCell>,
    dirty: Vec<bool>,
    any_dirty: bool,
}

impl TileLayer {
    fn new(layer: Layer) -> Self {
        let len = layer.cell_count();
        Self {
            layer,
            raw: vec![0; len],
            cells: vec![TileCell::default(); len],
            dirty: vec![false; len],
            any_dirty: false,
        }
    }

    fn decode_raw<D: Decoder>(layer: Layer, decoder: &mut D) -> Result<Self, DecodeError> {
        let len = layer.cell_count();

        let mut raw = vec![0; len];
        for word in &mut raw {
            *word = u16::decode(decoder)?;
        }

        Ok(Self {
            layer,
            raw,
            cells: vec![TileCell::default(); len],
            dirty: vec![true; len],
            any_dirty: true,
        })
    }

    fn encode_raw<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        for word in &self.raw {
            word.encode(encoder)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn raw(&self, index: usize) -> u16 {
        debug_assert!(
            index < self.raw.len(),
            "cell index {index} out of range for {:?}",
            self.layer
        );
        self.raw[index % self.raw.len()]
    }

    pub fn set_raw(&mut self, index: usize, word: u16) {
        debug_assert!(
            index < self.raw.len(),
            "cell index {index} out of range for {:?}",
            self.layer
        );
        let index = index % self.raw.len();

        if self.raw[index] == word {
            return;
        }

        self.raw[index] = word;
        self.dirty[index] = true;
        self.any_dirty = true;
    }

    /// Decoded cell at the given index. Cells written since the last [`TileStore::refresh`] still
    /// return their previous decode.
    #[inline]
    #[must_use]
    pub fn cell(&self, index: usize) -> TileCell {
        self.cells[index % self.cells.len()]
    }

    fn refresh(&mut self) -> usize {
        if !self.any_dirty {
            return 0;
        }

        let mut decoded = 0;
        for (i, dirty) in self.dirty.iter_mut().enumerate() {
            if *dirty {
                self.cells[i] = TileCell::decode(self.layer, self.raw[i]);
                *dirty = false;
                decoded += 1;
            }
        }
        self.any_dirty = false;

        decoded
    }

    fn clear(&mut self) {
        self.raw.fill(0);
        self.cells.fill(TileCell::default());
        self.dirty.fill(false);
        self.any_dirty = false;
    }
}

#[derive(Debug, Clone)]
pub struct TileStore {
    foreground: TileLayer,
    reels: [TileLayer; NUM_REELS],
}

impl TileStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            foreground: TileLayer::new(Layer::Foreground),
            reels: std::array::from_fn(|i| TileLayer::new(Layer::Reel(i))),
        }
    }

    #[must_use]
    pub fn layer(&self, layer: Layer) -> &TileLayer {
        match layer {
            Layer::Foreground => &self.foreground,
            Layer::Reel(reel) => self.reel(reel),
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut TileLayer {
        match layer {
            Layer::Foreground => &mut self.foreground,
            Layer::Reel(reel) => {
                debug_assert!(reel < NUM_REELS, "invalid reel index {reel}");
                &mut self.reels[reel % NUM_REELS]
            }
        }
    }

    #[must_use]
    pub fn foreground(&self) -> &TileLayer {
        &self.foreground
    }

    #[must_use]
    pub fn reel(&self, reel: usize) -> &TileLayer {
        debug_assert!(reel < NUM_REELS, "invalid reel index {reel}");
        &self.reels[reel % NUM_REELS]
    }

    pub fn set_cell(&mut self, layer: Layer, index: usize, word: u16) {
        self.layer_mut(layer).set_raw(index, word);
    }

    #[must_use]
    pub fn raw_cell(&self, layer: Layer, index: usize) -> u16 {
        self.layer(layer).raw(index)
    }

    /// Re-decode every cell written since the previous refresh.
    pub fn refresh(&mut self) {
        let mut decoded = self.foreground.refresh();
        for reel in &mut self.reels {
            decoded += reel.refresh();
        }

        if decoded != 0 {
            log::trace!("Re-decoded {decoded} dirty tile cells");
        }
    }

    pub fn clear(&mut self) {
        self.foreground.clear();
        for reel in &mut self.reels {
            reel.clear();
        }
    }
}

impl Default for TileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TileStore {
    fn decode_layers<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let foreground = TileLayer::decode_raw(Layer::Foreground, decoder)?;
        let reels = [
            TileLayer::decode_raw(Layer::Reel(0), decoder)?,
            TileLayer::decode_raw(Layer::Reel(1), decoder)?,
            TileLayer::decode_raw(Layer::Reel(2), decoder)?,
            TileLayer::decode_raw(Layer::Reel(3), decoder)?,
        ];

        Ok(Self { foreground, reels })
    }
}

impl Encode for TileStore {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.foreground.encode_raw(encoder)?;
        for reel in &self.reels {
            reel.encode_raw(encoder)?;
        }
        Ok(())
    }
}

impl<Context> Decode<Context> for TileStore {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Self::decode_layers(decoder)
    }
}

impl<'de, Context> BorrowDecode<'de, Context> for TileStore {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        Self::decode_layers(decoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn reel_cell_decode() {
        let cell = TileCell::decode(Layer::Reel(2), 0xC123);
        assert_eq!(
            cell,
            TileCell { tile_code: 0x0123, flip_x: true, flip_y: false, priority: true }
        );

        let cell = TileCell::decode(Layer::Reel(0), 0x3FFF);
        assert_eq!(
            cell,
            TileCell { tile_code: 0x1FFF, flip_x: false, flip_y: false, priority: false }
        );
    }

    #[test]
    fn foreground_cell_decode() {
        let cell = TileCell::decode(Layer::Foreground, 0x7ABC);
        assert_eq!(
            cell,
            TileCell { tile_code: 0x3ABC, flip_x: false, flip_y: true, priority: false }
        );

        let cell = TileCell::decode(Layer::Foreground, 0x8001);
        assert_eq!(
            cell,
            TileCell { tile_code: 0x0001, flip_x: true, flip_y: false, priority: false }
        );
    }

    #[test]
    fn writes_are_decoded_lazily() {
        let mut store = TileStore::new();
        store.set_cell(Layer::Reel(1), 5, 0x4007);

        assert_eq!(store.raw_cell(Layer::Reel(1), 5), 0x4007);
        assert_eq!(store.reel(1).cell(5), TileCell::default());

        store.refresh();
        assert_eq!(
            store.reel(1).cell(5),
            TileCell { tile_code: 7, flip_x: false, flip_y: false, priority: true }
        );

        // Other reels are untouched
        assert_eq!(store.reel(0).cell(5), TileCell::default());
        assert_eq!(store.reel(2).cell(5), TileCell::default());
    }

    #[test]
    fn clear_resets_cells() {
        let mut store = TileStore::new();
        store.set_cell(Layer::Foreground, FG_CELLS - 1, 0x1234);
        store.refresh();
        assert_eq!(store.foreground().cell(FG_CELLS - 1).tile_code, 0x1234);

        store.clear();
        assert_eq!(store.raw_cell(Layer::Foreground, FG_CELLS - 1), 0);
        assert_eq!(store.foreground().cell(FG_CELLS - 1), TileCell::default());
    }

    #[test]
    fn decoded_store_rebuilds_cells() {
        let mut store = TileStore::new();
        store.set_cell(Layer::Foreground, 3, 0x4005);
        store.set_cell(Layer::Reel(3), REEL_CELLS - 1, 0xC00A);
        store.refresh();

        let bytes = bincode::encode_to_vec(&store, bincode::config::standard()).unwrap();
        let (mut decoded, _): (TileStore, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard()).unwrap();

        assert_eq!(decoded.raw_cell(Layer::Reel(3), REEL_CELLS - 1), 0xC00A);
        decoded.refresh();
        assert_eq!(decoded.foreground().cell(3), store.foreground().cell(3));
        assert_eq!(decoded.reel(3).cell(REEL_CELLS - 1), store.reel(3).cell(REEL_CELLS - 1));
        assert!(decoded.reel(3).cell(REEL_CELLS - 1).priority);
    }

    #[test]
    fn truncated_store_fails_to_decode() {
        let bytes = bincode::encode_to_vec(TileStore::new(), bincode::config::standard()).unwrap();
        let result: Result<(TileStore, usize), _> =
            bincode::decode_from_slice(&bytes[..bytes.len() - 1], bincode::config::standard());
        assert!(result.is_err());
    }
}
