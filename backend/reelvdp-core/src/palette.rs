//! Palette RAMDAC: an index latch followed by sequential R, G, B data writes

use crate::api::{Color, ReelVdpError};
use bincode::de::{BorrowDecoder, Decoder};
use bincode::error::DecodeError;
use bincode::{BorrowDecode, Decode, Encode};

pub const PALETTE_LEN: usize = 256;
pub const PALETTE_DUMP_LEN: usize = 3 * PALETTE_LEN;

// 6-bit color components
const COMPONENT_MASK: u8 = 0x3F;

// R, G, B
const COMPONENTS_PER_ENTRY: u8 = 3;

#[derive(Debug, Clone, Encode)]
pub struct Palette {
    entries: [[u8; 3]; PALETTE_LEN],
    index: u8,
    component: u8,
}

#[inline]
fn expand_6bit(value: u8) -> u8 {
    (value << 2) | (value >> 4)
}

impl Palette {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: [[0; 3]; PALETTE_LEN], index: 0, component: 0 }
    }

    pub fn write_index(&mut self, index: u8) {
        self.index = index;
        self.component = 0;
    }

    #[must_use]
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn write_data(&mut self, value: u8) {
        self.entries[usize::from(self.index)][usize::from(self.component)] = value & COMPONENT_MASK;
        self.advance();
    }

    pub fn read_data(&mut self) -> u8 {
        let value = self.entries[usize::from(self.index)][usize::from(self.component)];
        self.advance();
        value
    }

    fn advance(&mut self) {
        self.component += 1;
        if self.component == COMPONENTS_PER_ENTRY {
            log::trace!(
                "Palette entry {:02X} set to {:02X?}",
                self.index,
                self.entries[usize::from(self.index)]
            );
            self.component = 0;
            self.index = self.index.wrapping_add(1);
        }
    }

    #[inline]
    #[must_use]
    pub fn color(&self, pen: u8) -> Color {
        let [r, g, b] = self.entries[usize::from(pen)];
        Color::rgb(expand_6bit(r), expand_6bit(g), expand_6bit(b))
    }

    /// Replace the whole palette from a dump of 256 R, G, B triples.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump is not exactly [`PALETTE_DUMP_LEN`] bytes.
    pub fn load_dump(&mut self, dump: &[u8]) -> Result<(), ReelVdpError> {
        if dump.len() != PALETTE_DUMP_LEN {
            return Err(ReelVdpError::PaletteDumpSize {
                expected: PALETTE_DUMP_LEN,
                actual: dump.len(),
            });
        }

        for (entry, rgb) in self.entries.iter_mut().zip(dump.chunks_exact(3)) {
            *entry = [rgb[0] & COMPONENT_MASK, rgb[1] & COMPONENT_MASK, rgb[2] & COMPONENT_MASK];
        }

        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    fn decode_state<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let mut entries: [[u8; 3]; PALETTE_LEN] = Decode::decode(decoder)?;
        let index = u8::decode(decoder)?;
        let component = u8::decode(decoder)?;

        if component >= COMPONENTS_PER_ENTRY {
            return Err(DecodeError::OtherString(format!(
                "palette component latch is {component}, must be less than {COMPONENTS_PER_ENTRY}"
            )));
        }

        for value in entries.as_flattened_mut() {
            *value &= COMPONENT_MASK;
        }

        Ok(Self { entries, index, component })
    }
}

impl<Context> Decode<Context> for Palette {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Self::decode_state(decoder)
    }
}

impl<'de, Context> BorrowDecode<'de, Context> for Palette {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        Self::decode_state(decoder)
    }
}
