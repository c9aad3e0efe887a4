//! Tile graphics ROMs
//!
//! Both layers use 8 bits per pixel with one byte per pixel, rows stored top to bottom.

use crate::api::ReelVdpError;
use crate::tiles::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileShape {
    pub width: u16,
    pub height: u16,
}

impl TileShape {
    pub const FOREGROUND: Self = Self { width: 8, height: 8 };
    pub const REEL: Self = Self { width: 8, height: 32 };

    #[must_use]
    pub const fn for_layer(layer: Layer) -> Self {
        match layer {
            Layer::Foreground => Self::FOREGROUND,
            Layer::Reel(_) => Self::REEL,
        }
    }

    #[must_use]
    pub const fn tile_len(self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(Debug, Clone)]
pub struct GfxRom {
    shape: TileShape,
    pixels: Box<[u8]>,
    num_tiles: usize,
}

impl GfxRom {
    /// Wrap a graphics ROM image.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM is empty or is not a whole number of tiles long.
    pub fn new(layer: Layer, rom: Vec<u8>) -> Result<Self, ReelVdpError> {
        let shape = TileShape::for_layer(layer);
        let tile_len = shape.tile_len();

        if rom.is_empty() || rom.len() % tile_len != 0 {
            return Err(ReelVdpError::GfxRomSize { layer, len: rom.len(), tile_len });
        }

        let num_tiles = rom.len() / tile_len;
        log::info!("Loaded {num_tiles} {}x{} tiles for {layer:?}", shape.width, shape.height);

        if !num_tiles.is_power_of_two() {
            log::warn!(
                "{layer:?} graphics ROM tile count {num_tiles} is not a power of two; \
                 out of range tile codes will not mirror cleanly"
            );
        }

        Ok(Self { shape, pixels: rom.into_boxed_slice(), num_tiles })
    }

    /// A ROM with no tiles; every pixel reads as pen 0.
    #[must_use]
    pub fn empty(layer: Layer) -> Self {
        Self { shape: TileShape::for_layer(layer), pixels: Box::new([]), num_tiles: 0 }
    }

    #[must_use]
    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    /// Pen for one pixel of a tile. Tile codes past the end of the ROM wrap around.
    #[inline]
    #[must_use]
    pub fn pixel(&self, tile_code: u16, col: u16, row: u16) -> u8 {
        if self.num_tiles == 0 {
            return 0;
        }

        debug_assert!(col < self.shape.width && row < self.shape.height);

        let tile = usize::from(tile_code) % self.num_tiles;
        let addr = tile * self.shape.tile_len()
            + usize::from(row % self.shape.height) * usize::from(self.shape.width)
            + usize::from(col % self.shape.width);
        self.pixels[addr]
    }
}
