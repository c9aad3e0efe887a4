//! Public interface: the reel video context and the display sink it renders into

use crate::gfx::GfxRom;
use crate::lineselect::LineSelection;
use crate::memory::{VRAM_DUMP_LEN, VideoMemory};
use crate::merge::{
    self, BACKDROP_PEN, DEPTH_BEHIND_PEN, DEPTH_FOREGROUND_PEN, DEPTH_FRONT_PEN, FinalFrame,
    MergeArgs,
};
use crate::render::{
    CompositeBuffer, CompositorArgs, CompositorState, ReelCompositor, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::tiles::Layer;
use bincode::error::{DecodeError, EncodeError};
use reelvdp_config::{DebugView, ReelVideoConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReelVdpError {
    #[error("{layer:?} graphics ROM is {len} bytes, expected a non-zero multiple of {tile_len}")]
    GfxRomSize { layer: Layer, len: usize, tile_len: usize },
    #[error("Video RAM dump is {actual} bytes, expected {expected}")]
    VramDumpSize { expected: usize, actual: usize },
    #[error("Palette dump is {actual} bytes, expected {expected}")]
    PaletteDumpSize { expected: usize, actual: usize },
    #[error("Error encoding save state: {0}")]
    SaveStateEncode(#[from] EncodeError),
    #[error("Error decoding save state: {0}")]
    SaveStateDecode(#[from] DecodeError),
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    #[must_use]
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

pub const FRAME_SIZE: FrameSize =
    FrameSize { width: SCREEN_WIDTH as u32, height: SCREEN_HEIGHT as u32 };

pub trait Renderer {
    type Err;

    /// Display a frame. `frame_buffer` holds exactly `width * height` colors in row-major order.
    ///
    /// # Errors
    ///
    /// This method will return an error if it is unable to display the frame.
    fn render_frame(&mut self, frame_buffer: &[Color], frame_size: FrameSize)
    -> Result<(), Self::Err>;
}

// Fixed colors for the depth tag debug view
const DEPTH_VIEW_COLORS: [Color; 4] = [
    Color::BLACK,
    Color::rgb(0x20, 0x60, 0xFF),
    Color::rgb(0xFF, 0x40, 0x20),
    Color::rgb(0x80, 0x80, 0x80),
];

/// Reel video hardware: owns all CPU-visible video state, both graphics ROMs, and the buffers
/// used to build each frame.
#[derive(Debug, Clone)]
pub struct ReelVideo {
    memory: VideoMemory,
    fg_gfx: GfxRom,
    reel_gfx: GfxRom,
    compositor: ReelCompositor,
    composite: CompositeBuffer,
    frame: FinalFrame,
    rgb_frame: Vec<Color>,
    frame_count: u64,
    config: ReelVideoConfig,
}

impl ReelVideo {
    #[must_use]
    pub fn new(fg_gfx: GfxRom, reel_gfx: GfxRom, config: ReelVideoConfig) -> Self {
        log::info!("Creating reel video with config:\n{config}");

        Self {
            memory: VideoMemory::new(),
            fg_gfx,
            reel_gfx,
            compositor: ReelCompositor::new(),
            composite: CompositeBuffer::new(),
            frame: FinalFrame::new(),
            rgb_frame: vec![Color::BLACK; SCREEN_WIDTH * SCREEN_HEIGHT],
            frame_count: 0,
            config,
        }
    }

    #[must_use]
    pub fn memory(&self) -> &VideoMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut VideoMemory {
        &mut self.memory
    }

    #[must_use]
    pub fn read_vram(&self, address: u16) -> u8 {
        self.memory.read_vram(address)
    }

    pub fn write_vram(&mut self, address: u16, value: u8) {
        self.memory.write_vram(address, value);
    }

    pub fn write_vram_word(&mut self, address: u16, value: u16) {
        self.memory.write_vram_word(address, value);
    }

    #[must_use]
    pub fn read_scroll_register(&self, register: usize) -> u8 {
        self.memory.scroll.read_register(register)
    }

    pub fn write_scroll_register(&mut self, register: usize, value: u8) {
        self.memory.scroll.write_register(register, value);
    }

    pub fn write_palette_index(&mut self, index: u8) {
        self.memory.palette.write_index(index);
    }

    pub fn write_palette_data(&mut self, value: u8) {
        self.memory.palette.write_data(value);
    }

    pub fn read_palette_data(&mut self) -> u8 {
        self.memory.palette.read_data()
    }

    /// Load a dump of the whole video RAM window.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump is not exactly [`VRAM_DUMP_LEN`] bytes.
    pub fn load_vram_dump(&mut self, dump: &[u8]) -> Result<(), ReelVdpError> {
        if dump.len() != VRAM_DUMP_LEN {
            return Err(ReelVdpError::VramDumpSize { expected: VRAM_DUMP_LEN, actual: dump.len() });
        }

        self.memory.load_vram_dump(dump);
        Ok(())
    }

    /// Load a dump of 256 palette entries, 3 bytes each.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump is the wrong size.
    pub fn load_palette_dump(&mut self, dump: &[u8]) -> Result<(), ReelVdpError> {
        self.memory.palette.load_dump(dump)
    }

    /// Build the next frame without handing it to a display sink.
    pub fn update_frame(&mut self) {
        self.memory.tiles.refresh();

        let enabled = self.config.reels_enabled;
        self.compositor.run_frame(
            &CompositorArgs {
                tiles: &self.memory.tiles,
                scroll: &self.memory.scroll,
                line_select: &self.memory.line_select,
                reel_gfx: &self.reel_gfx,
                reels_enabled: enabled,
            },
            &mut self.composite,
        );

        debug_assert_eq!(self.compositor.state(), CompositorState::Done);

        merge::merge_frame(
            &MergeArgs {
                composite: &self.composite,
                tiles: &self.memory.tiles,
                scroll: &self.memory.scroll,
                fg_gfx: &self.fg_gfx,
                foreground_enabled: self.config.foreground_enabled,
                debug_view: self.config.debug_view,
            },
            &mut self.frame,
        );

        self.convert_to_rgb();
        self.frame_count += 1;

        log::debug!("Rendered frame {}", self.frame_count);
    }

    /// Build the next frame and pass it to the renderer.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by the renderer.
    pub fn render_frame<R: Renderer>(&mut self, renderer: &mut R) -> Result<(), R::Err> {
        self.update_frame();
        renderer.render_frame(&self.rgb_frame, FRAME_SIZE)
    }

    fn convert_to_rgb(&mut self) {
        let palette = &self.memory.palette;
        let debug_view = self.config.debug_view;
        let backdrop_enabled = self.config.backdrop_enabled;

        for (&pen, color) in self.frame.iter().zip(&mut self.rgb_frame) {
            *color = if debug_view == DebugView::DepthTags {
                debug_assert!(
                    [BACKDROP_PEN, DEPTH_BEHIND_PEN, DEPTH_FRONT_PEN, DEPTH_FOREGROUND_PEN]
                        .contains(&pen)
                );
                DEPTH_VIEW_COLORS[usize::from(pen) % DEPTH_VIEW_COLORS.len()]
            } else if pen == BACKDROP_PEN && !backdrop_enabled {
                Color::BLACK
            } else {
                palette.color(pen)
            };
        }
    }

    #[must_use]
    pub fn composite_buffer(&self) -> &CompositeBuffer {
        &self.composite
    }

    #[must_use]
    pub fn final_frame(&self) -> &FinalFrame {
        &self.frame
    }

    #[must_use]
    pub fn rgb_frame(&self) -> &[Color] {
        &self.rgb_frame
    }

    /// Line selection that applies to screen scanline `scanline` with the current state.
    #[must_use]
    pub fn line_selection(&self, scanline: u16) -> LineSelection {
        self.memory.line_select.select(&self.memory.scroll, scanline)
    }

    /// Line selections used while compositing the most recent frame.
    #[must_use]
    pub fn last_frame_selections(&self) -> &[LineSelection] {
        self.compositor.selections()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn config(&self) -> &ReelVideoConfig {
        &self.config
    }

    pub fn reload_config(&mut self, config: ReelVideoConfig) {
        log::info!("Reloaded config:\n{config}");
        self.config = config;
    }

    /// Power-cycle: clears all video RAM, scroll registers, palette and buffers. Graphics ROMs and
    /// config are kept.
    pub fn hard_reset(&mut self) {
        log::info!("Hard resetting reel video");

        self.memory.clear();
        self.compositor = ReelCompositor::new();
        self.composite.fill(0);
        self.frame.fill(BACKDROP_PEN);
        self.rgb_frame.fill(Color::BLACK);
        self.frame_count = 0;
    }

    /// Serialize all CPU-visible video state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded.
    pub fn save_state(&self) -> Result<Vec<u8>, ReelVdpError> {
        let bytes = bincode::encode_to_vec(&self.memory, bincode::config::standard())?;
        log::info!("Saved state ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Restore state produced by [`Self::save_state`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid save state; the current state is unchanged.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), ReelVdpError> {
        let (memory, _): (VideoMemory, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())?;
        self.memory = memory;

        log::info!("Loaded state ({} bytes)", bytes.len());
        Ok(())
    }
}
