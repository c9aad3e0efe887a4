//! Reel video hardware used by slot / fruit machine arcade boards: one 8x8-tile foreground layer
//! composited against four tall-tile reel layers whose per-scanline selection and scroll are
//! reprogrammed every frame.

pub mod api;
pub mod gfx;
pub mod lineselect;
pub mod memory;
pub mod merge;
pub mod palette;
pub mod render;
pub mod scroll;
pub mod tiles;

#[cfg(test)]
mod tests;

pub use api::{Color, FRAME_SIZE, FrameSize, ReelVdpError, ReelVideo, Renderer};
pub use gfx::GfxRom;
pub use reelvdp_config::{DebugView, ReelVideoConfig};
pub use render::{SCREEN_HEIGHT, SCREEN_WIDTH};
pub use tiles::Layer;
