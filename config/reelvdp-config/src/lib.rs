use bincode::{Decode, Encode};
use reelvdp_proc_macros::{EnumAll, EnumDisplay, EnumFromStr};
use std::fmt::{Display, Formatter};

pub const NUM_REELS: usize = 4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, EnumDisplay, EnumFromStr, EnumAll,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(reelvdp_proc_macros::CustomValueEnum))]
pub enum DebugView {
    #[default]
    Normal,
    ReelsOnly,
    ForegroundOnly,
    DepthTags,
}

impl DebugView {
    #[must_use]
    pub fn draws_reels(self) -> bool {
        matches!(self, Self::Normal | Self::ReelsOnly | Self::DepthTags)
    }

    #[must_use]
    pub fn draws_foreground(self) -> bool {
        matches!(self, Self::Normal | Self::ForegroundOnly | Self::DepthTags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ReelVideoConfig {
    pub reels_enabled: [bool; NUM_REELS],
    pub foreground_enabled: bool,
    /// If false, the backdrop pen displays as black regardless of palette contents
    pub backdrop_enabled: bool,
    pub debug_view: DebugView,
}

impl Default for ReelVideoConfig {
    fn default() -> Self {
        Self {
            reels_enabled: [true; NUM_REELS],
            foreground_enabled: true,
            backdrop_enabled: true,
            debug_view: DebugView::default(),
        }
    }
}

impl Display for ReelVideoConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "reels_enabled: {:?}", self.reels_enabled)?;
        writeln!(f, "foreground_enabled: {}", self.foreground_enabled)?;
        writeln!(f, "backdrop_enabled: {}", self.backdrop_enabled)?;
        write!(f, "debug_view: {}", self.debug_view)
    }
}
