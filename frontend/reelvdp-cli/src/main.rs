use clap::Parser;
use env_logger::Env;
use reelvdp_config::{DebugView, NUM_REELS, ReelVideoConfig};
use reelvdp_core::scroll::GlobalScroll;
use reelvdp_core::{Color, FrameSize, GfxRom, Layer, ReelVideo, Renderer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const SCROLL_OPTIONS_HEADING: &str = "Scroll Options";
const VIDEO_OPTIONS_HEADING: &str = "Video Options";

/// Global scroll register pair, written as `X,Y`. Each value is decimal or `0x`-prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScrollPair {
    x: u16,
    y: u16,
}

fn parse_scroll_value(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let result = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    result.map_err(|err| format!("invalid scroll value '{s}': {err}"))
}

impl FromStr for ScrollPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) =
            s.split_once(',').ok_or_else(|| format!("expected scroll pair as X,Y; was '{s}'"))?;
        Ok(Self { x: parse_scroll_value(x)?, y: parse_scroll_value(y)? })
    }
}

#[derive(Parser)]
struct Args {
    /// Foreground graphics ROM, 64 bytes per 8x8 tile
    #[arg(long)]
    fg_gfx: PathBuf,

    /// Reel graphics ROM, 256 bytes per 8x32 tile
    #[arg(long)]
    reel_gfx: PathBuf,

    /// Video RAM dump covering tile cells, scroll tables and the line select table
    #[arg(long)]
    vram: Option<PathBuf>,

    /// Palette dump, 256 entries of 3 bytes (R, G, B; 6 bits each)
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Save state to load after any dumps
    #[arg(long)]
    state: Option<PathBuf>,

    /// Output PNG path
    #[arg(short = 'o', long, default_value = "frame.png")]
    output: PathBuf,

    /// Number of frames to render; only the last is written
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    frames: u32,

    /// Write a save state after rendering
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Log the line selection used for every scanline of the last frame
    #[arg(long, default_value_t)]
    dump_line_selections: bool,

    /// Foreground global scroll (X,Y)
    #[arg(long, help_heading = SCROLL_OPTIONS_HEADING)]
    fg_scroll: Option<ScrollPair>,

    /// Reel global scroll (X,Y)
    #[arg(long, help_heading = SCROLL_OPTIONS_HEADING)]
    reel_scroll: Option<ScrollPair>,

    /// TOML video config file; command-line options override it
    #[arg(long, help_heading = VIDEO_OPTIONS_HEADING)]
    config: Option<PathBuf>,

    /// Debug view (Normal / ReelsOnly / ForegroundOnly / DepthTags)
    #[arg(long, help_heading = VIDEO_OPTIONS_HEADING)]
    debug_view: Option<DebugView>,

    /// Disable a reel layer (0-3); may be repeated
    #[arg(
        long = "disable-reel",
        value_parser = clap::value_parser!(u8).range(0..NUM_REELS as i64),
        help_heading = VIDEO_OPTIONS_HEADING
    )]
    disabled_reels: Vec<u8>,

    /// Disable the foreground layer
    #[arg(
        long = "disable-foreground",
        default_value_t = true,
        action = clap::ArgAction::SetFalse,
        help_heading = VIDEO_OPTIONS_HEADING
    )]
    foreground_enabled: bool,

    /// Display the backdrop pen as black instead of palette entry 0
    #[arg(
        long = "disable-backdrop",
        default_value_t = true,
        action = clap::ArgAction::SetFalse,
        help_heading = VIDEO_OPTIONS_HEADING
    )]
    backdrop_enabled: bool,
}

impl Args {
    fn video_config(&self) -> Result<ReelVideoConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let config_str = fs::read_to_string(path).map_err(|source| CliError::FileRead {
                    path: path.display().to_string(),
                    source,
                })?;
                toml::from_str(&config_str).map_err(|source| CliError::ConfigParse {
                    path: path.display().to_string(),
                    source,
                })?
            }
            None => ReelVideoConfig::default(),
        };

        for &reel in &self.disabled_reels {
            config.reels_enabled[usize::from(reel)] = false;
        }
        config.foreground_enabled &= self.foreground_enabled;
        config.backdrop_enabled &= self.backdrop_enabled;
        if let Some(debug_view) = self.debug_view {
            config.debug_view = debug_view;
        }

        Ok(config)
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Error reading '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Error writing '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Error parsing config file '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Frame buffer of {len} colors does not match frame size {width}x{height}")]
    FrameBufferSize { len: usize, width: u32, height: u32 },
    #[error("Error writing PNG to '{path}': {source}")]
    PngWrite {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path)
        .map_err(|source| CliError::FileRead { path: path.display().to_string(), source })
}

/// Writes each rendered frame to a PNG file.
struct PngRenderer {
    path: PathBuf,
}

impl Renderer for PngRenderer {
    type Err = CliError;

    fn render_frame(
        &mut self,
        frame_buffer: &[Color],
        frame_size: FrameSize,
    ) -> Result<(), Self::Err> {
        let FrameSize { width, height } = frame_size;

        let rgba: Vec<u8> = bytemuck::cast_slice(frame_buffer).to_vec();
        let image = image::RgbaImage::from_raw(width, height, rgba).ok_or(
            CliError::FrameBufferSize { len: frame_buffer.len(), width, height },
        )?;

        image.save(&self.path).map_err(|source| CliError::PngWrite {
            path: self.path.display().to_string(),
            source,
        })?;

        log::info!("Wrote {width}x{height} frame to '{}'", self.path.display());
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = args.video_config()?;

    let fg_gfx = GfxRom::new(Layer::Foreground, read_file(&args.fg_gfx)?)?;
    let reel_gfx = GfxRom::new(Layer::Reel(0), read_file(&args.reel_gfx)?)?;
    log::info!(
        "Loaded {} foreground tiles and {} reel tiles",
        fg_gfx.num_tiles(),
        reel_gfx.num_tiles()
    );

    let mut video = ReelVideo::new(fg_gfx, reel_gfx, config);

    if let Some(path) = &args.vram {
        video.load_vram_dump(&read_file(path)?)?;
    }

    if let Some(path) = &args.palette {
        video.load_palette_dump(&read_file(path)?)?;
    }

    if let Some(path) = &args.state {
        video.load_state(&read_file(path)?)?;
    }

    let scroll = &mut video.memory_mut().scroll;
    if let Some(ScrollPair { x, y }) = args.fg_scroll {
        scroll.set_global(GlobalScroll::ForegroundX, x);
        scroll.set_global(GlobalScroll::ForegroundY, y);
    }
    if let Some(ScrollPair { x, y }) = args.reel_scroll {
        scroll.set_global(GlobalScroll::ReelX, x);
        scroll.set_global(GlobalScroll::ReelY, y);
    }

    for _ in 1..args.frames {
        video.update_frame();
    }

    let mut renderer = PngRenderer { path: args.output.clone() };
    video.render_frame(&mut renderer)?;

    if args.dump_line_selections {
        for (scanline, selection) in video.last_frame_selections().iter().enumerate() {
            log::info!(
                "Scanline {scanline:3}: line {:3} select {:02X} row_sel {} row_sel2 {}",
                selection.line,
                selection.select_byte,
                selection.row_sel,
                selection.row_sel2
            );
        }
    }

    if let Some(path) = &args.save_state {
        let state = video.save_state()?;
        fs::write(path, state).map_err(|source| CliError::FileWrite {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Wrote save state to '{}'", path.display());
    }

    Ok(())
}
