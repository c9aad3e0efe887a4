use crate::api::{Color, FrameSize, ReelVdpError, ReelVideo, Renderer};
use crate::gfx::GfxRom;
use crate::memory::VideoMemory;
use crate::render::{
    CompositeBuffer, CompositorArgs, FRONT_TAG, ReelCompositor, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::scroll::GlobalScroll;
use crate::tiles::{FG_CELLS, FG_COLS, Layer, NUM_REELS, REEL_CELLS, REEL_COLS};
use reelvdp_config::{DebugView, ReelVideoConfig};
use test_log::test;

const FG_BLANK_CODE_PEN: u8 = 0x55;
const FG_SOLID_PEN: u8 = 0x77;
const FG_STRIPE_PEN: u8 = 0x66;
const FG_GRADIENT_BASE_PEN: u8 = 0x80;
const SOLID_REEL_PEN: u8 = 0x21;

const LINE_SELECT_BASE: u16 = 0x6600;

// Pen encodes the tile (top 2 bits), the row within the tile modulo 8, and the column
fn layered_reel_pen(tile: u16, col: u16, row: u16) -> u8 {
    (0x40 * (tile % 4) + 8 * (row % 8) + col) as u8
}

// Pen depends only on tile and column, so every scanline of a uniform layer looks the same
fn column_reel_pen(tile: u16, col: u16, _row: u16) -> u8 {
    (0x10 * (tile + 1) + col) as u8
}

fn solid_reel_pen(_tile: u16, _col: u16, _row: u16) -> u8 {
    SOLID_REEL_PEN
}

fn reel_rom(pen: fn(u16, u16, u16) -> u8) -> GfxRom {
    let mut rom = Vec::with_capacity(4 * 256);
    for tile in 0..4 {
        for row in 0..32 {
            for col in 0..8 {
                rom.push(pen(tile, col, row));
            }
        }
    }
    GfxRom::new(Layer::Reel(0), rom).unwrap()
}

// Tile 0: solid, but tile code 0 is never drawn
// Tile 1: solid opaque
// Tile 2: transparent on even columns
// Tile 3: opaque, pen encodes row and column
fn fg_rom() -> GfxRom {
    let mut rom = vec![0; 4 * 64];
    rom[..64].fill(FG_BLANK_CODE_PEN);
    rom[64..128].fill(FG_SOLID_PEN);
    for row in 0..8 {
        for col in 0..8 {
            rom[128 + row * 8 + col] = if col % 2 == 0 { 0 } else { FG_STRIPE_PEN };
            rom[192 + row * 8 + col] = fg_gradient_pen(col, row);
        }
    }
    GfxRom::new(Layer::Foreground, rom).unwrap()
}

fn fg_gradient_pen(col: usize, row: usize) -> u8 {
    FG_GRADIENT_BASE_PEN + (8 * (row % 8) + col % 8) as u8
}

fn video_with_reel_gfx(reel_gfx: GfxRom) -> ReelVideo {
    ReelVideo::new(fg_rom(), reel_gfx, ReelVideoConfig::default())
}

fn fill_reel(memory: &mut VideoMemory, reel: usize, word: u16) {
    for i in 0..REEL_CELLS {
        memory.tiles.set_cell(Layer::Reel(reel), i, word);
    }
}

fn fill_foreground(memory: &mut VideoMemory, word: u16) {
    for i in 0..FG_CELLS {
        memory.tiles.set_cell(Layer::Foreground, i, word);
    }
}

fn fill_line_select(video: &mut ReelVideo, value: impl Fn(u16) -> u8) {
    for line in 0..512 {
        video.write_vram(LINE_SELECT_BASE + line, value(line));
    }
}

// Reel layer N is filled with tile N so that composite output identifies its source layer
fn new_video(reel_pen: fn(u16, u16, u16) -> u8) -> ReelVideo {
    let mut video = ReelVideo::new(fg_rom(), reel_rom(reel_pen), ReelVideoConfig::default());
    for reel in 0..NUM_REELS {
        fill_reel(video.memory_mut(), reel, reel as u16);
    }
    video
}

fn composite_rows(video: &ReelVideo) -> Vec<Vec<u16>> {
    (0..SCREEN_HEIGHT).map(|y| video.composite_buffer().row(y)[..SCREEN_WIDTH].to_vec()).collect()
}

#[test]
fn all_zero_state_shows_reel_0_on_every_line() {
    let mut video = new_video(layered_reel_pen);
    video.update_frame();

    assert_eq!(video.last_frame_selections().len(), SCREEN_HEIGHT);
    assert!(video.last_frame_selections().iter().all(|s| s.row_sel == 0 && s.row_sel2 == 0));

    for zz in 0..SCREEN_HEIGHT {
        let row = &video.composite_buffer().row(zz)[..SCREEN_WIDTH];
        for (x, &value) in row.iter().enumerate() {
            // Both reel global offsets carry an 8 pixel bias
            let expected = layered_reel_pen(0, ((x + 8) % 8) as u16, ((zz + 8) % 32) as u16);
            assert_eq!(value, u16::from(expected), "scanline {zz} pixel {x}");
        }
    }
}

#[test]
fn all_zero_state_is_identical_across_frame() {
    let mut video = new_video(column_reel_pen);
    video.update_frame();

    let rows = composite_rows(&video);
    assert!(rows.iter().all(|row| row == &rows[0]));
    assert!(rows[0].iter().all(|&value| value >> 4 == 1));
}

#[test]
fn alternating_bands_use_their_own_row_scroll() {
    let mut video = new_video(column_reel_pen);

    // Cancel the 8 pixel bias so that table line == scanline
    video.memory_mut().scroll.set_global(GlobalScroll::ReelY, 0_u16.wrapping_sub(8));
    fill_line_select(&mut video, |line| if (line / 8) % 2 == 0 { 0x00 } else { 0x0F });

    for block in 0..64 {
        let scroll = &mut video.memory_mut().scroll;
        scroll.set_reel_row_scroll(0, block, block as u16);
        scroll.set_reel_row_scroll(3, block, 2 * block as u16 + 1);
        // Never selected for scroll
        scroll.set_reel_row_scroll(1, block, 0x1234);
        scroll.set_reel_row_scroll(2, block, 0x0777);
    }

    video.update_frame();

    for zz in 0..SCREEN_HEIGHT {
        let band = zz / 8;
        let (reel, row_scroll) = if band % 2 == 0 { (0, band) } else { (3, 2 * band + 1) };

        let row = &video.composite_buffer().row(zz)[..SCREEN_WIDTH];
        for (x, &value) in row.iter().enumerate() {
            let col = ((x + 8 + row_scroll) % 8) as u16;
            assert_eq!(value, u16::from(column_reel_pen(reel, col, 0)), "scanline {zz} pixel {x}");
        }
    }
}

#[test]
fn second_select_draws_over_first_with_first_selects_scroll() {
    let mut video = new_video(column_reel_pen);

    // row_sel = 0, row_sel2 = 3
    fill_line_select(&mut video, |_| 0x0C);
    for block in 0..64 {
        video.memory_mut().scroll.set_reel_row_scroll(0, block, 2);
        video.memory_mut().scroll.set_reel_row_scroll(3, block, 5);
    }

    video.update_frame();

    for zz in 0..SCREEN_HEIGHT {
        let row = &video.composite_buffer().row(zz)[..SCREEN_WIDTH];
        for (x, &value) in row.iter().enumerate() {
            let col = ((x + 8 + 2) % 8) as u16;
            assert_eq!(value, u16::from(column_reel_pen(3, col, 0)), "scanline {zz} pixel {x}");
        }
    }
}

#[test]
fn line_select_entry_is_sole_determinant_of_scanline() {
    let mut video = new_video(layered_reel_pen);
    fill_line_select(&mut video, |line| (line % 4) as u8 * 5);
    video.update_frame();
    let before = composite_rows(&video);

    // With zero reel Y scroll, scanlines 0-287 read table lines 8-295
    for line in (0..8).chain(296..512) {
        video.write_vram(LINE_SELECT_BASE + line, 0x0F);
    }
    video.update_frame();
    assert_eq!(composite_rows(&video), before);

    // Scanline 10 reads table line 18
    video.write_vram(LINE_SELECT_BASE + 18, 0x0F);
    video.update_frame();
    let after = composite_rows(&video);

    for zz in 0..SCREEN_HEIGHT {
        if zz == 10 {
            assert_ne!(after[zz], before[zz]);
            assert!(after[zz].iter().all(|&value| value >> 6 == 3));
        } else {
            assert_eq!(after[zz], before[zz], "scanline {zz}");
        }
    }
}

#[test]
fn drawing_same_reel_twice_is_idempotent() {
    let reel_gfx = reel_rom(layered_reel_pen);

    let mut memory = VideoMemory::new();
    fill_reel(&mut memory, 1, 0x4001);
    for i in 0..512 {
        memory.line_select.set(i, 0x05);
    }
    for col in 0..REEL_COLS {
        memory.scroll.set_reel_col_scroll(1, col, 7 * col as u16);
        memory.scroll.set_reel_row_scroll(1, col, 3 * col as u16);
    }
    memory.tiles.refresh();

    let args = CompositorArgs {
        tiles: &memory.tiles,
        scroll: &memory.scroll,
        line_select: &memory.line_select,
        reel_gfx: &reel_gfx,
        reels_enabled: [true; NUM_REELS],
    };

    let mut compositor = ReelCompositor::new();
    let mut buffer = CompositeBuffer::new();
    compositor.begin_frame(&mut buffer);

    for zz in 0..SCREEN_HEIGHT {
        compositor.step(&args, &mut buffer);
        let once = buffer.row(zz).to_vec();

        compositor.draw_strip(&args, &mut buffer, 1, zz as u16);
        assert_eq!(buffer.row(zz), once.as_slice(), "scanline {zz}");
    }
}

#[test]
fn column_scroll_wraps_modulo_layer_height() {
    let mut video = new_video(layered_reel_pen);

    for col in 0..REEL_COLS {
        let value = 511_u16.wrapping_add(2);
        video.memory_mut().scroll.set_reel_col_scroll(0, col, value);
    }
    video.update_frame();
    let wrapped = composite_rows(&video);

    for col in 0..REEL_COLS {
        video.memory_mut().scroll.set_reel_col_scroll(0, col, 1);
    }
    video.update_frame();
    assert_eq!(composite_rows(&video), wrapped);

    for col in 0..REEL_COLS {
        video.memory_mut().scroll.set_reel_col_scroll(0, col, 0);
    }
    video.update_frame();
    assert_ne!(composite_rows(&video), wrapped);
}

#[test]
fn columns_scroll_independently() {
    let mut video = new_video(layered_reel_pen);
    video.memory_mut().scroll.set_reel_col_scroll(0, 5, 3);
    video.update_frame();

    for zz in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let map_col = (x + 8) / 8;
            let col_scroll = if map_col == 5 { 3 } else { 0 };
            let expected = layered_reel_pen(0, (x % 8) as u16, ((zz + 8 + col_scroll) % 32) as u16);
            assert_eq!(video.composite_buffer().get(x, zz), u16::from(expected));
        }
    }
}

#[test]
fn reel_priority_flag_orders_against_foreground() {
    let mut video = video_with_reel_gfx(reel_rom(solid_reel_pen));
    fill_foreground(video.memory_mut(), 1);

    // Left half of reel 0 behind the foreground, right half in front
    for row in 0..16 {
        for col in 0..REEL_COLS {
            let word = if col < 32 { 0x0000 } else { 0x4000 };
            video.memory_mut().tiles.set_cell(Layer::Reel(0), row * REEL_COLS + col, word);
        }
    }

    video.update_frame();

    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let in_front = ((x + 8) % 512) / 8 >= 32;
            let composite = video.composite_buffer().get(x, y);
            if in_front {
                assert_eq!(composite, u16::from(SOLID_REEL_PEN) | FRONT_TAG);
                assert_eq!(video.final_frame().get(x, y), SOLID_REEL_PEN);
            } else {
                assert_eq!(composite, u16::from(SOLID_REEL_PEN));
                assert_eq!(video.final_frame().get(x, y), FG_SOLID_PEN);
            }
        }
    }
}

#[test]
fn behind_reels_show_through_transparent_foreground_pixels() {
    let mut video = video_with_reel_gfx(reel_rom(solid_reel_pen));
    fill_foreground(video.memory_mut(), 2);
    video.update_frame();

    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let expected = if x % 2 == 0 { SOLID_REEL_PEN } else { FG_STRIPE_PEN };
            assert_eq!(video.final_frame().get(x, y), expected);
        }
    }
}

#[test]
fn foreground_tile_zero_never_occludes_reels() {
    for reel_word in [0x0000, 0x4000] {
        let mut video = video_with_reel_gfx(reel_rom(solid_reel_pen));
        fill_foreground(video.memory_mut(), 1);
        fill_reel(video.memory_mut(), 0, reel_word);

        // Cell at row 1, column 2 covers screen pixels (16..24, 8..16)
        video.memory_mut().tiles.set_cell(Layer::Foreground, FG_COLS + 2, 0x0000);
        video.update_frame();

        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let in_hole = (16..24).contains(&x) && (8..16).contains(&y);
                let expected = if in_hole || reel_word & 0x4000 != 0 {
                    SOLID_REEL_PEN
                } else {
                    FG_SOLID_PEN
                };
                assert_eq!(video.final_frame().get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn foreground_scroll_and_flip() {
    let mut video = video_with_reel_gfx(GfxRom::empty(Layer::Reel(0)));
    fill_foreground(video.memory_mut(), 2);

    // Rows of tilemap row 1 shift by one pixel, which moves the stripe phase
    video.memory_mut().scroll.set_fg_row_scroll(1, 1);
    video.update_frame();

    for x in 0..16 {
        let row_0 = if x % 2 == 0 { 0 } else { FG_STRIPE_PEN };
        let row_1 = if x % 2 == 0 { FG_STRIPE_PEN } else { 0 };
        assert_eq!(video.final_frame().get(x, 0), row_0);
        assert_eq!(video.final_frame().get(x, 8), row_1);
    }

    // Flipping X also swaps the stripe phase
    fill_foreground(video.memory_mut(), 0x8002);
    video.memory_mut().scroll.set_fg_row_scroll(1, 0);
    video.update_frame();
    for x in 0..16 {
        let expected = if x % 2 == 0 { FG_STRIPE_PEN } else { 0 };
        assert_eq!(video.final_frame().get(x, 0), expected);
    }
}

#[test]
fn foreground_flip_y_reverses_tile_rows() {
    let mut video = video_with_reel_gfx(GfxRom::empty(Layer::Reel(0)));
    fill_foreground(video.memory_mut(), 3);
    // Flip Y on the top-left cell only
    video.memory_mut().tiles.set_cell(Layer::Foreground, 0, 0x4003);
    video.update_frame();

    for y in 0..8 {
        for x in 0..16 {
            let row = if x < 8 { 7 - y } else { y };
            assert_eq!(video.final_frame().get(x, y), fg_gradient_pen(x, row), "pixel ({x}, {y})");
        }
    }

    // Both flips together
    video.memory_mut().tiles.set_cell(Layer::Foreground, 0, 0xC003);
    video.update_frame();
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(video.final_frame().get(x, y), fg_gradient_pen(7 - x, 7 - y));
        }
    }
}

#[test]
fn foreground_global_scroll() {
    let mut video = video_with_reel_gfx(GfxRom::empty(Layer::Reel(0)));
    fill_foreground(video.memory_mut(), 3);
    // Solid marker at tilemap row 4, column 5
    video.memory_mut().tiles.set_cell(Layer::Foreground, 4 * FG_COLS + 5, 1);

    // Foreground offsets are used without the reel 8 pixel bias
    video.write_scroll_register(0, 11);
    video.write_scroll_register(2, 21);
    video.update_frame();

    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let (map_x, map_y) = (x + 11, y + 21);
            let expected = if map_x / 8 == 5 && map_y / 8 == 4 {
                FG_SOLID_PEN
            } else {
                fg_gradient_pen(map_x, map_y)
            };
            assert_eq!(video.final_frame().get(x, y), expected, "pixel ({x}, {y})");
        }
    }

    // X wraps at 1024 pixels and Y at 512
    video.write_scroll_register(1, 0x04);
    video.write_scroll_register(3, 0x02);
    video.update_frame();
    assert_eq!(video.final_frame().get(29, 11), FG_SOLID_PEN);
    assert_eq!(video.final_frame().get(28, 11), fg_gradient_pen(39, 32));
}

#[test]
fn reel_flip_x_reverses_tile_columns() {
    let mut video = new_video(column_reel_pen);
    fill_reel(video.memory_mut(), 0, 0x8000);
    video.update_frame();

    for zz in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let col = 7 - ((x + 8) % 8) as u16;
            let expected = u16::from(column_reel_pen(0, col, 0));
            assert_eq!(video.composite_buffer().get(x, zz), expected, "pixel ({x}, {zz})");
        }
    }
}

#[test]
fn reel_global_x_scroll_shifts_every_line() {
    let mut video = new_video(column_reel_pen);
    // Reel 0 column N holds tile N % 4 so whole-tile shifts are visible
    for row in 0..16 {
        for col in 0..REEL_COLS {
            let index = row * REEL_COLS + col;
            video.memory_mut().tiles.set_cell(Layer::Reel(0), index, (col % 4) as u16);
        }
    }

    let reel_x: usize = 0x1F5;
    video.memory_mut().scroll.set_global(GlobalScroll::ReelX, reel_x as u16);
    for block in 0..64 {
        video.memory_mut().scroll.set_reel_row_scroll(0, block, 4);
    }
    video.update_frame();

    for zz in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let map_x = (x + reel_x + 8 + 4) & 0x1FF;
            let tile = ((map_x / 8) % 4) as u16;
            let expected = u16::from(column_reel_pen(tile, (map_x % 8) as u16, 0));
            assert_eq!(video.composite_buffer().get(x, zz), expected, "pixel ({x}, {zz})");
        }
    }
}

#[test]
fn disabled_reel_leaves_lines_cleared() {
    let mut video = new_video(column_reel_pen);
    fill_line_select(&mut video, |line| if line % 2 == 0 { 0x00 } else { 0x05 });
    video.reload_config(ReelVideoConfig {
        reels_enabled: [true, false, true, true],
        ..ReelVideoConfig::default()
    });
    video.update_frame();

    for zz in 0..SCREEN_HEIGHT {
        // Table line is scanline + 8, so even scanlines select reel 0
        let row = &video.composite_buffer().row(zz)[..SCREEN_WIDTH];
        if zz % 2 == 0 {
            assert!(row.iter().all(|&value| value >> 4 == 1));
        } else {
            assert!(row.iter().all(|&value| value == 0));
        }
    }
}

#[test]
fn debug_views() {
    let mut video = video_with_reel_gfx(reel_rom(solid_reel_pen));
    fill_foreground(video.memory_mut(), 2);
    fill_reel(video.memory_mut(), 0, 0x4000);

    video.reload_config(ReelVideoConfig {
        debug_view: DebugView::ForegroundOnly,
        ..ReelVideoConfig::default()
    });
    video.update_frame();
    assert_eq!(video.final_frame().get(0, 0), 0);
    assert_eq!(video.final_frame().get(1, 0), FG_STRIPE_PEN);

    video.reload_config(ReelVideoConfig {
        debug_view: DebugView::ReelsOnly,
        ..ReelVideoConfig::default()
    });
    video.update_frame();
    assert!(video.final_frame().iter().all(|&pen| pen == SOLID_REEL_PEN));

    video.reload_config(ReelVideoConfig {
        debug_view: DebugView::DepthTags,
        ..ReelVideoConfig::default()
    });
    video.update_frame();
    assert!(video.final_frame().iter().all(|&pen| pen == 2));
    assert!(video.rgb_frame().iter().all(|&color| color == Color::rgb(0xFF, 0x40, 0x20)));
}

#[test]
fn palette_port_drives_rgb_output() {
    let mut video = video_with_reel_gfx(GfxRom::empty(Layer::Reel(0)));
    fill_foreground(video.memory_mut(), 1);
    video.memory_mut().tiles.set_cell(Layer::Foreground, 0, 0);

    video.write_palette_index(0);
    for value in [0x00, 0x00, 0x3F] {
        video.write_palette_data(value);
    }
    video.write_palette_index(FG_SOLID_PEN);
    for value in [0x3F, 0x00, 0x00] {
        video.write_palette_data(value);
    }

    video.update_frame();
    assert_eq!(video.rgb_frame()[0], Color::rgb(0, 0, 0xFF));
    assert_eq!(video.rgb_frame()[8], Color::rgb(0xFF, 0, 0));

    video.reload_config(ReelVideoConfig {
        backdrop_enabled: false,
        ..ReelVideoConfig::default()
    });
    video.update_frame();
    assert_eq!(video.rgb_frame()[0], Color::BLACK);
    assert_eq!(video.rgb_frame()[8], Color::rgb(0xFF, 0, 0));
}

#[derive(Default)]
struct CaptureRenderer {
    frames: Vec<(Vec<Color>, FrameSize)>,
}

impl Renderer for CaptureRenderer {
    type Err = String;

    fn render_frame(
        &mut self,
        frame_buffer: &[Color],
        frame_size: FrameSize,
    ) -> Result<(), String> {
        self.frames.push((frame_buffer.to_vec(), frame_size));
        Ok(())
    }
}

struct ClosedRenderer;

impl Renderer for ClosedRenderer {
    type Err = String;

    fn render_frame(&mut self, _: &[Color], _: FrameSize) -> Result<(), String> {
        Err("display closed".into())
    }
}

#[test]
fn renderer_receives_full_frame() {
    let mut video = new_video(layered_reel_pen);
    let mut renderer = CaptureRenderer::default();

    video.render_frame(&mut renderer).unwrap();
    video.render_frame(&mut renderer).unwrap();

    assert_eq!(renderer.frames.len(), 2);
    let (frame, size) = &renderer.frames[1];
    assert_eq!(*size, FrameSize { width: 512, height: 288 });
    assert_eq!(frame.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
    assert_eq!(video.frame_count(), 2);

    assert_eq!(video.render_frame(&mut ClosedRenderer), Err(String::from("display closed")));
}

#[test]
fn save_state_round_trip() {
    let mut video = new_video(layered_reel_pen);
    video.write_vram_word(0x4802, 0xC123);
    video.write_vram(LINE_SELECT_BASE + 40, 0x0E);
    video.write_scroll_register(6, 0x44);
    video.write_palette_index(9);
    video.write_palette_data(0x2A);

    let state = video.save_state().unwrap();

    video.hard_reset();
    assert_eq!(video.read_vram(0x4803), 0x00);
    assert_eq!(video.read_scroll_register(6), 0x00);

    video.load_state(&state).unwrap();
    assert_eq!(video.read_vram(0x4802), 0x23);
    assert_eq!(video.read_vram(0x4803), 0xC1);
    assert_eq!(video.read_vram(LINE_SELECT_BASE + 40), 0x0E);
    assert_eq!(video.read_scroll_register(6), 0x44);
    video.write_palette_index(9);
    assert_eq!(video.read_palette_data(), 0x2A);

    assert!(matches!(video.load_state(&state[..10]), Err(ReelVdpError::SaveStateDecode(_))));
    assert_eq!(video.read_vram(0x4803), 0xC1);
}

#[test]
fn loaded_state_redecodes_cells() {
    let mut video = video_with_reel_gfx(reel_rom(solid_reel_pen));
    fill_reel(video.memory_mut(), 0, 0x4000);
    let state = video.save_state().unwrap();

    video.hard_reset();
    video.load_state(&state).unwrap();
    video.update_frame();

    let front = u16::from(SOLID_REEL_PEN) | FRONT_TAG;
    assert!(composite_rows(&video).iter().flatten().all(|&value| value == front));
}

#[test]
fn corrupt_palette_latch_rejected_on_load() {
    let mut video = new_video(layered_reel_pen);
    video.write_palette_index(0x30);
    video.write_palette_data(0x11);

    let mut state = video.save_state().unwrap();
    // Palette component latch is the last byte of the state
    *state.last_mut().unwrap() = 7;

    video.write_vram(LINE_SELECT_BASE, 0x05);
    assert!(matches!(video.load_state(&state), Err(ReelVdpError::SaveStateDecode(_))));

    // State is unchanged and the palette port still works
    assert_eq!(video.read_vram(LINE_SELECT_BASE), 0x05);
    video.write_palette_data(0x22);
    video.write_palette_data(0x33);
    video.write_palette_index(0x30);
    assert_eq!(video.read_palette_data(), 0x11);
    assert_eq!(video.read_palette_data(), 0x22);
    assert_eq!(video.read_palette_data(), 0x33);
}

#[test]
fn hard_reset_clears_frame() {
    let mut video = video_with_reel_gfx(reel_rom(solid_reel_pen));
    video.update_frame();
    assert!(video.final_frame().iter().all(|&pen| pen == SOLID_REEL_PEN));

    video.hard_reset();
    assert_eq!(video.frame_count(), 0);
    assert!(video.final_frame().iter().all(|&pen| pen == 0));
    assert!(video.composite_buffer().iter().all(|&value| value == 0));
}

#[test]
fn dump_sizes_checked() {
    let mut video = new_video(layered_reel_pen);
    assert!(matches!(
        video.load_vram_dump(&[0; 16]),
        Err(ReelVdpError::VramDumpSize { expected: 0x6800, actual: 16 })
    ));
    assert!(matches!(
        video.load_palette_dump(&[0; 767]),
        Err(ReelVdpError::PaletteDumpSize { .. })
    ));
    assert!(video.load_vram_dump(&[0; 0x6800]).is_ok());
}
