use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

pub const FRAME_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const TITLE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const SUBTITLE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

pub const TITLE: &str = "Test Image";
pub const SUBTITLE: &str = "Webcam DIAL App";

/// Rectangle outline corners, inclusive.
pub const FRAME_TOP_LEFT: (i32, i32) = (50, 50);
pub const FRAME_BOTTOM_RIGHT: (i32, i32) = (590, 430);

/// Text anchors are the bottom-left corner of the first glyph.
pub const TITLE_ORIGIN: (i32, i32) = (200, 240);
pub const SUBTITLE_ORIGIN: (i32, i32) = (150, 300);
pub const TITLE_SCALE: u32 = 6;
pub const SUBTITLE_SCALE: u32 = 3;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Builds the synthetic 640x480 frame used by test/demo mode.
pub fn generate() -> RgbImage {
    let mut image = RgbImage::new(WIDTH, HEIGHT);

    let (x0, y0) = FRAME_TOP_LEFT;
    let (x1, y1) = FRAME_BOTTOM_RIGHT;
    // 2 px stroke: outer and inner outlines.
    draw_hollow_rect_mut(
        &mut image,
        Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32),
        FRAME_COLOR,
    );
    draw_hollow_rect_mut(
        &mut image,
        Rect::at(x0 + 1, y0 + 1).of_size((x1 - x0 - 1) as u32, (y1 - y0 - 1) as u32),
        FRAME_COLOR,
    );

    draw_text(&mut image, TITLE, TITLE_ORIGIN, TITLE_SCALE, TITLE_COLOR);
    draw_text(&mut image, SUBTITLE, SUBTITLE_ORIGIN, SUBTITLE_SCALE, SUBTITLE_COLOR);
    image
}

/// Bounding box covered by `text` when drawn at `origin` with `scale`.
pub fn text_bounds(text: &str, origin: (i32, i32), scale: u32) -> Rect {
    let advance = (GLYPH_WIDTH + 1) * scale;
    let width = (text.chars().count() as u32 * advance).saturating_sub(scale).max(1);
    let height = GLYPH_HEIGHT * scale;
    Rect::at(origin.0, origin.1 - height as i32).of_size(width, height)
}

fn draw_text(image: &mut RgbImage, text: &str, origin: (i32, i32), scale: u32, color: Rgb<u8>) {
    let advance = ((GLYPH_WIDTH + 1) * scale) as i32;
    let top = origin.1 - (GLYPH_HEIGHT * scale) as i32;
    for (i, ch) in text.chars().enumerate() {
        let left = origin.0 + i as i32 * advance;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    let x = left + (col * scale) as i32;
                    let y = top + (row as u32 * scale) as i32;
                    draw_filled_rect_mut(image, Rect::at(x, y).of_size(scale, scale), color);
                }
            }
        }
    }
}

// 5x7 cells, one byte per row, bit 4 is the leftmost column.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
        'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'g' => [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'm' => [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        'p' => [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        's' => [0b00000, 0b00000, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
        't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        _ => [0; 7],
    }
}
