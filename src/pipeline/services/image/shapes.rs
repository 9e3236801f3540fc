use crate::pipeline::types::BoundingBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Outline of `bounds`, `thickness` pixels wide, drawn inward from the box
/// edge and clipped to the canvas.
pub fn draw_box(canvas: &mut RgbImage, bounds: &BoundingBox, thickness: u32, color: [u8; 3]) {
    for inset in 0..thickness.max(1) {
        let width = bounds.width.saturating_sub(2 * inset);
        let height = bounds.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((bounds.x + inset) as i32, (bounds.y + inset) as i32)
            .of_size(width, height);
        draw_hollow_rect_mut(canvas, rect, Rgb(color));
    }
}

/// Check mark whose left tip sits at `anchor`.
pub fn draw_check_mark(canvas: &mut RgbImage, anchor: (i64, i64), size: u32, color: [u8; 3]) {
    let size = size as f32;
    let (x, y) = (anchor.0 as f32, anchor.1 as f32);
    let valley = (x + size / 3.0, y + size / 3.0);
    let tip = (x + size, y - size / 2.0);
    let thickness = (size / 8.0).max(2.0) as i32;
    for offset in 0..thickness {
        let dy = offset as f32;
        draw_line_segment_mut(canvas, (x, y + dy), (valley.0, valley.1 + dy), Rgb(color));
        draw_line_segment_mut(canvas, (valley.0, valley.1 + dy), (tip.0, tip.1 + dy), Rgb(color));
    }
}
