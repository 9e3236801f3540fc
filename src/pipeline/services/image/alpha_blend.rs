use crate::config::PanelRect;
use image::{imageops, Rgb, RgbImage, RgbaImage};
use imageproc::map::map_colors2;
use imageproc::pixelops::weighted_sum;

/// Alpha-composites `overlay` onto `canvas` with its top-left corner at
/// (`x`, `y`): `out = a * overlay + (1 - a) * canvas` per channel, `a` being the
/// overlay's own alpha scaled to [0, 1].
///
/// Placement that would reach outside the canvas on any side leaves the canvas
/// untouched and returns `false`; there is no partial clipping.
pub fn overlay_alpha(canvas: &mut RgbImage, overlay: &RgbaImage, x: i64, y: i64) -> bool {
    let (w, h) = overlay.dimensions();
    if x < 0
        || y < 0
        || x + w as i64 > canvas.width() as i64
        || y + h as i64 > canvas.height() as i64
    {
        return false;
    }

    let (x, y) = (x as u32, y as u32);
    for (ox, oy, src) in overlay.enumerate_pixels() {
        let alpha = src.0[3] as f32 / 255.0;
        let dst = canvas.get_pixel_mut(x + ox, y + oy);
        for c in 0..3 {
            dst.0[c] = blend_channel(src.0[c], dst.0[c], alpha);
        }
    }
    true
}

/// Blends a solid `color` rectangle over the canvas with the given weight:
/// `out = weight * color + (1 - weight) * canvas`. The rectangle is clipped to
/// the canvas.
pub fn blend_panel(canvas: &mut RgbImage, rect: &PanelRect, color: [u8; 3], weight: f32) {
    let right = rect.x.saturating_add(rect.width).min(canvas.width());
    let bottom = rect.y.saturating_add(rect.height).min(canvas.height());
    if rect.x >= right || rect.y >= bottom {
        return;
    }
    let (width, height) = (right - rect.x, bottom - rect.y);

    let region = imageops::crop_imm(&*canvas, rect.x, rect.y, width, height).to_image();
    let fill = RgbImage::from_pixel(width, height, Rgb(color));
    let blended = map_colors2(&fill, &region, |top, under| {
        weighted_sum(top, under, weight, 1.0 - weight)
    });
    imageops::replace(canvas, &blended, rect.x as i64, rect.y as i64);
}

fn blend_channel(top: u8, bottom: u8, weight: f32) -> u8 {
    (weight * top as f32 + (1.0 - weight) * bottom as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn assert_near(actual: [u8; 3], expected: [u8; 3]) {
        for c in 0..3 {
            assert!(
                actual[c].abs_diff(expected[c]) <= 1,
                "{actual:?} not within 1 of {expected:?}"
            );
        }
    }

    fn background() -> RgbImage {
        RgbImage::from_fn(20, 10, |x, y| Rgb([x as u8 * 10, y as u8 * 10, 7]))
    }

    #[test]
    fn opaque_overlay_is_copied_verbatim() {
        let mut canvas = background();
        let original = canvas.clone();
        let overlay = RgbaImage::from_fn(4, 3, |x, y| Rgba([200 + x as u8, 100 + y as u8, 50, 255]));

        assert!(overlay_alpha(&mut canvas, &overlay, 5, 2));

        for (x, y, px) in canvas.enumerate_pixels() {
            let inside = (5..9).contains(&x) && (2..5).contains(&y);
            if inside {
                let src = overlay.get_pixel(x - 5, y - 2).0;
                assert_eq!(px.0, [src[0], src[1], src[2]]);
            } else {
                assert_eq!(px, original.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn transparent_overlay_changes_nothing() {
        let mut canvas = background();
        let original = canvas.clone();
        let overlay = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
        assert!(overlay_alpha(&mut canvas, &overlay, 0, 0));
        assert_eq!(canvas, original);
    }

    #[test]
    fn half_alpha_mixes_channels() {
        let mut canvas = RgbImage::from_pixel(2, 2, Rgb([0, 100, 200]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([255, 100, 0, 128]));
        overlay_alpha(&mut canvas, &overlay, 1, 1);
        // a = 128/255
        assert_eq!(canvas.get_pixel(1, 1).0, [128, 100, 100]);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 100, 200]);
    }

    #[test]
    fn out_of_bounds_placement_leaves_canvas_unmodified() {
        let overlay = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        for (x, y) in [(-1, 0), (0, -1), (17, 0), (0, 7), (100, 100)] {
            let mut canvas = background();
            assert!(!overlay_alpha(&mut canvas, &overlay, x, y), "placed at {x},{y}");
            assert_eq!(canvas, background());
        }
        // Flush against the far corner is still inside.
        let mut canvas = background();
        assert!(overlay_alpha(&mut canvas, &overlay, 16, 6));
    }

    #[test]
    fn panel_darkens_only_its_rectangle() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([100, 100, 100]));
        let rect = PanelRect {
            x: 2,
            y: 2,
            width: 3,
            height: 3,
        };
        blend_panel(&mut canvas, &rect, [0, 0, 0], 0.6);
        assert_near(canvas.get_pixel(2, 2).0, [40, 40, 40]);
        assert_near(canvas.get_pixel(4, 4).0, [40, 40, 40]);
        assert_eq!(canvas.get_pixel(5, 5).0, [100, 100, 100]);
        assert_eq!(canvas.get_pixel(1, 2).0, [100, 100, 100]);
    }

    #[test]
    fn panel_outside_canvas_is_ignored() {
        let mut canvas = RgbImage::from_pixel(5, 5, Rgb([100, 100, 100]));
        let rect = PanelRect {
            x: 10,
            y: 0,
            width: 5,
            height: 5,
        };
        blend_panel(&mut canvas, &rect, [0, 0, 0], 0.6);
        assert_eq!(canvas, RgbImage::from_pixel(5, 5, Rgb([100, 100, 100])));
    }

    #[test]
    fn panel_is_clipped_to_canvas() {
        let mut canvas = RgbImage::from_pixel(5, 5, Rgb([100, 100, 100]));
        let rect = PanelRect {
            x: 3,
            y: 3,
            width: 620,
            height: 90,
        };
        blend_panel(&mut canvas, &rect, [0, 0, 0], 0.6);
        assert_near(canvas.get_pixel(4, 4).0, [40, 40, 40]);
        assert_eq!(canvas.get_pixel(2, 2).0, [100, 100, 100]);
    }
}
