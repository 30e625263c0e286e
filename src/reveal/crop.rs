//! Enlarged crop: a square window around the upper-middle of the art, scaled up
//! to fill the viewport. The window grows each attempt, so the zoom eases off.

use crate::pixels::{PixelBuffer, Rect, Viewport, blit_scaled, copy};

/// Window side at attempt 0.
pub const WINDOW_BASE: u32 = 10;
/// Growth of the window side per attempt.
pub const WINDOW_STEP: u32 = 10;
/// Vertical centre of the window as a fraction of image height.
pub const WINDOW_FOCUS_Y: f64 = 0.25;

/// Side length of the crop window, clamped to the shorter image side.
pub fn window_size(attempt: u32, width: u32, height: u32) -> u32 {
    attempt
        .saturating_mul(WINDOW_STEP)
        .saturating_add(WINDOW_BASE)
        .min(width.min(height))
}

/// Source rectangle sampled for `attempt`, centred on `(width/2, height/4)`
/// and shifted inward where it would cross the image edge.
pub fn crop_window(attempt: u32, width: u32, height: u32) -> Rect {
    let side = window_size(attempt, width, height) as f64;
    let cx = width as f64 / 2.0;
    let cy = height as f64 * WINDOW_FOCUS_Y;
    let x = (cx - side / 2.0).clamp(0.0, width as f64 - side);
    let y = (cy - side / 2.0).clamp(0.0, height as f64 - side);
    Rect::new(x, y, side, side)
}

pub fn render_enlarged(source: &PixelBuffer, attempt: u32, viewport: Viewport) -> PixelBuffer {
    let window = crop_window(attempt, source.width(), source.height());
    let mut out = PixelBuffer::blank(viewport);
    blit_scaled(&mut out, source, window, viewport.full(), copy);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_grows_and_is_capped() {
        assert_eq!(window_size(0, 400, 600), 10);
        assert_eq!(window_size(3, 400, 600), 40);
        assert_eq!(window_size(100, 400, 600), 400);
        assert_eq!(window_size(u32::MAX, 50, 30), 30);

        let mut prev = 0;
        for attempt in 0..60 {
            let side = window_size(attempt, 320, 240);
            assert!(side >= prev, "window shrank at attempt {attempt}");
            assert!(side <= 240);
            prev = side;
        }
    }

    #[test]
    fn window_centres_on_upper_quarter() {
        let rect = crop_window(0, 200, 400);
        assert_eq!(rect, Rect::new(95.0, 95.0, 10.0, 10.0));
    }

    #[test]
    fn window_stays_inside_image() {
        // 20px window centred at y = 5 would start above the image.
        let rect = crop_window(1, 100, 20);
        assert_eq!(rect.y, 0.0);
        assert!(rect.x >= 0.0 && rect.x + rect.width <= 100.0);
        assert!(rect.y + rect.height <= 20.0);
    }

    #[test]
    fn enlarged_output_samples_only_the_window() {
        // Left half black, right half white; the centred window straddles both.
        let mut src = PixelBuffer::filled(40, 40, [0, 0, 0, 255]);
        src.fill_rect(20, 0, 40, 40, [255, 255, 255, 255]);
        let out = render_enlarged(&src, 0, Viewport::new(100, 100));
        assert_eq!(out.pixel(10, 50), [0, 0, 0, 255]);
        assert_eq!(out.pixel(90, 50), [255, 255, 255, 255]);
    }
}
