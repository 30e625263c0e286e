//! Silhouette: full art as background, then the mask's alpha shape stamped on
//! top in solid black.

use crate::pixels::{PixelBuffer, Viewport, blit_scaled, copy};

const SILHOUETTE: [u8; 3] = [0, 0, 0];

/// Both layers are letterboxed independently by their own aspect ratio.
pub fn render_silhouette(art: &PixelBuffer, mask: &PixelBuffer, viewport: Viewport) -> PixelBuffer {
    let mut out = PixelBuffer::blank(viewport);
    blit_scaled(&mut out, art, art.bounds(), viewport.contain(art.aspect()), copy);
    blit_scaled(&mut out, mask, mask.bounds(), viewport.contain(mask.aspect()), stamp);
    out
}

/// Source-over of an opaque black fill whose coverage is the mask alpha.
fn stamp(dst: [u8; 4], mask: [u8; 4]) -> [u8; 4] {
    let a = mask[3] as u32;
    if a == 0 {
        return dst;
    }
    let inv = 255 - a;
    let mix = |d: u8, s: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
    [
        mix(dst[0], SILHOUETTE[0]),
        mix(dst[1], SILHOUETTE[1]),
        mix(dst[2], SILHOUETTE[2]),
        (a + (dst[3] as u32 * inv + 127) / 255).min(255) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const ART: [u8; 4] = [180, 120, 60, 255];

    #[test]
    fn opaque_mask_pixels_become_black() {
        let art = PixelBuffer::filled(8, 8, ART);
        let mut mask = PixelBuffer::filled(8, 8, [255, 255, 255, 0]);
        mask.fill_rect(0, 0, 4, 8, [255, 255, 255, 255]);
        let out = render_silhouette(&art, &mask, Viewport::new(8, 8));
        assert_eq!(out.pixel(1, 3), [0, 0, 0, 255]);
        assert_eq!(out.pixel(6, 3), ART);
    }

    #[test]
    fn partial_alpha_blends_towards_black() {
        let blended = stamp(ART, [0, 0, 0, 128]);
        assert!(blended[0] < ART[0] && blended[0] > 0);
        assert_eq!(blended[3], 255);
    }

    #[test]
    fn mask_is_fit_by_its_own_aspect() {
        // Square art fills the square viewport; a 2:1 mask is letterboxed
        // into the middle band, leaving the top rows untouched.
        let art = PixelBuffer::filled(10, 10, ART);
        let mask = PixelBuffer::filled(20, 10, [0, 0, 0, 255]);
        let out = render_silhouette(&art, &mask, Viewport::new(10, 10));
        assert_eq!(out.pixel(5, 0), ART);
        assert_eq!(out.pixel(5, 5), [0, 0, 0, 255]);
        assert_eq!(out.pixel(5, 9), ART);
    }
}
