//! RGBA pixel buffers and viewport geometry shared by the reveal renderers.

use std::fmt;

use crate::error::{QuizError, Result};

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Fully transparent background used for letterboxing and blank frames.
pub const BACKGROUND: [u8; 4] = [0, 0, 0, 0];

/// Fit area used when the host does not report one (the original widget fell
/// back to a 400x300 parent box).
pub const DEFAULT_AREA: Viewport = Viewport { width: 400, height: 300 };

/// Row-major RGBA8 image. Immutable once handed to a session.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, checking the length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(QuizError::InvalidPixels {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// A buffer where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self { width, height, data }
    }

    pub fn blank(viewport: Viewport) -> Self {
        Self::filled(viewport.width, viewport.height, BACKGROUND)
    }

    /// Decode PNG bytes into RGBA8.
    #[cfg(feature = "decode")]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| QuizError::Decode(e.to_string()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Zero-sized buffers carry no drawable artwork.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Fill the half-open pixel span `[x0, x1) x [y0, y1)`, clipped to the buffer.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, rgba: [u8; 4]) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.put_pixel(x, y, rgba);
            }
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Destination surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Canvas size for an image of `image_w x image_h` shown inside `area`:
    /// take the full area width, shrink to the area height when too tall.
    pub fn fit(image_w: u32, image_h: u32, area: Viewport) -> Viewport {
        if image_w == 0 || image_h == 0 {
            return area;
        }
        let aspect = image_w as f64 / image_h as f64;
        let mut w = area.width as f64;
        let mut h = w / aspect;
        if h > area.height as f64 {
            h = area.height as f64;
            w = h * aspect;
        }
        Viewport::new((w as u32).max(1), (h as u32).max(1))
    }

    /// Letterboxed placement of content with the given aspect ratio.
    pub fn contain(&self, content_aspect: f64) -> Rect {
        let vw = self.width as f64;
        let vh = self.height as f64;
        if content_aspect > self.aspect() {
            let h = vw / content_aspect;
            Rect::new(0.0, (vh - h) / 2.0, vw, h)
        } else {
            let w = vh * content_aspect;
            Rect::new((vw - w) / 2.0, 0.0, w, vh)
        }
    }

    pub fn full(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }
}

/// Axis-aligned rectangle in (possibly fractional) pixel units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Nearest-neighbour scale of `src_rect` of `src` into `dst_rect` of `dst`.
/// `blend(dst_pixel, src_pixel)` produces the written pixel.
pub(crate) fn blit_scaled<F>(dst: &mut PixelBuffer, src: &PixelBuffer, src_rect: Rect, dst_rect: Rect, blend: F)
where
    F: Fn([u8; 4], [u8; 4]) -> [u8; 4],
{
    if src.is_empty() || dst_rect.width <= 0.0 || dst_rect.height <= 0.0 {
        return;
    }
    let x0 = dst_rect.x.round().max(0.0) as u32;
    let y0 = dst_rect.y.round().max(0.0) as u32;
    let x1 = ((dst_rect.x + dst_rect.width).round().max(0.0) as u32).min(dst.width);
    let y1 = ((dst_rect.y + dst_rect.height).round().max(0.0) as u32).min(dst.height);
    let sx_max = ((src_rect.x + src_rect.width).ceil() as i64 - 1).clamp(0, src.width as i64 - 1);
    let sy_max = ((src_rect.y + src_rect.height).ceil() as i64 - 1).clamp(0, src.height as i64 - 1);
    let sx_min = (src_rect.x.floor() as i64).clamp(0, sx_max);
    let sy_min = (src_rect.y.floor() as i64).clamp(0, sy_max);
    let scale_x = src_rect.width / dst_rect.width;
    let scale_y = src_rect.height / dst_rect.height;

    for y in y0..y1 {
        let v = src_rect.y + (y as f64 + 0.5 - dst_rect.y) * scale_y;
        let sy = (v.floor() as i64).clamp(sy_min, sy_max) as u32;
        for x in x0..x1 {
            let u = src_rect.x + (x as f64 + 0.5 - dst_rect.x) * scale_x;
            let sx = (u.floor() as i64).clamp(sx_min, sx_max) as u32;
            let out = blend(dst.pixel(x, y), src.pixel(sx, sy));
            dst.put_pixel(x, y, out);
        }
    }
}

/// Plain copy of the source pixel.
pub(crate) fn copy(_dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    src
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_length() {
        let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, QuizError::InvalidPixels { expected: 16, actual: 15, .. }));
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn fit_prefers_width_then_shrinks_to_height() {
        // Wide image fits the area width.
        assert_eq!(Viewport::fit(800, 400, DEFAULT_AREA), Viewport::new(400, 200));
        // Tall card art is limited by the area height.
        assert_eq!(Viewport::fit(600, 900, DEFAULT_AREA), Viewport::new(200, 300));
    }

    #[test]
    fn contain_letterboxes_wide_and_tall_content() {
        let vp = Viewport::new(100, 100);
        let wide = vp.contain(2.0);
        assert_eq!(wide, Rect::new(0.0, 25.0, 100.0, 50.0));
        let tall = vp.contain(0.5);
        assert_eq!(tall, Rect::new(25.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn blit_scaled_doubles_pixels() {
        let mut src = PixelBuffer::filled(2, 1, [0, 0, 0, 255]);
        src.put_pixel(1, 0, [255, 255, 255, 255]);
        let mut dst = PixelBuffer::blank(Viewport::new(4, 2));
        let target = dst.bounds();
        blit_scaled(&mut dst, &src, src.bounds(), target, copy);
        assert_eq!(dst.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(dst.pixel(1, 1), [0, 0, 0, 255]);
        assert_eq!(dst.pixel(2, 0), [255, 255, 255, 255]);
        assert_eq!(dst.pixel(3, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut buf = PixelBuffer::blank(Viewport::new(3, 3));
        buf.fill_rect(2, 2, 10, 10, [9, 9, 9, 9]);
        assert_eq!(buf.pixel(2, 2), [9, 9, 9, 9]);
        assert_eq!(buf.pixel(1, 1), BACKGROUND);
    }
}
