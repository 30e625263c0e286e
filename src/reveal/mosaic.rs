//! Mosaic: box-filter the source on a block grid, then paint each block's mean
//! colour over the matching scaled rectangle of the viewport.

use crate::pixels::{PixelBuffer, Viewport};

/// Block side per attempt; attempts past the end reuse the last entry.
pub const MOSAIC_SCHEDULE: [u32; 6] = [128, 64, 32, 16, 8, 4];

pub fn block_size(attempt: u32) -> u32 {
    let last = MOSAIC_SCHEDULE.len() - 1;
    MOSAIC_SCHEDULE[(attempt as usize).min(last)]
}

/// One averaged block in source coordinates. Edge blocks may be smaller than
/// the nominal block size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: [u8; 4],
}

/// Mean RGBA of every `size`-aligned block of `source`, in row-major order.
pub fn average_blocks(source: &PixelBuffer, size: u32) -> Vec<Block> {
    assert!(size > 0, "mosaic block size must be positive");
    let mut blocks = Vec::new();
    for by in (0..source.height()).step_by(size as usize) {
        let bh = size.min(source.height() - by);
        for bx in (0..source.width()).step_by(size as usize) {
            let bw = size.min(source.width() - bx);
            let mut sum = [0u64; 4];
            for y in by..by + bh {
                for x in bx..bx + bw {
                    let px = source.pixel(x, y);
                    for (acc, channel) in sum.iter_mut().zip(px) {
                        *acc += channel as u64;
                    }
                }
            }
            let count = bw as u64 * bh as u64;
            let color = sum.map(|s| ((s + count / 2) / count) as u8);
            blocks.push(Block { x: bx, y: by, width: bw, height: bh, color });
        }
    }
    blocks
}

pub fn render_mosaic(source: &PixelBuffer, attempt: u32, viewport: Viewport) -> PixelBuffer {
    // Integer scaling keeps neighbouring blocks gap-free and lands the last
    // edge exactly on the viewport border.
    let scale = |v: u32, dest: u32, src: u32| (v as u64 * dest as u64 / src as u64) as u32;
    let mut out = PixelBuffer::blank(viewport);
    for block in average_blocks(source, block_size(attempt)) {
        let x0 = scale(block.x, viewport.width, source.width());
        let y0 = scale(block.y, viewport.height, source.height());
        let x1 = scale(block.x + block.width, viewport.width, source.width());
        let y1 = scale(block.y + block.height, viewport.height, source.height());
        out.fill_rect(x0, y0, x1, y1, block.color);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_descends_then_holds() {
        assert_eq!(block_size(0), 128);
        assert_eq!(block_size(1), 64);
        assert_eq!(block_size(4), 8);
        assert_eq!(block_size(5), 4);
        assert_eq!(block_size(6), 4);
        assert_eq!(block_size(u32::MAX), 4);
    }

    #[test]
    fn uniform_source_stays_uniform_at_every_size() {
        let color = [12, 34, 56, 200];
        let src = PixelBuffer::filled(37, 23, color);
        let vp = Viewport::new(91, 50);
        for attempt in 0..8 {
            let out = render_mosaic(&src, attempt, vp);
            for y in 0..vp.height {
                for x in 0..vp.width {
                    assert_eq!(out.pixel(x, y), color, "attempt {attempt} at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn partial_edge_blocks_average_in_bounds_pixels_only() {
        // 6x1 image with 4px blocks: [0,0,0,0 | 100,200]
        let mut src = PixelBuffer::filled(6, 1, [0, 0, 0, 255]);
        src.put_pixel(4, 0, [100, 100, 100, 255]);
        src.put_pixel(5, 0, [200, 200, 200, 255]);
        let blocks = average_blocks(&src, 4);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].color, [0, 0, 0, 255]);
        assert_eq!(blocks[1], Block { x: 4, y: 0, width: 2, height: 1, color: [150, 150, 150, 255] });
    }

    #[test]
    fn blocks_map_to_scaled_rectangles() {
        let mut src = PixelBuffer::filled(8, 8, [0, 0, 0, 255]);
        src.fill_rect(4, 0, 8, 8, [255, 0, 0, 255]);
        // attempt 5 => 4px blocks; viewport doubles the image.
        let out = render_mosaic(&src, 5, Viewport::new(16, 16));
        assert_eq!(out.pixel(7, 7), [0, 0, 0, 255]);
        assert_eq!(out.pixel(8, 7), [255, 0, 0, 255]);
        assert_eq!(out.pixel(15, 15), [255, 0, 0, 255]);
    }
}
