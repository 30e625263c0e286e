//! Reveal renderer: turns decoded card art into the obfuscated frame shown for a
//! given attempt. Every strategy is a pure function of its inputs and returns a
//! viewport-sized [`Frame`]; blitting it onto a canvas is the host's job.
//!
//! - `crop`: enlarged crop window that grows with each attempt
//! - `silhouette`: art with a black shape stamped from the transparent mask asset
//! - `mosaic`: block-average downsample on a shrinking block schedule

use std::fmt;

use serde::Serialize;

use crate::pixels::{PixelBuffer, Viewport, blit_scaled, copy};

mod crop;
mod mosaic;
mod silhouette;

pub use crop::{WINDOW_BASE, WINDOW_FOCUS_Y, WINDOW_STEP, crop_window, render_enlarged, window_size};
pub use mosaic::{Block, MOSAIC_SCHEDULE, average_blocks, block_size, render_mosaic};
pub use silhouette::render_silhouette;

/// Image-based obfuscation strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Obfuscation {
    Enlarge,
    Silhouette,
    Mosaic,
}

/// Why a frame could not show artwork. Rendered in place as a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Degradation {
    MissingArtwork,
    MissingMask,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::MissingArtwork => f.write_str("画像を読み込めませんでした"),
            Degradation::MissingMask => f.write_str("シルエット画像を読み込めませんでした"),
        }
    }
}

/// Output of a render: either pixels to blit, or a blank surface with a message.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Image(PixelBuffer),
    Placeholder {
        viewport: Viewport,
        degradation: Degradation,
    },
}

impl Frame {
    pub fn viewport(&self) -> Viewport {
        match self {
            Frame::Image(px) => Viewport::new(px.width(), px.height()),
            Frame::Placeholder { viewport, .. } => *viewport,
        }
    }

    pub fn as_image(&self) -> Option<&PixelBuffer> {
        match self {
            Frame::Image(px) => Some(px),
            Frame::Placeholder { .. } => None,
        }
    }

    pub fn degradation(&self) -> Option<Degradation> {
        match self {
            Frame::Image(_) => None,
            Frame::Placeholder { degradation, .. } => Some(*degradation),
        }
    }
}

/// Render `source` obfuscated by `style` at `attempt` into `viewport`.
///
/// A missing or zero-sized source yields a `MissingArtwork` placeholder; a
/// silhouette without a usable mask yields `MissingMask`. Panics on an empty
/// viewport, which is a host error.
pub fn render(
    source: Option<&PixelBuffer>,
    style: Obfuscation,
    attempt: u32,
    mask: Option<&PixelBuffer>,
    viewport: Viewport,
) -> Frame {
    assert!(!viewport.is_empty(), "reveal viewport must be non-empty, got {viewport:?}");
    let Some(source) = source.filter(|px| !px.is_empty()) else {
        return Frame::Placeholder { viewport, degradation: Degradation::MissingArtwork };
    };
    match style {
        Obfuscation::Enlarge => Frame::Image(render_enlarged(source, attempt, viewport)),
        Obfuscation::Mosaic => Frame::Image(render_mosaic(source, attempt, viewport)),
        Obfuscation::Silhouette => match mask.filter(|m| !m.is_empty()) {
            Some(mask) => Frame::Image(render_silhouette(source, mask, viewport)),
            None => {
                log::warn!("silhouette mask unavailable, rendering placeholder");
                Frame::Placeholder { viewport, degradation: Degradation::MissingMask }
            }
        },
    }
}

/// Unobfuscated art, letterboxed into `viewport`, for the answer screen.
pub fn render_full(source: Option<&PixelBuffer>, viewport: Viewport) -> Frame {
    assert!(!viewport.is_empty(), "reveal viewport must be non-empty, got {viewport:?}");
    let Some(source) = source.filter(|px| !px.is_empty()) else {
        return Frame::Placeholder { viewport, degradation: Degradation::MissingArtwork };
    };
    let mut out = PixelBuffer::blank(viewport);
    blit_scaled(&mut out, source, source.bounds(), viewport.contain(source.aspect()), copy);
    Frame::Image(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [200, 10, 10, 255];

    #[test]
    fn missing_source_renders_placeholder_for_every_style() {
        let vp = Viewport::new(40, 30);
        let empty = PixelBuffer::filled(0, 0, RED);
        for style in [Obfuscation::Enlarge, Obfuscation::Silhouette, Obfuscation::Mosaic] {
            let frame = render(None, style, 0, None, vp);
            assert_eq!(frame.degradation(), Some(Degradation::MissingArtwork));
            let frame = render(Some(&empty), style, 2, None, vp);
            assert_eq!(frame.degradation(), Some(Degradation::MissingArtwork));
            assert_eq!(frame.viewport(), vp);
        }
    }

    #[test]
    fn silhouette_without_mask_degrades() {
        let art = PixelBuffer::filled(10, 10, RED);
        let frame = render(Some(&art), Obfuscation::Silhouette, 0, None, Viewport::new(10, 10));
        assert_eq!(frame.degradation(), Some(Degradation::MissingMask));
    }

    #[test]
    fn frames_match_viewport_size() {
        let art = PixelBuffer::filled(64, 48, RED);
        let vp = Viewport::new(33, 21);
        for style in [Obfuscation::Enlarge, Obfuscation::Mosaic] {
            let frame = render(Some(&art), style, 1, None, vp);
            let px = frame.as_image().expect("image frame");
            assert_eq!((px.width(), px.height()), (33, 21));
        }
    }

    #[test]
    fn full_render_letterboxes() {
        let art = PixelBuffer::filled(20, 10, RED);
        let frame = render_full(Some(&art), Viewport::new(20, 20));
        let px = frame.as_image().unwrap();
        assert_eq!(px.pixel(10, 0), crate::pixels::BACKGROUND);
        assert_eq!(px.pixel(10, 10), RED);
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn empty_viewport_is_a_host_error() {
        let art = PixelBuffer::filled(4, 4, RED);
        render(Some(&art), Obfuscation::Mosaic, 0, None, Viewport::new(0, 10));
    }
}
