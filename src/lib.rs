//! Card Quiz core crate.
//!
//! Trading-card trivia mini-game: a random card is drawn from the catalog and
//! the player guesses its name from text hints or from obfuscated artwork
//! (enlarged crop, silhouette, mosaic). This crate holds the parts with real
//! logic (answer normalization, reveal rendering and the session state
//! machine) as plain Rust that tests natively, plus a thin `QuizWidget`
//! binding for the browser page.

use wasm_bindgen::prelude::*;

pub mod assets;
pub mod catalog;
pub mod error;
pub mod normalize;
pub mod pixels;
pub mod retry;
pub mod reveal;
pub mod session;
pub mod web;

pub use catalog::{Card, Catalog};
pub use error::{QuizError, Result};
pub use normalize::{answers_match, normalize};
pub use pixels::{PixelBuffer, Viewport};
pub use reveal::{Degradation, Frame, Obfuscation};
pub use session::{AssetKind, AssetLoader, QuizConfig, QuizMode, QuizSession, QuizView, SessionState, Step};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    log::info!("card quiz initialized");
}

/// Canonical form of an answer, exposed for the page's own input handling.
#[wasm_bindgen(js_name = normalizeAnswer)]
pub fn normalize_answer(text: &str) -> String {
    normalize::normalize(text)
}
