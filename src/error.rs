//! Error types for the card quiz core.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::session::SessionState;

/// Errors surfaced by catalog loading, asset handling and session transitions.
///
/// A degraded silhouette render is deliberately absent here: it is carried by
/// [`crate::reveal::Frame::Placeholder`] and never returned as a failure.
#[derive(Error, Debug)]
pub enum QuizError {
    /// The catalog holds no cards, so no quiz can start.
    #[error("no card data is loaded")]
    EmptyCatalog,

    /// Every card tried during random selection failed to load its artwork.
    #[error("could not start the quiz: no card artwork loaded after {attempts} attempts")]
    AssetUnavailable { attempts: u32 },

    /// An operation was invoked in a state where it is not valid.
    #[error("`{operation}` is not valid while the session is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// A quiz mode identifier did not match any known mode.
    #[error("unknown quiz mode `{0}`")]
    UnknownMode(String),

    /// The session is already borrowed by another in-flight call.
    #[error("quiz session is busy")]
    SessionBusy,

    /// A start completed after the session was reset or restarted.
    #[error("start generation {generation} was superseded")]
    Superseded { generation: u64 },

    /// The catalog document could not be parsed.
    #[error("catalog error: {0}")]
    Catalog(#[from] serde_json::Error),

    /// Raw pixel data did not match the declared dimensions.
    #[error("pixel buffer of {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidPixels {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Encoded image bytes could not be decoded or read.
    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, QuizError>;

impl From<QuizError> for JsValue {
    fn from(err: QuizError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
