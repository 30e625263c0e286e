//! Where card images live, and a filesystem loader for native hosts.
//!
//! Each card has its art at `<base><name>.png` and, for silhouettes, a
//! transparent illustration at `<base><name>_transparent.png`. Names are
//! escaped the way `encodeURIComponent` does.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::catalog::Card;
use crate::session::AssetKind;

/// Characters `encodeURIComponent` leaves alone besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const DEFAULT_BASE_URL: &str = "https://omezi42.github.io/tcg-assistant-images/cards/";

/// Builds image locations for a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetLocator {
    base: String,
}

impl Default for AssetLocator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl AssetLocator {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn file_name(card: &Card, kind: AssetKind) -> String {
        let name = escape_component(&card.name);
        match kind {
            AssetKind::Artwork => format!("{name}.png"),
            AssetKind::Mask => format!("{name}_transparent.png"),
        }
    }

    pub fn url(&self, card: &Card, kind: AssetKind) -> String {
        format!("{}{}", self.base, Self::file_name(card, kind))
    }
}

pub fn escape_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

#[cfg(feature = "decode")]
pub use dir::DirAssetLoader;

#[cfg(feature = "decode")]
mod dir {
    use std::path::PathBuf;

    use super::AssetLocator;
    use crate::catalog::Card;
    use crate::error::QuizError;
    use crate::pixels::PixelBuffer;
    use crate::session::{AssetKind, AssetLoader};

    /// Reads PNGs from a local mirror of the image host.
    #[derive(Clone, Debug)]
    pub struct DirAssetLoader {
        root: PathBuf,
    }

    impl DirAssetLoader {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        pub fn path_for(&self, card: &Card, kind: AssetKind) -> PathBuf {
            self.root.join(AssetLocator::file_name(card, kind))
        }
    }

    impl AssetLoader for DirAssetLoader {
        type Error = QuizError;

        async fn load(&mut self, card: &Card, kind: AssetKind) -> Result<PixelBuffer, QuizError> {
            let path = self.path_for(card, kind);
            let bytes = std::fs::read(&path).map_err(|e| QuizError::Decode(format!("{}: {e}", path.display())))?;
            PixelBuffer::decode(&bytes)
        }
    }
}
