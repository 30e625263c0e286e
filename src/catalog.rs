//! Card catalog: the read-only list of cards a quiz draws from.
//!
//! The host fetches `cards.json` once and hands the parsed catalog to each
//! session; nothing here is global.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A quiz card: its answer name and ordered hint lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub info: Vec<String>,
}

impl Card {
    pub fn new(name: impl Into<String>, info: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            info: info.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    cards: Vec<Card>,
}

impl Catalog {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Parse the catalog document (a JSON array of cards).
    pub fn from_json(document: &str) -> Result<Self> {
        let cards: Vec<Card> = serde_json::from_str(document)?;
        log::info!("{} cards loaded", cards.len());
        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.name == name)
    }

    /// Uniformly random card, or `None` for an empty catalog.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Card> {
        if self.cards.is_empty() {
            return None;
        }
        Some(&self.cards[rng.gen_range(0..self.cards.len())])
    }
}
