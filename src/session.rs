//! Quiz session state machine.
//!
//! | from                       | operation              | to                              |
//! |----------------------------|------------------------|---------------------------------|
//! | any                        | `reset`                | `Idle`                          |
//! | any                        | `start` ok             | `Active`                        |
//! | any                        | `start` err            | `Idle`                          |
//! | `Active`                   | `submit_answer` match  | `Solved`                        |
//! | `Active`                   | `submit_answer` miss   | `Active`, or `Revealed` when out |
//! | `Active`                   | `advance_hint`/`next_attempt` | `Active`                 |
//! | `Idle`/`Solved`/`Revealed` | answer or advance      | `InvalidState` error, no change |
//!
//! Starting is split in three so a host can await asset loads without holding
//! the session: [`QuizSession::prepare`] resets and hands out a generation
//! ticket, [`select_card`] picks and loads a card, and [`QuizSession::activate`]
//! binds the result unless a later reset or start made the ticket stale.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use rand::Rng;
use serde::Serialize;

use crate::catalog::{Card, Catalog};
use crate::error::{QuizError, Result};
use crate::normalize::answers_match;
use crate::pixels::{DEFAULT_AREA, PixelBuffer, Viewport};
use crate::retry::retry_bounded;
use crate::reveal::{self, Frame, Obfuscation};

/// Cards tried before a start gives up on loading artwork.
pub const MAX_SELECTION_ATTEMPTS: u32 = 20;
/// Wrong answers allowed in an image mode before the card is revealed.
pub const MAX_IMAGE_ATTEMPTS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum QuizMode {
    #[serde(rename = "cardName")]
    NameHints,
    #[serde(rename = "enlarge")]
    Enlarge,
    #[serde(rename = "silhouette")]
    Silhouette,
    #[serde(rename = "mosaic")]
    Mosaic,
}

impl QuizMode {
    pub const ALL: [QuizMode; 4] = [QuizMode::NameHints, QuizMode::Enlarge, QuizMode::Silhouette, QuizMode::Mosaic];

    pub fn obfuscation(self) -> Option<Obfuscation> {
        match self {
            QuizMode::NameHints => None,
            QuizMode::Enlarge => Some(Obfuscation::Enlarge),
            QuizMode::Silhouette => Some(Obfuscation::Silhouette),
            QuizMode::Mosaic => Some(Obfuscation::Mosaic),
        }
    }

    pub fn is_image(self) -> bool {
        self.obfuscation().is_some()
    }

    pub fn id(self) -> &'static str {
        match self {
            QuizMode::NameHints => "cardName",
            QuizMode::Enlarge => "enlarge",
            QuizMode::Silhouette => "silhouette",
            QuizMode::Mosaic => "mosaic",
        }
    }

    /// Heading shown above the quiz.
    pub fn title(self) -> &'static str {
        match self {
            QuizMode::NameHints => "カード名当てクイズ",
            QuizMode::Enlarge => "イラスト拡大クイズ",
            QuizMode::Silhouette => "イラストシルエットクイズ",
            QuizMode::Mosaic => "イラストモザイククイズ",
        }
    }
}

impl FromStr for QuizMode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self> {
        QuizMode::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| QuizError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Active,
    Solved,
    Revealed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Solved | SessionState::Revealed)
    }
}

/// Which image of a card to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// The full card art.
    Artwork,
    /// Transparent illustration whose alpha outlines the character.
    Mask,
}

/// Host-provided image source. Implementations fetch and decode; the session
/// only sees pixels.
#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    type Error: fmt::Display;

    async fn load(&mut self, card: &Card, kind: AssetKind) -> std::result::Result<PixelBuffer, Self::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub max_selection_attempts: u32,
    pub max_image_attempts: u32,
    /// Box the artwork is fit into; the canvas takes the art's aspect ratio.
    pub area: Viewport,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_selection_attempts: MAX_SELECTION_ATTEMPTS,
            max_image_attempts: MAX_IMAGE_ATTEMPTS,
            area: DEFAULT_AREA,
        }
    }
}

/// Pixels for an image-mode quiz. `mask` is only present for silhouettes and
/// may be missing when its load failed.
#[derive(Clone, Debug)]
pub struct Assets {
    pub artwork: PixelBuffer,
    pub mask: Option<PixelBuffer>,
}

/// A chosen card plus whatever was loaded for it.
#[derive(Clone, Debug)]
pub struct Selection {
    pub card: Card,
    pub assets: Option<Assets>,
}

impl Selection {
    pub fn text(card: Card) -> Self {
        Self { card, assets: None }
    }

    pub fn image(card: Card, artwork: PixelBuffer, mask: Option<PixelBuffer>) -> Self {
        Self { card, assets: Some(Assets { artwork, mask }) }
    }
}

/// Proof of a [`QuizSession::prepare`] call; stale once the session moves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartTicket {
    pub generation: u64,
    pub mode: QuizMode,
}

/// The answer screen: card name and, for image modes, the unobfuscated art.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub name: String,
    pub art: Option<Frame>,
}

/// What the host should show after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// A newly revealed hint line (`index` into the card's info).
    Hint { index: usize, text: String },
    /// Every hint line is already on screen.
    NoMoreHints,
    /// Obfuscated art for `attempt`.
    Frame { attempt: u32, frame: Frame },
    Solved(Resolution),
    Revealed(Resolution),
}

/// Serializable snapshot for the host UI.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub mode: Option<QuizMode>,
    pub title: Option<&'static str>,
    pub state: SessionState,
    pub hints: Vec<String>,
    pub hint_index: usize,
    pub attempt_count: u32,
    pub remaining_attempts: u32,
    pub answer: Option<String>,
    pub viewport: Option<Viewport>,
}

/// Pick a card for `mode`, loading its images for image modes.
///
/// Text mode takes the first random card. Image modes retry with a fresh
/// random card whenever the artwork fails to load, up to
/// `config.max_selection_attempts` cards. A failed silhouette mask does not
/// reject the card; the quiz renders a placeholder instead.
pub async fn select_card<L, R>(
    catalog: &Catalog,
    mode: QuizMode,
    config: QuizConfig,
    loader: &mut L,
    rng: &mut R,
) -> Result<Selection>
where
    L: AssetLoader,
    R: Rng + ?Sized,
{
    if catalog.is_empty() {
        return Err(QuizError::EmptyCatalog);
    }
    if !mode.is_image() {
        let card = catalog.pick(rng).ok_or(QuizError::EmptyCatalog)?;
        return Ok(Selection::text(card.clone()));
    }

    let outcome = retry_bounded(config.max_selection_attempts, async |attempt| {
        let card = catalog.pick(&mut *rng).ok_or(())?;
        let artwork = match loader.load(card, AssetKind::Artwork).await {
            Ok(px) if !px.is_empty() => px,
            Ok(_) => {
                log::warn!("artwork for {} decoded empty (try {})", card.name, attempt + 1);
                return Err(());
            }
            Err(err) => {
                log::warn!("failed to load quiz artwork for {} (try {}): {err}", card.name, attempt + 1);
                return Err(());
            }
        };
        let mask = if mode == QuizMode::Silhouette {
            match loader.load(card, AssetKind::Mask).await {
                Ok(px) => Some(px),
                Err(err) => {
                    log::warn!("silhouette mask for {} unavailable: {err}", card.name);
                    None
                }
            }
        } else {
            None
        };
        Ok(Selection::image(card.clone(), artwork, mask))
    })
    .await;

    outcome.map_err(|exhausted| {
        log::error!("no quiz artwork loaded after {} cards", exhausted.attempts);
        QuizError::AssetUnavailable { attempts: exhausted.attempts }
    })
}

pub struct QuizSession {
    catalog: Rc<Catalog>,
    config: QuizConfig,
    generation: u64,
    state: SessionState,
    mode: Option<QuizMode>,
    card: Option<Card>,
    hint_index: usize,
    attempt_count: u32,
    source: Option<PixelBuffer>,
    mask: Option<PixelBuffer>,
    viewport: Option<Viewport>,
}

impl QuizSession {
    pub fn new(catalog: Rc<Catalog>) -> Self {
        Self::with_config(catalog, QuizConfig::default())
    }

    pub fn with_config(catalog: Rc<Catalog>, config: QuizConfig) -> Self {
        Self {
            catalog,
            config,
            generation: 0,
            state: SessionState::Idle,
            mode: None,
            card: None,
            hint_index: 0,
            attempt_count: 0,
            source: None,
            mask: None,
            viewport: None,
        }
    }

    pub fn catalog(&self) -> &Rc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> QuizConfig {
        self.config
    }

    /// Fit box for the next quiz started. Panics on an empty area.
    pub fn set_area(&mut self, area: Viewport) {
        assert!(!area.is_empty(), "quiz area must be non-empty, got {area:?}");
        self.config.area = area;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Option<QuizMode> {
        self.mode
    }

    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    /// Number of hint lines revealed so far.
    pub fn hint_index(&self) -> usize {
        self.hint_index
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Canvas size for the current image quiz.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Wrong answers still allowed before the card is revealed.
    pub fn remaining_attempts(&self) -> u32 {
        if self.state != SessionState::Active {
            return 0;
        }
        match (self.mode, &self.card) {
            (Some(QuizMode::NameHints), Some(card)) => (card.info.len() - self.hint_index) as u32 + 1,
            (Some(_), Some(_)) => self.config.max_image_attempts.saturating_sub(self.attempt_count),
            _ => 0,
        }
    }

    /// Clear everything and return to `Idle`. Any ticket issued before this
    /// call becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::Idle;
        self.mode = None;
        self.card = None;
        self.hint_index = 0;
        self.attempt_count = 0;
        self.source = None;
        self.mask = None;
        self.viewport = None;
    }

    /// First phase of a start: reset and issue a ticket for `mode`.
    pub fn prepare(&mut self, mode: QuizMode) -> Result<StartTicket> {
        self.reset();
        if self.catalog.is_empty() {
            return Err(QuizError::EmptyCatalog);
        }
        Ok(StartTicket { generation: self.generation, mode })
    }

    /// Last phase of a start: bind `selection` and produce the first reveal.
    ///
    /// Panics if the selection's assets do not match the ticket's mode.
    pub fn activate(&mut self, ticket: StartTicket, selection: Selection) -> Result<Step> {
        self.check_ticket(ticket)?;
        assert_eq!(
            ticket.mode.is_image(),
            selection.assets.is_some(),
            "selection assets do not match quiz mode {}",
            ticket.mode
        );

        self.mode = Some(ticket.mode);
        self.card = Some(selection.card);
        self.hint_index = 0;
        self.attempt_count = 0;
        if let Some(assets) = selection.assets {
            self.viewport = Some(Viewport::fit(assets.artwork.width(), assets.artwork.height(), self.config.area));
            self.source = Some(assets.artwork);
            self.mask = assets.mask;
        }
        self.state = SessionState::Active;

        if ticket.mode.is_image() {
            Ok(self.frame_step())
        } else {
            Ok(self.reveal_next_hint())
        }
    }

    /// Settle a start whose selection ran detached from the session.
    ///
    /// A stale ticket yields `Superseded` whether the selection succeeded or
    /// failed, so a late failure never surfaces over a newer quiz.
    pub fn conclude(&mut self, ticket: StartTicket, outcome: Result<Selection>) -> Result<Step> {
        self.check_ticket(ticket)?;
        self.activate(ticket, outcome?)
    }

    /// Pick a card for `mode`, load its images and begin the quiz.
    ///
    /// On failure the session is left `Idle`.
    pub async fn start<L, R>(&mut self, mode: QuizMode, loader: &mut L, rng: &mut R) -> Result<Step>
    where
        L: AssetLoader,
        R: Rng + ?Sized,
    {
        let ticket = self.prepare(mode)?;
        let catalog = Rc::clone(&self.catalog);
        let outcome = select_card(&catalog, mode, self.config, loader, rng).await;
        self.conclude(ticket, outcome)
    }

    fn check_ticket(&self, ticket: StartTicket) -> Result<()> {
        if ticket.generation != self.generation || self.state != SessionState::Idle {
            log::debug!(
                "discarding start result for generation {} (now {})",
                ticket.generation,
                self.generation
            );
            return Err(QuizError::Superseded { generation: ticket.generation });
        }
        Ok(())
    }

    /// Compare `answer` with the card name and advance the quiz.
    pub fn submit_answer(&mut self, answer: &str) -> Result<Step> {
        self.require_active("submit_answer")?;
        let mode = self.bound_mode();
        let card = self.card.as_ref().expect("active session has a card");
        if answers_match(answer, &card.name) {
            self.state = SessionState::Solved;
            return Ok(Step::Solved(self.resolution()));
        }
        let hints_left = self.hint_index < card.info.len();

        self.attempt_count += 1;
        let exhausted = if mode == QuizMode::NameHints {
            !hints_left
        } else {
            self.attempt_count >= self.config.max_image_attempts
        };
        if exhausted {
            self.state = SessionState::Revealed;
            return Ok(Step::Revealed(self.resolution()));
        }
        if mode == QuizMode::NameHints {
            Ok(self.reveal_next_hint())
        } else {
            Ok(self.frame_step())
        }
    }

    /// Show the next hint line without counting an attempt.
    pub fn advance_hint(&mut self) -> Result<Step> {
        self.require_active("advance_hint")?;
        if self.bound_mode() != QuizMode::NameHints {
            return Err(self.invalid("advance_hint"));
        }
        Ok(self.reveal_next_hint())
    }

    /// Redraw the frame for the current attempt without counting an attempt.
    pub fn next_attempt(&mut self) -> Result<Step> {
        self.require_active("next_attempt")?;
        if !self.bound_mode().is_image() {
            return Err(self.invalid("next_attempt"));
        }
        Ok(self.frame_step())
    }

    /// The "next" control: a hint in text mode, the current frame otherwise.
    pub fn advance(&mut self) -> Result<Step> {
        match self.mode {
            Some(QuizMode::NameHints) => self.advance_hint(),
            _ => self.next_attempt(),
        }
    }

    /// Obfuscated frame for the current attempt, for redraws.
    pub fn current_frame(&self) -> Option<Frame> {
        let style = self.mode?.obfuscation()?;
        if self.state != SessionState::Active {
            return None;
        }
        Some(self.render(style))
    }

    /// Hint lines shown so far.
    pub fn revealed_hints(&self) -> &[String] {
        match &self.card {
            Some(card) => &card.info[..self.hint_index.min(card.info.len())],
            None => &[],
        }
    }

    pub fn view(&self) -> QuizView {
        QuizView {
            mode: self.mode,
            title: self.mode.map(QuizMode::title),
            state: self.state,
            hints: self.revealed_hints().to_vec(),
            hint_index: self.hint_index,
            attempt_count: self.attempt_count,
            remaining_attempts: self.remaining_attempts(),
            answer: self
                .card
                .as_ref()
                .filter(|_| self.state.is_terminal())
                .map(|c| c.name.clone()),
            viewport: self.viewport,
        }
    }

    fn require_active(&self, operation: &'static str) -> Result<()> {
        if self.state == SessionState::Active {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> QuizError {
        log::warn!("{operation} called while session is {:?}", self.state);
        QuizError::InvalidState { operation, state: self.state }
    }

    fn bound_mode(&self) -> QuizMode {
        self.mode.expect("active session has a mode")
    }

    fn reveal_next_hint(&mut self) -> Step {
        let Some(card) = &self.card else {
            return Step::NoMoreHints;
        };
        match card.info.get(self.hint_index) {
            Some(text) => {
                let step = Step::Hint { index: self.hint_index, text: text.clone() };
                self.hint_index += 1;
                step
            }
            None => Step::NoMoreHints,
        }
    }

    fn frame_step(&self) -> Step {
        let style = self
            .mode
            .and_then(QuizMode::obfuscation)
            .expect("frame requested outside an image mode");
        Step::Frame { attempt: self.attempt_count, frame: self.render(style) }
    }

    fn render(&self, style: Obfuscation) -> Frame {
        let source = self.source.as_ref().expect("image quiz started without source pixels");
        let viewport = self.viewport.expect("image quiz started without a viewport");
        reveal::render(Some(source), style, self.attempt_count, self.mask.as_ref(), viewport)
    }

    fn resolution(&self) -> Resolution {
        let name = self.card.as_ref().map(|c| c.name.clone()).unwrap_or_default();
        let art = self.viewport.map(|vp| reveal::render_full(self.source.as_ref(), vp));
        Resolution { name, art }
    }
}
