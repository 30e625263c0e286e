//! Browser host: a `#[wasm_bindgen]` widget that owns one quiz session, loads
//! card images through `<img>` elements and blits frames onto a canvas.
//!
//! Buttons, inputs and dialogs stay in the page's JS; it calls `start`,
//! `submit`, `next` and `reset` and reads `view()` to refresh its text.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use js_sys::Promise;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData, window};

use crate::assets::AssetLocator;
use crate::catalog::{Card, Catalog};
use crate::error::QuizError;
use crate::pixels::{PixelBuffer, Viewport};
use crate::reveal::Frame;
use crate::session::{AssetKind, AssetLoader, QuizMode, QuizSession, Selection, StartTicket, Step, select_card};

/// Loads card images over the network with `crossOrigin = "anonymous"` so the
/// pixels can be read back from a canvas.
pub struct BrowserAssetLoader {
    locator: AssetLocator,
}

impl BrowserAssetLoader {
    pub fn new(locator: AssetLocator) -> Self {
        Self { locator }
    }
}

impl AssetLoader for BrowserAssetLoader {
    type Error = String;

    async fn load(&mut self, card: &Card, kind: AssetKind) -> Result<PixelBuffer, String> {
        let url = self.locator.url(card, kind);
        fetch_pixels(&url).await.map_err(|e| format!("failed to load image {url}: {e:?}"))
    }
}

/// Load `url` through an `<img>` and read back its RGBA pixels.
pub async fn fetch_pixels(url: &str) -> Result<PixelBuffer, JsValue> {
    let img = load_image(url).await?;
    read_pixels(&img)
}

async fn load_image(src: &str) -> Result<HtmlImageElement, JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_cross_origin(Some("anonymous"));
    let promise = Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(src);
    let loaded = JsFuture::from(promise).await;
    img.set_onload(None);
    img.set_onerror(None);
    loaded?;
    Ok(img)
}

/// Decode by drawing into an offscreen canvas at natural size.
fn read_pixels(img: &HtmlImageElement) -> Result<PixelBuffer, JsValue> {
    let (w, h) = (img.natural_width(), img.natural_height());
    let canvas = create_canvas(w, h)?;
    let ctx = context_2d(&canvas)?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0)?;
    let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64)?;
    PixelBuffer::new(w, h, data.data().0).map_err(JsValue::from)
}

fn create_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()
        .map_err(JsValue::from)
}

#[wasm_bindgen]
pub struct QuizWidget {
    session: Rc<RefCell<QuizSession>>,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    locator: AssetLocator,
}

#[wasm_bindgen]
impl QuizWidget {
    /// `cards_json` is the `cards.json` document; `canvas_id` names the quiz canvas.
    #[wasm_bindgen(constructor)]
    pub fn new(cards_json: &str, canvas_id: &str) -> Result<QuizWidget, JsValue> {
        let catalog = Catalog::from_json(cards_json)?;
        let doc = window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = doc
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into()?;
        let ctx = context_2d(&canvas)?;
        Ok(QuizWidget {
            session: Rc::new(RefCell::new(QuizSession::new(Rc::new(catalog)))),
            canvas,
            ctx,
            locator: AssetLocator::default(),
        })
    }

    /// Point image loads at another mirror of the card images.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.locator = AssetLocator::new(base_url);
    }

    /// Box (usually the image area's client size) the art is fit into.
    pub fn set_area(&self, width: u32, height: u32) -> Result<(), JsValue> {
        self.session_mut()?.set_area(Viewport::new(width.max(1), height.max(1)));
        Ok(())
    }

    /// Start a quiz of `mode` (`cardName`, `enlarge`, `silhouette`, `mosaic`).
    ///
    /// Resolves with the view, or `null` when a reset or newer start
    /// overtook this one while images were loading.
    pub fn start(&self, mode: &str) -> Result<Promise, JsValue> {
        let mode: QuizMode = mode.parse()?;
        let (ticket, catalog, config) = {
            let mut session = self.session_mut()?;
            let ticket = session.prepare(mode)?;
            (ticket, Rc::clone(session.catalog()), session.config())
        };
        clear(&self.ctx, &self.canvas);

        let session = Rc::clone(&self.session);
        let canvas = self.canvas.clone();
        let ctx = self.ctx.clone();
        let mut loader = BrowserAssetLoader::new(self.locator.clone());
        Ok(future_to_promise(async move {
            let mut rng = StdRng::from_entropy();
            let outcome = select_card(&catalog, mode, config, &mut loader, &mut rng).await;
            match settle_start(&session, ticket, outcome)? {
                Some(step) => {
                    present(&ctx, &canvas, &step)?;
                    view_value(&*borrow_session(&session)?)
                }
                None => Ok(JsValue::NULL),
            }
        }))
    }

    /// Check a typed answer; returns the updated view.
    pub fn submit(&self, answer: &str) -> Result<JsValue, JsValue> {
        let mut session = self.session_mut()?;
        let step = session.submit_answer(answer)?;
        present(&self.ctx, &self.canvas, &step)?;
        view_value(&session)
    }

    /// The "next" button: another hint, or a redraw of the current frame.
    pub fn next(&self) -> Result<JsValue, JsValue> {
        let mut session = self.session_mut()?;
        let step = session.advance()?;
        present(&self.ctx, &self.canvas, &step)?;
        view_value(&session)
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        self.session_mut()?.reset();
        clear(&self.ctx, &self.canvas);
        Ok(())
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        view_value(&*borrow_session(&self.session)?)
    }
}

impl QuizWidget {
    fn session_mut(&self) -> Result<RefMut<'_, QuizSession>, QuizError> {
        borrow_session_mut(&self.session)
    }
}

fn borrow_session(session: &RefCell<QuizSession>) -> Result<Ref<'_, QuizSession>, QuizError> {
    session.try_borrow().map_err(|_| QuizError::SessionBusy)
}

fn borrow_session_mut(session: &RefCell<QuizSession>) -> Result<RefMut<'_, QuizSession>, QuizError> {
    session.try_borrow_mut().map_err(|_| QuizError::SessionBusy)
}

/// Bind a detached selection to the session. `None` means a reset or newer
/// start made `ticket` stale; the result, success or failure, is dropped.
fn settle_start(
    session: &RefCell<QuizSession>,
    ticket: StartTicket,
    outcome: crate::Result<Selection>,
) -> Result<Option<Step>, QuizError> {
    match borrow_session_mut(session)?.conclude(ticket, outcome) {
        Ok(step) => Ok(Some(step)),
        Err(QuizError::Superseded { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

fn view_value(session: &QuizSession) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(&session.view()).map_err(QuizError::from)?;
    js_sys::JSON::parse(&json)
}

fn present(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement, step: &Step) -> Result<(), JsValue> {
    match step {
        Step::Frame { frame, .. } => draw_frame(ctx, canvas, frame),
        Step::Solved(res) | Step::Revealed(res) => match &res.art {
            Some(frame) => draw_frame(ctx, canvas, frame),
            None => Ok(()),
        },
        Step::Hint { .. } | Step::NoMoreHints => Ok(()),
    }
}

fn draw_frame(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement, frame: &Frame) -> Result<(), JsValue> {
    let vp = frame.viewport();
    canvas.set_width(vp.width);
    canvas.set_height(vp.height);
    match frame {
        Frame::Image(px) => {
            let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(px.data()), px.width(), px.height())?;
            ctx.put_image_data(&data, 0.0, 0.0)
        }
        Frame::Placeholder { degradation, .. } => {
            clear(ctx, canvas);
            ctx.set_fill_style_str("#c33");
            ctx.set_font("16px sans-serif");
            ctx.set_text_align("center");
            ctx.fill_text(&degradation.to_string(), vp.width as f64 / 2.0, vp.height as f64 / 2.0)
        }
    }
}

fn clear(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement) {
    ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
}
