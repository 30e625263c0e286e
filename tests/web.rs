// Browser tests for the `QuizWidget` binding (run with `wasm-pack test --headless --chrome`).
#![cfg(target_arch = "wasm32")]

use card_quiz::web::{QuizWidget, fetch_pixels};
use js_sys::{Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

const CARDS: &str = r#"[{"name": "ピカチュウ", "info": ["でんき", "ねずみ"]}]"#;

fn mount_canvas(id: &str) -> HtmlCanvasElement {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .expect("document available");
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .expect("create canvas")
        .dyn_into()
        .expect("canvas element");
    canvas.set_id(id);
    document
        .body()
        .expect("body available")
        .append_child(&canvas)
        .expect("append canvas");
    canvas
}

fn field(view: &JsValue, key: &str) -> JsValue {
    Reflect::get(view, &JsValue::from_str(key)).expect("view field")
}

async fn settle(promise: Promise) -> Result<JsValue, JsValue> {
    JsFuture::from(promise).await
}

#[wasm_bindgen_test]
fn widget_binds_to_existing_canvas() {
    mount_canvas("quiz-bind");
    let widget = QuizWidget::new(CARDS, "quiz-bind").expect("widget");
    let view = widget.view().unwrap();
    assert_eq!(field(&view, "state").as_string().as_deref(), Some("idle"));
    assert!(QuizWidget::new(CARDS, "no-such-canvas").is_err());
    assert!(QuizWidget::new("not json", "quiz-bind").is_err());
}

#[wasm_bindgen_test(async)]
async fn text_quiz_runs_to_reveal() {
    mount_canvas("quiz-text");
    let widget = QuizWidget::new(CARDS, "quiz-text").unwrap();
    let view = settle(widget.start("cardName").unwrap()).await.unwrap();
    assert_eq!(field(&view, "state").as_string().as_deref(), Some("active"));

    widget.submit("ライチュウ").unwrap();
    let view = widget.submit("ライチュウ").unwrap();
    assert_eq!(field(&view, "state").as_string().as_deref(), Some("revealed"));
    assert_eq!(field(&view, "answer").as_string().as_deref(), Some("ピカチュウ"));
    assert!(widget.submit("x").is_err());
}

#[wasm_bindgen_test]
fn unknown_mode_is_rejected() {
    mount_canvas("quiz-mode");
    let widget = QuizWidget::new(CARDS, "quiz-mode").unwrap();
    assert!(widget.start("puzzle").is_err());
}

#[wasm_bindgen_test(async)]
async fn reset_during_start_resolves_null() {
    mount_canvas("quiz-reset");
    let widget = QuizWidget::new(CARDS, "quiz-reset").unwrap();
    let pending = widget.start("cardName").unwrap();
    widget.reset().unwrap();
    assert!(settle(pending).await.unwrap().is_null());
    let view = widget.view().unwrap();
    assert_eq!(field(&view, "state").as_string().as_deref(), Some("idle"));
}

#[wasm_bindgen_test(async)]
async fn failed_start_after_reset_resolves_null() {
    mount_canvas("quiz-stale-fail");
    let mut widget = QuizWidget::new(CARDS, "quiz-stale-fail").unwrap();
    widget.set_base_url("http://127.0.0.1:9/missing/");
    let pending = widget.start("mosaic").unwrap();
    widget.reset().unwrap();
    assert!(settle(pending).await.unwrap().is_null());
}

#[wasm_bindgen_test(async)]
async fn failed_start_rejects_when_current() {
    mount_canvas("quiz-fail");
    let mut widget = QuizWidget::new(CARDS, "quiz-fail").unwrap();
    widget.set_base_url("http://127.0.0.1:9/missing/");
    assert!(settle(widget.start("enlarge").unwrap()).await.is_err());
}

#[wasm_bindgen_test(async)]
async fn pixels_read_back_from_png_data_url() {
    let canvas = mount_canvas("quiz-pixels");
    canvas.set_width(3);
    canvas.set_height(2);
    let ctx: CanvasRenderingContext2d = canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap();
    ctx.set_fill_style_str("#ff0000");
    ctx.fill_rect(0.0, 0.0, 3.0, 2.0);
    let url = canvas.to_data_url().unwrap();

    let px = fetch_pixels(&url).await.unwrap();
    assert_eq!((px.width(), px.height()), (3, 2));
    assert_eq!(px.pixel(2, 1), [255, 0, 0, 255]);
}
