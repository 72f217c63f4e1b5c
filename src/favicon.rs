use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::error::PageError;

const SIZE: u32 = 64;
const FONT: &str = "64px serif";
const BASELINE: f64 = 56.0;

/// Rasterizes the `data-emoji` glyph of the page icon link and uses it as
/// the favicon. Returns whether the icon was replaced.
pub fn render_emoji_favicon(document: &Document) -> Result<bool, PageError> {
    let Some(link) = document.query_selector("html > head > link[rel=icon]")? else {
        return Ok(false);
    };
    let Some(emoji) = link.get_attribute("data-emoji").filter(|e| !e.is_empty()) else {
        return Ok(false);
    };

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| PageError::MissingElement("canvas"))?;
    canvas.set_width(SIZE);
    canvas.set_height(SIZE);

    let ctx = canvas
        .get_context("2d")?
        .ok_or(PageError::MissingElement("2d canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| PageError::MissingElement("2d canvas context"))?;
    ctx.set_font(FONT);
    ctx.fill_text(&emoji, 0.0, BASELINE)?;

    let icon = canvas.to_data_url()?;
    link.set_attribute("href", &icon)?;
    Ok(true)
}
