use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::error::PageError;

pub const DEFERRED_ATTR: &str = "data-src";

/// The source to promote, if the element has a usable one.
pub fn deferred_source(attr: Option<String>) -> Option<String> {
    attr.filter(|v| !v.trim().is_empty())
}

/// Copies `data-src` into `src`. The placeholder attribute stays, so running
/// this again yields the same `src`.
pub fn promote(img: &Element) -> Result<bool, PageError> {
    let Some(src) = deferred_source(img.get_attribute(DEFERRED_ATTR)) else {
        return Ok(false);
    };
    img.set_attribute("src", &src)?;
    Ok(true)
}

pub fn load_deferred_images(document: &Document) -> Result<usize, PageError> {
    let images = document.query_selector_all("img[data-src]")?;
    let mut loaded = 0;
    for i in 0..images.length() {
        let Some(img) = images.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if promote(&img)? {
            loaded += 1;
        }
    }
    Ok(loaded)
}
