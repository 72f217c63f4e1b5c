//! Page enhancements for ShaarliGo: session marker, tag autocomplete, tag
//! cloud sizing, deferred images, text linkification, emoji favicon and the
//! theme toggle.

mod app;
pub mod autocomplete;
pub mod config;
pub mod error;
pub mod favicon;
mod http;
pub mod images;
pub mod linkify;
pub mod session;
pub mod tag_cloud;
pub mod theme;

use std::cell::OnceCell;
use std::rc::Rc;

use leptos::prelude::document;
use wasm_bindgen::prelude::*;

pub use app::PageController;
pub use config::PageConfig;
pub use error::PageError;

thread_local! {
    static PAGE: OnceCell<Rc<PageController>> = const { OnceCell::new() };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = leptos::task::Executor::init_wasm_bindgen();

    let document = document();
    let parsed = PageConfig::from_attribute(
        document
            .document_element()
            .and_then(|root| root.get_attribute("data-page-config"))
            .as_deref(),
    );
    let level = parsed
        .as_ref()
        .map(PageConfig::log_level)
        .unwrap_or(log::Level::Info);
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    let config = parsed.unwrap_or_else(|err| {
        log::warn!("ignoring data-page-config: {err}");
        PageConfig::default()
    });

    PAGE.with(|cell| {
        let page = cell.get_or_init(|| PageController::new(document, config));
        if let Err(err) = page.on_ready() {
            log::warn!("page setup not scheduled: {err}");
        }
    });
}

/// Bound to the theme switch in the page templates.
#[wasm_bindgen]
pub fn toggle_theme() {
    if let Err(err) = theme::toggle(&document()) {
        log::warn!("theme toggle failed: {err}");
    }
}

/// Linkified HTML for a plain-text snippet.
#[wasm_bindgen]
pub fn linkify_html(text: &str) -> String {
    linkify::to_html(&linkify::linkify(text))
}
