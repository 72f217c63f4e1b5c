use leptos::task::spawn_local;

use std::cell::{Cell, OnceCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, HtmlElement};

use crate::autocomplete::{self, AutocompleteOptions, TagAutocomplete};
use crate::config::PageConfig;
use crate::error::PageError;
use crate::session::{self, SessionState};
use crate::tag_cloud::{self, FontScale};
use crate::{favicon, http, images, linkify, theme};

fn report<T: std::fmt::Debug>(step: &str, outcome: Result<T, PageError>) {
    match outcome {
        Ok(value) => log::debug!("{step}: {value:?}"),
        Err(PageError::MissingElement(what)) => log::debug!("{step}: skipped, no {what}"),
        Err(err) => log::warn!("{step}: {err}"),
    }
}

/// Owns everything one page load sets up. Built once; `run` only does its
/// work the first time it is called.
pub struct PageController {
    document: Document,
    config: PageConfig,
    base: String,
    hooked: Cell<bool>,
    started: Cell<bool>,
    autocomplete: OnceCell<Rc<TagAutocomplete>>,
}

impl PageController {
    pub fn new(document: Document, config: PageConfig) -> Rc<Self> {
        let base = document
            .document_element()
            .and_then(|root| root.get_attribute("data-xml-base-pub"))
            .unwrap_or_default();
        Rc::new(Self {
            document,
            config,
            base,
            hooked: Cell::new(false),
            started: Cell::new(false),
            autocomplete: OnceCell::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    /// Runs the page setup once the DOM is parsed. Registering more than
    /// once is a no-op.
    pub fn on_ready(self: &Rc<Self>) -> Result<(), PageError> {
        if self.hooked.replace(true) {
            return Ok(());
        }
        if self.document.ready_state() != "loading" {
            self.run();
            return Ok(());
        }

        let page = Rc::clone(self);
        let closure = Closure::<dyn FnMut()>::new(move || page.run());
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        self.document
            .add_event_listener_with_callback_and_add_event_listener_options(
                "DOMContentLoaded",
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
        closure.forget();
        Ok(())
    }

    pub fn run(self: &Rc<Self>) {
        if self.started.replace(true) {
            return;
        }
        log::debug!("page ready, base {:?}", self.base);

        if let Some(root) = self.document.document_element() {
            report("logged-out marker", SessionState::LoggedOut.apply(&root));
        }
        report("theme", theme::restore(&self.document));
        self.probe_session();

        report("autocomplete", self.bind_autocomplete().map(|ac| ac.len()));
        self.load_tag_index();

        report(
            "tag cloud",
            tag_cloud::size_tag_cloud(
                &self.document,
                FontScale::new(self.config.font_min, self.config.font_max),
            ),
        );
        report("deferred images", images::load_deferred_images(&self.document));
        report("linkify", linkify::linkify_entries(&self.document));
        report("favicon", favicon::render_emoji_favicon(&self.document));
        report("search focus", self.focus_search());
    }

    fn probe_session(&self) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        let url = self.url(&self.config.session_path);
        let timeout = self.config.session_timeout_ms;
        spawn_local(async move {
            let state = session::probe(&url, timeout).await;
            report("session", state.apply(&root).map(|_| state));
        });
    }

    fn bind_autocomplete(&self) -> Result<Rc<TagAutocomplete>, PageError> {
        if let Some(bound) = self.autocomplete.get() {
            return Ok(Rc::clone(bound));
        }
        let options = AutocompleteOptions {
            min_chars: self.config.min_chars,
            max_items: self.config.max_items,
            mode: self.config.token_mode,
        };
        let bound = Rc::new(TagAutocomplete::bind(
            &self.document,
            &self.config.tag_input_selectors,
            options,
        )?);
        Ok(Rc::clone(self.autocomplete.get_or_init(|| bound)))
    }

    fn load_tag_index(&self) {
        let Some(bound) = self.autocomplete.get().cloned() else {
            return;
        };
        if bound.is_empty() {
            return;
        }
        let url = self.url(&self.config.tag_index_path);
        let timeout = self.config.tag_index_timeout_ms;
        spawn_local(async move {
            let outcome = async {
                let body = http::get_text(&url, timeout).await?;
                let suggestions = autocomplete::parse_suggestions(&body)?;
                bound.set_suggestions(&suggestions)?;
                Ok::<_, PageError>(suggestions.len())
            }
            .await;
            report("tag index", outcome);
        });
    }

    fn focus_search(&self) -> Result<(), PageError> {
        let search = self
            .document
            .get_element_by_id(&self.config.search_input_id)
            .ok_or(PageError::MissingElement("search field"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| PageError::MissingElement("focusable search field"))?;
        search.focus()?;
        Ok(())
    }
}
