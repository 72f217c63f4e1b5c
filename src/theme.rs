use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlDocument};

use crate::error::PageError;

const COOKIE: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Light,
}

impl Theme {
    /// Reads the `theme` entry of a `document.cookie` string.
    pub fn from_cookies(cookies: &str) -> Self {
        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE)
            .map(|(_, value)| match value.trim() {
                "dark" => Theme::Dark,
                "light" => Theme::Light,
                _ => Theme::Default,
            })
            .unwrap_or_default()
    }

    pub fn next(self) -> Self {
        match self {
            Theme::Default => Theme::Dark,
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Default,
        }
    }

    pub fn class(self) -> Option<&'static str> {
        match self {
            Theme::Default => None,
            Theme::Dark => Some("dark"),
            Theme::Light => Some("light"),
        }
    }

    pub fn cookie(self) -> String {
        match self.class() {
            Some(name) => format!("{COOKIE}={name}; path=/; SameSite=Lax"),
            None => format!("{COOKIE}=; path=/; max-age=0; SameSite=Lax"),
        }
    }

    pub fn apply(self, root: &Element) -> Result<(), PageError> {
        let classes = root.class_list();
        classes.remove_2("dark", "light")?;
        if let Some(name) = self.class() {
            classes.add_1(name)?;
        }
        Ok(())
    }
}

fn html_document(document: &Document) -> Result<&HtmlDocument, PageError> {
    document
        .dyn_ref::<HtmlDocument>()
        .ok_or(PageError::MissingElement("html document"))
}

pub fn current(document: &Document) -> Result<Theme, PageError> {
    Ok(Theme::from_cookies(&html_document(document)?.cookie()?))
}

/// Applies the theme stored in the cookie.
pub fn restore(document: &Document) -> Result<Theme, PageError> {
    let theme = current(document)?;
    if let Some(root) = document.document_element() {
        theme.apply(&root)?;
    }
    Ok(theme)
}

/// Moves to the next theme, stores it and updates the root classes.
pub fn toggle(document: &Document) -> Result<Theme, PageError> {
    let theme = current(document)?.next();
    html_document(document)?.set_cookie(&theme.cookie())?;
    if let Some(root) = document.document_element() {
        theme.apply(&root)?;
    }
    log::info!("theme is now {theme:?}");
    Ok(theme)
}
