use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement};

use crate::error::PageError;

#[wasm_bindgen]
extern "C" {
    /// The Awesomplete widget loaded by the page.
    #[derive(Clone, Debug)]
    pub type Awesomplete;

    #[wasm_bindgen(constructor, catch)]
    fn new(input: &Element, options: &JsValue) -> Result<Awesomplete, JsValue>;

    #[wasm_bindgen(method, setter)]
    fn set_list(this: &Awesomplete, list: &JsValue);

    #[wasm_bindgen(static_method_of = Awesomplete, js_name = ITEM)]
    fn item(text: &JsValue, input: &str) -> JsValue;
}

/// How the fragment being completed is found in the field value.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    /// Text after the last `#`, as long as it has no whitespace.
    #[default]
    Hash,
    /// The trailing non-whitespace token.
    Whitespace,
}

impl TokenMode {
    pub fn fragment(self, value: &str) -> Option<&str> {
        static RE_HASH: OnceLock<Regex> = OnceLock::new();
        static RE_WORD: OnceLock<Regex> = OnceLock::new();

        let caps = match self {
            TokenMode::Hash => RE_HASH
                .get_or_init(|| Regex::new(r"#(\S*)$").unwrap())
                .captures(value)?,
            TokenMode::Whitespace => RE_WORD
                .get_or_init(|| Regex::new(r"(\S*)$").unwrap())
                .captures(value)?,
        };
        caps.get(1).map(|m| m.as_str())
    }

    /// New field value after picking `chosen`: the fragment is spliced out,
    /// everything before it stays, and a single space follows the tag.
    pub fn replace(self, value: &str, chosen: &str) -> String {
        static RE_TAIL: OnceLock<Regex> = OnceLock::new();

        match self {
            TokenMode::Hash => {
                let tag = if chosen.starts_with('#') {
                    chosen.to_string()
                } else {
                    format!("#{chosen}")
                };
                let re = RE_TAIL.get_or_init(|| Regex::new(r"#[^#]+$").unwrap());
                let start = re.find(value).map(|m| m.start()).unwrap_or(value.len());
                format!("{}{tag} ", &value[..start])
            }
            TokenMode::Whitespace => {
                let before = value.trim_end_matches(|c: char| !c.is_whitespace());
                format!("{before}{chosen} ")
            }
        }
    }
}

/// Case-insensitive containment. An empty fragment matches nothing.
pub fn matches(candidate: &str, fragment: &str) -> bool {
    let needle = fragment.trim();
    !needle.is_empty() && candidate.to_lowercase().contains(&needle.to_lowercase())
}

/// One entry of the tag index: a bare tag, or a label shown for a value
/// inserted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Suggestion {
    Plain(String),
    Pair { label: String, value: String },
}

pub fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, PageError> {
    Ok(serde_json::from_str(body)?)
}

fn suggestion_field(text: &JsValue, field: &str) -> String {
    if let Some(plain) = text.as_string() {
        return plain;
    }
    js_sys::Reflect::get(text, &JsValue::from_str(field))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| String::from(js_sys::JsString::from(text.clone())))
}

/// Wraps the `value` of an `<input>` or `<textarea>`.
#[derive(Clone)]
enum TagField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl TagField {
    fn from_element(el: Element) -> Option<Self> {
        match el.dyn_into::<HtmlInputElement>() {
            Ok(input) => Some(TagField::Input(input)),
            Err(el) => el.dyn_into::<HtmlTextAreaElement>().ok().map(TagField::TextArea),
        }
    }

    fn element(&self) -> &Element {
        match self {
            TagField::Input(el) => el.as_ref(),
            TagField::TextArea(el) => el.as_ref(),
        }
    }

    fn value(&self) -> String {
        match self {
            TagField::Input(el) => el.value(),
            TagField::TextArea(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            TagField::Input(el) => el.set_value(value),
            TagField::TextArea(el) => el.set_value(value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutocompleteOptions {
    pub min_chars: u32,
    pub max_items: u32,
    pub mode: TokenMode,
}

struct Callbacks {
    _filter: Closure<dyn Fn(JsValue, String) -> bool>,
    _item: Closure<dyn Fn(JsValue, String) -> JsValue>,
    _replace: Closure<dyn Fn(JsValue)>,
}

/// Awesomplete instances for every multi-tag field on the page, sharing one
/// suggestion list. A field the widget rejects is left unbound; the others
/// keep their callbacks.
pub struct TagAutocomplete {
    instances: Vec<Awesomplete>,
    _callbacks: Vec<Callbacks>,
}

impl TagAutocomplete {
    pub fn bind(
        document: &Document,
        selectors: &[String],
        options: AutocompleteOptions,
    ) -> Result<Self, PageError> {
        let mut instances = Vec::new();
        let mut callbacks = Vec::new();
        for selector in selectors {
            let nodes = document.query_selector_all(selector)?;
            for i in 0..nodes.length() {
                let Some(field) = nodes
                    .item(i)
                    .and_then(|n| n.dyn_into::<Element>().ok())
                    .and_then(TagField::from_element)
                else {
                    continue;
                };
                match Self::attach(field, options) {
                    Ok((instance, cbs)) => {
                        instances.push(instance);
                        callbacks.push(cbs);
                    }
                    Err(err) => log::warn!("autocomplete skipped a {selector} field: {err}"),
                }
            }
        }
        log::debug!("autocomplete bound to {} fields", instances.len());
        Ok(Self {
            instances,
            _callbacks: callbacks,
        })
    }

    fn attach(
        field: TagField,
        options: AutocompleteOptions,
    ) -> Result<(Awesomplete, Callbacks), PageError> {
        let mode = options.mode;
        let filter = Closure::<dyn Fn(JsValue, String) -> bool>::new(
            move |text: JsValue, input: String| {
                mode.fragment(&input)
                    .is_some_and(|fragment| matches(&suggestion_field(&text, "label"), fragment))
            },
        );
        let item = Closure::<dyn Fn(JsValue, String) -> JsValue>::new(
            move |text: JsValue, input: String| {
                Awesomplete::item(&text, mode.fragment(&input).unwrap_or_default())
            },
        );
        let target = field.clone();
        let replace = Closure::<dyn Fn(JsValue)>::new(move |text: JsValue| {
            let chosen = suggestion_field(&text, "value");
            target.set_value(&mode.replace(&target.value(), &chosen));
        });

        let opts = js_sys::Object::new();
        js_sys::Reflect::set(&opts, &"minChars".into(), &options.min_chars.into())?;
        js_sys::Reflect::set(&opts, &"maxItems".into(), &options.max_items.into())?;
        js_sys::Reflect::set(&opts, &"filter".into(), filter.as_ref())?;
        js_sys::Reflect::set(&opts, &"item".into(), item.as_ref())?;
        js_sys::Reflect::set(&opts, &"replace".into(), replace.as_ref())?;

        let instance = Awesomplete::new(field.element(), &opts)?;
        Ok((
            instance,
            Callbacks {
                _filter: filter,
                _item: item,
                _replace: replace,
            },
        ))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Replaces the list of every instance at once.
    pub fn set_suggestions(&self, suggestions: &[Suggestion]) -> Result<(), PageError> {
        let list = suggestions.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?;
        for instance in &self.instances {
            instance.set_list(&list);
        }
        Ok(())
    }
}
