use std::collections::HashMap;

use leptos::prelude::request_animation_frame;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::error::PageError;

/// Font range of the tag cloud, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontScale {
    pub min: f64,
    pub max: f64,
}

impl FontScale {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    fn span(self) -> f64 {
        self.max - self.min
    }
}

pub fn parse_count(text: &str) -> Option<u64> {
    text.trim().parse().ok()
}

/// Font size per entry: `ceil(ln(count) / max_ln * span) + min`.
///
/// Entries without a usable count (unparseable or zero) do not take part in
/// the maximum and get `scale.min`.
pub fn font_sizes(counts: &[Option<u64>], scale: FontScale) -> Vec<f64> {
    let mut logs: HashMap<u64, f64> = HashMap::new();
    let mut max_log = 0f64;
    for count in counts.iter().flatten().filter(|c| **c > 0) {
        let ln = *logs.entry(*count).or_insert_with(|| (*count as f64).ln());
        max_log = max_log.max(ln);
    }

    let mut sizes: HashMap<u64, f64> = HashMap::new();
    counts
        .iter()
        .map(|count| match count {
            Some(c) if *c > 0 && max_log > 0.0 => *sizes.entry(*c).or_insert_with(|| {
                let ln = logs.get(c).copied().unwrap_or_else(|| (*c as f64).ln());
                let grow = (ln / max_log * scale.span()).ceil();
                (grow + scale.min).min(scale.max)
            }),
            _ => scale.min,
        })
        .collect()
}

fn format_points(size: f64) -> String {
    format!("{size}pt")
}

fn count_of(tag: &Element) -> Option<u64> {
    tag.get_elements_by_class_name("count")
        .item(0)
        .and_then(|el| el.text_content())
        .and_then(|text| parse_count(&text))
}

/// Reads every `.tag` below `#tags`, then sets the font sizes in the next
/// animation frame. Returns the number of entries scheduled.
pub fn size_tag_cloud(document: &Document, scale: FontScale) -> Result<usize, PageError> {
    let container = document
        .get_element_by_id("tags")
        .ok_or(PageError::MissingElement("#tags"))?;
    let collection = container.get_elements_by_class_name("tag");

    let mut tags: Vec<HtmlElement> = Vec::with_capacity(collection.length() as usize);
    let mut counts: Vec<Option<u64>> = Vec::with_capacity(tags.capacity());
    for i in 0..collection.length() {
        let Some(el) = collection.item(i) else {
            continue;
        };
        let count = count_of(&el);
        let Ok(html) = el.dyn_into::<HtmlElement>() else {
            continue;
        };
        counts.push(count);
        tags.push(html);
    }

    let sizes = font_sizes(&counts, scale);
    let scheduled = tags.len();
    log::debug!("sizing {scheduled} tags");
    request_animation_frame(move || {
        for (tag, size) in tags.iter().zip(sizes) {
            if let Err(err) = tag.style().set_property("font-size", &format_points(size)) {
                log::debug!("font-size not applied: {:?}", err);
            }
        }
    });
    Ok(scheduled)
}
