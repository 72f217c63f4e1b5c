use regex::{Captures, Regex};
use std::sync::OnceLock;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node, Text};

use crate::error::PageError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    Http,
    Geo,
    Rfc,
    Isbn,
    Cve,
}

impl LinkKind {
    /// Passes run in this order; later passes only see leftover text.
    pub const ORDER: [LinkKind; 5] = [
        LinkKind::Http,
        LinkKind::Geo,
        LinkKind::Rfc,
        LinkKind::Isbn,
        LinkKind::Cve,
    ];

    pub fn class(self) -> &'static str {
        match self {
            LinkKind::Http => "http",
            LinkKind::Geo => "geo",
            LinkKind::Rfc => "rfc",
            LinkKind::Isbn => "isbn",
            LinkKind::Cve => "cve",
        }
    }

    fn pattern(self) -> &'static Regex {
        static RE_HTTP: OnceLock<Regex> = OnceLock::new();
        static RE_GEO: OnceLock<Regex> = OnceLock::new();
        static RE_RFC: OnceLock<Regex> = OnceLock::new();
        static RE_ISBN: OnceLock<Regex> = OnceLock::new();
        static RE_CVE: OnceLock<Regex> = OnceLock::new();

        match self {
            LinkKind::Http => RE_HTTP.get_or_init(|| {
                Regex::new(r#"(?i)https?://[^ \t\r\n"']+[^ ?\t\r\n"'.,;()]"#).unwrap()
            }),
            LinkKind::Geo => RE_GEO.get_or_init(|| {
                Regex::new(r"(?i)geo:(-?\d+\.\d+),(-?\d+\.\d+)(\?z=(\d+))?").unwrap()
            }),
            LinkKind::Rfc => RE_RFC
                .get_or_init(|| Regex::new(r"(?i)urn:ietf:rfc:(\d+)(#\S*[0-9a-z])?").unwrap()),
            LinkKind::Isbn => RE_ISBN
                .get_or_init(|| Regex::new(r"(?i)urn:isbn:([0-9-]+)(#\S*[0-9a-z])?").unwrap()),
            LinkKind::Cve => RE_CVE.get_or_init(|| Regex::new(r"(?i)\bCVE-\d+-\d+").unwrap()),
        }
    }

    fn build(self, caps: &Captures) -> Link {
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();
        let text = group(0).to_string();
        match self {
            LinkKind::Http => Link {
                kind: self,
                href: text.clone(),
                title: None,
                text,
                geo: None,
            },
            LinkKind::Geo => {
                let latitude = group(1).to_string();
                let longitude = group(2).to_string();
                let zoom = caps.get(4).map(|m| m.as_str().to_string());
                Link {
                    kind: self,
                    href: format!("https://opentopomap.org/#marker=12/{latitude}/{longitude}"),
                    title: zoom.as_ref().map(|z| format!("zoom={z}")),
                    text,
                    geo: Some(GeoPoint {
                        latitude,
                        longitude,
                        zoom,
                    }),
                }
            }
            LinkKind::Rfc => Link {
                kind: self,
                href: format!("https://tools.ietf.org/html/rfc{}{}", group(1), group(2)),
                title: Some(format!("RFC {}", group(1))),
                text,
                geo: None,
            },
            LinkKind::Isbn => Link {
                kind: self,
                href: format!(
                    "https://de.wikipedia.org/wiki/Spezial:ISBN-Suche?isbn={}",
                    group(1)
                ),
                title: Some(format!("ISBN {}", group(1))),
                text,
                geo: None,
            },
            LinkKind::Cve => Link {
                kind: self,
                href: format!("https://cve.mitre.org/cgi-bin/cvename.cgi?name={text}"),
                title: None,
                text,
                geo: None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeoPoint {
    pub latitude: String,
    pub longitude: String,
    pub zoom: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    pub href: String,
    pub title: Option<String>,
    pub text: String,
    pub geo: Option<GeoPoint>,
}

impl Link {
    pub fn rel(&self) -> Option<&'static str> {
        match self.kind {
            LinkKind::Http => Some("noreferrer"),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link(Link),
}

fn apply_pass(segments: Vec<Segment>, kind: LinkKind) -> Vec<Segment> {
    let re = kind.pattern();
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        let text = match segment {
            Segment::Text(text) => text,
            link => {
                out.push(link);
                continue;
            }
        };
        let mut cursor = 0usize;
        for caps in re.captures_iter(&text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > cursor {
                out.push(Segment::Text(text[cursor..whole.start()].to_string()));
            }
            out.push(Segment::Link(kind.build(&caps)));
            cursor = whole.end();
        }
        if cursor < text.len() {
            out.push(Segment::Text(text[cursor..].to_string()));
        }
    }
    out
}

/// Splits plain text into text runs and recognized links.
pub fn linkify(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    LinkKind::ORDER
        .iter()
        .fold(vec![Segment::Text(text.to_string())], |segments, kind| {
            apply_pass(segments, *kind)
        })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn to_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => html.push_str(&escape_html(text)),
            Segment::Link(link) => {
                html.push_str("<a");
                if let Some(rel) = link.rel() {
                    html.push_str(&format!(" rel=\"{rel}\""));
                }
                html.push_str(&format!(
                    " class=\"{}\" href=\"{}\"",
                    link.kind.class(),
                    escape_html(&link.href)
                ));
                if let Some(title) = &link.title {
                    html.push_str(&format!(" title=\"{}\"", escape_html(title)));
                }
                html.push('>');
                match &link.geo {
                    Some(geo) => {
                        html.push_str(&format!(
                            "geo:<span class=\"latitude\">{}</span>,<span class=\"longitude\">{}</span>",
                            escape_html(&geo.latitude),
                            escape_html(&geo.longitude)
                        ));
                        if let Some(zoom) = &geo.zoom {
                            html.push_str(&format!("?z={}", escape_html(zoom)));
                        }
                    }
                    None => html.push_str(&escape_html(&link.text)),
                }
                html.push_str("</a>");
            }
        }
    }
    html
}

fn span(document: &Document, class: &str, text: &str) -> Result<Element, PageError> {
    let el = document.create_element("span")?;
    el.set_class_name(class);
    el.set_text_content(Some(text));
    Ok(el)
}

fn link_node(document: &Document, link: &Link) -> Result<Element, PageError> {
    let a = document.create_element("a")?;
    if let Some(rel) = link.rel() {
        a.set_attribute("rel", rel)?;
    }
    a.set_class_name(link.kind.class());
    a.set_attribute("href", &link.href)?;
    if let Some(title) = &link.title {
        a.set_attribute("title", title)?;
    }
    match &link.geo {
        Some(geo) => {
            let latitude = span(document, "latitude", &geo.latitude)?;
            let longitude = span(document, "longitude", &geo.longitude)?;
            a.append_child(&document.create_text_node("geo:"))?;
            a.append_child(&latitude)?;
            a.append_child(&document.create_text_node(","))?;
            a.append_child(&longitude)?;
            if let Some(zoom) = &geo.zoom {
                a.append_child(&document.create_text_node(&format!("?z={zoom}")))?;
            }
        }
        None => a.set_text_content(Some(&link.text)),
    }
    Ok(a)
}

fn collect_text_nodes(node: &Node, out: &mut Vec<Text>) {
    let mut child = node.first_child();
    while let Some(current) = child {
        match current.node_type() {
            Node::TEXT_NODE => {
                if let Ok(text) = current.clone().dyn_into::<Text>() {
                    out.push(text);
                }
            }
            Node::ELEMENT_NODE => {
                let name = current.node_name().to_ascii_lowercase();
                if !matches!(name.as_str(), "a" | "script" | "style" | "textarea") {
                    collect_text_nodes(&current, out);
                }
            }
            _ => {}
        }
        child = current.next_sibling();
    }
}

/// Replaces recognized identifiers in the text nodes below `root` with
/// anchors. Returns the number of text nodes rewritten.
pub fn linkify_element(document: &Document, root: &Element) -> Result<usize, PageError> {
    let mut texts = Vec::new();
    collect_text_nodes(root, &mut texts);

    let mut rewritten = 0;
    for text in texts {
        let segments = linkify(&text.data());
        if !segments.iter().any(|s| matches!(s, Segment::Link(_))) {
            continue;
        }
        let Some(parent) = text.parent_node() else {
            continue;
        };
        let fragment = document.create_document_fragment();
        for segment in &segments {
            match segment {
                Segment::Text(plain) => {
                    fragment.append_child(&document.create_text_node(plain))?;
                }
                Segment::Link(link) => {
                    let anchor = link_node(document, link)?;
                    fragment.append_child(&anchor)?;
                }
            }
        }
        parent.replace_child(&fragment, &text)?;
        rewritten += 1;
    }
    Ok(rewritten)
}

/// Linkifies every `.rendered` block inside `#entries`.
pub fn linkify_entries(document: &Document) -> Result<usize, PageError> {
    let entries = document
        .get_element_by_id("entries")
        .ok_or(PageError::MissingElement("#entries"))?;
    let blocks = entries.get_elements_by_class_name("rendered");
    let mut rewritten = 0;
    for i in 0..blocks.length() {
        if let Some(block) = blocks.item(i) {
            rewritten += linkify_element(document, &block)?;
        }
    }
    Ok(rewritten)
}
