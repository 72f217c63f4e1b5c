#![cfg(target_arch = "wasm32")]

use shaarligo_ui::autocomplete::{AutocompleteOptions, TagAutocomplete, TokenMode};
use shaarligo_ui::session::{SessionState, LOGGED_IN, LOGGED_OUT};
use shaarligo_ui::tag_cloud::{self, FontScale};
use shaarligo_ui::theme::Theme;
use shaarligo_ui::{favicon, images, linkify, PageConfig, PageController, PageError};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn element(tag: &str) -> Element {
    document().create_element(tag).unwrap()
}

/// A detached document with its own ids, so tests do not see each other.
fn blank_document(body: &str) -> Document {
    let doc = document()
        .implementation()
        .unwrap()
        .create_html_document_with_title("test")
        .unwrap();
    doc.body().unwrap().set_inner_html(body);
    doc
}

async fn next_frame() {
    let frame = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .request_animation_frame(&resolve)
            .unwrap();
    });
    JsFuture::from(frame).await.unwrap();
}

fn font_size(doc: &Document, id: &str) -> String {
    doc.get_element_by_id(id)
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap()
        .style()
        .get_property_value("font-size")
        .unwrap()
}

#[wasm_bindgen_test]
fn deferred_image_promotion_is_idempotent() {
    let img = element("img");
    img.set_attribute("data-src", "/img/cat.png").unwrap();

    assert!(images::promote(&img).unwrap());
    let once = img.get_attribute("src");
    assert!(images::promote(&img).unwrap());
    assert_eq!(img.get_attribute("src"), once);
    assert_eq!(once.as_deref(), Some("/img/cat.png"));

    let plain = element("img");
    assert!(!images::promote(&plain).unwrap());
    assert_eq!(plain.get_attribute("src"), None);
}

#[wasm_bindgen_test]
fn session_state_toggles_marker_classes() {
    let root = element("html");
    SessionState::LoggedOut.apply(&root).unwrap();
    assert!(root.class_list().contains(LOGGED_OUT));

    SessionState::from_status(Some(200)).apply(&root).unwrap();
    assert!(root.class_list().contains(LOGGED_IN));
    assert!(!root.class_list().contains(LOGGED_OUT));

    SessionState::from_status(Some(403)).apply(&root).unwrap();
    assert!(!root.class_list().contains(LOGGED_IN));
    assert!(root.class_list().contains(LOGGED_OUT));
}

#[wasm_bindgen_test]
fn linkifies_text_nodes_only() {
    let doc = document();
    let block = element("div");
    block.set_inner_html(
        "see https://example.com/a,b. <a href=\"/x\">http://kept.example</a> <b>CVE-2021-44228</b>",
    );

    let rewritten = linkify::linkify_element(&doc, &block).unwrap();
    assert_eq!(rewritten, 2);

    let anchors = block.query_selector_all("a").unwrap();
    assert_eq!(anchors.length(), 3);

    let http = block.query_selector("a.http").unwrap().unwrap();
    assert_eq!(http.get_attribute("href").as_deref(), Some("https://example.com/a,b"));
    assert_eq!(http.get_attribute("rel").as_deref(), Some("noreferrer"));

    let cve = block.query_selector("b > a.cve").unwrap().unwrap();
    assert_eq!(cve.text_content().as_deref(), Some("CVE-2021-44228"));

    // a second run finds nothing left to wrap
    assert_eq!(linkify::linkify_element(&doc, &block).unwrap(), 0);
}

#[wasm_bindgen_test]
fn geo_link_has_coordinate_spans() {
    let doc = document();
    let block = element("p");
    block.set_text_content(Some("geo:52.5,13.4?z=10"));
    linkify::linkify_element(&doc, &block).unwrap();

    let geo = block.query_selector("a.geo").unwrap().unwrap();
    assert_eq!(geo.get_attribute("title").as_deref(), Some("zoom=10"));
    let lat = geo.query_selector(".latitude").unwrap().unwrap();
    let lon = geo.query_selector(".longitude").unwrap().unwrap();
    assert_eq!(lat.text_content().as_deref(), Some("52.5"));
    assert_eq!(lon.text_content().as_deref(), Some("13.4"));
}

#[wasm_bindgen_test]
fn theme_classes_are_exclusive() {
    let root = element("html");
    Theme::Dark.apply(&root).unwrap();
    assert!(root.class_list().contains("dark"));

    Theme::Light.apply(&root).unwrap();
    assert!(root.class_list().contains("light"));
    assert!(!root.class_list().contains("dark"));

    Theme::Default.apply(&root).unwrap();
    assert_eq!(root.class_list().length(), 0);
}

#[wasm_bindgen_test]
async fn tag_cloud_sizes_land_in_the_next_frame() {
    let _ = leptos::task::Executor::init_wasm_bindgen();
    let doc = blank_document(
        r#"<div id="tags">
            <a id="t1" class="tag"><span class="label">once</span><span class="count">1</span></a>
            <a id="t2" class="tag"><span class="label">often</span><span class="count">100</span></a>
            <a id="t3" class="tag"><span class="label">odd</span><span class="count">n/a</span></a>
        </div>"#,
    );

    let scheduled = tag_cloud::size_tag_cloud(&doc, FontScale::new(8.0, 32.0)).unwrap();
    assert_eq!(scheduled, 3);
    assert_eq!(font_size(&doc, "t2"), "");

    next_frame().await;
    next_frame().await;
    assert_eq!(font_size(&doc, "t1"), "8pt");
    assert_eq!(font_size(&doc, "t2"), "32pt");
    assert_eq!(font_size(&doc, "t3"), "8pt");
}

#[wasm_bindgen_test]
fn missing_containers_are_reported_or_skipped() {
    let doc = blank_document("<p>nothing here</p>");
    assert!(matches!(
        tag_cloud::size_tag_cloud(&doc, FontScale::new(8.0, 32.0)),
        Err(PageError::MissingElement("#tags"))
    ));
    assert!(matches!(
        linkify::linkify_entries(&doc),
        Err(PageError::MissingElement("#entries"))
    ));
    assert!(!favicon::render_emoji_favicon(&doc).unwrap());
}

#[wasm_bindgen_test]
fn page_setup_runs_once() {
    let _ = leptos::task::Executor::init_wasm_bindgen();
    let doc = blank_document(r#"<div id="entries"><p class="rendered">CVE-2014-0160</p></div>"#);
    let page = PageController::new(doc.clone(), PageConfig::default());
    let root = doc.document_element().unwrap();

    page.run();
    assert!(root.class_list().contains(LOGGED_OUT));
    assert_eq!(doc.query_selector_all("a.cve").unwrap().length(), 1);

    root.class_list().remove_1(LOGGED_OUT).unwrap();
    page.run();
    page.on_ready().unwrap();
    page.on_ready().unwrap();
    assert!(!root.class_list().contains(LOGGED_OUT));
    assert_eq!(doc.query_selector_all("a.cve").unwrap().length(), 1);
}

#[wasm_bindgen_test]
fn rejected_fields_do_not_abort_binding() {
    // no Awesomplete global is loaded here, so every field is rejected
    let doc = blank_document(r#"<input data-multiple><textarea data-multiple></textarea>"#);
    let bound = TagAutocomplete::bind(
        &doc,
        &["input[data-multiple]".to_string(), "textarea[data-multiple]".to_string()],
        AutocompleteOptions {
            min_chars: 3,
            max_items: 15,
            mode: TokenMode::Hash,
        },
    )
    .unwrap();
    assert!(bound.is_empty());
}
