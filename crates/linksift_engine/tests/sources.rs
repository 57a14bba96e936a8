use std::sync::Once;

use linksift_core::{harvest, HarvestOptions, Link, LinkSource, RawLink, SourceError};
use linksift_engine::{frames_of, sources, DomSource, FrameSource, HtmlSource, Page};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(linksift_logging::initialize_for_tests);
}

const PAGE_URL: &str = "https://news.example.com/issues/42";

#[test]
fn dom_source_reads_anchor_text_and_href() {
    let html = r#"<p>Read <a href="/a"><b>the</b> story</a> or <a name="x">nothing</a></p>"#;
    let source = DomSource::new(Page::new(PAGE_URL, html));

    assert_eq!(
        source.links().unwrap(),
        vec![RawLink::new("the story", Some("/a".into()))]
    );
    assert_eq!(source.base_url(), PAGE_URL);
    assert_eq!(source.name(), "DOM");
}

#[test]
fn dom_end_to_end_keeps_home_and_tags_anchor() {
    init_logging();
    let html = r##"<nav><a href="/a">Home</a><a href="#section"></a></nav>"##;
    let page = sources::dom(Page::new(PAGE_URL, html));

    let result = harvest(&[page], &HarvestOptions::default()).unwrap();

    assert_eq!(
        result.links,
        vec![Link::new("Home", "https://news.example.com/a", "DOM")]
    );
    let excluded = result.excluded.unwrap();
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].link, "#section");
    assert_eq!(excluded[0].excluded_by.as_deref(), Some("anchor link"));
}

#[test]
fn html_source_resolves_against_its_own_base() {
    init_logging();
    let source = sources::html(
        r#"<a href="guide.html"> Guide </a>"#,
        "https://docs.example.org/v2/",
    );

    let result = harvest(&[source], &HarvestOptions::default()).unwrap();

    assert_eq!(
        result.links,
        vec![Link::new(
            "Guide",
            "https://docs.example.org/v2/guide.html",
            "HTML String"
        )]
    );
}

#[test]
fn custom_selector_limits_the_elements() {
    let html = r#"<main><a href="/in">In</a></main><footer><a href="/out">Out</a></footer>"#;
    let source = HtmlSource::new(html, PAGE_URL).with_selector("main a[href]");

    let links = source.links().unwrap();
    assert_eq!(links, vec![RawLink::new("In", Some("/in".into()))]);
}

#[test]
fn invalid_selector_is_a_source_error() {
    let source = HtmlSource::new("<a href='/'>x</a>", PAGE_URL).with_selector("a[[");

    assert!(matches!(
        source.links(),
        Err(SourceError::InvalidSelector { .. })
    ));
}

#[test]
fn frames_are_discovered_with_resolved_src() {
    let html = r#"
        <iframe src="/embed/player"></iframe>
        <iframe srcdoc="<a href='/inline'>Inline</a>"></iframe>
    "#;
    let page = Page::new(PAGE_URL, html);

    let frames = frames_of(&page);

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].src(), Some("https://news.example.com/embed/player"));
    assert_eq!(frames[0].name(), "Iframe: https://news.example.com/embed/player");
    assert_eq!(frames[0].base_url(), "https://news.example.com/embed/player");
    assert!(!frames[0].has_content());
    assert_eq!(frames[1].src(), None);
    assert_eq!(frames[1].base_url(), PAGE_URL);
    assert!(frames[1].has_content());
}

#[test]
fn inaccessible_frame_yields_nothing() {
    init_logging();
    let frame = FrameSource::new(Some("https://elsewhere.example/widget"), PAGE_URL);

    assert_eq!(frame.links().unwrap(), Vec::new());

    let result = harvest(&[frame], &HarvestOptions::default()).unwrap();
    assert!(result.links.is_empty());
    assert_eq!(result.stats.unwrap().total, 0);
}

#[test]
fn frame_links_resolve_against_the_frame_src() {
    init_logging();
    let frame = sources::frame(Some("https://widgets.example/app/"), PAGE_URL)
        .with_content(r#"<a href="settings">Settings</a>"#);

    let result = harvest(&[frame], &HarvestOptions::default()).unwrap();

    assert_eq!(
        result.links,
        vec![Link::new(
            "Settings",
            "https://widgets.example/app/settings",
            "Iframe: https://widgets.example/app/"
        )]
    );
}

#[test]
fn mixed_sources_are_unioned_in_order() {
    init_logging();
    let page = Page::new(PAGE_URL, r#"<a href="/story">Story</a><iframe srcdoc="<a href='/ad'>Ad</a>"></iframe>"#);
    let mut all: Vec<Box<dyn LinkSource>> = vec![Box::new(DomSource::new(page.clone()))];
    for frame in frames_of(&page) {
        all.push(Box::new(frame));
    }
    all.push(Box::new(sources::json(
        vec![linksift_core::LinkRecord::new("Archive", "/archive")],
        PAGE_URL,
    )));

    let result = harvest(&all, &HarvestOptions::default()).unwrap();
    let summary: Vec<_> = result
        .links
        .iter()
        .map(|l| (l.name.as_str(), l.source.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Story", "DOM"),
            ("Ad", "Iframe: "),
            ("Archive", "JSON Array"),
        ]
    );
}
