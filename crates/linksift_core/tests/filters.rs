use linksift_core::{
    compile_filters, passes_filters, FilterConfig, FilterError, FilterMode, FilterSpec, Link,
    LinkField, MatchMode,
};
use pretty_assertions::assert_eq;

fn link(name: &str, url: &str) -> Link {
    Link::new(name, url, "DOM")
}

fn keeps(config: &FilterConfig, mode: MatchMode, candidate: &Link) -> bool {
    let rules = compile_filters(config).unwrap();
    passes_filters(&rules, candidate, mode)
}

#[test]
fn exact_match_is_anchored() {
    let config = FilterConfig::new().field("link", FilterSpec::new().exclude_exact(["x"]));

    assert!(!keeps(&config, MatchMode::All, &link("a", "x")));
    assert!(keeps(&config, MatchMode::All, &link("a", "xyz")));
    assert!(keeps(&config, MatchMode::All, &link("a", "box")));
}

#[test]
fn helper_literals_are_escaped() {
    let config = FilterConfig::new().field(
        "link",
        FilterSpec::new().include_ends_with([".pdf"]).flags(""),
    );
    let rules = compile_filters(&config).unwrap();

    assert_eq!(rules[0].pattern(), r"(\.pdf)$");
    assert!(passes_filters(&rules, &link("a", "https://a.com/r.pdf"), MatchMode::All));
    assert!(!passes_filters(&rules, &link("a", "https://a.com/rxpdf"), MatchMode::All));
}

#[test]
fn helper_patterns_are_translated() {
    let spec = FilterSpec::new()
        .include_starts_with(["https://", "ftp://"])
        .exclude_contains(["a+b"])
        .exclude_patterns([r"twitter\.com/\w+$", "^ads"]);
    let rules = compile_filters(&FilterConfig::new().field("link", spec)).unwrap();
    let patterns: Vec<_> = rules.iter().map(|r| r.pattern()).collect();

    assert_eq!(
        patterns,
        vec![
            r"^(https://|ftp://)",
            r"(a\+b)",
            r"(twitter\.com/\w+$|^ads)",
        ]
    );
    assert_eq!(rules[0].mode(), FilterMode::Include);
    assert_eq!(rules[2].mode(), FilterMode::Exclude);
    assert_eq!(rules[2].field(), LinkField::Link);
}

#[test]
fn matching_is_case_insensitive_by_default() {
    let config = FilterConfig::new().field("name", FilterSpec::new().exclude_exact(["Save Your Seat"]));

    assert!(!keeps(&config, MatchMode::All, &link("save your seat", "https://a.com")));
}

#[test]
fn explicit_empty_flags_are_case_sensitive() {
    let config = FilterConfig::new().field(
        "name",
        FilterSpec::new().exclude_exact(["Sponsor"]).flags(""),
    );

    assert!(keeps(&config, MatchMode::All, &link("sponsor", "https://a.com")));
    assert!(!keeps(&config, MatchMode::All, &link("Sponsor", "https://a.com")));
}

#[test]
fn include_and_exclude_on_same_field() {
    let config = FilterConfig::new().field(
        "name",
        FilterSpec::new().include_contains(["a"]).exclude_contains(["b"]),
    );

    assert!(!keeps(&config, MatchMode::All, &link("abc", "https://a.com")));
    assert!(keeps(&config, MatchMode::All, &link("apple", "https://a.com")));
}

#[test]
fn bare_string_is_an_include_pattern() {
    let config = FilterConfig::new().field("name", "^docs");

    assert!(keeps(&config, MatchMode::All, &link("Docs home", "https://a.com")));
    assert!(!keeps(&config, MatchMode::All, &link("Home docs", "https://a.com")));
}

#[test]
fn legacy_and_structured_keys_coexist() {
    let json = r#"{
        "link": {
            "excludeContains": ["bunnies"],
            "include": ["^https://", {"pattern": "EXAMPLE", "flags": ""}],
            "exclude": "tracking",
            "pattern": "\\.html$",
            "mode": "exclude"
        }
    }"#;
    let config: FilterConfig = serde_json::from_str(json).unwrap();
    let rules = compile_filters(&config).unwrap();

    assert_eq!(rules.len(), 5);
    let ok = link("a", "https://EXAMPLE.org/page");
    assert!(passes_filters(&rules, &ok, MatchMode::All));
    // The object entry carries its own empty flags, so it is case-sensitive.
    let lower = link("a", "https://example.org/page");
    assert!(!passes_filters(&rules, &lower, MatchMode::All));
    let html = link("a", "https://EXAMPLE.org/page.html");
    assert!(!passes_filters(&rules, &html, MatchMode::All));
    let bunnies = link("a", "https://EXAMPLE.org/BUNNIES");
    assert!(!passes_filters(&rules, &bunnies, MatchMode::All));
}

#[test]
fn legacy_pattern_defaults_to_include() {
    let config = FilterConfig::new().field("source", FilterSpec {
        pattern: Some("^JSON".to_string()),
        ..FilterSpec::default()
    });
    let rules = compile_filters(&config).unwrap();

    assert_eq!(rules[0].mode(), FilterMode::Include);
    assert!(passes_filters(
        &rules,
        &Link::new("a", "https://a.com", "JSON Array"),
        MatchMode::All
    ));
}

#[test]
fn newsletter_cleanup_config() {
    let json = r#"{
        "link": {
            "excludeContains": ["bunnies"],
            "excludePatterns": ["twitter\\.com/\\w+$"]
        },
        "name": {
            "excludeExact": ["save your seat"],
            "excludePatterns": ["free.*trial", "^unsubscribe$", "sponsor", "manage.*subscription"]
        }
    }"#;
    let config: FilterConfig = serde_json::from_str(json).unwrap();
    let rules = compile_filters(&config).unwrap();

    let keep = link("Rust 1.80 released", "https://blog.rust-lang.org/2024/07/25");
    let drops = [
        link("Start your FREE trial", "https://a.com/trial"),
        link("Unsubscribe", "https://a.com/u"),
        link("Save your seat", "https://a.com/seat"),
        link("@someone", "https://twitter.com/someone"),
        link("Cute", "https://pics.example/bunnies/1"),
        link("Manage your subscription", "https://a.com/m"),
    ];

    assert!(passes_filters(&rules, &keep, MatchMode::All));
    for dropped in &drops {
        assert!(
            !passes_filters(&rules, dropped, MatchMode::All),
            "expected {dropped:?} to be filtered"
        );
    }
}

#[test]
fn empty_rule_set_keeps_everything() {
    let rules = compile_filters(&FilterConfig::new()).unwrap();
    assert!(rules.is_empty());
    assert!(passes_filters(&rules, &link("a", "b"), MatchMode::Any));
}

#[test]
fn compile_errors_are_reported() {
    let bad_pattern = FilterConfig::new().field("name", FilterSpec::new().include_patterns(["(a"]));
    assert!(matches!(
        compile_filters(&bad_pattern),
        Err(FilterError::InvalidPattern { field: LinkField::Name, .. })
    ));

    let bad_flag = FilterConfig::new().field("name", FilterSpec::new().include_contains(["a"]).flags("q"));
    assert!(matches!(
        compile_filters(&bad_flag),
        Err(FilterError::InvalidFlag { flag: 'q', .. })
    ));

    let bad_field = FilterConfig::new().field("title", "x");
    assert!(matches!(
        compile_filters(&bad_field),
        Err(FilterError::UnknownField(name)) if name == "title"
    ));
}

#[test]
fn empty_lists_still_produce_rules() {
    let config: FilterConfig = serde_json::from_str(
        r#"{"name": {"includeExact": [], "excludeContains": [""], "include": [""]}}"#,
    )
    .unwrap();
    let rules = compile_filters(&config).unwrap();
    let patterns: Vec<_> = rules.iter().map(|r| r.pattern()).collect();

    assert_eq!(patterns, vec!["^()$", "()", ""]);
    // `^()$` only admits the empty name, so nothing named survives.
    assert!(!passes_filters(&rules, &link("Docs", "https://a.com/"), MatchMode::All));
    assert!(passes_filters(&rules, &link("Docs", "https://a.com/"), MatchMode::Any));
}

#[test]
fn lone_empty_strings_produce_no_rules() {
    let config: FilterConfig = serde_json::from_str(
        r#"{"link": {"includeExact": "", "include": "", "pattern": ""}}"#,
    )
    .unwrap();

    assert!(compile_filters(&config).unwrap().is_empty());
}
