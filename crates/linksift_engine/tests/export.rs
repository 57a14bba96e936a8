use std::fs;

use linksift_core::Link;
use linksift_engine::{
    render_links, to_csv, to_json, to_table, to_url_list, write_export, ExportFormat,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn sample() -> Vec<Link> {
    vec![
        Link::new("Home", "https://example.com/", "DOM"),
        Link::new("Say \"hi\", friend", "https://example.com/hi", "JSON Array"),
    ]
}

#[test]
fn csv_quotes_every_value_and_doubles_quotes() {
    let csv = to_csv(&sample());

    assert_eq!(
        csv,
        "name,link,source\n\
         \"Home\",\"https://example.com/\",\"DOM\"\n\
         \"Say \"\"hi\"\", friend\",\"https://example.com/hi\",\"JSON Array\""
    );
}

#[test]
fn csv_header_follows_first_record() {
    let excluded: Vec<Link> = serde_json::from_str(
        r##"[{"name":"#top","link":"#top","source":"DOM","excludedBy":"anchor link"}]"##,
    )
    .unwrap();

    let csv = to_csv(&excluded);
    assert_eq!(
        csv,
        "name,link,source,excludedBy\n\"#top\",\"#top\",\"DOM\",\"anchor link\""
    );
}

#[test]
fn empty_inputs_render_empty() {
    assert_eq!(to_csv(&[]), "");
    assert_eq!(to_url_list(&[]), "");
    assert_eq!(to_table(&[]), "");
    assert_eq!(to_json(&Vec::<Link>::new()).unwrap(), "[]");
}

#[test]
fn url_list_is_one_link_per_line() {
    assert_eq!(
        to_url_list(&sample()),
        "https://example.com/\nhttps://example.com/hi"
    );
}

#[test]
fn json_uses_wire_field_names() {
    let json = render_links(&sample()[..1], ExportFormat::Json).unwrap();
    assert_eq!(
        json,
        "[\n  {\n    \"name\": \"Home\",\n    \"link\": \"https://example.com/\",\n    \"source\": \"DOM\"\n  }\n]"
    );
}

#[test]
fn table_has_index_column_and_aligned_cells() {
    let links = vec![Link::new("A", "https://a.example/", "DOM")];

    let table = to_table(&links);
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "│ (index) │ name │ link               │ source │");
    assert_eq!(lines[3], "│ 0       │ A    │ https://a.example/ │ DOM    │");
    assert!(lines[0].starts_with('┌'));
    assert!(lines[4].ends_with('┘'));
}

#[test]
fn format_names_parse_case_insensitively() {
    assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    assert_eq!("urls".parse::<ExportFormat>().unwrap(), ExportFormat::Urls);
    assert_eq!(ExportFormat::Table.to_string(), "table");
    assert!("xml".parse::<ExportFormat>().is_err());
}

#[test]
fn write_export_lands_the_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out").join("links.csv");
    let content = to_csv(&sample());

    let written = write_export(&target, &content).unwrap();

    assert_eq!(written, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), content);
}
