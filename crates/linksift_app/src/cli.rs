use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use linksift_core::{FilterConfig, HarvestOptions, MatchMode, MetadataOptions};
use linksift_engine::{ExportFormat, DEFAULT_SELECTOR};
use serde::de::DeserializeOwned;

/// Extract, filter and export the links of pages, HTML files or JSON link lists.
#[derive(Parser, Debug)]
#[command(name = "linksift", version)]
#[command(about = "Extract and filter links from pages, HTML files and JSON link lists", long_about = None)]
pub struct Args {
    /// http(s) URLs, HTML files, `.json` link lists, or "-" for HTML on stdin.
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Base URL for resolving links of HTML and JSON targets.
    #[arg(long)]
    pub base_url: Option<String>,

    /// CSS selector picking the link elements.
    #[arg(long, default_value = DEFAULT_SELECTOR)]
    pub selector: String,

    /// Also fetch the documents of iframes found on fetched pages.
    #[arg(long, default_value_t = false)]
    pub frames: bool,

    /// HarvestOptions JSON file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Regex filter JSON file, keyed by field (`name`, `link`, `source`).
    #[arg(long, value_name = "FILE")]
    pub filters: Option<PathBuf>,

    /// How regex rules combine: all or any.
    #[arg(long, value_parser = parse_match_mode)]
    pub match_mode: Option<MatchMode>,

    /// Drop links leaving the base URL's origin.
    #[arg(long)]
    pub exclude_external: bool,

    #[arg(long)]
    pub keep_anchors: bool,

    #[arg(long)]
    pub keep_mailto: bool,

    #[arg(long)]
    pub keep_tel: bool,

    /// Minimum trimmed text length of a link.
    #[arg(long)]
    pub min_text_length: Option<usize>,

    /// Keep repeated (name, link) pairs.
    #[arg(long)]
    pub no_dedupe: bool,

    /// Skip exclusion tracking and stats.
    #[arg(long)]
    pub no_track: bool,

    /// Output format: json, csv, urls or table.
    #[arg(long, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Include excluded links (and stats, for json) in the output.
    #[arg(long)]
    pub with_excluded: bool,

    /// Print a metadata summary of the kept links instead of the links.
    #[arg(long)]
    pub metadata: bool,

    /// Number of entries in each metadata top list.
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Write the output to a file instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_match_mode(raw: &str) -> Result<MatchMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "all" => Ok(MatchMode::All),
        "any" => Ok(MatchMode::Any),
        other => Err(format!("unknown match mode {other:?} (expected all or any)")),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

impl Args {
    /// Options from `--config` (or defaults), then `--filters`, then flags.
    pub fn harvest_options(&self) -> Result<HarvestOptions> {
        let mut options: HarvestOptions = match &self.config {
            Some(path) => read_json(path)?,
            None => HarvestOptions::default(),
        };
        if let Some(path) = &self.filters {
            let filters: FilterConfig = read_json(path)?;
            options.regex_filters = Some(filters);
        }
        self.apply_flags(&mut options);
        Ok(options)
    }

    fn apply_flags(&self, options: &mut HarvestOptions) {
        if self.exclude_external {
            options.exclude_external = true;
        }
        if self.keep_anchors {
            options.exclude_anchors = false;
        }
        if self.keep_mailto {
            options.exclude_mailto = false;
        }
        if self.keep_tel {
            options.exclude_tel = false;
        }
        if let Some(min) = self.min_text_length {
            options.min_text_length = min;
        }
        if self.no_dedupe {
            options.deduplicate = false;
        }
        if self.no_track {
            options.track_excluded = false;
        }
        if let Some(mode) = self.match_mode {
            options.regex_match_mode = mode;
        }
    }

    pub fn metadata_options(&self, current_host: Option<String>) -> MetadataOptions {
        let mut options = MetadataOptions {
            current_host,
            ..MetadataOptions::default()
        };
        if let Some(top_n) = self.top_n {
            options.top_n = top_n;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["linksift"];
        argv.extend_from_slice(extra);
        argv.push("page.html");
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_match_library_defaults() {
        let parsed = args(&[]);
        assert_eq!(parsed.harvest_options().unwrap(), HarvestOptions::default());
        assert_eq!(parsed.format, ExportFormat::Json);
        assert_eq!(parsed.selector, "a[href]");
    }

    #[test]
    fn flags_override_config_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("options.json");
        fs::write(&config, r#"{"minTextLength": 5, "excludeTel": true}"#).unwrap();
        let config_arg = config.to_str().unwrap();

        let parsed = args(&[
            "--config",
            config_arg,
            "--keep-tel",
            "--no-dedupe",
            "--match-mode",
            "ANY",
        ]);
        let options = parsed.harvest_options().unwrap();

        assert_eq!(options.min_text_length, 5);
        assert!(!options.exclude_tel);
        assert!(!options.deduplicate);
        assert_eq!(options.regex_match_mode, MatchMode::Any);
    }

    #[test]
    fn filters_file_becomes_regex_filters() {
        let temp = TempDir::new().unwrap();
        let filters = temp.path().join("filters.json");
        fs::write(&filters, r#"{"name": {"excludeContains": "ad"}}"#).unwrap();

        let parsed = args(&["--filters", filters.to_str().unwrap()]);
        let options = parsed.harvest_options().unwrap();

        let config = options.regex_filters.expect("filters loaded");
        assert_eq!(config.rule_defs().unwrap().len(), 1);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let parsed = args(&["--config", "/definitely/missing/options.json"]);
        let err = parsed.harvest_options().unwrap_err();
        assert!(err.to_string().contains("reading"));
    }

    #[test]
    fn top_n_reaches_metadata_options() {
        let parsed = args(&["--top-n", "3", "--format", "csv"]);
        let options = parsed.metadata_options(Some("example.com".into()));
        assert_eq!(options.top_n, 3);
        assert_eq!(options.current_host.as_deref(), Some("example.com"));
        assert_eq!(parsed.format, ExportFormat::Csv);
    }
}
