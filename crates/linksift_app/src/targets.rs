use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use linksift_core::{JsonSource, LinkSource};
use linksift_engine::{decode_html, frames_of, sources, Fetcher, FrameSource};
use linksift_logging::{sift_error, sift_info, sift_warn};
use url::Url;

/// Base used when nothing better is known; relative links then fail to resolve.
pub const FALLBACK_BASE: &str = "about:blank";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Url(String),
    Json(PathBuf),
    Stdin,
    Html(PathBuf),
}

impl Target {
    pub fn classify(raw: &str) -> Self {
        if raw == "-" {
            return Self::Stdin;
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Self::Url(raw.to_string());
        }
        let path = PathBuf::from(raw);
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::Json(path)
        } else {
            Self::Html(path)
        }
    }
}

pub struct LoadSettings<'a> {
    pub selector: &'a str,
    pub base_url: Option<&'a str>,
    pub frames: bool,
}

/// Sources built from the targets, in target order.
pub struct Loaded {
    pub sources: Vec<Box<dyn LinkSource>>,
    /// Host of the base URL the file targets resolve against, if it has one.
    pub current_host: Option<String>,
}

/// Fetches every URL target, then builds one source per target (and per
/// frame of each fetched page). Unreachable URLs are logged and skipped.
pub async fn load<F: Fetcher + ?Sized>(
    targets: &[Target],
    fetcher: &F,
    settings: &LoadSettings<'_>,
) -> Result<Loaded> {
    let mut pages = Vec::new();
    for target in targets {
        if let Target::Url(url) = target {
            match fetcher.fetch_page(url).await {
                Ok(page) => pages.push(Some(page)),
                Err(err) => {
                    sift_error!("Could not fetch {}: {}", url, err);
                    pages.push(None);
                }
            }
        }
    }

    let base = settings
        .base_url
        .map(str::to_string)
        .or_else(|| pages.iter().flatten().next().map(|page| page.url().to_string()))
        .unwrap_or_else(|| FALLBACK_BASE.to_string());
    let current_host = host_of(&base);

    let mut pages = pages.into_iter();
    let mut out: Vec<Box<dyn LinkSource>> = Vec::new();
    for target in targets {
        match target {
            Target::Url(_) => {
                let Some(page) = pages.next().flatten() else {
                    continue;
                };
                let frames = frames_of(&page);
                out.push(Box::new(
                    sources::dom(page).with_selector(settings.selector),
                ));
                for frame in frames {
                    let frame = if settings.frames {
                        load_frame(frame, fetcher).await
                    } else {
                        frame
                    };
                    out.push(Box::new(frame.with_selector(settings.selector)));
                }
            }
            Target::Json(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let source = JsonSource::from_json_str(&text, base.clone())
                    .with_context(|| format!("parsing {}", path.display()))?;
                sift_info!("Loaded {} records from {}", source.records().len(), path.display());
                out.push(Box::new(source));
            }
            Target::Stdin => {
                let html = read_stdin()?;
                out.push(Box::new(
                    sources::html(html, base.clone()).with_selector(settings.selector),
                ));
            }
            Target::Html(path) => {
                let html = read_html_file(path)?;
                out.push(Box::new(
                    sources::html(html, base.clone()).with_selector(settings.selector),
                ));
            }
        }
    }

    Ok(Loaded {
        sources: out,
        current_host,
    })
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

async fn load_frame<F: Fetcher + ?Sized>(frame: FrameSource, fetcher: &F) -> FrameSource {
    if frame.has_content() {
        return frame;
    }
    let Some(src) = frame.src().map(str::to_string) else {
        return frame;
    };
    match fetcher.fetch_page(&src).await {
        Ok(page) => frame.with_content(page.html()),
        Err(err) => {
            sift_warn!("Could not fetch frame {}: {}", src, err);
            frame
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("reading stdin")?;
    Ok(decode_html(&buf, None)?.html)
}

fn read_html_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let decoded =
        decode_html(&bytes, None).with_context(|| format!("decoding {}", path.display()))?;
    Ok(decoded.html)
}
