//! Linksift engine: page fetching, HTML-backed link sources and export.
mod decode;
mod dom;
mod export;
mod fetch;
mod persist;
mod types;

pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use dom::{
    collect_links, frames_of, DomSource, FrameSource, HtmlSource, Page, DEFAULT_SELECTOR,
    DOM_SOURCE_NAME, HTML_SOURCE_NAME,
};
pub use export::{
    render_links, to_csv, to_json, to_table, to_url_list, write_export, ExportError, ExportFormat,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};

/// Per-call constructors for every kind of link source.
pub mod sources {
    pub use crate::dom::{dom, frame, html};
    pub use linksift_core::json;
}
