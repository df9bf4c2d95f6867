use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::atom::AtomMapper;
use super::charset;
use super::diagnostics::{Diagnostic, Diagnostics};
use super::model::Feed;
use super::rss::Rss2Mapper;
use super::tree::{self, Element};

/// Default nesting limit for feed documents.
///
/// SEC-003: Bounds the element stack so hostile input cannot exhaust memory
/// or overflow the recursive text helpers.
pub const MAX_DOCUMENT_DEPTH: usize = 256;

/// Refresh interval, in minutes, applied when a feed carries no TTL hint.
pub const DEFAULT_REFRESH_MINUTES: i64 = 10;

/// Document-level failures. Any of these means no [`Feed`] is produced.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes are not well-formed XML.
    #[error("Malformed feed document: {0}")]
    MalformedDocument(String),

    /// SEC-003: Element nesting exceeds the configured limit.
    #[error("Feed document nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// An `<rss>` document without its `<channel>` container.
    #[error("RSS document has no <channel> element")]
    MissingChannel,

    /// The document contains no root element at all.
    #[error("Feed document has no root element")]
    MissingFeedRoot,

    /// The root element is neither `<rss>` nor `<feed>`.
    #[error("Unrecognized feed format: root element <{0}>")]
    UnrecognizedFormat(String),
}

/// The supported input grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Rss2,
    Atom,
}

impl Format {
    fn mapper(self) -> &'static dyn FeedMapper {
        match self {
            Format::Rss2 => &Rss2Mapper,
            Format::Atom => &AtomMapper,
        }
    }
}

/// Tunables for one parse call.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Used for `Feed::refresh` when the feed gives no TTL.
    pub default_refresh_interval: Duration,
    /// Maximum element nesting accepted before the document is rejected.
    pub max_depth: usize,
    /// Reference instant for refresh scheduling. `None` reads the clock.
    pub now: Option<DateTime<Utc>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_refresh_interval: Duration::minutes(DEFAULT_REFRESH_MINUTES),
            max_depth: MAX_DOCUMENT_DEPTH,
            now: None,
        }
    }
}

/// A parsed feed together with the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub feed: Feed,
    pub diagnostics: Vec<Diagnostic>,
}

/// State shared by a mapper for the duration of one parse call.
pub(crate) struct MapContext<'a> {
    pub(crate) options: &'a ParseOptions,
    pub(crate) now: DateTime<Utc>,
    pub(crate) diagnostics: &'a mut Diagnostics,
}

/// Converts a format's root element into the unified [`Feed`] model.
pub(crate) trait FeedMapper {
    fn map(&self, root: &Element, ctx: &mut MapContext<'_>) -> Result<Feed, ParseError>;
}

/// Parses one feed document with default options.
///
/// Diagnostics are still logged through `tracing` but otherwise discarded;
/// use [`parse_with`] to receive them.
///
/// # Errors
///
/// Returns [`ParseError`] when the document as a whole cannot be read as
/// RSS 2.0 or Atom 1.0. Problems confined to single items never fail the parse.
pub fn parse(bytes: &[u8]) -> Result<Feed, ParseError> {
    parse_with(bytes, &ParseOptions::default()).map(|outcome| outcome.feed)
}

/// Parses one feed document and returns the feed with its diagnostics.
pub fn parse_with(bytes: &[u8], options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    let mut diagnostics = Diagnostics::default();

    let text = charset::decode(bytes, &mut diagnostics);
    let root = tree::parse_document(&text, options.max_depth)?;
    let format = detect_format(&root)?;
    tracing::debug!(?format, "Detected feed format");

    let mut ctx = MapContext {
        options,
        now: options.now.unwrap_or_else(Utc::now),
        diagnostics: &mut diagnostics,
    };
    let feed = format.mapper().map(&root, &mut ctx)?;

    tracing::debug!(
        title = %feed.title,
        items = feed.items.len(),
        "Parsed feed"
    );

    Ok(ParseOutcome {
        feed,
        diagnostics: diagnostics.into_vec(),
    })
}

/// Decides the grammar from the root element's local name.
pub(crate) fn detect_format(root: &Element) -> Result<Format, ParseError> {
    match root.local_name() {
        "rss" => Ok(Format::Rss2),
        "feed" => Ok(Format::Atom),
        other => Err(ParseError::UnrecognizedFormat(other.to_string())),
    }
}
