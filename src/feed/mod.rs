//! Feed normalization engine for RSS 2.0 and Atom 1.0 documents.
//!
//! Raw bytes go in, a format-agnostic [`Feed`] comes out:
//!
//! - **Decoding**: byte-order marks and the XML declaration pick the charset
//! - **Tree building**: the document becomes a generic element tree
//! - **Mapping**: the root element selects the RSS 2.0 or Atom mapper
//! - **Normalizing**: dates, item identities, links and enclosures are
//!   reconciled across formats, and the next refresh instant is scheduled
//!
//! Only document-level problems fail a parse. Anything confined to a single
//! field or item degrades that field and is reported as a [`Diagnostic`].
//!
//! # Architecture
//!
//! - [`parser`] - entry points, format detection and dispatch
//! - `rss` / `atom` - one mapper per input grammar
//! - `link`, `identity`, `enclosure` - rules shared by both mappers
//! - [`date`] - multi-grammar timestamp parsing
//! - [`refresh`] - TTL/skip-hours/skip-days scheduling
//!
//! # Example
//!
//! ```
//! use feednorm::feed::parse;
//!
//! let xml = br#"<rss version="2.0"><channel>
//!     <title>Example</title>
//!     <item><guid>1</guid><title>Hello</title></item>
//! </channel></rss>"#;
//!
//! let feed = parse(xml)?;
//! assert_eq!(feed.title, "Example");
//! assert_eq!(feed.items[0].id, "1");
//! # Ok::<(), feednorm::feed::ParseError>(())
//! ```

mod atom;
mod charset;
pub mod date;
mod diagnostics;
mod enclosure;
mod identity;
mod link;
mod model;
pub mod parser;
pub mod refresh;
mod rss;
mod tree;

pub use date::parse_date;
pub use diagnostics::Diagnostic;
pub use enclosure::{guess_mime_type, thumbnail_mime_type};
pub use model::{zero_date, Enclosure, Feed, Image, Item};
pub use parser::{
    parse, parse_with, Format, ParseError, ParseOptions, ParseOutcome, DEFAULT_REFRESH_MINUTES,
    MAX_DOCUMENT_DEPTH,
};
pub use refresh::{next_refresh, RefreshHints};
