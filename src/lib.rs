//! Normalizes RSS 2.0 and Atom 1.0 documents into one feed model.
//!
//! See [`feed`] for the engine and [`config`] for the CLI's settings file.

pub mod config;
pub mod feed;

pub use feed::{parse, parse_with, Feed, ParseError, ParseOptions, ParseOutcome};
