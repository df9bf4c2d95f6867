//! Transcodes feed bytes to UTF-8 before structural parsing.
//!
//! The encoding is taken from a byte-order mark when one is present, otherwise
//! from the `encoding` pseudo-attribute of the XML declaration. Documents that
//! declare nothing are read as UTF-8.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use super::diagnostics::{Diagnostic, Diagnostics};

/// The XML declaration must appear at the very start of the document, so only
/// this many leading bytes are scanned for it.
const DECLARATION_SCAN_LIMIT: usize = 1024;

/// Decodes `bytes` into text using the document's own encoding declaration.
///
/// Unknown charset labels fall back to UTF-8. Undecodable sequences become
/// U+FFFD. Both cases are reported through `diagnostics`; neither is fatal.
pub(crate) fn decode<'a>(bytes: &'a [u8], diagnostics: &mut Diagnostics) -> Cow<'a, str> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => declared_encoding(bytes, diagnostics),
    };

    // `decode` strips the BOM itself and may switch encoding when one is found.
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        diagnostics.push(Diagnostic::UndecodableBytes {
            encoding: actual.name(),
        });
    }
    text
}

fn declared_encoding(bytes: &[u8], diagnostics: &mut Diagnostics) -> &'static Encoding {
    let Some(label) = declaration_label(bytes) else {
        return UTF_8;
    };

    match Encoding::for_label(label.as_bytes()) {
        // A declaration readable as ASCII cannot belong to a UTF-16 document
        // without a BOM, so the label is lying.
        Some(encoding) if encoding == UTF_16LE || encoding == UTF_16BE => UTF_8,
        Some(encoding) => encoding,
        None => {
            diagnostics.push(Diagnostic::UnknownCharset {
                label: label.to_string(),
            });
            UTF_8
        }
    }
}

/// Extracts the `encoding="..."` value from a leading XML declaration.
fn declaration_label(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(DECLARATION_SCAN_LIMIT)];
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
    let head = &head[start..];
    if !head.starts_with(b"<?xml") {
        return None;
    }

    let end = head.windows(2).position(|w| w == b"?>")?;
    let declaration = std::str::from_utf8(&head[..end]).ok()?;

    let after_key = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let value = after_key.trim_start().strip_prefix('=')?.trim_start();
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    let close = value.find(quote)?;

    Some(value[..close].trim())
}
