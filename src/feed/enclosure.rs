//! Unifies RSS enclosures, Media RSS extensions and Atom enclosure links into
//! one [`Enclosure`] shape.
//!
//! MIME types declared by the source are authoritative. When the source says
//! nothing, the type is guessed from the URL's file extension; the guessing
//! functions are public so callers can tell the two apart.

use url::Url;

use super::diagnostics::{Diagnostic, Diagnostics};
use super::model::Enclosure;
use super::tree::Element;

/// Yahoo Media RSS namespace.
pub(crate) const MEDIA_RSS_NS: &str = "http://search.yahoo.com/mrss/";

/// Best-effort MIME type for a Media RSS thumbnail: `image/<extension>`.
///
/// The extension is used verbatim, so a `.jpg` URL yields `image/jpg`.
///
/// ```
/// use feednorm::feed::thumbnail_mime_type;
///
/// assert_eq!(thumbnail_mime_type("http://example.com/image.jpg"), "image/jpg");
/// ```
pub fn thumbnail_mime_type(url: &str) -> String {
    format!("image/{}", file_extension(url))
}

/// Best-effort MIME type for an enclosure that declares none.
///
/// Returns `""` for extensions outside the known table.
pub fn guess_mime_type(url: &str) -> &'static str {
    match file_extension(url).to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "torrent" => "application/x-bittorrent",
        _ => "",
    }
}

/// Extension of the last path segment, ignoring query and fragment.
///
/// Unparseable URLs fall back to everything after the last `.`.
fn file_extension(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|segment| segment.rsplit_once('.'))
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default(),
        Err(_) => url.rsplit_once('.').map(|(_, ext)| ext.to_string()).unwrap_or_default(),
    }
}

/// Builds an enclosure from explicit attributes, filling in what is missing.
///
/// Returns `None` (with a diagnostic) when there is no URL to point at.
pub(crate) fn unify(
    url: &str,
    mime_type: &str,
    length: &str,
    item: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Enclosure> {
    let url = url.trim();
    if url.is_empty() {
        diagnostics.push(Diagnostic::EnclosureWithoutUrl {
            item: item.to_string(),
        });
        return None;
    }

    let mime_type = match mime_type.trim() {
        "" => guess_mime_type(url).to_string(),
        declared => declared.to_string(),
    };

    Some(Enclosure {
        url: url.to_string(),
        mime_type,
        length: parse_length(length, diagnostics),
    })
}

fn parse_length(raw: &str, diagnostics: &mut Diagnostics) -> u64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    raw.parse().unwrap_or_else(|_| {
        diagnostics.push(Diagnostic::InvalidNumber {
            field: "enclosure length",
            value: raw.to_string(),
        });
        0
    })
}

/// `<enclosure url type length>` from RSS 2.0.
pub(crate) fn from_rss_enclosure(
    element: &Element,
    item: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Enclosure> {
    unify(
        element.attr_or_empty("url"),
        element.attr_or_empty("type"),
        element.attr_or_empty("length"),
        item,
        diagnostics,
    )
}

/// `<link rel="enclosure" href type length>` from Atom.
pub(crate) fn from_atom_link(
    element: &Element,
    item: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Enclosure> {
    unify(
        element.attr_or_empty("href"),
        element.attr_or_empty("type"),
        element.attr_or_empty("length"),
        item,
        diagnostics,
    )
}

/// The single enclosure synthesized from an item's Media RSS extensions.
///
/// A thumbnail is preferred: its type comes from [`thumbnail_mime_type`] and
/// its length is unknown. Without a usable thumbnail, the first
/// `media:content` is used with its declared type and `fileSize`. Elements
/// nested in `media:group` are considered only when the item has no direct
/// ones.
pub(crate) fn from_media_rss(
    item_element: &Element,
    item: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Enclosure> {
    let group = item_element.child_ns(MEDIA_RSS_NS, "group");
    let find = |local: &str| {
        item_element
            .child_ns(MEDIA_RSS_NS, local)
            .or_else(|| group.and_then(|g| g.child_ns(MEDIA_RSS_NS, local)))
    };

    let thumbnail = find("thumbnail");
    let content = find("content");
    if thumbnail.is_none() && content.is_none() {
        return None;
    }

    if let Some(url) = thumbnail.map(|t| t.attr_or_empty("url").trim()).filter(|u| !u.is_empty()) {
        return Some(Enclosure {
            url: url.to_string(),
            mime_type: thumbnail_mime_type(url),
            length: 0,
        });
    }

    let content = content?;
    unify(
        content.attr_or_empty("url"),
        content.attr_or_empty("type"),
        content.attr_or_empty("fileSize"),
        item,
        diagnostics,
    )
}
