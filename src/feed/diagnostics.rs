use std::fmt;

use serde::Serialize;

/// A non-fatal problem noticed while normalizing a document.
///
/// Diagnostics are a side channel: they never change the returned
/// [`Feed`](super::Feed) or abort parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An item had neither an explicit id nor a bare link and was dropped.
    ItemSkipped { title: String },
    /// A non-empty date string matched none of the known grammars.
    InvalidDate { item: String, value: String },
    /// A numeric field (ttl, skip hour, image size, enclosure length) did not parse.
    InvalidNumber { field: &'static str, value: String },
    /// An enclosure element carried no URL and was dropped.
    EnclosureWithoutUrl { item: String },
    /// The declared charset label is unknown; the bytes were read as UTF-8.
    UnknownCharset { label: String },
    /// Some bytes could not be decoded and were replaced with U+FFFD.
    UndecodableBytes { encoding: &'static str },
    /// The `<rss>` root declares a version other than 2.0.
    UnsupportedVersion { version: String },
    /// Every weekday is listed in skip-days; the day scan gave up after a week.
    AllDaysSkipped,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemSkipped { title } => {
                write!(f, "item {title:?} has no id or link and was ignored")
            }
            Self::InvalidDate { item, value } => {
                write!(f, "item {item:?} has an unparseable date {value:?}")
            }
            Self::InvalidNumber { field, value } => {
                write!(f, "{field} value {value:?} is not a valid number")
            }
            Self::EnclosureWithoutUrl { item } => {
                write!(f, "item {item:?} has an enclosure without a URL")
            }
            Self::UnknownCharset { label } => {
                write!(f, "unknown charset {label:?}, decoding as UTF-8")
            }
            Self::UndecodableBytes { encoding } => {
                write!(f, "input contains bytes that are not valid {encoding}")
            }
            Self::UnsupportedVersion { version } => {
                write!(f, "RSS version {version:?} is read as RSS 2.0")
            }
            Self::AllDaysSkipped => write!(f, "skipDays lists every day of the week"),
        }
    }
}

/// Collects diagnostics for one parse call and mirrors each one to `tracing`.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(diagnostic = %diagnostic, "Feed normalization warning");
        self.entries.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push(Diagnostic::AllDaysSkipped);
        diagnostics.push(Diagnostic::ItemSkipped {
            title: "Orphan".to_string(),
        });

        let entries = diagnostics.into_vec();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], Diagnostic::AllDaysSkipped);
    }

    #[test]
    fn test_display_mentions_item_title() {
        let diagnostic = Diagnostic::ItemSkipped {
            title: "Orphan".to_string(),
        };
        assert!(diagnostic.to_string().contains("\"Orphan\""));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let json = serde_json::to_value(Diagnostic::InvalidNumber {
            field: "ttl",
            value: "soon".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "invalid_number");
        assert_eq!(json["field"], "ttl");
    }
}
