use chrono::{DateTime, Utc};
use serde::Serialize;

/// The normalized result of parsing one RSS 2.0 or Atom 1.0 document.
///
/// Every text field is an empty string when the source omits it. Items keep
/// source order and are never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub language: String,
    pub author: String,
    /// Canonical link, chosen by the bare-link rule. Empty when none qualifies.
    pub link: String,
    pub image: Option<Image>,
    /// Channel-level category labels in document order.
    pub categories: Vec<String>,
    pub items: Vec<Item>,
    /// Number of items added by this parse. Always equals `items.len()`.
    pub unread: usize,
    /// Instant at which the feed should next be fetched.
    pub refresh: DateTime<Utc>,
}

impl Feed {
    /// Identities of the items in this feed, in item order.
    ///
    /// Each identity appears exactly once: duplicates are dropped while parsing.
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn contains_item(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }
}

/// One entry or article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Stable identity: explicit guid/id, else the resolved link. Never empty.
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Full content. Empty when the source only carries a summary.
    pub content: String,
    pub categories: Vec<String>,
    pub link: String,
    /// Per-item artwork (RSS only).
    pub image: Option<Image>,
    /// Publication timestamp. Holds [`zero_date`] unless `date_valid` is set.
    pub date: DateTime<Utc>,
    pub date_valid: bool,
    pub enclosures: Vec<Enclosure>,
    /// Read state is owned by whoever persists items; parsing always yields `false`.
    pub read: bool,
}

/// A media attachment referenced by an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enclosure {
    pub url: String,
    /// MIME type. Either declared by the source or guessed from the URL.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes, `0` when the source does not say.
    pub length: u64,
}

/// Channel or item artwork.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Image {
    pub title: String,
    pub href: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// The timestamp carried by items whose date is absent or unparseable.
///
/// Fixed to the Unix epoch so equality comparisons stay deterministic.
pub fn zero_date() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            title: String::new(),
            summary: String::new(),
            content: String::new(),
            categories: Vec::new(),
            link: String::new(),
            image: None,
            date: zero_date(),
            date_valid: false,
            enclosures: Vec::new(),
            read: false,
        }
    }

    #[test]
    fn test_item_ids_follow_item_order() {
        let feed = Feed {
            title: String::new(),
            description: String::new(),
            language: String::new(),
            author: String::new(),
            link: String::new(),
            image: None,
            categories: Vec::new(),
            items: vec![item("b"), item("a")],
            unread: 2,
            refresh: zero_date(),
        };

        assert_eq!(feed.item_ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(feed.contains_item("a"));
        assert!(!feed.contains_item("c"));
    }

    #[test]
    fn test_enclosure_serializes_type_field() {
        let enclosure = Enclosure {
            url: "https://example.com/a.mp3".to_string(),
            mime_type: "audio/mpeg".to_string(),
            length: 12,
        };
        let json = serde_json::to_value(&enclosure).unwrap();
        assert_eq!(json["type"], "audio/mpeg");
        assert_eq!(json["length"], 12);
    }

    #[test]
    fn test_zero_date_is_epoch() {
        assert_eq!(zero_date().timestamp(), 0);
    }
}
