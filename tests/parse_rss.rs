//! Integration tests for RSS 2.0 normalization over fixture documents.
//!
//! Every test parses a file from `tests/fixtures/` through the public API
//! with a pinned clock, so refresh instants are reproducible.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use feednorm::feed::{
    parse, parse_with, zero_date, Diagnostic, Enclosure, Feed, Image, ParseError, ParseOptions,
    ParseOutcome,
};

fn fixture(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

fn pinned(now: DateTime<Utc>) -> ParseOptions {
    ParseOptions {
        now: Some(now),
        ..ParseOptions::default()
    }
}

fn parse_fixture(name: &str) -> Feed {
    parse(&fixture(name)).unwrap_or_else(|e| panic!("parsing {name}: {e}"))
}

// ============================================================================
// Item counts and content
// ============================================================================

#[test]
fn test_item_counts() {
    let cases = [
        ("rss_2.0.xml", 2),
        ("rss_2.0_content_encoded.xml", 1),
        ("rss_2.0_enclosure.xml", 1),
        ("rss_2.0-1.xml", 4),
        ("rss_2.0-1_enclosure.xml", 1),
    ];

    for (name, want) in cases {
        let feed = parse_fixture(name);
        assert_eq!(feed.items.len(), want, "{name}");
        assert_eq!(feed.unread, want, "{name}");
    }
}

#[test]
fn test_content_encoded() {
    let feed = parse_fixture("rss_2.0_content_encoded.xml");
    assert_eq!(
        feed.items[0].content,
        r#"<p><a href="https://example.com/">Example.com</a> is an example site.</p>"#
    );
    assert_eq!(
        feed.items[0].summary,
        "Here is some text containing an interesting description."
    );
}

#[test]
fn test_channel_properties() {
    let feed = parse_fixture("rss_2.0_content_encoded.xml");
    assert_eq!(feed.language, "en");
    assert_eq!(feed.author, "someone");
    assert_eq!(feed.title, "RSS Title");
    assert_eq!(feed.link, "http://www.example.com/main.html");
}

#[test]
fn test_escaped_description_is_decoded() {
    let feed = parse_fixture("rss_2.0-1.xml");
    assert!(feed.items[0]
        .summary
        .contains(r#"<a href="http://howe.iki.rssi.ru/GCTC/gctc_e.htm">Star City</a>"#));
}

// ============================================================================
// Dates
// ============================================================================

#[test]
fn test_first_item_dates() {
    let cases = [
        ("rss_2.0.xml", Utc.with_ymd_and_hms(2009, 9, 6, 16, 45, 0)),
        ("rss_2.0_content_encoded.xml", Utc.with_ymd_and_hms(2009, 9, 6, 16, 45, 0)),
        ("rss_2.0_enclosure.xml", Utc.with_ymd_and_hms(2009, 9, 6, 16, 45, 0)),
        ("rss_2.0-1.xml", Utc.with_ymd_and_hms(2003, 6, 3, 9, 39, 21)),
        ("rss_2.0-1_enclosure.xml", Utc.with_ymd_and_hms(2016, 5, 14, 15, 39, 34)),
    ];

    for (name, want) in cases {
        let feed = parse_fixture(name);
        assert!(feed.items[0].date_valid, "{name}: date invalid");
        assert_eq!(feed.items[0].date, want.unwrap(), "{name}");
    }
}

#[test]
fn test_unparseable_date_degrades_only_that_item() {
    let outcome = parse_with(
        &fixture("rss_2.0.xml"),
        &pinned(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
    )
    .unwrap();

    let second = &outcome.feed.items[1];
    assert!(!second.date_valid);
    assert_eq!(second.date, zero_date());
    assert_eq!(second.title, "Second example entry");
    assert_eq!(
        outcome.diagnostics,
        vec![Diagnostic::InvalidDate {
            item: "4e5f4ea7-3b25-4d4e-a0b1-0d4d2e0fd8a3".to_string(),
            value: "the day after tomorrow".to_string(),
        }]
    );
}

// ============================================================================
// Categories
// ============================================================================

#[test]
fn test_item_categories() {
    assert_eq!(
        parse_fixture("rss_2.0-1_enclosure.xml").items[0].categories,
        vec!["Interviews", "Science"]
    );
    assert!(parse_fixture("rss_2.0_enclosure.xml").items[0]
        .categories
        .is_empty());
}

#[test]
fn test_channel_categories() {
    assert_eq!(
        parse_fixture("rss_2.0-1_enclosure.xml").categories,
        vec!["Technology", "Education"]
    );
    assert_eq!(parse_fixture("rss_2.0_enclosure.xml").categories, vec!["Podcasts"]);
}

// ============================================================================
// Links, identity and deduplication
// ============================================================================

#[test]
fn test_bare_link_selected() {
    assert_eq!(parse_fixture("rss_2.0_links_single.xml").items[0].link, "link_a");
    assert_eq!(parse_fixture("rss_2.0_links_multiple.xml").items[0].link, "link_b");
}

#[test]
fn test_channel_link_skips_atom_self_link() {
    assert_eq!(
        parse_fixture("rss_2.0-1_enclosure.xml").link,
        "https://podcast.example.com/"
    );
}

#[test]
fn test_duplicates_and_unidentifiable_items() {
    let outcome = parse_with(&fixture("rss_2.0_duplicates.xml"), &ParseOptions::default()).unwrap();
    let feed = &outcome.feed;

    let ids: Vec<&str> = feed.item_ids().collect();
    assert_eq!(ids, vec!["a", "http://www.example.com/2", "c"]);
    assert_eq!(feed.items[0].title, "One");
    assert_eq!(feed.items[1].title, "Two");
    assert_eq!(feed.unread, 3);
    assert!(feed.contains_item("c"));
    assert!(!feed.contains_item("b"));

    assert_eq!(
        outcome.diagnostics,
        vec![Diagnostic::ItemSkipped {
            title: "Nameless".to_string()
        }]
    );
}

// ============================================================================
// Enclosures and images
// ============================================================================

#[test]
fn test_enclosure() {
    let feed = parse_fixture("rss_2.0_enclosure.xml");
    assert_eq!(
        feed.items[0].enclosures,
        vec![Enclosure {
            url: "http://www.example.com/podcast/episode1.mp3".to_string(),
            mime_type: "audio/mpeg".to_string(),
            length: 24_986_239,
        }]
    );
}

#[test]
fn test_media_thumbnail() {
    let feed = parse_fixture("rss_2.0_media_thumbnail.xml");
    let enclosure = &feed.items[0].enclosures[0];
    assert_eq!(enclosure.url, "http://example.com/image.jpg");
    assert_eq!(enclosure.mime_type, "image/jpg");
}

#[test]
fn test_podcast_channel_image_and_author() {
    let feed = parse_fixture("rss_2.0-1_enclosure.xml");
    assert_eq!(feed.author, "Example Hosts");
    assert_eq!(
        feed.image,
        Some(Image {
            title: "Example Podcast".to_string(),
            href: "https://podcast.example.com/cover-large.jpg".to_string(),
            url: "https://podcast.example.com/cover.png".to_string(),
            width: 144,
            height: 144,
        })
    );
}

#[test]
fn test_managing_editor_author_fallback() {
    assert_eq!(parse_fixture("rss_2.0-1.xml").author, "editor@example.com");
}

// ============================================================================
// Refresh scheduling
// ============================================================================

#[test]
fn test_ttl_refresh() {
    let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
    let feed = parse_with(&fixture("rss_2.0.xml"), &pinned(now)).unwrap().feed;
    assert_eq!(feed.refresh, now + Duration::minutes(1800));
}

#[test]
fn test_no_ttl_uses_default_interval() {
    let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
    let feed = parse_with(&fixture("rss_2.0_enclosure.xml"), &pinned(now))
        .unwrap()
        .feed;
    assert_eq!(feed.refresh, now + Duration::minutes(10));
}

#[test]
fn test_skip_hours_and_days() {
    let doc = fixture("rss_2.0_skip.xml");
    // 2024-03-08 is a Friday
    let cases = [
        // 13:30 and 14:00 are both skipped
        (Utc.with_ymd_and_hms(2024, 3, 8, 12, 30, 0), Utc.with_ymd_and_hms(2024, 3, 8, 15, 0, 0)),
        // no skip applies
        (Utc.with_ymd_and_hms(2024, 3, 8, 22, 30, 0), Utc.with_ymd_and_hms(2024, 3, 8, 23, 30, 0)),
        // lands on Saturday, rolls past Sunday into Monday
        (Utc.with_ymd_and_hms(2024, 3, 8, 23, 30, 0), Utc.with_ymd_and_hms(2024, 3, 11, 0, 30, 0)),
    ];

    for (now, want) in cases {
        let (now, want) = (now.unwrap(), want.unwrap());
        let feed = parse_with(&doc, &pinned(now)).unwrap().feed;
        assert_eq!(feed.refresh, want, "now = {now}");
    }
}

#[test]
fn test_parse_is_idempotent_with_pinned_clock() {
    let options = pinned(Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap());
    for name in ["rss_2.0.xml", "rss_2.0-1_enclosure.xml", "rss_2.0_duplicates.xml"] {
        let bytes = fixture(name);
        let first: ParseOutcome = parse_with(&bytes, &options).unwrap();
        let second = parse_with(&bytes, &options).unwrap();
        assert_eq!(first, second, "{name}");
    }
}

// ============================================================================
// Charset and document-level errors
// ============================================================================

#[test]
fn test_latin1_declaration_decoded() {
    let feed = parse_fixture("rss_2.0_latin1.xml");
    assert_eq!(feed.title, "Café Müller");
    assert_eq!(feed.items[0].title, "Grüße aus Köln");
}

#[test]
fn test_malformed_document() {
    let err = parse(b"<rss><channel><title>unterminated</channel></rss>").unwrap_err();
    assert!(matches!(err, ParseError::MalformedDocument(_)), "{err:?}");
}

#[test]
fn test_missing_channel() {
    let err = parse(br#"<rss version="2.0"></rss>"#).unwrap_err();
    assert!(matches!(err, ParseError::MissingChannel), "{err:?}");
}

#[test]
fn test_unrecognized_root() {
    let err = parse(b"<html><body>not a feed</body></html>").unwrap_err();
    assert!(
        matches!(&err, ParseError::UnrecognizedFormat(root) if root == "html"),
        "{err:?}"
    );
}

#[test]
fn test_empty_input() {
    let err = parse(b"").unwrap_err();
    assert!(matches!(err, ParseError::MissingFeedRoot), "{err:?}");
}

#[test]
fn test_deep_nesting_rejected() {
    let options = ParseOptions {
        max_depth: 8,
        ..ParseOptions::default()
    };
    let doc = format!("<rss><channel>{}{}</channel></rss>", "<x>".repeat(10), "</x>".repeat(10));
    let err = parse_with(doc.as_bytes(), &options).unwrap_err();
    assert!(matches!(err, ParseError::MaxDepthExceeded(8)), "{err:?}");
}

// ============================================================================
// Serialization and cross-checks
// ============================================================================

#[test]
fn test_json_shape() {
    let feed = parse_fixture("rss_2.0_enclosure.xml");
    let json = serde_json::to_value(&feed).unwrap();

    let enclosure = &json["items"][0]["enclosures"][0];
    assert_eq!(enclosure["type"], "audio/mpeg");
    assert_eq!(enclosure["length"], 24_986_239);
    assert_eq!(json["items"][0]["date_valid"], true);
}

#[test]
fn test_agrees_with_feed_rs() {
    for name in ["rss_2.0-1.xml", "rss_2.0-1_enclosure.xml", "rss_2.0_content_encoded.xml"] {
        let bytes = fixture(name);
        let ours = parse(&bytes).unwrap();
        let theirs = feed_rs::parser::parse(&bytes[..]).unwrap();

        assert_eq!(ours.items.len(), theirs.entries.len(), "{name}");
        let their_titles: Vec<String> = theirs
            .entries
            .iter()
            .map(|e| e.title.as_ref().map(|t| t.content.clone()).unwrap_or_default())
            .collect();
        let our_titles: Vec<String> = ours.items.iter().map(|i| i.title.clone()).collect();
        assert_eq!(our_titles, their_titles, "{name}");
    }
}
