//! RSS 2.0 channel/item mapping, including the Yahoo Media RSS extension.

use super::date::parse_date;
use super::diagnostics::{Diagnostic, Diagnostics};
use super::enclosure;
use super::identity::ItemCollector;
use super::link::{rss_candidate, select_link};
use super::model::{zero_date, Feed, Image, Item};
use super::parser::{FeedMapper, MapContext, ParseError};
use super::refresh::{self, RefreshHints};
use super::tree::Element;

pub(crate) struct Rss2Mapper;

impl FeedMapper for Rss2Mapper {
    fn map(&self, root: &Element, ctx: &mut MapContext<'_>) -> Result<Feed, ParseError> {
        let channel = root.child("channel").ok_or(ParseError::MissingChannel)?;

        if let Some(version) = root.attr("version").map(str::trim) {
            if version != "2.0" {
                ctx.diagnostics.push(Diagnostic::UnsupportedVersion {
                    version: version.to_string(),
                });
            }
        }

        let hints = refresh_hints(channel, ctx.diagnostics);
        let refresh = refresh::schedule(
            ctx.now,
            &hints,
            ctx.options.default_refresh_interval,
            ctx.diagnostics,
        );

        let item_elements: Vec<&Element> = channel.children_named("item").collect();
        let mut collector = ItemCollector::with_capacity(item_elements.len());
        for element in item_elements {
            if let Some(item) = map_item(element, &collector, ctx.diagnostics) {
                collector.push(item);
            }
        }
        let items = collector.into_items();

        let mut author = channel.child_text("author");
        if author.is_empty() {
            author = channel.child_text("managingEditor");
        }

        Ok(Feed {
            title: channel.child_text("title"),
            description: channel.child_text("description"),
            language: channel.child_text("language"),
            author,
            link: select_link(channel.children_named("link").map(rss_candidate)),
            image: merged_image(channel, ctx.diagnostics),
            categories: categories(channel),
            unread: items.len(),
            items,
            refresh,
        })
    }
}

fn map_item(
    element: &Element,
    collector: &ItemCollector,
    diagnostics: &mut Diagnostics,
) -> Option<Item> {
    let title = element.child_text("title");
    let link = select_link(element.children_named("link").map(rss_candidate));
    let id = collector.admit(&element.child_text("guid"), &link, &title, diagnostics)?;

    let (date, date_valid) = match item_date(element, &id, diagnostics) {
        Some(date) => (date, true),
        None => (zero_date(), false),
    };

    let mut enclosures: Vec<_> = element
        .children_named("enclosure")
        .filter_map(|e| enclosure::from_rss_enclosure(e, &id, diagnostics))
        .collect();
    enclosures.extend(enclosure::from_media_rss(element, &id, diagnostics));

    Some(Item {
        summary: element.child_text("description"),
        content: element.child_text("encoded"),
        categories: categories(element),
        image: merged_image(element, diagnostics),
        id,
        title,
        link,
        date,
        date_valid,
        enclosures,
        read: false,
    })
}

/// `dc:date` first, then `pubDate`; the first one that parses wins.
fn item_date(
    element: &Element,
    item: &str,
    diagnostics: &mut Diagnostics,
) -> Option<chrono::DateTime<chrono::Utc>> {
    for field in ["date", "pubDate"] {
        let raw = element.child_text(field);
        if raw.is_empty() {
            continue;
        }
        match parse_date(&raw) {
            Some(date) => return Some(date),
            None => diagnostics.push(Diagnostic::InvalidDate {
                item: item.to_string(),
                value: raw,
            }),
        }
    }
    None
}

/// Category labels in document order.
///
/// A category's text is its label; `itunes:category`-style elements carry
/// the label in a `text` attribute instead.
fn categories(element: &Element) -> Vec<String> {
    element
        .children_named("category")
        .map(|category| {
            let text = category.text();
            if text.is_empty() {
                category.attr_or_empty("text").trim().to_string()
            } else {
                text
            }
        })
        .collect()
}

/// Merges every `image` child (`<image>`, `<itunes:image href>`) field by field.
///
/// Later elements override the fields they provide. `None` when there is no
/// image element at all.
fn merged_image(element: &Element, diagnostics: &mut Diagnostics) -> Option<Image> {
    let mut merged: Option<Image> = None;
    for image in element.children_named("image") {
        let out = merged.get_or_insert_with(Image::default);
        overwrite(&mut out.title, image.child_text("title"));
        overwrite(&mut out.href, image.attr_or_empty("href").trim().to_string());
        overwrite(&mut out.url, image.child_text("url"));
        if let Some(width) = dimension(image, "width", diagnostics) {
            out.width = width;
        }
        if let Some(height) = dimension(image, "height", diagnostics) {
            out.height = height;
        }
    }
    merged
}

fn overwrite(field: &mut String, value: String) {
    if !value.is_empty() {
        *field = value;
    }
}

/// Image dimensions coerced to non-negative integers.
fn dimension(image: &Element, name: &'static str, diagnostics: &mut Diagnostics) -> Option<u32> {
    let raw = image.child_text(name);
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(value) => Some(u32::try_from(value.max(0)).unwrap_or(u32::MAX)),
        Err(_) => {
            diagnostics.push(Diagnostic::InvalidNumber {
                field: name,
                value: raw,
            });
            None
        }
    }
}

fn refresh_hints(channel: &Element, diagnostics: &mut Diagnostics) -> RefreshHints {
    let ttl = channel.child_text("ttl");
    let ttl_minutes = if ttl.is_empty() {
        None
    } else {
        parse_number(&ttl, "ttl", diagnostics)
    };

    let skip_hours: Vec<u32> = channel
        .child("skipHours")
        .map(|skip| {
            skip.children_named("hour")
                .filter_map(|hour| parse_number(&hour.text(), "skipHours", diagnostics))
                .collect()
        })
        .unwrap_or_default();

    let skip_days: Vec<String> = channel
        .child("skipDays")
        .map(|skip| skip.children_named("day").map(Element::text).collect())
        .unwrap_or_default();

    RefreshHints {
        ttl_minutes,
        skip_hours,
        skip_days,
    }
}

fn parse_number(raw: &str, field: &'static str, diagnostics: &mut Diagnostics) -> Option<u32> {
    raw.parse().map_or_else(
        |_| {
            diagnostics.push(Diagnostic::InvalidNumber {
                field,
                value: raw.to_string(),
            });
            None
        },
        Some,
    )
}
