//! Atom 1.0 feed/entry mapping.

use super::date::parse_date;
use super::diagnostics::{Diagnostic, Diagnostics};
use super::enclosure;
use super::identity::ItemCollector;
use super::link::select_atom_link;
use super::model::{zero_date, Feed, Image, Item};
use super::parser::{FeedMapper, MapContext, ParseError};
use super::tree::Element;

pub(crate) struct AtomMapper;

impl FeedMapper for AtomMapper {
    fn map(&self, root: &Element, ctx: &mut MapContext<'_>) -> Result<Feed, ParseError> {
        let entries: Vec<&Element> = root.children_named("entry").collect();
        let mut collector = ItemCollector::with_capacity(entries.len());
        for entry in entries {
            if let Some(item) = map_entry(entry, &collector, ctx.diagnostics) {
                collector.push(item);
            }
        }
        let items = collector.into_items();

        Ok(Feed {
            title: root.child("title").map(render_text).unwrap_or_default(),
            description: root.child("subtitle").map(render_text).unwrap_or_default(),
            language: root.attr_or_empty("xml:lang").trim().to_string(),
            author: author(root),
            link: select_atom_link(root),
            image: image(root),
            categories: categories(root),
            unread: items.len(),
            items,
            // Atom has no caching hints.
            refresh: ctx.now + ctx.options.default_refresh_interval,
        })
    }
}

fn map_entry(
    entry: &Element,
    collector: &ItemCollector,
    diagnostics: &mut Diagnostics,
) -> Option<Item> {
    let title = entry.child("title").map(render_text).unwrap_or_default();
    let link = select_atom_link(entry);
    let id = collector.admit(&entry.child_text("id"), &link, &title, diagnostics)?;

    let (date, date_valid) = match entry_date(entry, &id, diagnostics) {
        Some(date) => (date, true),
        None => (zero_date(), false),
    };

    let enclosures = entry
        .children_named("link")
        .filter(|link| link.attr_or_empty("rel") == "enclosure")
        .filter_map(|link| enclosure::from_atom_link(link, &id, diagnostics))
        .collect();

    Some(Item {
        summary: entry.child("summary").map(render_text).unwrap_or_default(),
        content: entry.child("content").map(content).unwrap_or_default(),
        categories: categories(entry),
        image: None,
        id,
        title,
        link,
        date,
        date_valid,
        enclosures,
        read: false,
    })
}

/// `published` first, then `updated`.
fn entry_date(
    entry: &Element,
    item: &str,
    diagnostics: &mut Diagnostics,
) -> Option<chrono::DateTime<chrono::Utc>> {
    for field in ["published", "updated"] {
        let raw = entry.child_text(field);
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

/// Renders an Atom text construct.
///
/// `html` content is entity-escaped markup and is returned decoded, so the
/// markup reads literally. `xhtml` content is the markup inside the wrapping
/// `<div>`, kept as written. Anything else is plain text.
fn render_text(element: &Element) -> String {
    match element.attr_or_empty("type").trim() {
        "html" | "text/html" => element.inner_markup(false),
        "xhtml" | "application/xhtml+xml" => element
            .child("div")
            .unwrap_or(element)
            .inner_markup(true),
        _ => element.text(),
    }
}

/// Inline content only; out-of-line content (`src`) renders as empty.
fn content(element: &Element) -> String {
    if element.attr("src").is_some() {
        return String::new();
    }
    render_text(element)
}

fn author(root: &Element) -> String {
    root.child("author")
        .map(|author| author.child_text("name"))
        .unwrap_or_default()
}

fn categories(element: &Element) -> Vec<String> {
    element
        .children_named("category")
        .filter_map(|category| {
            [category.attr_or_empty("term"), category.attr_or_empty("label")]
                .into_iter()
                .map(str::trim)
                .find(|label| !label.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn image(root: &Element) -> Option<Image> {
    let url = ["logo", "icon"]
        .into_iter()
        .map(|name| root.child_text(name))
        .find(|url| !url.is_empty())?;
    Some(Image {
        url,
        ..Image::default()
    })
}
