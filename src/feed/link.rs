//! Canonical link selection shared by both mappers.
//!
//! A feed or item may list several links. The canonical one is the first
//! "bare" link: no relation, no type, no `href` attribute, and non-empty text.
//! Decorated links (`rel="self"`, `rel="enclosure"`, typed alternates) are
//! skipped here and left to callers that want them for other purposes.

use super::tree::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkCandidate<'a> {
    pub(crate) rel: &'a str,
    pub(crate) kind: &'a str,
    pub(crate) href: &'a str,
    pub(crate) text: String,
}

impl LinkCandidate<'_> {
    fn is_bare(&self) -> bool {
        self.rel.is_empty() && self.kind.is_empty() && self.href.is_empty() && !self.text.is_empty()
    }
}

/// Returns the first bare link, or `""` when there is none.
pub(crate) fn select_link<'a>(candidates: impl IntoIterator<Item = LinkCandidate<'a>>) -> String {
    candidates
        .into_iter()
        .find(LinkCandidate::is_bare)
        .map(|candidate| candidate.text)
        .unwrap_or_default()
}

/// An RSS `<link>` (or `<atom:link>` nested in RSS) taken as written.
pub(crate) fn rss_candidate(link: &Element) -> LinkCandidate<'_> {
    LinkCandidate {
        rel: link.attr_or_empty("rel"),
        kind: link.attr_or_empty("type"),
        href: link.attr_or_empty("href"),
        text: link.text(),
    }
}

/// An Atom `<link>` projected onto the RSS shape.
///
/// Atom carries the URL in `href` and uses `rel="alternate"` as its default
/// relation, so an alternate link pointing at an HTML page becomes a bare
/// link whose text is the `href` value. Every other relation stays decorated.
pub(crate) fn atom_candidate(link: &Element) -> LinkCandidate<'_> {
    let rel = match link.attr_or_empty("rel") {
        "alternate" => "",
        rel => rel,
    };
    let kind = match link.attr_or_empty("type") {
        "text/html" | "application/xhtml+xml" => "",
        kind => kind,
    };

    LinkCandidate {
        rel,
        kind,
        href: "",
        text: link.attr_or_empty("href").trim().to_string(),
    }
}

/// The canonical link of an Atom feed or entry.
///
/// Prefers the first bare candidate from [`atom_candidate`]. When every
/// alternate is typed as something other than HTML, the first `href` with no
/// relation or `rel="alternate"` is used instead.
pub(crate) fn select_atom_link(parent: &Element) -> String {
    let canonical = select_link(parent.children_named("link").map(atom_candidate));
    if !canonical.is_empty() {
        return canonical;
    }

    parent
        .children_named("link")
        .filter(|link| matches!(link.attr_or_empty("rel"), "" | "alternate"))
        .map(|link| link.attr_or_empty("href").trim())
        .find(|href| !href.is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}
