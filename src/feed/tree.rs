//! Generic element tree built from a decoded feed document.
//!
//! Both mappers read from this one structure instead of format-specific
//! schema types. Element lookups match by local name so that namespaced
//! extension elements (`content:encoded`, `dc:date`, `itunes:image`, ...) are
//! reachable the same way plain RSS elements are.

use std::borrow::Cow;

use quick_xml::escape::{escape, resolve_predefined_entity};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::parser::ParseError;

/// One element of the document, with its attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written in the source (`media:thumbnail`).
    name: String,
    /// Resolved namespace URI, if the element is bound to one.
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Attribute value by qualified name, falling back to a local-name match.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|(name, _)| local_part(name) == key)
            })
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, or `""` when absent.
    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attr(key).unwrap_or("")
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Child elements with the given local name, in any namespace.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.local_name() == local)
    }

    /// First child with the given local name.
    ///
    /// A child in this element's own namespace wins over extension elements
    /// sharing the local name (`<title>` over `<media:title>`).
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements()
            .find(|e| e.local_name() == local && e.namespace == self.namespace)
            .or_else(|| self.elements().find(|e| e.local_name() == local))
    }

    /// First child with the given local name bound to exactly `namespace`.
    pub fn child_ns(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.elements()
            .find(|e| e.local_name() == local && e.namespace.as_deref() == Some(namespace))
    }

    /// Trimmed text of the first matching child, or `""`.
    pub fn child_text(&self, local: &str) -> String {
        self.child(local).map(Element::text).unwrap_or_default()
    }

    /// Concatenated text of all descendants, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Children rendered back to markup, trimmed.
    ///
    /// Text nodes are written as decoded when `escape_text` is false, which
    /// turns entity-escaped HTML into literal HTML.
    pub fn inner_markup(&self, escape_text: bool) -> String {
        let mut out = String::new();
        for node in &self.children {
            write_node(node, &mut out, escape_text);
        }
        out.trim().to_string()
    }
}

fn write_node(node: &Node, out: &mut String, escape_text: bool) {
    match node {
        Node::Text(text) if escape_text => out.push_str(&escape(text.as_str())),
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value.as_str()));
                out.push('"');
            }
            if element.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &element.children {
                write_node(child, out, escape_text);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Named entities feeds commonly use although XML does not define them.
fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or(match name {
        "nbsp" => Some("\u{a0}"),
        "copy" => Some("©"),
        "reg" => Some("®"),
        "trade" => Some("™"),
        "hellip" => Some("…"),
        "mdash" => Some("—"),
        "ndash" => Some("–"),
        "lsquo" => Some("‘"),
        "rsquo" => Some("’"),
        "ldquo" => Some("“"),
        "rdquo" => Some("”"),
        "laquo" => Some("«"),
        "raquo" => Some("»"),
        "euro" => Some("€"),
        "pound" => Some("£"),
        "deg" => Some("°"),
        "middot" => Some("·"),
        "bull" => Some("•"),
        _ => None,
    })
}

/// Longest reference body looked at before a `&` is taken literally.
const MAX_REFERENCE_LEN: usize = 32;

/// Resolves every `&name;`, `&#N;` and `&#xH;` reference in `raw` on its own.
///
/// A reference that does not resolve is copied through verbatim, as is a
/// bare `&`, so one unknown name never leaves the rest of the run escaped.
fn decode_references(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let resolved = tail
            .find(';')
            .filter(|end| *end <= MAX_REFERENCE_LEN)
            .and_then(|end| resolve_reference(&tail[..end]).map(|value| (end, value)));
        match resolved {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn resolve_reference(body: &str) -> Option<Cow<'static, str>> {
    let Some(number) = body.strip_prefix('#') else {
        return resolve_entity(body).map(Cow::Borrowed);
    };
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if number.bytes().all(|b| b.is_ascii_digit()) => number.parse().ok()?,
        None => return None,
    };
    char::from_u32(code)
        .filter(|c| *c != '\0')
        .map(|c| Cow::Owned(c.to_string()))
}

/// Parses decoded document text into its root element.
///
/// # Errors
///
/// - [`ParseError::MalformedDocument`] if the text is not well-formed XML
/// - [`ParseError::MaxDepthExceeded`] if elements nest deeper than `max_depth`
/// - [`ParseError::MissingFeedRoot`] if the document has no root element
///
/// # Security
///
/// SEC-002: `quick-xml` never reads `<!ENTITY>` declarations from a DOCTYPE.
/// References are resolved one at a time by `decode_references()`, only
/// against the XML builtins, numeric character references and the fixed HTML
/// table in `resolve_entity()`. Any other reference stays literal text.
pub(crate) fn parse_document(text: &str, max_depth: usize) -> Result<Element, ParseError> {
    let mut reader = NsReader::from_str(text);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_resolved_event() {
            Ok((namespace, Event::Start(e))) => {
                let namespace = namespace_uri(namespace);
                // SEC-003: Reject excessively nested documents
                if stack.len() >= max_depth {
                    return Err(ParseError::MaxDepthExceeded(max_depth));
                }
                ensure_single_root(&root, &stack)?;
                stack.push(open_element(&e, namespace));
            }
            Ok((namespace, Event::Empty(e))) => {
                let namespace = namespace_uri(namespace);
                if stack.len() >= max_depth {
                    return Err(ParseError::MaxDepthExceeded(max_depth));
                }
                ensure_single_root(&root, &stack)?;
                let element = open_element(&e, namespace);
                attach(element, &mut stack, &mut root);
            }
            Ok((_, Event::End(_))) => {
                // check_end_names guarantees a matching open element
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root);
                }
            }
            Ok((_, Event::Text(e))) => {
                let raw = String::from_utf8_lossy(&e);
                push_text(decode_references(&raw), &mut stack)?;
            }
            Ok((_, Event::CData(e))) => {
                push_text(String::from_utf8_lossy(&e), &mut stack)?;
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ParseError::MalformedDocument(format!(
                    "{e} (near byte {position})"
                )))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::MalformedDocument(format!(
            "document ends inside <{}>",
            open.name
        )));
    }

    root.ok_or(ParseError::MissingFeedRoot)
}

fn namespace_uri(result: ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn ensure_single_root(root: &Option<Element>, stack: &[Element]) -> Result<(), ParseError> {
    if root.is_some() && stack.is_empty() {
        return Err(ParseError::MalformedDocument(
            "more than one root element".to_string(),
        ));
    }
    Ok(())
}

fn open_element(start: &BytesStart<'_>, namespace: Option<String>) -> Element {
    let mut attributes = Vec::new();
    for attr_result in start.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed attribute");
                continue;
            }
        };
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = decode_references(&raw).into_owned();
        attributes.push((key, value));
    }

    Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        namespace,
        attributes,
        children: Vec::new(),
    }
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn push_text(text: Cow<'_, str>, stack: &mut [Element]) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            // Adjacent text and CDATA runs merge into one node.
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(&text);
            } else {
                parent.children.push(Node::Text(text.into_owned()));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::MalformedDocument(
            "text outside of the root element".to_string(),
        )),
    }
}
