//! Minimal namespace-aware XML reading.
//!
//! Builds a small element tree from a document so callers can ask for the
//! root element, the namespace URI it declares, and namespace-qualified
//! children and their text. Every element is resolved against the namespace
//! bindings in scope, so `<urlset xmlns="...">` and `<sm:urlset xmlns:sm="...">`
//! read the same.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use std::borrow::Cow;
use thiserror::Error;

/// Failures while reading a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// Markup is not well-formed (syntax errors, unclosed or mismatched tags,
    /// content outside the root element, no root element).
    #[error("{0}")]
    Malformed(String),

    /// An element uses a prefix with no namespace declaration in scope.
    #[error("{0}")]
    Namespace(String),

    /// Any other reader failure (I/O, encoding).
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for XmlError {
    fn from(error: quick_xml::Error) -> Self {
        match error {
            quick_xml::Error::Syntax(_)
            | quick_xml::Error::IllFormed(_)
            | quick_xml::Error::InvalidAttr(_) => XmlError::Malformed(error.to_string()),
            quick_xml::Error::Namespace(_) => XmlError::Namespace(error.to_string()),
            other => XmlError::Other(other.to_string()),
        }
    }
}

/// An element with its resolved namespace, direct text and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub name: String,
    text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn new(namespace: Option<String>, name: String) -> Self {
        Self {
            namespace,
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Namespace URI of this element, if bound.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Direct text content (text and CDATA segments joined), trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Direct children with the given local name in the given namespace.
    pub fn children<'a>(
        &'a self,
        namespace: Option<&'a str>,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children
            .iter()
            .filter(move |child| child.name == name && child.namespace() == namespace)
    }

    /// First direct child with the given local name in the given namespace.
    pub fn child(&self, namespace: Option<&str>, name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|child| child.name == name && child.namespace() == namespace)
    }

    /// Whether any direct child matches.
    pub fn has_child(&self, namespace: Option<&str>, name: &str) -> bool {
        self.child(namespace, name).is_some()
    }
}

/// Parses a document and returns its root element.
///
/// Input is UTF-8 unless it starts with a UTF-16 byte order mark.
pub fn parse_document(content: &[u8]) -> Result<XmlElement, XmlError> {
    let content = to_utf8(content)?;
    let mut reader = NsReader::from_reader(content.as_ref());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(e)) => {
                ensure_single_root(&root, open.is_empty())?;
                open.push(element(ns, &e)?);
            }
            (ns, Event::Empty(e)) => {
                ensure_single_root(&root, open.is_empty())?;
                let empty = element(ns, &e)?;
                close(empty, &mut open, &mut root);
            }
            (_, Event::End(_)) => {
                // check_end_names is on, so the reader already rejected mismatched tags
                let finished = open.pop().ok_or_else(|| {
                    XmlError::Malformed("closing tag without matching opening tag".to_string())
                })?;
                close(finished, &mut open, &mut root);
            }
            (_, Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| XmlError::Malformed(err.to_string()))?;
                match open.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(XmlError::Malformed(
                            "content is not allowed outside the root element".to_string(),
                        ));
                    }
                }
            }
            (_, Event::CData(e)) => match open.last_mut() {
                Some(current) => current.text.push_str(&String::from_utf8_lossy(&e)),
                None => {
                    return Err(XmlError::Malformed(
                        "CDATA is not allowed outside the root element".to_string(),
                    ));
                }
            },
            (_, Event::Eof) => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.last() {
        return Err(XmlError::Malformed(format!(
            "unexpected end of document: <{}> is not closed",
            unclosed.name
        )));
    }

    root.ok_or_else(|| XmlError::Malformed("document has no root element".to_string()))
}

/// Transcodes BOM-marked UTF-16 to UTF-8, which is all the reader decodes.
fn to_utf8(content: &[u8]) -> Result<Cow<'_, [u8]>, XmlError> {
    let (units, big_endian) = match content {
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        _ => return Ok(Cow::Borrowed(content)),
    };
    if units.len() % 2 != 0 {
        return Err(XmlError::Other(
            "UTF-16 input has an odd number of bytes".to_string(),
        ));
    }

    let code_units = units.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });
    let text = char::decode_utf16(code_units)
        .collect::<Result<String, _>>()
        .map_err(|e| XmlError::Other(format!("invalid UTF-16 input: {e}")))?;
    Ok(Cow::Owned(text.into_bytes()))
}

fn ensure_single_root(root: &Option<XmlElement>, at_top_level: bool) -> Result<(), XmlError> {
    if root.is_some() && at_top_level {
        return Err(XmlError::Malformed(
            "markup after the root element is not allowed".to_string(),
        ));
    }
    Ok(())
}

fn element(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let namespace = match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(XmlError::Namespace(format!(
                "element <{}> uses undeclared namespace prefix `{}`",
                name,
                String::from_utf8_lossy(&prefix)
            )));
        }
    };
    Ok(XmlElement::new(namespace, name))
}

fn close(finished: XmlElement, open: &mut Vec<XmlElement>, root: &mut Option<XmlElement>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(finished),
        None => *root = Some(finished),
    }
}
