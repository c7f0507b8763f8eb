//! XML to [`Node`] tree conversion.
//!
//! The conversion keeps qualified element names as keys (`cbc:ID`), stores
//! attributes under `@name`, stores text that sits next to attributes or
//! child elements under `#text`, and folds repeated sibling elements into a
//! [`Node::Sequence`]. Empty elements become [`Node::Missing`].
//!
//! # Example
//!
//! ```
//! use efactura_nir::xml;
//!
//! let tree = xml::parse_tree(r#"<Invoice><cbc:ID>INV-1</cbc:ID></Invoice>"#).unwrap();
//! let record = efactura_nir::extract(&tree).unwrap();
//! assert_eq!(record.id, "INV-1");
//! ```

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;

use crate::core::{ATTR_PREFIX, ExtractOptions, InvoiceRecord, NirError, Node, TEXT_KEY};

/// Deepest element nesting accepted by [`parse_tree`].
pub const MAX_DEPTH: usize = 256;

fn xml_err(e: impl std::fmt::Display) -> NirError {
    NirError::Xml(e.to_string())
}

/// An element whose end tag has not been read yet.
#[derive(Default)]
struct Frame {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<(String, Node)>,
    text: String,
}

impl Frame {
    fn open(e: &BytesStart<'_>) -> Result<Self, NirError> {
        let name = std::str::from_utf8(e.name().as_ref())
            .map_err(xml_err)?
            .to_string();
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(xml_err)?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(xml_err)?
                .to_string();
            let value = attr.unescape_value().map_err(xml_err)?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            ..Self::default()
        })
    }

    fn close(self) -> (String, Node) {
        let text = self.text.trim();
        if self.attrs.is_empty() && self.children.is_empty() {
            let node = if text.is_empty() {
                Node::Missing
            } else {
                Node::Scalar(text.to_string())
            };
            return (self.name, node);
        }

        let mut map: BTreeMap<String, Node> = BTreeMap::new();
        for (key, value) in self.attrs {
            map.insert(format!("{ATTR_PREFIX}{key}"), Node::Scalar(value));
        }
        for (key, child) in self.children {
            match map.remove(&key) {
                None => {
                    map.insert(key, child);
                }
                Some(Node::Sequence(mut items)) => {
                    items.push(child);
                    map.insert(key, Node::Sequence(items));
                }
                Some(previous) => {
                    map.insert(key, Node::Sequence(vec![previous, child]));
                }
            }
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Node::Scalar(text.to_string()));
        }
        (self.name, Node::Mapping(map))
    }
}

/// Parse XML text into a tree whose single top-level key is the root element.
pub fn parse_tree(xml: &str) -> Result<Node, NirError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                check_depth(stack.len() + 1)?;
                stack.push(Frame::open(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                check_depth(stack.len() + 1)?;
                let finished = Frame::open(e)?.close();
                attach(&mut stack, &mut root, finished)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(xml_err)?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes).map_err(xml_err)?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(text);
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| NirError::Xml("unbalanced end tag".into()))?;
                let finished = frame.close();
                attach(&mut stack, &mut root, finished)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NirError::Xml(format!(
                    "parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(NirError::Xml("unexpected end of document".into()));
    }
    let (name, node) = root.ok_or_else(|| NirError::Xml("document has no root element".into()))?;
    tracing::trace!(root = %name, "parsed XML tree");
    Ok(Node::mapping([(name, node)]))
}

fn check_depth(depth: usize) -> Result<(), NirError> {
    if depth > MAX_DEPTH {
        return Err(NirError::Xml(format!(
            "nesting too deep: more than {MAX_DEPTH} levels"
        )));
    }
    Ok(())
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Node)>,
    finished: (String, Node),
) -> Result<(), NirError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(finished),
        None if root.is_none() => *root = Some(finished),
        None => return Err(NirError::Xml("multiple root elements".into())),
    }
    Ok(())
}

/// Parse XML and extract the invoice with default options.
pub fn extract_from_xml(xml: &str) -> Result<InvoiceRecord, NirError> {
    extract_from_xml_with(xml, &ExtractOptions::default())
}

/// Parse XML and extract the invoice.
pub fn extract_from_xml_with(
    xml: &str,
    options: &ExtractOptions,
) -> Result<InvoiceRecord, NirError> {
    let tree = parse_tree(xml)?;
    crate::core::extract_with(&tree, options)
}
