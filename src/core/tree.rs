//! Untyped document tree.
//!
//! The tree follows the xmltodict convention: an element with attributes or
//! children is a [`Node::Mapping`] whose attribute keys start with `@` and
//! whose inline text sits under `#text`; repeated siblings collapse into a
//! [`Node::Sequence`]; leaves are [`Node::Scalar`]; empty elements are
//! [`Node::Missing`]. Keys keep their namespace prefix (`cbc:ID`).

use std::collections::BTreeMap;

/// Key under which the text of a value object (element with attributes) is stored.
pub const TEXT_KEY: &str = "#text";

/// Prefix that marks attribute keys.
pub const ATTR_PREFIX: char = '@';

/// A parsed document node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Node {
    Mapping(BTreeMap<String, Node>),
    Sequence(Vec<Node>),
    Scalar(String),
    #[default]
    Missing,
}

impl Node {
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    /// Build a mapping from `(key, node)` pairs. Later duplicates win.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Self {
        Self::Sequence(items.into_iter().collect())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Direct child lookup on a mapping. No sequence unwrapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// A sequence stands for its first element; every other node for itself.
    ///
    /// An empty sequence yields `None`.
    pub fn first(&self) -> Option<&Node> {
        match self {
            Self::Sequence(items) => items.first(),
            other => Some(other),
        }
    }

    /// View the node as a list of entries.
    ///
    /// The source format does not distinguish a single entry from a
    /// one-element list, so a bare mapping (or scalar) becomes a one-element
    /// list. `Missing` is an empty list.
    pub fn items(&self) -> Vec<&Node> {
        match self {
            Self::Sequence(items) => items.iter().filter(|n| !n.is_missing()).collect(),
            Self::Missing => Vec::new(),
            other => vec![other],
        }
    }

    /// Text content of a leaf, or of a value object (`#text`).
    ///
    /// Whitespace-only text counts as absent.
    pub fn text(&self) -> Option<&str> {
        let raw = match self {
            Self::Scalar(s) => s.as_str(),
            Self::Mapping(m) => match m.get(TEXT_KEY) {
                Some(Self::Scalar(s)) => s.as_str(),
                _ => return None,
            },
            Self::Sequence(_) | Self::Missing => return None,
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Attribute value of a value object (`@name`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        let key = format!("{ATTR_PREFIX}{name}");
        self.get(&key).and_then(Node::text)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Self::Sequence(items)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Scalar(b.to_string()),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Scalar(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_of_value_object() {
        let qty = Node::mapping([("@unitCode", Node::from("H87")), ("#text", Node::from(" 5 "))]);
        assert_eq!(qty.text(), Some("5"));
        assert_eq!(qty.attr("unitCode"), Some("H87"));
        assert_eq!(qty.attr("currencyID"), None);
    }

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(Node::from("   ").text(), None);
        assert_eq!(Node::Missing.text(), None);
        assert_eq!(Node::sequence([Node::from("a")]).text(), None);
    }

    #[test]
    fn items_normalizes_single_entries() {
        let single = Node::mapping([("cbc:ID", Node::from("1"))]);
        assert_eq!(single.items().len(), 1);
        assert!(Node::Missing.items().is_empty());
        let many = Node::sequence([Node::from("a"), Node::Missing, Node::from("b")]);
        assert_eq!(many.items().len(), 2);
    }

    #[test]
    fn first_of_empty_sequence() {
        assert!(Node::sequence([]).first().is_none());
        assert_eq!(Node::from("x").first(), Some(&Node::from("x")));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_values_map_to_nodes() {
        use serde_json::json;

        assert_eq!(Node::from(json!(null)), Node::Missing);
        assert_eq!(Node::from(json!(true)), Node::from("true"));
        assert_eq!(Node::from(json!(19)), Node::from("19"));
        assert_eq!(Node::from(json!(22.5)), Node::from("22.5"));
        assert_eq!(Node::from(json!("RON")), Node::from("RON"));
        assert_eq!(
            Node::from(json!(["a", null])),
            Node::sequence([Node::from("a"), Node::Missing])
        );

        let qty = Node::from(json!({"@unitCode": "H87", "#text": "5"}));
        assert_eq!(qty.text(), Some("5"));
        assert_eq!(qty.attr("unitCode"), Some("H87"));
    }
}
