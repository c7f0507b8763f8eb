//! Dotted-path lookup over a [`Node`] tree.
//!
//! A path is one spelling of a field, e.g. `cac:Price.cbc:PriceAmount`.
//! Alternate spellings (namespaced vs. bare) are tried by the caller through
//! an ordered candidate list; the resolver itself never guesses prefixes.

use rust_decimal::Decimal;

use super::error::NirError;
use super::numeric::parse_number;
use super::tree::Node;

/// A parsed lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse a dot-delimited path.
    ///
    /// Empty paths and empty segments (`a..b`) are rejected.
    pub fn parse(text: &str) -> Result<Self, NirError> {
        if text.is_empty() {
            return Err(NirError::InvalidPath(text.to_string()));
        }
        let segments: Vec<String> = text.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(NirError::InvalidPath(text.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl std::str::FromStr for Path {
    type Err = NirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Walk `path` from `root`.
///
/// At each step a sequence is replaced by its first element, then the
/// segment is looked up in the mapping. Scalars, `Missing` and empty
/// sequences end the walk with `None`. A walk that lands on `Missing` is a
/// miss as well.
pub fn resolve<'a>(root: &'a Node, path: &Path) -> Option<&'a Node> {
    let mut current = root;
    for segment in path.segments() {
        current = match current.first()? {
            Node::Mapping(map) => map.get(segment)?,
            Node::Sequence(_) | Node::Scalar(_) | Node::Missing => return None,
        };
    }
    if current.is_missing() {
        None
    } else {
        Some(current)
    }
}

/// [`resolve`] with a textual path.
pub fn resolve_str<'a>(root: &'a Node, path: &str) -> Result<Option<&'a Node>, NirError> {
    Ok(resolve(root, &Path::parse(path)?))
}

/// First candidate path that resolves to a node.
pub fn resolve_first<'a>(
    root: &'a Node,
    candidates: &[&str],
) -> Result<Option<&'a Node>, NirError> {
    for candidate in candidates {
        if let Some(node) = resolve_str(root, candidate)? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// First candidate path that resolves to non-empty text.
pub fn first_text<'a>(root: &'a Node, candidates: &[&str]) -> Result<Option<&'a str>, NirError> {
    for candidate in candidates {
        if let Some(text) = resolve_str(root, candidate)?.and_then(leaf_text) {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

/// First candidate path whose text parses as a number.
///
/// Non-numeric text is skipped rather than read as zero, so a junk value in
/// one spelling does not hide a valid value in the next.
pub fn first_number(root: &Node, candidates: &[&str]) -> Result<Option<Decimal>, NirError> {
    for candidate in candidates {
        if let Some(value) = resolve_str(root, candidate)?
            .and_then(leaf_text)
            .and_then(parse_number)
        {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Text of a resolved leaf. Repeated leaf elements read as the first one.
fn leaf_text(node: &Node) -> Option<&str> {
    node.first().and_then(Node::text)
}

/// [`first_text`] with a default for misses.
pub fn text_or(root: &Node, candidates: &[&str], default: &str) -> Result<String, NirError> {
    Ok(first_text(root, candidates)?.unwrap_or(default).to_string())
}

/// [`first_number`] with a default for misses.
pub fn number_or(root: &Node, candidates: &[&str], default: Decimal) -> Result<Decimal, NirError> {
    Ok(first_number(root, candidates)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party() -> Node {
        Node::mapping([(
            "cac:Party",
            Node::mapping([(
                "cac:PartyName",
                Node::sequence([
                    Node::mapping([("cbc:Name", Node::from("First SRL"))]),
                    Node::mapping([("cbc:Name", Node::from("Second SRL"))]),
                ]),
            )]),
        )])
    }

    #[test]
    fn sequence_takes_first_element() {
        let tree = party();
        let node = resolve_str(&tree, "cac:Party.cac:PartyName.cbc:Name").unwrap();
        assert_eq!(node.and_then(Node::text), Some("First SRL"));
    }

    #[test]
    fn repeated_leaf_reads_first_element() {
        let item = Node::mapping([
            (
                "cbc:Name",
                Node::sequence([Node::from("Cablu"), Node::from("Cable")]),
            ),
            (
                "cbc:Amount",
                Node::sequence([Node::from("12.50"), Node::from("3")]),
            ),
        ]);
        assert_eq!(first_text(&item, &["cbc:Name"]).unwrap(), Some("Cablu"));
        assert_eq!(
            first_number(&item, &["cbc:Amount"]).unwrap(),
            Some(Decimal::new(1250, 2))
        );
        let empty = Node::mapping([("cbc:Name", Node::Sequence(Vec::new()))]);
        assert_eq!(first_text(&empty, &["cbc:Name"]).unwrap(), None);
    }

    #[test]
    fn scalar_in_the_middle_is_a_miss() {
        let tree = Node::mapping([("a", Node::from("leaf"))]);
        assert!(resolve_str(&tree, "a.b").unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(matches!(Path::parse(""), Err(NirError::InvalidPath(_))));
        assert!(matches!(Path::parse("a..b"), Err(NirError::InvalidPath(_))));
        assert!(matches!(Path::parse(".a"), Err(NirError::InvalidPath(_))));
    }

    #[test]
    fn path_display_round_trips() {
        let p: Path = "cac:Price.cbc:PriceAmount".parse().unwrap();
        assert_eq!(p.to_string(), "cac:Price.cbc:PriceAmount");
        assert_eq!(p.segments().len(), 2);
    }
}
