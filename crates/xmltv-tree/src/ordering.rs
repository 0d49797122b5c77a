//! Explicit attribute and child ordering per element name and depth.
//!
//! XMLTV does not mandate an order for most attributes and child elements,
//! but listings are expected to keep the conventional one. An
//! [`OrderingPolicy`] names, for a given element at a given depth, which
//! attributes or children come first and in what order. Everything the rule
//! does not name keeps its document order after the named items.
//!
//! Depth is counted from the root element, which is depth 0. Channels and
//! programmes are depth 1 and their direct children depth 2, the same value
//! the serializer uses as indentation level.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::node::{Attribute, Node};

/// Depth of `<channel>` and `<programme>` elements below the `<tv>` root.
pub const RECORD_DEPTH: usize = 1;

/// One ordering entry: which names come first for `element` at `depth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingRule {
    pub element: String,
    pub depth: usize,
    pub names: Vec<String>,
}

impl OrderingRule {
    pub fn new(element: &str, depth: usize, names: &[&str]) -> Self {
        Self {
            element: element.to_string(),
            depth,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn matches(&self, element: &str, depth: usize) -> bool {
        self.depth == depth && self.element == element
    }
}

/// Attribute and child ordering rules.
///
/// Serialized as JSON with two arrays:
///
/// ```json
/// {
///   "attributes": [{ "element": "icon", "depth": 2, "names": ["src", "width", "height"] }],
///   "children": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingPolicy {
    #[serde(default)]
    pub attributes: Vec<OrderingRule>,
    #[serde(default)]
    pub children: Vec<OrderingRule>,
}

/// Put items whose key is listed in `names` first, in `names` order, then
/// everything else in its original order.
///
/// Keys may repeat among the items: all items sharing a listed key are
/// emitted together, keeping their relative order. Listed names with no
/// matching item are skipped. The result is always a permutation of `items`.
pub fn reorder<'a, T, F>(items: &'a [T], names: &[String], key: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let mut ordered = Vec::with_capacity(items.len());
    for name in names {
        ordered.extend(items.iter().filter(|item| key(item) == name.as_str()));
    }
    ordered.extend(
        items
            .iter()
            .filter(|item| !names.iter().any(|name| name.as_str() == key(item))),
    );
    ordered
}

impl OrderingPolicy {
    /// A policy with no rules: everything keeps document order.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The conventional XMLTV ordering.
    pub fn xmltv() -> Self {
        Self {
            attributes: vec![
                OrderingRule::new(
                    "programme",
                    RECORD_DEPTH,
                    &[
                        "start",
                        "stop",
                        "pdc-start",
                        "vps-start",
                        "showview",
                        "videoplus",
                        "channel",
                        "clumpidx",
                    ],
                ),
                OrderingRule::new("icon", RECORD_DEPTH + 1, &["src", "width", "height"]),
            ],
            children: vec![OrderingRule::new(
                "programme",
                RECORD_DEPTH,
                &[
                    "title",
                    "sub-title",
                    "desc",
                    "credits",
                    "date",
                    "category",
                    "language",
                    "orig-language",
                    "length",
                    "icon",
                    "url",
                    "country",
                    "episode-num",
                    "video",
                    "audio",
                    "previously-shown",
                    "premiere",
                    "last-chance",
                    "new",
                    "subtitles",
                    "rating",
                    "star-rating",
                    "review",
                ],
            )],
        }
    }

    /// Parse a policy from JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Load a policy from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn attribute_rule(&self, element: &str, depth: usize) -> Option<&OrderingRule> {
        self.attributes.iter().find(|r| r.matches(element, depth))
    }

    fn child_rule(&self, element: &str, depth: usize) -> Option<&OrderingRule> {
        self.children.iter().find(|r| r.matches(element, depth))
    }

    /// Attributes of `element` at `depth` in output order.
    pub fn ordered_attributes<'a>(
        &self,
        element: &str,
        depth: usize,
        attributes: &'a [Attribute],
    ) -> Vec<&'a Attribute> {
        match self.attribute_rule(element, depth) {
            Some(rule) => reorder(attributes, &rule.names, |a| a.name.as_str()),
            None => attributes.iter().collect(),
        }
    }

    /// Children of `element` at `depth` in output order.
    pub fn ordered_children<'a>(
        &self,
        element: &str,
        depth: usize,
        children: &'a [Node],
    ) -> Vec<&'a Node> {
        match self.child_rule(element, depth) {
            Some(rule) => reorder(children, &rule.names, |c| c.name.as_str()),
            None => children.iter().collect(),
        }
    }
}
