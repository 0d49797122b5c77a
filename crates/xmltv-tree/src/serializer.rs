//! Render [`Node`] trees back to XMLTV text.

use quick_xml::escape::{escape, partial_escape};

use crate::node::Node;
use crate::ordering::OrderingPolicy;

/// Spaces of indentation per depth level.
const INDENT: usize = 2;

/// Renders elements with the attribute and child order of an
/// [`OrderingPolicy`].
///
/// Rendering only reads the tree, so the same tree can be rendered any number
/// of times.
///
/// # Example
///
/// ```rust
/// use xmltv_tree::{Node, OrderingPolicy, Serializer};
///
/// let policy = OrderingPolicy::xmltv();
/// let programme = Node::with_children("programme", vec![Node::with_text("title", "News")])
///     .attr("channel", "BBC1")
///     .attr("start", "20150513180000 +0000");
///
/// assert_eq!(
///     Serializer::new(&policy).render(&programme, 1),
///     "  <programme start=\"20150513180000 +0000\" channel=\"BBC1\">\n    <title>News</title>\n  </programme>\n"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'p> {
    policy: &'p OrderingPolicy,
}

impl<'p> Serializer<'p> {
    pub fn new(policy: &'p OrderingPolicy) -> Self {
        Self { policy }
    }

    /// Render `node` and its subtree, indented for `depth`.
    ///
    /// The output always ends with a newline.
    pub fn render(&self, node: &Node, depth: usize) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node, depth);
        out
    }

    /// Render only the start tag of `node`, e.g. the `<tv ...>` line that
    /// opens a listing.
    pub fn render_start_tag(&self, node: &Node, depth: usize) -> String {
        let mut out = String::new();
        self.write_open(&mut out, node, depth);
        out.push_str(">\n");
        out
    }

    /// Render the end tag matching [`Serializer::render_start_tag`].
    pub fn render_end_tag(&self, node: &Node, depth: usize) -> String {
        format!("{}</{}>\n", indent(depth), node.name)
    }

    fn write_node(&self, out: &mut String, node: &Node, depth: usize) {
        self.write_open(out, node, depth);

        let Some(text) = node.text.as_deref() else {
            out.push_str("/>");
            self.write_tail(out, node);
            return;
        };

        if node.children.is_empty() {
            out.push('>');
            out.push_str(&partial_escape(text));
            out.push_str("</");
            out.push_str(&node.name);
            out.push('>');
            self.write_tail(out, node);
            return;
        }

        out.push_str(">\n");
        if !text.is_empty() {
            out.push_str(&indent(depth + 1));
            out.push_str(&partial_escape(text));
            out.push('\n');
        }

        for child in self
            .policy
            .ordered_children(&node.name, depth, &node.children)
        {
            self.write_node(out, child, depth + 1);
        }

        out.push_str(&indent(depth));
        out.push_str("</");
        out.push_str(&node.name);
        out.push('>');
        self.write_tail(out, node);
    }

    fn write_open(&self, out: &mut String, node: &Node, depth: usize) {
        out.push_str(&indent(depth));
        out.push('<');
        out.push_str(&node.name);
        for attr in self
            .policy
            .ordered_attributes(&node.name, depth, &node.attributes)
        {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            out.push_str(&escape(attr.value.as_str()));
            out.push('"');
        }
    }

    fn write_tail(&self, out: &mut String, node: &Node) {
        if let Some(tail) = &node.tail {
            out.push_str(&partial_escape(tail.as_str()));
        }
        out.push('\n');
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(depth * INDENT)
}
