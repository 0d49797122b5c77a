//! The ordered element tree.

/// One attribute of an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// The attribute value (after unescaping XML entities).
    pub value: String,
}

/// An XML element.
///
/// Elements own their children directly, so a tree is always a tree: there is
/// no way to share a node between two parents or to point back at an ancestor.
///
/// `text` distinguishes an element written as `<a/>` (`None`) from one with
/// content (`Some`, possibly empty when the element only has children). An
/// element with `text == None` never has children; [`Node::push_child`]
/// maintains that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// The element name, including any namespace prefix.
    pub name: String,

    /// Text between the start tag and the first child, whitespace-stripped.
    pub text: Option<String>,

    /// Text after the end tag, whitespace-stripped. `None` when blank.
    pub tail: Option<String>,

    /// Attributes in document order. Names are unique.
    pub attributes: Vec<Attribute>,

    /// Child elements in document order.
    pub children: Vec<Node>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Node {
    /// Create an empty element, written as `<name/>`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            tail: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element with text content.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(name)
        }
    }

    /// Create an element containing the given children and no text.
    pub fn with_children(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            text: Some(String::new()),
            children,
            ..Self::new(name)
        }
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Whether the element is written as a self-closing tag.
    pub fn is_self_closing(&self) -> bool {
        self.text.is_none()
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists
    /// so the attribute keeps its document position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Text content, treating a self-closing element as empty.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Index of the first direct child with the given name.
    pub fn child_position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }

    /// Append a child, turning a self-closing element into one with content.
    pub fn push_child(&mut self, child: Node) {
        if self.text.is_none() {
            self.text = Some(String::new());
        }
        self.children.push(child);
    }

    /// Remove and return the child at `index`.
    ///
    /// The element keeps `Some` text even when its last child goes away, so it
    /// is written as `<name></name>` rather than changing shape.
    pub fn remove_child(&mut self, index: usize) -> Node {
        self.children.remove(index)
    }
}
