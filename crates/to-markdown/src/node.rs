//! Arena-backed DOM used by the rewrite engine.
//!
//! All nodes of a tree live in one `Vec` owned by [`Dom`] and are addressed by
//! [`NodeId`]. A node owns its children through an ordered index list; the
//! parent link is a plain index used only for lookups (list numbering, nesting
//! checks), never for ownership.
//!
//! Any parser can build a `Dom` through the `create_*` / `append_*` methods,
//! which keeps the converter independent of a particular HTML implementation.

use indexmap::IndexMap;

use crate::utilities::is_void;

/// Handle of a node inside its [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node types matching DOM nodeType values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element node (nodeType = 1)
    Element = 1,
    /// Text node (nodeType = 3)
    Text = 3,
}

/// Tag name and attributes of an element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
}

impl Element {
    /// Create an element with no attributes. The name is stored lowercase.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attributes: IndexMap::new(),
        }
    }

    /// Lowercase tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    /// Set an attribute, keeping the original position when it already exists
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Attributes in source order
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable HTML tree with a single root element.
///
/// Detached nodes (removed or replaced) stay in the arena until the `Dom` is
/// dropped; they are simply unreachable from the root.
#[derive(Debug, Clone)]
pub struct Dom {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Dom {
    /// Create a tree whose root is an empty element named `root_tag`.
    pub fn new(root_tag: &str) -> Self {
        let mut dom = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        dom.root = dom.push(NodeData::Element(Element::new(root_tag)));
        dom
    }

    /// Create an empty fragment container (a `div` root).
    pub fn fragment() -> Self {
        Self::new("div")
    }

    /// The container element all content hangs off
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrowed view of a node
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { dom: self, id }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element node
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(tag_name)))
    }

    /// Create a detached element node with attributes
    pub fn create_element_with_attrs<'a, I>(&mut self, tag_name: &str, attrs: I) -> NodeId
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut element = Element::new(tag_name);
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        self.push(NodeData::Element(element))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(NodeData::Text(content.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// Returns `false` and leaves the tree unchanged when `child` is the root,
    /// `parent` itself or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_adopt(parent, child) {
            return false;
        }
        self.detach(child);
        self.slots[child.0].parent = Some(parent);
        self.slots[parent.0].children.push(child);
        true
    }

    /// True if `node` can become a child of `parent` without forming a cycle
    fn can_adopt(&self, parent: NodeId, node: NodeId) -> bool {
        node != self.root && !self.is_inclusive_ancestor(node, parent)
    }

    /// True if `ancestor` is `id` or lies on its parent chain
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag_name: &str) -> NodeId {
        let id = self.create_element(tag_name);
        self.append_child(parent, id);
        id
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        let id = self.create_text(content);
        self.append_child(parent, id);
        id
    }

    /// Remove `child` from `parent`. Returns `false` if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let siblings = &mut self.slots[parent.0].children;
        match siblings.iter().position(|&c| c == child) {
            Some(pos) => {
                siblings.remove(pos);
                self.slots[child.0].parent = None;
                true
            }
            None => false,
        }
    }

    /// Put `new` where `old` is in its parent's child list.
    ///
    /// Sibling order is preserved and `old` becomes detached. Returns `false`
    /// when `old` has no parent (e.g. the root), or when `new` is the root or
    /// an ancestor of `old`.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        if old == new {
            return true;
        }
        let Some(parent) = self.slots[old.0].parent else {
            return false;
        };
        if !self.can_adopt(parent, new) {
            return false;
        }
        self.detach(new);
        let Some(pos) = self.index_in_parent(old) else {
            return false;
        };
        self.slots[parent.0].children[pos] = new;
        self.slots[new.0].parent = Some(parent);
        self.slots[old.0].parent = None;
        true
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent {
            self.remove_child(parent, id);
        }
    }

    /// Copy `id` and all of its descendants. The copy is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.slots[id.0].data.clone();
        let copy = self.push(data);
        let children = self.slots[id.0].children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Payload of a node
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.slots[id.0].data
    }

    /// Element or text
    pub fn node_type(&self, id: NodeId) -> NodeType {
        match self.data(id) {
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
        }
    }

    /// Element payload, `None` for text nodes
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    /// Lowercase tag name, `None` for text nodes
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Value of a text node, `None` for elements
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(value) => Some(value),
            NodeData::Element(_) => None,
        }
    }

    /// Overwrite the value of a text node. Elements are left untouched.
    pub fn set_text(&mut self, id: NodeId, value: String) {
        if let NodeData::Text(current) = &mut self.slots[id.0].data {
            *current = value;
        }
    }

    /// Parent node, `None` for the root and detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    /// Child nodes in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    /// Element children in document order
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.node_type(c) == NodeType::Element)
    }

    /// Zero-based position among all of the parent's child nodes
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        match self.data(id) {
            NodeData::Text(value) => value.clone(),
            NodeData::Element(_) => self
                .children(id)
                .iter()
                .map(|&c| self.text_content(c))
                .collect(),
        }
    }

    /// Serialized markup of the node's children
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_outer_html(child, &mut out);
        }
        out
    }

    /// Serialized markup of the node itself
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_outer_html(id, &mut out);
        out
    }

    fn write_outer_html(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text(value) => out.push_str(&escape_html_text(value)),
            NodeData::Element(element) => {
                out.push('<');
                out.push_str(element.name());
                for (name, value) in element.attrs() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html_attr(value));
                    out.push('"');
                }
                out.push('>');

                if is_void(element.name()) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_outer_html(child, out);
                }
                out.push_str("</");
                out.push_str(element.name());
                out.push('>');
            }
        }
    }
}

/// Escape text content the way `innerHTML` does
fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('"', "&quot;")
}

/// A node together with the tree it lives in.
///
/// Rules receive a `NodeRef` so they can look at the parent and siblings of
/// the element they convert.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    dom: &'a Dom,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Handle of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to
    pub fn dom(&self) -> &'a Dom {
        self.dom
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        self.dom.node_type(self.id) == NodeType::Element
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        self.dom.node_type(self.id) == NodeType::Text
    }

    /// Lowercase tag name; empty for text nodes
    pub fn tag_name(&self) -> &'a str {
        self.dom.tag_name(self.id).unwrap_or_default()
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.dom.attr(self.id, name)
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Value of a text node
    pub fn text(&self) -> Option<&'a str> {
        self.dom.text(self.id)
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.dom.parent(self.id).map(|id| self.dom.node(id))
    }

    /// Tag name of the parent element, if any
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.dom.tag_name(self.dom.parent(self.id)?)
    }

    /// Zero-based position among the parent's child nodes
    pub fn index_in_parent(&self) -> Option<usize> {
        self.dom.index_in_parent(self.id)
    }

    /// Child nodes in document order
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let dom = self.dom;
        dom.children(self.id).iter().map(move |&id| dom.node(id))
    }

    /// Text of this node and its descendants
    pub fn text_content(&self) -> String {
        self.dom.text_content(self.id)
    }

    /// Serialized markup of the node itself
    pub fn outer_html(&self) -> String {
        self.dom.outer_html(self.id)
    }

    /// Serialized markup of the node's children
    pub fn inner_html(&self) -> String {
        self.dom.inner_html(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element() {
        let mut dom = Dom::fragment();
        let node = dom.create_element("DIV");
        assert_eq!(dom.node_type(node), NodeType::Element);
        assert_eq!(dom.tag_name(node), Some("div"));
        assert_eq!(dom.parent(node), None);
    }

    #[test]
    fn test_create_text() {
        let mut dom = Dom::fragment();
        let node = dom.create_text("Hello World");
        assert!(dom.node(node).is_text());
        assert_eq!(dom.text_content(node), "Hello World");
    }

    #[test]
    fn test_attributes() {
        let mut dom = Dom::fragment();
        let node = dom.create_element_with_attrs(
            "a",
            [("href", "https://example.com"), ("TITLE", "Example")],
        );
        assert_eq!(dom.attr(node, "href"), Some("https://example.com"));
        assert_eq!(dom.attr(node, "Title"), Some("Example"));
        assert_eq!(dom.attr(node, "class"), None);
    }

    #[test]
    fn test_children_and_parent() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        dom.append_text(root, "Hello");
        let span = dom.append_element(root, "span");
        dom.append_text(root, "World");

        assert_eq!(dom.children(root).len(), 3);
        assert_eq!(dom.element_children(root).count(), 1);
        assert_eq!(dom.parent(span), Some(root));
        assert_eq!(dom.index_in_parent(span), Some(1));
        assert_eq!(dom.node(span).parent_tag(), Some("div"));
    }

    #[test]
    fn test_text_content() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        dom.append_text(root, "Hello ");
        let span = dom.append_element(root, "span");
        dom.append_text(span, "World");

        assert_eq!(dom.text_content(root), "Hello World");
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let first = dom.append_text(root, "a");
        let middle = dom.append_element(root, "em");
        let last = dom.append_text(root, "c");

        let replacement = dom.create_text("b");
        assert!(dom.replace_child(middle, replacement));

        assert_eq!(dom.children(root), &[first, replacement, last]);
        assert_eq!(dom.parent(middle), None);
        assert_eq!(dom.parent(replacement), Some(root));
        assert!(!dom.replace_child(root, replacement));
    }

    #[test]
    fn test_remove_child() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let text = dom.append_text(root, " ");
        assert!(dom.remove_child(root, text));
        assert!(!dom.remove_child(root, text));
        assert!(dom.children(root).is_empty());
    }

    #[test]
    fn test_append_moves_node() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let p = dom.append_element(root, "p");
        let em = dom.append_element(root, "em");
        dom.append_child(p, em);

        assert_eq!(dom.children(root), &[p]);
        assert_eq!(dom.children(p), &[em]);
    }

    #[test]
    fn test_append_rejects_ancestor() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let p = dom.append_element(root, "p");
        let em = dom.append_element(p, "em");
        let b = dom.append_element(em, "b");

        assert!(!dom.append_child(em, p));
        assert!(!dom.append_child(em, em));
        assert!(!dom.append_child(b, root));

        assert_eq!(dom.parent(p), Some(root));
        assert_eq!(dom.children(em), &[b]);
        assert_eq!(dom.parent(root), None);
        assert_eq!(dom.inner_html(root), "<p><em><b></b></em></p>");
    }

    #[test]
    fn test_append_rejects_root_elsewhere() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let detached = dom.create_element("section");

        assert!(!dom.append_child(detached, root));
        assert_eq!(dom.parent(root), None);
        assert!(dom.children(detached).is_empty());
    }

    #[test]
    fn test_replace_rejects_ancestor() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let ul = dom.append_element(root, "ul");
        let li = dom.append_element(ul, "li");
        let text = dom.append_text(li, "x");

        assert!(!dom.replace_child(text, ul));
        assert!(!dom.replace_child(li, root));
        assert_eq!(dom.children(li), &[text]);
        assert_eq!(dom.parent(ul), Some(root));
        assert!(dom.is_inclusive_ancestor(root, text));
        assert!(!dom.is_inclusive_ancestor(text, root));
    }

    #[test]
    fn test_deep_clone() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let a = dom.append_element(root, "a");
        dom.append_text(a, "Link");

        let copy = dom.deep_clone(a);
        assert_ne!(copy, a);
        assert_eq!(dom.parent(copy), None);
        assert_eq!(dom.outer_html(copy), dom.outer_html(a));

        let copied_text = dom.children(copy)[0];
        dom.set_text(copied_text, "Changed".to_string());
        assert_eq!(dom.outer_html(a), "<a>Link</a>");
    }

    #[test]
    fn test_outer_html() {
        let mut dom = Dom::fragment();
        let a = dom.create_element_with_attrs("a", [("href", "https://example.com")]);
        dom.append_text(a, "Link");

        assert_eq!(dom.outer_html(a), "<a href=\"https://example.com\">Link</a>");
    }

    #[test]
    fn test_void_element_html() {
        let mut dom = Dom::fragment();
        let br = dom.create_element("br");
        assert_eq!(dom.outer_html(br), "<br>");

        let img = dom.create_element_with_attrs("img", [("src", "test.png"), ("alt", "")]);
        assert_eq!(dom.outer_html(img), "<img src=\"test.png\" alt=\"\">");
    }

    #[test]
    fn test_escaping() {
        let mut dom = Dom::fragment();
        let root = dom.root();
        let a = dom.create_element_with_attrs("a", [("title", "\"x\" & y")]);
        dom.append_child(root, a);
        dom.append_text(a, "1 < 2 &\u{a0}3 > 0");

        assert_eq!(
            dom.inner_html(root),
            "<a title=\"&quot;x&quot; &amp; y\">1 &lt; 2 &amp;&nbsp;3 &gt; 0</a>"
        );
    }
}
