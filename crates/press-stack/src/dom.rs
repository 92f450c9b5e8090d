//! Mutable HTML tree.
//!
//! Input is parsed with html5ever into an `RcDom`, then copied into an
//! arena of [`Node`]s that the passes can query and rewrite freely.
//! Attributes keep their source order through every mutation and back out
//! through html5ever's serializer.

use std::io;

use html5ever::parse_document;
use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Index of a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Elements serialized without an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

/// Arena-backed document. Detached nodes stay in the arena but are no
/// longer reachable from the root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    full_document: bool,
}

impl Document {
    /// Parse an HTML string. Fragments are wrapped in `html/head/body` by the
    /// parser; [`Document::to_html`] strips that wrapping again on output.
    pub fn parse(html: &str) -> Self {
        let lowered = html.to_ascii_lowercase();
        let full_document =
            lowered.contains("<html") || lowered.contains("<body") || lowered.contains("<!doctype");

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut doc = Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            full_document,
        };
        doc.convert(&dom.document, NodeId::ROOT);
        tracing::debug!("Parsed {} nodes", doc.nodes.len());
        doc
    }

    /// Copy an rcdom subtree under `parent`, depth first with an explicit
    /// stack so nesting depth never reaches the call stack.
    fn convert(&mut self, root: &Handle, parent: NodeId) {
        let mut stack: Vec<(Handle, NodeId)> = vec![(root.clone(), parent)];
        while let Some((handle, parent)) = stack.pop() {
            match &handle.data {
                RcNodeData::Document => {
                    push_children(&mut stack, &handle, parent);
                }
                RcNodeData::Doctype { name, .. } => {
                    let id = self.push(NodeData::Doctype(name.to_string()));
                    self.append_child(parent, id);
                }
                RcNodeData::Text { contents } => {
                    let id = self.create_text(&contents.borrow());
                    self.append_child(parent, id);
                }
                RcNodeData::Comment { contents } => {
                    let id = self.push(NodeData::Comment(contents.to_string()));
                    self.append_child(parent, id);
                }
                RcNodeData::Element {
                    name,
                    attrs,
                    template_contents,
                    ..
                } => {
                    let attrs = attrs
                        .borrow()
                        .iter()
                        .map(|a| Attribute::new(a.name.local.to_string(), a.value.to_string()))
                        .collect();
                    let id = self.create_element(&name.local, attrs);
                    self.append_child(parent, id);
                    // Popped in reverse: template contents first, then children.
                    push_children(&mut stack, &handle, id);
                    if let Some(contents) = template_contents.borrow().as_ref() {
                        push_children(&mut stack, contents, id);
                    }
                }
                RcNodeData::ProcessingInstruction { .. } => {}
            }
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    // ───── structure ─────

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Whether the input carried its own document scaffolding.
    pub fn is_full_document(&self) -> bool {
        self.full_document
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.elements_by_tag("body").into_iter().next()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.elements_by_tag("head").into_iter().next()
    }

    /// Every node below `id`, in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Attached elements named `tag`, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&n| self.tag(n) == Some(tag))
            .collect()
    }

    /// Attached elements whose name is one of `tags`, in document order.
    pub fn elements_by_tags(&self, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&n| self.tag(n).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    /// First descendant element of `id` matching `pred`.
    pub fn find_first(&self, id: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&n| self.is_element(n) && pred(self, n))
    }

    /// Nearest element named one of `tags`, starting at `id` itself.
    pub fn closest(&self, id: NodeId, tags: &[&str]) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.tag(node).is_some_and(|t| tags.contains(&t)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Nearest strict ancestor named one of `tags`.
    pub fn ancestor(&self, id: NodeId, tags: &[&str]) -> Option<NodeId> {
        self.parent(id).and_then(|p| self.closest(p, tags))
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == NodeId::ROOT
    }

    // ───── element data ─────

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Element(_))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(|el| el.attrs.as_slice()).unwrap_or(&[])
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set an attribute, replacing in place or appending.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.value = value.to_string(),
                None => el.attrs.push(Attribute::new(name, value)),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let el = self.element_mut(id)?;
        let pos = el.attrs.iter().position(|a| a.name == name)?;
        Some(el.attrs.remove(pos).value)
    }

    /// Raw `class` attribute, or the empty string.
    pub fn class_attr(&self, id: NodeId) -> &str {
        self.attr(id, "class").unwrap_or("")
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_attr(id).split_whitespace().any(|c| c == class)
    }

    pub fn first_class(&self, id: NodeId) -> Option<&str> {
        self.class_attr(id).split_whitespace().next()
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(t) = &self.nodes[id.0].data {
            out.push_str(t);
        }
        for n in self.descendants(id) {
            if let NodeData::Text(t) = &self.nodes[n.0].data {
                out.push_str(t);
            }
        }
        out
    }

    /// Whether `id` has a non-whitespace text node as a direct child.
    pub fn has_direct_text(&self, id: NodeId) -> bool {
        self.children(id).iter().any(|&c| {
            matches!(&self.nodes[c.0].data, NodeData::Text(t) if !t.trim().is_empty())
        })
    }

    // ───── mutation ─────

    pub fn create_element(&mut self, tag: &str, attrs: Vec<Attribute>) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Rename an element in place, keeping attributes and children.
    pub fn rename(&mut self, id: NodeId, tag: &str) {
        if let Some(el) = self.element_mut(id) {
            el.tag = tag.to_ascii_lowercase();
        }
    }

    /// Replace the attribute list of an element wholesale.
    pub fn set_attrs(&mut self, id: NodeId, attrs: Vec<Attribute>) {
        if let Some(el) = self.element_mut(id) {
            el.attrs = attrs;
        }
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `new` immediately before `reference` under the same parent.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(new);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(0);
        self.nodes[parent.0].children.insert(pos, new);
        self.nodes[new.0].parent = Some(parent);
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Replace an element by its own children.
    pub fn unwrap(&mut self, id: NodeId) {
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.insert_before(id, child);
        }
        self.detach(id);
    }

    /// Move every child of `parent` into `wrapper`, then append `wrapper`.
    pub fn wrap_children(&mut self, parent: NodeId, wrapper: NodeId) {
        let children = std::mem::take(&mut self.nodes[parent.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
            self.append_child(wrapper, child);
        }
        self.append_child(parent, wrapper);
    }

    // ───── serialization ─────

    /// The whole document for full inputs, the body content for fragments.
    pub fn to_html(&self) -> String {
        if self.full_document {
            return self.inner_html(NodeId::ROOT);
        }
        match self.body() {
            Some(body) => self.inner_html(body),
            None => self.inner_html(NodeId::ROOT),
        }
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let parent = self.tag(id).map(html_name);
        self.serialize_with(id, TraversalScope::ChildrenOnly(parent))
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        if matches!(self.nodes[id.0].data, NodeData::Document) {
            return self.inner_html(id);
        }
        self.serialize_with(id, TraversalScope::IncludeNode)
    }

    fn serialize_with(&self, id: NodeId, traversal_scope: TraversalScope) -> String {
        let mut buf = Vec::new();
        let opts = SerializeOpts {
            traversal_scope,
            ..Default::default()
        };
        if let Err(e) = serialize(&mut buf, &Subtree { doc: self, id }, opts) {
            tracing::warn!("Serialization stopped early: {}", e);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn push_children(stack: &mut Vec<(Handle, NodeId)>, handle: &Handle, parent: NodeId) {
    for child in handle.children.borrow().iter().rev() {
        stack.push((child.clone(), parent));
    }
}

fn html_name(tag: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag))
}

fn attr_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

/// A node of a [`Document`] handed to the html5ever serializer.
struct Subtree<'a> {
    doc: &'a Document,
    id: NodeId,
}

enum SerializeOp {
    Open(NodeId),
    Close(QualName),
}

impl Serialize for Subtree<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        let doc = self.doc;
        let mut ops: Vec<SerializeOp> = match traversal_scope {
            TraversalScope::IncludeNode => vec![SerializeOp::Open(self.id)],
            TraversalScope::ChildrenOnly(_) => doc
                .children(self.id)
                .iter()
                .rev()
                .map(|&c| SerializeOp::Open(c))
                .collect(),
        };

        while let Some(op) = ops.pop() {
            let id = match op {
                SerializeOp::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
                SerializeOp::Open(id) => id,
            };
            match &doc.nodes[id.0].data {
                NodeData::Document => {
                    ops.extend(doc.children(id).iter().rev().map(|&c| SerializeOp::Open(c)));
                }
                NodeData::Doctype(name) => serializer.write_doctype(name)?,
                NodeData::Text(text) => serializer.write_text(text)?,
                NodeData::Comment(text) => serializer.write_comment(text)?,
                NodeData::Element(el) => {
                    let name = html_name(&el.tag);
                    let attrs: Vec<(QualName, &str)> = el
                        .attrs
                        .iter()
                        .map(|a| (attr_name(&a.name), a.value.as_str()))
                        .collect();
                    serializer.start_elem(name.clone(), attrs.iter().map(|(n, v)| (n, *v)))?;
                    ops.push(SerializeOp::Close(name));
                    ops.extend(doc.children(id).iter().rev().map(|&c| SerializeOp::Open(c)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_round_trip() {
        let html = r#"<section class="hero"><h1>Title</h1><img src="a.png" alt=""></section>"#;
        let doc = Document::parse(html);
        assert!(!doc.is_full_document());
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_full_document_keeps_scaffolding() {
        let doc = Document::parse("<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>");
        assert!(doc.is_full_document());
        let out = doc.to_html();
        assert!(out.starts_with("<!DOCTYPE html><html><head><title>T</title></head>"));
        assert!(out.contains("<body><p>x</p></body>"));
    }

    #[test]
    fn test_attribute_order_preserved_on_set() {
        let mut doc = Document::parse(r#"<a href="/" class="btn" id="x">Go</a>"#);
        let a = doc.elements_by_tag("a")[0];
        doc.set_attr(a, "class", "cta");
        doc.set_attr(a, "title", "t");
        assert_eq!(doc.outer_html(a), r#"<a href="/" class="cta" id="x" title="t">Go</a>"#);
        assert_eq!(doc.remove_attr(a, "href").as_deref(), Some("/"));
        assert!(!doc.has_attr(a, "href"));
    }

    #[test]
    fn test_escaping() {
        let doc = Document::parse(r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3</p>"#);
        assert_eq!(
            doc.to_html(),
            r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3</p>"#
        );
    }

    #[test]
    fn test_script_is_raw() {
        let doc = Document::parse("<html><head><script>if (a < b && c) {}</script></head><body></body></html>");
        assert!(doc.to_html().contains("<script>if (a < b && c) {}</script>"));
    }

    #[test]
    fn test_rename_keeps_attributes_and_children() {
        let mut doc = Document::parse(r#"<div class="hero" id="top"><h1>Hi</h1></div>"#);
        let div = doc.elements_by_tag("div")[0];
        doc.rename(div, "section");
        assert_eq!(doc.to_html(), r#"<section class="hero" id="top"><h1>Hi</h1></section>"#);
    }

    #[test]
    fn test_unwrap_and_wrap_children() {
        let mut doc = Document::parse("<div><p>a</p><p>b</p></div>");
        let div = doc.elements_by_tag("div")[0];
        doc.unwrap(div);
        assert_eq!(doc.to_html(), "<p>a</p><p>b</p>");

        let body = doc.body().unwrap();
        let main = doc.create_element("main", vec![Attribute::new("id", "m")]);
        doc.wrap_children(body, main);
        assert_eq!(doc.to_html(), r#"<main id="m"><p>a</p><p>b</p></main>"#);
    }

    #[test]
    fn test_replace_with_and_closest() {
        let mut doc = Document::parse("<section><div><span>x</span></div></section>");
        let span = doc.elements_by_tag("span")[0];
        assert_eq!(doc.closest(span, &["section"]), Some(doc.elements_by_tag("section")[0]));
        assert_eq!(doc.closest(span, &["span"]), Some(span));
        let div = doc.elements_by_tag("div")[0];
        doc.replace_with(div, span);
        assert_eq!(doc.to_html(), "<section><span>x</span></section>");
        assert!(!doc.is_attached(div));
    }

    #[test]
    fn test_text_queries() {
        let doc = Document::parse("<div>  <p>Hello <b>world</b></p></div>");
        let div = doc.elements_by_tag("div")[0];
        let p = doc.elements_by_tag("p")[0];
        assert!(!doc.has_direct_text(div));
        assert!(doc.has_direct_text(p));
        assert_eq!(doc.text_content(p), "Hello world");
    }

    #[test]
    fn test_void_and_raw_text_serialization() {
        let doc = Document::parse(r#"<p>a<br>b<img src="x.png" alt="">c</p>"#);
        let img = doc.elements_by_tag("img")[0];
        assert_eq!(doc.outer_html(img), r#"<img src="x.png" alt="">"#);
        let p = doc.elements_by_tag("p")[0];
        assert_eq!(doc.inner_html(p), r#"a<br>b<img src="x.png" alt="">c"#);

        let doc = Document::parse("<html><head><style>a > b { color: red }</style></head><body></body></html>");
        let style = doc.elements_by_tag("style")[0];
        assert_eq!(doc.inner_html(style), "a > b { color: red }");
    }

    #[test]
    fn test_deep_nesting_round_trips() {
        let html = format!("{}x{}", "<section>".repeat(5000), "</section>".repeat(5000));
        let doc = Document::parse(&html);
        assert_eq!(doc.elements_by_tag("section").len(), 5000);
        assert_eq!(doc.to_html(), html);
        assert_eq!(doc.text_content(doc.root()), "x");
    }
}
