//! In-memory document tree the page behaviors operate on.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by [`NodeId`].
//! Removing a node only detaches it from its parent; the id stays valid so a
//! handler holding it can still inspect the detached subtree.

pub mod markup;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{PageError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(PageError::NotAnElement(id)),
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
        }))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_ok = matches!(self.node(parent).kind, NodeKind::Document | NodeKind::Element(_));
        if !parent_ok || child == self.root || self.contains(child, parent) {
            return Err(PageError::HierarchyRequest { parent, child });
        }
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        Ok(())
    }

    /// Detach a node (and its subtree) from the document.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Whether `node` is `ancestor` or lies somewhere below it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Pre-order list of the nodes below `id` (not including `id`)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Connected nodes in document order. The content of `<template>`
    /// elements is inert and left out.
    fn searchable(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(self.root).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if self.tag(current) != Some("template") {
                stack.extend(self.children(current).iter().rev().copied());
            }
        }
        out
    }

    /// First connected element with the given id, in document order
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.searchable()
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    /// Connected elements carrying `class`, in document order
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.searchable()
            .into_iter()
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Connected elements carrying the attribute `name`, in document order
    pub fn elements_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.searchable()
            .into_iter()
            .filter(|&n| self.attr(n, name).is_some())
            .collect()
    }

    /// Connected elements with the given tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.searchable()
            .into_iter()
            .filter(|&n| self.tag(n) == Some(tag.as_str()))
            .collect()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn set_tag(&mut self, id: NodeId, tag: &str) -> Result<()> {
        self.element_mut(id)?.tag = tag.to_ascii_lowercase();
        Ok(())
    }

    /// Nearest element at or above `id` with the given tag
    pub fn closest_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.tag(current) == Some(tag) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Attribute names are case-insensitive and stored lowercased
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attrs.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    pub fn attrs(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.element(id)
            .into_iter()
            .flat_map(|el| el.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(id)?
            .attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<()> {
        self.element_mut(id)?.attrs.remove(&name.to_ascii_lowercase());
        Ok(())
    }

    fn class_list(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    fn set_class_list(&mut self, id: NodeId, classes: &[&str]) -> Result<()> {
        if classes.is_empty() {
            self.remove_attr(id, "class")
        } else {
            self.set_attr(id, "class", &classes.join(" "))
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_list(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let mut classes: Vec<String> = self.class_list(id).into_iter().map(String::from).collect();
        classes.push(class.to_string());
        let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
        self.set_class_list(id, &refs)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        if !self.has_class(id, class) {
            return Ok(());
        }
        let classes: Vec<String> = self
            .class_list(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(String::from)
            .collect();
        let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
        self.set_class_list(id, &refs)
    }

    /// Flip `class` and return whether it is now present
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> Result<bool> {
        if self.has_class(id, class) {
            self.remove_class(id, class)?;
            Ok(false)
        } else {
            self.add_class(id, class)?;
            Ok(true)
        }
    }

    /// Form-control value (empty when unset)
    pub fn value(&self, id: NodeId) -> &str {
        self.attr(id, "value").unwrap_or_default()
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<()> {
        self.set_attr(id, "value", value)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeKind::Text(text) = &self.node(id).kind {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match &self.node(n).kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.element_mut(id)?;
        self.clear_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Replace all children with the text and `<br>` breaks of `source`.
    /// Any other markup is kept as literal text.
    pub fn set_inner_markup(&mut self, id: NodeId, source: &str) -> Result<()> {
        self.element_mut(id)?;
        self.clear_children(id);
        for fragment in markup::parse_inline(source) {
            let node = match fragment {
                markup::Fragment::Text(text) => self.create_text(&text),
                markup::Fragment::LineBreak => self.create_element("br"),
            };
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Deep copy of `id` and its subtree, detached
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let kind = self.node(id).kind.clone();
        let copy = match kind {
            NodeKind::Document => self.push(NodeKind::Element(Element {
                tag: "template".to_string(),
                attrs: BTreeMap::new(),
            })),
            other => self.push(other),
        };
        let children = self.children(id).to_vec();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// Replace every occurrence of `token` in attribute values and text at or
    /// below `id`. Returns the number of nodes that changed.
    pub fn replace_in_subtree(&mut self, id: NodeId, token: &str, replacement: &str) -> usize {
        if token.is_empty() {
            return 0;
        }
        let mut nodes = vec![id];
        nodes.extend(self.descendants(id));

        let mut changed = 0;
        for n in nodes {
            let touched = match &mut self.node_mut(n).kind {
                NodeKind::Text(text) if text.contains(token) => {
                    *text = text.replace(token, replacement);
                    true
                }
                NodeKind::Element(el) => {
                    let mut touched = false;
                    for value in el.attrs.values_mut().filter(|v| v.contains(token)) {
                        *value = value.replace(token, replacement);
                        touched = true;
                    }
                    touched
                }
                _ => false,
            };
            if touched {
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.append_child(doc.root(), body).unwrap();
        let menu = doc.create_element("div");
        doc.set_attr(menu, "id", "user-menu").unwrap();
        doc.append_child(body, menu).unwrap();
        (doc, body, menu)
    }

    #[test]
    fn test_lookup_skips_detached_nodes() {
        let (mut doc, _, menu) = sample();
        assert_eq!(doc.element_by_id("user-menu"), Some(menu));

        doc.remove(menu);
        assert_eq!(doc.element_by_id("user-menu"), None);
        assert!(!doc.is_connected(menu));
        // Detached nodes stay readable
        assert_eq!(doc.attr(menu, "id"), Some("user-menu"));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut doc, body, menu) = sample();
        assert!(doc.append_child(menu, body).is_err());
        assert!(doc.append_child(menu, doc.root()).is_err());

        let text = doc.create_text("x");
        let el = doc.create_element("span");
        assert!(doc.append_child(text, el).is_err());
    }

    #[test]
    fn test_class_operations() {
        let (mut doc, _, menu) = sample();
        assert!(doc.toggle_class(menu, "show").unwrap());
        doc.add_class(menu, "wide").unwrap();
        doc.add_class(menu, "show").unwrap();
        assert_eq!(doc.attr(menu, "class"), Some("show wide"));

        assert!(!doc.toggle_class(menu, "show").unwrap());
        doc.remove_class(menu, "wide").unwrap();
        assert_eq!(doc.attr(menu, "class"), None);
    }

    #[test]
    fn test_inner_markup_keeps_line_breaks() {
        let (mut doc, _, menu) = sample();
        doc.set_inner_markup(menu, "Saved.<br>Stock updated<b>!</b>").unwrap();

        let kids = doc.children(menu).to_vec();
        assert_eq!(kids.len(), 3);
        assert_eq!(doc.tag(kids[1]), Some("br"));
        assert_eq!(doc.text_content(menu), "Saved.Stock updated<b>!</b>");
    }

    #[test]
    fn test_clone_and_replace() {
        let (mut doc, body, _) = sample();
        let row = doc.create_element("div");
        doc.set_attr(row, "id", "row-__prefix__").unwrap();
        let label = doc.create_text("Item __prefix__ / __prefix__");
        doc.append_child(row, label).unwrap();
        doc.append_child(body, row).unwrap();

        let copy = doc.clone_subtree(row);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.replace_in_subtree(copy, "__prefix__", "4"), 2);
        assert_eq!(doc.attr(copy, "id"), Some("row-4"));
        assert_eq!(doc.text_content(copy), "Item 4 / 4");

        // The original is untouched
        assert_eq!(doc.attr(row, "id"), Some("row-__prefix__"));
    }

    #[test]
    fn test_template_content_is_not_searched() {
        let (mut doc, body, _) = sample();
        let template = doc.create_element("template");
        doc.set_attr(template, "id", "empty-form-template").unwrap();
        doc.append_child(body, template).unwrap();
        let row = doc.create_element("a");
        doc.set_attr(row, "id", "row-__prefix__").unwrap();
        doc.set_attr(row, "class", "delete-trigger").unwrap();
        doc.set_attr(row, "data-lucide", "trash-2").unwrap();
        doc.append_child(template, row).unwrap();

        assert_eq!(doc.element_by_id("empty-form-template"), Some(template));
        assert_eq!(doc.element_by_id("row-__prefix__"), None);
        assert!(doc.elements_by_class("delete-trigger").is_empty());
        assert!(doc.elements_with_attr("data-lucide").is_empty());
        assert!(doc.elements_by_tag("a").is_empty());
        assert_eq!(doc.elements_by_tag("TEMPLATE"), vec![template]);

        // Subtree walks still see the content
        assert_eq!(doc.descendants(template), vec![row]);
    }

    #[test]
    fn test_attribute_names_ignore_case() {
        let (mut doc, _, menu) = sample();
        doc.set_attr(menu, "data-URL", "/x/5/delete").unwrap();
        assert_eq!(doc.attr(menu, "DATA-url"), Some("/x/5/delete"));
        assert_eq!(doc.attrs(menu).find(|(k, _)| k.starts_with("data")), Some(("data-url", "/x/5/delete")));
        assert_eq!(doc.elements_with_attr("Data-Url"), vec![menu]);

        doc.remove_attr(menu, "Data-Url").unwrap();
        assert_eq!(doc.attr(menu, "data-url"), None);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let (doc, body, menu) = sample();
        assert!(doc.contains(menu, menu));
        assert!(doc.contains(body, menu));
        assert!(!doc.contains(menu, body));
    }
}
