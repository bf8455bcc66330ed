//! Page descriptions: the server-rendered fragments a page carries, written as
//! a TOML element tree.
//!
//! ```toml
//! [[elements]]
//! tag = "form"
//! id = "colaborador-form"
//!
//! [[elements.children]]
//! tag = "input"
//! id = "cpf"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::dom::{Document, NodeId};
use crate::error::{PageError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageSpec {
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Text placed before any children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl PageSpec {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Build the document these elements describe
    pub fn build(&self) -> Result<Document> {
        let mut doc = Document::new();
        let root = doc.root();
        for element in &self.elements {
            element.build_into(&mut doc, root)?;
        }
        Ok(doc)
    }
}

impl ElementSpec {
    fn build_into(&self, doc: &mut Document, parent: NodeId) -> Result<NodeId> {
        let node = doc.create_element(&self.tag);
        for (name, value) in &self.attrs {
            doc.set_attr(node, name, value)?;
        }
        if let Some(id) = &self.id {
            doc.set_attr(node, "id", id)?;
        }
        if let Some(class) = &self.class {
            doc.set_attr(node, "class", class)?;
        }
        if let Some(text) = &self.text {
            let text = doc.create_text(text);
            doc.append_child(node, text)?;
        }
        for child in &self.children {
            child.build_into(doc, node)?;
        }
        doc.append_child(parent, node)?;
        Ok(node)
    }
}

/// Find the element a session step points at: `#id`, `.class` (the
/// `index`-th match) or a bare tag name (the `index`-th match).
pub fn resolve(doc: &Document, target: &str, index: usize) -> Result<NodeId> {
    let found = if let Some(id) = target.strip_prefix('#') {
        doc.element_by_id(id)
    } else if let Some(class) = target.strip_prefix('.') {
        doc.elements_by_class(class).get(index).copied()
    } else {
        doc.elements_by_tag(target).get(index).copied()
    };
    found.ok_or_else(|| PageError::UnknownTarget(format!("{target}[{index}]")))
}
