use crate::dom::Document;
use crate::error::Result;

/// Turns icon placeholders into rendered icons after the behaviors are wired
pub trait IconRenderer {
    /// Returns how many placeholders were rendered
    fn render(&mut self, doc: &mut Document) -> Result<usize>;
}

/// Lucide-style placeholders: `<i data-lucide="trash-2">` becomes
/// `<svg data-lucide="trash-2" class="lucide lucide-trash-2">`.
#[derive(Debug, Clone)]
pub struct DataIcons {
    attr: String,
}

impl DataIcons {
    pub fn new(attr: &str) -> Self {
        Self {
            attr: attr.to_string(),
        }
    }
}

impl IconRenderer for DataIcons {
    fn render(&mut self, doc: &mut Document) -> Result<usize> {
        let mut rendered = 0;
        for node in doc.elements_with_attr(&self.attr) {
            if doc.tag(node) == Some("svg") {
                continue;
            }
            let name = doc.attr(node, &self.attr).unwrap_or_default().to_string();
            doc.set_tag(node, "svg")?;
            doc.add_class(node, "lucide")?;
            if !name.is_empty() {
                doc.add_class(node, &format!("lucide-{name}"))?;
            }
            rendered += 1;
        }
        Ok(rendered)
    }
}
