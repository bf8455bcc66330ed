//! Loan item rows ("cart"): clone the empty-form template on each add click.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::FormsetIds;
use crate::dom::{Document, NodeId};
use crate::error::{PageError, Result};
use crate::page::{EventKind, Installed, Listen, Page};

/// Parse a form count the way the browser's `parseInt` would: optional
/// surrounding whitespace, then leading decimal digits.
pub fn parse_count(raw: &str) -> Option<usize> {
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormsetFields {
    pub container: NodeId,
    pub add_button: NodeId,
    pub template: NodeId,
    pub total_forms: NodeId,
    /// Optional ceiling rendered by the management form
    pub max_forms: Option<NodeId>,
}

impl FormsetFields {
    pub fn locate(doc: &Document, ids: &FormsetIds) -> Option<Self> {
        Some(Self {
            container: doc.element_by_id(&ids.container)?,
            add_button: doc.element_by_id(&ids.add_button)?,
            template: doc.element_by_id(&ids.template)?,
            total_forms: doc.element_by_id(&ids.total_forms)?,
            max_forms: doc.element_by_id(&ids.max_forms),
        })
    }

    /// Clone the template content with `placeholder` replaced by `index` and
    /// append it to the container. Returns the new top-level nodes.
    fn append_row(&self, doc: &mut Document, placeholder: &str, index: usize) -> Result<Vec<NodeId>> {
        let index = index.to_string();
        let mut added = Vec::new();
        for part in doc.children(self.template).to_vec() {
            let copy = doc.clone_subtree(part);
            doc.replace_in_subtree(copy, placeholder, &index);
            doc.append_child(self.container, copy)?;
            added.push(copy);
        }
        Ok(added)
    }
}

/// Install the add-row handler. The row counter starts from the total-forms
/// field as rendered; a value with no leading digits, or one the counter
/// could not step past, is rejected.
pub fn install(page: &mut Page, fields: FormsetFields, ids: &FormsetIds) -> Result<Installed> {
    let raw = page.doc().value(fields.total_forms);
    let start = parse_count(raw).filter(|n| n.checked_add(1).is_some());
    let start = start.ok_or_else(|| PageError::InvalidFormCount {
        field: ids.total_forms.clone(),
        value: raw.to_string(),
    })?;
    let max = fields
        .max_forms
        .and_then(|n| parse_count(page.doc().value(n)));

    let count = Rc::new(Cell::new(start));
    let placeholder = ids.placeholder.clone();

    let mut installed = Installed::default();
    installed.push(page.listen(
        Listen::Node(fields.add_button),
        EventKind::Click,
        move |doc, event| {
            // The button sits inside the loan form; never submit it
            event.prevent_default();

            let index = count.get();
            if max.is_some_and(|max| index >= max) {
                tracing::debug!("formset already holds the maximum of {} rows", index);
                return Ok(());
            }
            let Some(next) = index.checked_add(1) else {
                tracing::debug!("formset row counter is exhausted at {}", index);
                return Ok(());
            };
            fields.append_row(doc, &placeholder, index)?;
            count.set(next);
            doc.set_value(fields.total_forms, &next.to_string())?;
            tracing::debug!("added formset row {}", index);
            Ok(())
        },
    ));
    Ok(installed)
}
