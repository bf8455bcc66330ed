//! One shared "are you sure?" dialog for every delete link on a list page.
//!
//! Clicking a trigger copies its target URL into the dialog's form and its
//! display name into the dialog text. Confirming is a plain form submission.

use crate::config::DeleteModalIds;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::page::{EventKind, Installed, Listen, Page};

/// What a trigger asks to delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub url: String,
    pub name: String,
}

impl DeleteTarget {
    /// Read the target from a trigger's attributes at click time
    pub fn from_trigger(doc: &Document, trigger: NodeId, ids: &DeleteModalIds) -> Self {
        Self {
            url: doc.attr(trigger, &ids.url_attr).unwrap_or_default().to_string(),
            name: doc.attr(trigger, &ids.name_attr).unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteModalFields {
    pub modal: NodeId,
    pub backdrop: NodeId,
    pub form: NodeId,
    pub name_display: NodeId,
    pub close_button: NodeId,
    pub cancel_button: NodeId,
    pub triggers: Vec<NodeId>,
}

impl DeleteModalFields {
    /// `None` unless the dialog markup is complete and at least one trigger exists
    pub fn locate(doc: &Document, ids: &DeleteModalIds) -> Option<Self> {
        let triggers = doc.elements_by_class(&ids.trigger_class);
        if triggers.is_empty() {
            return None;
        }
        Some(Self {
            modal: doc.element_by_id(&ids.modal)?,
            backdrop: doc.element_by_id(&ids.backdrop)?,
            form: doc.element_by_id(&ids.form)?,
            name_display: doc.element_by_id(&ids.name_display)?,
            close_button: doc.element_by_id(&ids.close_button)?,
            cancel_button: doc.element_by_id(&ids.cancel_button)?,
            triggers,
        })
    }

    pub fn is_open(&self, doc: &Document, visible_class: &str) -> bool {
        doc.has_class(self.modal, visible_class) && doc.has_class(self.backdrop, visible_class)
    }

    fn open(&self, doc: &mut Document, target: &DeleteTarget, visible_class: &str) -> Result<()> {
        doc.set_attr(self.form, "action", &target.url)?;
        doc.set_text_content(self.name_display, &target.name)?;
        doc.add_class(self.modal, visible_class)?;
        doc.add_class(self.backdrop, visible_class)
    }

    fn close(&self, doc: &mut Document, visible_class: &str) -> Result<()> {
        doc.remove_class(self.modal, visible_class)?;
        doc.remove_class(self.backdrop, visible_class)?;
        // Drop the captured target so a stale URL can't be submitted later
        doc.remove_attr(self.form, "action")?;
        doc.set_text_content(self.name_display, "")
    }
}

pub fn install(
    page: &mut Page,
    fields: DeleteModalFields,
    ids: &DeleteModalIds,
    visible_class: &str,
) -> Installed {
    let mut installed = Installed::default();

    for &trigger in &fields.triggers {
        let fields = fields.clone();
        let ids = ids.clone();
        let class = visible_class.to_string();
        installed.push(page.listen(
            Listen::Node(trigger),
            EventKind::Click,
            move |doc, event| {
                event.prevent_default();
                let target = DeleteTarget::from_trigger(doc, trigger, &ids);
                tracing::debug!("confirm delete of {:?} at {}", target.name, target.url);
                fields.open(doc, &target, &class)
            },
        ));
    }

    for button in [fields.close_button, fields.cancel_button] {
        let fields = fields.clone();
        let class = visible_class.to_string();
        installed.push(page.listen(
            Listen::Node(button),
            EventKind::Click,
            move |doc, event| {
                event.prevent_default();
                fields.close(doc, &class)
            },
        ));
    }

    let backdrop = fields.backdrop;
    let class = visible_class.to_string();
    installed.push(page.listen(
        Listen::Node(backdrop),
        EventKind::Click,
        move |doc, event| {
            // Clicks bubbling up from the dialog itself don't count
            if event.target() == backdrop {
                fields.close(doc, &class)?;
            }
            Ok(())
        },
    ));

    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::DefaultAction;

    struct Fixture {
        page: Page,
        fields: DeleteModalFields,
        confirm: NodeId,
    }

    fn element(doc: &mut Document, parent: NodeId, tag: &str, id: &str) -> NodeId {
        let el = doc.create_element(tag);
        if !id.is_empty() {
            doc.set_attr(el, "id", id).unwrap();
        }
        doc.append_child(parent, el).unwrap();
        el
    }

    fn build(with_triggers: bool) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let body = element(&mut doc, root, "body", "");

        if with_triggers {
            for (url, name) in [("/x/5/delete", "Jane"), ("/colaboradores/9/excluir/", "Rui")] {
                let link = element(&mut doc, body, "a", "");
                doc.set_attr(link, "href", "#").unwrap();
                doc.set_attr(link, "class", "btn delete-trigger").unwrap();
                doc.set_attr(link, "data-url", url).unwrap();
                doc.set_attr(link, "data-name", name).unwrap();
            }
        }

        element(&mut doc, body, "div", "delete-modal-backdrop");
        let modal = element(&mut doc, body, "div", "delete-modal");
        element(&mut doc, modal, "button", "delete-modal-close");
        element(&mut doc, modal, "strong", "delete-item-name");
        let form = element(&mut doc, modal, "form", "delete-form");
        doc.set_attr(form, "method", "post").unwrap();
        let cancel = element(&mut doc, form, "button", "delete-modal-cancel");
        doc.set_attr(cancel, "type", "button").unwrap();
        let confirm = element(&mut doc, form, "button", "");
        doc.set_attr(confirm, "type", "submit").unwrap();
        (doc, confirm)
    }

    fn fixture() -> Fixture {
        let (doc, confirm) = build(true);
        let ids = DeleteModalIds::default();
        let fields = DeleteModalFields::locate(&doc, &ids).unwrap();
        let mut page = Page::new(doc);
        let _installed = install(&mut page, fields.clone(), &ids, "show");
        Fixture { page, fields, confirm }
    }

    #[test]
    fn test_trigger_populates_dialog() {
        let mut f = fixture();
        let action = f.page.click(f.fields.triggers[0]);
        assert_eq!(action, DefaultAction::None, "navigation must be prevented");

        let doc = f.page.doc();
        assert!(f.fields.is_open(doc, "show"));
        assert_eq!(doc.attr(f.fields.form, "action"), Some("/x/5/delete"));
        assert_eq!(doc.text_content(f.fields.name_display), "Jane");
    }

    #[test]
    fn test_each_trigger_reads_its_own_target() {
        let mut f = fixture();
        f.page.click(f.fields.triggers[0]);
        f.page.click(f.fields.triggers[1]);
        let doc = f.page.doc();
        assert_eq!(doc.attr(f.fields.form, "action"), Some("/colaboradores/9/excluir/"));
        assert_eq!(doc.text_content(f.fields.name_display), "Rui");
    }

    #[test]
    fn test_every_dismiss_hides_dialog_and_backdrop() {
        let mut f = fixture();
        for dismiss in [f.fields.close_button, f.fields.cancel_button, f.fields.backdrop] {
            f.page.click(f.fields.triggers[0]);
            assert!(f.fields.is_open(f.page.doc(), "show"));

            f.page.click(dismiss);
            let doc = f.page.doc();
            assert!(!doc.has_class(f.fields.modal, "show"));
            assert!(!doc.has_class(f.fields.backdrop, "show"));
            assert_eq!(doc.attr(f.fields.form, "action"), None);
        }
    }

    #[test]
    fn test_click_inside_dialog_keeps_it_open() {
        let mut f = fixture();
        f.page.click(f.fields.triggers[0]);
        f.page.click(f.fields.name_display);
        assert!(f.fields.is_open(f.page.doc(), "show"));
    }

    #[test]
    fn test_confirm_submits_normally() {
        let mut f = fixture();
        f.page.click(f.fields.triggers[1]);
        assert_eq!(
            f.page.click(f.confirm),
            DefaultAction::Submit {
                action: "/colaboradores/9/excluir/".into(),
                method: "post".into()
            }
        );
    }

    #[test]
    fn test_no_triggers_installs_nothing() {
        let (doc, _) = build(false);
        assert!(DeleteModalFields::locate(&doc, &DeleteModalIds::default()).is_none());
    }

    #[test]
    fn test_template_triggers_are_not_bound() {
        let (mut doc, _) = build(false);
        let body = doc.children(doc.root())[0];
        let template = element(&mut doc, body, "template", "");
        let link = element(&mut doc, template, "a", "");
        doc.set_attr(link, "class", "delete-trigger").unwrap();
        assert!(DeleteModalFields::locate(&doc, &DeleteModalIds::default()).is_none());
    }
}
