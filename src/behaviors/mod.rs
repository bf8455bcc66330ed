//! The page behaviors and the routine that wires them up on page load.
//!
//! Each behavior locates the elements it needs into a typed `*Fields` value.
//! Pages that don't render a fragment simply get `None` and that behavior is
//! skipped; nothing else depends on it.

pub mod delete_modal;
pub mod feedback;
pub mod formset;
pub mod icons;
pub mod mask;
pub mod menu;

use serde::Serialize;

use crate::config::PageConfig;
use crate::page::{Installed, Page};

use delete_modal::DeleteModalFields;
use feedback::{FeedbackFields, FeedbackMessage, PendingFeedback};
use formset::FormsetFields;
use icons::IconRenderer;
use mask::{MaskFields, MaskStyle};
use menu::MenuFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Behavior {
    CpfMask,
    DigitsMask,
    UserMenu,
    DeleteModal,
    Feedback,
    Formset,
}

/// What one setup run did
#[derive(Debug, Default)]
pub struct SetupReport {
    pub installed: Vec<(Behavior, Installed)>,
    pub skipped: Vec<Behavior>,
    /// Message shown by the feedback dialog during this run
    pub feedback: Option<FeedbackMessage>,
    /// Icon placeholders rendered
    pub icons: usize,
}

impl SetupReport {
    pub fn is_installed(&self, behavior: Behavior) -> bool {
        self.installed.iter().any(|(b, _)| *b == behavior)
    }

    fn record(&mut self, behavior: Behavior, installed: Option<Installed>) {
        match installed {
            Some(installed) => self.installed.push((behavior, installed)),
            None => {
                tracing::debug!("{:?} not present on this page", behavior);
                self.skipped.push(behavior);
            }
        }
    }

    /// Unregister everything this run installed
    pub fn dispose(self, page: &mut Page) {
        for (_, installed) in self.installed {
            page.dispose(installed);
        }
    }
}

/// Install every behavior whose markup is present, then render icons.
pub fn setup(page: &mut Page, config: &PageConfig, icons: Option<&mut dyn IconRenderer>) -> SetupReport {
    let mut report = SetupReport::default();
    let visible = config.visible_class.as_str();

    let cpf = MaskFields::locate(page.doc(), &config.mask, &config.mask.cpf_input)
        .map(|fields| mask::install(page, fields, MaskStyle::Cpf));
    report.record(Behavior::CpfMask, cpf);

    let digits = MaskFields::locate(page.doc(), &config.mask, &config.mask.digits_input)
        .map(|fields| mask::install(page, fields, MaskStyle::DigitsOnly));
    report.record(Behavior::DigitsMask, digits);

    let menu = MenuFields::locate(page.doc(), &config.menu)
        .map(|fields| menu::install(page, fields, &config.menu.open_class));
    report.record(Behavior::UserMenu, menu);

    let delete = DeleteModalFields::locate(page.doc(), &config.delete_modal)
        .map(|fields| delete_modal::install(page, fields, &config.delete_modal, visible));
    report.record(Behavior::DeleteModal, delete);

    let feedback = match FeedbackFields::locate(page.doc(), &config.feedback) {
        Some(fields) => {
            let installed = feedback::install(page, fields, &config.feedback, visible);
            if let Some(pending) = PendingFeedback::locate(page.doc(), &config.feedback) {
                match feedback::present(page.doc_mut(), &fields, pending, &config.feedback, visible) {
                    Ok(shown) => report.feedback = shown,
                    Err(e) => tracing::warn!("Failed to show feedback message: {}", e),
                }
            }
            Some(installed)
        }
        None => None,
    };
    report.record(Behavior::Feedback, feedback);

    let formset = FormsetFields::locate(page.doc(), &config.formset).and_then(|fields| {
        formset::install(page, fields, &config.formset)
            .map_err(|e| {
                tracing::warn!("Formset not installed: {}", e);
            })
            .ok()
    });
    report.record(Behavior::Formset, formset);

    if let Some(renderer) = icons {
        match renderer.render(page.doc_mut()) {
            Ok(count) => report.icons = count,
            Err(e) => tracing::warn!("Icon rendering failed: {}", e),
        }
    }

    tracing::debug!(
        "setup installed {} behaviors, skipped {}",
        report.installed.len(),
        report.skipped.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use icons::DataIcons;

    #[test]
    fn test_empty_page_installs_nothing() {
        let mut page = Page::new(Document::new());
        let report = setup(&mut page, &PageConfig::default(), None);
        assert!(report.installed.is_empty());
        assert_eq!(report.skipped.len(), 6);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn test_only_present_fragments_are_installed() {
        let mut doc = Document::new();
        let root = doc.root();
        for id in ["user-menu-trigger", "user-menu"] {
            let el = doc.create_element("div");
            doc.set_attr(el, "id", id).unwrap();
            doc.append_child(root, el).unwrap();
        }
        let icon = doc.create_element("i");
        doc.set_attr(icon, "data-lucide", "user").unwrap();
        doc.append_child(root, icon).unwrap();

        let mut page = Page::new(doc);
        let mut icons = DataIcons::new("data-lucide");
        let report = setup(&mut page, &PageConfig::default(), Some(&mut icons));

        assert!(report.is_installed(Behavior::UserMenu));
        assert!(!report.is_installed(Behavior::Formset));
        assert_eq!(report.icons, 1);
        assert_eq!(page.listener_count(), 2);

        report.dispose(&mut page);
        assert_eq!(page.listener_count(), 0);
    }
}
