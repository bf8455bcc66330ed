//! Result message left by the server after a form post, shown exactly once.
//!
//! The server renders the message into data attributes on a carrier element.
//! [`PendingFeedback`] is the only way to read it and reading consumes both the
//! handle and the carrier, so running setup again finds nothing to show.

use serde::Serialize;

use crate::config::{FeedbackIds, LevelStyle};
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::page::{EventKind, Installed, Listen, Page};

/// Django message levels, in display priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

impl Level {
    pub const PRIORITY: [Level; 4] = [Level::Success, Level::Error, Level::Warning, Level::Info];

    pub fn style(self, ids: &FeedbackIds) -> &LevelStyle {
        match self {
            Level::Success => &ids.success,
            Level::Error => &ids.error,
            Level::Warning => &ids.warning,
            Level::Info => &ids.info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackMessage {
    pub level: Level,
    pub text: String,
}

/// Read-once handle on the server's message carrier
#[derive(Debug)]
pub struct PendingFeedback {
    carrier: NodeId,
}

impl PendingFeedback {
    pub fn locate(doc: &Document, ids: &FeedbackIds) -> Option<Self> {
        doc.element_by_id(&ids.carrier)
            .map(|carrier| Self { carrier })
    }

    /// Read the highest-priority message, then clear every message attribute
    /// and remove the carrier from the document.
    pub fn take(self, doc: &mut Document, ids: &FeedbackIds) -> Result<Option<FeedbackMessage>> {
        let message = Level::PRIORITY.into_iter().find_map(|level| {
            let text = doc.attr(self.carrier, &level.style(ids).attr)?.trim();
            (!text.is_empty()).then(|| FeedbackMessage {
                level,
                text: text.to_string(),
            })
        });

        for level in Level::PRIORITY {
            doc.remove_attr(self.carrier, &level.style(ids).attr)?;
        }
        doc.remove(self.carrier);
        Ok(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackFields {
    pub modal: NodeId,
    pub backdrop: NodeId,
    pub header: NodeId,
    pub title: NodeId,
    pub body: NodeId,
    pub close_button: NodeId,
    pub ok_button: NodeId,
}

impl FeedbackFields {
    pub fn locate(doc: &Document, ids: &FeedbackIds) -> Option<Self> {
        Some(Self {
            modal: doc.element_by_id(&ids.modal)?,
            backdrop: doc.element_by_id(&ids.backdrop)?,
            header: doc.element_by_id(&ids.header)?,
            title: doc.element_by_id(&ids.title)?,
            body: doc.element_by_id(&ids.body)?,
            close_button: doc.element_by_id(&ids.close_button)?,
            ok_button: doc.element_by_id(&ids.ok_button)?,
        })
    }

    pub fn is_open(&self, doc: &Document, visible_class: &str) -> bool {
        doc.has_class(self.modal, visible_class) && doc.has_class(self.backdrop, visible_class)
    }

    pub fn show(
        &self,
        doc: &mut Document,
        message: &FeedbackMessage,
        ids: &FeedbackIds,
        visible_class: &str,
    ) -> Result<()> {
        let style = message.level.style(ids);
        self.clear_style(doc, ids)?;
        doc.set_text_content(self.title, &style.label)?;
        doc.set_inner_markup(self.body, &message.text)?;
        doc.add_class(self.header, &style.header_class)?;
        doc.add_class(self.modal, visible_class)?;
        doc.add_class(self.backdrop, visible_class)
    }

    pub fn hide(&self, doc: &mut Document, ids: &FeedbackIds, visible_class: &str) -> Result<()> {
        doc.remove_class(self.modal, visible_class)?;
        doc.remove_class(self.backdrop, visible_class)?;
        self.clear_style(doc, ids)
    }

    fn clear_style(&self, doc: &mut Document, ids: &FeedbackIds) -> Result<()> {
        for level in Level::PRIORITY {
            doc.remove_class(self.header, &level.style(ids).header_class)?;
        }
        Ok(())
    }
}

/// Wire the close controls of the feedback dialog
pub fn install(page: &mut Page, fields: FeedbackFields, ids: &FeedbackIds, visible_class: &str) -> Installed {
    let mut installed = Installed::default();

    for button in [fields.close_button, fields.ok_button] {
        let ids = ids.clone();
        let class = visible_class.to_string();
        installed.push(page.listen(
            Listen::Node(button),
            EventKind::Click,
            move |doc, event| {
                event.prevent_default();
                fields.hide(doc, &ids, &class)
            },
        ));
    }

    let ids = ids.clone();
    let class = visible_class.to_string();
    installed.push(page.listen(
        Listen::Node(fields.backdrop),
        EventKind::Click,
        move |doc, event| {
            if event.target() == fields.backdrop {
                fields.hide(doc, &ids, &class)?;
            }
            Ok(())
        },
    ));

    installed
}

/// Show the pending message, if any. Returns what was shown.
pub fn present(
    doc: &mut Document,
    fields: &FeedbackFields,
    pending: PendingFeedback,
    ids: &FeedbackIds,
    visible_class: &str,
) -> Result<Option<FeedbackMessage>> {
    let message = pending.take(doc, ids)?;
    if let Some(message) = &message {
        tracing::debug!("showing {:?} feedback", message.level);
        fields.show(doc, message, ids, visible_class)?;
    }
    Ok(message)
}
