//! User dropdown menu: trigger toggles it, any click outside closes it.

use serde::Serialize;

use crate::config::MenuIds;
use crate::dom::{Document, NodeId};
use crate::page::{EventKind, Installed, Listen, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuFields {
    pub trigger: NodeId,
    pub menu: NodeId,
}

impl MenuFields {
    pub fn locate(doc: &Document, ids: &MenuIds) -> Option<Self> {
        Some(Self {
            trigger: doc.element_by_id(&ids.trigger)?,
            menu: doc.element_by_id(&ids.menu)?,
        })
    }

    pub fn state(&self, doc: &Document, open_class: &str) -> MenuState {
        if doc.has_class(self.menu, open_class) {
            MenuState::Open
        } else {
            MenuState::Closed
        }
    }
}

pub fn install(page: &mut Page, fields: MenuFields, open_class: &str) -> Installed {
    let mut installed = Installed::default();

    let class = open_class.to_string();
    installed.push(page.listen(
        Listen::Node(fields.trigger),
        EventKind::Click,
        move |doc, event| {
            // The window listener below would close the menu right away
            event.stop_propagation();
            let open = doc.toggle_class(fields.menu, &class)?;
            tracing::debug!("user menu {}", if open { "opened" } else { "closed" });
            Ok(())
        },
    ));

    let class = open_class.to_string();
    installed.push(page.listen(Listen::Window, EventKind::Click, move |doc, event| {
        if doc.has_class(fields.menu, &class) && !doc.contains(fields.menu, event.target()) {
            doc.remove_class(fields.menu, &class)?;
            tracing::debug!("user menu closed by outside click");
        }
        Ok(())
    }));

    installed
}
