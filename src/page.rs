//! Event plumbing for a loaded page.
//!
//! A [`Page`] owns the [`Document`] and every listener registered against it.
//! Dispatch mirrors the browser's bubbling order: the target node, each of its
//! ancestors, then the window. Handlers run to completion one at a time.

use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    Input,
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listen {
    Node(NodeId),
    Window,
}

#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    target: NodeId,
    current: Listen,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl Event {
    fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current: Listen::Node(target),
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The node the event was dispatched at
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The stage currently handling the event
    pub fn current(&self) -> Listen {
        self.current
    }

    /// Keep the event from reaching ancestors and the window. Other listeners
    /// on the current stage still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

type Handler = Box<dyn FnMut(&mut Document, &mut Event) -> Result<()>>;

struct Listener {
    id: ListenerId,
    on: Listen,
    kind: EventKind,
    handler: Handler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listeners registered by one behavior. Hand it back to [`Page::dispose`]
/// to unregister them all.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[must_use]
pub struct Installed {
    listeners: Vec<ListenerId>,
}

impl Installed {
    pub fn push(&mut self, id: ListenerId) {
        self.listeners.push(id);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// What the browser would do once dispatch finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DefaultAction {
    None,
    Navigate { href: String },
    Submit { action: String, method: String },
}

pub struct Page {
    doc: Document,
    listeners: Vec<Listener>,
    next_listener: u64,
}

impl Page {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listen<F>(&mut self, on: Listen, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&mut Document, &mut Event) -> Result<()> + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            on,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Unregister every listener a behavior installed
    pub fn dispose(&mut self, installed: Installed) {
        self.listeners
            .retain(|l| !installed.listeners.contains(&l.id));
    }

    /// Run listeners for `kind` at `target` in bubbling order and report the
    /// default action that survives.
    pub fn dispatch(&mut self, kind: EventKind, target: NodeId) -> DefaultAction {
        let mut path: Vec<Listen> = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(Listen::Node(node));
            cursor = self.doc.parent(node);
        }
        // Detached targets never reach the window
        if self.doc.is_connected(target) {
            path.push(Listen::Window);
        }

        let mut event = Event::new(kind, target);
        for stage in path {
            event.current = stage;
            for listener in self
                .listeners
                .iter_mut()
                .filter(|l| l.on == stage && l.kind == kind)
            {
                if let Err(e) = (listener.handler)(&mut self.doc, &mut event) {
                    tracing::warn!("{:?} listener on {:?} failed: {}", kind, stage, e);
                }
            }
            if event.propagation_stopped {
                break;
            }
        }

        if event.default_prevented || kind != EventKind::Click {
            return DefaultAction::None;
        }
        self.click_default(target)
    }

    fn click_default(&self, target: NodeId) -> DefaultAction {
        let doc = &self.doc;
        if let Some(link) = doc.closest_tag(target, "a") {
            if let Some(href) = doc.attr(link, "href") {
                return DefaultAction::Navigate {
                    href: href.to_string(),
                };
            }
        }

        let is_submit = match doc.tag(target) {
            Some("button") => doc.attr(target, "type").unwrap_or("submit") == "submit",
            Some("input") => doc.attr(target, "type") == Some("submit"),
            _ => false,
        };
        if is_submit {
            if let Some(form) = doc.closest_tag(target, "form") {
                return DefaultAction::Submit {
                    action: doc.attr(form, "action").unwrap_or_default().to_string(),
                    method: doc
                        .attr(form, "method")
                        .unwrap_or("get")
                        .to_ascii_lowercase(),
                };
            }
        }
        DefaultAction::None
    }

    pub fn click(&mut self, target: NodeId) -> DefaultAction {
        self.dispatch(EventKind::Click, target)
    }

    /// Replace a field's raw value the way typing or pasting would, then fire `input`
    pub fn input(&mut self, target: NodeId, raw: &str) -> Result<()> {
        self.doc.set_value(target, raw)?;
        self.dispatch(EventKind::Input, target);
        Ok(())
    }
}
