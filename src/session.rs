//! Replay a scripted sequence of user actions against a page.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::behaviors::feedback::{FeedbackFields, FeedbackMessage};
use crate::behaviors::icons::DataIcons;
use crate::behaviors::menu::{MenuFields, MenuState};
use crate::behaviors::{self, SetupReport};
use crate::config::PageConfig;
use crate::dom::Document;
use crate::error::Result;
use crate::fixture::resolve;
use crate::page::{DefaultAction, Installed, Page};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Replace a field's value and fire `input`
    Type {
        target: String,
        text: String,
        #[serde(default)]
        index: usize,
    },
    Click {
        target: String,
        #[serde(default)]
        index: usize,
    },
    /// Run the page-load wiring again
    Setup,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }
}

/// Observable state of the behaviors; `None` where the page lacks the fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub cpf: Option<String>,
    pub matricula: Option<String>,
    pub menu: Option<MenuState>,
    pub delete_modal_open: Option<bool>,
    pub delete_action: Option<String>,
    pub feedback_open: Option<bool>,
    pub formset_rows: Option<usize>,
    pub total_forms: Option<String>,
}

impl PageState {
    pub fn capture(doc: &Document, config: &PageConfig) -> Self {
        let value_of = |id: &str| doc.element_by_id(id).map(|n| doc.value(n).to_string());
        let visible = config.visible_class.as_str();
        let delete = &config.delete_modal;

        let delete_modal_open = match (
            doc.element_by_id(&delete.modal),
            doc.element_by_id(&delete.backdrop),
        ) {
            (Some(modal), Some(backdrop)) => {
                Some(doc.has_class(modal, visible) && doc.has_class(backdrop, visible))
            }
            _ => None,
        };

        Self {
            cpf: value_of(&config.mask.cpf_input),
            matricula: value_of(&config.mask.digits_input),
            menu: MenuFields::locate(doc, &config.menu)
                .map(|f| f.state(doc, &config.menu.open_class)),
            delete_modal_open,
            delete_action: doc
                .element_by_id(&delete.form)
                .and_then(|f| doc.attr(f, "action"))
                .map(String::from),
            feedback_open: FeedbackFields::locate(doc, &config.feedback)
                .map(|f| f.is_open(doc, visible)),
            formset_rows: doc
                .element_by_id(&config.formset.container)
                .map(|c| doc.children(c).len()),
            total_forms: value_of(&config.formset.total_forms),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    #[serde(flatten)]
    pub action: Step,
    pub default_action: DefaultAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackMessage>,
    pub state: PageState,
}

/// A loaded page with its behaviors wired, ready to take user actions
pub struct Session {
    page: Page,
    config: PageConfig,
    icons: DataIcons,
    /// Listeners of the latest setup run
    active: Vec<Installed>,
    steps_run: usize,
}

impl Session {
    /// Load the page and run setup once, as the browser does on load
    pub fn start(doc: Document, config: PageConfig) -> (Self, SetupReport) {
        let icons = DataIcons::new(&config.icon_attr);
        let mut session = Self {
            page: Page::new(doc),
            config,
            icons,
            active: Vec::new(),
            steps_run: 0,
        };
        let report = session.setup();
        (session, report)
    }

    /// Re-running setup replaces the previous run's listeners instead of
    /// stacking a second copy on every element.
    fn setup(&mut self) -> SetupReport {
        for installed in self.active.drain(..) {
            self.page.dispose(installed);
        }
        let report = behaviors::setup(&mut self.page, &self.config, Some(&mut self.icons));
        self.active = report.installed.iter().map(|(_, i)| i.clone()).collect();
        report
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn state(&self) -> PageState {
        PageState::capture(self.page.doc(), &self.config)
    }

    pub fn run(&mut self, step: &Step) -> Result<StepOutcome> {
        self.steps_run += 1;
        let mut feedback = None;

        let default_action = match step {
            Step::Type { target, text, index } => {
                let node = resolve(self.page.doc(), target, *index)?;
                self.page.input(node, text)?;
                DefaultAction::None
            }
            Step::Click { target, index } => {
                let node = resolve(self.page.doc(), target, *index)?;
                self.page.click(node)
            }
            Step::Setup => {
                let report = self.setup();
                feedback = report.feedback;
                DefaultAction::None
            }
        };
        tracing::debug!("step {} -> {:?}", self.steps_run, default_action);

        Ok(StepOutcome {
            step: self.steps_run,
            action: step.clone(),
            default_action,
            feedback,
            state: self.state(),
        })
    }

    pub fn run_script(&mut self, script: &Script) -> Result<Vec<StepOutcome>> {
        script.steps.iter().map(|step| self.run(step)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::PageSpec;

    const LOAN_PAGE: &str = r##"
[[elements]]
tag = "body"

[[elements.children]]
tag = "div"
id = "user-menu-trigger"
text = "admin"

[[elements.children]]
tag = "div"
id = "user-menu"

[[elements.children.children]]
tag = "a"
attrs = { href = "/logout/" }
text = "Sair"

[[elements.children]]
tag = "div"
id = "feedback-data"
attrs = { "data-success" = "Empréstimo #12 registrado com sucesso!", "data-error" = "" }

[[elements.children]]
tag = "div"
id = "feedback-modal-backdrop"

[[elements.children]]
tag = "div"
id = "feedback-modal"

[[elements.children.children]]
tag = "div"
id = "feedback-modal-header"

[[elements.children.children.children]]
tag = "h3"
id = "feedback-modal-title"

[[elements.children.children.children]]
tag = "button"
id = "feedback-modal-close"

[[elements.children.children]]
tag = "p"
id = "feedback-modal-body"

[[elements.children.children]]
tag = "button"
id = "feedback-modal-ok"

[[elements.children]]
tag = "form"
id = "loan-form"
attrs = { method = "post", action = "/emprestimos/novo/" }

[[elements.children.children]]
tag = "input"
id = "id_itens-TOTAL_FORMS"
attrs = { type = "hidden", value = "1" }

[[elements.children.children]]
tag = "div"
id = "itens-container"

[[elements.children.children]]
tag = "button"
id = "add-item-btn"
attrs = { type = "button" }

[[elements.children.children]]
tag = "template"
id = "empty-form-template"

[[elements.children.children.children]]
tag = "select"
attrs = { name = "itens-__prefix__-equipamento" }

[[elements.children.children]]
tag = "button"
attrs = { type = "submit" }
text = "Registrar"
"##;

    const SCRIPT: &str = r##"
[[steps]]
action = "click"
target = "#feedback-modal-ok"

[[steps]]
action = "setup"

[[steps]]
action = "click"
target = "#user-menu-trigger"

[[steps]]
action = "click"
target = "a"

[[steps]]
action = "click"
target = "#add-item-btn"

[[steps]]
action = "click"
target = "#add-item-btn"

[[steps]]
action = "click"
target = "button"
index = 3
"##;

    fn start() -> (Session, SetupReport) {
        let doc = PageSpec::from_toml(LOAN_PAGE).unwrap().build().unwrap();
        Session::start(doc, PageConfig::default())
    }

    #[test]
    fn test_load_shows_feedback_once() {
        let (session, report) = start();
        assert_eq!(
            report.feedback.map(|m| m.text),
            Some("Empréstimo #12 registrado com sucesso!".to_string())
        );
        let state = session.state();
        assert_eq!(state.feedback_open, Some(true));
        assert_eq!(state.cpf, None);
        assert_eq!(state.delete_modal_open, None);
    }

    #[test]
    fn test_script_replay() {
        let (mut session, _) = start();
        let listeners = session.page().listener_count();
        let script = Script::from_toml(SCRIPT).unwrap();
        let outcomes = session.run_script(&script).unwrap();
        assert_eq!(outcomes.len(), 7);

        // OK closes the dialog, a second setup finds no message
        assert_eq!(outcomes[0].state.feedback_open, Some(false));
        assert!(outcomes[1].feedback.is_none());
        assert_eq!(outcomes[1].state.feedback_open, Some(false));
        assert_eq!(session.page().listener_count(), listeners);

        assert_eq!(outcomes[2].state.menu, Some(MenuState::Open));
        assert_eq!(
            outcomes[3].default_action,
            DefaultAction::Navigate { href: "/logout/".into() }
        );
        assert_eq!(outcomes[3].state.menu, Some(MenuState::Open));

        assert_eq!(outcomes[5].state.formset_rows, Some(2));
        assert_eq!(outcomes[5].state.total_forms.as_deref(), Some("3"));
        assert_eq!(
            outcomes[6].default_action,
            DefaultAction::Submit {
                action: "/emprestimos/novo/".into(),
                method: "post".into()
            }
        );
    }

    #[test]
    fn test_unknown_target_is_reported() {
        let (mut session, _) = start();
        let step = Step::Click { target: "#cpf".into(), index: 0 };
        assert!(session.run(&step).is_err());
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let (mut session, _) = start();
        let outcome = session.run(&Step::Setup).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["action"], "setup");
        assert_eq!(json["default_action"]["kind"], "none");
        assert!(json.get("feedback").is_none());
    }
}
