use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PageError, Result};

/// Identifiers of the CPF / matricula inputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MaskIds {
    pub form: String,
    pub cpf_input: String,
    pub digits_input: String,
}

impl Default for MaskIds {
    fn default() -> Self {
        Self {
            form: "colaborador-form".to_string(),
            cpf_input: "cpf".to_string(),
            digits_input: "matricula".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MenuIds {
    pub trigger: String,
    pub menu: String,
    pub open_class: String,
}

impl Default for MenuIds {
    fn default() -> Self {
        Self {
            trigger: "user-menu-trigger".to_string(),
            menu: "user-menu".to_string(),
            open_class: "show".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeleteModalIds {
    pub modal: String,
    pub backdrop: String,
    pub form: String,
    pub name_display: String,
    pub close_button: String,
    pub cancel_button: String,
    pub trigger_class: String,
    pub url_attr: String,
    pub name_attr: String,
}

impl Default for DeleteModalIds {
    fn default() -> Self {
        Self {
            modal: "delete-modal".to_string(),
            backdrop: "delete-modal-backdrop".to_string(),
            form: "delete-form".to_string(),
            name_display: "delete-item-name".to_string(),
            close_button: "delete-modal-close".to_string(),
            cancel_button: "delete-modal-cancel".to_string(),
            trigger_class: "delete-trigger".to_string(),
            url_attr: "data-url".to_string(),
            name_attr: "data-name".to_string(),
        }
    }
}

/// Label and header class shown for one message level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelStyle {
    pub attr: String,
    pub label: String,
    pub header_class: String,
}

impl LevelStyle {
    fn new(attr: &str, label: &str, header_class: &str) -> Self {
        Self {
            attr: attr.to_string(),
            label: label.to_string(),
            header_class: header_class.to_string(),
        }
    }

    fn overlay(self, partial: PartialLevelStyle) -> Self {
        Self {
            attr: partial.attr.unwrap_or(self.attr),
            label: partial.label.unwrap_or(self.label),
            header_class: partial.header_class.unwrap_or(self.header_class),
        }
    }
}

/// A `[feedback.<level>]` table as written; unset keys keep that level's defaults
#[derive(Debug, Default, Deserialize)]
struct PartialLevelStyle {
    attr: Option<String>,
    label: Option<String>,
    header_class: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawFeedbackIds")]
pub struct FeedbackIds {
    pub carrier: String,
    pub modal: String,
    pub backdrop: String,
    pub header: String,
    pub title: String,
    pub body: String,
    pub close_button: String,
    pub ok_button: String,
    pub success: LevelStyle,
    pub error: LevelStyle,
    pub warning: LevelStyle,
    pub info: LevelStyle,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawFeedbackIds {
    carrier: String,
    modal: String,
    backdrop: String,
    header: String,
    title: String,
    body: String,
    close_button: String,
    ok_button: String,
    success: PartialLevelStyle,
    error: PartialLevelStyle,
    warning: PartialLevelStyle,
    info: PartialLevelStyle,
}

impl Default for RawFeedbackIds {
    fn default() -> Self {
        let ids = FeedbackIds::default();
        Self {
            carrier: ids.carrier,
            modal: ids.modal,
            backdrop: ids.backdrop,
            header: ids.header,
            title: ids.title,
            body: ids.body,
            close_button: ids.close_button,
            ok_button: ids.ok_button,
            success: PartialLevelStyle::default(),
            error: PartialLevelStyle::default(),
            warning: PartialLevelStyle::default(),
            info: PartialLevelStyle::default(),
        }
    }
}

impl From<RawFeedbackIds> for FeedbackIds {
    fn from(raw: RawFeedbackIds) -> Self {
        let defaults = FeedbackIds::default();
        Self {
            carrier: raw.carrier,
            modal: raw.modal,
            backdrop: raw.backdrop,
            header: raw.header,
            title: raw.title,
            body: raw.body,
            close_button: raw.close_button,
            ok_button: raw.ok_button,
            success: defaults.success.overlay(raw.success),
            error: defaults.error.overlay(raw.error),
            warning: defaults.warning.overlay(raw.warning),
            info: defaults.info.overlay(raw.info),
        }
    }
}

impl Default for FeedbackIds {
    fn default() -> Self {
        Self {
            carrier: "feedback-data".to_string(),
            modal: "feedback-modal".to_string(),
            backdrop: "feedback-modal-backdrop".to_string(),
            header: "feedback-modal-header".to_string(),
            title: "feedback-modal-title".to_string(),
            body: "feedback-modal-body".to_string(),
            close_button: "feedback-modal-close".to_string(),
            ok_button: "feedback-modal-ok".to_string(),
            success: LevelStyle::new("data-success", "Sucesso!", "modal-header-success"),
            error: LevelStyle::new("data-error", "Erro!", "modal-header-error"),
            warning: LevelStyle::new("data-warning", "Atenção", "modal-header-warning"),
            info: LevelStyle::new("data-info", "Informação", "modal-header-info"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormsetIds {
    pub container: String,
    pub add_button: String,
    pub template: String,
    pub total_forms: String,
    pub max_forms: String,
    pub placeholder: String,
}

impl Default for FormsetIds {
    fn default() -> Self {
        Self {
            container: "itens-container".to_string(),
            add_button: "add-item-btn".to_string(),
            template: "empty-form-template".to_string(),
            total_forms: "id_itens-TOTAL_FORMS".to_string(),
            max_forms: "id_itens-MAX_NUM_FORMS".to_string(),
            placeholder: "__prefix__".to_string(),
        }
    }
}

/// Everything the page behaviors look up in the rendered document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageConfig {
    /// Class that makes a modal or backdrop visible
    pub visible_class: String,

    /// Attribute naming an icon placeholder
    pub icon_attr: String,

    pub mask: MaskIds,
    pub menu: MenuIds,
    pub delete_modal: DeleteModalIds,
    pub feedback: FeedbackIds,
    pub formset: FormsetIds,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            visible_class: "show".to_string(),
            icon_attr: "data-lucide".to_string(),
            mask: MaskIds::default(),
            menu: MenuIds::default(),
            delete_modal: DeleteModalIds::default(),
            feedback: FeedbackIds::default(),
            formset: FormsetIds::default(),
        }
    }
}

impl PageConfig {
    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(PageError::NoConfigDir)?
            .join("loanui");
        Ok(config_dir.join("page.toml"))
    }

    /// Load config from `path` (or the default location), falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path() {
                Ok(p) => p,
                Err(_) => return Self::default(),
            },
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::from_toml(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Failed to read config {}: {}", path.display(), e),
            }
        }

        Self::default()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save config to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let mut config = PageConfig::default();
        config.formset.total_forms = "id_form-TOTAL_FORMS".to_string();
        config.feedback.success.label = "Saved".to_string();

        let serialized = config.to_toml().unwrap();
        let deserialized = PageConfig::from_toml(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = PageConfig::from_toml("[menu]\nopen_class = \"open\"\n").unwrap();
        assert_eq!(config.menu.open_class, "open");
        assert_eq!(config.menu.trigger, "user-menu-trigger");
        assert_eq!(config.formset, FormsetIds::default());
    }

    #[test]
    fn test_partial_level_style_keeps_level_defaults() {
        let content = "[feedback.success]\nlabel = \"Saved\"\n\n[feedback.info]\nheader_class = \"note\"\n";
        let config = PageConfig::from_toml(content).unwrap();
        let defaults = FeedbackIds::default();

        assert_eq!(config.feedback.success.label, "Saved");
        assert_eq!(config.feedback.success.attr, "data-success");
        assert_eq!(config.feedback.success.header_class, "modal-header-success");
        assert_eq!(config.feedback.info.header_class, "note");
        assert_eq!(config.feedback.info.label, defaults.info.label);
        assert_eq!(config.feedback.error, defaults.error);
        assert_eq!(config.feedback.carrier, "feedback-data");

        let path = std::env::temp_dir().join(format!("loanui-level-{}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        assert_eq!(PageConfig::load(Some(path.as_path())), config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_falls_back_on_bad_file() {
        let path = std::env::temp_dir().join(format!("loanui-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "visible_class = [").unwrap();
        assert_eq!(PageConfig::load(Some(path.as_path())), PageConfig::default());

        PageConfig::default().save(&path).unwrap();
        assert_eq!(PageConfig::load(Some(path.as_path())), PageConfig::default());
        let _ = std::fs::remove_file(&path);
    }
}
