//! Progressive masking for numeric identifier fields.

use serde::{Deserialize, Serialize};

use crate::config::MaskIds;
use crate::dom::{Document, NodeId};
use crate::page::{EventKind, Installed, Listen, Page};

/// A CPF has 11 digits; extra input is dropped
pub const MAX_DIGITS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskStyle {
    /// `123.456.789-01`, punctuated as digits arrive
    Cpf,
    /// Same clamp, no punctuation
    DigitsOnly,
}

impl MaskStyle {
    pub fn apply(self, raw: &str) -> String {
        match self {
            MaskStyle::Cpf => format_cpf(raw),
            MaskStyle::DigitsOnly => extract_digits(raw),
        }
    }
}

/// Keep ASCII digits only, at most [`MAX_DIGITS`] of them
pub fn extract_digits(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect()
}

/// Format the digits of `raw` as a (partial) CPF.
///
/// Exactly ten digits are left unpunctuated: the full pattern needs all
/// eleven, and the shorter patterns only cover up to nine.
pub fn format_cpf(raw: &str) -> String {
    let digits = extract_digits(raw);
    // Digits are ASCII so byte slicing is safe
    match digits.len() {
        11 => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        ),
        10 => digits,
        7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
        _ => digits,
    }
}

/// A masked input and the form that must be on the page with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskFields {
    pub form: NodeId,
    pub input: NodeId,
}

impl MaskFields {
    pub fn locate(doc: &Document, ids: &MaskIds, input_id: &str) -> Option<Self> {
        Some(Self {
            form: doc.element_by_id(&ids.form)?,
            input: doc.element_by_id(input_id)?,
        })
    }
}

/// Rewrite the field's value through `style` on every input event
pub fn install(page: &mut Page, fields: MaskFields, style: MaskStyle) -> Installed {
    let mut installed = Installed::default();
    installed.push(page.listen(
        Listen::Node(fields.input),
        EventKind::Input,
        move |doc, event| {
            let target = event.target();
            let masked = style.apply(doc.value(target));
            doc.set_value(target, &masked)
        },
    ));
    installed
}
