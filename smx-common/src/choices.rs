//! Choice lists and the localization interface
//!
//! Translation only ever affects what a UI displays. Persisted values are
//! always the canonical `Choice::id`.

use serde::{Deserialize, Serialize};

/// One entry of a closed choice list (genres, roles, access protocols...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// What a selection widget is handed for one choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Canonical value written to disk
    pub value: String,
    /// Translated label
    pub label: String,
    /// Tooltip
    pub title: String,
}

/// Translation table a string is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Field,
    Choice,
    Role,
    Genre,
    AccessProtocol,
    Tip,
}

/// UI language, passed explicitly to whatever needs it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new("en")
    }
}

/// Translation lookup supplied by the host application
pub trait Localizer {
    /// Translation of `english`, or `english` itself when there is none
    fn translate(&self, english: &str, category: Category, language: &Language) -> String;
}

/// Returns every string untranslated
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLocalizer;

impl Localizer for IdentityLocalizer {
    fn translate(&self, english: &str, _category: Category, _language: &Language) -> String {
        english.to_string()
    }
}

/// Build the options a role/choice picker shows
pub fn choice_options(
    choices: &[Choice],
    category: Category,
    localizer: &dyn Localizer,
    language: &Language,
) -> Vec<ChoiceOption> {
    choices
        .iter()
        .map(|c| ChoiceOption {
            value: c.id.clone(),
            label: localizer.translate(&c.label, category, language),
            title: c.description.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TableLocalizer(HashMap<(&'static str, &'static str), &'static str>);

    impl Localizer for TableLocalizer {
        fn translate(&self, english: &str, _category: Category, language: &Language) -> String {
            self.0
                .iter()
                .find(|((lang, en), _)| *lang == language.code() && *en == english)
                .map(|(_, t)| t.to_string())
                .unwrap_or_else(|| english.to_string())
        }
    }

    fn roles() -> Vec<Choice> {
        vec![
            Choice {
                id: "speaker".to_string(),
                label: "Speaker".to_string(),
                description: "Person who speaks".to_string(),
            },
            Choice {
                id: "recorder".to_string(),
                label: "Recorder".to_string(),
                description: String::new(),
            },
        ]
    }

    #[test]
    fn test_options_keep_canonical_value() {
        let localizer = TableLocalizer(HashMap::from([(("es", "Speaker"), "Hablante")]));
        let options = choice_options(&roles(), Category::Role, &localizer, &Language::new("es"));

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "speaker");
        assert_eq!(options[0].label, "Hablante");
        assert_eq!(options[0].title, "Person who speaks");
        // no translation available
        assert_eq!(options[1].label, "Recorder");
    }

    #[test]
    fn test_identity_localizer() {
        let options = choice_options(
            &roles(),
            Category::Role,
            &IdentityLocalizer,
            &Language::default(),
        );
        assert_eq!(options[0].label, "Speaker");
        assert_eq!(Language::default().code(), "en");
    }
}
