//! Contributions: who took part in a record, in what role, and when

use crate::choices::ChoiceOption;
use chrono::NaiveDate;

/// One person's contribution to a session or project
///
/// Kept as an ordered list beside the FieldSet since several contributions
/// may share a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contribution {
    /// Name of the person as recorded in the person folder
    pub person_reference: String,
    pub role: Option<String>,
    pub date: Option<String>,
    pub comments: Option<String>,
}

impl Contribution {
    pub fn new(person_reference: impl Into<String>) -> Self {
        Self {
            person_reference: person_reference.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Incomplete contributions (no person) are never written
    pub fn is_complete(&self) -> bool {
        !self.person_reference.trim().is_empty()
    }

    /// Role, treating an empty string as "no role chosen"
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.is_empty())
    }

    /// Comments, if there is anything besides whitespace
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref().filter(|c| !c.trim().is_empty())
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// Apply a role picker selection; clearing the picker clears the role.
    pub fn set_role_from_option(&mut self, selected: Option<&ChoiceOption>) {
        self.role = selected
            .map(|o| o.value.clone())
            .filter(|v| !v.is_empty());
    }
}
