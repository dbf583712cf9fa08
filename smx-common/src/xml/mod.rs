//! Legacy-compatible XML persistence
//!
//! The on-disk dialect is fixed by an older desktop application that still
//! reads these files. Its quirks are reproduced exactly:
//! - no self-closing elements, ever
//! - a `type` attribute on Session/Person simple fields but not on Project
//! - every contributor has a `<role>` and a `<date>`, with fallbacks
//! - `AdditionalFields`/`CustomFields` wrappers only when they have content

pub mod reader;
pub mod writer;

pub use reader::read_legacy_xml;
pub use writer::{empty_document, to_legacy_xml};

pub const CONTRIBUTIONS_TAG: &str = "contributions";
pub const CONTRIBUTOR_TAG: &str = "contributor";
pub const ADDITIONAL_FIELDS_TAG: &str = "AdditionalFields";
pub const CUSTOM_FIELDS_TAG: &str = "CustomFields";

/// Role written when none was chosen; the legacy reader rejects anything
/// outside its own role list.
pub const FALLBACK_ROLE: &str = "participant";
/// Marker element recording that the role was really left unspecified
pub const SMX_ROLE_TAG: &str = "smxrole";
pub const UNSPECIFIED: &str = "unspecified";
/// Date written when a contribution has none; the legacy reader crashes
/// without a date element.
pub const FALLBACK_DATE: &str = "0001-01-01";

/// Whether `tag` can be used as an element name
pub(crate) fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_validation() {
        assert!(is_valid_tag("title"));
        assert!(is_valid_tag("Title_2"));
        assert!(is_valid_tag("dc:title"));
        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag("2nd"));
        assert!(!is_valid_tag("my field"));
        assert!(!is_valid_tag("a<b"));
    }
}
