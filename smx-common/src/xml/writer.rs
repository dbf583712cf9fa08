//! Legacy XML writer for `.sprj`, `.session`, `.person` and `.meta` files

use super::*;
use crate::contribution::Contribution;
use crate::field::{Field, FieldClass, FieldSet, FieldType};
use crate::{Error, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Serialize a record's fields and contributions in the legacy dialect
///
/// **Algorithm:**
/// 1. Drop non-persistent fields, classify the rest as simple/additional/custom
/// 2. Simple fields as direct children of the root
/// 3. `<contributions>` (always present)
/// 4. `<AdditionalFields>` with non-empty, non-"unspecified" values
/// 5. `<CustomFields>`, keeping empty values only if `emit_empty_custom_fields`
///
/// `emit_type_attribute` adds `type="..."` to simple fields; the Project
/// dialect has no such attribute, Session and Person do. Grouped fields always
/// carry it.
pub fn to_legacy_xml(
    root_tag: &str,
    properties: &FieldSet,
    contributions: &[Contribution],
    emit_type_attribute: bool,
    emit_empty_custom_fields: bool,
) -> Result<String> {
    let mut simple = Vec::new();
    let mut additional = Vec::new();
    let mut custom = Vec::new();

    for field in properties.values().filter(|f| f.persist()) {
        if field.field_type == FieldType::Contributions {
            // persisted through <contributions>
            continue;
        }
        match field.class() {
            FieldClass::Simple => simple.push(field),
            FieldClass::Additional => additional.push(field),
            FieldClass::Custom => custom.push(field),
        }
    }

    let mut xml = LegacyXmlWriter::new();
    xml.open_document(root_tag)?;
    for field in simple {
        // simple fields are written even when empty
        xml.field(field, emit_type_attribute, true)?;
    }
    xml.contributions(contributions)?;
    xml.group(ADDITIONAL_FIELDS_TAG, &additional, false)?;
    xml.group(CUSTOM_FIELDS_TAG, &custom, emit_empty_custom_fields)?;
    xml.close(root_tag, true)?;
    xml.finish()
}

/// Document with nothing but an empty root element
pub fn empty_document(root_tag: &str) -> Result<String> {
    let mut xml = LegacyXmlWriter::new();
    xml.open_document(root_tag)?;
    xml.close(root_tag, false)?;
    xml.finish()
}

struct LegacyXmlWriter {
    writer: Writer<Vec<u8>>,
}

impl LegacyXmlWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn open_document(&mut self, root_tag: &str) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.open(root_tag)
    }

    fn open(&mut self, tag: &str) -> Result<()> {
        check_tag(tag)?;
        self.writer.write_event(Event::Start(BytesStart::new(tag)))?;
        Ok(())
    }

    /// Close `tag`. A childless element gets an empty text node first so it
    /// comes out as `<tag></tag>` on one line instead of self-closing.
    fn close(&mut self, tag: &str, has_children: bool) -> Result<()> {
        if !has_children {
            self.writer
                .write_event(Event::Text(BytesText::from_escaped("")))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// Leaf element with already-escaped text
    fn element(&mut self, tag: &str, type_attr: Option<&str>, escaped_text: &str) -> Result<()> {
        check_tag(tag)?;
        let mut start = BytesStart::new(tag);
        if let Some(type_attr) = type_attr {
            start.push_attribute(("type", type_attr));
        }
        self.writer.write_event(Event::Start(start))?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(escaped_text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// Write one field; returns whether anything was written
    fn field(&mut self, field: &Field, emit_type_attribute: bool, emit_empty: bool) -> Result<bool> {
        let tag = field.tag();
        if tag == "id" {
            tracing::debug!(key = %field.key, "Strange that we're outputting id");
        }

        let (type_tag, value) = field.type_and_value_escaped_for_xml();
        if field.field_type == FieldType::Date {
            // never typed; an empty date is left out whatever the empty policy
            if value.trim().is_empty() {
                return Ok(false);
            }
            self.element(tag, None, &value)?;
            return Ok(true);
        }

        if let Some(violation) = field.integrity_violation() {
            tracing::warn!(key = %field.key, "{}", violation);
        }

        let value = value.trim();
        if !emit_empty && value.is_empty() {
            return Ok(false);
        }
        let type_attr = if emit_type_attribute { Some(type_tag) } else { None };
        self.element(tag, type_attr, value)?;
        Ok(true)
    }

    fn contributions(&mut self, contributions: &[Contribution]) -> Result<()> {
        self.open(CONTRIBUTIONS_TAG)?;
        let mut wrote_any = false;

        for contribution in contributions {
            if !contribution.is_complete() {
                tracing::debug!(
                    role = ?contribution.role,
                    "Skipping contribution without a person"
                );
                continue;
            }

            self.open(CONTRIBUTOR_TAG)?;
            self.element("name", None, &partial_escape(&contribution.person_reference))?;

            match contribution.role() {
                Some(role) => self.element("role", None, &partial_escape(role))?,
                None => {
                    self.element("role", None, FALLBACK_ROLE)?;
                    self.element(SMX_ROLE_TAG, None, UNSPECIFIED)?;
                }
            }

            let date = contribution.date().unwrap_or(FALLBACK_DATE);
            self.element("date", None, &partial_escape(date))?;

            if let Some(comments) = contribution.comments() {
                self.element("comments", None, &partial_escape(comments))?;
            }
            self.close(CONTRIBUTOR_TAG, true)?;
            wrote_any = true;
        }

        self.close(CONTRIBUTIONS_TAG, wrote_any)
    }

    /// Wrapper element around `fields`, omitted entirely when none qualify
    fn group(&mut self, group_tag: &str, fields: &[&Field], emit_empty: bool) -> Result<()> {
        let qualifying: Vec<&Field> = fields
            .iter()
            .copied()
            .filter(|f| {
                let value = f.value.trim();
                if f.field_type == FieldType::Date && value.is_empty() {
                    return false;
                }
                emit_empty || (!value.is_empty() && value != UNSPECIFIED)
            })
            .collect();

        if qualifying.is_empty() {
            return Ok(());
        }

        self.open(group_tag)?;
        for field in qualifying {
            self.field(field, true, emit_empty)?;
        }
        self.close(group_tag, true)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::MalformedInput(format!("non UTF-8 output: {}", e)))
    }
}

fn check_tag(tag: &str) -> Result<()> {
    if is_valid_tag(tag) {
        Ok(())
    } else {
        Err(Error::MalformedInput(format!(
            "'{}' cannot be used as an element name",
            tag
        )))
    }
}
