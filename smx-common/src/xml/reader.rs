//! Legacy XML reader, the inverse of [`super::writer`]
//!
//! Reads a metadata document back into an existing FieldSet (usually one
//! already holding the folder's known fields) and a contributions list.

use super::*;
use crate::contribution::Contribution;
use crate::field::{find_definition, Field, FieldClass, FieldDefinition, FieldSet, FieldType};
use crate::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::sync::Arc;

/// Minimal element tree; the documents are small
#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.as_str())
    }
}

/// Merge a legacy document into `properties` and `contributions`
///
/// `typed` tells whether the dialect writes `type` attributes on simple
/// fields; in a typed document a simple element without one was written as a
/// date. Grouped fields are always typed.
pub fn read_legacy_xml(
    xml: &str,
    definitions: &[Arc<FieldDefinition>],
    typed: bool,
    properties: &mut FieldSet,
    contributions: &mut Vec<Contribution>,
) -> Result<()> {
    let Some(root) = parse_tree(xml)? else {
        return Ok(());
    };

    for child in &root.children {
        match child.name.as_str() {
            CONTRIBUTIONS_TAG => {
                contributions.extend(
                    child
                        .children
                        .iter()
                        .filter(|c| c.name == CONTRIBUTOR_TAG)
                        .map(read_contributor),
                );
            }
            ADDITIONAL_FIELDS_TAG => {
                for node in &child.children {
                    let field = read_field(node, definitions, FieldClass::Additional, true);
                    properties.set(&field.key.clone(), field)?;
                }
            }
            CUSTOM_FIELDS_TAG => {
                for node in &child.children {
                    let field = read_field(node, definitions, FieldClass::Custom, true);
                    properties.set(&field.key.clone(), field)?;
                }
            }
            _ => {
                let field = read_field(child, definitions, FieldClass::Simple, typed);
                properties.set(&field.key.clone(), field)?;
            }
        }
    }
    Ok(())
}

fn read_field(
    node: &Node,
    definitions: &[Arc<FieldDefinition>],
    class: FieldClass,
    typed: bool,
) -> Field {
    if let Some(definition) = find_definition(definitions, &node.name) {
        return Field::from_definition(definition).with_value(node.text.clone());
    }

    let field_type = match node.attribute("type") {
        Some(type_attr) => FieldType::from_xml_type(type_attr),
        None if typed || node.name.contains("date") => FieldType::Date,
        None => FieldType::Text,
    };

    let definition = match class {
        FieldClass::Simple => None,
        FieldClass::Additional => Some(FieldDefinition::additional(&node.name, field_type)),
        FieldClass::Custom => Some(FieldDefinition {
            field_type,
            ..FieldDefinition::custom(&node.name)
        }),
    };

    Field {
        key: node.name.clone(),
        value: node.text.clone(),
        field_type,
        definition: definition.map(Arc::new),
    }
}

fn read_contributor(node: &Node) -> Contribution {
    let unspecified_role = node.child_text(SMX_ROLE_TAG) == Some(UNSPECIFIED);
    let role = node
        .child_text("role")
        .filter(|r| !r.is_empty() && !unspecified_role);
    let date = node
        .child_text("date")
        .filter(|d| !d.is_empty() && *d != FALLBACK_DATE);
    let comments = node.child_text("comments").filter(|c| !c.trim().is_empty());

    Contribution {
        person_reference: node.child_text("name").unwrap_or_default().to_string(),
        role: role.map(str::to_string),
        date: date.map(str::to_string),
        comments: comments.map(str::to_string),
    }
}

fn parse_tree(xml: &str) -> Result<Option<Node>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(node_from_start(&e)?),
            // written by other tools; reads as an empty value
            Event::Empty(e) => {
                let node = node_from_start(&e)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(root)
}

fn node_from_start(start: &BytesStart) -> Result<Node> {
    let mut node = Node {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Node::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        node.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            attribute.unescape_value()?.into_owned(),
        ));
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(xml: &str, typed: bool) -> (FieldSet, Vec<Contribution>) {
        let mut properties = FieldSet::new();
        let mut contributions = Vec::new();
        read_legacy_xml(xml, &[], typed, &mut properties, &mut contributions).unwrap();
        (properties, contributions)
    }

    #[test]
    fn test_empty_input_reads_nothing() {
        let (props, contributions) = read("", true);
        assert!(props.is_empty());
        assert!(contributions.is_empty());
    }

    #[test]
    fn test_simple_fields_and_types() {
        let (props, _) = read(
            r#"<Session><title type="text">Hi &amp; bye</title><date>2020-01-02</date><notes type="text"/></Session>"#,
            true,
        );
        assert_eq!(props.text("title"), Some("Hi & bye"));
        assert_eq!(props.get("date").unwrap().field_type, FieldType::Date);
        assert_eq!(props.text("notes"), Some(""));
        assert_eq!(props.get("title").unwrap().class(), FieldClass::Simple);
    }

    #[test]
    fn test_untyped_dialect_defaults_to_text() {
        let (props, _) = read(
            "<Project><Title>P</Title><DateAvailable>2000-01-01</DateAvailable></Project>",
            false,
        );
        assert_eq!(props.get("Title").unwrap().field_type, FieldType::Text);
        // "DateAvailable" has no lowercase "date"
        assert_eq!(props.get("DateAvailable").unwrap().field_type, FieldType::Text);
    }

    #[test]
    fn test_known_definition_by_legacy_tag() {
        let defs = vec![Arc::new(FieldDefinition {
            legacy_tag: Some("Title".to_string()),
            ..FieldDefinition::new("title", FieldType::Text)
        })];
        let mut props = FieldSet::new();
        let mut contributions = Vec::new();
        read_legacy_xml(
            "<Project><Title>P</Title></Project>",
            &defs,
            false,
            &mut props,
            &mut contributions,
        )
        .unwrap();
        assert_eq!(props.text("title"), Some("P"));
        assert!(props.get("Title").is_none());
    }

    #[test]
    fn test_groups_get_classified() {
        let (props, _) = read(
            r#"<Person>
  <contributions></contributions>
  <AdditionalFields>
    <ethnicGroup type="text">X</ethnicGroup>
  </AdditionalFields>
  <CustomFields>
    <favoriteFood type="text">rice</favoriteFood>
  </CustomFields>
</Person>"#,
            true,
        );
        assert_eq!(props.get("ethnicGroup").unwrap().class(), FieldClass::Additional);
        assert_eq!(props.get("favoriteFood").unwrap().class(), FieldClass::Custom);
        assert_eq!(props.text("favoriteFood"), Some("rice"));
    }

    #[test]
    fn test_contributor_fallbacks_read_back_as_absent() {
        let (_, contributions) = read(
            r#"<Session><contributions>
  <contributor><name>Jane Doe</name><role>participant</role><smxrole>unspecified</smxrole><date>0001-01-01</date></contributor>
  <contributor><name>Joe</name><role>speaker</role><date>2010-05-06</date><comments>loud</comments></contributor>
</contributions></Session>"#,
            true,
        );
        assert_eq!(contributions.len(), 2);
        assert_eq!(contributions[0], Contribution::new("Jane Doe"));
        assert_eq!(
            contributions[1],
            Contribution::new("Joe")
                .with_role("speaker")
                .with_date("2010-05-06")
                .with_comments("loud")
        );
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let mut props = FieldSet::new();
        let mut contributions = Vec::new();
        let result = read_legacy_xml(
            "<Session><title>x</Session>",
            &[],
            true,
            &mut props,
            &mut contributions,
        );
        assert!(result.is_err());
    }
}
