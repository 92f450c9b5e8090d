//! Compact per-component summary of the content model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{FieldKind, ParsedField};

/// Bucket for leaves that sit directly at the top level.
pub const GLOBAL_COMPONENT: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Component,
    Repeater,
}

/// A field entry: a scalar type name or a nested repeater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaField {
    Scalar(String),
    Nested(SchemaEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    pub fields: BTreeMap<String, SchemaField>,
}

pub type ComponentSchema = BTreeMap<String, SchemaEntry>;

fn scalar_type(field: &ParsedField) -> String {
    match field.kind {
        FieldKind::Text => "string".into(),
        FieldKind::Textarea => "text".into(),
        FieldKind::Image => "image".into(),
        FieldKind::Link => "url".into(),
        FieldKind::FormField => field
            .field_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "string".into()),
        FieldKind::Repeater | FieldKind::Container => "string".into(),
    }
}

fn collect(fields: &[ParsedField], into: &mut BTreeMap<String, SchemaField>) {
    for field in fields {
        match field.kind {
            FieldKind::Container => collect(&field.children, into),
            FieldKind::Repeater => {
                into.insert(field.slug.clone(), SchemaField::Nested(repeater_entry(field)));
            }
            _ => {
                into.insert(field.slug.clone(), SchemaField::Scalar(scalar_type(field)));
            }
        }
    }
}

fn repeater_entry(field: &ParsedField) -> SchemaEntry {
    let mut fields = BTreeMap::new();
    collect(&field.children, &mut fields);
    SchemaEntry {
        kind: SchemaKind::Repeater,
        fields,
    }
}

/// Top-level containers become components, top-level repeaters stay
/// repeaters, and loose leaves collect under [`GLOBAL_COMPONENT`].
pub fn generate_component_schema(fields: &[ParsedField]) -> ComponentSchema {
    let mut schema = ComponentSchema::new();
    for field in fields {
        match field.kind {
            FieldKind::Container => {
                let mut nested = BTreeMap::new();
                collect(&field.children, &mut nested);
                schema.insert(
                    field.slug.clone(),
                    SchemaEntry {
                        kind: SchemaKind::Component,
                        fields: nested,
                    },
                );
            }
            FieldKind::Repeater => {
                schema.insert(field.slug.clone(), repeater_entry(field));
            }
            _ => {
                schema
                    .entry(GLOBAL_COMPONENT.to_string())
                    .or_insert_with(|| SchemaEntry {
                        kind: SchemaKind::Component,
                        fields: BTreeMap::new(),
                    })
                    .fields
                    .insert(field.slug.clone(), SchemaField::Scalar(scalar_type(field)));
            }
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormFieldType;

    fn field(kind: FieldKind, slug: &str) -> ParsedField {
        ParsedField::new(kind, "div", "", slug.to_string())
    }

    #[test]
    fn test_component_schema_shape() {
        let mut email = field(FieldKind::FormField, "email");
        email.field_type = Some(FormFieldType::Email);
        let fields = vec![
            field(FieldKind::Text, "title"),
            field(FieldKind::Container, "hero").with_children(vec![
                field(FieldKind::Image, "hero_image"),
                field(FieldKind::Container, "inner").with_children(vec![field(FieldKind::Link, "hero_link")]),
                email,
            ]),
            field(FieldKind::Repeater, "cards").with_children(vec![field(FieldKind::Textarea, "card_description")]),
        ];
        let schema = generate_component_schema(&fields);
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(json["global"]["type"], "component");
        assert_eq!(json["global"]["fields"]["title"], "string");
        assert_eq!(json["hero"]["fields"]["hero_image"], "image");
        assert_eq!(json["hero"]["fields"]["hero_link"], "url");
        assert_eq!(json["hero"]["fields"]["email"], "email");
        assert_eq!(json["cards"]["type"], "repeater");
        assert_eq!(json["cards"]["fields"]["card_description"], "text");
    }

    #[test]
    fn test_nested_repeater_entry() {
        let fields = vec![field(FieldKind::Container, "menu").with_children(vec![
            field(FieldKind::Repeater, "items").with_children(vec![field(FieldKind::Link, "item_link")]),
        ])];
        let schema = generate_component_schema(&fields);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["menu"]["fields"]["items"]["type"], "repeater");
        assert_eq!(json["menu"]["fields"]["items"]["fields"]["item_link"], "url");
    }
}
