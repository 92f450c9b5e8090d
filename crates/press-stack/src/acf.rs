//! ACF field-group metadata.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::naming::{title_case, to_snake_case};
use crate::types::{FieldKind, FormFieldType, ParsedField, TemplateKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRule {
    pub param: String,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub key: String,
    pub title: String,
    pub fields: Vec<AcfField>,
    pub location: Vec<Vec<LocationRule>>,
    pub menu_order: i32,
    pub position: String,
    pub style: String,
    pub label_placement: String,
    pub instruction_placement: String,
    pub hide_on_screen: String,
    pub active: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldWrapper {
    pub width: String,
    pub class: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcfField {
    pub key: String,
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub instructions: String,
    pub required: u8,
    pub conditional_logic: u8,
    pub wrapper: FieldWrapper,
    pub default_value: String,
    pub placeholder: String,
    pub prepend: String,
    pub append: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_fields: Option<Vec<AcfField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<u8>,
}

fn acf_type(field: &ParsedField) -> &'static str {
    match field.kind {
        FieldKind::Text => "text",
        FieldKind::Textarea => "textarea",
        FieldKind::Image => "image",
        FieldKind::Link => "link",
        FieldKind::Repeater => "repeater",
        FieldKind::Container => "group",
        FieldKind::FormField => match field.field_type {
            Some(FormFieldType::Text) => "textarea",
            Some(FormFieldType::Email) => "email",
            Some(FormFieldType::Boolean) => "true_false",
            Some(FormFieldType::Enum) => "select",
            Some(FormFieldType::Number) => "number",
            Some(FormFieldType::String) | None => "text",
        },
    }
}

impl AcfField {
    /// `parent_key` is the key of the enclosing repeater, or `field` at the
    /// top level; `issued` holds every key already handed out in the group.
    fn from_field(field: &ParsedField, parent_key: &str, issued: &mut HashSet<String>) -> Self {
        let key = unique_key(format!("{parent_key}_{}", field.slug), issued);
        let field_type = acf_type(field);
        let mut acf = AcfField {
            key,
            label: title_case(&field.slug),
            name: field.slug.clone(),
            field_type: field_type.to_string(),
            instructions: format!("Generated field for {} tag", field.tag),
            required: 0,
            conditional_logic: 0,
            wrapper: FieldWrapper::default(),
            default_value: String::new(),
            placeholder: String::new(),
            prepend: String::new(),
            append: String::new(),
            return_format: None,
            preview_size: None,
            library: None,
            sub_fields: None,
            collapsed: None,
            min: None,
            max: None,
            layout: None,
            button_label: None,
            choices: None,
            ui: None,
        };

        match field_type {
            "image" => {
                acf.return_format = Some("array".into());
                acf.preview_size = Some("medium".into());
                acf.library = Some("all".into());
            }
            "link" => acf.return_format = Some("array".into()),
            "repeater" => {
                let subs = flatten_fields(&field.children, &acf.key, issued);
                acf.sub_fields = Some(subs);
                acf.collapsed = Some(String::new());
                acf.min = Some(0);
                acf.max = Some(0);
                acf.layout = Some("block".into());
                acf.button_label = Some("Add Row".into());
            }
            "select" => {
                acf.choices = Some(Value::Object(Default::default()));
                acf.return_format = Some("value".into());
            }
            "true_false" => acf.ui = Some(1),
            _ => {}
        }
        acf
    }
}

/// Keys must be unique across the whole group, not just per scope.
fn unique_key(base: String, issued: &mut HashSet<String>) -> String {
    if issued.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if issued.insert(candidate.clone()) {
            warn!("ACF key collision on '{}' resolved as '{}'", base, candidate);
            return candidate;
        }
        n += 1;
    }
}

/// Containers are transparent: their children land in the enclosing list.
fn flatten_fields(fields: &[ParsedField], parent_key: &str, issued: &mut HashSet<String>) -> Vec<AcfField> {
    let mut out = Vec::new();
    for field in fields {
        if field.kind == FieldKind::Container {
            out.extend(flatten_fields(&field.children, parent_key, issued));
        } else {
            out.push(AcfField::from_field(field, parent_key, issued));
        }
    }
    out
}

/// Build the field group for a template.
pub fn generate_field_group(
    fields: &[ParsedField],
    template_name: &str,
    template_slug: &str,
    kind: TemplateKind,
) -> FieldGroup {
    FieldGroup {
        key: format!("group_{}", to_snake_case(template_name)),
        title: format!("{template_name} Fields"),
        fields: flatten_fields(fields, "field", &mut HashSet::new()),
        location: vec![vec![LocationRule {
            param: "page_template".into(),
            operator: "==".into(),
            value: kind.template_file(template_slug),
        }]],
        menu_order: 0,
        position: "normal".into(),
        style: "default".into(),
        label_placement: "top".into(),
        instruction_placement: "label".into(),
        hide_on_screen: String::new(),
        active: true,
        description: format!("Auto-generated ACF fields for {template_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind, tag: &str, slug: &str) -> ParsedField {
        ParsedField::new(kind, tag, "", slug.to_string())
    }

    #[test]
    fn test_group_settings() {
        let group = generate_field_group(&[], "Home Page", "home", TemplateKind::DocumentWithIdentity);
        assert_eq!(group.key, "group_home_page");
        assert_eq!(group.title, "Home Page Fields");
        assert_eq!(group.location[0][0].value, "page-home.php");
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["location"][0][0]["param"], "page_template");
        assert_eq!(json["active"], true);
    }

    #[test]
    fn test_containers_are_flattened_and_repeaters_nest() {
        let fields = vec![field(FieldKind::Container, "section", "hero").with_children(vec![
            field(FieldKind::Text, "h1", "hero_title"),
            field(FieldKind::Image, "img", "hero_image"),
            field(FieldKind::Repeater, "div", "card")
                .with_children(vec![field(FieldKind::Text, "h3", "card_title")]),
        ])];
        let group = generate_field_group(&fields, "Landing", "landing", TemplateKind::Fragment);
        let names: Vec<_> = group.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["hero_title", "hero_image", "card"]);
        assert_eq!(group.location[0][0].value, "template-parts/sections/landing.php");

        let title = &group.fields[0];
        assert_eq!(title.key, "field_hero_title");
        assert_eq!(title.label, "Hero Title");
        assert_eq!(title.instructions, "Generated field for h1 tag");

        let image = serde_json::to_value(&group.fields[1]).unwrap();
        assert_eq!(image["return_format"], "array");
        assert_eq!(image["preview_size"], "medium");
        assert!(image.get("sub_fields").is_none());

        let card = &group.fields[2];
        assert_eq!(card.layout.as_deref(), Some("block"));
        let subs = card.sub_fields.as_ref().unwrap();
        assert_eq!(subs[0].key, "field_card_card_title");
    }

    #[test]
    fn test_form_field_types() {
        let mut f = field(FieldKind::FormField, "input", "subscribe");
        f.field_type = Some(FormFieldType::Boolean);
        assert_eq!(acf_type(&f), "true_false");
        f.field_type = Some(FormFieldType::Text);
        assert_eq!(acf_type(&f), "textarea");
        f.field_type = Some(FormFieldType::Enum);
        let acf = AcfField::from_field(&f, "field", &mut HashSet::new());
        assert_eq!(acf.key, "field_subscribe");
        assert_eq!(acf.field_type, "select");
        assert!(acf.choices.is_some());
    }

    #[test]
    fn test_keys_unique_across_nested_repeaters() {
        let items = || {
            field(FieldKind::Repeater, "li", "items")
                .with_children(vec![field(FieldKind::Text, "li", "item")])
        };
        let fields = vec![
            items(),
            field(FieldKind::Repeater, "div", "card").with_children(vec![
                field(FieldKind::Text, "h3", "card_title"),
                field(FieldKind::Container, "ul", "container_ul").with_children(vec![items()]),
            ]),
        ];
        let group = generate_field_group(&fields, "Landing", "landing", TemplateKind::Fragment);
        let card = &group.fields[1];
        let nested = &card.sub_fields.as_ref().unwrap()[1];
        assert_eq!(group.fields[0].sub_fields.as_ref().unwrap()[0].key, "field_items_item");
        assert_eq!(nested.key, "field_card_items");
        assert_eq!(nested.sub_fields.as_ref().unwrap()[0].key, "field_card_items_item");
    }

    #[test]
    fn test_ambiguous_key_paths_are_suffixed() {
        let fields = vec![
            field(FieldKind::Repeater, "div", "a").with_children(vec![field(FieldKind::Text, "p", "b_c")]),
            field(FieldKind::Repeater, "div", "a_b").with_children(vec![field(FieldKind::Text, "p", "c")]),
        ];
        let group = generate_field_group(&fields, "X", "x", TemplateKind::Fragment);
        let first = &group.fields[0].sub_fields.as_ref().unwrap()[0];
        let second = &group.fields[1].sub_fields.as_ref().unwrap()[0];
        assert_eq!(first.key, "field_a_b_c");
        assert_eq!(second.key, "field_a_b_c_2");
    }
}
