//! Core data types for the content model and compile errors.

use serde::{Deserialize, Serialize};

/// Kind of a field in the extracted content model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Image,
    Link,
    Repeater,
    Container,
    FormField,
}

/// Optional classification attached to container fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Hero,
    CardCollection,
    Pricing,
    Testimonial,
    Form,
}

/// Value type of a form control, derived from its native `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFieldType {
    String,
    Text,
    Email,
    Boolean,
    Enum,
    Number,
}

impl FormFieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Email => "email",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Number => "number",
        }
    }
}

/// A node in the extracted content model.
///
/// For repeaters, `children` is the schema of one canonical instance,
/// not a merge of every instance found in the markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub tag: String,
    pub classes: String,
    pub original_content: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParsedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<ComponentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FormFieldType>,
}

impl ParsedField {
    /// Create a field with no children and an unassigned id.
    pub fn new(kind: FieldKind, tag: &str, classes: &str, slug: String) -> Self {
        Self {
            id: String::new(),
            kind,
            tag: tag.to_string(),
            classes: classes.to_string(),
            original_content: String::new(),
            slug,
            children: Vec::new(),
            component_type: None,
            field_type: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.original_content = content.into();
        self
    }

    pub fn with_children(mut self, children: Vec<ParsedField>) -> Self {
        self.children = children;
        self
    }
}

/// Depth-first search for the first field with the given slug.
pub fn find_field<'a>(fields: &'a [ParsedField], slug: &str) -> Option<&'a ParsedField> {
    for field in fields {
        if field.slug == slug {
            return Some(field);
        }
        if let Some(found) = find_field(&field.children, slug) {
            return Some(found);
        }
    }
    None
}

/// Visit every field in the forest, parents before children.
pub fn walk_fields<'a>(fields: &'a [ParsedField], visit: &mut impl FnMut(&'a ParsedField)) {
    for field in fields {
        visit(field);
        walk_fields(&field.children, visit);
    }
}

/// How the generated template is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Reusable section: reconstructed content only.
    Fragment,
    /// Page template announced through a `Template Name:` header.
    DocumentWithIdentity,
    /// Page template picked up by file naming (`page-<slug>.php`).
    DocumentByConvention,
}

impl TemplateKind {
    pub fn is_document(self) -> bool {
        !matches!(self, Self::Fragment)
    }

    /// Theme-relative path of the template file for a slug.
    pub fn template_file(self, slug: &str) -> String {
        let slug = file_slug(slug);
        match self {
            Self::Fragment => format!("template-parts/sections/{slug}.php"),
            Self::DocumentWithIdentity | Self::DocumentByConvention => format!("page-{slug}.php"),
        }
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fragment" | "section" => Ok(Self::Fragment),
            "page" | "full-page" | "document" => Ok(Self::DocumentWithIdentity),
            "page-convention" | "convention" => Ok(Self::DocumentByConvention),
            other => Err(CompileError::InvalidInput(format!(
                "unknown template kind: {other}"
            ))),
        }
    }
}

/// Lowercase, with every character outside `[a-z0-9]` replaced by `-`.
pub fn file_slug(slug: &str) -> String {
    slug.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Machine-checkable prefixes carried by every fatal error.
pub mod error_codes {
    pub const COMPILER_FATAL: &str = "COMPILER_FATAL";
    pub const COLLABORATOR_FAILURE: &str = "COLLABORATOR_FAILURE";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
}

/// Hard-validation rule that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    MainLandmarkCount,
    MultipleH1,
    ClickablePrimitive,
    FieldIdCollision,
    SlugCollision,
}

/// Errors that abort a compile.
#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error("COMPILER_FATAL: {message}")]
    Validation {
        rule: ValidationRule,
        message: String,
    },

    #[error("COLLABORATOR_FAILURE: {0}")]
    Collaborator(String),

    #[error("COLLABORATOR_FAILURE: IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        use error_codes::*;
        match self {
            CompileError::Validation { .. } => COMPILER_FATAL,
            CompileError::Collaborator(_) | CompileError::Io(_) => COLLABORATOR_FAILURE,
            CompileError::InvalidInput(_) => INVALID_INPUT,
        }
    }
}

/// Convenience result type.
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(slug: &str) -> ParsedField {
        ParsedField::new(FieldKind::Text, "h2", "", slug.to_string())
    }

    #[test]
    fn test_find_field_descends_into_children() {
        let forest = vec![
            leaf("title"),
            ParsedField::new(FieldKind::Container, "section", "hero", "hero".into())
                .with_children(vec![leaf("hero_title")]),
        ];
        assert_eq!(find_field(&forest, "hero_title").unwrap().slug, "hero_title");
        assert!(find_field(&forest, "missing").is_none());
    }

    #[test]
    fn test_field_serializes_with_wire_names() {
        let mut field = leaf("card_title").with_content("Starter");
        field.kind = FieldKind::FormField;
        field.field_type = Some(FormFieldType::Email);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "form_field");
        assert_eq!(json["originalContent"], "Starter");
        assert_eq!(json["fieldType"], "email");
        assert!(json.get("children").is_none());
        assert!(json.get("componentType").is_none());
    }

    #[test]
    fn test_template_file_by_kind() {
        assert_eq!(
            TemplateKind::Fragment.template_file("Pricing Table"),
            "template-parts/sections/pricing-table.php"
        );
        assert_eq!(
            TemplateKind::DocumentByConvention.template_file("home"),
            "page-home.php"
        );
    }

    #[test]
    fn test_template_kind_from_str() {
        assert_eq!("section".parse::<TemplateKind>().unwrap(), TemplateKind::Fragment);
        assert_eq!(
            "full-page".parse::<TemplateKind>().unwrap(),
            TemplateKind::DocumentWithIdentity
        );
        let err = "poster".parse::<TemplateKind>().unwrap_err();
        assert_eq!(err.code(), error_codes::INVALID_INPUT);
    }

    #[test]
    fn test_error_display_carries_code_prefix() {
        let err = CompileError::Validation {
            rule: ValidationRule::MultipleH1,
            message: "Multiple <h1> headings remain after SEO optimization.".into(),
        };
        assert!(err.to_string().starts_with("COMPILER_FATAL: "));
        assert_eq!(err.code(), "COMPILER_FATAL");
    }
}
