//! Hard validation. Any failure here aborts the compile.

use std::collections::HashSet;

use crate::dom::Document;
use crate::types::{CompileError, CompileResult, FieldKind, ParsedField, ValidationRule};

fn fatal(rule: ValidationRule, message: impl Into<String>) -> CompileError {
    CompileError::Validation {
        rule,
        message: message.into(),
    }
}

/// Check the optimized document and the extracted model.
pub fn validate(doc: &Document, fields: &[ParsedField]) -> CompileResult<()> {
    let mains = doc.elements_by_tag("main").len();
    if mains > 1 {
        return Err(fatal(
            ValidationRule::MainLandmarkCount,
            "Multiple <main> landmarks detected after normalization.",
        ));
    }
    if mains == 0 {
        return Err(fatal(
            ValidationRule::MainLandmarkCount,
            "No <main> landmark present after normalization.",
        ));
    }

    if doc.elements_by_tag("h1").len() > 1 {
        return Err(fatal(
            ValidationRule::MultipleH1,
            "Multiple <h1> headings remain after SEO optimization.",
        ));
    }

    let clickable = doc
        .elements_by_tags(&["div", "span", "p"])
        .into_iter()
        .any(|n| doc.has_attr(n, "onclick"));
    if clickable {
        return Err(fatal(
            ValidationRule::ClickablePrimitive,
            "Non-semantic clickable primitives remain after accessibility pass.",
        ));
    }

    check_ids(fields, &mut HashSet::new())?;
    check_slugs(fields, &mut HashSet::new())?;
    Ok(())
}

fn check_ids<'a>(fields: &'a [ParsedField], seen: &mut HashSet<&'a str>) -> CompileResult<()> {
    for field in fields {
        if !seen.insert(field.id.as_str()) {
            return Err(fatal(
                ValidationRule::FieldIdCollision,
                format!("Field ID collision detected for {}.", field.slug),
            ));
        }
        check_ids(&field.children, seen)?;
    }
    Ok(())
}

/// Slugs must be unique within a scope: containers are transparent, each
/// repeater instance schema is its own scope.
fn check_slugs<'a>(fields: &'a [ParsedField], seen: &mut HashSet<&'a str>) -> CompileResult<()> {
    for field in fields {
        if field.kind == FieldKind::Container {
            check_slugs(&field.children, seen)?;
            continue;
        }
        if field.slug.is_empty() {
            return Err(fatal(ValidationRule::SlugCollision, "Field with an empty slug."));
        }
        if !seen.insert(field.slug.as_str()) {
            return Err(fatal(
                ValidationRule::SlugCollision,
                format!("Slug collision detected for {}.", field.slug),
            ));
        }
        if field.kind == FieldKind::Repeater {
            check_slugs(&field.children, &mut HashSet::new())?;
        }
    }
    Ok(())
}
