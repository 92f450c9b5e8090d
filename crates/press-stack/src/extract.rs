//! Content-model extraction.
//!
//! Walks the optimized tree from `body` and derives a forest of
//! [`ParsedField`]s. Each container is processed in three passes: explicit
//! lists, sibling groups sharing a structural signature, then the remaining
//! leaves and nested containers. Fields come out in document order.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CompilerConfig;
use crate::dom::{Document, NodeId};
use crate::naming::{clean_class_name, singularize, to_snake_case};
use crate::rules::{first_match, slug_role, ElementFacts, SlugRole, COMPONENT_RULES};
use crate::types::{FieldKind, FormFieldType, ParsedField};

/// Namespace for name-based field ids.
const FIELD_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93d7_4b58_a0e1_5c7d_2b9f_8e34);

const LEAF_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "img", "a", "li", "button"];
const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const FORM_CONTROLS: &[&str] = &["input", "textarea", "select"];
const CLICKABLE: &[&str] = &["a", "button"];

/// A field plus the document position of the element it came from.
type Located = (usize, ParsedField);

/// Per-call extraction state threaded through recursion.
struct ExtractionContext<'a> {
    doc: &'a Document,
    consumed: HashSet<NodeId>,
    position: HashMap<NodeId, usize>,
    max_depth: usize,
    fallback_counter: usize,
}

impl<'a> ExtractionContext<'a> {
    fn new(doc: &'a Document, max_depth: usize) -> Self {
        let position = doc
            .descendants(doc.root())
            .into_iter()
            .enumerate()
            .map(|(i, n)| (n, i))
            .collect();
        Self {
            doc,
            consumed: HashSet::new(),
            position,
            max_depth,
            fallback_counter: 0,
        }
    }

    fn pos(&self, node: NodeId) -> usize {
        self.position.get(&node).copied().unwrap_or(usize::MAX)
    }

    fn consume_subtree(&mut self, node: NodeId) {
        self.consumed.insert(node);
        for d in self.doc.descendants(node) {
            self.consumed.insert(d);
        }
    }

    fn first_clickable(&self, node: NodeId) -> Option<NodeId> {
        self.doc
            .find_first(node, |d, n| d.tag(n).is_some_and(|t| CLICKABLE.contains(&t)))
    }

    fn next_fallback_name(&mut self) -> String {
        self.fallback_counter += 1;
        format!("field_{}", self.fallback_counter)
    }
}

/// Extract the content model from an optimized document.
pub fn extract_fields(doc: &Document, config: &CompilerConfig) -> Vec<ParsedField> {
    let mut ctx = ExtractionContext::new(doc, config.max_extraction_depth);
    let start = doc.body().unwrap_or_else(|| doc.root());
    let mut fields: Vec<ParsedField> = scan_node(&mut ctx, start, 0, false, "")
        .into_iter()
        .map(|(_, f)| f)
        .collect();

    disambiguate_slugs(&mut fields, &mut HashSet::new());
    assign_ids(&mut fields, "");
    debug!("Extracted {} top-level fields", fields.len());
    fields
}

fn scan_node(
    ctx: &mut ExtractionContext<'_>,
    container: NodeId,
    depth: usize,
    inside_list: bool,
    parent_context: &str,
) -> Vec<Located> {
    if depth >= ctx.max_depth {
        debug!("Extraction depth cap reached at {:?}", container);
        return Vec::new();
    }
    let doc = ctx.doc;
    let mut results: Vec<Located> = Vec::new();
    let container_tag = doc.tag(container).unwrap_or_default();
    let own_context = clean_class_name(doc.class_attr(container));
    let current_context = if own_context.is_empty() {
        parent_context.to_string()
    } else {
        own_context
    };

    // Forms skip the general passes: only their controls become fields.
    if container_tag == "form" {
        scan_form(ctx, container, &mut results);
        ctx.consume_subtree(container);
        results.sort_by_key(|(pos, _)| *pos);
        return results;
    }

    if matches!(container_tag, "ul" | "ol") {
        if let Some(list) = scan_list(ctx, container, depth) {
            results.push(list);
            return results;
        }
    }

    let children = doc.element_children(container);
    scan_groups(ctx, &children, depth, &mut results);
    scan_remaining(ctx, &children, depth, inside_list, &current_context, &mut results);

    results.sort_by_key(|(pos, _)| *pos);
    results
}

fn form_field_type(tag: &str, input_type: &str) -> FormFieldType {
    match (tag, input_type) {
        (_, "email") => FormFieldType::Email,
        ("textarea", _) => FormFieldType::Text,
        (_, "checkbox") => FormFieldType::Boolean,
        ("select", _) => FormFieldType::Enum,
        (_, "number") => FormFieldType::Number,
        _ => FormFieldType::String,
    }
}

fn scan_form(ctx: &mut ExtractionContext<'_>, form: NodeId, results: &mut Vec<Located>) {
    let doc = ctx.doc;
    let controls: Vec<NodeId> = doc
        .descendants(form)
        .into_iter()
        .filter(|&n| doc.tag(n).is_some_and(|t| FORM_CONTROLS.contains(&t)))
        .collect();
    for control in controls {
        if ctx.consumed.contains(&control) {
            continue;
        }
        let tag = doc.tag(control).unwrap_or_default();
        let input_type = doc.attr(control, "type").unwrap_or("text");
        let declared = doc
            .attr(control, "name")
            .filter(|v| !v.is_empty())
            .or_else(|| doc.attr(control, "id").filter(|v| !v.is_empty()))
            .map(to_snake_case)
            .filter(|s| !s.is_empty());
        let slug = match declared {
            Some(slug) => slug,
            None => ctx.next_fallback_name(),
        };

        let mut field = ParsedField::new(FieldKind::FormField, tag, doc.class_attr(control), slug);
        field.field_type = Some(form_field_type(tag, input_type));
        ctx.consumed.insert(control);
        results.push((ctx.pos(control), field));
    }
}

/// A `ul`/`ol` with `li` children is one repeater whose schema comes from
/// the first item.
fn scan_list(ctx: &mut ExtractionContext<'_>, list: NodeId, depth: usize) -> Option<Located> {
    let doc = ctx.doc;
    let items: Vec<NodeId> = doc
        .element_children(list)
        .into_iter()
        .filter(|&c| doc.tag(c) == Some("li"))
        .collect();
    let &first = items.first()?;

    let slug = non_empty_or(clean_class_name(doc.class_attr(list)), "items");
    ctx.consumed.extend(items.iter().copied());

    let mut children: Vec<ParsedField> = scan_node(ctx, first, depth + 1, true, &slug)
        .into_iter()
        .map(|(_, f)| f)
        .collect();
    if children.is_empty() {
        let context = singularize(&slug);
        let fallback = match ctx.first_clickable(first) {
            Some(link) => ParsedField::new(
                FieldKind::Link,
                doc.tag(link).unwrap_or("a"),
                doc.class_attr(link),
                suffixed(&context, "link", "item_link"),
            )
            .with_content(doc.text_content(link).trim()),
            None => ParsedField::new(
                FieldKind::Text,
                "li",
                doc.class_attr(first),
                non_empty_or(context, "item"),
            )
            .with_content(doc.text_content(first).trim()),
        };
        children.push(fallback);
    }
    for &item in &items {
        ctx.consume_subtree(item);
    }

    let repeater = ParsedField::new(FieldKind::Repeater, "li", doc.class_attr(first), slug)
        .with_children(children);
    Some((ctx.pos(first), repeater))
}

/// `tag[.primaryClass][childTags]`.
fn signature(doc: &Document, node: NodeId) -> String {
    let tag = doc.tag(node).unwrap_or_default();
    let class = doc
        .first_class(node)
        .map(|c| format!(".{c}"))
        .unwrap_or_default();
    let shape: Vec<&str> = doc
        .element_children(node)
        .into_iter()
        .filter_map(|c| doc.tag(c))
        .collect();
    format!("{tag}{class}[{}]", shape.join("-"))
}

/// Siblings sharing a signature become one repeater, schema from the first.
fn scan_groups(ctx: &mut ExtractionContext<'_>, children: &[NodeId], depth: usize, results: &mut Vec<Located>) {
    let doc = ctx.doc;
    let mut groups: Vec<(String, Vec<NodeId>)> = Vec::new();
    for &child in children {
        if ctx.consumed.contains(&child) {
            continue;
        }
        let sig = signature(doc, child);
        match groups.iter_mut().find(|(s, _)| *s == sig) {
            Some((_, members)) => members.push(child),
            None => groups.push((sig, vec![child])),
        }
    }

    for (sig, members) in groups {
        if members.len() < 2 {
            continue;
        }
        let first = members[0];
        let item_tag = doc.tag(first).unwrap_or_default();
        let raw_class = doc.class_attr(first);
        let slug = non_empty_or(clean_class_name(raw_class), "items");
        debug!("Grouping {} siblings by signature {} into repeater {}", members.len(), sig, slug);

        ctx.consumed.extend(members.iter().copied());
        let mut fields: Vec<ParsedField> = scan_node(ctx, first, depth + 1, false, &slug)
            .into_iter()
            .map(|(_, f)| f)
            .collect();
        if fields.is_empty() {
            fields.push(
                ParsedField::new(
                    FieldKind::Text,
                    item_tag,
                    raw_class,
                    non_empty_or(singularize(&slug), "item"),
                )
                .with_content(doc.text_content(first).trim()),
            );
        }
        for &member in &members {
            ctx.consume_subtree(member);
        }
        let repeater =
            ParsedField::new(FieldKind::Repeater, item_tag, raw_class, slug).with_children(fields);
        results.push((ctx.pos(first), repeater));
    }
}

fn scan_remaining(
    ctx: &mut ExtractionContext<'_>,
    children: &[NodeId],
    depth: usize,
    inside_list: bool,
    current_context: &str,
    results: &mut Vec<Located>,
) {
    let doc = ctx.doc;
    for &child in children {
        if ctx.consumed.contains(&child) {
            continue;
        }
        let tag = doc.tag(child).unwrap_or_default();
        let classes = doc.class_attr(child);

        if LEAF_TAGS.contains(&tag) {
            let text = || doc.text_content(child).trim().to_string();
            let (kind, content) = match tag {
                "p" => (FieldKind::Textarea, text()),
                "img" => (
                    FieldKind::Image,
                    doc.attr(child, "alt")
                        .filter(|a| !a.is_empty())
                        .or_else(|| doc.attr(child, "src"))
                        .unwrap_or_default()
                        .to_string(),
                ),
                "a" | "button" => (
                    FieldKind::Link,
                    doc.attr(child, "href").map(str::to_string).unwrap_or_else(text),
                ),
                "li" => {
                    if ctx.first_clickable(child).is_some() {
                        let nested = scan_node(ctx, child, depth + 1, true, current_context);
                        results.extend(nested);
                        continue;
                    }
                    (FieldKind::Text, text())
                }
                _ => (FieldKind::Text, text()),
            };

            let keep = !content.is_empty() || matches!(kind, FieldKind::Image | FieldKind::Link);
            if keep {
                ctx.consumed.insert(child);
                let slug = semantic_slug(tag, classes, inside_list, current_context);
                let field = ParsedField::new(kind, tag, classes, slug).with_content(content);
                results.push((ctx.pos(child), field));
            }
            continue;
        }

        let own = clean_class_name(classes);
        let sub_context = if own.is_empty() { current_context.to_string() } else { own.clone() };
        let nested: Vec<ParsedField> = scan_node(ctx, child, depth + 1, inside_list, &sub_context)
            .into_iter()
            .map(|(_, f)| f)
            .collect();
        if nested.is_empty() {
            continue;
        }
        ctx.consumed.insert(child);

        let mut facts = ElementFacts::new(tag, classes);
        facts.has_h1 = doc.find_first(child, |d, n| d.tag(n) == Some("h1")).is_some();
        facts.has_card_repeater = nested
            .iter()
            .any(|f| f.kind == FieldKind::Repeater && f.slug.contains("card"));

        let mut container = ParsedField::new(
            FieldKind::Container,
            tag,
            classes,
            non_empty_or(own, &format!("container_{tag}")),
        )
        .with_children(nested);
        container.component_type = first_match(COMPONENT_RULES, &facts);
        results.push((ctx.pos(child), container));
    }
}

/// Slug for a leaf: its role, prefixed by the singular enclosing context.
fn semantic_slug(tag: &str, classes: &str, inside_list: bool, parent_context: &str) -> String {
    let role = slug_role(&ElementFacts::new(tag, classes));
    let context = if parent_context.is_empty() {
        String::new()
    } else {
        singularize(parent_context)
    };
    let clickable = CLICKABLE.contains(&tag);

    if inside_list {
        if clickable {
            return suffixed(&context, "link", "item_link");
        }
        if HEADINGS.contains(&tag) || matches!(tag, "p" | "img") {
            return suffixed(&context, role.as_str(), role.as_str());
        }
        return non_empty_or(context, "item");
    }

    if context.is_empty() {
        return role.as_str().to_string();
    }
    match role {
        SlugRole::Item => context,
        SlugRole::Link if clickable => format!("{context}_link"),
        _ => format!("{context}_{}", role.as_str()),
    }
}

/// `{context}_{suffix}`, or `bare` without a context.
fn suffixed(context: &str, suffix: &str, bare: &str) -> String {
    if context.is_empty() {
        bare.to_string()
    } else {
        format!("{context}_{suffix}")
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Make slugs unique per scope by suffixing `_2`, `_3`, ... to later
/// duplicates. Containers share their parent's scope; each repeater opens
/// a new one for its instance schema.
fn disambiguate_slugs(fields: &mut [ParsedField], seen: &mut HashSet<String>) {
    for field in fields.iter_mut() {
        if field.kind == FieldKind::Container {
            disambiguate_slugs(&mut field.children, seen);
            continue;
        }
        if !seen.insert(field.slug.clone()) {
            let mut n = 2;
            let renamed = loop {
                let candidate = format!("{}_{}", field.slug, n);
                if seen.insert(candidate.clone()) {
                    break candidate;
                }
                n += 1;
            };
            warn!("Slug collision on '{}' resolved as '{}'", field.slug, renamed);
            field.slug = renamed;
        }
        if field.kind == FieldKind::Repeater {
            disambiguate_slugs(&mut field.children, &mut HashSet::new());
        }
    }
}

/// Name-based ids from each field's structural path.
fn assign_ids(fields: &mut [ParsedField], prefix: &str) {
    for (i, field) in fields.iter_mut().enumerate() {
        let path = format!("{prefix}/{i}:{}", field.slug);
        field.id = Uuid::new_v5(&FIELD_NAMESPACE, path.as_bytes()).to_string();
        assign_ids(&mut field.children, &path);
    }
}
