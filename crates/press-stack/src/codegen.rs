//! WordPress template generation.
//!
//! The field forest is first lowered into a [`Markup`] tree whose leaves
//! reference PHP [`Snippet`]s held in a [`SnippetTable`]. A single pass
//! over an explicit work stack then renders the tree to text.

use crate::dom::is_void;
use crate::naming::php_variable;
use crate::types::{FieldKind, FormFieldType, ParsedField, TemplateKind};

const INDENT: &str = "    ";

/// Index of a snippet in its [`SnippetTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnippetId(usize);

/// Accessor scope: page-level fields or the current repeater row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Page,
    Row,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Snippet {
    /// Inline echo of a text value.
    Value { slug: String, scope: Scope },
    /// Guarded `<img>` bound to an image array.
    Image { slug: String, scope: Scope },
    /// Guarded `<a>` bound to a link array.
    Link { slug: String, scope: Scope, classes: String },
    /// `have_rows` loop around one instance.
    Loop { slug: String, body: Vec<Markup> },
    /// Form control re-emitted as static markup.
    Control {
        tag: String,
        name: String,
        input_type: Option<&'static str>,
        classes: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Element {
        tag: String,
        classes: String,
        children: Vec<Markup>,
    },
    Snippet(SnippetId),
}

/// Snippets registered under monotonically increasing ids.
#[derive(Debug, Default)]
pub struct SnippetTable {
    snippets: Vec<Snippet>,
}

impl SnippetTable {
    pub fn register(&mut self, snippet: Snippet) -> SnippetId {
        self.snippets.push(snippet);
        SnippetId(self.snippets.len() - 1)
    }

    pub fn get(&self, id: SnippetId) -> &Snippet {
        &self.snippets[id.0]
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

/// Lower a field forest into markup plus its snippet table.
pub fn build_markup(fields: &[ParsedField]) -> (Vec<Markup>, SnippetTable) {
    let mut table = SnippetTable::default();
    let markup = build(fields, Scope::Page, &mut table);
    (markup, table)
}

fn build(fields: &[ParsedField], scope: Scope, table: &mut SnippetTable) -> Vec<Markup> {
    fields.iter().map(|f| build_field(f, scope, table)).collect()
}

fn build_field(field: &ParsedField, scope: Scope, table: &mut SnippetTable) -> Markup {
    let slug = field.slug.clone();
    match field.kind {
        FieldKind::Repeater => {
            let children = match field.children.as_slice() {
                // The item's own text is the field: bind it directly.
                [only] if is_self_valued(field, only) => {
                    vec![Markup::Snippet(table.register(Snippet::Value {
                        slug: only.slug.clone(),
                        scope: Scope::Row,
                    }))]
                }
                kids => build(kids, Scope::Row, table),
            };
            let instance = Markup::Element {
                tag: field.tag.clone(),
                classes: field.classes.clone(),
                children,
            };
            Markup::Snippet(table.register(Snippet::Loop {
                slug,
                body: vec![instance],
            }))
        }
        FieldKind::Container => Markup::Element {
            tag: field.tag.clone(),
            classes: field.classes.clone(),
            children: build(&field.children, scope, table),
        },
        FieldKind::Text | FieldKind::Textarea => Markup::Element {
            tag: field.tag.clone(),
            classes: field.classes.clone(),
            children: vec![Markup::Snippet(table.register(Snippet::Value { slug, scope }))],
        },
        FieldKind::Image => Markup::Snippet(table.register(Snippet::Image { slug, scope })),
        FieldKind::Link => Markup::Snippet(table.register(Snippet::Link {
            slug,
            scope,
            classes: field.classes.clone(),
        })),
        FieldKind::FormField => Markup::Snippet(table.register(Snippet::Control {
            tag: field.tag.clone(),
            name: slug,
            input_type: control_type(&field.tag, field.field_type),
            classes: field.classes.clone(),
        })),
    }
}

fn is_self_valued(repeater: &ParsedField, child: &ParsedField) -> bool {
    matches!(child.kind, FieldKind::Text | FieldKind::Textarea)
        && child.tag == repeater.tag
        && child.classes == repeater.classes
}

fn control_type(tag: &str, field_type: Option<FormFieldType>) -> Option<&'static str> {
    if tag != "input" {
        return None;
    }
    Some(match field_type {
        Some(FormFieldType::Email) => "email",
        Some(FormFieldType::Boolean) => "checkbox",
        Some(FormFieldType::Number) => "number",
        _ => "text",
    })
}

// ───── rendering ─────

enum RenderOp<'a> {
    Node(&'a Markup, usize),
    /// Pre-built closing line at an indent depth.
    Close(usize, String),
}

/// Render markup to template text.
pub fn render<'a>(markup: &'a [Markup], table: &'a SnippetTable) -> String {
    let mut out = String::new();
    let mut ops: Vec<RenderOp<'a>> = markup.iter().rev().map(|m| RenderOp::Node(m, 0)).collect();
    while let Some(op) = ops.pop() {
        let (node, depth) = match op {
            RenderOp::Close(depth, line) => {
                pad(&mut out, depth);
                out.push_str(&line);
                continue;
            }
            RenderOp::Node(node, depth) => (node, depth),
        };
        match node {
            Markup::Element { tag, classes, children } => {
                pad(&mut out, depth);
                out.push_str(&open_tag(tag, classes));
                if is_void(tag) {
                    out.push('\n');
                    continue;
                }
                if let [Markup::Snippet(id)] = children.as_slice() {
                    if let Snippet::Value { slug, scope } = table.get(*id) {
                        let (_, the, _) = accessors(*scope, slug);
                        out.push_str(&format!("<?php {the}('{slug}'); ?></{tag}>\n"));
                        continue;
                    }
                }
                out.push('\n');
                ops.push(RenderOp::Close(depth, format!("</{tag}>\n")));
                ops.extend(children.iter().rev().map(|c| RenderOp::Node(c, depth + 1)));
            }
            Markup::Snippet(id) => match table.get(*id) {
                Snippet::Loop { slug, body } => {
                    pad(&mut out, depth);
                    out.push_str(&format!("<?php if (have_rows('{slug}')): ?>\n"));
                    pad(&mut out, depth + 1);
                    out.push_str(&format!("<?php while (have_rows('{slug}')): the_row(); ?>\n"));
                    ops.push(RenderOp::Close(depth, "<?php endif; ?>\n".to_string()));
                    ops.push(RenderOp::Close(depth + 1, "<?php endwhile; ?>\n".to_string()));
                    ops.extend(body.iter().rev().map(|n| RenderOp::Node(n, depth + 2)));
                }
                leaf => render_leaf(leaf, depth, &mut out),
            },
        }
    }
    out
}

fn pad(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Escape a source value for a double-quoted attribute in template text.
/// No `<` or `>` survives, so a value can never open a PHP block.
fn attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn open_tag(tag: &str, classes: &str) -> String {
    if classes.is_empty() {
        format!("<{tag}>")
    } else {
        format!("<{tag} class=\"{}\">", attr_value(classes))
    }
}

fn accessors(scope: Scope, slug: &str) -> (&'static str, &'static str, String) {
    match scope {
        Scope::Page => ("get_field", "the_field", php_variable(slug)),
        Scope::Row => ("get_sub_field", "the_sub_field", format!("sub_{slug}")),
    }
}

fn render_leaf(snippet: &Snippet, depth: usize, out: &mut String) {
    match snippet {
        Snippet::Value { slug, scope } => {
            let (_, the, _) = accessors(*scope, slug);
            pad(out, depth);
            out.push_str(&format!("<?php {the}('{slug}'); ?>\n"));
        }
        Snippet::Image { slug, scope } => {
            let (get, _, var) = accessors(*scope, slug);
            guarded(out, depth, get, slug, &var, &format!(
                "<img src=\"<?php echo esc_url(${var}['url']); ?>\" alt=\"<?php echo esc_attr(${var}['alt']); ?>\">"
            ));
        }
        Snippet::Link { slug, scope, classes } => {
            let (get, _, var) = accessors(*scope, slug);
            let class_attr = if classes.is_empty() {
                String::new()
            } else {
                format!(" class=\"{}\"", attr_value(classes))
            };
            guarded(out, depth, get, slug, &var, &format!(
                "<a href=\"<?php echo esc_url(${var}['url']); ?>\"{class_attr}><?php echo esc_html(${var}['title']); ?></a>"
            ));
        }
        Snippet::Control { tag, name, input_type, classes } => {
            pad(out, depth);
            out.push('<');
            out.push_str(tag);
            if let Some(t) = input_type {
                out.push_str(&format!(" type=\"{t}\""));
            }
            out.push_str(&format!(" name=\"{}\"", attr_value(name)));
            if !classes.is_empty() {
                out.push_str(&format!(" class=\"{}\"", attr_value(classes)));
            }
            out.push('>');
            if !is_void(tag) {
                out.push_str(&format!("</{tag}>"));
            }
            out.push('\n');
        }
        Snippet::Loop { .. } => {}
    }
}

/// `$var = get(slug); if ($var): inner endif;`
fn guarded(out: &mut String, depth: usize, get: &str, slug: &str, var: &str, inner: &str) {
    pad(out, depth);
    out.push_str(&format!("<?php ${var} = {get}('{slug}'); ?>\n"));
    pad(out, depth);
    out.push_str(&format!("<?php if (${var}): ?>\n"));
    pad(out, depth + 1);
    out.push_str(inner);
    out.push('\n');
    pad(out, depth);
    out.push_str("<?php endif; ?>\n");
}

/// Keep a template name from closing the header comment or spanning lines.
fn sanitize_template_name(name: &str) -> String {
    name.replace("*/", "")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// Generate the complete template file text.
pub fn generate_template(fields: &[ParsedField], kind: TemplateKind, template_name: &str) -> String {
    let (markup, table) = build_markup(fields);
    let content = render(&markup, &table);

    let mut out = String::new();
    if kind == TemplateKind::DocumentWithIdentity {
        out.push_str(&format!(
            "<?php\n/*\nTemplate Name: {}\n*/\n?>\n",
            sanitize_template_name(template_name)
        ));
    }
    if kind.is_document() {
        out.push_str("<?php get_header(); ?>\n\n");
        out.push_str("<?php if (have_posts()) : while (have_posts()) : the_post(); ?>\n");
        out.push_str(&content);
        out.push_str("<?php endwhile; endif; ?>\n\n");
        out.push_str("<?php get_footer(); ?>\n");
    } else {
        out.push_str(&content);
    }
    out
}
