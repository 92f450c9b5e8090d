//! Theme collaborators and the header/footer split they build on.
//!
//! The compiler never touches the filesystem itself. Project-aware work
//! (layout files, asset copies, theme scaffolding) goes through these
//! traits; `press-stack-cli` ships filesystem implementations.

use crate::dom::Document;
use crate::types::CompileResult;

/// Result of pulling shared layout out of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutExtraction {
    /// The page with header and footer removed.
    pub stripped_document: String,
    pub header_present: bool,
    pub footer_present: bool,
}

/// Extracts site-wide header/footer markup into theme layout files.
pub trait LayoutExtractor {
    fn extract_layout(&self, document: &str, project_key: &str) -> CompileResult<LayoutExtraction>;
}

/// Makes local assets available to the theme.
pub trait AssetRegistry {
    fn register_assets(&self, project_key: &str, assets: &[String]) -> CompileResult<()>;
}

/// Guarantees the theme scaffold exists before anything is written into it.
pub trait ThemeShell {
    fn ensure_theme_shell(&self, project_key: &str) -> CompileResult<()>;
}

/// Output of [`split_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSplit {
    pub stripped: String,
    pub header: Option<String>,
    pub footer: Option<String>,
}

/// Landmarks that own their own `header`/`footer`.
const SECTIONING: &[&str] = &["main", "article", "section", "aside", "nav"];

/// Remove the first page-level `header` and the last page-level `footer`.
///
/// Headers and footers nested in sectioning content belong to that content
/// and are left alone.
pub fn split_layout(html: &str) -> LayoutSplit {
    let mut doc = Document::parse(html);
    let page_level = |doc: &Document, tag: &str| -> Vec<crate::dom::NodeId> {
        doc.elements_by_tag(tag)
            .into_iter()
            .filter(|&n| doc.ancestor(n, SECTIONING).is_none())
            .collect()
    };

    let header = page_level(&doc, "header").first().copied().map(|h| {
        let markup = doc.outer_html(h);
        doc.detach(h);
        markup
    });
    let footer = page_level(&doc, "footer").last().copied().map(|f| {
        let markup = doc.outer_html(f);
        doc.detach(f);
        markup
    });

    LayoutSplit {
        stripped: doc.to_html(),
        header,
        footer,
    }
}
