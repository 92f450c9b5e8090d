//! Writes compile artifacts into a theme directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use press_stack::{CompilationResult, CompileRequest, ComponentSchema, ParsedField, Reports};

/// Metadata about one written file.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the theme directory.
    pub filename: String,
    pub size: usize,
    #[serde(skip)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratedFiles {
    pub files: Vec<GeneratedFile>,
}

impl GeneratedFiles {
    pub fn total_size(&self) -> usize {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Everything about a compile that is not itself a theme file.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompileReport<'a> {
    template_name: &'a str,
    template_slug: &'a str,
    model: &'a [ParsedField],
    schema: &'a ComponentSchema,
    reports: &'a Reports,
    asset_dependencies: &'a [String],
    header_extracted: bool,
    footer_extracted: bool,
}

fn write_one(theme_dir: &Path, relative: String, content: String, files: &mut Vec<GeneratedFile>) -> Result<()> {
    let path = theme_dir.join(&relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&path, &content).with_context(|| format!("writing {}", path.display()))?;
    debug!("Wrote {} ({} bytes)", relative, content.len());
    files.push(GeneratedFile {
        filename: relative,
        size: content.len(),
        content,
    });
    Ok(())
}

/// Write the template, its field group, the source HTML and a JSON report.
///
/// Layout:
/// - `page-{slug}.php` or `template-parts/sections/{slug}.php`
/// - `inc/acf-json/acf-{slug}.json`
/// - `inc/source-html/source-{slug}.html`
/// - `inc/reports/report-{slug}.json`
pub fn write_artifacts(
    theme_dir: &Path,
    request: &CompileRequest,
    result: &CompilationResult,
) -> Result<GeneratedFiles> {
    let slug = &request.template_slug;
    let mut files = Vec::new();

    write_one(
        theme_dir,
        request.kind.template_file(slug),
        result.php.clone(),
        &mut files,
    )?;

    let acf = serde_json::to_string_pretty(&result.acf)?;
    write_one(theme_dir, format!("inc/acf-json/acf-{slug}.json"), acf, &mut files)?;

    write_one(
        theme_dir,
        format!("inc/source-html/source-{slug}.html"),
        request.html.clone(),
        &mut files,
    )?;

    let report = CompileReport {
        template_name: &request.template_name,
        template_slug: slug,
        model: &result.model,
        schema: &result.schema,
        reports: &result.reports,
        asset_dependencies: &result.asset_dependencies,
        header_extracted: result.header_extracted,
        footer_extracted: result.footer_extracted,
    };
    let report = serde_json::to_string_pretty(&report)?;
    write_one(theme_dir, format!("inc/reports/report-{slug}.json"), report, &mut files)?;

    Ok(GeneratedFiles { files })
}
