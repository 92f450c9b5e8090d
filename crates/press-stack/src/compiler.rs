//! Compile orchestration.
//!
//! Stage order is fixed: asset rewriting, layout extraction, structural
//! normalization, SEO, accessibility, a final wrapper settle, extraction,
//! code generation, metadata, then hard validation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::accessibility::{optimize_accessibility, AccessibilityReport};
use crate::acf::{generate_field_group, FieldGroup};
use crate::assets::rewrite_asset_paths;
use crate::codegen::generate_template;
use crate::config::CompilerConfig;
use crate::dom::Document;
use crate::extract::extract_fields;
use crate::layout::{AssetRegistry, LayoutExtractor, ThemeShell};
use crate::normalize::{flatten_wrappers, normalize_landmarks};
use crate::schema::{generate_component_schema, ComponentSchema};
use crate::seo::{optimize_seo, SeoReport};
use crate::types::{CompileResult, ParsedField, TemplateKind};
use crate::validate::validate;

/// One page or section to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub html: String,
    pub template_name: String,
    pub template_slug: String,
    pub kind: TemplateKind,
    #[serde(default)]
    pub project_key: Option<String>,
}

impl CompileRequest {
    pub fn new(html: impl Into<String>, template_name: impl Into<String>, kind: TemplateKind) -> Self {
        let template_name = template_name.into();
        Self {
            html: html.into(),
            template_slug: crate::types::file_slug(&template_name),
            template_name,
            kind,
            project_key: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.template_slug = slug.into();
        self
    }

    pub fn with_project(mut self, project_key: impl Into<String>) -> Self {
        self.project_key = Some(project_key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reports {
    pub seo: SeoReport,
    pub accessibility: AccessibilityReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub php: String,
    pub acf: FieldGroup,
    pub model: Vec<ParsedField>,
    pub schema: ComponentSchema,
    pub optimized_html: String,
    pub reports: Reports,
    pub asset_dependencies: Vec<String>,
    pub header_extracted: bool,
    pub footer_extracted: bool,
}

/// The compiler with its optional project collaborators.
pub struct Compiler {
    config: CompilerConfig,
    layout: Option<Box<dyn LayoutExtractor>>,
    assets: Option<Box<dyn AssetRegistry>>,
    shell: Option<Box<dyn ThemeShell>>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            layout: None,
            assets: None,
            shell: None,
        }
    }

    pub fn with_layout_extractor(mut self, extractor: Box<dyn LayoutExtractor>) -> Self {
        self.layout = Some(extractor);
        self
    }

    pub fn with_asset_registry(mut self, registry: Box<dyn AssetRegistry>) -> Self {
        self.assets = Some(registry);
        self
    }

    pub fn with_theme_shell(mut self, shell: Box<dyn ThemeShell>) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Run the full pipeline for one request.
    pub fn compile(&self, request: &CompileRequest) -> CompileResult<CompilationResult> {
        info!(
            "Compiling '{}' ({:?}, {} bytes)",
            request.template_name,
            request.kind,
            request.html.len()
        );
        let config = &self.config;

        // 1. Assets
        let mut doc = Document::parse(&request.html);
        let asset_dependencies = rewrite_asset_paths(&mut doc, &config.asset_url_base);
        if let Some(project) = request.project_key.as_deref() {
            match &self.shell {
                Some(shell) => shell.ensure_theme_shell(project)?,
                None => warn!("No theme shell collaborator; skipping scaffold for '{}'", project),
            }
            if !asset_dependencies.is_empty() {
                match &self.assets {
                    Some(registry) => registry.register_assets(project, &asset_dependencies)?,
                    None => warn!(
                        "No asset registry; {} assets not registered",
                        asset_dependencies.len()
                    ),
                }
            }
        }

        // 2. Layout
        let mut header_extracted = false;
        let mut footer_extracted = false;
        if request.kind.is_document() {
            if let (Some(project), Some(layout)) = (request.project_key.as_deref(), &self.layout) {
                let extraction = layout.extract_layout(&doc.to_html(), project)?;
                header_extracted = extraction.header_present;
                footer_extracted = extraction.footer_present;
                doc = Document::parse(&extraction.stripped_document);
                debug!(
                    "Layout extracted: header={}, footer={}",
                    header_extracted, footer_extracted
                );
            }
        }

        // 3. Structure
        if request.kind.is_document() {
            normalize_landmarks(&mut doc, &config.main_landmark_id);
        }
        flatten_wrappers(&mut doc, config.flatten_iterations);

        // 4-5. Optimizers
        let seo = optimize_seo(&mut doc, config);
        let accessibility = optimize_accessibility(&mut doc, config);
        // Demoted landmarks can leave bare wrappers behind.
        flatten_wrappers(&mut doc, config.flatten_iterations);

        // 6-8. Model and artifacts
        let model = extract_fields(&doc, config);
        let php = generate_template(&model, request.kind, &request.template_name);
        let acf = generate_field_group(
            &model,
            &request.template_name,
            &request.template_slug,
            request.kind,
        );
        let schema = generate_component_schema(&model);

        // 9. Validation
        validate(&doc, &model)?;

        info!(
            "Compiled '{}': {} top-level fields, {} assets",
            request.template_name,
            model.len(),
            asset_dependencies.len()
        );
        Ok(CompilationResult {
            php,
            acf,
            model,
            schema,
            optimized_html: doc.to_html(),
            reports: Reports { seo, accessibility },
            asset_dependencies,
            header_extracted,
            footer_extracted,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

/// Compile with default configuration and no collaborators.
pub fn compile_html(html: &str, template_name: &str, kind: TemplateKind) -> CompileResult<CompilationResult> {
    Compiler::default().compile(&CompileRequest::new(html, template_name, kind))
}
