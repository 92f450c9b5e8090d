//! Press Stack: compiles static HTML into WordPress page templates with
//! matching ACF field groups.

pub mod accessibility;
pub mod acf;
pub mod assets;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod dom;
pub mod extract;
pub mod layout;
pub mod naming;
pub mod normalize;
pub mod rules;
pub mod schema;
pub mod seo;
pub mod types;
pub mod validate;

pub use accessibility::{optimize_accessibility, AccessibilityLog, AccessibilityReport};
pub use acf::{generate_field_group, AcfField, FieldGroup};
pub use assets::rewrite_asset_paths;
pub use codegen::generate_template;
pub use compiler::{compile_html, CompilationResult, CompileRequest, Compiler, Reports};
pub use config::CompilerConfig;
pub use dom::{Document, NodeId};
pub use extract::extract_fields;
pub use layout::{
    split_layout, AssetRegistry, LayoutExtraction, LayoutExtractor, LayoutSplit, ThemeShell,
};
pub use normalize::{flatten_wrappers, normalize_landmarks};
pub use schema::{generate_component_schema, ComponentSchema};
pub use seo::{optimize_seo, OptimizationLog, SeoReport};
pub use types::*;
pub use validate::validate;
