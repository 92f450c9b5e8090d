//! press-stack command-line support: configuration resolution, artifact
//! output and the filesystem theme collaborators.

pub mod config;
pub mod output;
pub mod theme;

pub use config::{load_compiler_config, resolve_projects_dir, ConfigError};
pub use output::{write_artifacts, GeneratedFile, GeneratedFiles};
pub use theme::ThemeWorkspace;
