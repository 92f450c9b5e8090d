//! Filesystem implementations of the compiler's theme collaborators.
//!
//! Every project lives under `{projects_dir}/{project_key}/theme`. Files the
//! user has customized are never overwritten: a file is only (re)written when
//! it is missing, blank, or still carries one of the scaffold markers.

mod assets;
mod layout;
mod shell;

use std::fs;
use std::path::{Path, PathBuf};

use press_stack::{CompileError, CompileResult};
use tracing::debug;

pub use assets::{enqueue_snippet, inject_enqueue};
pub use layout::{footer_php, header_php};
pub use shell::SHELL_FILES;

/// A directory of project themes plus the root that relative asset paths
/// in source HTML resolve against.
#[derive(Debug, Clone)]
pub struct ThemeWorkspace {
    projects_dir: PathBuf,
    source_root: PathBuf,
}

impl ThemeWorkspace {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            source_root: PathBuf::from("."),
        }
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// `{projects_dir}/{project_key}/theme`, rejecting keys that would
    /// escape the projects directory.
    pub fn theme_dir(&self, project_key: &str) -> CompileResult<PathBuf> {
        let key = project_key.trim();
        let escapes = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\'])
            || key.contains("..");
        if escapes {
            return Err(CompileError::InvalidInput(format!(
                "invalid project key '{project_key}'"
            )));
        }
        Ok(self.projects_dir.join(key).join("theme"))
    }
}

/// Whether `path` may be (re)written: absent, blank, or still scaffold.
pub(crate) fn is_replaceable(path: &Path, markers: &[&str]) -> CompileResult<bool> {
    if !path.exists() {
        return Ok(true);
    }
    let content = fs::read_to_string(path)?;
    let replaceable = content.trim().is_empty() || markers.iter().any(|m| content.contains(m));
    if !replaceable {
        debug!("Keeping customized {}", path.display());
    }
    Ok(replaceable)
}

/// Write `content` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, content: &str) -> CompileResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
