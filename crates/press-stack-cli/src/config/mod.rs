//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use press_stack::CompilerConfig;

/// Environment variable naming the projects directory.
pub const PROJECTS_ENV: &str = "PRESS_STACK_PROJECTS";

const DEFAULT_PROJECTS_DIR: &str = "projects";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolve the directory holding per-project theme workspaces.
pub fn resolve_projects_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(env_path) = std::env::var(PROJECTS_ENV) {
        if !env_path.trim().is_empty() {
            return PathBuf::from(env_path);
        }
    }

    PathBuf::from(DEFAULT_PROJECTS_DIR)
}

/// Load compiler tunables from a JSON file. Missing keys keep their
/// defaults; no file at all means the default config.
pub fn load_compiler_config(path: Option<&Path>) -> Result<CompilerConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(CompilerConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_projects_dir_wins() {
        let dir = resolve_projects_dir(Some(Path::new("/tmp/sites")));
        assert_eq!(dir, PathBuf::from("/tmp/sites"));
    }

    #[test]
    fn test_missing_config_is_default() {
        assert_eq!(load_compiler_config(None).unwrap(), CompilerConfig::default());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("press-stack.json");
        std::fs::write(&path, r#"{"main_landmark_id": "content"}"#).unwrap();
        let config = load_compiler_config(Some(&path)).unwrap();
        assert_eq!(config.main_landmark_id, "content");
        assert_eq!(config.prune_iterations, 5);
    }

    #[test]
    fn test_bad_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_compiler_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));

        let err = load_compiler_config(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
