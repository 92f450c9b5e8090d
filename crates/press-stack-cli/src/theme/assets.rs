use std::fs;
use std::path::{Path, PathBuf};

use press_stack::assets::{asset_file_name, asset_subdir};
use press_stack::{AssetRegistry, CompileResult};
use tracing::{debug, info, warn};

use super::ThemeWorkspace;

/// End of the enqueue function body in `inc/enqueue.php`.
const ENQUEUE_CLOSE: &str = "\n    }\n";

/// The `wp_enqueue_*` call for one stylesheet or script, or `None` for
/// assets that are not enqueued (images, fonts, ...).
pub fn enqueue_snippet(handle: &str, file: &str, subdir: &str) -> Option<String> {
    let mut out = String::new();
    match subdir {
        "css/" => {
            out.push_str(&format!("\n        // Auto-enqueued style: {file}\n"));
            out.push_str("        wp_enqueue_style(\n");
            out.push_str(&format!("            '{handle}',\n"));
            out.push_str(&format!("            get_template_directory_uri() . '/assets/css/{file}',\n"));
            out.push_str("            array(),\n");
            out.push_str("            wp_get_theme()->get('Version')\n");
            out.push_str("        );\n");
        }
        "js/" => {
            out.push_str(&format!("\n        // Auto-enqueued script: {file}\n"));
            out.push_str("        wp_enqueue_script(\n");
            out.push_str(&format!("            '{handle}',\n"));
            out.push_str(&format!("            get_template_directory_uri() . '/assets/js/{file}',\n"));
            out.push_str("            array(),\n");
            out.push_str("            wp_get_theme()->get('Version'),\n");
            out.push_str("            true\n");
            out.push_str("        );\n");
        }
        _ => return None,
    }
    Some(out)
}

/// Insert `snippet` just before the enqueue function closes. `None` when
/// the file has no recognizable function body.
pub fn inject_enqueue(content: &str, snippet: &str) -> Option<String> {
    let at = content.find(ENQUEUE_CLOSE)?;
    let mut out = String::with_capacity(content.len() + snippet.len());
    out.push_str(&content[..at]);
    out.push_str(snippet);
    out.push_str(&content[at..]);
    Some(out)
}

fn handle_for(file: &str) -> String {
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file);
    format!("press-stack-{stem}")
}

/// Where a referenced asset lives on disk. Root-relative references
/// (`/img/a.png`) resolve against the source root, not the filesystem root.
fn source_path(source_root: &Path, asset: &str) -> PathBuf {
    let path = asset.split(['?', '#']).next().unwrap_or(asset);
    source_root.join(path.trim_start_matches(['/', '\\']))
}

impl AssetRegistry for ThemeWorkspace {
    fn register_assets(&self, project_key: &str, assets: &[String]) -> CompileResult<()> {
        if assets.is_empty() {
            return Ok(());
        }
        let theme = self.theme_dir(project_key)?;
        let assets_dir = theme.join("assets");
        let enqueue_path = theme.join("inc").join("enqueue.php");
        let mut enqueue = if enqueue_path.exists() {
            fs::read_to_string(&enqueue_path)?
        } else {
            String::new()
        };
        let mut enqueue_changed = false;

        for asset in assets {
            let file = asset_file_name(asset);
            if file.is_empty() {
                continue;
            }
            let subdir = asset_subdir(file);
            let target_dir = assets_dir.join(subdir.trim_end_matches('/'));
            fs::create_dir_all(&target_dir)?;

            let source = source_path(self.source_root(), asset);
            let target = target_dir.join(file);
            if !source.exists() {
                warn!("Source asset not found: {}", source.display());
            } else if !target.exists() {
                fs::copy(&source, &target)?;
                debug!("Copied {} -> {}", source.display(), target.display());
            }

            let handle = handle_for(file);
            let Some(snippet) = enqueue_snippet(&handle, file, subdir) else {
                continue;
            };
            if enqueue.contains(&format!("'{handle}'")) {
                continue;
            }
            match inject_enqueue(&enqueue, &snippet) {
                Some(updated) => {
                    enqueue = updated;
                    enqueue_changed = true;
                    info!("Enqueued {} as '{}'", file, handle);
                }
                None => warn!(
                    "No insertion point in {} for '{}'",
                    enqueue_path.display(),
                    handle
                ),
            }
        }

        if enqueue_changed {
            fs::write(&enqueue_path, &enqueue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENQUEUE: &str = "<?php\nfunction f() {\n    if (true) {\n        wp_enqueue_style('base');\n    }\n}\n";

    #[test]
    fn test_snippets_by_kind() {
        let css = enqueue_snippet("press-stack-site", "site.css", "css/").unwrap();
        assert!(css.contains("wp_enqueue_style(\n            'press-stack-site',"));
        assert!(css.contains("'/assets/css/site.css'"));
        let js = enqueue_snippet("press-stack-app", "app.js", "js/").unwrap();
        assert!(js.contains("wp_enqueue_script("));
        assert!(js.contains("wp_get_theme()->get('Version'),\n            true\n"));
        assert!(enqueue_snippet("press-stack-logo", "logo.png", "").is_none());
    }

    #[test]
    fn test_injection_point() {
        let out = inject_enqueue(ENQUEUE, "\n        X();\n").unwrap();
        assert!(out.ends_with("wp_enqueue_style('base');\n        X();\n\n    }\n}\n"));
        assert!(inject_enqueue("<?php\n", "x").is_none());
    }

    #[test]
    fn test_handle_from_stem() {
        assert_eq!(handle_for("main.min.css"), "press-stack-main.min");
        assert_eq!(handle_for("app.js"), "press-stack-app");
    }

    #[test]
    fn test_root_relative_assets_resolve_under_source_root() {
        let root = Path::new("site");
        assert_eq!(source_path(root, "/img/a.png"), root.join("img/a.png"));
        assert_eq!(source_path(root, "css/site.css?v=2"), root.join("css/site.css"));
        assert_eq!(source_path(root, "js/app.js#main"), root.join("js/app.js"));
    }
}
