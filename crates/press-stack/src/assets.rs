//! Local asset references rewritten to theme URLs.

use tracing::debug;

use crate::dom::Document;

const REMOTE_PREFIXES: &[&str] = &[
    "http://",
    "https://",
    "//",
    "data:",
    "mailto:",
    "tel:",
    "#",
    "javascript:",
];

/// Whether `path` points at a file shipped alongside the source HTML.
pub fn is_local_asset(path: &str) -> bool {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed.contains("<?php") {
        return false;
    }
    let lowered = trimmed.to_ascii_lowercase();
    !REMOTE_PREFIXES.iter().any(|p| lowered.starts_with(p))
}

/// Final path segment with any query string or fragment removed.
pub fn asset_file_name(path: &str) -> &str {
    let without_query = path.split(['?', '#']).next().unwrap_or(path);
    without_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(without_query)
}

/// Theme subdirectory for an asset file, by extension.
pub fn asset_subdir(file_name: &str) -> &'static str {
    let lowered = file_name.to_ascii_lowercase();
    if lowered.ends_with(".css") {
        "css/"
    } else if lowered.ends_with(".js") || lowered.ends_with(".mjs") {
        "js/"
    } else {
        ""
    }
}

/// Which attribute of which elements carries an asset path.
fn asset_targets(doc: &Document) -> Vec<(crate::dom::NodeId, &'static str)> {
    let mut targets = Vec::new();
    for node in doc.descendants(doc.root()) {
        match doc.tag(node) {
            Some("img") | Some("source") | Some("script") => targets.push((node, "src")),
            Some("link") => {
                let rel = doc.attr(node, "rel").unwrap_or_default().to_ascii_lowercase();
                if rel.split_whitespace().any(|r| r == "stylesheet" || r == "icon") {
                    targets.push((node, "href"));
                }
            }
            _ => {}
        }
    }
    targets
}

/// Rewrite every local asset reference in the document to
/// `{url_base}{css/|js/|}{file}` and return the original paths, deduplicated
/// in first-seen order.
pub fn rewrite_asset_paths(doc: &mut Document, url_base: &str) -> Vec<String> {
    let mut discovered: Vec<String> = Vec::new();
    for (node, attr) in asset_targets(doc) {
        let Some(original) = doc.attr(node, attr).map(str::to_string) else {
            continue;
        };
        if !is_local_asset(&original) {
            continue;
        }
        let file = asset_file_name(&original);
        if file.is_empty() {
            continue;
        }
        let rewritten = format!("{url_base}{}{file}", asset_subdir(file));
        doc.set_attr(node, attr, &rewritten);
        if !discovered.contains(&original) {
            discovered.push(original);
        }
    }
    debug!("Rewrote {} local asset paths", discovered.len());
    discovered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_detection() {
        assert!(is_local_asset("img/hero.png"));
        assert!(is_local_asset("./style.css"));
        assert!(!is_local_asset("https://cdn.example.com/a.js"));
        assert!(!is_local_asset("//cdn.example.com/a.js"));
        assert!(!is_local_asset("data:image/png;base64,AAAA"));
        assert!(!is_local_asset("<?php echo x(); ?>/a.png"));
        assert!(!is_local_asset(""));
    }

    #[test]
    fn test_file_name_and_subdir() {
        assert_eq!(asset_file_name("assets/css/main.css?v=3"), "main.css");
        assert_eq!(asset_file_name("app.js#x"), "app.js");
        assert_eq!(asset_subdir("main.CSS"), "css/");
        assert_eq!(asset_subdir("logo.svg"), "");
    }

    #[test]
    fn test_rewrites_head_and_body() {
        let mut doc = Document::parse(
            r#"<html><head><link rel="stylesheet" href="css/site.css"><script src="js/app.js"></script></head><body><img src="img/a.png"><img src="img/a.png"><img src="https://x.io/b.png"></body></html>"#,
        );
        let found = rewrite_asset_paths(&mut doc, "/wp/assets/");
        assert_eq!(found, vec!["css/site.css", "js/app.js", "img/a.png"]);
        let out = doc.to_html();
        assert!(out.contains(r#"<link rel="stylesheet" href="/wp/assets/css/site.css">"#));
        assert!(out.contains(r#"<script src="/wp/assets/js/app.js"></script>"#));
        assert!(out.contains(r#"<img src="/wp/assets/a.png">"#));
        assert!(out.contains(r#"<img src="https://x.io/b.png">"#));
    }

    #[test]
    fn test_rewrite_is_stable() {
        let base = crate::config::DEFAULT_ASSET_URL_BASE;
        let mut doc = Document::parse(r#"<img src="a.png">"#);
        rewrite_asset_paths(&mut doc, base);
        let once = doc.to_html();
        let mut again = Document::parse(&once);
        assert!(rewrite_asset_paths(&mut again, base).is_empty());
        assert_eq!(again.to_html(), once);
    }
}
