//! Filesystem collaborator tests: a full project compile against a
//! temporary projects directory, repeated to check nothing is duplicated.

use std::fs;
use std::path::Path;

use press_stack::{CompileRequest, Compiler, TemplateKind};
use press_stack_cli::{write_artifacts, ThemeWorkspace};

// ─────────────────────── helpers ───────────────────────

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<link rel="stylesheet" href="css/site.css">
<script src="js/app.js"></script>
</head>
<body>
<header class="site-header"><a href="/">Home</a></header>
<section class="hero"><h1>Welcome</h1><img src="img/hero.png" alt="Hero"></section>
<footer class="site-footer"><p>Bye</p></footer>
</body>
</html>"#;

/// Lay out source assets next to the page and return a workspace rooted there.
fn setup(root: &Path) -> ThemeWorkspace {
    let src = root.join("src");
    fs::create_dir_all(src.join("css")).unwrap();
    fs::create_dir_all(src.join("js")).unwrap();
    fs::create_dir_all(src.join("img")).unwrap();
    fs::write(src.join("css/site.css"), "body{}").unwrap();
    fs::write(src.join("js/app.js"), "console.log(1)").unwrap();
    fs::write(src.join("img/hero.png"), [0u8, 1, 2]).unwrap();
    ThemeWorkspace::new(root.join("projects")).with_source_root(src)
}

fn compiler(ws: &ThemeWorkspace) -> Compiler {
    Compiler::default()
        .with_theme_shell(Box::new(ws.clone()))
        .with_asset_registry(Box::new(ws.clone()))
        .with_layout_extractor(Box::new(ws.clone()))
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

// ═══════════════════════════════════════════════════════
// PROJECT COMPILE
// ═══════════════════════════════════════════════════════

/// Test 1: a page compile scaffolds the theme, copies assets and splits layout.
#[test]
fn test_01_page_compile_populates_theme() {
    let dir = tempfile::tempdir().unwrap();
    let ws = setup(dir.path());
    let request = CompileRequest::new(PAGE, "Landing", TemplateKind::DocumentWithIdentity).with_project("acme");
    let result = compiler(&ws).compile(&request).unwrap();

    let theme = dir.path().join("projects/acme/theme");
    for file in ["style.css", "functions.php", "inc/enqueue.php", "header.php", "footer.php"] {
        assert!(theme.join(file).exists(), "{file} missing");
    }
    assert!(theme.join("assets/css/site.css").exists());
    assert!(theme.join("assets/js/app.js").exists());
    assert!(theme.join("assets/hero.png").exists());

    assert!(result.header_extracted);
    assert!(result.footer_extracted);
    assert!(!result.optimized_html.contains("site-header"));
    assert!(read(theme.join("header.php")).contains(r#"<header class="site-header">"#));
    assert!(read(theme.join("footer.php")).starts_with(r#"<footer class="site-footer">"#));
}

/// Test 2: stylesheets and scripts are enqueued exactly once.
#[test]
fn test_02_enqueue_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let ws = setup(dir.path());
    let request = CompileRequest::new(PAGE, "Landing", TemplateKind::DocumentWithIdentity).with_project("acme");
    let compiler = compiler(&ws);
    compiler.compile(&request).unwrap();
    compiler.compile(&request).unwrap();

    let enqueue = read(dir.path().join("projects/acme/theme/inc/enqueue.php"));
    assert_eq!(enqueue.matches("'press-stack-site'").count(), 1);
    assert_eq!(enqueue.matches("'press-stack-app'").count(), 1);
    assert!(!enqueue.contains("press-stack-hero"));
    assert!(enqueue.contains("get_template_directory_uri() . '/assets/js/app.js'"));
}

/// Test 3: a customized header survives a recompile.
#[test]
fn test_03_custom_layout_survives() {
    let dir = tempfile::tempdir().unwrap();
    let ws = setup(dir.path());
    let header = dir.path().join("projects/acme/theme/header.php");
    fs::create_dir_all(header.parent().unwrap()).unwrap();
    fs::write(&header, "<?php /* hand tuned */ ?>").unwrap();

    let request = CompileRequest::new(PAGE, "Landing", TemplateKind::DocumentByConvention).with_project("acme");
    let result = compiler(&ws).compile(&request).unwrap();
    assert!(result.header_extracted);
    assert_eq!(read(&header), "<?php /* hand tuned */ ?>");
}

/// Test 4: a missing source asset is tolerated.
#[test]
fn test_04_missing_asset_warns_only() {
    let dir = tempfile::tempdir().unwrap();
    let ws = setup(dir.path());
    let request = CompileRequest::new(r#"<img src="img/absent.png" alt="x">"#, "Gap", TemplateKind::Fragment)
        .with_project("acme");
    let result = compiler(&ws).compile(&request).unwrap();
    assert_eq!(result.asset_dependencies, vec!["img/absent.png"]);
    assert!(!dir.path().join("projects/acme/theme/assets/absent.png").exists());
}

// ═══════════════════════════════════════════════════════
// ARTIFACTS
// ═══════════════════════════════════════════════════════

/// Test 5: artifacts land where WordPress and ACF look for them.
#[test]
fn test_05_artifacts_written_into_theme() {
    let dir = tempfile::tempdir().unwrap();
    let ws = setup(dir.path());
    let request = CompileRequest::new(PAGE, "Landing Page", TemplateKind::DocumentWithIdentity).with_project("acme");
    let result = compiler(&ws).compile(&request).unwrap();
    let theme = ws.theme_dir("acme").unwrap();
    write_artifacts(&theme, &request, &result).unwrap();

    let php = read(theme.join("page-landing-page.php"));
    assert!(php.starts_with("<?php\n/*\nTemplate Name: Landing Page\n*/"));
    let acf: serde_json::Value = serde_json::from_str(&read(theme.join("inc/acf-json/acf-landing-page.json"))).unwrap();
    assert_eq!(acf["key"], "group_landing_page");
    assert_eq!(read(theme.join("inc/source-html/source-landing-page.html")), PAGE);
}

/// Test 6: a fragment never touches layout files.
#[test]
fn test_06_fragment_leaves_layout_alone() {
    let dir = tempfile::tempdir().unwrap();
    let ws = setup(dir.path());
    let request = CompileRequest::new(PAGE, "Snippet", TemplateKind::Fragment).with_project("acme");
    let result = compiler(&ws).compile(&request).unwrap();
    assert!(!result.header_extracted);
    assert!(!dir.path().join("projects/acme/theme/header.php").exists());
    assert!(dir.path().join("projects/acme/theme/inc/setup.php").exists());
}

/// Test 7: a root-relative asset is found under the source root.
#[test]
fn test_07_root_relative_asset_is_copied() {
    let dir = tempfile::tempdir().unwrap();
    let ws = setup(dir.path());
    let request = CompileRequest::new(r#"<img src="/img/hero.png" alt="Hero">"#, "Root", TemplateKind::Fragment)
        .with_project("acme");
    let result = compiler(&ws).compile(&request).unwrap();
    assert_eq!(result.asset_dependencies, vec!["/img/hero.png"]);
    assert!(dir.path().join("projects/acme/theme/assets/hero.png").exists());
}
