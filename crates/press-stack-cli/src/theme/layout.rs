use press_stack::{split_layout, CompileResult, LayoutExtraction, LayoutExtractor};
use tracing::info;

use super::{is_replaceable, write_file, ThemeWorkspace};

/// Markers of a layout file nobody has edited yet.
const LAYOUT_MARKERS: &[&str] = &[
    "<!-- WP_SHELL_PLACEHOLDER -->",
    "// Theme Header",
    "// Theme Footer",
];

/// `header.php`: document head, body open hooks, then the page header.
pub fn header_php(header: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html <?php language_attributes(); ?>>\n");
    out.push_str("<head>\n");
    out.push_str("    <meta charset=\"<?php bloginfo( 'charset' ); ?>\">\n");
    out.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("    <?php wp_head(); ?>\n");
    out.push_str("</head>\n");
    out.push_str("<body <?php body_class(); ?>>\n");
    out.push_str("<?php wp_body_open(); ?>\n");
    out.push_str(header);
    out
}

/// `footer.php`: the page footer, then the closing hooks.
pub fn footer_php(footer: &str) -> String {
    format!("{footer}\n<?php wp_footer(); ?>\n</body>\n</html>")
}

impl LayoutExtractor for ThemeWorkspace {
    fn extract_layout(&self, document: &str, project_key: &str) -> CompileResult<LayoutExtraction> {
        let theme = self.theme_dir(project_key)?;
        let split = split_layout(document);

        if let Some(header) = &split.header {
            let path = theme.join("header.php");
            if is_replaceable(&path, LAYOUT_MARKERS)? {
                write_file(&path, &header_php(header))?;
                info!("Extracted site header into {}", path.display());
            }
        }
        if let Some(footer) = &split.footer {
            let path = theme.join("footer.php");
            if is_replaceable(&path, LAYOUT_MARKERS)? {
                write_file(&path, &footer_php(footer))?;
                info!("Extracted site footer into {}", path.display());
            }
        }

        Ok(LayoutExtraction {
            header_present: split.header.is_some(),
            footer_present: split.footer.is_some(),
            stripped_document: split.stripped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_header_template_shape() {
        let php = header_php("<header>H</header>");
        assert!(php.starts_with("<!DOCTYPE html>\n<html <?php language_attributes(); ?>>"));
        assert!(php.ends_with("<?php wp_body_open(); ?>\n<header>H</header>"));
        assert_eq!(footer_php("<footer>F</footer>"), "<footer>F</footer>\n<?php wp_footer(); ?>\n</body>\n</html>");
    }

    #[test]
    fn test_writes_and_strips() {
        let dir = tempfile::tempdir().unwrap();
        let ws = ThemeWorkspace::new(dir.path());
        let out = ws
            .extract_layout("<header>Top</header><p>Body</p><footer>Bottom</footer>", "site")
            .unwrap();
        assert_eq!(out.stripped_document, "<p>Body</p>");
        assert!(out.header_present && out.footer_present);
        let header = fs::read_to_string(dir.path().join("site/theme/header.php")).unwrap();
        assert!(header.ends_with("<header>Top</header>"));
    }

    #[test]
    fn test_customized_layout_kept() {
        let dir = tempfile::tempdir().unwrap();
        let ws = ThemeWorkspace::new(dir.path());
        let footer = dir.path().join("site/theme/footer.php");
        write_file(&footer, "<footer>hand made</footer>").unwrap();
        let out = ws.extract_layout("<p>x</p><footer>New</footer>", "site").unwrap();
        assert!(out.footer_present);
        assert!(!out.header_present);
        assert_eq!(fs::read_to_string(&footer).unwrap(), "<footer>hand made</footer>");
        assert!(!dir.path().join("site/theme/header.php").exists());
    }
}
