use press_stack::naming::title_case;
use press_stack::{CompileResult, ThemeShell};
use tracing::{debug, info};

use super::{is_replaceable, write_file, ThemeWorkspace};

/// Theme-relative paths of every scaffold file.
pub const SHELL_FILES: &[&str] = &[
    "style.css",
    "index.php",
    "functions.php",
    "inc/setup.php",
    "inc/enqueue.php",
    "inc/menus.php",
    "inc/supports.php",
];

/// Markers of an untouched stub. Generated files carry none of these, so
/// later asset injections into them survive.
const SHELL_MARKERS: &[&str] = &[
    "<!-- THEME_SHELL_PLACEHOLDER -->",
    "// Theme Functions",
    "// Theme Setup",
    "// Theme Enqueue",
    "// Theme Menus",
    "// Theme Supports",
];

fn style_css(project_key: &str) -> String {
    let name = title_case(&project_key.replace('-', "_"));
    let mut out = String::new();
    out.push_str("/*\n");
    out.push_str(&format!("Theme Name: {name}\n"));
    out.push_str("Author: press-stack\n");
    out.push_str("Version: 1.0.0\n");
    out.push_str(&format!("Text Domain: {project_key}\n"));
    out.push_str("*/\n");
    out
}

const INDEX_PHP: &str = "<?php get_header(); ?>

<main id=\"main-content\">
<?php if (have_posts()) : while (have_posts()) : the_post(); ?>
    <?php the_content(); ?>
<?php endwhile; endif; ?>
</main>

<?php get_footer(); ?>
";

const FUNCTIONS_PHP: &str = "<?php
/**
 * Loads the modular theme includes.
 */

require_once get_template_directory() . '/inc/setup.php';
require_once get_template_directory() . '/inc/enqueue.php';
require_once get_template_directory() . '/inc/menus.php';
require_once get_template_directory() . '/inc/supports.php';
";

const SETUP_PHP: &str = "<?php
/**
 * Core theme features.
 */

if (!function_exists('press_stack_setup')) {
    function press_stack_setup() {
        add_theme_support('automatic-feed-links');
        add_theme_support('title-tag');
        add_theme_support('post-thumbnails');
        add_theme_support('html5', array(
            'search-form',
            'comment-form',
            'comment-list',
            'gallery',
            'caption',
            'style',
            'script',
        ));
        add_theme_support('customize-selective-refresh-widgets');
    }
}
add_action('after_setup_theme', 'press_stack_setup');
";

const ENQUEUE_PHP: &str = "<?php
/**
 * Front-end styles and scripts. Compiled pages append their assets here.
 */

if (!function_exists('press_stack_enqueue_assets')) {
    function press_stack_enqueue_assets() {
        wp_enqueue_style(
            'press-stack-style',
            get_stylesheet_uri(),
            array(),
            wp_get_theme()->get('Version')
        );
    }
}
add_action('wp_enqueue_scripts', 'press_stack_enqueue_assets');
";

const MENUS_PHP: &str = "<?php
/**
 * Navigation menu locations.
 */

if (!function_exists('press_stack_register_menus')) {
    function press_stack_register_menus() {
        register_nav_menus(array(
            'primary' => esc_html__('Primary Menu', 'press-stack'),
            'footer'  => esc_html__('Footer Menu', 'press-stack'),
        ));
    }
}
add_action('after_setup_theme', 'press_stack_register_menus');
";

const SUPPORTS_PHP: &str = "<?php
/**
 * Block editor support.
 */

if (!function_exists('press_stack_theme_supports')) {
    function press_stack_theme_supports() {
        add_theme_support('wp-block-styles');
        add_theme_support('align-wide');
        add_theme_support('editor-styles');
        add_theme_support('responsive-embeds');
    }
}
add_action('after_setup_theme', 'press_stack_theme_supports');
";

fn shell_content(file: &str, project_key: &str) -> String {
    match file {
        "style.css" => style_css(project_key),
        "index.php" => INDEX_PHP.to_string(),
        "functions.php" => FUNCTIONS_PHP.to_string(),
        "inc/setup.php" => SETUP_PHP.to_string(),
        "inc/enqueue.php" => ENQUEUE_PHP.to_string(),
        "inc/menus.php" => MENUS_PHP.to_string(),
        _ => SUPPORTS_PHP.to_string(),
    }
}

impl ThemeShell for ThemeWorkspace {
    fn ensure_theme_shell(&self, project_key: &str) -> CompileResult<()> {
        let theme = self.theme_dir(project_key)?;
        let mut written = 0;
        for &file in SHELL_FILES {
            let path = theme.join(file);
            if !is_replaceable(&path, SHELL_MARKERS)? {
                continue;
            }
            write_file(&path, &shell_content(file, project_key))?;
            written += 1;
        }
        if written > 0 {
            info!("Theme shell for '{}': {} files written", project_key, written);
        } else {
            debug!("Theme shell for '{}' already in place", project_key);
        }
        Ok(())
    }
}
