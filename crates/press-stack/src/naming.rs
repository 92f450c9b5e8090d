//! Identifier helpers shared by extraction and metadata generation.

/// Class prefixes that carry no meaning of their own.
const NOISE_PREFIXES: &[&str] = &["section_", "block_", "wrapper_", "container_", "group_"];

/// `heroTitle`, `hero-title` and `Hero Title` all become `hero_title`.
pub fn to_snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if prev.is_some_and(|p| p.is_ascii_lowercase()) && c.is_ascii_uppercase() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(c);
    }
    out.trim_matches('_').to_string()
}

/// Snake-cased first class token with structural noise prefixes removed.
/// Empty when there is no class.
pub fn clean_class_name(classes: &str) -> String {
    let Some(primary) = classes.split_whitespace().next() else {
        return String::new();
    };
    let snake = to_snake_case(primary);
    let stripped = NOISE_PREFIXES
        .iter()
        .find_map(|p| snake.strip_prefix(p))
        .unwrap_or(&snake);
    stripped.trim_matches('_').to_string()
}

/// `categories` → `category`, `features` → `feature`, `class` unchanged.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// `card_title` → `Card Title`.
pub fn title_case(slug: &str) -> String {
    slug.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A slug usable as a PHP variable name.
pub fn php_variable(slug: &str) -> String {
    if slug.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{slug}")
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("heroTitle"), "hero_title");
        assert_eq!(to_snake_case("card-alt"), "card_alt");
        assert_eq!(to_snake_case("  Home Page!! "), "home_page");
        assert_eq!(to_snake_case("a__b"), "a_b");
        assert_eq!(to_snake_case("--"), "");
    }

    #[test]
    fn test_clean_class_name() {
        assert_eq!(clean_class_name("card featured"), "card");
        assert_eq!(clean_class_name("section-hero"), "hero");
        assert_eq!(clean_class_name("wrapper_cards"), "cards");
        assert_eq!(clean_class_name("container"), "container");
        assert_eq!(clean_class_name(""), "");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("features"), "feature");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("class"), "class");
        assert_eq!(singularize("items"), "item");
        assert_eq!(singularize("card"), "card");
    }

    #[test]
    fn test_title_case_and_php_variable() {
        assert_eq!(title_case("card_title"), "Card Title");
        assert_eq!(php_variable("3col_image"), "_3col_image");
        assert_eq!(php_variable("hero_image"), "hero_image");
    }
}
