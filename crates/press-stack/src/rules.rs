//! Ordered classification tables.
//!
//! Each table is a list of `(predicate, outcome)` rules evaluated top to
//! bottom; the first matching rule wins.

use crate::types::ComponentType;

/// What a rule may look at when classifying an element.
#[derive(Debug, Clone, Default)]
pub struct ElementFacts {
    pub tag: String,
    /// Lowercased raw `class` attribute.
    pub classes: String,
    /// Whether an `h1` exists anywhere below the element.
    pub has_h1: bool,
    /// Whether the element's extracted fields include a card repeater.
    pub has_card_repeater: bool,
}

impl ElementFacts {
    pub fn new(tag: &str, classes: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: classes.to_lowercase(),
            ..Self::default()
        }
    }

    fn class_contains(&self, needle: &str) -> bool {
        self.classes.contains(needle)
    }

    fn is_heading(&self) -> bool {
        matches!(self.tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    }
}

pub struct Rule<T> {
    pub name: &'static str,
    pub matches: fn(&ElementFacts) -> bool,
    pub outcome: T,
}

/// First rule in `table` that matches.
pub fn find_rule<'a, T>(table: &'a [Rule<T>], facts: &ElementFacts) -> Option<&'a Rule<T>> {
    table.iter().find(|rule| (rule.matches)(facts))
}

/// Outcome of the first rule in `table` that matches.
pub fn first_match<T: Copy>(table: &[Rule<T>], facts: &ElementFacts) -> Option<T> {
    find_rule(table, facts).map(|rule| rule.outcome)
}

// ───── semantic tag upgrades (div only) ─────

pub static SEMANTIC_UPGRADES: &[Rule<&str>] = &[
    Rule {
        name: "hero",
        matches: |f| f.class_contains("hero"),
        outcome: "section",
    },
    Rule {
        name: "nav",
        matches: |f| f.class_contains("nav"),
        outcome: "nav",
    },
    Rule {
        name: "footer",
        matches: |f| f.class_contains("footer"),
        outcome: "footer",
    },
    Rule {
        name: "main",
        matches: |f| f.class_contains("main"),
        outcome: "main",
    },
];

// ───── component classification ─────

fn is_hero(f: &ElementFacts) -> bool {
    matches!(f.tag.as_str(), "section" | "div" | "header")
        && f.has_h1
        && ["hero", "banner", "intro"].iter().any(|k| f.class_contains(k))
}

fn is_pricing(f: &ElementFacts) -> bool {
    f.class_contains("plan") || f.class_contains("pricing")
}

fn is_testimonial(f: &ElementFacts) -> bool {
    f.class_contains("testimonial")
}

fn is_form(f: &ElementFacts) -> bool {
    f.tag == "form"
}

fn is_card_collection(f: &ElementFacts) -> bool {
    f.has_card_repeater || f.class_contains("cards")
}

pub static COMPONENT_RULES: &[Rule<ComponentType>] = &[
    Rule {
        name: "hero",
        matches: is_hero,
        outcome: ComponentType::Hero,
    },
    Rule {
        name: "pricing",
        matches: is_pricing,
        outcome: ComponentType::Pricing,
    },
    Rule {
        name: "testimonial",
        matches: is_testimonial,
        outcome: ComponentType::Testimonial,
    },
    Rule {
        name: "form",
        matches: is_form,
        outcome: ComponentType::Form,
    },
    Rule {
        name: "card_collection",
        matches: is_card_collection,
        outcome: ComponentType::CardCollection,
    },
];

// ───── slug roles ─────

/// Semantic role of a leaf, used as the slug suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugRole {
    Title,
    Price,
    Description,
    Link,
    Item,
    Image,
    Content,
}

impl SlugRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Price => "price",
            Self::Description => "description",
            Self::Link => "link",
            Self::Item => "item",
            Self::Image => "image",
            Self::Content => "content",
        }
    }
}

pub static ROLE_RULES: &[Rule<SlugRole>] = &[
    Rule {
        name: "title-class",
        matches: |f| f.class_contains("title") || f.class_contains("heading"),
        outcome: SlugRole::Title,
    },
    Rule {
        name: "price-class",
        matches: |f| f.class_contains("price") || f.class_contains("cost"),
        outcome: SlugRole::Price,
    },
    Rule {
        name: "description-class",
        matches: |f| {
            f.class_contains("desc") || f.class_contains("text") || f.class_contains("content")
        },
        outcome: SlugRole::Description,
    },
    Rule {
        name: "link-class",
        matches: |f| {
            ["btn", "cta", "link"].iter().any(|k| f.class_contains(k)) || f.tag == "button"
        },
        outcome: SlugRole::Link,
    },
    Rule {
        name: "heading",
        matches: ElementFacts::is_heading,
        outcome: SlugRole::Title,
    },
    Rule {
        name: "paragraph",
        matches: |f| f.tag == "p",
        outcome: SlugRole::Description,
    },
    Rule {
        name: "list-item",
        matches: |f| f.tag == "li",
        outcome: SlugRole::Item,
    },
    Rule {
        name: "image",
        matches: |f| f.tag == "img",
        outcome: SlugRole::Image,
    },
    Rule {
        name: "anchor",
        matches: |f| f.tag == "a",
        outcome: SlugRole::Link,
    },
];

/// Role for a leaf element; `content` when no rule applies.
pub fn slug_role(facts: &ElementFacts) -> SlugRole {
    first_match(ROLE_RULES, facts).unwrap_or(SlugRole::Content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_upgrade_order() {
        let facts = ElementFacts::new("div", "hero main-nav");
        assert_eq!(first_match(SEMANTIC_UPGRADES, &facts), Some("section"));
        let facts = ElementFacts::new("div", "site-footer");
        assert_eq!(first_match(SEMANTIC_UPGRADES, &facts), Some("footer"));
        assert_eq!(first_match(SEMANTIC_UPGRADES, &ElementFacts::new("div", "card")), None);
    }

    #[test]
    fn test_hero_requires_h1() {
        let mut facts = ElementFacts::new("section", "hero");
        assert_eq!(first_match(COMPONENT_RULES, &facts), None);
        facts.has_h1 = true;
        assert_eq!(first_match(COMPONENT_RULES, &facts), Some(ComponentType::Hero));
    }

    #[test]
    fn test_component_rules() {
        let pricing = ElementFacts::new("div", "Pricing-Table");
        assert_eq!(first_match(COMPONENT_RULES, &pricing), Some(ComponentType::Pricing));
        let form = ElementFacts::new("form", "contact");
        assert_eq!(first_match(COMPONENT_RULES, &form), Some(ComponentType::Form));
        let mut grid = ElementFacts::new("div", "grid");
        grid.has_card_repeater = true;
        assert_eq!(first_match(COMPONENT_RULES, &grid), Some(ComponentType::CardCollection));
    }

    #[test]
    fn test_slug_roles() {
        assert_eq!(slug_role(&ElementFacts::new("p", "card-title")), SlugRole::Title);
        assert_eq!(slug_role(&ElementFacts::new("span", "price")), SlugRole::Price);
        assert_eq!(slug_role(&ElementFacts::new("button", "")), SlugRole::Link);
        assert_eq!(slug_role(&ElementFacts::new("h3", "")), SlugRole::Title);
        assert_eq!(slug_role(&ElementFacts::new("p", "")), SlugRole::Description);
        assert_eq!(slug_role(&ElementFacts::new("li", "")), SlugRole::Item);
        assert_eq!(slug_role(&ElementFacts::new("img", "")), SlugRole::Image);
        assert_eq!(slug_role(&ElementFacts::new("span", "")), SlugRole::Content);
    }
}
