//! Structural normalization: a single `main` landmark and no redundant
//! wrapper `div`s.

use tracing::debug;

use crate::dom::{Attribute, Document};

/// What [`normalize_landmarks`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandmarkOutcome {
    /// Extra `main` elements renamed to `div`.
    pub demoted: usize,
    /// Whether a `main` was created around the body content.
    pub synthesized: bool,
}

/// Keep the first `main` and demote the rest to `div`; if there is none,
/// wrap the whole body content in `<main id="{main_id}">`.
pub fn normalize_landmarks(doc: &mut Document, main_id: &str) -> LandmarkOutcome {
    let mut outcome = LandmarkOutcome::default();
    let mains = doc.elements_by_tag("main");

    if mains.len() > 1 {
        for &extra in &mains[1..] {
            doc.rename(extra, "div");
            outcome.demoted += 1;
        }
        debug!("Demoted {} extra <main> elements", outcome.demoted);
    } else if mains.is_empty() {
        if let Some(body) = doc.body() {
            let main = doc.create_element("main", vec![Attribute::new("id", main_id)]);
            doc.wrap_children(body, main);
            outcome.synthesized = true;
            debug!("Synthesized <main id=\"{}\">", main_id);
        }
    }
    outcome
}

/// A `div` carrying no attributes and no direct text adds nothing but depth.
fn is_redundant_wrapper(doc: &Document, node: crate::dom::NodeId) -> bool {
    doc.tag(node) == Some("div") && doc.attrs(node).is_empty() && !doc.has_direct_text(node)
}

/// Remove redundant wrapper `div`s until a fixpoint or `cap` iterations.
///
/// Wrappers are visited innermost first. One with no element children is
/// deleted; one with a single element child is replaced by that child.
/// Returns the number of wrappers removed.
pub fn flatten_wrappers(doc: &mut Document, cap: usize) -> usize {
    let mut removed = 0;
    for iteration in 0..cap {
        let mut changed = false;
        let divs = doc.elements_by_tag("div");
        for &div in divs.iter().rev() {
            if !doc.is_attached(div) || !is_redundant_wrapper(doc, div) {
                continue;
            }
            let kids = doc.element_children(div);
            match kids.as_slice() {
                [] => doc.detach(div),
                [only] => doc.replace_with(div, *only),
                _ => continue,
            }
            removed += 1;
            changed = true;
        }
        if !changed {
            debug!("Wrapper flattening settled after {} iterations", iteration + 1);
            break;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesizes_main() {
        let mut doc = Document::parse("<h1>Hi</h1><p>x</p>");
        let outcome = normalize_landmarks(&mut doc, "main-content");
        assert!(outcome.synthesized);
        assert_eq!(doc.to_html(), r#"<main id="main-content"><h1>Hi</h1><p>x</p></main>"#);
    }

    #[test]
    fn test_demotes_extra_mains() {
        let mut doc = Document::parse(r#"<main>a</main><main class="b">b</main>"#);
        let outcome = normalize_landmarks(&mut doc, "main-content");
        assert_eq!(outcome.demoted, 1);
        assert_eq!(doc.to_html(), r#"<main>a</main><div class="b">b</div>"#);
    }

    #[test]
    fn test_single_main_untouched() {
        let mut doc = Document::parse("<main><p>x</p></main>");
        assert_eq!(normalize_landmarks(&mut doc, "m"), LandmarkOutcome::default());
        assert_eq!(doc.to_html(), "<main><p>x</p></main>");
    }

    #[test]
    fn test_flattens_nested_wrappers() {
        let mut doc = Document::parse(
            "<div><div><div><div><div><div><section><p>x</p></section></div></div></div></div></div></div>",
        );
        let removed = flatten_wrappers(&mut doc, 10);
        assert_eq!(removed, 6);
        assert_eq!(doc.to_html(), "<section><p>x</p></section>");
    }

    #[test]
    fn test_keeps_wrappers_with_attributes_or_text() {
        let html = r#"<div class="card"><p>a</p></div><div>text<p>b</p></div><div onclick="go()"><span>c</span></div>"#;
        let mut doc = Document::parse(html);
        assert_eq!(flatten_wrappers(&mut doc, 10), 0);
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_deletes_empty_wrappers_and_keeps_multi_child() {
        let mut doc = Document::parse("<div></div><div><p>a</p><p>b</p></div>");
        assert_eq!(flatten_wrappers(&mut doc, 10), 1);
        assert_eq!(doc.to_html(), "<div><p>a</p><p>b</p></div>");
    }

    #[test]
    fn test_cap_bounds_work() {
        let mut doc = Document::parse("<div><div><p>x</p></div></div>");
        flatten_wrappers(&mut doc, 0);
        assert_eq!(doc.elements_by_tag("div").len(), 2);
    }
}
