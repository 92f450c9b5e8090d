//! Accessibility pass. Runs after the SEO pass on the same tree.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompilerConfig;
use crate::dom::{Attribute, Document, NodeId};
use crate::normalize::normalize_landmarks;

const INTERACTIVE: &[&str] = &["button", "a", "input", "select", "textarea"];
const FORM_CONTROLS: &[&str] = &["input", "select", "textarea"];
const CLICKABLE_PRIMITIVES: &[&str] = &["div", "span", "p"];

/// `(tag, role)` pairs where the role repeats the element's implicit role.
const REDUNDANT_ROLES: &[(&str, &str)] = &[
    ("main", "main"),
    ("nav", "navigation"),
    ("footer", "contentinfo"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityLog {
    pub issue_type: String,
    pub description: String,
    pub impact_score: u32,
}

impl AccessibilityLog {
    fn new(issue: &str, description: impl Into<String>, impact: u32) -> Self {
        Self {
            issue_type: issue.to_string(),
            description: description.into(),
            impact_score: impact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub initial_score: i32,
    pub optimized_score: i32,
    pub delta: i32,
    pub logs: Vec<AccessibilityLog>,
}

fn label_targets(doc: &Document) -> HashSet<String> {
    doc.elements_by_tag("label")
        .into_iter()
        .filter_map(|l| doc.attr(l, "for"))
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty<'a>(doc: &'a Document, node: NodeId, name: &str) -> Option<&'a str> {
    doc.attr(node, name).filter(|v| !v.is_empty())
}

fn coverage(covered: usize, total: usize, weight: f64) -> i32 {
    if total == 0 {
        return weight as i32;
    }
    (covered as f64 / total as f64 * weight).round() as i32
}

/// Alt coverage ×15, labelled controls ×20, single main +15, plus 50 for
/// checks this pass does not measure. Capped at 100.
pub fn accessibility_score(doc: &Document) -> i32 {
    let imgs = doc.elements_by_tag("img");
    let with_alt = imgs.iter().filter(|&&i| doc.has_attr(i, "alt")).count();

    let labels = label_targets(doc);
    let controls = doc.elements_by_tags(FORM_CONTROLS);
    let labelled = controls
        .iter()
        .filter(|&&c| {
            non_empty(doc, c, "id").is_some_and(|id| labels.contains(id))
                || non_empty(doc, c, "aria-label").is_some()
        })
        .count();

    let mut score = coverage(with_alt, imgs.len(), 15.0) + coverage(labelled, controls.len(), 20.0);
    if doc.elements_by_tag("main").len() == 1 {
        score += 15;
    }
    score += 50;
    score.min(100)
}

/// Run the accessibility pass over `doc` in place.
pub fn optimize_accessibility(doc: &mut Document, config: &CompilerConfig) -> AccessibilityReport {
    let initial_score = accessibility_score(doc);
    let mut logs = Vec::new();

    unhide_interactive(doc, &mut logs);
    convert_clickable_primitives(doc, &mut logs);

    let landmarks = normalize_landmarks(doc, &config.main_landmark_id);
    if landmarks.demoted > 0 {
        logs.push(AccessibilityLog::new(
            "Landmark Violation",
            "Deduplicated multiple <main> landmarks.",
            10,
        ));
    }
    if landmarks.synthesized {
        logs.push(AccessibilityLog::new("Missing Landmark", "Added <main> wrapper.", 10));
    }

    label_form_controls(doc, &mut logs);
    mark_decorative_images(doc, &mut logs);
    drop_redundant_roles(doc, &mut logs);

    let optimized_score = accessibility_score(doc);
    debug!(
        "Accessibility pass: {} changes, score {} -> {}",
        logs.len(),
        initial_score,
        optimized_score
    );
    AccessibilityReport {
        initial_score,
        optimized_score,
        delta: optimized_score - initial_score,
        logs,
    }
}

fn unhide_interactive(doc: &mut Document, logs: &mut Vec<AccessibilityLog>) {
    let candidates: Vec<NodeId> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|&n| {
            doc.tag(n).is_some_and(|t| INTERACTIVE.contains(&t)) || doc.attr(n, "role") == Some("button")
        })
        .collect();
    for node in candidates {
        if doc.attr(node, "aria-hidden") == Some("true") {
            doc.remove_attr(node, "aria-hidden");
            logs.push(AccessibilityLog::new(
                "A11y Conflict",
                "Removed aria-hidden from interactive element.",
                10,
            ));
        }
    }
}

/// `div`/`span`/`p` with a click handler become real buttons. The handler
/// moves to the end of the attribute list.
fn convert_clickable_primitives(doc: &mut Document, logs: &mut Vec<AccessibilityLog>) {
    for node in doc.elements_by_tags(CLICKABLE_PRIMITIVES) {
        let Some(handler) = doc.attr(node, "onclick").map(str::to_string) else {
            continue;
        };
        let tag = doc.tag(node).unwrap_or_default().to_string();
        let mut attrs = vec![Attribute::new("type", "button")];
        attrs.extend(
            doc.attrs(node)
                .iter()
                .filter(|a| a.name != "onclick" && a.name != "type")
                .cloned(),
        );
        attrs.push(Attribute::new("onclick", handler));
        doc.rename(node, "button");
        doc.set_attrs(node, attrs);
        logs.push(AccessibilityLog::new(
            "Primitive Conversion",
            format!("Converted clickable <{tag}> to <button>."),
            10,
        ));
    }
}

fn label_form_controls(doc: &mut Document, logs: &mut Vec<AccessibilityLog>) {
    let labels = label_targets(doc);
    for control in doc.elements_by_tags(FORM_CONTROLS) {
        if doc.tag(control) == Some("input") && doc.attr(control, "type") == Some("hidden") {
            continue;
        }
        let has_label = non_empty(doc, control, "id").is_some_and(|id| labels.contains(id))
            || non_empty(doc, control, "aria-label").is_some()
            || non_empty(doc, control, "placeholder").is_some();
        if has_label {
            continue;
        }
        let label = non_empty(doc, control, "name")
            .or_else(|| non_empty(doc, control, "type"))
            .unwrap_or("form field")
            .to_string();
        doc.set_attr(control, "aria-label", &label);
        logs.push(AccessibilityLog::new(
            "Missing Label",
            format!("Added aria-label to {label}."),
            10,
        ));
    }
}

fn mark_decorative_images(doc: &mut Document, logs: &mut Vec<AccessibilityLog>) {
    for img in doc.elements_by_tag("img") {
        if non_empty(doc, img, "alt").is_some() {
            continue;
        }
        if doc.attr(img, "alt").is_some() && doc.attr(img, "role") == Some("presentation") {
            continue;
        }
        doc.set_attr(img, "alt", "");
        doc.set_attr(img, "role", "presentation");
        logs.push(AccessibilityLog::new("Image A11y", "Marked image as decorative.", 5));
    }
}

fn drop_redundant_roles(doc: &mut Document, logs: &mut Vec<AccessibilityLog>) {
    for &(tag, role) in REDUNDANT_ROLES {
        for node in doc.elements_by_tag(tag) {
            if doc.attr(node, "role") == Some(role) {
                doc.remove_attr(node, "role");
                logs.push(AccessibilityLog::new(
                    "Redundant ARIA",
                    format!("Removed redundant role from <{tag}>."),
                    2,
                ));
            }
        }
    }
}
