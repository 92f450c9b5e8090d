//! SEO pass: heading integrity, wrapper pruning, anchor misuse, semantic
//! tag upgrades and image alt inference.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompilerConfig;
use crate::dom::{Attribute, Document, NodeId};
use crate::normalize::flatten_wrappers;
use crate::rules::{find_rule, ElementFacts, SEMANTIC_UPGRADES};

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const ALT_CONTEXT: &[&str] = &["section", "div", "header", "main"];
const ALT_SOURCES: &[&str] = &["h1", "h2", "h3", "h4"];

/// One SEO mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationLog {
    pub issue_type: String,
    pub original_structure: String,
    pub optimized_structure: String,
    pub reason: String,
    #[serde(rename = "SEO_impact_score")]
    pub seo_impact_score: u32,
}

impl OptimizationLog {
    fn new(issue: &str, before: impl Into<String>, after: impl Into<String>, reason: impl Into<String>, score: u32) -> Self {
        Self {
            issue_type: issue.to_string(),
            original_structure: before.into(),
            optimized_structure: after.into(),
            reason: reason.into(),
            seo_impact_score: score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoReport {
    pub initial_score: i32,
    pub optimized_score: i32,
    pub delta: i32,
    pub logs: Vec<OptimizationLog>,
}

fn heading_level(doc: &Document, node: NodeId) -> Option<u8> {
    match doc.tag(node)?.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// +15 for exactly one `h1`, +10 when an `h1` exists and no heading skips
/// a level. A rough diagnostic, not a ranking model.
pub fn seo_score(doc: &Document) -> i32 {
    let h1_count = doc.elements_by_tag("h1").len();
    let levels: Vec<u8> = doc
        .elements_by_tags(HEADINGS)
        .into_iter()
        .filter_map(|h| heading_level(doc, h))
        .collect();
    let skipped = levels.windows(2).any(|w| w[1] > w[0] + 1);

    let mut score = 0;
    if h1_count == 1 {
        score += 15;
    }
    if !skipped && h1_count > 0 {
        score += 10;
    }
    score
}

/// Run the SEO pass over `doc` in place.
pub fn optimize_seo(doc: &mut Document, config: &CompilerConfig) -> SeoReport {
    let initial_score = seo_score(doc);
    let mut logs = Vec::new();

    dedupe_h1(doc, &mut logs);
    promote_first_h2(doc, &mut logs);
    repair_hierarchy(doc, &mut logs);

    let pruned = flatten_wrappers(doc, config.prune_iterations);
    if pruned > 0 {
        logs.push(OptimizationLog::new(
            "Structural Pruning",
            format!("{pruned} redundant div wrappers"),
            "flattened",
            "Removing wrappers that carry no attributes or text.",
            2,
        ));
    }

    fix_anchor_misuse(doc, &mut logs);
    upgrade_semantic_tags(doc, &mut logs);
    infer_image_alts(doc, &mut logs);

    let optimized_score = seo_score(doc);
    debug!(
        "SEO pass: {} changes, score {} -> {}",
        logs.len(),
        initial_score,
        optimized_score
    );
    SeoReport {
        initial_score,
        optimized_score,
        delta: optimized_score - initial_score,
        logs,
    }
}

fn dedupe_h1(doc: &mut Document, logs: &mut Vec<OptimizationLog>) {
    let h1s = doc.elements_by_tag("h1");
    for &extra in h1s.iter().skip(1) {
        doc.rename(extra, "h2");
        logs.push(OptimizationLog::new("Heading Integrity", "excess h1", "h2", "Deduplicating H1.", 5));
    }
}

fn promote_first_h2(doc: &mut Document, logs: &mut Vec<OptimizationLog>) {
    if !doc.elements_by_tag("h1").is_empty() {
        return;
    }
    if let Some(&first) = doc.elements_by_tag("h2").first() {
        doc.rename(first, "h1");
        logs.push(OptimizationLog::new("Heading Integrity", "no h1", "h1", "Promoting first H2.", 10));
    }
}

/// Demote the first heading that skips a level, then rescan from the top.
fn repair_hierarchy(doc: &mut Document, logs: &mut Vec<OptimizationLog>) {
    let cap = (doc.elements_by_tags(HEADINGS).len() * 6).max(1);
    for _ in 0..cap {
        let headings: Vec<(NodeId, u8)> = doc
            .elements_by_tags(HEADINGS)
            .into_iter()
            .filter_map(|h| heading_level(doc, h).map(|l| (h, l)))
            .collect();
        let skip = headings
            .windows(2)
            .find(|w| w[1].1 > w[0].1 + 1)
            .map(|w| (w[1].0, w[1].1, w[0].1 + 1));

        let Some((node, from, to)) = skip else {
            return;
        };
        let new_tag = format!("h{to}");
        doc.rename(node, &new_tag);
        logs.push(OptimizationLog::new(
            "Hierarchy Fix",
            format!("h{from}"),
            new_tag,
            "Fixing skipped level.",
            5,
        ));
    }
}

/// `<a href="#">` is a button pretending to be a link.
fn fix_anchor_misuse(doc: &mut Document, logs: &mut Vec<OptimizationLog>) {
    for anchor in doc.elements_by_tag("a") {
        if doc.attr(anchor, "href") != Some("#") {
            continue;
        }
        let mut attrs = vec![Attribute::new("type", "button")];
        if let Some(class) = doc.attr(anchor, "class") {
            attrs.push(Attribute::new("class", class));
        }
        attrs.extend(
            doc.attrs(anchor)
                .iter()
                .filter(|a| !matches!(a.name.as_str(), "href" | "target" | "rel" | "class" | "type"))
                .cloned(),
        );
        doc.rename(anchor, "button");
        doc.set_attrs(anchor, attrs);
        logs.push(OptimizationLog::new(
            "Anchor Integrity",
            "a[href=\"#\"]",
            "button[type=\"button\"]",
            "Anchors without a destination are buttons.",
            5,
        ));
    }
}

fn upgrade_semantic_tags(doc: &mut Document, logs: &mut Vec<OptimizationLog>) {
    for div in doc.elements_by_tag("div") {
        let facts = ElementFacts::new("div", doc.class_attr(div));
        let Some(rule) = find_rule(SEMANTIC_UPGRADES, &facts) else {
            continue;
        };
        if rule.outcome == "main" && !doc.elements_by_tag("main").is_empty() {
            debug!("Skipping main upgrade: a main landmark already exists");
            continue;
        }
        doc.rename(div, rule.outcome);
        logs.push(OptimizationLog::new(
            "Semantic Upgrade",
            "div",
            rule.outcome,
            format!("Structural class .{} implies specialized tag ({} rule).", facts.classes, rule.name),
            5,
        ));
    }
}

fn infer_image_alts(doc: &mut Document, logs: &mut Vec<OptimizationLog>) {
    for img in doc.elements_by_tag("img") {
        if doc.has_attr(img, "alt") {
            continue;
        }
        let context = doc
            .ancestor(img, ALT_CONTEXT)
            .and_then(|scope| doc.find_first(scope, |d, n| d.tag(n).is_some_and(|t| ALT_SOURCES.contains(&t))))
            .map(|heading| doc.text_content(heading).trim().to_string())
            .unwrap_or_default();
        if context.is_empty() {
            continue;
        }
        doc.set_attr(img, "alt", &context);
        logs.push(OptimizationLog::new(
            "Image SEO",
            "missing alt",
            format!("alt=\"{context}\""),
            "Contextual alt.",
            5,
        ));
    }
}
