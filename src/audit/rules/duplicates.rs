//! Structural duplicate detection.
//!
//! Nodes are grouped by a type-only signature of their subtree, then split
//! into clusters of similar size. A cluster whose members also share their
//! text styles is a duplicate; one whose members differ only in text styles
//! is a variant candidate.

use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use crate::audit::{AuditContext, Rule};
use crate::error::Result;
use crate::types::{AuditFinding, GlobalVars, RuleId, SimplifiedNode};

use super::{DUPLICATE_STRUCTURES, VARIANT_CANDIDATES};

/// Minimum `min/max` ratio for two sizes to count as similar.
pub const DEFAULT_SIZE_TOLERANCE: f64 = 0.8;

fn structure_signature(node: &SimplifiedNode) -> String {
    let children: Vec<String> = node.children().iter().map(structure_signature).collect();
    format!("{}[{}]", node.node_type, children.join(","))
}

fn text_style_keys<'a>(node: &'a SimplifiedNode, acc: &mut BTreeSet<&'a str>) {
    node.visit(&mut |n| {
        if let Some(key) = n.text_style.as_deref() {
            acc.insert(key);
        }
    });
}

fn full_signature(node: &SimplifiedNode) -> String {
    let mut keys = BTreeSet::new();
    text_style_keys(node, &mut keys);
    let keys: Vec<&str> = keys.into_iter().collect();
    format!("{}|{}", structure_signature(node), keys.join(","))
}

/// Containers not already consolidated into a component, in pre-order.
fn candidates<'a>(ctx: &AuditContext<'a>) -> Vec<&'a SimplifiedNode> {
    fn walk<'a>(node: &'a SimplifiedNode, acc: &mut Vec<&'a SimplifiedNode>) {
        if node.is_component_like() {
            return;
        }
        if node.has_children() {
            acc.push(node);
        }
        for child in node.children() {
            walk(child, acc);
        }
    }

    let mut acc = Vec::new();
    for root in ctx.roots() {
        walk(root, &mut acc);
    }
    acc
}

fn dimensions(node: &SimplifiedNode, vars: &GlobalVars) -> (Option<f64>, Option<f64>) {
    node.layout
        .as_deref()
        .and_then(|key| vars.layout(key))
        .and_then(|layout| layout.dimensions)
        .map(|d| (d.width, d.height))
        .unwrap_or((None, None))
}

fn similar(a: Option<f64>, b: Option<f64>, tolerance: f64) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if hi <= 0.0 {
                return true;
            }
            lo / hi >= tolerance
        }
        _ => false,
    }
}

/// Greedy size clustering: each node joins the first cluster whose first
/// member has a similar width and height, or starts a new one.
pub fn cluster_by_dimensions<'a>(
    nodes: &[&'a SimplifiedNode],
    vars: &GlobalVars,
    tolerance: f64,
) -> Vec<Vec<&'a SimplifiedNode>> {
    let mut clusters: Vec<Vec<&'a SimplifiedNode>> = Vec::new();
    for &node in nodes {
        let (w, h) = dimensions(node, vars);
        let home = clusters.iter_mut().find(|cluster| {
            let (cw, ch) = dimensions(cluster[0], vars);
            similar(w, cw, tolerance) && similar(h, ch, tolerance)
        });
        match home {
            Some(cluster) => cluster.push(node),
            None => clusters.push(vec![node]),
        }
    }
    clusters
}

fn similar_clusters<'a>(
    ctx: &AuditContext<'a>,
    tolerance: f64,
) -> Vec<(String, Vec<&'a SimplifiedNode>)> {
    let mut groups: BTreeMap<String, Vec<&'a SimplifiedNode>> = BTreeMap::new();
    for node in candidates(ctx) {
        groups.entry(structure_signature(node)).or_default().push(node);
    }

    let mut clusters = Vec::new();
    for (signature, members) in groups {
        if members.len() < 2 {
            continue;
        }
        for cluster in cluster_by_dimensions(&members, ctx.global_vars(), tolerance) {
            if cluster.len() > 1 {
                clusters.push((signature.clone(), cluster));
            }
        }
    }
    clusters
}

fn cluster_finding(
    rule_id: RuleId,
    signature: &str,
    cluster: &[&SimplifiedNode],
    message: String,
) -> AuditFinding {
    let nodes: Vec<_> = cluster
        .iter()
        .map(|n| json!({ "id": n.id, "name": n.name }))
        .collect();
    AuditFinding::new(rule_id, cluster[0], message).with_more_infos(json!({
        "signature": signature,
        "nodes": nodes,
    }))
}

/// Same structure, size and text styles: a missing component.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateStructures {
    pub tolerance: f64,
}

impl Default for DuplicateStructures {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_SIZE_TOLERANCE,
        }
    }
}

impl Rule for DuplicateStructures {
    fn id(&self) -> RuleId {
        DUPLICATE_STRUCTURES
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        let mut findings = Vec::new();
        for (_, cluster) in similar_clusters(ctx, self.tolerance) {
            let mut groups: Vec<(String, Vec<&SimplifiedNode>)> = Vec::new();
            for node in cluster {
                let signature = full_signature(node);
                match groups.iter_mut().find(|(s, _)| *s == signature) {
                    Some((_, group)) => group.push(node),
                    None => groups.push((signature, vec![node])),
                }
            }
            for (signature, group) in groups.into_iter().filter(|(_, g)| g.len() > 1) {
                let message = format!(
                    "{} nodes share this structure and could be one component",
                    group.len()
                );
                findings.push(cluster_finding(self.id(), &signature, &group, message));
            }
        }
        Ok(findings)
    }
}

/// Same structure and size but different text styles: variants of one
/// component.
#[derive(Debug, Clone, Copy)]
pub struct VariantCandidates {
    pub tolerance: f64,
}

impl Default for VariantCandidates {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_SIZE_TOLERANCE,
        }
    }
}

impl Rule for VariantCandidates {
    fn id(&self) -> RuleId {
        VARIANT_CANDIDATES
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        let mut findings = Vec::new();
        for (signature, cluster) in similar_clusters(ctx, self.tolerance) {
            let distinct: BTreeSet<String> = cluster.iter().map(|n| full_signature(n)).collect();
            if distinct.len() < 2 {
                continue;
            }
            let message = format!(
                "{} nodes share a structure with {} text style combinations; consider variants",
                cluster.len(),
                distinct.len()
            );
            findings.push(cluster_finding(self.id(), &signature, &cluster, message));
        }
        Ok(findings)
    }
}
