//! LLM-assisted analyzers.
//!
//! Both analyzers are best effort: a missing client, too little input, a
//! failed call or a malformed reply all produce no findings.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::llm::LlmClient;
use crate::types::{AuditFinding, RuleId, SimplifiedNode};

use super::rules::{is_blank, AI_DESCRIPTION_SUGGESTIONS, AI_PATTERN_DETECTION};
use super::{AiRule, AuditContext};

const MIN_PATTERN_CANDIDATES: usize = 2;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// One pattern instance as returned by the model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    pub component_name: String,
    #[serde(default)]
    pub description: String,
    pub root_node_id: String,
    #[serde(default)]
    pub root_node_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DescriptionSuggestion {
    id: String,
    description: String,
}

pub fn ai_rules() -> Vec<Box<dyn AiRule>> {
    vec![
        Box::new(PatternDetection),
        Box::new(DescriptionSuggestions),
    ]
}

/// Container nodes outside components, in pre-order.
fn pattern_candidates<'a>(ctx: &AuditContext<'a>) -> Vec<&'a SimplifiedNode> {
    let mut acc = Vec::new();
    let mut stack: Vec<&SimplifiedNode> = ctx.roots().iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.is_component_like() {
            continue;
        }
        if node.has_children() {
            acc.push(node);
        }
        stack.extend(node.children().iter().rev());
    }
    acc
}

/// Compact view of a node for the prompt. Component subtrees are cut at
/// their root.
fn project(node: &SimplifiedNode) -> Value {
    let mut out = Map::new();
    out.insert("id".into(), json!(node.id));
    out.insert("name".into(), json!(node.name));
    out.insert("type".into(), json!(node.node_type));
    for (field, value) in [
        ("text", &node.text),
        ("textStyle", &node.text_style),
        ("fills", &node.fills),
        ("strokes", &node.strokes),
        ("layout", &node.layout),
    ] {
        if let Some(value) = value {
            out.insert(field.into(), json!(value));
        }
    }
    if !node.is_component_like() && node.has_children() {
        let children: Vec<Value> = node.children().iter().map(project).collect();
        out.insert("children".into(), Value::Array(children));
    }
    Value::Object(out)
}

fn pattern_prompt(ctx: &AuditContext<'_>) -> String {
    let nodes: Vec<Value> = ctx.roots().iter().map(project).collect();
    let vars = serde_json::to_string(ctx.global_vars()).unwrap_or_default();
    format!(
        "You are auditing a Figma design. Find groups of nodes that repeat the same \
         visual pattern and should become one reusable component.\n\
         Reply with a JSON array; one element per node that is an instance of a pattern:\n\
         [{{\"componentName\": string, \"description\": string, \"rootNodeId\": string, \"rootNodeName\": string}}]\n\
         Only use node ids that appear below. Reply with [] if there is no pattern.\n\n\
         Nodes:\n{}\n\nStyles (globalVars):\n{}",
        Value::Array(nodes),
        vars
    )
}

/// The reply may be a bare array or an object wrapping one.
fn reply_items(reply: Value) -> Option<Vec<Value>> {
    match reply {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.into_iter().find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}

fn parse_items<T: for<'de> Deserialize<'de>>(reply: Value) -> Vec<T> {
    let Some(items) = reply_items(reply) else {
        warn!("LLM reply has no array payload");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(error = %e, "skipping malformed LLM item");
                None
            }
        })
        .collect()
}

fn subtree(node: &SimplifiedNode) -> Value {
    let mut out = json!({ "id": node.id, "name": node.name });
    if node.has_children() {
        out["children"] = Value::Array(node.children().iter().map(subtree).collect());
    }
    out
}

/// Group matches by component name, largest group first.
fn group_patterns(matches: Vec<PatternMatch>) -> Vec<(String, Vec<PatternMatch>)> {
    let mut groups: BTreeMap<String, Vec<PatternMatch>> = BTreeMap::new();
    for m in matches {
        let bucket = groups.entry(m.component_name.clone()).or_default();
        if bucket.iter().all(|seen| seen.root_node_id != m.root_node_id) {
            bucket.push(m);
        }
    }
    let mut groups: Vec<_> = groups.into_iter().collect();
    groups.sort_by(|(a_name, a), (b_name, b)| b.len().cmp(&a.len()).then_with(|| a_name.cmp(b_name)));
    groups
}

/// Ask the model for repeated patterns and turn them into findings.
pub async fn detect_patterns(
    ctx: &AuditContext<'_>,
    llm: Option<&dyn LlmClient>,
    max_attempts: u32,
) -> Vec<AuditFinding> {
    let Some(llm) = llm else {
        debug!("pattern detection skipped: no LLM configured");
        return Vec::new();
    };
    let candidates = pattern_candidates(ctx);
    if candidates.len() < MIN_PATTERN_CANDIDATES {
        debug!(candidates = candidates.len(), "pattern detection skipped: too few candidates");
        return Vec::new();
    }

    let prompt = pattern_prompt(ctx);
    debug!(candidates = candidates.len(), prompt_len = prompt.len(), "requesting pattern detection");
    let reply = match llm.call(&prompt, max_attempts).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "pattern detection failed");
            return Vec::new();
        }
    };

    group_patterns(parse_items(reply))
        .into_iter()
        .map(|(name, instances)| {
            let representative = &instances[0];
            let node = ctx.design.find_node(&representative.root_node_id);
            let structure = node.map(subtree).unwrap_or_else(|| {
                json!({ "id": representative.root_node_id, "name": representative.root_node_name })
            });
            let node_name = node.map_or(representative.root_node_name.as_str(), |n| n.name.as_str());
            let listed: Vec<Value> = instances
                .iter()
                .map(|m| json!({ "id": m.root_node_id, "name": m.root_node_name }))
                .collect();
            AuditFinding::for_id(
                AI_PATTERN_DETECTION,
                &representative.root_node_id,
                node_name,
                format!(
                    "\"{}\" repeats {} time(s) and could be a component",
                    name,
                    instances.len()
                ),
            )
            .with_more_infos(json!({
                "componentName": name,
                "description": representative.description,
                "instances": listed,
                "structure": structure,
            }))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDetection;

#[async_trait]
impl AiRule for PatternDetection {
    fn id(&self) -> RuleId {
        AI_PATTERN_DETECTION
    }

    async fn check(
        &self,
        ctx: &AuditContext<'_>,
        llm: Option<&dyn LlmClient>,
        max_attempts: u32,
    ) -> Vec<AuditFinding> {
        detect_patterns(ctx, llm, max_attempts).await
    }
}

/// Suggests descriptions for components and component sets that lack one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionSuggestions;

impl DescriptionSuggestions {
    fn undocumented<'a>(ctx: &AuditContext<'a>) -> BTreeMap<&'a str, &'a str> {
        let design = ctx.design;
        let components = design
            .components
            .values()
            .filter(|c| c.component_set_id.is_none() && is_blank(c.description.as_deref()))
            .map(|c| (c.id.as_str(), c.name.as_str()));
        let sets = design
            .component_sets
            .values()
            .filter(|s| is_blank(s.description.as_deref()))
            .map(|s| (s.id.as_str(), s.name.as_str()));
        components.chain(sets).collect()
    }

    fn prompt(ctx: &AuditContext<'_>, targets: &BTreeMap<&str, &str>) -> String {
        let listed: Vec<Value> = targets
            .iter()
            .map(|(id, name)| {
                let structure = ctx.design.find_node(id).map(project);
                json!({ "id": id, "name": name, "structure": structure })
            })
            .collect();
        format!(
            "Write a one-sentence description for each Figma component below, explaining \
             what it is and when to use it.\n\
             Reply with a JSON array: [{{\"id\": string, \"description\": string}}]\n\n\
             Components:\n{}",
            Value::Array(listed)
        )
    }
}

#[async_trait]
impl AiRule for DescriptionSuggestions {
    fn id(&self) -> RuleId {
        AI_DESCRIPTION_SUGGESTIONS
    }

    async fn check(
        &self,
        ctx: &AuditContext<'_>,
        llm: Option<&dyn LlmClient>,
        max_attempts: u32,
    ) -> Vec<AuditFinding> {
        let Some(llm) = llm else {
            return Vec::new();
        };
        let targets = Self::undocumented(ctx);
        if targets.is_empty() {
            return Vec::new();
        }

        let reply = match llm.call(&Self::prompt(ctx, &targets), max_attempts).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "description suggestions failed");
                return Vec::new();
            }
        };

        parse_items::<DescriptionSuggestion>(reply)
            .into_iter()
            .filter(|s| !s.description.trim().is_empty())
            .filter_map(|s| {
                let name = targets.get(s.id.as_str())?;
                Some(
                    AuditFinding::for_id(
                        self.id(),
                        &s.id,
                        name,
                        format!("Suggested description: {}", s.description.trim()),
                    )
                    .with_more_infos(json!({ "suggestedDescription": s.description.trim() })),
                )
            })
            .collect()
    }
}
