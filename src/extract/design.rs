//! Top-level orchestration: raw API envelope in, simplified design out.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{FigmaAuditError, Result};
use crate::figma::api_types::{
    FigmaComponent, FigmaComponentSet, FigmaFileResponse, FigmaNodeEntry, FigmaNodesResponse,
    FigmaStyle, RawNode,
};
use crate::types::{
    GlobalVars, SimplifiedComponentDefinition, SimplifiedComponentSetDefinition, SimplifiedDesign,
};

use super::traversal::{traverse, Extractor, TraversalOptions};

/// Raw envelope flattened to what simplification needs, regardless of
/// which endpoint produced it.
#[derive(Debug, Default)]
struct ParsedEnvelope {
    name: String,
    last_modified: String,
    thumbnail_url: Option<String>,
    roots: Vec<RawNode>,
    components: BTreeMap<String, FigmaComponent>,
    component_sets: BTreeMap<String, FigmaComponentSet>,
    styles: BTreeMap<String, FigmaStyle>,
}

/// Simplify the raw response of the files or file-nodes endpoint.
///
/// Fails without partial output when the envelope is not one of the two
/// supported shapes.
pub fn simplify(
    raw: &Value,
    extractors: &[Extractor],
    options: &TraversalOptions<'_>,
) -> Result<SimplifiedDesign> {
    let envelope = parse_envelope(raw)?;

    let result = traverse(&envelope.roots, extractors, options, GlobalVars::new());
    let mut global_vars = result.global_vars;
    global_vars.apply_style_names(&envelope.styles);

    let components = envelope
        .components
        .into_iter()
        .map(|(id, component)| {
            let definition = SimplifiedComponentDefinition {
                id: id.clone(),
                key: component.key,
                name: component.name,
                description: non_empty(component.description),
                component_set_id: component.component_set_id,
            };
            (id, definition)
        })
        .collect();

    let component_sets = envelope
        .component_sets
        .into_iter()
        .map(|(id, set)| {
            let definition = SimplifiedComponentSetDefinition {
                id: id.clone(),
                key: set.key,
                name: set.name,
                description: non_empty(set.description),
            };
            (id, definition)
        })
        .collect();

    info!(
        name = %envelope.name,
        roots = result.nodes.len(),
        "design simplified"
    );

    Ok(SimplifiedDesign {
        name: envelope.name,
        last_modified: envelope.last_modified,
        thumbnail_url: envelope.thumbnail_url.unwrap_or_default(),
        nodes: result.nodes,
        components,
        component_sets,
        global_vars,
    })
}

fn parse_envelope(raw: &Value) -> Result<ParsedEnvelope> {
    let Some(object) = raw.as_object() else {
        return Err(FigmaAuditError::invalid_design(format!(
            "expected a JSON object, got {}",
            json_kind(raw)
        )));
    };

    if object.contains_key("nodes") {
        debug!("detected file-nodes envelope");
        let response = FigmaNodesResponse::deserialize(raw)
            .map_err(|e| FigmaAuditError::invalid_design(format!("malformed nodes response: {e}")))?;
        return parse_nodes_envelope(response);
    }

    if object.contains_key("document") {
        debug!("detected whole-file envelope");
        let response = FigmaFileResponse::deserialize(raw)
            .map_err(|e| FigmaAuditError::invalid_design(format!("malformed file response: {e}")))?;
        return Ok(ParsedEnvelope {
            name: response.name,
            last_modified: response.last_modified,
            thumbnail_url: response.thumbnail_url,
            roots: response.document.children,
            components: response.components,
            component_sets: response.component_sets,
            styles: response.styles,
        });
    }

    Err(FigmaAuditError::invalid_design(
        "unsupported envelope: expected a 'document' (whole file) or 'nodes' (node subtrees) field",
    ))
}

fn parse_nodes_envelope(response: FigmaNodesResponse) -> Result<ParsedEnvelope> {
    let mut envelope = ParsedEnvelope {
        name: response.name,
        last_modified: response.last_modified,
        thumbnail_url: response.thumbnail_url,
        ..ParsedEnvelope::default()
    };

    for (node_id, entry) in &response.nodes {
        if entry.is_null() {
            debug!(node_id = %node_id, "skipping missing node");
            continue;
        }
        let entry = FigmaNodeEntry::deserialize(entry).map_err(|e| {
            FigmaAuditError::invalid_design(format!("malformed entry for node '{node_id}': {e}"))
        })?;
        // Later entries win on key collisions.
        envelope.components.extend(entry.components);
        envelope.component_sets.extend(entry.component_sets);
        envelope.styles.extend(entry.styles);
        envelope.roots.push(entry.document);
    }

    Ok(envelope)
}

fn non_empty(description: String) -> Option<String> {
    (!description.is_empty()).then_some(description)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
