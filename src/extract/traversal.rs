//! Generic tree traversal applying extractors to every accepted node.

use std::fmt;

use tracing::debug;

use crate::figma::api_types::RawNode;
use crate::types::{GlobalVars, SimplifiedNode};

/// An extractor reads one concern of a raw node and writes it into the
/// simplified node, optionally interning values into the registry.
///
/// Extractors run in the order they are listed; one may rely on fields set
/// by extractors listed before it.
pub type Extractor = fn(&RawNode, &mut SimplifiedNode, &mut TraversalContext<'_>);

pub struct TraversalContext<'a> {
    pub global_vars: &'a mut GlobalVars,
    /// Edges between the current node and its root.
    pub current_depth: u32,
    pub parent: Option<&'a RawNode>,
}

#[derive(Clone, Copy, Default)]
pub struct TraversalOptions<'f> {
    /// Maximum number of edges to descend; `None` is unbounded.
    pub max_depth: Option<u32>,
    /// Extra predicate ANDed with visibility. Rejected nodes are dropped
    /// together with their subtree.
    pub node_filter: Option<&'f dyn Fn(&RawNode) -> bool>,
}

impl fmt::Debug for TraversalOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalOptions")
            .field("max_depth", &self.max_depth)
            .field("node_filter", &self.node_filter.is_some())
            .finish()
    }
}

impl<'f> TraversalOptions<'f> {
    pub fn with_max_depth(max_depth: u32) -> Self {
        Self {
            max_depth: Some(max_depth),
            node_filter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraversalResult {
    pub nodes: Vec<SimplifiedNode>,
    pub global_vars: GlobalVars,
}

/// Walk `roots` and build the simplified forest plus the registry state.
pub fn traverse(
    roots: &[RawNode],
    extractors: &[Extractor],
    options: &TraversalOptions<'_>,
    initial_global_vars: GlobalVars,
) -> TraversalResult {
    let mut global_vars = initial_global_vars;
    let nodes: Vec<SimplifiedNode> = {
        let mut ctx = TraversalContext {
            global_vars: &mut global_vars,
            current_depth: 0,
            parent: None,
        };
        roots
            .iter()
            .filter_map(|root| process_node(root, extractors, options, &mut ctx))
            .collect()
    };

    debug!(
        roots = roots.len(),
        kept_roots = nodes.len(),
        design_system = global_vars.design_system.len(),
        local_styles = global_vars.local_styles.len(),
        "traversal finished"
    );

    TraversalResult { nodes, global_vars }
}

fn accepts(node: &RawNode, options: &TraversalOptions<'_>) -> bool {
    node.is_visible() && options.node_filter.map_or(true, |filter| filter(node))
}

fn process_node(
    node: &RawNode,
    extractors: &[Extractor],
    options: &TraversalOptions<'_>,
    ctx: &mut TraversalContext<'_>,
) -> Option<SimplifiedNode> {
    if !accepts(node, options) {
        return None;
    }

    let mut simplified = base_node(node);
    for extract in extractors {
        extract(node, &mut simplified, ctx);
    }

    let may_descend = options
        .max_depth
        .map_or(true, |max| ctx.current_depth < max);
    if may_descend && !node.children.is_empty() {
        let mut child_ctx = TraversalContext {
            global_vars: &mut *ctx.global_vars,
            current_depth: ctx.current_depth + 1,
            parent: Some(node),
        };
        let children: Vec<SimplifiedNode> = node
            .children
            .iter()
            .filter_map(|child| process_node(child, extractors, options, &mut child_ctx))
            .collect();
        if !children.is_empty() {
            simplified.children = Some(children);
        }
    }

    Some(simplified)
}

fn base_node(node: &RawNode) -> SimplifiedNode {
    let mut simplified = SimplifiedNode::new(&node.id, &node.name, node.node_type.simplified_name());
    if !node.export_settings.is_empty() {
        simplified.export_settings = serde_json::to_string(&node.export_settings).ok();
    }
    simplified.visible = node.visible;
    if node.is_mask == Some(true) {
        simplified.mask_type = node.mask_type.clone().or_else(|| Some("ALPHA".to_string()));
    }
    simplified
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawNode {
        serde_json::from_value(value).expect("raw node")
    }

    fn tree() -> RawNode {
        raw(json!({
            "id": "1", "name": "Root", "type": "FRAME",
            "children": [
                {"id": "2", "name": "Child", "type": "FRAME", "children": [
                    {"id": "3", "name": "Grandchild", "type": "TEXT", "characters": "Hi"}
                ]},
                {"id": "4", "name": "Hidden", "type": "FRAME", "visible": false, "children": [
                    {"id": "5", "name": "Visible inside hidden", "type": "RECTANGLE", "visible": true}
                ]}
            ]
        }))
    }

    fn max_depth_of(node: &SimplifiedNode) -> u32 {
        node.children()
            .iter()
            .map(|c| 1 + max_depth_of(c))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = traverse(&[], &[], &TraversalOptions::default(), GlobalVars::new());
        assert!(result.nodes.is_empty());
        assert_eq!(result.global_vars, GlobalVars::new());
    }

    #[test]
    fn depth_zero_keeps_roots_only() {
        let result = traverse(
            &[tree()],
            &[],
            &TraversalOptions::with_max_depth(0),
            GlobalVars::new(),
        );
        assert_eq!(result.nodes.len(), 1);
        assert!(!result.nodes[0].has_children());
    }

    #[test]
    fn depth_counts_edges() {
        let result = traverse(
            &[tree()],
            &[],
            &TraversalOptions::with_max_depth(1),
            GlobalVars::new(),
        );
        let root = &result.nodes[0];
        assert_eq!(max_depth_of(root), 1);
        assert_eq!(root.children()[0].id, "2");
        assert!(!root.children()[0].has_children());

        let unbounded = traverse(&[tree()], &[], &TraversalOptions::default(), GlobalVars::new());
        assert_eq!(max_depth_of(&unbounded.nodes[0]), 2);
    }

    #[test]
    fn hidden_nodes_drop_their_whole_subtree() {
        let result = traverse(&[tree()], &[], &TraversalOptions::default(), GlobalVars::new());
        let root = &result.nodes[0];
        assert!(root.find("4").is_none());
        assert!(root.find("5").is_none());
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn node_filter_is_anded_with_visibility() {
        let no_frames_named_child = |n: &RawNode| n.name != "Child";
        let options = TraversalOptions {
            max_depth: None,
            node_filter: Some(&no_frames_named_child),
        };
        let result = traverse(&[tree()], &[], &options, GlobalVars::new());
        let root = &result.nodes[0];
        assert!(root.find("2").is_none());
        assert!(root.find("3").is_none(), "children are not promoted");
        assert!(!root.has_children());
    }

    #[test]
    fn extractors_run_in_order_and_see_parent() {
        fn first(_: &RawNode, node: &mut SimplifiedNode, _: &mut TraversalContext<'_>) {
            node.text = Some("first".into());
        }
        fn second(_: &RawNode, node: &mut SimplifiedNode, ctx: &mut TraversalContext<'_>) {
            let seen = node.text.clone().unwrap_or_default();
            let parent = ctx.parent.map(|p| p.id.clone()).unwrap_or_else(|| "-".into());
            node.text = Some(format!("{seen}:{parent}:{}", ctx.current_depth));
        }

        let result = traverse(&[tree()], &[first, second], &TraversalOptions::default(), GlobalVars::new());
        let root = &result.nodes[0];
        assert_eq!(root.text.as_deref(), Some("first:-:0"));
        assert_eq!(root.find("3").and_then(|n| n.text.as_deref()), Some("first:2:2"));
    }

    #[test]
    fn vectors_are_normalized_to_svg_images() {
        let node = raw(json!({"id": "9", "name": "Icon", "type": "VECTOR"}));
        let result = traverse(&[node], &[], &TraversalOptions::default(), GlobalVars::new());
        assert_eq!(result.nodes[0].node_type, "IMAGE-SVG");
    }

    #[test]
    fn export_settings_are_serialized() {
        let node = raw(json!({
            "id": "9", "name": "Logo", "type": "FRAME",
            "exportSettings": [{"suffix": "", "format": "SVG", "constraint": {"type": "SCALE", "value": 1}}]
        }));
        let result = traverse(&[node], &[], &TraversalOptions::default(), GlobalVars::new());
        let settings = result.nodes[0].export_settings.as_deref().unwrap_or_default();
        assert!(settings.contains("\"format\":\"SVG\""));
    }
}
