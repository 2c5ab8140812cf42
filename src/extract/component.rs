//! Component linkage for instances and variants.

use crate::figma::api_types::{NodeType, RawNode};
use crate::types::{ComponentProperty, SimplifiedNode};

use super::traversal::TraversalContext;

pub fn component_extractor(node: &RawNode, result: &mut SimplifiedNode, _ctx: &mut TraversalContext<'_>) {
    let is_instance = node.node_type == NodeType::Instance;
    let is_variant = matches!(node.node_type, NodeType::Component | NodeType::ComponentSet);
    if !(is_instance || is_variant) || !node.has_component_trait() {
        return;
    }

    if is_instance {
        result.component_id = node.component_id.clone();
    }

    if !node.component_properties.is_empty() {
        result.component_properties = Some(
            node.component_properties
                .iter()
                .map(|(name, prop)| ComponentProperty {
                    name: name.clone(),
                    value: prop.value.clone(),
                    property_type: prop.property_type.clone(),
                })
                .collect(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::traversal::{traverse, TraversalOptions};
    use crate::types::GlobalVars;
    use serde_json::json;

    fn run(value: serde_json::Value) -> SimplifiedNode {
        let node: RawNode = serde_json::from_value(value).expect("raw node");
        let mut result = traverse(&[node], &[component_extractor], &TraversalOptions::default(), GlobalVars::new());
        result.nodes.remove(0)
    }

    #[test]
    fn instances_copy_component_id_and_properties() {
        let node = run(json!({
            "id": "5:1", "name": "Button", "type": "INSTANCE", "componentId": "1:2",
            "componentProperties": {"Label#1:0": {"type": "TEXT", "value": "Save"}}
        }));
        assert_eq!(node.component_id.as_deref(), Some("1:2"));
        let props = node.component_properties.expect("properties");
        assert_eq!(props[0].name, "Label#1:0");
        assert_eq!(props[0].value, json!("Save"));
        assert_eq!(props[0].property_type, "TEXT");
    }

    #[test]
    fn plain_frames_are_untouched() {
        let node = run(json!({
            "id": "5:2", "name": "Frame", "type": "FRAME", "componentId": "1:2"
        }));
        assert!(node.component_id.is_none());
        assert!(node.component_properties.is_none());
    }
}
