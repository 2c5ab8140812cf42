//! Simplified design document produced by the design extractor.
//!
//! Nodes never carry style values inline: `textStyle`, `fills`, `strokes`,
//! `effects` and `layout` are keys into [`GlobalVars`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::style_registry::GlobalVars;

/// The externally visible artifact of the simplification step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedDesign {
    pub name: String,
    pub last_modified: String,
    /// Always present; empty when the API response had none.
    pub thumbnail_url: String,
    pub nodes: Vec<SimplifiedNode>,
    pub components: BTreeMap<String, SimplifiedComponentDefinition>,
    pub component_sets: BTreeMap<String, SimplifiedComponentSetDefinition>,
    pub global_vars: GlobalVars,
}

impl SimplifiedDesign {
    /// Every node of the forest in depth-first pre-order.
    pub fn all_nodes(&self) -> Vec<&SimplifiedNode> {
        let mut acc = Vec::new();
        for root in &self.nodes {
            root.visit(&mut |node| acc.push(node));
        }
        acc
    }

    pub fn find_node(&self, id: &str) -> Option<&SimplifiedNode> {
        self.nodes.iter().find_map(|root| root.find(id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_properties: Option<Vec<ComponentProperty>>,
    /// Export settings serialized as a JSON string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_settings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_type: Option<String>,
    /// Absent (never empty) when no child survived traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SimplifiedNode>>,
}

impl SimplifiedNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> &[SimplifiedNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_type(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }

    /// Components, instances and component sets are already consolidated.
    pub fn is_component_like(&self) -> bool {
        matches!(
            self.node_type.as_str(),
            "COMPONENT" | "COMPONENT_SET" | "INSTANCE"
        )
    }

    /// Depth-first pre-order visit of this node and its subtree.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a SimplifiedNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    pub fn find(&self, id: &str) -> Option<&SimplifiedNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProperty {
    pub name: String,
    pub value: serde_json::Value,
    #[serde(rename = "type")]
    pub property_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedComponentDefinition {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_set_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedComponentSetDefinition {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    None,
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    Fixed,
    Fill,
    Hug,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSizing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<SizingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<SizingMode>,
}

/// Normalized layout descriptor (flex-like).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedLayout {
    pub mode: LayoutMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_self: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_relative_to_parent: Option<LayoutPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<LayoutDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<LayoutSizing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_scroll: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl SimplifiedLayout {
    pub fn none() -> Self {
        Self {
            mode: LayoutMode::None,
            justify_content: None,
            align_items: None,
            align_self: None,
            wrap: None,
            gap: None,
            location_relative_to_parent: None,
            dimensions: None,
            padding: None,
            sizing: None,
            overflow_scroll: None,
            position: None,
        }
    }
}

/// Line height as emitted by the text extractor (`"1.5em"`, `"AUTO"`), or
/// with an explicit unit (`{"unit": "PIXELS", "value": 18}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineHeightRepr", into = "LineHeightRepr")]
pub enum LineHeight {
    Auto,
    Em(f64),
    Pixels(f64),
    Percent(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum LineHeightUnit {
    Pixels,
    Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum LineHeightRepr {
    Keyword(String),
    Measured { unit: LineHeightUnit, value: f64 },
}

impl TryFrom<LineHeightRepr> for LineHeight {
    type Error = String;

    fn try_from(repr: LineHeightRepr) -> Result<Self, Self::Error> {
        match repr {
            LineHeightRepr::Keyword(keyword) if keyword.eq_ignore_ascii_case("auto") => {
                Ok(LineHeight::Auto)
            }
            LineHeightRepr::Keyword(keyword) => keyword
                .strip_suffix("em")
                .and_then(|n| n.trim().parse::<f64>().ok())
                .map(LineHeight::Em)
                .ok_or_else(|| format!("unsupported line height '{}'", keyword)),
            LineHeightRepr::Measured {
                unit: LineHeightUnit::Pixels,
                value,
            } => Ok(LineHeight::Pixels(value)),
            LineHeightRepr::Measured {
                unit: LineHeightUnit::Percent,
                value,
            } => Ok(LineHeight::Percent(value)),
        }
    }
}

impl From<LineHeight> for LineHeightRepr {
    fn from(line_height: LineHeight) -> Self {
        match line_height {
            LineHeight::Auto => LineHeightRepr::Keyword("AUTO".to_string()),
            LineHeight::Em(value) => LineHeightRepr::Keyword(format!("{}em", value)),
            LineHeight::Pixels(value) => LineHeightRepr::Measured {
                unit: LineHeightUnit::Pixels,
                value,
            },
            LineHeight::Percent(value) => LineHeightRepr::Measured {
                unit: LineHeightUnit::Percent,
                value,
            },
        }
    }
}

/// Normalized text style descriptor. Absent raw properties are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<LineHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align_horizontal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align_vertical: Option<String>,
}

/// A fill is either a CSS color string or a structured paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimplifiedFill {
    Solid(String),
    Paint(PaintFill),
}

impl SimplifiedFill {
    pub fn as_color(&self) -> Option<&str> {
        match self {
            SimplifiedFill::Solid(color) => Some(color),
            SimplifiedFill::Paint(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintFill {
    #[serde(rename = "type")]
    pub paint_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_cropping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedStrokes {
    pub colors: Vec<SimplifiedFill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dashes: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weights: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedEffects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_filter: Option<String>,
}

impl SimplifiedEffects {
    pub fn is_empty(&self) -> bool {
        self.box_shadow.is_none()
            && self.text_shadow.is_none()
            && self.filter.is_none()
            && self.backdrop_filter.is_none()
    }
}
