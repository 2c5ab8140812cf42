//! Figma API response types for parsing JSON from the Figma REST API.
//!
//! Nodes are heterogeneous by their `type` tag. Rather than modelling one
//! struct per node kind, [`RawNode`] carries every trait as an optional field
//! and extractors check for the traits they need (`has_layout_trait`,
//! `has_text_trait`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported image export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Node kind tag. Unknown tags are kept verbatim in [`NodeType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Section,
    Text,
    Rectangle,
    Ellipse,
    Line,
    Star,
    Polygon,
    Vector,
    BooleanOperation,
    Component,
    ComponentSet,
    Instance,
    Slice,
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Document => "DOCUMENT",
            NodeType::Canvas => "CANVAS",
            NodeType::Frame => "FRAME",
            NodeType::Group => "GROUP",
            NodeType::Section => "SECTION",
            NodeType::Text => "TEXT",
            NodeType::Rectangle => "RECTANGLE",
            NodeType::Ellipse => "ELLIPSE",
            NodeType::Line => "LINE",
            NodeType::Star => "STAR",
            NodeType::Polygon => "POLYGON",
            NodeType::Vector => "VECTOR",
            NodeType::BooleanOperation => "BOOLEAN_OPERATION",
            NodeType::Component => "COMPONENT",
            NodeType::ComponentSet => "COMPONENT_SET",
            NodeType::Instance => "INSTANCE",
            NodeType::Slice => "SLICE",
            NodeType::Other(tag) => tag,
        }
    }

    /// Type name as it appears in the simplified design.
    pub fn simplified_name(&self) -> String {
        match self {
            NodeType::Vector => "IMAGE-SVG".to_string(),
            other => other.as_str().to_string(),
        }
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "DOCUMENT" => NodeType::Document,
            "CANVAS" => NodeType::Canvas,
            "FRAME" => NodeType::Frame,
            "GROUP" => NodeType::Group,
            "SECTION" => NodeType::Section,
            "TEXT" => NodeType::Text,
            "RECTANGLE" => NodeType::Rectangle,
            "ELLIPSE" => NodeType::Ellipse,
            "LINE" => NodeType::Line,
            "STAR" => NodeType::Star,
            "REGULAR_POLYGON" | "POLYGON" => NodeType::Polygon,
            "VECTOR" => NodeType::Vector,
            "BOOLEAN_OPERATION" => NodeType::BooleanOperation,
            "COMPONENT" => NodeType::Component,
            "COMPONENT_SET" => NodeType::ComponentSet,
            "INSTANCE" => NodeType::Instance,
            "SLICE" => NodeType::Slice,
            _ => NodeType::Other(tag),
        }
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.as_str().to_string()
    }
}

/// Raw Figma node data from the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub visible: Option<bool>,
    #[serde(default)]
    pub children: Vec<RawNode>,

    // Geometry and auto layout
    pub absolute_bounding_box: Option<FigmaRect>,
    pub layout_mode: Option<String>,
    pub layout_wrap: Option<String>,
    pub primary_axis_align_items: Option<String>,
    pub counter_axis_align_items: Option<String>,
    pub layout_align: Option<String>,
    pub layout_grow: Option<f64>,
    pub item_spacing: Option<f64>,
    pub counter_axis_spacing: Option<f64>,
    pub padding_left: Option<f64>,
    pub padding_right: Option<f64>,
    pub padding_top: Option<f64>,
    pub padding_bottom: Option<f64>,
    pub layout_sizing_horizontal: Option<String>,
    pub layout_sizing_vertical: Option<String>,
    pub layout_positioning: Option<String>,
    pub overflow_direction: Option<String>,
    pub preserve_ratio: Option<bool>,

    // Text
    pub characters: Option<String>,
    pub style: Option<FigmaTypeStyle>,

    // Visuals
    #[serde(default)]
    pub fills: Vec<FigmaPaint>,
    #[serde(default)]
    pub strokes: Vec<FigmaPaint>,
    pub stroke_weight: Option<f64>,
    pub stroke_dashes: Option<Vec<f64>>,
    pub individual_stroke_weights: Option<FigmaStrokeWeights>,
    #[serde(default)]
    pub effects: Vec<FigmaEffect>,
    pub opacity: Option<f64>,
    pub corner_radius: Option<f64>,
    pub rectangle_corner_radii: Option<Vec<f64>>,

    /// Concern (`fill`, `stroke`, `text`, `effect`, ...) to document style id.
    #[serde(default)]
    pub styles: BTreeMap<String, String>,

    // Components
    pub component_id: Option<String>,
    #[serde(default)]
    pub component_properties: BTreeMap<String, FigmaComponentProperty>,
    #[serde(default)]
    pub export_settings: Vec<serde_json::Value>,
    pub is_mask: Option<bool>,
    pub mask_type: Option<String>,
}

impl RawNode {
    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }

    pub fn has_layout_trait(&self) -> bool {
        self.absolute_bounding_box.is_some() || self.layout_mode.is_some()
    }

    pub fn has_text_trait(&self) -> bool {
        self.node_type == NodeType::Text || self.characters.is_some()
    }

    pub fn has_visual_trait(&self) -> bool {
        !self.fills.is_empty()
            || !self.strokes.is_empty()
            || !self.effects.is_empty()
            || self.opacity.is_some()
            || self.corner_radius.is_some()
            || self.rectangle_corner_radii.is_some()
    }

    pub fn has_component_trait(&self) -> bool {
        self.component_id.is_some() || !self.component_properties.is_empty()
    }

    /// Node kinds that can carry auto layout.
    pub fn is_frame_like(&self) -> bool {
        matches!(
            self.node_type,
            NodeType::Frame
                | NodeType::Component
                | NodeType::ComponentSet
                | NodeType::Instance
                | NodeType::Section
        )
    }

    pub fn has_auto_layout(&self) -> bool {
        matches!(
            self.layout_mode.as_deref(),
            Some("HORIZONTAL") | Some("VERTICAL")
        )
    }

    /// Named document style referenced for one of the given concern keys.
    pub fn style_ref(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|key| self.styles.get(*key))
            .map(String::as_str)
    }
}

/// Bounding box coordinates from Figma.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FigmaRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct FigmaVector {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct FigmaStrokeWeights {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Typography style from Figma.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaTypeStyle {
    pub font_family: Option<String>,
    pub font_weight: Option<f64>,
    pub font_size: Option<f64>,
    pub line_height_px: Option<f64>,
    pub line_height_percent: Option<f64>,
    pub line_height_percent_font_size: Option<f64>,
    pub line_height_unit: Option<String>,
    pub letter_spacing: Option<f64>,
    pub text_case: Option<String>,
    pub text_align_horizontal: Option<String>,
    pub text_align_vertical: Option<String>,
}

/// Paint data from Figma (fills and strokes).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaPaint {
    #[serde(rename = "type")]
    pub paint_type: String,
    pub visible: Option<bool>,
    pub opacity: Option<f64>,
    pub color: Option<FigmaColor>,
    pub image_ref: Option<String>,
    pub scale_mode: Option<String>,
    pub image_transform: Option<[[f64; 3]; 2]>,
    #[serde(default)]
    pub gradient_handle_positions: Vec<FigmaVector>,
    #[serde(default)]
    pub gradient_stops: Vec<FigmaColorStop>,
}

impl FigmaPaint {
    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct FigmaColorStop {
    pub position: f64,
    pub color: FigmaColor,
}

/// RGBA color from Figma (0.0-1.0 range).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct FigmaColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl FigmaColor {
    /// Convert to hex color string (e.g., "#FF8000").
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.channels();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Hex when fully opaque after applying `opacity`, `rgba(...)` otherwise.
    pub fn to_css(&self, opacity: Option<f64>) -> String {
        let alpha = round2(self.a * opacity.unwrap_or(1.0));
        if alpha >= 1.0 {
            return self.to_hex();
        }
        let [r, g, b] = self.channels();
        format!("rgba({}, {}, {}, {})", r, g, b, alpha)
    }

    fn channels(&self) -> [u8; 3] {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_byte(self.r), to_byte(self.g), to_byte(self.b)]
    }
}

/// Effect data from Figma (shadows and blurs).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaEffect {
    #[serde(rename = "type")]
    pub effect_type: String,
    pub visible: Option<bool>,
    #[serde(default)]
    pub radius: f64,
    pub color: Option<FigmaColor>,
    pub offset: Option<FigmaVector>,
    pub spread: Option<f64>,
}

impl FigmaEffect {
    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaComponentProperty {
    #[serde(rename = "type")]
    pub property_type: String,
    pub value: serde_json::Value,
}

/// Entry of the document component table (keyed by node id).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaComponent {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub component_set_id: Option<String>,
}

/// Entry of the document component-set table (keyed by node id).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaComponentSet {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Entry of the document named-style table (keyed by style id).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaStyle {
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub style_type: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A Figma file response from the files endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaFileResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    pub thumbnail_url: Option<String>,
    pub document: RawNode,
    #[serde(default)]
    pub components: BTreeMap<String, FigmaComponent>,
    #[serde(default)]
    pub component_sets: BTreeMap<String, FigmaComponentSet>,
    #[serde(default)]
    pub styles: BTreeMap<String, FigmaStyle>,
}

/// Response from the file nodes endpoint. Entries are kept in response
/// order; unknown node ids come back as `null`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaNodesResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    pub thumbnail_url: Option<String>,
    pub nodes: serde_json::Map<String, serde_json::Value>,
}

/// One entry of [`FigmaNodesResponse::nodes`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaNodeEntry {
    pub document: RawNode,
    #[serde(default)]
    pub components: BTreeMap<String, FigmaComponent>,
    #[serde(default)]
    pub component_sets: BTreeMap<String, FigmaComponentSet>,
    #[serde(default)]
    pub styles: BTreeMap<String, FigmaStyle>,
}

/// Response from the images render endpoint.
#[derive(Debug, Deserialize)]
pub struct FigmaImageExport {
    #[serde(default)]
    pub err: Option<String>,
    pub images: BTreeMap<String, Option<String>>,
}

/// Response from the image fills endpoint.
#[derive(Debug, Deserialize)]
pub struct FigmaImageFills {
    pub meta: FigmaImageFillsMeta,
}

#[derive(Debug, Deserialize)]
pub struct FigmaImageFillsMeta {
    #[serde(default)]
    pub images: BTreeMap<String, String>,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
