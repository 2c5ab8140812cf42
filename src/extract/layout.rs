//! Layout extraction: auto layout, sizing, padding and placement.

use crate::figma::api_types::{round2, RawNode};
use crate::types::{
    LayoutDimensions, LayoutMode, LayoutPoint, LayoutSizing, SimplifiedLayout, SimplifiedNode,
    SizingMode,
};

use super::traversal::TraversalContext;

pub fn layout_extractor(node: &RawNode, result: &mut SimplifiedNode, ctx: &mut TraversalContext<'_>) {
    if !node.has_layout_trait() {
        return;
    }
    let layout = build_simplified_layout(node, ctx.parent);
    result.layout = Some(ctx.global_vars.intern(None, layout));
}

pub fn build_simplified_layout(node: &RawNode, parent: Option<&RawNode>) -> SimplifiedLayout {
    let mut layout = SimplifiedLayout::none();
    apply_frame_values(node, &mut layout);
    apply_placement_values(node, parent, &mut layout);
    layout
}

fn layout_mode(node: &RawNode) -> LayoutMode {
    match node.layout_mode.as_deref() {
        Some("HORIZONTAL") => LayoutMode::Row,
        Some("VERTICAL") => LayoutMode::Column,
        _ => LayoutMode::None,
    }
}

fn apply_frame_values(node: &RawNode, layout: &mut SimplifiedLayout) {
    if !node.is_frame_like() {
        return;
    }

    layout.mode = layout_mode(node);
    layout.overflow_scroll = match node.overflow_direction.as_deref() {
        Some("HORIZONTAL_SCROLLING") => Some(vec!["x".to_string()]),
        Some("VERTICAL_SCROLLING") => Some(vec!["y".to_string()]),
        Some("HORIZONTAL_AND_VERTICAL_SCROLLING") => Some(vec!["x".to_string(), "y".to_string()]),
        _ => None,
    };

    if layout.mode == LayoutMode::None {
        return;
    }

    layout.justify_content = match node.primary_axis_align_items.as_deref() {
        Some("MAX") => Some("flex-end".to_string()),
        Some("CENTER") => Some("center".to_string()),
        Some("SPACE_BETWEEN") => Some("space-between".to_string()),
        _ => None,
    };
    layout.align_items = match node.counter_axis_align_items.as_deref() {
        Some("MAX") => Some("flex-end".to_string()),
        Some("CENTER") => Some("center".to_string()),
        Some("BASELINE") => Some("baseline".to_string()),
        _ if children_all_stretch(node) => Some("stretch".to_string()),
        _ => None,
    };
    if node.layout_wrap.as_deref() == Some("WRAP") {
        layout.wrap = Some(true);
    }
    layout.gap = node
        .item_spacing
        .filter(|spacing| *spacing > 0.0)
        .map(px);
    layout.padding = padding_shorthand(
        node.padding_top.unwrap_or(0.0),
        node.padding_right.unwrap_or(0.0),
        node.padding_bottom.unwrap_or(0.0),
        node.padding_left.unwrap_or(0.0),
    );
}

fn children_all_stretch(node: &RawNode) -> bool {
    let in_flow: Vec<&RawNode> = node
        .children
        .iter()
        .filter(|c| c.layout_positioning.as_deref() != Some("ABSOLUTE"))
        .collect();
    !in_flow.is_empty()
        && in_flow
            .iter()
            .all(|c| c.layout_align.as_deref() == Some("STRETCH"))
}

fn apply_placement_values(node: &RawNode, parent: Option<&RawNode>, layout: &mut SimplifiedLayout) {
    let absolute = node.layout_positioning.as_deref() == Some("ABSOLUTE");
    let in_auto_layout_flow = parent.is_some_and(|p| p.has_auto_layout()) && !absolute;

    if absolute {
        layout.position = Some("absolute".to_string());
    }
    if in_auto_layout_flow && node.layout_align.as_deref() == Some("STRETCH") {
        layout.align_self = Some("stretch".to_string());
    }

    let sizing = LayoutSizing {
        horizontal: sizing_mode(node.layout_sizing_horizontal.as_deref()),
        vertical: sizing_mode(node.layout_sizing_vertical.as_deref()),
    };
    if sizing.horizontal.is_some() || sizing.vertical.is_some() {
        layout.sizing = Some(sizing);
    }

    let Some(bounds) = node.absolute_bounding_box else {
        return;
    };

    if !in_auto_layout_flow {
        if let Some(parent_bounds) = parent.and_then(|p| p.absolute_bounding_box) {
            layout.location_relative_to_parent = Some(LayoutPoint {
                x: round2(bounds.x - parent_bounds.x),
                y: round2(bounds.y - parent_bounds.y),
            });
        }
    }

    let aspect_ratio = (node.preserve_ratio == Some(true) && bounds.height > 0.0)
        .then(|| round2(bounds.width / bounds.height));
    layout.dimensions = Some(LayoutDimensions {
        width: Some(round2(bounds.width)),
        height: Some(round2(bounds.height)),
        aspect_ratio,
    });
}

fn sizing_mode(raw: Option<&str>) -> Option<SizingMode> {
    match raw {
        Some("FIXED") => Some(SizingMode::Fixed),
        Some("FILL") => Some(SizingMode::Fill),
        Some("HUG") => Some(SizingMode::Hug),
        _ => None,
    }
}

pub(crate) fn px(value: f64) -> String {
    format!("{}px", round2(value))
}

/// CSS box shorthand (`8px`, `8px 16px`, `8px 16px 4px`, `1px 2px 3px 4px`).
pub(crate) fn padding_shorthand(top: f64, right: f64, bottom: f64, left: f64) -> Option<String> {
    if top == 0.0 && right == 0.0 && bottom == 0.0 && left == 0.0 {
        return None;
    }
    let shorthand = if top == bottom && right == left {
        if top == right {
            px(top)
        } else {
            format!("{} {}", px(top), px(right))
        }
    } else if right == left {
        format!("{} {} {}", px(top), px(right), px(bottom))
    } else {
        format!("{} {} {} {}", px(top), px(right), px(bottom), px(left))
    };
    Some(shorthand)
}
