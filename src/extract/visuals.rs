//! Fills, strokes, effects, opacity and corner radius.

use crate::figma::api_types::{round2, FigmaEffect, FigmaPaint, RawNode};
use crate::types::{
    ImageReference, PaintFill, SimplifiedEffects, SimplifiedFill, SimplifiedNode, SimplifiedStrokes,
};

use super::layout::{padding_shorthand, px};
use super::traversal::TraversalContext;

pub fn visuals_extractor(node: &RawNode, result: &mut SimplifiedNode, ctx: &mut TraversalContext<'_>) {
    if !node.has_visual_trait() {
        return;
    }

    let fills = simplify_paints(&node.fills);
    if !fills.is_empty() {
        record_image_fills(node, ctx);
        let named = node.style_ref(&["fill", "fills"]);
        result.fills = Some(ctx.global_vars.intern(named, fills));
    }

    if let Some(strokes) = build_strokes(node) {
        let named = node.style_ref(&["stroke", "strokes"]);
        result.strokes = Some(ctx.global_vars.intern(named, strokes));
    }

    let effects = build_effects(&node.effects, node.has_text_trait());
    if !effects.is_empty() {
        let named = node.style_ref(&["effect", "effects"]);
        result.effects = Some(ctx.global_vars.intern(named, effects));
    }

    if let Some(opacity) = node.opacity.filter(|o| *o < 1.0) {
        result.opacity = Some(round2(opacity));
    }
    result.border_radius = border_radius(node);
}

pub fn simplify_paints(paints: &[FigmaPaint]) -> Vec<SimplifiedFill> {
    paints
        .iter()
        .filter(|p| p.is_visible())
        .filter_map(simplify_paint)
        .collect()
}

fn simplify_paint(paint: &FigmaPaint) -> Option<SimplifiedFill> {
    match paint.paint_type.as_str() {
        "SOLID" => paint
            .color
            .map(|color| SimplifiedFill::Solid(color.to_css(paint.opacity))),
        "IMAGE" => Some(SimplifiedFill::Paint(PaintFill {
            paint_type: "IMAGE".to_string(),
            image_ref: paint.image_ref.clone(),
            scale_mode: paint.scale_mode.clone(),
            needs_cropping: Some(needs_cropping(paint)),
            gradient: None,
            opacity: paint.opacity.filter(|o| *o < 1.0).map(round2),
        })),
        kind if kind.starts_with("GRADIENT_") => Some(SimplifiedFill::Paint(PaintFill {
            paint_type: kind.to_string(),
            image_ref: None,
            scale_mode: None,
            needs_cropping: None,
            gradient: Some(gradient_css(paint)),
            opacity: paint.opacity.filter(|o| *o < 1.0).map(round2),
        })),
        _ => None,
    }
}

fn needs_cropping(paint: &FigmaPaint) -> bool {
    paint.scale_mode.as_deref() == Some("CROP") && paint.image_transform.is_some()
}

fn record_image_fills(node: &RawNode, ctx: &mut TraversalContext<'_>) {
    for paint in node.fills.iter().filter(|p| p.is_visible()) {
        let Some(image_ref) = paint.image_ref.as_ref().filter(|_| paint.paint_type == "IMAGE")
        else {
            continue;
        };
        ctx.global_vars
            .images
            .entry(image_ref.clone())
            .or_insert_with(|| ImageReference {
                node_id: node.id.clone(),
                scale_mode: paint.scale_mode.clone(),
                needs_cropping: needs_cropping(paint),
                crop_transform: paint.image_transform,
            });
    }
}

fn gradient_css(paint: &FigmaPaint) -> String {
    let stops: Vec<String> = paint
        .gradient_stops
        .iter()
        .map(|stop| {
            format!(
                "{} {}%",
                stop.color.to_css(paint.opacity),
                round2(stop.position * 100.0)
            )
        })
        .collect();
    let stops = stops.join(", ");

    match paint.paint_type.as_str() {
        "GRADIENT_RADIAL" | "GRADIENT_DIAMOND" => format!("radial-gradient(circle, {})", stops),
        "GRADIENT_ANGULAR" => format!("conic-gradient({})", stops),
        _ => {
            let angle = match paint.gradient_handle_positions.as_slice() {
                [start, end, ..] => {
                    let degrees = (end.y - start.y).atan2(end.x - start.x).to_degrees() + 90.0;
                    round2(degrees.rem_euclid(360.0))
                }
                _ => 180.0,
            };
            format!("linear-gradient({}deg, {})", angle, stops)
        }
    }
}

fn build_strokes(node: &RawNode) -> Option<SimplifiedStrokes> {
    let colors = simplify_paints(&node.strokes);
    if colors.is_empty() {
        return None;
    }

    let stroke_weights = node
        .individual_stroke_weights
        .and_then(|w| padding_shorthand(w.top, w.right, w.bottom, w.left));

    Some(SimplifiedStrokes {
        colors,
        stroke_weight: node.stroke_weight.filter(|w| *w > 0.0).map(px),
        stroke_dashes: node
            .stroke_dashes
            .as_ref()
            .filter(|d| !d.is_empty())
            .map(|d| d.iter().copied().map(round2).collect()),
        stroke_weights,
    })
}

pub fn build_effects(effects: &[FigmaEffect], is_text: bool) -> SimplifiedEffects {
    let visible: Vec<&FigmaEffect> = effects.iter().filter(|e| e.is_visible()).collect();

    let mut box_shadows = Vec::new();
    let mut text_shadows = Vec::new();
    let mut filters = Vec::new();
    let mut backdrop_filters = Vec::new();

    for effect in visible {
        match effect.effect_type.as_str() {
            "DROP_SHADOW" if is_text => text_shadows.push(shadow_css(effect, false, false)),
            "DROP_SHADOW" => box_shadows.push(shadow_css(effect, false, true)),
            "INNER_SHADOW" => box_shadows.push(shadow_css(effect, true, true)),
            "LAYER_BLUR" => filters.push(format!("blur({})", px(effect.radius))),
            "BACKGROUND_BLUR" => backdrop_filters.push(format!("blur({})", px(effect.radius))),
            _ => {}
        }
    }

    let joined = |parts: Vec<String>, sep: &str| (!parts.is_empty()).then(|| parts.join(sep));
    SimplifiedEffects {
        box_shadow: joined(box_shadows, ", "),
        text_shadow: joined(text_shadows, ", "),
        filter: joined(filters, " "),
        backdrop_filter: joined(backdrop_filters, " "),
    }
}

fn shadow_css(effect: &FigmaEffect, inset: bool, with_spread: bool) -> String {
    let (x, y) = effect.offset.map(|o| (o.x, o.y)).unwrap_or((0.0, 0.0));
    let color = effect
        .color
        .map(|c| c.to_css(None))
        .unwrap_or_else(|| "rgba(0, 0, 0, 0.25)".to_string());
    let mut parts = Vec::with_capacity(6);
    if inset {
        parts.push("inset".to_string());
    }
    parts.push(px(x));
    parts.push(px(y));
    parts.push(px(effect.radius));
    if with_spread {
        parts.push(px(effect.spread.unwrap_or(0.0)));
    }
    parts.push(color);
    parts.join(" ")
}

fn border_radius(node: &RawNode) -> Option<String> {
    if let Some(&[tl, tr, br, bl]) = node.rectangle_corner_radii.as_deref() {
        if tl == tr && tr == br && br == bl {
            return (tl > 0.0).then(|| px(tl));
        }
        return Some(format!("{} {} {} {}", px(tl), px(tr), px(br), px(bl)));
    }
    node.corner_radius.filter(|r| *r > 0.0).map(px)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::traversal::{traverse, TraversalOptions};
    use crate::types::GlobalVars;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawNode {
        serde_json::from_value(value).expect("raw node")
    }

    fn effects(value: serde_json::Value) -> Vec<FigmaEffect> {
        serde_json::from_value(value).expect("effects")
    }

    #[test]
    fn solid_fills_become_css_colors() {
        let paints: Vec<FigmaPaint> = serde_json::from_value(json!([
            {"type": "SOLID", "color": {"r": 1, "g": 0.5, "b": 0, "a": 1}},
            {"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0, "a": 1}, "opacity": 0.5},
            {"type": "SOLID", "visible": false, "color": {"r": 0, "g": 0, "b": 1, "a": 1}}
        ]))
        .unwrap();
        let fills = simplify_paints(&paints);
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].as_color(), Some("#FF8000"));
        assert_eq!(fills[1].as_color(), Some("rgba(0, 0, 0, 0.5)"));
    }

    #[test]
    fn shadows_route_by_node_kind() {
        let list = effects(json!([
            {"type": "DROP_SHADOW", "radius": 4, "offset": {"x": 0, "y": 2},
             "color": {"r": 0, "g": 0, "b": 0, "a": 0.25}},
            {"type": "INNER_SHADOW", "radius": 2, "offset": {"x": 1, "y": 1}, "spread": 1,
             "color": {"r": 0, "g": 0, "b": 0, "a": 1}},
            {"type": "LAYER_BLUR", "radius": 8, "visible": false},
            {"type": "BACKGROUND_BLUR", "radius": 10}
        ]));

        let frame = build_effects(&list, false);
        assert_eq!(
            frame.box_shadow.as_deref(),
            Some("0px 2px 4px 0px rgba(0, 0, 0, 0.25), inset 1px 1px 2px 1px #000000")
        );
        assert!(frame.text_shadow.is_none());
        assert!(frame.filter.is_none(), "invisible blur is dropped");
        assert_eq!(frame.backdrop_filter.as_deref(), Some("blur(10px)"));

        let text = build_effects(&list, true);
        assert_eq!(text.text_shadow.as_deref(), Some("0px 2px 4px rgba(0, 0, 0, 0.25)"));
        assert_eq!(text.box_shadow.as_deref(), Some("inset 1px 1px 2px 1px #000000"));
    }

    #[test]
    fn image_fills_are_recorded_in_global_vars() {
        let node = raw(json!({
            "id": "7:1", "name": "Hero", "type": "RECTANGLE",
            "fills": [{"type": "IMAGE", "imageRef": "img-abc", "scaleMode": "CROP",
                       "imageTransform": [[0.5, 0, 0.25], [0, 0.5, 0.25]]}]
        }));
        let result = traverse(&[node], &[visuals_extractor], &TraversalOptions::default(), GlobalVars::new());

        let image = &result.global_vars.images["img-abc"];
        assert_eq!(image.node_id, "7:1");
        assert!(image.needs_cropping);
        assert!(result.nodes[0].fills.is_some());
    }

    #[test]
    fn named_fill_styles_go_to_design_system() {
        let node = raw(json!({
            "id": "1", "name": "Button", "type": "FRAME",
            "fills": [{"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0}}],
            "styles": {"fill": "S:brand"}
        }));
        let result = traverse(&[node], &[visuals_extractor], &TraversalOptions::default(), GlobalVars::new());
        assert_eq!(result.nodes[0].fills.as_deref(), Some("S:brand"));
        assert!(result.global_vars.design_system.fills.contains_key("S:brand"));
    }

    #[test]
    fn stroke_dashes_are_rounded() {
        let node = raw(json!({
            "id": "1", "name": "Divider", "type": "LINE",
            "strokes": [{"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0, "a": 1}}],
            "strokeWeight": 1,
            "strokeDashes": [3.3333333333, 1.005]
        }));
        let strokes = build_strokes(&node).expect("strokes");
        let dashes = strokes.stroke_dashes.expect("dashes");
        assert_eq!(dashes.len(), 2);
        assert_eq!(dashes[0], 3.33);
        assert!((dashes[1] - 1.0).abs() < 0.011);
    }

    #[test]
    fn opacity_and_radius() {
        let node = raw(json!({
            "id": "1", "name": "Chip", "type": "RECTANGLE",
            "opacity": 0.456, "rectangleCornerRadii": [4, 4, 0, 0]
        }));
        let result = traverse(&[node], &[visuals_extractor], &TraversalOptions::default(), GlobalVars::new());
        assert_eq!(result.nodes[0].opacity, Some(0.46));
        assert_eq!(result.nodes[0].border_radius.as_deref(), Some("4px 4px 0px 0px"));
    }

    #[test]
    fn linear_gradient_angle_follows_handles() {
        let paints: Vec<FigmaPaint> = serde_json::from_value(json!([{
            "type": "GRADIENT_LINEAR",
            "gradientHandlePositions": [{"x": 0.5, "y": 0}, {"x": 0.5, "y": 1}, {"x": 0, "y": 0}],
            "gradientStops": [
                {"position": 0, "color": {"r": 1, "g": 1, "b": 1, "a": 1}},
                {"position": 1, "color": {"r": 0, "g": 0, "b": 0, "a": 1}}
            ]
        }]))
        .unwrap();
        let fills = simplify_paints(&paints);
        match &fills[0] {
            SimplifiedFill::Paint(paint) => assert_eq!(
                paint.gradient.as_deref(),
                Some("linear-gradient(180deg, #FFFFFF 0%, #000000 100%)")
            ),
            other => panic!("unexpected fill {other:?}"),
        }
    }
}
