use figma_audit::types::{StyleConcern, StyleOrigin};
use figma_audit::{
    simplify, FigmaAuditError, SimplifiedDesign, SimplifiedNode, TraversalOptions, ALL_EXTRACTORS,
    CONTENT_ONLY,
};
use serde_json::{json, Value};

fn text(id: &str, characters: &str, size: f64, style_id: Option<&str>) -> Value {
    let mut node = json!({
        "id": id,
        "name": characters,
        "type": "TEXT",
        "characters": characters,
        "style": {"fontFamily": "Inter", "fontWeight": 400, "fontSize": size, "lineHeightPx": size * 1.5},
        "fills": [{"type": "SOLID", "color": {"r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0}}],
        "absoluteBoundingBox": {"x": 0.0, "y": 0.0, "width": 120.0, "height": size * 1.5}
    });
    if let Some(style_id) = style_id {
        node["styles"] = json!({"text": style_id});
    }
    node
}

fn card(id: &str, visible: bool) -> Value {
    json!({
        "id": id,
        "name": "Card",
        "type": "FRAME",
        "visible": visible,
        "layoutMode": "VERTICAL",
        "itemSpacing": 8.0,
        "paddingTop": 16.0, "paddingRight": 16.0, "paddingBottom": 16.0, "paddingLeft": 16.0,
        "absoluteBoundingBox": {"x": 0.0, "y": 0.0, "width": 320.0, "height": 200.0},
        "fills": [{"type": "SOLID", "color": {"r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0}}],
        "children": [
            text(&format!("{id}:title"), "Title", 24.0, Some("S:heading")),
            text(&format!("{id}:body"), "Body", 16.0, None),
            {
                "id": format!("{id}:footer"),
                "name": "Footer",
                "type": "FRAME",
                "children": [text(&format!("{id}:meta"), "Meta", 16.0, None)]
            }
        ]
    })
}

fn whole_file() -> Value {
    json!({
        "name": "Shop",
        "lastModified": "2024-05-01T10:00:00Z",
        "thumbnailUrl": "https://example.com/thumb.png",
        "document": {
            "id": "0:0",
            "name": "Document",
            "type": "DOCUMENT",
            "children": [{
                "id": "0:1",
                "name": "Page 1",
                "type": "CANVAS",
                "children": [card("1:1", true), card("1:2", false), card("1:3", true)]
            }]
        },
        "components": {},
        "componentSets": {},
        "styles": {
            "S:heading": {"key": "h", "name": "Heading/H2", "styleType": "TEXT", "description": ""}
        }
    })
}

fn max_nesting(node: &SimplifiedNode) -> u32 {
    node.children()
        .iter()
        .map(|child| 1 + max_nesting(child))
        .max()
        .unwrap_or(0)
}

fn simplify_default(raw: &Value) -> SimplifiedDesign {
    simplify(raw, ALL_EXTRACTORS, &TraversalOptions::default()).expect("simplify")
}

#[test]
fn depth_limit_bounds_nesting_from_each_root() {
    let raw = whole_file();
    for depth in 0..4 {
        let design =
            simplify(&raw, ALL_EXTRACTORS, &TraversalOptions::with_max_depth(depth)).expect("simplify");
        for root in &design.nodes {
            assert!(max_nesting(root) <= depth, "depth {depth} exceeded");
        }
        if depth == 0 {
            assert!(design.all_nodes().iter().all(|n| !n.has_children()));
        }
    }
    // Page > card > footer > meta
    assert_eq!(max_nesting(&simplify_default(&raw).nodes[0]), 3);
}

#[test]
fn hidden_nodes_drop_their_whole_subtree() {
    let design = simplify_default(&whole_file());
    assert!(design.find_node("1:2").is_none());
    assert!(design.find_node("1:2:title").is_none());
    assert!(design.find_node("1:2:meta").is_none());
    assert!(design.find_node("1:3:meta").is_some());
}

#[test]
fn every_referenced_key_lives_in_exactly_one_half() {
    let design = simplify_default(&whole_file());
    let vars = &design.global_vars;
    let mut checked = 0;
    for node in design.all_nodes() {
        let refs = [
            (StyleConcern::Text, &node.text_style),
            (StyleConcern::Fills, &node.fills),
            (StyleConcern::Strokes, &node.strokes),
            (StyleConcern::Effects, &node.effects),
            (StyleConcern::Layout, &node.layout),
        ];
        for (concern, key) in refs {
            let Some(key) = key else { continue };
            let in_ds = vars.design_system.contains(concern, key);
            let in_local = vars.local_styles.contains(concern, key);
            assert!(in_ds ^ in_local, "{key} must be in exactly one half");
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn named_styles_go_to_the_design_system_and_values_are_shared() {
    let design = simplify_default(&whole_file());
    let vars = &design.global_vars;

    let title = design.find_node("1:1:title").expect("title");
    assert_eq!(title.text_style.as_deref(), Some("S:heading"));
    assert_eq!(
        vars.origin(StyleConcern::Text, "S:heading"),
        Some(StyleOrigin::DesignSystem)
    );
    assert_eq!(vars.design_system.text["S:heading"].name(), Some("Heading/H2"));

    let body = design.find_node("1:1:body").expect("body");
    let meta = design.find_node("1:3:meta").expect("meta");
    assert_eq!(body.text_style, meta.text_style);
    assert_eq!(vars.local_styles.text.len(), 1);
    assert_eq!(body.fills, title.fills);
}

#[test]
fn simplified_design_round_trips_through_json() {
    let design = simplify_default(&whole_file());
    let json = serde_json::to_string(&design).expect("serialize");
    let back: SimplifiedDesign = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, design);

    let value = serde_json::to_value(&design).expect("value");
    for key in ["name", "lastModified", "thumbnailUrl", "nodes", "components", "componentSets", "globalVars"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

/// Deterministic linear congruential generator for fractional fixtures.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next() * (hi - lo)
    }
}

fn color(rng: &mut Lcg) -> Value {
    json!({"r": rng.next(), "g": rng.next(), "b": rng.next(), "a": rng.between(0.05, 1.0)})
}

fn fractional_text(rng: &mut Lcg, id: String) -> Value {
    let size = rng.between(9.0, 40.0);
    json!({
        "id": id,
        "name": "Label",
        "type": "TEXT",
        "characters": "Label",
        "style": {
            "fontFamily": "Inter",
            "fontWeight": rng.between(100.0, 900.0),
            "fontSize": size,
            "lineHeightPx": size * rng.between(0.9, 2.2),
            "letterSpacing": rng.between(-1.0, 2.0)
        },
        "fills": [{"type": "SOLID", "color": color(rng), "opacity": rng.next()}],
        "absoluteBoundingBox": {
            "x": rng.between(-500.0, 500.0),
            "y": rng.between(-500.0, 500.0),
            "width": rng.between(1.0, 600.0),
            "height": rng.between(1.0, 80.0)
        }
    })
}

fn fractional_frame(rng: &mut Lcg, id: &str) -> Value {
    json!({
        "id": id,
        "name": "Panel",
        "type": "FRAME",
        "layoutMode": "HORIZONTAL",
        "itemSpacing": rng.between(0.0, 48.0),
        "paddingTop": rng.between(0.0, 32.0),
        "paddingRight": rng.between(0.0, 32.0),
        "paddingBottom": rng.between(0.0, 32.0),
        "paddingLeft": rng.between(0.0, 32.0),
        "absoluteBoundingBox": {
            "x": rng.between(-2000.0, 2000.0),
            "y": rng.between(-2000.0, 2000.0),
            "width": rng.between(1.0, 1440.0),
            "height": rng.between(1.0, 1024.0)
        },
        "opacity": rng.next(),
        "cornerRadius": rng.between(0.5, 24.0),
        "fills": [{"type": "SOLID", "color": color(rng)}],
        "strokes": [{"type": "SOLID", "color": color(rng)}],
        "strokeWeight": rng.between(0.25, 4.0),
        "strokeDashes": [rng.between(1.0, 8.0), rng.between(1.0, 8.0)],
        "effects": [{
            "type": "DROP_SHADOW",
            "radius": rng.between(0.0, 24.0),
            "spread": rng.between(0.0, 8.0),
            "offset": {"x": rng.between(-8.0, 8.0), "y": rng.between(-8.0, 8.0)},
            "color": color(rng)
        }],
        "children": [fractional_text(rng, format!("{id}:a")), fractional_text(rng, format!("{id}:b"))]
    })
}

#[test]
fn fractional_values_round_trip_through_json() {
    for seed in 0..64u64 {
        let mut rng = Lcg(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0xD1B5_4A32_D192_ED03);
        let raw = json!({
            "name": "Fractions",
            "lastModified": "2024-05-01T10:00:00Z",
            "document": {
                "id": "0:0",
                "name": "Document",
                "type": "DOCUMENT",
                "children": [{
                    "id": "0:1",
                    "name": "Page 1",
                    "type": "CANVAS",
                    "children": [fractional_frame(&mut rng, "1:1"), fractional_frame(&mut rng, "1:2")]
                }]
            },
            "components": {},
            "styles": {}
        });
        let design = simplify_default(&raw);
        assert!(!design.global_vars.local_styles.text.is_empty(), "seed {seed}");

        let json = serde_json::to_string(&design).expect("serialize");
        let back: SimplifiedDesign = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, design, "seed {seed}");
        assert_eq!(serde_json::to_string(&back).expect("serialize again"), json, "seed {seed}");
    }
}

#[test]
fn presets_limit_what_is_extracted() {
    let design = simplify(&whole_file(), CONTENT_ONLY, &TraversalOptions::default()).expect("simplify");
    let title = design.find_node("1:1:title").expect("title");
    assert_eq!(title.text.as_deref(), Some("Title"));
    assert!(title.layout.is_none());
    assert!(title.fills.is_none());
    assert!(design.global_vars.local_styles.layout.is_empty());
}

#[test]
fn node_filter_prunes_subtrees() {
    let no_footers = |node: &figma_audit::RawNode| node.name != "Footer";
    let options = TraversalOptions {
        max_depth: None,
        node_filter: Some(&no_footers),
    };
    let design = simplify(&whole_file(), ALL_EXTRACTORS, &options).expect("simplify");
    assert!(design.find_node("1:1:footer").is_none());
    assert!(design.find_node("1:1:meta").is_none());
    assert!(design.find_node("1:1:body").is_some());
}

#[test]
fn unsupported_envelopes_fail_without_output() {
    let err = simplify(&json!([1, 2]), ALL_EXTRACTORS, &TraversalOptions::default())
        .expect_err("array");
    assert!(matches!(err, FigmaAuditError::InvalidDesign(_)));
    assert!(err.to_string().contains("array"));

    let err = simplify(&json!({"name": "x"}), ALL_EXTRACTORS, &TraversalOptions::default())
        .expect_err("no document");
    assert!(err.to_string().contains("unsupported envelope"));
}
