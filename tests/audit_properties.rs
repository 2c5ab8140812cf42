use async_trait::async_trait;
use figma_audit::audit::ai::detect_patterns;
use figma_audit::audit::rules::{cluster_by_dimensions, contrast_ratio};
use figma_audit::types::{LayoutDimensions, SimplifiedLayout};
use figma_audit::{
    simplify, AuditContext, Auditor, FigmaAuditError, GlobalVars, LlmClient, LlmError, Rule,
    RuleRegistry, RuleState, SimplifiedDesign, SimplifiedNode, TraversalOptions, ALL_EXTRACTORS,
};
use palette::Srgb;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn rgb(gray: f64) -> Value {
    json!([{"type": "SOLID", "color": {"r": gray, "g": gray, "b": gray, "a": 1.0}}])
}

fn text(id: &str, size: f64, line_height: f64, gray: f64) -> Value {
    json!({
        "id": id,
        "name": "Copy",
        "type": "TEXT",
        "characters": "Hello",
        "style": {"fontFamily": "Inter", "fontWeight": 400, "fontSize": size, "lineHeightPx": line_height},
        "fills": rgb(gray),
        "absoluteBoundingBox": {"x": 0.0, "y": 0.0, "width": 100.0, "height": line_height}
    })
}

fn card(id: &str, body_size: f64) -> Value {
    json!({
        "id": id,
        "name": "Card",
        "type": "FRAME",
        "layoutMode": "VERTICAL",
        "absoluteBoundingBox": {"x": 0.0, "y": 0.0, "width": 320.0, "height": 200.0},
        "fills": rgb(1.0),
        "children": [
            text(&format!("{id}:title"), 24.0, 36.0, 0.0),
            text(&format!("{id}:body"), body_size, body_size * 1.5, 0.0)
        ]
    })
}

fn design(children: Vec<Value>) -> SimplifiedDesign {
    let raw = json!({
        "name": "Audit",
        "lastModified": "2024-05-01T10:00:00Z",
        "document": {
            "id": "0:0",
            "name": "Document",
            "type": "DOCUMENT",
            "children": [{"id": "0:1", "name": "Page 1", "type": "CANVAS", "children": children}]
        },
        "components": {},
        "styles": {}
    });
    simplify(&raw, ALL_EXTRACTORS, &TraversalOptions::default()).expect("simplify")
}

fn only_rule(design: &SimplifiedDesign, rule: &dyn Rule) -> Vec<figma_audit::AuditFinding> {
    rule.check(&AuditContext::new(design)).expect("rule")
}

#[test]
fn black_on_white_is_twenty_one_to_one() {
    let ratio = contrast_ratio(Srgb::new(0.0, 0.0, 0.0), Srgb::new(1.0, 1.0, 1.0));
    assert!((ratio - 21.0).abs() < 1e-9);
    let same = contrast_ratio(Srgb::new(0.3, 0.5, 0.7), Srgb::new(0.3, 0.5, 0.7));
    assert!((same - 1.0).abs() < 1e-9);
}

#[test]
fn gray_text_on_white_fails_aa() {
    let frame = json!({
        "id": "1:1",
        "name": "Panel",
        "type": "FRAME",
        "fills": rgb(1.0),
        "children": [text("1:2", 16.0, 24.0, 119.0 / 255.0), text("1:3", 16.0, 24.0, 0.0)]
    });
    let design = design(vec![frame]);
    let findings = only_rule(&design, &figma_audit::audit::rules::ColorContrast);

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.node_id, "1:2");
    let infos = finding.more_infos.as_ref().expect("more infos");
    assert_eq!(infos["level"], "AA");
    assert_eq!(infos["foreground"], "#777777");
    assert_eq!(infos["background"], "#FFFFFF");
    let ratio = infos["ratio"].as_f64().expect("ratio");
    assert!((ratio - 4.48).abs() < 0.01, "ratio {ratio}");
}

#[test]
fn small_tight_text_reports_both_problems() {
    let design = design(vec![text("1:1", 14.0, 18.0, 0.0), text("1:2", 16.0, 24.0, 0.0)]);
    let findings = only_rule(&design, &figma_audit::audit::rules::TypographyReadability);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].node_id, "1:1");
    assert_eq!(
        findings[0].message.as_deref(),
        Some("Font size 14px is below 16px and line height 1.29 is below 1.5")
    );
}

fn sized(vars: &mut GlobalVars, id: &str, width: f64) -> SimplifiedNode {
    let mut node = SimplifiedNode::new(id, id, "FRAME");
    let layout = SimplifiedLayout {
        dimensions: Some(LayoutDimensions {
            width: Some(width),
            height: Some(50.0),
            aspect_ratio: None,
        }),
        ..SimplifiedLayout::none()
    };
    node.layout = Some(vars.intern(None, layout));
    node
}

#[test]
fn clustering_groups_nodes_within_tolerance() {
    let mut vars = GlobalVars::new();
    let a = sized(&mut vars, "a", 100.0);
    let b = sized(&mut vars, "b", 104.0);
    let c = sized(&mut vars, "c", 250.0);

    let clusters = cluster_by_dimensions(&[&a, &b, &c], &vars, 0.8);
    let ids: Vec<Vec<&str>> = clusters
        .iter()
        .map(|cluster| cluster.iter().map(|n| n.id.as_str()).collect())
        .collect();
    assert_eq!(ids, vec![vec!["a", "b"], vec!["c"]]);
}

#[test]
fn repeated_cards_are_duplicates_and_variant_candidates() {
    let design = design(vec![card("1:1", 16.0), card("1:2", 16.0), card("1:3", 20.0)]);

    let duplicates = only_rule(&design, &figma_audit::audit::rules::DuplicateStructures::default());
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].node_id, "1:1");
    let nodes = &duplicates[0].more_infos.as_ref().expect("infos")["nodes"];
    assert_eq!(nodes.as_array().map(Vec::len), Some(2));

    let variants = only_rule(&design, &figma_audit::audit::rules::VariantCandidates::default());
    assert_eq!(variants.len(), 1);
    let nodes = &variants[0].more_infos.as_ref().expect("infos")["nodes"];
    assert_eq!(nodes.as_array().map(Vec::len), Some(3));
}

#[test]
fn rule_state_transitions() {
    let registry = RuleRegistry::default();
    registry.disable(1).expect("disable");
    assert_eq!(registry.get(1).map(|d| d.state), Some(RuleState::Disabled));
    registry.enable(1).expect("enable");
    assert_eq!(registry.get(1).map(|d| d.state), Some(RuleState::Enabled));

    registry.mark_error(2, "boom");
    assert!(registry.enable(2).is_err());
    registry.disable(2).expect("disable is a no-op");
    assert_eq!(registry.get(2).map(|d| d.state), Some(RuleState::Error));

    assert!(registry.disable(99).is_err());
}

struct Failing;

impl Rule for Failing {
    fn id(&self) -> u32 {
        1
    }

    fn check(&self, _ctx: &AuditContext<'_>) -> figma_audit::Result<Vec<figma_audit::AuditFinding>> {
        Err(FigmaAuditError::rule(1, "cannot evaluate"))
    }
}

#[tokio::test]
async fn failing_rule_is_isolated_and_moved_to_error() {
    let design = design(vec![json!({"id": "1:1", "name": "Frame 1", "type": "FRAME"})]);
    let registry = Arc::new(RuleRegistry::default());
    let auditor = Auditor::with_rules(
        registry.clone(),
        vec![Box::new(Failing), Box::new(figma_audit::audit::rules::DefaultLayerNames)],
        Vec::new(),
    );

    let report = auditor.run_audit(&AuditContext::new(&design)).await;
    assert_eq!(report.summary.rule_errors.len(), 1);
    assert_eq!(report.summary.rule_errors[0].message, "cannot evaluate");
    assert_eq!(registry.get(1).map(|d| d.state), Some(RuleState::Error));

    let again = auditor.run_audit(&AuditContext::new(&design)).await;
    assert!(again.summary.rule_errors.is_empty());
}

#[tokio::test]
async fn disabled_rules_do_not_run() {
    let design = design(vec![json!({"id": "1:1", "name": "Frame 1", "type": "FRAME"})]);
    let registry = Arc::new(RuleRegistry::default());
    let auditor = Auditor::new(registry.clone());

    let report = auditor.run_audit(&AuditContext::new(&design)).await;
    assert_eq!(report.summary.issues_by_rule.get(&1), Some(&1));

    registry.apply_disabled(&[1]);
    let report = auditor.run_audit(&AuditContext::new(&design)).await;
    assert!(report.results.iter().all(|f| f.rule_id != 1));
    assert_eq!(report.summary.total_issues, report.results.len());
}

struct Counting {
    reply: Option<Value>,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmClient for Counting {
    async fn call(&self, _prompt: &str, max_attempts: u32) -> Result<Value, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(LlmError::Exhausted {
            attempts: max_attempts,
            last_error: "unavailable".into(),
        })
    }
}

#[tokio::test]
async fn ai_rules_degrade_to_no_findings() {
    let design = design(vec![card("1:1", 16.0), card("1:2", 16.0)]);
    let ctx = AuditContext::new(&design);

    assert!(detect_patterns(&ctx, None, 3).await.is_empty());

    let failing = Arc::new(Counting {
        reply: None,
        calls: AtomicUsize::new(0),
    });
    let auditor = Auditor::new(Arc::new(RuleRegistry::default())).with_llm(failing.clone(), 2);
    let report = auditor.run_audit(&ctx).await;
    assert!(report.results.iter().all(|f| f.rule_id < 10));
    assert!(report.summary.rule_errors.is_empty());
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn detected_patterns_become_findings() {
    let design = design(vec![card("1:1", 16.0), card("1:2", 16.0), card("1:3", 16.0)]);
    let llm = Counting {
        reply: Some(json!({"patterns": [
            {"componentName": "Product card", "description": "Title and body", "rootNodeId": "1:1", "rootNodeName": "Card"},
            {"componentName": "Product card", "description": "Title and body", "rootNodeId": "1:2", "rootNodeName": "Card"},
            {"componentName": "Product card", "description": "Title and body", "rootNodeId": "1:2", "rootNodeName": "Card"},
            {"unexpected": true}
        ]})),
        calls: AtomicUsize::new(0),
    };

    let findings = detect_patterns(&AuditContext::new(&design), Some(&llm), 3).await;
    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.rule_id, 10);
    assert_eq!(finding.node_id, "1:1");
    let infos = finding.more_infos.as_ref().expect("infos");
    assert_eq!(infos["componentName"], "Product card");
    assert_eq!(infos["instances"].as_array().map(Vec::len), Some(2));
    assert_eq!(infos["structure"]["children"].as_array().map(Vec::len), Some(2));
}
