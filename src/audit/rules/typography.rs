//! Readability minimums for text styles: font size and line height.

use serde_json::json;
use std::collections::BTreeMap;

use crate::audit::{AuditContext, Rule};
use crate::error::Result;
use crate::figma::api_types::round2;
use crate::types::{AuditFinding, LineHeight, RuleId, SimplifiedNode, TextStyle};

use super::TYPOGRAPHY_READABILITY;

const MIN_FONT_SIZE: f64 = 16.0;
const MIN_LINE_HEIGHT_RATIO: f64 = 1.5;

/// Why a text style is hard to read.
#[derive(Debug, Clone, PartialEq, Default)]
struct Readability {
    font_size: Option<f64>,
    line_height_ratio: Option<f64>,
}

impl Readability {
    fn is_ok(&self) -> bool {
        self.font_size.is_none() && self.line_height_ratio.is_none()
    }

    fn message(&self) -> String {
        let mut parts = Vec::new();
        if let Some(size) = self.font_size {
            parts.push(format!(
                "font size {}px is below {}px",
                round2(size),
                MIN_FONT_SIZE
            ));
        }
        if let Some(ratio) = self.line_height_ratio {
            parts.push(format!(
                "line height {:.2} is below {}",
                ratio, MIN_LINE_HEIGHT_RATIO
            ));
        }
        let mut message = parts.join(" and ");
        if let Some(first) = message.get(..1) {
            message = first.to_uppercase() + &message[1..];
        }
        message
    }
}

fn line_height_ratio(style: &TextStyle) -> Option<f64> {
    match style.line_height? {
        LineHeight::Auto => None,
        LineHeight::Em(em) => Some(em),
        LineHeight::Percent(percent) => Some(percent / 100.0),
        LineHeight::Pixels(px) => match style.font_size {
            Some(size) if size > 0.0 => Some(px / size),
            _ => None,
        },
    }
}

fn assess(style: &TextStyle) -> Readability {
    Readability {
        font_size: style.font_size.filter(|size| *size < MIN_FONT_SIZE),
        line_height_ratio: line_height_ratio(style).filter(|ratio| *ratio < MIN_LINE_HEIGHT_RATIO),
    }
}

/// Text styles (both registry halves) that fail readability, by key.
fn failing_styles<'a>(ctx: &AuditContext<'a>) -> BTreeMap<&'a str, Readability> {
    let vars = ctx.global_vars();
    vars.design_system
        .text
        .iter()
        .chain(vars.local_styles.text.iter())
        .filter_map(|(key, entry)| {
            let verdict = assess(entry.value());
            (!verdict.is_ok()).then_some((key.as_str(), verdict))
        })
        .collect()
}

/// WCAG-inspired minimums: 16px body text, 1.5 line height.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypographyReadability;

impl Rule for TypographyReadability {
    fn id(&self) -> RuleId {
        TYPOGRAPHY_READABILITY
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        let failing = failing_styles(ctx);
        if failing.is_empty() {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        let mut stack: Vec<&SimplifiedNode> = ctx.roots().iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().iter().rev());
            if !node.is_type("TEXT") {
                continue;
            }
            let Some(key) = node.text_style.as_deref() else {
                continue;
            };
            let Some(verdict) = failing.get(key) else {
                continue;
            };
            findings.push(
                AuditFinding::new(self.id(), node, verdict.message()).with_more_infos(json!({
                    "textStyle": key,
                    "fontSize": verdict.font_size,
                    "lineHeightRatio": verdict.line_height_ratio.map(round2),
                })),
            );
        }
        Ok(findings)
    }
}
