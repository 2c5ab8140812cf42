//! WCAG 2.x contrast between text and the nearest painted ancestor.

use palette::Srgb;
use regex::Regex;
use serde_json::json;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::audit::{AuditContext, Rule};
use crate::error::Result;
use crate::figma::api_types::round2;
use crate::types::{AuditFinding, GlobalVars, RuleId, SimplifiedNode};

use super::COLOR_CONTRAST;

const AA_NORMAL: f64 = 4.5;
const AA_LARGE: f64 = 3.0;
const AAA_NORMAL: f64 = 7.0;
const AAA_LARGE: f64 = 4.5;

const LARGE_TEXT_SIZE: f64 = 24.0;
const LARGE_BOLD_TEXT_SIZE: f64 = 18.67;
const BOLD_WEIGHT: f64 = 600.0;

static RGBA: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9.]+)\s*)?\)$").ok()
});

/// Straight-alpha sRGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgba {
    color: Srgb<f64>,
    alpha: f64,
}

impl Rgba {
    const WHITE: Rgba = Rgba {
        color: Srgb::new(1.0, 1.0, 1.0),
        alpha: 1.0,
    };

    fn parse(css: &str) -> Option<Self> {
        let css = css.trim();
        if css.starts_with('#') {
            let rgb = Srgb::<u8>::from_str(css).ok()?;
            return Some(Self {
                color: rgb.into_format(),
                alpha: 1.0,
            });
        }
        let caps = RGBA.as_ref()?.captures(css)?;
        let channel = |i: usize| -> Option<f64> {
            let v: f64 = caps.get(i)?.as_str().parse().ok()?;
            Some((v / 255.0).clamp(0.0, 1.0))
        };
        let alpha = match caps.get(4) {
            Some(a) => a.as_str().parse::<f64>().ok()?.clamp(0.0, 1.0),
            None => 1.0,
        };
        Some(Self {
            color: Srgb::new(channel(1)?, channel(2)?, channel(3)?),
            alpha,
        })
    }

    /// Composite over an opaque backdrop.
    fn over(self, backdrop: Srgb<f64>) -> Srgb<f64> {
        let a = self.alpha;
        Srgb::new(
            self.color.red * a + backdrop.red * (1.0 - a),
            self.color.green * a + backdrop.green * (1.0 - a),
            self.color.blue * a + backdrop.blue * (1.0 - a),
        )
    }
}

/// Relative luminance of an sRGB color.
pub fn relative_luminance(color: Srgb<f64>) -> f64 {
    let linear = color.into_linear();
    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

/// `(lighter + 0.05) / (darker + 0.05)`, in `1.0..=21.0`.
pub fn contrast_ratio(a: Srgb<f64>, b: Srgb<f64>) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

fn is_large_text(font_size: Option<f64>, font_weight: Option<f64>) -> bool {
    let Some(size) = font_size else {
        return false;
    };
    size >= LARGE_TEXT_SIZE || (size >= LARGE_BOLD_TEXT_SIZE && font_weight.unwrap_or(400.0) >= BOLD_WEIGHT)
}

/// Topmost solid color of the node's fills.
fn solid_fill(node: &SimplifiedNode, vars: &GlobalVars) -> Option<Rgba> {
    let fills = vars.fills(node.fills.as_deref()?)?;
    fills.iter().rev().find_map(|f| f.as_color().and_then(Rgba::parse))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColorContrast;

impl ColorContrast {
    fn visit<'a>(
        &self,
        node: &'a SimplifiedNode,
        ancestors: &mut Vec<&'a SimplifiedNode>,
        vars: &GlobalVars,
        findings: &mut Vec<AuditFinding>,
    ) {
        if node.is_type("TEXT") {
            if let Some(finding) = self.evaluate(node, ancestors, vars) {
                findings.push(finding);
            }
        }
        ancestors.push(node);
        for child in node.children() {
            self.visit(child, ancestors, vars, findings);
        }
        ancestors.pop();
    }

    fn evaluate(
        &self,
        node: &SimplifiedNode,
        ancestors: &[&SimplifiedNode],
        vars: &GlobalVars,
    ) -> Option<AuditFinding> {
        let foreground = solid_fill(node, vars)?;
        let background = ancestors
            .iter()
            .rev()
            .find_map(|a| solid_fill(a, vars))
            .unwrap_or(Rgba::WHITE)
            .over(Rgba::WHITE.color);
        let foreground = foreground.over(background);

        let style = node.text_style.as_deref().and_then(|key| vars.text_style(key));
        let large = is_large_text(
            style.and_then(|s| s.font_size),
            style.and_then(|s| s.font_weight),
        );
        let (aa, aaa) = if large {
            (AA_LARGE, AAA_LARGE)
        } else {
            (AA_NORMAL, AAA_NORMAL)
        };

        let ratio = contrast_ratio(foreground, background);
        let (level, required) = if ratio < aa {
            ("AA", aa)
        } else if ratio < aaa {
            ("AAA", aaa)
        } else {
            return None;
        };

        let shown = round2(ratio);
        let size = if large { "large" } else { "normal" };
        Some(
            AuditFinding::new(
                self.id(),
                node,
                format!(
                    "Contrast ratio {}:1 is below WCAG {} ({}:1) for {} text",
                    shown, level, required, size
                ),
            )
            .with_more_infos(json!({
                "ratio": shown,
                "level": level,
                "required": required,
                "largeText": large,
                "foreground": hex(foreground),
                "background": hex(background),
            })),
        )
    }
}

fn hex(color: Srgb<f64>) -> String {
    let c: Srgb<u8> = color.into_format();
    format!("#{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
}

impl Rule for ColorContrast {
    fn id(&self) -> RuleId {
        COLOR_CONTRAST
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        let mut findings = Vec::new();
        let mut ancestors = Vec::new();
        for root in ctx.roots() {
            self.visit(root, &mut ancestors, ctx.global_vars(), &mut findings);
        }
        Ok(findings)
    }
}
