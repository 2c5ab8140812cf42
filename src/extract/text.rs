//! Text content and text style extraction.

use crate::figma::api_types::{round2, FigmaTypeStyle, RawNode};
use crate::types::{LineHeight, SimplifiedNode, TextStyle};

use super::traversal::TraversalContext;

pub fn text_extractor(node: &RawNode, result: &mut SimplifiedNode, ctx: &mut TraversalContext<'_>) {
    if !node.has_text_trait() {
        return;
    }

    if let Some(characters) = &node.characters {
        result.text = Some(characters.clone());
    }

    if let Some(style) = node.style.as_ref().map(build_text_style) {
        if style != TextStyle::default() {
            let named = node.style_ref(&["text"]);
            result.text_style = Some(ctx.global_vars.intern(named, style));
        }
    }
}

pub fn build_text_style(raw: &FigmaTypeStyle) -> TextStyle {
    let font_size = raw.font_size.filter(|size| *size > 0.0);

    let line_height = if raw.line_height_unit.as_deref() == Some("INTRINSIC_%") {
        Some(LineHeight::Auto)
    } else {
        match (raw.line_height_px, font_size) {
            (Some(px), Some(size)) => Some(LineHeight::Em(round2(px / size))),
            _ => None,
        }
    };

    let letter_spacing = match (raw.letter_spacing, font_size) {
        (Some(spacing), Some(size)) if spacing != 0.0 => {
            Some(format!("{}%", round2(spacing / size * 100.0)))
        }
        _ => None,
    };

    TextStyle {
        font_family: raw.font_family.clone(),
        font_weight: raw.font_weight.map(round2),
        font_size: raw.font_size.map(round2),
        line_height,
        letter_spacing,
        text_case: raw.text_case.clone(),
        text_align_horizontal: raw.text_align_horizontal.clone(),
        text_align_vertical: raw.text_align_vertical.clone(),
    }
}
