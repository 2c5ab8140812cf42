//! Deterministic audit rules.

mod auto_layout;
mod contrast;
mod descriptions;
mod detached;
mod duplicates;
mod export;
mod naming;
mod typography;

pub use auto_layout::AutoLayoutUsage;
pub use contrast::{contrast_ratio, relative_luminance, ColorContrast};
pub use descriptions::ComponentDescriptions;
pub use detached::DetachedStyles;
pub use duplicates::{cluster_by_dimensions, DuplicateStructures, VariantCandidates};
pub use export::MissingExportSettings;
pub use naming::DefaultLayerNames;
pub use typography::TypographyReadability;

pub(crate) use descriptions::is_blank;

use crate::types::{RuleCategory, RuleDefinition, RuleId};

use super::Rule;

pub const DEFAULT_LAYER_NAMES: RuleId = 1;
pub const AUTO_LAYOUT_USAGE: RuleId = 2;
pub const DETACHED_STYLES: RuleId = 3;
pub const MISSING_EXPORT_SETTINGS: RuleId = 4;
pub const COMPONENT_DESCRIPTIONS: RuleId = 5;
pub const COLOR_CONTRAST: RuleId = 6;
pub const TYPOGRAPHY_READABILITY: RuleId = 7;
pub const DUPLICATE_STRUCTURES: RuleId = 8;
pub const VARIANT_CANDIDATES: RuleId = 9;
pub const AI_PATTERN_DETECTION: RuleId = 10;
pub const AI_DESCRIPTION_SUGGESTIONS: RuleId = 11;

pub fn builtin_definitions() -> Vec<RuleDefinition> {
    use RuleCategory::{AiBased, Standard};

    vec![
        RuleDefinition::new(
            DEFAULT_LAYER_NAMES,
            "Default layer names",
            "Layers still named like \"Frame 12\" or \"Rectangle 3\".",
            Standard,
        ),
        RuleDefinition::new(
            AUTO_LAYOUT_USAGE,
            "Auto layout usage",
            "Frames and groups with several children that do not use auto layout.",
            Standard,
        ),
        RuleDefinition::new(
            DETACHED_STYLES,
            "Detached styles",
            "Text, fill, stroke or effect values not bound to a design-system style.",
            Standard,
        ),
        RuleDefinition::new(
            MISSING_EXPORT_SETTINGS,
            "Missing export settings",
            "Vector assets without export settings.",
            Standard,
        ),
        RuleDefinition::new(
            COMPONENT_DESCRIPTIONS,
            "Component descriptions",
            "Components and component sets without a description.",
            Standard,
        ),
        RuleDefinition::new(
            COLOR_CONTRAST,
            "Color contrast (WCAG)",
            "Text whose contrast with its background is below WCAG AA or AAA.",
            Standard,
        ),
        RuleDefinition::new(
            TYPOGRAPHY_READABILITY,
            "Typography readability (WCAG)",
            "Text smaller than 16px or with line height below 1.5.",
            Standard,
        ),
        RuleDefinition::new(
            DUPLICATE_STRUCTURES,
            "Duplicate structures",
            "Identical node structures with matching text styles that could be one component.",
            Standard,
        ),
        RuleDefinition::new(
            VARIANT_CANDIDATES,
            "Variant candidates",
            "Identical node structures with different text styles that could be variants.",
            Standard,
        ),
        RuleDefinition::new(
            AI_PATTERN_DETECTION,
            "AI pattern detection",
            "Repeated patterns an LLM suggests turning into components.",
            AiBased,
        ),
        RuleDefinition::new(
            AI_DESCRIPTION_SUGGESTIONS,
            "AI description suggestions",
            "LLM-suggested descriptions for undocumented components.",
            AiBased,
        ),
    ]
}

pub fn standard_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(DefaultLayerNames),
        Box::new(AutoLayoutUsage),
        Box::new(DetachedStyles),
        Box::new(MissingExportSettings),
        Box::new(ComponentDescriptions),
        Box::new(ColorContrast),
        Box::new(TypographyReadability),
        Box::new(DuplicateStructures::default()),
        Box::new(VariantCandidates::default()),
    ]
}
