//! Built-in extractors and the preset pipelines built from them.

pub use super::component::component_extractor;
pub use super::layout::layout_extractor;
pub use super::text::text_extractor;
pub use super::visuals::visuals_extractor;

use super::traversal::Extractor;

pub const ALL_EXTRACTORS: &[Extractor] = &[
    layout_extractor,
    text_extractor,
    visuals_extractor,
    component_extractor,
];

pub const LAYOUT_AND_TEXT: &[Extractor] = &[layout_extractor, text_extractor];

pub const CONTENT_ONLY: &[Extractor] = &[text_extractor];

pub const VISUALS_ONLY: &[Extractor] = &[visuals_extractor];

pub const LAYOUT_ONLY: &[Extractor] = &[layout_extractor];

/// Look up a preset by its CLI name.
pub fn preset(name: &str) -> Option<&'static [Extractor]> {
    match name {
        "all" => Some(ALL_EXTRACTORS),
        "layout-and-text" => Some(LAYOUT_AND_TEXT),
        "content" => Some(CONTENT_ONLY),
        "visuals" => Some(VISUALS_ONLY),
        "layout" => Some(LAYOUT_ONLY),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_by_name() {
        assert_eq!(preset("all").map(<[Extractor]>::len), Some(4));
        assert_eq!(preset("content").map(<[Extractor]>::len), Some(1));
        assert!(preset("everything").is_none());
    }
}
