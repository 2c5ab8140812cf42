//! Style registry ("global vars") shared by all nodes of a simplified design.
//!
//! Values referencing a document-level named style live in `designSystem`
//! keyed by the document style id; every other value lives in `localStyles`
//! keyed by a content-derived id, so identical values are stored once.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::simplified::{
    SimplifiedEffects, SimplifiedFill, SimplifiedLayout, SimplifiedStrokes, TextStyle,
};
use crate::figma::api_types::FigmaStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleConcern {
    Text,
    Fills,
    Strokes,
    Effects,
    Layout,
}

impl StyleConcern {
    pub const fn all() -> [StyleConcern; 5] {
        [
            StyleConcern::Text,
            StyleConcern::Fills,
            StyleConcern::Strokes,
            StyleConcern::Effects,
            StyleConcern::Layout,
        ]
    }

    /// Property name used on simplified nodes.
    pub fn property(&self) -> &'static str {
        match self {
            StyleConcern::Text => "textStyle",
            StyleConcern::Fills => "fills",
            StyleConcern::Strokes => "strokes",
            StyleConcern::Effects => "effects",
            StyleConcern::Layout => "layout",
        }
    }

    fn key_prefix(&self) -> &'static str {
        match self {
            StyleConcern::Text => "style",
            StyleConcern::Fills => "fill",
            StyleConcern::Strokes => "stroke",
            StyleConcern::Effects => "effect",
            StyleConcern::Layout => "layout",
        }
    }
}

/// Which half of the registry a key resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleOrigin {
    DesignSystem,
    Local,
}

/// A registry value, optionally labelled with its document style name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleEntry<T> {
    Named { name: String, value: T },
    Raw(T),
}

impl<T> StyleEntry<T> {
    pub fn value(&self) -> &T {
        match self {
            StyleEntry::Named { value, .. } | StyleEntry::Raw(value) => value,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            StyleEntry::Named { name, .. } => Some(name),
            StyleEntry::Raw(_) => None,
        }
    }

    fn labelled(self, name: &str) -> Self {
        match self {
            StyleEntry::Named { value, .. } | StyleEntry::Raw(value) => StyleEntry::Named {
                name: name.to_string(),
                value,
            },
        }
    }
}

/// One half of the registry, subdivided by concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTable {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub text: BTreeMap<String, StyleEntry<TextStyle>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fills: BTreeMap<String, StyleEntry<Vec<SimplifiedFill>>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strokes: BTreeMap<String, StyleEntry<SimplifiedStrokes>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub effects: BTreeMap<String, StyleEntry<SimplifiedEffects>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layout: BTreeMap<String, StyleEntry<SimplifiedLayout>>,
}

impl StyleTable {
    pub fn contains(&self, concern: StyleConcern, key: &str) -> bool {
        match concern {
            StyleConcern::Text => self.text.contains_key(key),
            StyleConcern::Fills => self.fills.contains_key(key),
            StyleConcern::Strokes => self.strokes.contains_key(key),
            StyleConcern::Effects => self.effects.contains_key(key),
            StyleConcern::Layout => self.layout.contains_key(key),
        }
    }

    pub fn keys(&self, concern: StyleConcern) -> Vec<&str> {
        match concern {
            StyleConcern::Text => self.text.keys().map(String::as_str).collect(),
            StyleConcern::Fills => self.fills.keys().map(String::as_str).collect(),
            StyleConcern::Strokes => self.strokes.keys().map(String::as_str).collect(),
            StyleConcern::Effects => self.effects.keys().map(String::as_str).collect(),
            StyleConcern::Layout => self.layout.keys().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len() + self.fills.len() + self.strokes.len() + self.effects.len() + self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn label_all(&mut self, styles: &BTreeMap<String, FigmaStyle>) {
        fn label<T>(
            map: &mut BTreeMap<String, StyleEntry<T>>,
            styles: &BTreeMap<String, FigmaStyle>,
        ) {
            let keys: Vec<String> = map.keys().cloned().collect();
            for key in keys {
                let Some(style) = styles.get(&key) else {
                    continue;
                };
                if let Some(entry) = map.remove(&key) {
                    map.insert(key, entry.labelled(&style.name));
                }
            }
        }

        label(&mut self.text, styles);
        label(&mut self.fills, styles);
        label(&mut self.strokes, styles);
        label(&mut self.effects, styles);
        label(&mut self.layout, styles);
    }
}

/// Image fill discovered during traversal, keyed by its `imageRef`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<String>,
    pub needs_cropping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_transform: Option<[[f64; 3]; 2]>,
}

/// Per-invocation style registry. Construct one per simplification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVars {
    pub design_system: StyleTable,
    pub local_styles: StyleTable,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, ImageReference>,
}

/// A value that can be interned into the registry under one concern.
pub trait StyleValue: Serialize + Clone + PartialEq + Sized {
    const CONCERN: StyleConcern;

    fn table(table: &StyleTable) -> &BTreeMap<String, StyleEntry<Self>>;
    fn table_mut(table: &mut StyleTable) -> &mut BTreeMap<String, StyleEntry<Self>>;
}

macro_rules! style_value {
    ($ty:ty, $concern:expr, $field:ident) => {
        impl StyleValue for $ty {
            const CONCERN: StyleConcern = $concern;

            fn table(table: &StyleTable) -> &BTreeMap<String, StyleEntry<Self>> {
                &table.$field
            }

            fn table_mut(table: &mut StyleTable) -> &mut BTreeMap<String, StyleEntry<Self>> {
                &mut table.$field
            }
        }
    };
}

style_value!(TextStyle, StyleConcern::Text, text);
style_value!(Vec<SimplifiedFill>, StyleConcern::Fills, fills);
style_value!(SimplifiedStrokes, StyleConcern::Strokes, strokes);
style_value!(SimplifiedEffects, StyleConcern::Effects, effects);
style_value!(SimplifiedLayout, StyleConcern::Layout, layout);

impl GlobalVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `value` and return the key a node should reference.
    ///
    /// With a document style id the value goes to `designSystem` under that
    /// id; otherwise it goes to `localStyles` under a content-derived key.
    /// A named id already present in either half is reused as-is.
    pub fn intern<T: StyleValue>(&mut self, named_style: Option<&str>, value: T) -> String {
        let Some(style_id) = named_style else {
            let base = content_key(T::CONCERN, &value);
            return self.intern_local(base, value);
        };

        let key = style_id.to_string();
        if self.origin(T::CONCERN, &key).is_none() {
            T::table_mut(&mut self.design_system).insert(key.clone(), StyleEntry::Raw(value));
        }
        key
    }

    /// Store a local value under `base`, or under `base_2`, `base_3`, ...
    /// when an earlier key already holds a different value. A key holding an
    /// equal value is reused.
    fn intern_local<T: StyleValue>(&mut self, base: String, value: T) -> String {
        let mut suffix = 1u32;
        loop {
            let key = if suffix == 1 {
                base.clone()
            } else {
                format!("{base}_{suffix}")
            };

            if !self.design_system.contains(T::CONCERN, &key) {
                let table = T::table_mut(&mut self.local_styles);
                match table.get(&key) {
                    Some(existing) if *existing.value() == value => return key,
                    Some(_) => {}
                    None => {
                        table.insert(key.clone(), StyleEntry::Raw(value));
                        return key;
                    }
                }
            }
            suffix += 1;
        }
    }

    pub fn origin(&self, concern: StyleConcern, key: &str) -> Option<StyleOrigin> {
        if self.design_system.contains(concern, key) {
            Some(StyleOrigin::DesignSystem)
        } else if self.local_styles.contains(concern, key) {
            Some(StyleOrigin::Local)
        } else {
            None
        }
    }

    pub fn resolve<T: StyleValue>(&self, key: &str) -> Option<&T> {
        T::table(&self.design_system)
            .get(key)
            .or_else(|| T::table(&self.local_styles).get(key))
            .map(StyleEntry::value)
    }

    pub fn text_style(&self, key: &str) -> Option<&TextStyle> {
        self.resolve::<TextStyle>(key)
    }

    pub fn fills(&self, key: &str) -> Option<&Vec<SimplifiedFill>> {
        self.resolve::<Vec<SimplifiedFill>>(key)
    }

    pub fn layout(&self, key: &str) -> Option<&SimplifiedLayout> {
        self.resolve::<SimplifiedLayout>(key)
    }

    /// Label design-system entries with their document style name. Ids
    /// missing from `styles` are left unlabelled.
    pub fn apply_style_names(&mut self, styles: &BTreeMap<String, FigmaStyle>) {
        self.design_system.label_all(styles);
    }
}

fn content_key<T: Serialize>(concern: StyleConcern, value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    let hash: String = digest.iter().take(8).map(|b| format!("{:02X}", b)).collect();
    format!("{}_{}", concern.key_prefix(), hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::simplified::LineHeight;

    fn heading() -> TextStyle {
        TextStyle {
            font_family: Some("Inter".into()),
            font_weight: Some(700.0),
            font_size: Some(24.0),
            line_height: Some(LineHeight::Em(1.2)),
            ..TextStyle::default()
        }
    }

    #[test]
    fn identical_local_values_share_one_key() {
        let mut vars = GlobalVars::new();
        let a = vars.intern(None, vec![SimplifiedFill::Solid("#FFFFFF".into())]);
        let b = vars.intern(None, vec![SimplifiedFill::Solid("#FFFFFF".into())]);
        let c = vars.intern(None, vec![SimplifiedFill::Solid("#000000".into())]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("fill_"));
        assert_eq!(vars.local_styles.fills.len(), 2);
        assert!(vars.design_system.is_empty());
    }

    #[test]
    fn content_keys_carry_sixteen_hex_digits() {
        let mut vars = GlobalVars::new();
        let key = vars.intern(None, heading());
        let hash = key.strip_prefix("style_").expect("text prefix");
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn colliding_content_keys_keep_both_values() {
        let mut vars = GlobalVars::new();
        let white = vec![SimplifiedFill::Solid("#FFFFFF".into())];
        let black = vec![SimplifiedFill::Solid("#000000".into())];
        let red = vec![SimplifiedFill::Solid("#FF0000".into())];

        let first = vars.intern_local("fill_00000000".to_string(), white.clone());
        let second = vars.intern_local("fill_00000000".to_string(), black.clone());
        let third = vars.intern_local("fill_00000000".to_string(), red.clone());
        let again = vars.intern_local("fill_00000000".to_string(), black.clone());

        assert_eq!(first, "fill_00000000");
        assert_eq!(second, "fill_00000000_2");
        assert_eq!(third, "fill_00000000_3");
        assert_eq!(again, second);
        assert_eq!(vars.local_styles.fills.len(), 3);
        assert_eq!(vars.fills(&first), Some(&white));
        assert_eq!(vars.fills(&second), Some(&black));
        assert_eq!(vars.fills(&third), Some(&red));
    }

    #[test]
    fn local_keys_skip_design_system_ids() {
        let mut vars = GlobalVars::new();
        let brand = vec![SimplifiedFill::Solid("#3366FF".into())];
        vars.intern(Some("fill_ABCD"), brand.clone());

        let key = vars.intern_local("fill_ABCD".to_string(), brand);
        assert_eq!(key, "fill_ABCD_2");
        assert_eq!(vars.origin(StyleConcern::Fills, &key), Some(StyleOrigin::Local));
    }

    #[test]
    fn named_values_go_to_design_system() {
        let mut vars = GlobalVars::new();
        let key = vars.intern(Some("S:heading"), heading());

        assert_eq!(key, "S:heading");
        assert_eq!(vars.origin(StyleConcern::Text, &key), Some(StyleOrigin::DesignSystem));
        assert!(vars.local_styles.text.is_empty());
        assert_eq!(vars.text_style(&key), Some(&heading()));
    }

    #[test]
    fn apply_style_names_labels_only_known_ids() {
        let mut vars = GlobalVars::new();
        vars.intern(Some("S:heading"), heading());
        vars.intern(Some("S:orphan"), vec![SimplifiedFill::Solid("#FF0000".into())]);

        let mut styles = BTreeMap::new();
        styles.insert(
            "S:heading".to_string(),
            FigmaStyle {
                key: "k".into(),
                name: "Heading/H1".into(),
                style_type: Some("TEXT".into()),
                description: String::new(),
            },
        );
        vars.apply_style_names(&styles);

        assert_eq!(vars.design_system.text["S:heading"].name(), Some("Heading/H1"));
        assert_eq!(vars.design_system.fills["S:orphan"].name(), None);
    }

    #[test]
    fn labelled_entries_survive_json() {
        let mut vars = GlobalVars::new();
        vars.intern(Some("S:heading"), heading());
        let mut styles = BTreeMap::new();
        styles.insert(
            "S:heading".to_string(),
            FigmaStyle {
                key: "k".into(),
                name: "Heading/H1".into(),
                style_type: None,
                description: String::new(),
            },
        );
        vars.apply_style_names(&styles);

        let json = serde_json::to_string(&vars).unwrap();
        let back: GlobalVars = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vars);
    }
}
