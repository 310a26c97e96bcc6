//! Theme extensions: additive overrides layered onto built-in design tokens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A design-token value as it appears under `theme.extend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeValue {
    /// Boolean flag.
    Bool(bool),
    /// Whole-number token (z-index, spacing steps, ...); kept exact.
    Integer(i64),
    /// Fractional token (opacity, line height, ...). Always finite once loaded.
    Number(f64),
    /// Plain token, e.g. a color or a length.
    String(String),
    /// Ordered tokens, e.g. a font stack.
    List(Vec<ThemeValue>),
    /// Nested token group, e.g. `colors.brand.500`.
    Map(BTreeMap<String, ThemeValue>),
}

impl ThemeValue {
    /// Dotted path of the first NaN or infinite number in this value, if any.
    ///
    /// `NaN != NaN`, so such a value would make two loads of one source differ.
    pub fn find_non_finite(&self, path: &str) -> Option<String> {
        match self {
            Self::Number(n) if !n.is_finite() => Some(path.to_string()),
            Self::List(items) => items
                .iter()
                .enumerate()
                .find_map(|(i, item)| item.find_non_finite(&format!("{path}[{i}]"))),
            Self::Map(entries) => find_non_finite_in(entries, path),
            _ => None,
        }
    }
}

/// Dotted path of the first non-finite number among `entries`, prefixed by `path`.
pub(crate) fn find_non_finite_in(
    entries: &BTreeMap<String, ThemeValue>,
    path: &str,
) -> Option<String> {
    entries.iter().find_map(|(key, value)| {
        let child = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        value.find_non_finite(&child)
    })
}

impl From<&str> for ThemeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// The `theme` table of a config source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSection {
    /// Additive overrides, keyed by theme category.
    pub extend: ThemeExtensions,
}

/// Theme category name → override value.
///
/// Extensions never replace a category wholesale: nested maps are merged key by
/// key, and only leaves (strings, numbers, lists) overwrite the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeExtensions(BTreeMap<String, ThemeValue>);

impl ThemeExtensions {
    /// Empty extension set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no category is extended.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of extended categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Override value for a category.
    pub fn get(&self, category: &str) -> Option<&ThemeValue> {
        self.0.get(category)
    }

    /// Extended categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Set the override for a category, returning the previous one.
    pub fn insert(&mut self, category: impl Into<String>, value: ThemeValue) -> Option<ThemeValue> {
        self.0.insert(category.into(), value)
    }

    /// Dotted path of the first NaN or infinite number, if any.
    pub fn find_non_finite(&self) -> Option<String> {
        find_non_finite_in(&self.0, "")
    }

    /// Layer these extensions onto a set of default tokens.
    pub fn layer_onto(
        &self,
        defaults: &BTreeMap<String, ThemeValue>,
    ) -> BTreeMap<String, ThemeValue> {
        let mut merged = defaults.clone();
        for (category, value) in &self.0 {
            match merged.get_mut(category) {
                Some(existing) => merge_value(existing, value),
                None => {
                    merged.insert(category.clone(), value.clone());
                }
            }
        }
        merged
    }
}

impl FromIterator<(String, ThemeValue)> for ThemeExtensions {
    fn from_iter<T: IntoIterator<Item = (String, ThemeValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn merge_value(base: &mut ThemeValue, overlay: &ThemeValue) {
    match (base, overlay) {
        (ThemeValue::Map(base), ThemeValue::Map(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map<const N: usize>(entries: [(&str, ThemeValue); N]) -> ThemeValue {
        ThemeValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn defaults() -> BTreeMap<String, ThemeValue> {
        let mut d = BTreeMap::new();
        d.insert(
            "colors".to_string(),
            map([
                ("black", "#000".into()),
                ("blue", map([("500", "#3b82f6".into()), ("600", "#2563eb".into())])),
            ]),
        );
        d.insert(
            "fontFamily".to_string(),
            map([(
                "sans",
                ThemeValue::List(vec!["ui-sans-serif".into(), "system-ui".into()]),
            )]),
        );
        d
    }

    #[test]
    fn test_empty_extensions_keep_defaults() {
        let ext = ThemeExtensions::new();
        assert_eq!(ext.layer_onto(&defaults()), defaults());
    }

    #[test]
    fn test_extension_merges_nested_maps() {
        let mut ext = ThemeExtensions::new();
        ext.insert(
            "colors",
            map([
                ("brand", "#0af".into()),
                ("blue", map([("500", "#1d4ed8".into())])),
            ]),
        );

        let merged = ext.layer_onto(&defaults());
        let ThemeValue::Map(colors) = &merged["colors"] else {
            panic!("colors should stay a map");
        };
        assert_eq!(colors["black"], ThemeValue::from("#000"));
        assert_eq!(colors["brand"], ThemeValue::from("#0af"));
        let ThemeValue::Map(blue) = &colors["blue"] else {
            panic!("blue should stay a map");
        };
        assert_eq!(blue["500"], ThemeValue::from("#1d4ed8"));
        assert_eq!(blue["600"], ThemeValue::from("#2563eb"));
        // Untouched categories carried over.
        assert_eq!(merged["fontFamily"], defaults()["fontFamily"]);
    }

    #[test]
    fn test_lists_are_replaced_not_concatenated() {
        let mut ext = ThemeExtensions::new();
        ext.insert(
            "fontFamily",
            map([("sans", ThemeValue::List(vec!["Inter".into()]))]),
        );
        let merged = ext.layer_onto(&defaults());
        assert_eq!(
            merged["fontFamily"],
            map([("sans", ThemeValue::List(vec!["Inter".into()]))])
        );
    }

    #[test]
    fn test_new_category_added() {
        let mut ext = ThemeExtensions::new();
        ext.insert("spacing", map([("128", "32rem".into())]));
        let merged = ext.layer_onto(&defaults());
        assert_eq!(merged.len(), 3);
        assert!(merged.contains_key("spacing"));
    }

    #[test]
    fn test_deserialize_from_ron() {
        let ron_str = r##"(extend: {"colors": {"brand": "#0af"}, "opacity": {"15": 0.15}})"##;
        let theme: ThemeSection = ron::from_str(ron_str).unwrap();
        assert_eq!(theme.extend.len(), 2);
        assert_eq!(
            theme.extend.get("colors"),
            Some(&map([("brand", "#0af".into())]))
        );
        assert_eq!(
            theme.extend.get("opacity"),
            Some(&map([("15", ThemeValue::Number(0.15))]))
        );
    }

    #[test]
    fn test_integers_stay_integers() {
        let ron_str = r#"(extend: {"spacing": {"128": 32}, "zIndex": {"max": 9007199254740993}})"#;
        let theme: ThemeSection = ron::from_str(ron_str).unwrap();
        assert_eq!(
            theme.extend.get("spacing"),
            Some(&map([("128", ThemeValue::Integer(32))]))
        );
        assert_eq!(
            theme.extend.get("zIndex"),
            Some(&map([("max", ThemeValue::Integer(9_007_199_254_740_993))]))
        );

        let json = serde_json::to_string(&theme.extend).unwrap();
        assert!(json.contains(r#""128":32"#), "{json}");
        assert!(!json.contains("32.0"), "{json}");
    }

    #[test]
    fn test_find_non_finite() {
        let ron_str = r#"(extend: {"colors": {"a": "red"}, "opacity": {"ok": 0.5, "x": NaN}})"#;
        let theme: ThemeSection = ron::from_str(ron_str).unwrap();
        assert_eq!(theme.extend.find_non_finite().as_deref(), Some("opacity.x"));

        let mut ext = ThemeExtensions::new();
        ext.insert(
            "scale",
            ThemeValue::List(vec![ThemeValue::Number(1.0), ThemeValue::Number(f64::INFINITY)]),
        );
        assert_eq!(ext.find_non_finite().as_deref(), Some("scale[1]"));
        assert_eq!(ThemeExtensions::new().find_non_finite(), None);
    }
}
