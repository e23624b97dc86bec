//! Layer styling: base paint, categorical rules, and legend derivation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Feature, Layer, normalize_value};

pub(crate) const DEFAULT_COLOR: &str = "#22c55e";

/// Display style of a layer. The serde shape (camelCase) mirrors the layer
/// snapshots the map frontend produces, so manifests round-trip unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    /// CSS hex color `#rrggbb`.
    pub base_color: String,
    /// Stroke width; clamped to `[1, 20]` at resolution time.
    pub weight: f64,
    /// Fill/stroke alpha; clamped to `[0, 1]` at resolution time.
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalStyle>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            base_color: DEFAULT_COLOR.into(),
            weight: 2.0,
            opacity: 0.6,
            categorical: None,
        }
    }
}

/// Value-to-color rules over one property field, with a hide list.
///
/// Rule keys and hidden entries are the *normalized string* forms of the
/// property values (see [`normalize_value`]); ordered containers keep every
/// downstream pass deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalStyle {
    pub field: String,
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
    pub default_color: String,
    #[serde(default)]
    pub hidden: BTreeSet<String>,
}

/// Effective paint for one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

/// One legend row: `(label, color)` for a category actually present in the
/// exported output.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// A feature together with its resolved paint.
#[derive(Debug, Clone)]
pub struct StyledFeature {
    pub feature: Feature,
    pub paint: Paint,
}

/// Output of style resolution for one layer: the visible features, their
/// paints, and the legend rows the export actually uses.
#[derive(Debug, Clone)]
pub struct ResolvedLayer {
    pub name: String,
    /// The categorical field, when one drives the coloring; kept so the
    /// serializer can whitelist it during attribute stripping.
    pub label_field: Option<String>,
    pub features: Vec<StyledFeature>,
    pub legend: Vec<LegendEntry>,
}

/// Resolve per-feature paint and legend entries for one layer's clipped
/// features. Hidden categories are filtered out entirely here, so they can
/// never leak into the serialized output.
pub fn resolve(layer: &Layer, clipped: Vec<Feature>) -> ResolvedLayer {
    let weight = clamp_or(layer.style.weight, 1.0, 20.0, 1.0);
    let opacity = clamp_or(layer.style.opacity, 0.0, 1.0, 1.0);
    let paint = |color: &str| Paint { color: color.to_string(), weight, opacity };

    let Some(categorical) = &layer.style.categorical else {
        let legend = if clipped.is_empty() {
            Vec::new()
        } else {
            vec![LegendEntry { label: "Features".into(), color: layer.style.base_color.clone() }]
        };
        return ResolvedLayer {
            name: layer.name.clone(),
            label_field: None,
            features: clipped
                .into_iter()
                .map(|feature| StyledFeature { feature, paint: paint(&layer.style.base_color) })
                .collect(),
            legend,
        };
    };

    let mut features = Vec::new();
    // Legend rows in first-use order; "Other" appended once at the end if any
    // feature fell back to the default color.
    let mut legend: Vec<LegendEntry> = Vec::new();
    let mut fell_back = false;
    let mut hidden_count = 0usize;

    for feature in clipped {
        let key = normalize_value(feature.property(&categorical.field));
        if categorical.hidden.contains(&key) {
            hidden_count += 1;
            continue;
        }
        let color = match categorical.rules.get(&key) {
            Some(color) => {
                let label = format!("{} = {}", categorical.field, key);
                if !legend.iter().any(|entry| entry.label == label) {
                    legend.push(LegendEntry { label, color: color.clone() });
                }
                color.clone()
            }
            None => {
                fell_back = true;
                categorical.default_color.clone()
            }
        };
        features.push(StyledFeature { feature, paint: paint(&color) });
    }

    if fell_back {
        legend.push(LegendEntry { label: "Other".into(), color: categorical.default_color.clone() });
    }
    if hidden_count > 0 {
        debug!(layer = %layer.name, hidden_count, "filtered hidden categories");
    }

    ResolvedLayer {
        name: layer.name.clone(),
        label_field: Some(categorical.field.clone()),
        features,
        legend,
    }
}

/// Clamp with a fallback for non-finite input (silently, never an error).
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() { value.clamp(min, max) } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, point};
    use serde_json::{Map, json};

    fn feature_with(field: &str, value: serde_json::Value) -> Feature {
        let mut props = Map::new();
        props.insert(field.into(), value);
        Feature::with_properties(Geometry::Point(point!(x: 0.0, y: 0.0)), props)
    }

    fn categorical_layer() -> Layer {
        Layer::new(
            "roads",
            Style {
                base_color: "#0000ff".into(),
                weight: 30.0,
                opacity: 1.5,
                categorical: Some(CategoricalStyle {
                    field: "class".into(),
                    rules: BTreeMap::from([
                        ("primary".into(), "#ff0000".into()),
                        ("service".into(), "#cccccc".into()),
                    ]),
                    default_color: "#888888".into(),
                    hidden: BTreeSet::from(["track".into()]),
                }),
            },
            Vec::new(),
        )
    }

    #[test]
    fn base_style_without_rules() {
        let layer = Layer::new("sites", Style::default(), Vec::new());
        let resolved = resolve(&layer, vec![feature_with("x", json!(1))]);
        assert_eq!(resolved.features.len(), 1);
        assert_eq!(resolved.features[0].paint.color, DEFAULT_COLOR);
        assert_eq!(resolved.legend, vec![LegendEntry { label: "Features".into(), color: DEFAULT_COLOR.into() }]);
    }

    #[test]
    fn hidden_categories_are_filtered_out() {
        let layer = categorical_layer();
        let clipped = vec![
            feature_with("class", json!("primary")),
            feature_with("class", json!(" track ")), // trimmed before comparison
            feature_with("class", json!("unknown")),
        ];
        let resolved = resolve(&layer, clipped);
        assert_eq!(resolved.features.len(), 2);
        assert!(resolved.features.iter().all(|f| {
            normalize_value(f.feature.property("class")) != "track"
        }));
    }

    #[test]
    fn legend_reflects_only_surviving_categories() {
        let layer = categorical_layer();
        // No "service" feature survives, so no "service" legend row; one
        // unmatched value adds a single trailing "Other".
        let clipped = vec![
            feature_with("class", json!("primary")),
            feature_with("class", json!("primary")),
            feature_with("class", json!("unknown")),
        ];
        let resolved = resolve(&layer, clipped);
        assert_eq!(
            resolved.legend,
            vec![
                LegendEntry { label: "class = primary".into(), color: "#ff0000".into() },
                LegendEntry { label: "Other".into(), color: "#888888".into() },
            ]
        );
    }

    #[test]
    fn mixed_typed_values_match_on_normalized_strings() {
        let mut layer = categorical_layer();
        let cat = layer.style.categorical.as_mut().unwrap();
        cat.rules.insert("42".into(), "#123456".into());
        let resolved = resolve(&layer, vec![feature_with("class", json!(42))]);
        assert_eq!(resolved.features[0].paint.color, "#123456");
    }

    #[test]
    fn weight_and_opacity_are_clamped() {
        let layer = categorical_layer();
        let resolved = resolve(&layer, vec![feature_with("class", json!("primary"))]);
        assert_eq!(resolved.features[0].paint.weight, 20.0);
        assert_eq!(resolved.features[0].paint.opacity, 1.0);
    }

    #[test]
    fn missing_field_normalizes_to_empty_key() {
        let mut layer = categorical_layer();
        let cat = layer.style.categorical.as_mut().unwrap();
        cat.hidden.insert(String::new());
        // Feature without the styling field: empty key, hidden here.
        let feature = feature_with("other", json!("x"));
        let resolved = resolve(&layer, vec![feature]);
        assert!(resolved.features.is_empty());
        assert!(resolved.legend.is_empty());
    }
}
