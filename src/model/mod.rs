mod geojson;

use geo::{Area, Geometry, MultiPolygon};
use serde_json::{Map, Value};

use crate::error::ExportError;
use crate::style::Style;

pub use geojson::{read_feature, read_feature_collection};

/// One vector feature: an optional geometry plus a flat property map.
///
/// Properties arrive with mixed value types (strings, numbers, nulls)
/// depending on the source format; comparisons against style rules always go
/// through [`normalize_value`], never the raw typed value.
#[derive(Debug, Clone, Default)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self { geometry: Some(geometry), properties: Map::new() }
    }

    pub fn with_properties(geometry: Geometry<f64>, properties: Map<String, Value>) -> Self {
        Self { geometry: Some(geometry), properties }
    }

    /// Look up a property value by key.
    #[inline]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Display label for the feature: `name` property, then `NAME`, if present.
    pub fn label(&self) -> Option<&str> {
        self.property("name")
            .or_else(|| self.property("NAME"))
            .and_then(Value::as_str)
    }
}

/// A named, styled set of features. Owns its feature list exclusively; the
/// pipeline never hands out references into a caller's collection.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub style: Style,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, style: Style, features: Vec<Feature>) -> Self {
        Self { name: name.into(), style, features }
    }
}

/// The clip boundary. Only constructible from a Polygon/MultiPolygon feature,
/// so everything downstream can rely on the geometry type.
#[derive(Debug, Clone)]
pub struct Aoi {
    shape: MultiPolygon<f64>,
}

impl Aoi {
    /// Validate a feature as an AOI. Multipolygon input is accepted as-is;
    /// a single polygon is wrapped. Anything else is an [`ExportError::InvalidAoi`].
    pub fn from_feature(feature: &Feature) -> Result<Self, ExportError> {
        match &feature.geometry {
            Some(Geometry::Polygon(poly)) => Ok(Self { shape: MultiPolygon(vec![poly.clone()]) }),
            Some(Geometry::MultiPolygon(mp)) => Ok(Self { shape: mp.clone() }),
            Some(other) => Err(ExportError::InvalidAoi(format!(
                "expected Polygon or MultiPolygon, got {}",
                geometry_type_name(other)
            ))),
            None => Err(ExportError::InvalidAoi("AOI feature has no geometry".into())),
        }
    }

    #[inline]
    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// A zero-area AOI intersects nothing; the clipper drops every feature.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.shape.unsigned_area() == 0.0
    }

    /// The AOI as a plain feature, for outline emission.
    pub fn to_feature(&self) -> Feature {
        Feature::new(Geometry::MultiPolygon(self.shape.clone()))
    }
}

/// Caller-facing knobs for one export call.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Keep the full attribute table on each placemark. Off by default:
    /// anonymized export strips everything but the styling field and the
    /// `name`/`comment` labels.
    pub keep_attributes: bool,
    /// Emit the AOI outline as its own folder.
    pub include_aoi: bool,
    /// KML `<Document><name>`, also used to derive a default file name.
    pub document_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            keep_attributes: false,
            include_aoi: true,
            document_name: "Export".into(),
        }
    }
}

/// Human-readable geometry type name, for diagnostics.
pub(crate) fn geometry_type_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Coerce a property value to its normalized string form: trimmed, with
/// missing/null mapping to the empty string. All rule/hidden comparisons use
/// this key, never the original typed value.
pub fn normalize_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon};
    use serde_json::json;

    #[test]
    fn normalize_mixed_property_types() {
        assert_eq!(normalize_value(None), "");
        assert_eq!(normalize_value(Some(&Value::Null)), "");
        assert_eq!(normalize_value(Some(&json!("  primary "))), "primary");
        assert_eq!(normalize_value(Some(&json!(42))), "42");
        assert_eq!(normalize_value(Some(&json!(2.5))), "2.5");
        assert_eq!(normalize_value(Some(&json!(true))), "true");
    }

    #[test]
    fn aoi_rejects_non_areal_geometry() {
        let feature = Feature::new(Geometry::Point(point!(x: 1.0, y: 2.0)));
        assert!(matches!(Aoi::from_feature(&feature), Err(ExportError::InvalidAoi(_))));

        let empty = Feature::default();
        assert!(matches!(Aoi::from_feature(&empty), Err(ExportError::InvalidAoi(_))));
    }

    #[test]
    fn aoi_accepts_polygon_and_detects_degenerate() {
        let square = Feature::new(Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0),
        ]));
        let aoi = Aoi::from_feature(&square).unwrap();
        assert!(!aoi.is_degenerate());

        let sliver = Feature::new(Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 0.0),
        ]));
        let aoi = Aoi::from_feature(&sliver).unwrap();
        assert!(aoi.is_degenerate());
    }
}
