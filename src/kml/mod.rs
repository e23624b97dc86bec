//! KML document serialization.
//!
//! The document is a pure function of its inputs: styles are interned in
//! first-use order during a collection pass over the layers, then everything
//! is emitted in input order. Re-serializing the same inputs yields
//! byte-identical text.

mod color;
mod geometry;

use geo::Geometry;
use serde_json::Value;

use crate::model::{Aoi, Feature};
use crate::style::{Paint, ResolvedLayer};

pub use color::kml_color;
pub(crate) use geometry::write_geometry;

/// Fixed AOI outline style (distinct from any layer style).
const AOI_COLOR: &str = "#10b981";
const AOI_WEIGHT: f64 = 3.0;
const AOI_FILL_OPACITY: f64 = 0.25;

/// Stock icon tinted by IconStyle color; keeps point styling asset-free.
const POINT_ICON_HREF: &str = "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";

/// KML styling differs by shape, so styles are deduplicated per geometry
/// class. A `GeometryCollection` spanning several classes gets a combined
/// style carrying all three sub-style blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GeomClass {
    Point,
    Line,
    Polygon,
    Mixed,
}

pub(crate) fn classify(geom: &Geometry<f64>) -> GeomClass {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => GeomClass::Point,
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            GeomClass::Line
        }
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => GeomClass::Polygon,
        Geometry::GeometryCollection(gc) => {
            let mut classes = gc.0.iter().map(classify);
            match classes.next() {
                None => GeomClass::Mixed,
                Some(first) => {
                    if classes.all(|c| c == first) {
                        first
                    } else {
                        GeomClass::Mixed
                    }
                }
            }
        }
    }
}

/// Dedup key for emitted styles. Weight and opacity are held as scaled
/// integers so the key is `Eq` without floating-point comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleKey {
    color: String,
    weight_tenths: u32,
    opacity_milli: u32,
    class: GeomClass,
}

impl StyleKey {
    fn new(paint: &Paint, class: GeomClass) -> Self {
        Self {
            color: paint.color.to_ascii_lowercase(),
            weight_tenths: (paint.weight * 10.0).round() as u32,
            opacity_milli: (paint.opacity * 1000.0).round() as u32,
            class,
        }
    }

    fn weight(&self) -> f64 {
        f64::from(self.weight_tenths) / 10.0
    }

    fn opacity(&self) -> f64 {
        f64::from(self.opacity_milli) / 1000.0
    }
}

/// Style IDs assigned by first use. A plain Vec scan keeps assignment a pure
/// function of input order; style counts are tiny.
#[derive(Default)]
struct StyleTable {
    keys: Vec<StyleKey>,
}

impl StyleTable {
    fn intern(&mut self, key: StyleKey) -> usize {
        if let Some(idx) = self.keys.iter().position(|k| *k == key) {
            return idx;
        }
        self.keys.push(key);
        self.keys.len() - 1
    }

    fn id_of(&self, key: &StyleKey) -> usize {
        self.keys.iter().position(|k| k == key).expect("style interned during collection pass")
    }
}

/// Serialize the document. `aoi` is `Some` when the outline folder was
/// requested; `legend_html` is `Some` when at least one layer has visible
/// features. Layers with no visible features produce no folder. When nothing
/// at all survives, a single explanatory placemark takes the layers' place so
/// the document is still well-formed and self-describing.
pub fn build_document(
    document_name: &str,
    aoi: Option<&Aoi>,
    layers: &[ResolvedLayer],
    legend_html: Option<&str>,
    keep_attributes: bool,
) -> String {
    let mut table = StyleTable::default();
    for layer in layers {
        for styled in &layer.features {
            if let Some(geom) = &styled.feature.geometry {
                table.intern(StyleKey::new(&styled.paint, classify(geom)));
            }
        }
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n<Document>\n");
    out.push_str(&format!("<name>{}</name>\n", escape_xml(document_name)));

    if aoi.is_some() {
        write_aoi_style(&mut out);
    }
    for (idx, key) in table.keys.iter().enumerate() {
        write_style(&mut out, &format!("s{idx}"), key);
    }

    if let Some(aoi) = aoi {
        out.push_str("<Folder><name>AOI</name>\n");
        let outline = aoi.to_feature();
        write_placemark(&mut out, &outline, "aoi", None, false, Some("AOI"));
        out.push_str("</Folder>\n");
    }

    let visible_total: usize = layers.iter().map(|l| l.features.len()).sum();
    if visible_total == 0 {
        out.push_str(
            "<Placemark><name>Nothing to display</name>\
             <description>No visible features intersect the AOI.</description></Placemark>\n",
        );
    } else {
        for layer in layers {
            if layer.features.is_empty() {
                continue;
            }
            out.push_str(&format!("<Folder><name>{}</name>\n", escape_xml(&layer.name)));
            for styled in &layer.features {
                let Some(geom) = &styled.feature.geometry else { continue };
                let key = StyleKey::new(&styled.paint, classify(geom));
                let style_id = format!("s{}", table.id_of(&key));
                write_placemark(
                    &mut out,
                    &styled.feature,
                    &style_id,
                    layer.label_field.as_deref(),
                    keep_attributes,
                    None,
                );
            }
            out.push_str("</Folder>\n");
        }
        if let Some(html) = legend_html {
            out.push_str(&format!(
                "<Placemark><name>Legend</name><description><![CDATA[{html}]]></description></Placemark>\n"
            ));
        }
    }

    out.push_str("</Document>\n</kml>\n");
    out
}

fn write_aoi_style(out: &mut String) {
    out.push_str(&format!(
        "<Style id=\"aoi\"><LineStyle><color>{line}</color><width>{width}</width></LineStyle>\
         <PolyStyle><color>{fill}</color></PolyStyle></Style>\n",
        line = kml_color(AOI_COLOR, 1.0),
        width = fmt_num(AOI_WEIGHT),
        fill = kml_color(AOI_COLOR, AOI_FILL_OPACITY),
    ));
}

fn write_style(out: &mut String, id: &str, key: &StyleKey) {
    out.push_str(&format!("<Style id=\"{id}\">"));
    match key.class {
        GeomClass::Point => write_icon_style(out, key),
        GeomClass::Line => write_line_style(out, key, key.opacity()),
        GeomClass::Polygon => {
            // Full-alpha outline, translucent fill.
            write_line_style(out, key, 1.0);
            write_poly_style(out, key);
        }
        GeomClass::Mixed => {
            write_icon_style(out, key);
            write_line_style(out, key, 1.0);
            write_poly_style(out, key);
        }
    }
    out.push_str("</Style>\n");
}

fn write_icon_style(out: &mut String, key: &StyleKey) {
    out.push_str(&format!(
        "<IconStyle><color>{}</color><scale>1.1</scale><Icon><href>{POINT_ICON_HREF}</href></Icon></IconStyle>",
        kml_color(&key.color, key.opacity()),
    ));
}

fn write_line_style(out: &mut String, key: &StyleKey, alpha: f64) {
    out.push_str(&format!(
        "<LineStyle><color>{}</color><width>{}</width></LineStyle>",
        kml_color(&key.color, alpha),
        fmt_num(key.weight()),
    ));
}

fn write_poly_style(out: &mut String, key: &StyleKey) {
    out.push_str(&format!(
        "<PolyStyle><color>{}</color></PolyStyle>",
        kml_color(&key.color, key.opacity()),
    ));
}

/// Emit one placemark. With attribute stripping on (the default), the only
/// property-derived output is the name label, a `comment` description, and
/// the styling field the resolver already consumed; the full table is never
/// leaked. `forced_name` overrides the label (used for the AOI outline).
fn write_placemark(
    out: &mut String,
    feature: &Feature,
    style_id: &str,
    label_field: Option<&str>,
    keep_attributes: bool,
    forced_name: Option<&str>,
) {
    let Some(geom) = &feature.geometry else { return };

    let name = forced_name.or_else(|| feature.label()).unwrap_or("Feature");
    out.push_str(&format!(
        "<Placemark><name>{}</name><styleUrl>#{style_id}</styleUrl>",
        escape_xml(name)
    ));

    if keep_attributes {
        write_extended_data(out, feature);
    } else {
        if let Some(comment) = feature.property("comment").and_then(Value::as_str) {
            out.push_str(&format!("<description>{}</description>", escape_xml(comment)));
        }
        // label_field stays available to viewers that key popups off it.
        if let Some(field) = label_field {
            if let Some(value) = feature.property(field) {
                out.push_str("<ExtendedData>");
                write_data_element(out, field, value);
                out.push_str("</ExtendedData>");
            }
        }
    }

    write_geometry(out, geom);
    out.push_str("</Placemark>\n");
}

fn write_extended_data(out: &mut String, feature: &Feature) {
    if feature.properties.is_empty() {
        return;
    }
    out.push_str("<ExtendedData>");
    for (key, value) in &feature.properties {
        write_data_element(out, key, value);
    }
    out.push_str("</ExtendedData>");
}

fn write_data_element(out: &mut String, key: &str, value: &Value) {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    out.push_str(&format!(
        "<Data name=\"{}\"><value>{}</value></Data>",
        escape_xml(key),
        escape_xml(&text)
    ));
}

/// Minimal XML escaping for text content and attribute values.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 { format!("{}", v as i64) } else { format!("{v}") }
}
