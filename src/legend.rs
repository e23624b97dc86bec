//! Legend rendering: an HTML fragment summarizing the active color-to-category
//! mappings, embedded by the serializer as a balloon description. One titled
//! block per layer, one row per legend entry; the table grows with the row
//! count, so nothing is ever truncated.

use crate::kml::{GeomClass, classify};
use crate::style::ResolvedLayer;

/// Render the legend for the resolved layers. Layers whose categories are all
/// hidden (or clipped away) still get a block, with an explicit empty state.
pub fn render_legend_html(layers: &[ResolvedLayer]) -> String {
    let mut html = String::from(
        "<table style=\"font-family:sans-serif;font-size:12px;border-collapse:collapse\">\n",
    );
    for layer in layers {
        html.push_str(&format!(
            "<tr><th colspan=\"2\" align=\"left\" style=\"padding:6px 4px 2px\">{}</th></tr>\n",
            escape_html(&layer.name)
        ));
        if layer.legend.is_empty() {
            html.push_str(
                "<tr><td colspan=\"2\" style=\"padding:2px 4px\"><i>(no visible categories)</i></td></tr>\n",
            );
            continue;
        }
        let class = dominant_class(layer);
        for entry in &layer.legend {
            html.push_str(&format!(
                "<tr><td style=\"padding:2px 4px\">{}</td><td style=\"padding:2px 4px\">{}</td></tr>\n",
                swatch(&entry.color, class),
                escape_html(&entry.label)
            ));
        }
    }
    html.push_str("</table>");
    html
}

/// Swatch shape follows the layer's dominant geometry class: filled rectangle
/// for polygons, line bar for lines, dot for points.
fn swatch(color: &str, class: GeomClass) -> String {
    let color = escape_html(color);
    match class {
        GeomClass::Point => format!(
            "<span style=\"display:inline-block;width:10px;height:10px;border-radius:50%;\
             background:{color};border:1px solid #333\"></span>"
        ),
        GeomClass::Line => format!(
            "<span style=\"display:inline-block;width:18px;height:3px;background:{color}\"></span>"
        ),
        GeomClass::Polygon | GeomClass::Mixed => format!(
            "<span style=\"display:inline-block;width:16px;height:12px;background:{color};\
             border:1px solid #333\"></span>"
        ),
    }
}

fn dominant_class(layer: &ResolvedLayer) -> GeomClass {
    layer
        .features
        .iter()
        .find_map(|styled| styled.feature.geometry.as_ref().map(classify))
        .unwrap_or(GeomClass::Polygon)
}

fn escape_html(text: &str) -> String {
    crate::kml::escape_xml(text)
}
