//! Geometry-to-KML markup: one block per GeoJSON geometry type, with
//! `MultiGeometry` wrapping the multi/collection forms.

use geo::{Coord, Geometry, LineString, Polygon};

/// Emit the KML geometry block for `geom`. Total over every geometry kind the
/// model can carry; multi/collection forms nest inside `<MultiGeometry>`.
pub(crate) fn write_geometry(out: &mut String, geom: &Geometry<f64>) {
    match geom {
        Geometry::Point(p) => {
            out.push_str("<Point><coordinates>");
            push_coord(out, &p.0);
            out.push_str("</coordinates></Point>");
        }
        Geometry::MultiPoint(mp) => {
            out.push_str("<MultiGeometry>");
            for p in &mp.0 {
                write_geometry(out, &Geometry::Point(*p));
            }
            out.push_str("</MultiGeometry>");
        }
        Geometry::Line(line) => {
            write_line_string(out, &LineString(vec![line.start, line.end]));
        }
        Geometry::LineString(ls) => write_line_string(out, ls),
        Geometry::MultiLineString(mls) => {
            out.push_str("<MultiGeometry>");
            for ls in &mls.0 {
                write_line_string(out, ls);
            }
            out.push_str("</MultiGeometry>");
        }
        Geometry::Polygon(poly) => write_polygon(out, poly),
        Geometry::MultiPolygon(mp) => {
            out.push_str("<MultiGeometry>");
            for poly in &mp.0 {
                write_polygon(out, poly);
            }
            out.push_str("</MultiGeometry>");
        }
        Geometry::Rect(rect) => write_polygon(out, &rect.to_polygon()),
        Geometry::Triangle(tri) => write_polygon(out, &tri.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            out.push_str("<MultiGeometry>");
            for member in &gc.0 {
                write_geometry(out, member);
            }
            out.push_str("</MultiGeometry>");
        }
    }
}

fn write_line_string(out: &mut String, ls: &LineString<f64>) {
    out.push_str("<LineString><tessellate>1</tessellate><coordinates>");
    push_coords(out, &ls.0, false);
    out.push_str("</coordinates></LineString>");
}

fn write_polygon(out: &mut String, poly: &Polygon<f64>) {
    out.push_str("<Polygon><outerBoundaryIs>");
    write_ring(out, poly.exterior());
    out.push_str("</outerBoundaryIs>");
    for hole in poly.interiors() {
        out.push_str("<innerBoundaryIs>");
        write_ring(out, hole);
        out.push_str("</innerBoundaryIs>");
    }
    out.push_str("</Polygon>");
}

fn write_ring(out: &mut String, ring: &LineString<f64>) {
    out.push_str("<LinearRing><coordinates>");
    push_coords(out, &ring.0, true);
    out.push_str("</coordinates></LinearRing>");
}

/// Space-separated `lon,lat,0` list. With `close`, re-emits the first vertex
/// at the end when the ring is not already closed.
fn push_coords(out: &mut String, coords: &[Coord<f64>], close: bool) {
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        push_coord(out, c);
    }
    if close && coords.len() > 1 && coords.first() != coords.last() {
        out.push(' ');
        push_coord(out, &coords[0]);
    }
}

fn push_coord(out: &mut String, c: &Coord<f64>) {
    out.push_str(&format!("{},{},0", c.x, c.y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{GeometryCollection, line_string, point, polygon};

    #[test]
    fn point_markup() {
        let mut out = String::new();
        write_geometry(&mut out, &Geometry::Point(point!(x: -87.9065, y: 43.0389)));
        assert_eq!(out, "<Point><coordinates>-87.9065,43.0389,0</coordinates></Point>");
    }

    #[test]
    fn line_string_is_tessellated() {
        let mut out = String::new();
        write_geometry(&mut out, &Geometry::LineString(line_string![
            (x: 0.0, y: 0.0), (x: 1.0, y: 2.0),
        ]));
        assert_eq!(
            out,
            "<LineString><tessellate>1</tessellate><coordinates>0,0,0 1,2,0</coordinates></LineString>"
        );
    }

    #[test]
    fn unclosed_rings_are_closed_on_emission() {
        // Open ring: first vertex must be re-emitted at the end.
        let open = Polygon::new(
            LineString(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 4.0, y: 0.0 },
                Coord { x: 4.0, y: 4.0 },
            ]),
            vec![],
        );
        let mut out = String::new();
        write_geometry(&mut out, &Geometry::Polygon(open));
        let coords = out
            .split("<coordinates>")
            .nth(1)
            .and_then(|s| s.split("</coordinates>").next())
            .unwrap();
        let verts: Vec<&str> = coords.split(' ').collect();
        assert_eq!(verts.first(), verts.last());
        assert_eq!(verts.len(), 4);
    }

    #[test]
    fn polygon_holes_become_inner_boundaries() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 4.0, y: 2.0), (x: 4.0, y: 4.0), (x: 2.0, y: 2.0)]],
        );
        let mut out = String::new();
        write_geometry(&mut out, &Geometry::Polygon(poly));
        assert_eq!(out.matches("<outerBoundaryIs>").count(), 1);
        assert_eq!(out.matches("<innerBoundaryIs>").count(), 1);
    }

    #[test]
    fn collection_nests_into_multi_geometry() {
        let gc = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Point(point!(x: 1.0, y: 1.0)),
            Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
        ]));
        let mut out = String::new();
        write_geometry(&mut out, &gc);
        assert!(out.starts_with("<MultiGeometry>"));
        assert!(out.contains("<Point>"));
        assert!(out.contains("<LineString>"));
    }
}
