//! Boundary adapter: GeoJSON documents into the crate's model.
//!
//! Input is assumed to already be in WGS84 longitude/latitude degrees;
//! reprojection happens upstream of this crate.

use anyhow::{Context, Result, anyhow, bail};
use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde_json::{Map, Value};

use super::Feature;

/// Read a GeoJSON document into a list of features. Accepts a
/// `FeatureCollection`, a single `Feature`, or a bare geometry object.
pub fn read_feature_collection(value: &Value) -> Result<Vec<Feature>> {
    match value["type"].as_str() {
        Some("FeatureCollection") => {
            let features = value["features"]
                .as_array()
                .ok_or_else(|| anyhow!("FeatureCollection has no features array"))?;
            features.iter().map(read_feature).collect()
        }
        Some("Feature") => Ok(vec![read_feature(value)?]),
        Some(_) => Ok(vec![Feature {
            geometry: parse_geometry(value)?,
            properties: Map::new(),
        }]),
        None => bail!("not a GeoJSON document: missing \"type\""),
    }
}

/// Read a single GeoJSON `Feature` object.
pub fn read_feature(value: &Value) -> Result<Feature> {
    if value["type"].as_str() != Some("Feature") {
        bail!("expected a GeoJSON Feature, got {:?}", value["type"]);
    }
    let geometry = match &value["geometry"] {
        Value::Null => None,
        geom => parse_geometry(geom).context("failed to parse feature geometry")?,
    };
    let properties = match &value["properties"] {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    Ok(Feature { geometry, properties })
}

/// Parse a GeoJSON geometry object. `null` parses to `None`.
fn parse_geometry(value: &Value) -> Result<Option<Geometry<f64>>> {
    if value.is_null() {
        return Ok(None);
    }
    let kind = value["type"]
        .as_str()
        .ok_or_else(|| anyhow!("geometry has no \"type\""))?;

    if kind == "GeometryCollection" {
        let members = value["geometries"]
            .as_array()
            .ok_or_else(|| anyhow!("GeometryCollection has no geometries array"))?;
        let geoms = members
            .iter()
            .filter_map(|g| parse_geometry(g).transpose())
            .collect::<Result<Vec<_>>>()?;
        return Ok(Some(Geometry::GeometryCollection(GeometryCollection(geoms))));
    }

    let coords = value
        .get("coordinates")
        .ok_or_else(|| anyhow!("{kind} geometry has no coordinates"))?;

    let geom = match kind {
        "Point" => Geometry::Point(Point::from(parse_position(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(
            parse_position_array(coords)?.into_iter().map(Point::from).collect(),
        )),
        "LineString" => Geometry::LineString(LineString::from(parse_position_array(coords)?)),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString(
            array_of(coords)?
                .iter()
                .map(|line| Ok(LineString::from(parse_position_array(line)?)))
                .collect::<Result<Vec<_>>>()?,
        )),
        "Polygon" => Geometry::Polygon(parse_polygon(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(
            array_of(coords)?.iter().map(parse_polygon).collect::<Result<Vec<_>>>()?,
        )),
        other => bail!("unsupported geometry type {other:?}"),
    };
    Ok(Some(geom))
}

/// Polygon coordinates: first ring exterior, subsequent rings holes.
fn parse_polygon(coords: &Value) -> Result<Polygon<f64>> {
    let rings = array_of(coords)?;
    let exterior = rings
        .first()
        .ok_or_else(|| anyhow!("Polygon has no exterior ring"))?;
    let exterior = LineString::from(parse_position_array(exterior)?);
    let interiors = rings[1..]
        .iter()
        .map(|ring| Ok(LineString::from(parse_position_array(ring)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_position_array(value: &Value) -> Result<Vec<Coord<f64>>> {
    array_of(value)?.iter().map(parse_position).collect()
}

/// A position is `[lon, lat]` or `[lon, lat, elevation]`; elevation is
/// accepted and dropped (the serializer always emits 0).
fn parse_position(value: &Value) -> Result<Coord<f64>> {
    let pair = array_of(value)?;
    if pair.len() < 2 {
        bail!("position has fewer than two ordinates");
    }
    let x = pair[0].as_f64().ok_or_else(|| anyhow!("non-numeric longitude"))?;
    let y = pair[1].as_f64().ok_or_else(|| anyhow!("non-numeric latitude"))?;
    Ok(Coord { x, y })
}

fn array_of(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("expected a JSON array"))
}
