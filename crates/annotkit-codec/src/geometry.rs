//! Codecs for the three geometry variants.

use annotkit_core::DVec2;
use annotkit_geometry::primitives::{flatten_arcs, polygon, ring_points};
use annotkit_geometry::{Polyline, Rectangle, Region};
use annotkit_model::{Geometry, GeometryKind, MaskChild, Raster};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::FormatError;
use crate::registry::{CodecRegistry, GeometryCodec, TypeKey};
use crate::style::{decode_style, encode_stroke};
use crate::transform::{check_scaling, decode_matrix, encode_matrix};
use crate::value::{
    as_array, as_object, index, join, number, optional, point, point_value, points, require, string,
};

fn wrong_variant(expected: GeometryKind, geometry: &Geometry) -> FormatError {
    FormatError::invalid(
        "geometry",
        format!("{expected} codec cannot encode a {}", geometry.kind()),
    )
}

/// `Polygon` and `MultiPolygon`. Rings are classified by nesting, so hole order in the document
/// does not matter.
pub struct RegionCodec;

const REGION_KEYS: &[TypeKey] = &[
    TypeKey::new("Polygon", None),
    TypeKey::new("MultiPolygon", None),
];

fn decode_ring(v: &Value, path: &str) -> Result<Polyline<f64>, FormatError> {
    let mut pts = points(v, path)?;
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return Err(FormatError::invalid(path, "a ring needs at least three points"));
    }
    Ok(polygon(&pts))
}

fn encode_ring(ring: &Polyline<f64>, step_deg: f64, reverse: bool) -> Value {
    let mut pts = ring_points(&flatten_arcs(ring, step_deg));
    if reverse {
        pts.reverse();
    }
    if let Some(first) = pts.first().copied() {
        pts.push(first);
    }
    Value::from(pts.into_iter().map(point_value).collect::<Vec<_>>())
}

impl GeometryCodec for RegionCodec {
    fn type_keys(&self) -> &'static [TypeKey] {
        REGION_KEYS
    }

    fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::Region
    }

    fn decode(
        &self,
        geometry: &Value,
        path: &str,
        _registry: &CodecRegistry,
    ) -> Result<Geometry, FormatError> {
        let obj = as_object(geometry, path)?;
        let kind = string(require(obj, "type", path)?, &join(path, "type"))?;
        let coords_path = join(path, "coordinates");
        let coords = as_array(require(obj, "coordinates", path)?, &coords_path)?;

        let mut rings = Vec::new();
        if kind == "MultiPolygon" {
            for (i, poly) in coords.iter().enumerate() {
                let poly_path = index(&coords_path, i);
                for (j, ring) in as_array(poly, &poly_path)?.iter().enumerate() {
                    rings.push(decode_ring(ring, &index(&poly_path, j))?);
                }
            }
        } else {
            for (i, ring) in coords.iter().enumerate() {
                rings.push(decode_ring(ring, &index(&coords_path, i))?);
            }
        }
        Ok(Geometry::Region(Region::from_rings(rings)))
    }

    fn encode(&self, geometry: &Geometry, registry: &CodecRegistry) -> Result<Value, FormatError> {
        let Geometry::Region(region) = geometry else {
            return Err(wrong_variant(GeometryKind::Region, geometry));
        };
        let step = registry.arc_step_deg;
        let polygons: Vec<Value> = region
            .polygons()
            .iter()
            .map(|p| {
                let mut rings = vec![encode_ring(&p.outer, step, false)];
                rings.extend(p.holes.iter().map(|h| encode_ring(h, step, true)));
                Value::from(rings)
            })
            .collect();
        Ok(json!({
            "type": "MultiPolygon",
            "coordinates": polygons,
        }))
    }
}

/// `Point` with subtype `Rectangle`: four corners plus the frame rotation in degrees.
pub struct RectangleCodec;

const RECTANGLE_KEYS: &[TypeKey] = &[TypeKey::new("Point", Some("Rectangle"))];

impl GeometryCodec for RectangleCodec {
    fn type_keys(&self) -> &'static [TypeKey] {
        RECTANGLE_KEYS
    }

    fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::Rectangle
    }

    fn decode(
        &self,
        geometry: &Value,
        path: &str,
        _registry: &CodecRegistry,
    ) -> Result<Geometry, FormatError> {
        let obj = as_object(geometry, path)?;
        let coords_path = join(path, "coordinates");
        let mut corners = points(require(obj, "coordinates", path)?, &coords_path)?;
        if corners.len() == 5 && corners.first() == corners.last() {
            corners.pop();
        }
        let corners: [DVec2; 4] = corners
            .try_into()
            .map_err(|_| FormatError::invalid(&coords_path, "expected four corner points"))?;

        let props_path = join(path, "properties");
        let props = as_object(require(obj, "properties", path)?, &props_path)?;
        let rotation = optional(props, "rotation")
            .map(|v| number(v, &join(&props_path, "rotation")))
            .transpose()?;
        Ok(Geometry::Rectangle(Rectangle::from_corners(corners, rotation)))
    }

    fn encode(&self, geometry: &Geometry, _registry: &CodecRegistry) -> Result<Value, FormatError> {
        let Geometry::Rectangle(rect) = geometry else {
            return Err(wrong_variant(GeometryKind::Rectangle, geometry));
        };
        let corners: Vec<Value> = rect.corners().into_iter().map(point_value).collect();
        Ok(json!({
            "type": "Point",
            "coordinates": corners,
            "properties": {
                "subtype": "Rectangle",
                "rotation": rect.rotation(),
            },
        }))
    }
}

/// `GeometryCollection` with subtype `Raster`. Clip-mask children are the collection's
/// geometries, decoded through the registry and carrying their own stroke style.
pub struct RasterCodec;

const RASTER_KEYS: &[TypeKey] = &[TypeKey::new("GeometryCollection", Some("Raster"))];

impl GeometryCodec for RasterCodec {
    fn type_keys(&self) -> &'static [TypeKey] {
        RASTER_KEYS
    }

    fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::Raster
    }

    fn decode(
        &self,
        geometry: &Value,
        path: &str,
        registry: &CodecRegistry,
    ) -> Result<Geometry, FormatError> {
        let obj = as_object(geometry, path)?;
        let props_path = join(path, "properties");
        let props = as_object(require(obj, "properties", path)?, &props_path)?;
        let raster_path = join(&props_path, "raster");
        let raster = as_object(require(props, "raster", &props_path)?, &raster_path)?;

        let data = string(require(raster, "data", &raster_path)?, &join(&raster_path, "data"))?;
        let width = dimension(
            require(raster, "width", &raster_path)?,
            &join(&raster_path, "width"),
        )?;
        let height = dimension(
            require(raster, "height", &raster_path)?,
            &join(&raster_path, "height"),
        )?;
        let center = point(
            require(raster, "center", &raster_path)?,
            &join(&raster_path, "center"),
        )?;
        let scaling = match optional(raster, "scaling") {
            Some(v) => point(v, &join(&raster_path, "scaling"))?,
            None => DVec2::ONE,
        };
        let rotation = match optional(raster, "rotation") {
            Some(v) => number(v, &join(&raster_path, "rotation"))?,
            None => 0.0,
        };
        check_scaling(scaling, &join(&raster_path, "scaling"))?;

        let transform = match optional(props, "transform") {
            Some(v) => decode_matrix(v, &join(&props_path, "transform"))?,
            None => Default::default(),
        };

        let mut clip_mask = Vec::new();
        if let Some(children) = optional(obj, "geometries") {
            let children_path = join(path, "geometries");
            for (i, child) in as_array(children, &children_path)?.iter().enumerate() {
                let child_path = index(&children_path, i);
                let geometry = registry.decode_geometry(child, &child_path)?;
                let child_obj = as_object(child, &child_path)?;
                let style = match optional(child_obj, "properties") {
                    Some(p) => {
                        let p_path = join(&child_path, "properties");
                        decode_style(as_object(p, &p_path)?, &p_path)?
                    }
                    None => Default::default(),
                };
                clip_mask.push(MaskChild { geometry, style });
            }
        }
        debug!(width, height, mask = clip_mask.len(), "decoded raster");

        Ok(Geometry::Raster(Raster {
            data: data.to_string(),
            width,
            height,
            center,
            scaling,
            rotation,
            transform,
            clip_mask,
        }))
    }

    fn encode(&self, geometry: &Geometry, registry: &CodecRegistry) -> Result<Value, FormatError> {
        let Geometry::Raster(raster) = geometry else {
            return Err(wrong_variant(GeometryKind::Raster, geometry));
        };
        let geometries = raster
            .clip_mask
            .iter()
            .map(|child| {
                let mut value = registry.encode_geometry(&child.geometry)?;
                if let Some(obj) = value.as_object_mut() {
                    let props = obj
                        .entry("properties")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Some(props) = props.as_object_mut() {
                        encode_stroke(&child.style, props);
                    }
                }
                Ok(value)
            })
            .collect::<Result<Vec<_>, FormatError>>()?;

        Ok(json!({
            "type": "GeometryCollection",
            "properties": {
                "subtype": "Raster",
                "raster": {
                    "data": raster.data,
                    "width": raster.width,
                    "height": raster.height,
                    "center": point_value(raster.center),
                    "scaling": point_value(raster.scaling),
                    "rotation": raster.rotation,
                },
                "transform": encode_matrix(&raster.transform),
            },
            "geometries": geometries,
        }))
    }
}

fn dimension(v: &Value, path: &str) -> Result<u32, FormatError> {
    let n = number(v, path)?;
    if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(FormatError::invalid(path, "expected a non-negative integer"));
    }
    Ok(n as u32)
}
