use std::collections::HashMap;

use annotkit_geometry::DEFAULT_ARC_STEP_DEG;
use annotkit_model::{Geometry, GeometryKind};
use serde_json::Value;
use tracing::trace;

use crate::error::FormatError;
use crate::geometry::{RasterCodec, RectangleCodec, RegionCodec};
use crate::value::{as_object, join, optional, require, string};

/// Persisted `(geometry.type, geometry.properties.subtype)` pair a codec answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub kind: &'static str,
    pub subtype: Option<&'static str>,
}

impl TypeKey {
    #[must_use]
    pub const fn new(kind: &'static str, subtype: Option<&'static str>) -> Self {
        Self { kind, subtype }
    }
}

/// Converts one geometry variant to and from its persisted geometry object.
pub trait GeometryCodec {
    /// Document keys this codec decodes.
    fn type_keys(&self) -> &'static [TypeKey];

    /// Live variant this codec encodes.
    fn geometry_kind(&self) -> GeometryKind;

    /// Decode a geometry object. `registry` is available for nested geometries.
    fn decode(
        &self,
        geometry: &Value,
        path: &str,
        registry: &CodecRegistry,
    ) -> Result<Geometry, FormatError>;

    fn encode(&self, geometry: &Geometry, registry: &CodecRegistry) -> Result<Value, FormatError>;
}

/// `(type, subtype) → codec` dispatch for decoding and `variant → codec` for encoding.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn GeometryCodec>>,
    by_key: HashMap<(String, Option<String>), usize>,
    by_kind: HashMap<GeometryKind, usize>,
    /// Angular step used to flatten arcs when writing rings.
    pub arc_step_deg: f64,
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("keys", &self.by_key.keys().collect::<Vec<_>>())
            .field("arc_step_deg", &self.arc_step_deg)
            .finish()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(RegionCodec));
        registry.register(Box::new(RectangleCodec));
        registry.register(Box::new(RasterCodec));
        registry
    }
}

impl CodecRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            codecs: Vec::new(),
            by_key: HashMap::new(),
            by_kind: HashMap::new(),
            arc_step_deg: DEFAULT_ARC_STEP_DEG,
        }
    }

    #[must_use]
    pub fn with_arc_step(mut self, step_deg: f64) -> Self {
        self.arc_step_deg = step_deg;
        self
    }

    /// Later registrations replace earlier ones for the same keys.
    pub fn register(&mut self, codec: Box<dyn GeometryCodec>) {
        let idx = self.codecs.len();
        for key in codec.type_keys() {
            self.by_key.insert(
                (key.kind.to_string(), key.subtype.map(str::to_string)),
                idx,
            );
        }
        self.by_kind.insert(codec.geometry_kind(), idx);
        self.codecs.push(codec);
    }

    pub fn decode_geometry(&self, geometry: &Value, path: &str) -> Result<Geometry, FormatError> {
        let obj = as_object(geometry, path)?;
        let kind = string(require(obj, "type", path)?, &join(path, "type"))?;
        let props_path = join(path, "properties");
        let subtype = match optional(obj, "properties") {
            Some(props) => match optional(as_object(props, &props_path)?, "subtype") {
                Some(s) => Some(string(s, &join(&props_path, "subtype"))?),
                None => None,
            },
            None => None,
        };

        let idx = self
            .by_key
            .get(&(kind.to_string(), subtype.map(str::to_string)))
            .ok_or_else(|| FormatError::UnsupportedGeometry {
                kind: kind.to_string(),
                subtype: subtype.map(str::to_string),
            })?;
        trace!(kind, ?subtype, path, "decoding geometry");
        self.codecs[*idx].decode(geometry, path, self)
    }

    pub fn encode_geometry(&self, geometry: &Geometry) -> Result<Value, FormatError> {
        let kind = geometry.kind();
        let idx = self
            .by_kind
            .get(&kind)
            .ok_or_else(|| FormatError::UnsupportedGeometry {
                kind: kind.to_string(),
                subtype: None,
            })?;
        self.codecs[*idx].encode(geometry, self)
    }
}
