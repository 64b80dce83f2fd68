//! Persisted GeoJSON-like documents to and from live annotation items.

pub mod error;
pub mod feature;
pub mod geometry;
pub mod registry;
mod style;
pub mod transform;
mod value;

pub use error::{FormatError, LoadError};
pub use feature::{
    decode_collection, decode_feature, encode_feature, encode_items, encode_layer, load_into_layer,
};
pub use geometry::{RasterCodec, RectangleCodec, RegionCodec};
pub use registry::{CodecRegistry, GeometryCodec, TypeKey};
pub use transform::{decode_matrix, encode_matrix};
