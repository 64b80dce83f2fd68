//! Feature and FeatureCollection documents.

use annotkit_model::{AnnotationItem, ItemData, ItemId, Layer, LayerId, ModelError, Scene};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::error::{FormatError, LoadError};
use crate::registry::CodecRegistry;
use crate::style::{decode_style, encode_style};
use crate::value::{as_array, as_object, index, join, optional, require, string};

/// Decode one `Feature`. Selection and other runtime state start cleared.
pub fn decode_feature(
    feature: &Value,
    path: &str,
    registry: &CodecRegistry,
) -> Result<ItemData, FormatError> {
    let obj = as_object(feature, path)?;
    let kind = string(require(obj, "type", path)?, &join(path, "type"))?;
    if kind != "Feature" {
        return Err(FormatError::invalid(
            join(path, "type"),
            format!("expected \"Feature\", got \"{kind}\""),
        ));
    }
    let geometry =
        registry.decode_geometry(require(obj, "geometry", path)?, &join(path, "geometry"))?;

    let mut data = ItemData::new(geometry);
    if let Some(props) = optional(obj, "properties") {
        let props_path = join(path, "properties");
        let props = as_object(props, &props_path)?;
        data.style = decode_style(props, &props_path)?;
        data.label = match optional(props, "label") {
            Some(v) => Some(string(v, &join(&props_path, "label"))?.to_string()),
            None => None,
        };
        data.bounding = match optional(props, "isBoundingElement") {
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                return Err(FormatError::invalid(
                    join(&props_path, "isBoundingElement"),
                    "expected a boolean",
                ));
            }
            None => false,
        };
    }
    Ok(data)
}

pub fn encode_feature(data: &ItemData, registry: &CodecRegistry) -> Result<Value, FormatError> {
    let geometry = registry.encode_geometry(&data.geometry)?;
    let mut props = Map::new();
    if let Some(label) = &data.label {
        props.insert("label".into(), Value::String(label.clone()));
    }
    encode_style(&data.style, &mut props);
    if data.bounding {
        props.insert("isBoundingElement".into(), Value::Bool(true));
    }
    Ok(json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": props,
    }))
}

/// Decode a `FeatureCollection`, or a bare array of features.
pub fn decode_collection(
    doc: &Value,
    registry: &CodecRegistry,
) -> Result<Vec<ItemData>, FormatError> {
    let (features, path) = match doc {
        Value::Array(items) => (items, String::new()),
        Value::Object(obj) => {
            let kind = string(require(obj, "type", "")?, "type")?;
            if kind != "FeatureCollection" {
                return Err(FormatError::invalid(
                    "type",
                    format!("expected \"FeatureCollection\", got \"{kind}\""),
                ));
            }
            (as_array(require(obj, "features", "")?, "features")?, "features".to_string())
        }
        _ => return Err(FormatError::invalid("", "expected a FeatureCollection")),
    };
    let items = features
        .iter()
        .enumerate()
        .map(|(i, f)| decode_feature(f, &index(&path, i), registry))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(features = items.len(), "decoded feature collection");
    Ok(items)
}

pub fn encode_items<'a, I>(items: I, registry: &CodecRegistry) -> Result<Value, FormatError>
where
    I: IntoIterator<Item = &'a AnnotationItem>,
{
    let features = items
        .into_iter()
        .map(|item| encode_feature(item.data(), registry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// A layer as a `FeatureCollection`, items in paint order.
pub fn encode_layer(layer: &Layer, registry: &CodecRegistry) -> Result<Value, FormatError> {
    encode_items(layer.items(), registry)
}

/// Decode a document and insert every feature into `layer`. Nothing is inserted when any
/// feature fails to decode.
pub fn load_into_layer(
    scene: &mut Scene,
    layer: LayerId,
    doc: &Value,
    registry: &CodecRegistry,
) -> Result<Vec<ItemId>, LoadError> {
    let items = decode_collection(doc, registry)?;
    if scene.layer(layer).is_none() {
        return Err(LoadError::Model(ModelError::UnknownLayer(layer)));
    }
    let mut ids = Vec::with_capacity(items.len());
    for data in items {
        if data.geometry.is_degenerate() {
            warn!("loading a degenerate rectangle");
        }
        ids.push(scene.insert_item(layer, data)?);
    }
    Ok(ids)
}
