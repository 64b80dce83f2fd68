use annotkit_model::{Color, Style};
use serde_json::{Map, Value};

use crate::error::FormatError;
use crate::value::{join, number, optional};

fn color(v: &Value, path: &str) -> Result<Color, FormatError> {
    serde_json::from_value(v.clone())
        .map_err(|_| FormatError::invalid(path, "expected a color string or component list"))
}

/// Read style fields from a properties object. Absent fields keep their defaults; `rescale`
/// given as an object (per-property rescale settings) counts as set.
pub(crate) fn decode_style(props: &Map<String, Value>, path: &str) -> Result<Style, FormatError> {
    let mut style = Style::default();
    if let Some(v) = optional(props, "strokeColor") {
        style.stroke_color = Some(color(v, &join(path, "strokeColor"))?);
    }
    if let Some(v) = optional(props, "strokeWidth") {
        style.stroke_width = number(v, &join(path, "strokeWidth"))?;
    }
    if let Some(v) = optional(props, "rescale") {
        style.rescale = match v {
            Value::Bool(b) => *b,
            Value::Object(_) => true,
            _ => {
                return Err(FormatError::invalid(
                    join(path, "rescale"),
                    "expected a boolean or an object",
                ));
            }
        };
    }
    if let Some(v) = optional(props, "fillColor") {
        style.fill_color = Some(color(v, &join(path, "fillColor"))?);
    }
    if let Some(v) = optional(props, "fillOpacity") {
        style.fill_opacity = Some(number(v, &join(path, "fillOpacity"))?);
    }
    Ok(style)
}

/// Stroke fields only, as carried by clip-mask children.
pub(crate) fn encode_stroke(style: &Style, props: &mut Map<String, Value>) {
    if let Some(c) = &style.stroke_color {
        props.insert("strokeColor".into(), color_value(c));
    }
    props.insert("strokeWidth".into(), Value::from(style.stroke_width));
    props.insert("rescale".into(), Value::Bool(style.rescale));
}

pub(crate) fn encode_style(style: &Style, props: &mut Map<String, Value>) {
    encode_stroke(style, props);
    if let Some(c) = &style.fill_color {
        props.insert("fillColor".into(), color_value(c));
    }
    if let Some(o) = style.fill_opacity {
        props.insert("fillOpacity".into(), Value::from(o));
    }
}

fn color_value(c: &Color) -> Value {
    match c {
        Color::Css(s) => Value::String(s.clone()),
        Color::Components(v) => Value::from(v.clone()),
    }
}
