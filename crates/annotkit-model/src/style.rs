use serde::{Deserialize, Serialize};

/// Color as written in documents: either a CSS string or a list of 0..1 components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Css(String),
    Components(Vec<f64>),
}

/// Display style carried by an item or a clip-mask child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    pub stroke_width: f64,
    /// Stroke width stays constant in screen pixels across zoom.
    pub rescale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: None,
            stroke_width: 1.0,
            rescale: false,
            fill_color: None,
            fill_opacity: None,
        }
    }
}

impl Style {
    /// Half the stroke width in model units at `zoom`.
    #[must_use]
    pub fn half_stroke(&self, zoom: f64) -> f64 {
        let half = self.stroke_width.max(0.0) * 0.5;
        if self.rescale && zoom > 0.0 {
            half / zoom
        } else {
            half
        }
    }
}
