use std::fmt;

use annotkit_core::{Bounds, DVec2};
use annotkit_geometry::{Rectangle, Region};
use serde::{Deserialize, Serialize};

use crate::raster::Raster;
use crate::style::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Region,
    Rectangle,
    Raster,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeometryKind::Region => "region",
            GeometryKind::Rectangle => "rectangle",
            GeometryKind::Raster => "raster",
        })
    }
}

/// Geometry of an annotation item. The variant never changes after creation.
#[derive(Debug, Clone)]
pub enum Geometry {
    Region(Region),
    Rectangle(Rectangle),
    Raster(Raster),
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Region(_) => GeometryKind::Region,
            Geometry::Rectangle(_) => GeometryKind::Rectangle,
            Geometry::Raster(_) => GeometryKind::Raster,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Geometry::Region(r) => r.bounds(),
            Geometry::Rectangle(r) => Some(r.bounds()),
            Geometry::Raster(r) => r.bounds(),
        }
    }

    #[must_use]
    pub fn contains_point(&self, p: DVec2) -> bool {
        match self {
            Geometry::Region(r) => r.contains_point(p),
            Geometry::Rectangle(r) => r.contains_point(p),
            Geometry::Raster(r) => r.contains_point(p),
        }
    }

    pub fn translate(&mut self, delta: DVec2) {
        match self {
            Geometry::Region(r) => r.translate(delta),
            Geometry::Rectangle(r) => r.translate(delta),
            Geometry::Raster(r) => r.translate(delta),
        }
    }

    /// Filled area as a region, used when the item acts as a bounding element.
    #[must_use]
    pub fn to_region(&self) -> Option<Region> {
        match self {
            Geometry::Region(r) => Some(r.clone()),
            Geometry::Rectangle(r) => Some(Region::from_ring(r.to_ring())),
            Geometry::Raster(_) => None,
        }
    }

    /// True for geometry that never reached a valid state: a zero-area rectangle.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Geometry::Rectangle(r) if r.is_degenerate())
    }
}

/// Everything about an item that documents carry: what a decoder produces and what
/// [`crate::Scene::insert_item`] consumes.
#[derive(Debug, Clone)]
pub struct ItemData {
    pub geometry: Geometry,
    pub label: Option<String>,
    pub style: Style,
    pub bounding: bool,
}

impl ItemData {
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            label: None,
            style: Style::default(),
            bounding: false,
        }
    }
}

/// An item owned by a layer. Selection is runtime state and is never persisted.
#[derive(Debug, Clone)]
pub struct AnnotationItem {
    pub(crate) id: ItemId,
    pub(crate) layer: LayerId,
    pub(crate) data: ItemData,
    pub(crate) selected: bool,
}

impl AnnotationItem {
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.data.geometry
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.data.label.as_deref()
    }

    #[must_use]
    pub fn style(&self) -> &Style {
        &self.data.style
    }

    #[must_use]
    pub fn is_bounding(&self) -> bool {
        self.data.bounding
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[must_use]
    pub fn data(&self) -> &ItemData {
        &self.data
    }
}
