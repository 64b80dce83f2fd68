use annotkit_core::{Bounds, DAffine2, DVec2};

use crate::item::Geometry;
use crate::style::Style;

/// Determinants smaller than this make a transform non-invertible.
pub const MIN_DETERMINANT: f64 = 1e-12;

/// Image placed by an affine transform, optionally clipped by an ordered list of child shapes.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Encoded pixel data (usually a data URL), carried through untouched.
    pub data: String,
    pub width: u32,
    pub height: u32,
    pub center: DVec2,
    pub scaling: DVec2,
    /// Rotation of the image within its group, in degrees.
    pub rotation: f64,
    /// Transform of the group holding image and clip mask.
    pub transform: DAffine2,
    pub clip_mask: Vec<MaskChild>,
}

/// One clip-mask shape. Mask children are addressed only through their parent raster.
#[derive(Debug, Clone)]
pub struct MaskChild {
    pub geometry: Geometry,
    pub style: Style,
}

impl Raster {
    /// Placement of the image inside its group:
    /// `translate(center) · rotate(rotation) · scale(scaling)`.
    #[must_use]
    pub fn own_matrix(&self) -> DAffine2 {
        DAffine2::from_scale_angle_translation(
            self.scaling,
            self.rotation.to_radians(),
            self.center,
        )
    }

    /// Image pixel space to model space.
    #[must_use]
    pub fn matrix(&self) -> DAffine2 {
        self.transform * self.own_matrix()
    }

    #[must_use]
    pub fn is_clipped(&self) -> bool {
        !self.clip_mask.is_empty()
    }

    /// Image corners in model space.
    #[must_use]
    pub fn quad(&self) -> [DVec2; 4] {
        let half = DVec2::new(f64::from(self.width), f64::from(self.height)) * 0.5;
        let m = self.matrix();
        Bounds::from_corners(-half, half)
            .corners()
            .map(|c| m.transform_point2(c))
    }

    /// Model-space point in group coordinates, `None` when the group transform is singular.
    #[must_use]
    pub fn to_group(&self, p: DVec2) -> Option<DVec2> {
        if self.transform.matrix2.determinant().abs() < MIN_DETERMINANT {
            return None;
        }
        Some(self.transform.inverse().transform_point2(p))
    }

    /// Visible extent: the clip mask's bounds when clipped, the image quad otherwise.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        if !self.is_clipped() {
            return Bounds::from_points(self.quad());
        }
        let local = self
            .clip_mask
            .iter()
            .filter_map(|child| child.geometry.bounds())
            .reduce(|a, b| a.union(&b))?;
        Bounds::from_points(local.corners().map(|c| self.transform.transform_point2(c)))
    }

    #[must_use]
    pub fn contains_point(&self, p: DVec2) -> bool {
        let Some(local) = self.to_group(p) else {
            return false;
        };
        if self.is_clipped() {
            return self
                .clip_mask
                .iter()
                .any(|child| child.geometry.contains_point(local));
        }
        let own = self.own_matrix();
        if own.matrix2.determinant().abs() < MIN_DETERMINANT {
            return false;
        }
        let px = own.inverse().transform_point2(local);
        let half = DVec2::new(f64::from(self.width), f64::from(self.height)) * 0.5;
        Bounds::from_corners(-half, half).contains_point(px)
    }

    pub fn translate(&mut self, delta: DVec2) {
        self.transform.translation += delta;
    }
}
