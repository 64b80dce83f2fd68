use glam::{DAffine2, DVec2};

/// Host view collaborator: current zoom plus the pointer (view) ↔ model coordinate mapping.
pub trait ViewMapper {
    /// Current scale factor (view pixels per model unit).
    fn zoom(&self) -> f64;

    /// View rotation in degrees.
    fn rotation(&self) -> f64;

    /// Viewport size in view pixels.
    fn view_size(&self) -> DVec2;

    fn view_to_model(&self, p: DVec2) -> DVec2;

    fn model_to_view(&self, p: DVec2) -> DVec2;
}

/// Concrete view: `center` (model) is shown at the middle of a `size` viewport, scaled by `zoom`
/// and rotated by `rotation_deg`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub rotation_deg: f64,
    pub center: DVec2,
    pub size: DVec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation_deg: 0.0,
            center: DVec2::ZERO,
            size: DVec2::new(800.0, 600.0),
        }
    }
}

impl ViewTransform {
    #[must_use]
    pub fn with_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matrix(&self) -> DAffine2 {
        DAffine2::from_translation(self.size * 0.5)
            * DAffine2::from_angle(self.rotation_deg.to_radians())
            * DAffine2::from_scale(DVec2::splat(self.zoom))
            * DAffine2::from_translation(-self.center)
    }
}

impl ViewMapper for ViewTransform {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn rotation(&self) -> f64 {
        self.rotation_deg
    }

    fn view_size(&self) -> DVec2 {
        self.size
    }

    fn view_to_model(&self, p: DVec2) -> DVec2 {
        self.matrix().inverse().transform_point2(p)
    }

    fn model_to_view(&self, p: DVec2) -> DVec2 {
        self.matrix().transform_point2(p)
    }
}

/// Screen-space precision converted into model units: `pixels / zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub pixels: f64,
    pub zoom: f64,
}

impl Tolerance {
    #[must_use]
    pub fn new(pixels: f64, zoom: f64) -> Self {
        Self { pixels, zoom }
    }

    #[must_use]
    pub fn for_view(pixels: f64, view: &dyn ViewMapper) -> Self {
        Self::new(pixels, view.zoom())
    }

    /// Tolerance in model units. A non-positive zoom is treated as 1.
    #[must_use]
    pub fn model(&self) -> f64 {
        if self.zoom > 0.0 {
            self.pixels / self.zoom
        } else {
            self.pixels
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn center_maps_to_middle_of_viewport() {
        let view = ViewTransform {
            zoom: 2.0,
            rotation_deg: 30.0,
            center: DVec2::new(100.0, 50.0),
            size: DVec2::new(400.0, 200.0),
        };
        let v = view.model_to_view(DVec2::new(100.0, 50.0));
        assert_abs_diff_eq!(v.x, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn view_model_round_trip() {
        let view = ViewTransform {
            zoom: 0.25,
            rotation_deg: -45.0,
            center: DVec2::new(3.0, -7.0),
            size: DVec2::new(640.0, 480.0),
        };
        let p = DVec2::new(12.5, 99.0);
        let back = view.view_to_model(view.model_to_view(p));
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
    }

    #[test]
    fn tolerance_scales_inversely_with_zoom() {
        assert_abs_diff_eq!(Tolerance::new(5.0, 2.0).model(), 2.5);
        assert_abs_diff_eq!(Tolerance::new(5.0, 0.5).model(), 10.0);
    }
}
