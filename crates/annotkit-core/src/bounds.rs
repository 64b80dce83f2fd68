use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Box spanned by two arbitrary corner points.
    #[must_use]
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point, `None` when the iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Self {
            min: first,
            max: first,
        };
        for p in iter {
            out.min = out.min.min(p);
            out.max = out.max.max(p);
        }
        Some(out)
    }

    #[must_use]
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn expand(&self, margin: f64) -> Bounds {
        Bounds {
            min: self.min - DVec2::splat(margin),
            max: self.max + DVec2::splat(margin),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    #[must_use]
    pub fn contains(&self, other: &Bounds) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// True when the two boxes share at least one point.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Corners in top-left, top-right, bottom-right, bottom-left order (y down).
    #[must_use]
    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.min,
            DVec2::new(self.max.x, self.min.y),
            self.max,
            DVec2::new(self.min.x, self.max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_normalizes_order() {
        let b = Bounds::from_corners(DVec2::new(10.0, -2.0), DVec2::new(0.0, 5.0));
        assert_eq!(b.min, DVec2::new(0.0, -2.0));
        assert_eq!(b.max, DVec2::new(10.0, 5.0));
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 7.0);
    }

    #[test]
    fn overlap_and_containment() {
        let outer = Bounds::from_corners(DVec2::ZERO, DVec2::splat(10.0));
        let inner = Bounds::from_corners(DVec2::splat(2.0), DVec2::splat(3.0));
        let straddling = Bounds::from_corners(DVec2::splat(8.0), DVec2::splat(12.0));
        let outside = Bounds::from_corners(DVec2::splat(11.0), DVec2::splat(12.0));

        assert!(outer.contains(&inner));
        assert!(outer.overlaps(&straddling));
        assert!(!outer.contains(&straddling));
        assert!(!outer.overlaps(&outside));
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Bounds::from_points(Vec::<DVec2>::new()).is_none());
    }
}
