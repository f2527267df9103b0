//! Plan-view geometry: scale arithmetic, outlines, polygon tests and
//! cluster sampling.

mod clusters;
mod outline;
mod polygon;
mod scale;

use serde::{Deserialize, Serialize};

pub use clusters::{ClusterPoint, SamplingParams, sample_clusters};
pub use outline::{
    MIN_DIMENSION_CM, OUTLINE_STEPS, SCALE_BOX_TIERS_CM, VIEWBOX_SIZE, clamp_dimension,
    dedup_ring, frame_for_plant, generate_outline, get_scale_box, normalize_outline,
    validate_outline,
};
pub use polygon::{BBox, point_in_polygon, polygon_area, segments_intersect};
pub use scale::{STANDARD_SCALES, Scale, physical_mm};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Points arrive either as `{"x": .., "y": ..}` or as `[x, y]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Object { x: f64, y: f64 },
    Pair([f64; 2]),
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Object { x, y } => Point::new(x, y),
            PointRepr::Pair([x, y]) => Point::new(x, y),
        }
    }
}
