use std::f64::consts::TAU;

use tracing::debug;

use super::Point;
use super::polygon::{find_self_intersection, polygon_area};
use crate::error::{Result, SymbolError};
use crate::random::SeededRandom;

/// Side length of the canonical drawing space.
pub const VIEWBOX_SIZE: f64 = 1000.0;

/// Heights and spreads below this are treated as this.
pub const MIN_DIMENSION_CM: f64 = 10.0;

/// Vertex count of generated outlines.
pub const OUTLINE_STEPS: usize = 48;

/// `(max plant height, frame size)` in cm, smallest first.
pub const SCALE_BOX_TIERS_CM: [(f64, f64); 5] = [
    (150.0, 500.0),
    (400.0, 1000.0),
    (800.0, 1500.0),
    (1500.0, 2500.0),
    (f64::INFINITY, 4000.0),
];

const RADIUS_BASE: f64 = 0.88;
const RADIUS_JITTER: f64 = 0.24;

pub fn clamp_dimension(value_cm: f64) -> f64 {
    value_cm.max(MIN_DIMENSION_CM)
}

/// Frame size in cm for a plant of the given height.
pub fn get_scale_box(height_cm: f64) -> f64 {
    let height = clamp_dimension(height_cm);
    SCALE_BOX_TIERS_CM
        .iter()
        .find(|(max_height, _)| height <= *max_height)
        .map(|(_, frame)| *frame)
        .unwrap_or(SCALE_BOX_TIERS_CM[SCALE_BOX_TIERS_CM.len() - 1].1)
}

/// Default frame for a generated outline: the height tier, raised until
/// the widest possible ring of `spread_cm` fits inside it.
pub fn frame_for_plant(height_cm: f64, spread_cm: f64) -> f64 {
    let base = get_scale_box(height_cm);
    let widest = clamp_dimension(spread_cm) * (RADIUS_BASE + RADIUS_JITTER);
    SCALE_BOX_TIERS_CM
        .iter()
        .map(|(_, frame)| *frame)
        .find(|frame| *frame >= base && *frame >= widest)
        .unwrap_or(SCALE_BOX_TIERS_CM[SCALE_BOX_TIERS_CM.len() - 1].1)
}

/// Map centimetre coordinates into the `0..VIEWBOX_SIZE` square.
pub fn normalize_outline(points_cm: &[Point], scale_box_cm: f64) -> Result<Vec<Point>> {
    if !scale_box_cm.is_finite() || scale_box_cm <= 0.0 {
        return Err(SymbolError::plant(format!(
            "scale box must be a positive number, got {}",
            scale_box_cm
        )));
    }
    let factor = VIEWBOX_SIZE / clamp_dimension(scale_box_cm);
    let mut clamped = 0usize;
    let points = points_cm
        .iter()
        .map(|p| {
            let scaled = Point::new(p.x * factor, p.y * factor);
            let fitted = Point::new(
                scaled.x.clamp(0.0, VIEWBOX_SIZE),
                scaled.y.clamp(0.0, VIEWBOX_SIZE),
            );
            if fitted != scaled {
                clamped += 1;
            }
            fitted
        })
        .collect();
    if clamped > 0 {
        debug!(clamped, scale_box_cm, "outline points clamped to the viewBox");
    }
    Ok(points)
}

/// Drop repeated consecutive vertices and an explicit closing vertex.
pub fn dedup_ring(points: &[Point]) -> Vec<Point> {
    let mut ring: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if ring.last() != Some(p) {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Organic closed outline for plants with no surveyed footprint.
///
/// Each of the [`OUTLINE_STEPS`] vertices sits at `spread/2 * (0.88 + j * 0.24)`
/// from `center_cm`, where `j` is the mean of three consecutive draws. The
/// draw order is fixed, so a given seed always yields the same ring.
pub fn generate_outline<R: SeededRandom + ?Sized>(
    spread_cm: f64,
    center_cm: Point,
    rng: &mut R,
) -> Vec<Point> {
    let half = clamp_dimension(spread_cm) / 2.0;
    (0..OUTLINE_STEPS)
        .map(|i| {
            let angle = i as f64 / OUTLINE_STEPS as f64 * TAU;
            let j = (rng.next_f64() + rng.next_f64() + rng.next_f64()) / 3.0;
            let radius = half * (RADIUS_BASE + j * RADIUS_JITTER);
            Point::new(
                center_cm.x + radius * angle.cos(),
                center_cm.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Reject outlines that would make sampling or clipping undefined.
///
/// Closed rings and repeated vertices are checked as their [`dedup_ring`].
pub fn validate_outline(points: &[Point]) -> Result<()> {
    let ring = dedup_ring(points);
    let points = ring.as_slice();
    if points.len() < 3 {
        return Err(SymbolError::geometry(format!(
            "outline needs at least 3 points, got {}",
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(SymbolError::geometry(format!(
            "outline point {} is not finite",
            i
        )));
    }
    if polygon_area(points).abs() < f64::EPSILON {
        return Err(SymbolError::geometry("outline encloses no area"));
    }
    if let Some((a, b)) = find_self_intersection(points) {
        return Err(SymbolError::geometry(format!(
            "outline edges {} and {} cross",
            a, b
        )));
    }
    Ok(())
}
