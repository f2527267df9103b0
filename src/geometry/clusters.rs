use serde::Serialize;
use tracing::debug;

use super::polygon::{BBox, point_in_polygon};
use super::{Point, VIEWBOX_SIZE};
use crate::presets::MODIFIER_RANGE;
use crate::random::SeededRandom;
use crate::symbol::CrownTexture;

/// Candidates tried around each active sample before it is retired.
const ATTEMPTS_PER_SAMPLE: usize = 30;
/// Upper bound on raw samples per render.
const MAX_RAW_SAMPLES: usize = 20_000;
/// Draws spent looking for a first sample inside the canopy.
const SEED_ATTEMPTS: usize = 64;
/// Grid cells per bounding-box axis; spacing is raised to stay within it.
const MAX_GRID_SPAN: f64 = 512.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterPoint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl ClusterPoint {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Minimum distance between cluster centres, in viewBox units.
    pub min_distance: f64,
    pub target_count: usize,
    pub radius_min: f64,
    pub radius_max: f64,
}

impl SamplingParams {
    pub fn for_texture(
        texture: CrownTexture,
        density: f64,
        size_modifier: f64,
        spacing_modifier: f64,
    ) -> Self {
        let (min_distance, base_count, radius_min, radius_max) = match texture {
            CrownTexture::Fine => (28.0, 180.0, 9.0, 15.0),
            CrownTexture::Medium => (40.0, 120.0, 13.0, 22.0),
            CrownTexture::Coarse => (60.0, 70.0, 20.0, 34.0),
            CrownTexture::Needle => (24.0, 200.0, 6.0, 11.0),
        };
        let density = density.clamp(0.0, 1.0);
        let size = modifier_or_one(size_modifier);
        let spacing = modifier_or_one(spacing_modifier);
        Self {
            min_distance: min_distance * spacing,
            target_count: (base_count * (0.55 + density)).round() as usize,
            radius_min: radius_min * size,
            radius_max: radius_max * size,
        }
    }
}

fn modifier_or_one(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v.clamp(MODIFIER_RANGE.0, MODIFIER_RANGE.1)
    } else {
        1.0
    }
}

/// Background grid of sample indices, one slot per `min_distance / sqrt(2)` cell.
struct SampleGrid {
    origin: Point,
    cell: f64,
    cols: usize,
    rows: usize,
    slots: Vec<Option<usize>>,
}

impl SampleGrid {
    fn new(bbox: &BBox, min_distance: f64) -> Self {
        let cell = (min_distance / std::f64::consts::SQRT_2)
            .max(bbox.width() / MAX_GRID_SPAN)
            .max(bbox.height() / MAX_GRID_SPAN);
        let cols = (bbox.width() / cell).ceil().max(1.0) as usize;
        let rows = (bbox.height() / cell).ceil().max(1.0) as usize;
        Self {
            origin: Point::new(bbox.min_x, bbox.min_y),
            cell,
            cols,
            rows,
            slots: vec![None; cols * rows],
        }
    }

    /// Spacing the grid can enforce with one sample per cell.
    fn min_distance(&self) -> f64 {
        self.cell * std::f64::consts::SQRT_2
    }

    fn cell_of(&self, p: &Point) -> (usize, usize) {
        let cx = ((p.x - self.origin.x) / self.cell) as usize;
        let cy = ((p.y - self.origin.y) / self.cell) as usize;
        (cx.min(self.cols - 1), cy.min(self.rows - 1))
    }

    fn insert(&mut self, p: &Point, index: usize) {
        let (cx, cy) = self.cell_of(p);
        self.slots[cy * self.cols + cx] = Some(index);
    }

    fn is_clear(&self, p: &Point, samples: &[Point], min_distance: f64) -> bool {
        let (cx, cy) = self.cell_of(p);
        let min_sq = min_distance * min_distance;
        for y in cy.saturating_sub(2)..=(cy + 2).min(self.rows - 1) {
            for x in cx.saturating_sub(2)..=(cx + 2).min(self.cols - 1) {
                if let Some(i) = self.slots[y * self.cols + x] {
                    if samples[i].distance_sq(p) < min_sq {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Bridson Poisson-disk sampling over the polygon's bounding box.
fn poisson_disk<R: SeededRandom + ?Sized>(
    bbox: &BBox,
    polygon: &[Point],
    min_distance: f64,
    rng: &mut R,
) -> Vec<Point> {
    let mut grid = SampleGrid::new(bbox, min_distance);
    let min_distance = grid.min_distance();
    let mut samples: Vec<Point> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let mut first = bbox.center();
    for _ in 0..SEED_ATTEMPTS {
        let candidate = Point::new(
            rng.range(bbox.min_x, bbox.max_x),
            rng.range(bbox.min_y, bbox.max_y),
        );
        if point_in_polygon(&candidate, polygon) {
            first = candidate;
            break;
        }
    }
    samples.push(first);
    active.push(0);
    grid.insert(&first, 0);

    while !active.is_empty() && samples.len() < MAX_RAW_SAMPLES {
        let slot = rng.index(active.len());
        let base = samples[active[slot]];
        let mut placed = false;

        for _ in 0..ATTEMPTS_PER_SAMPLE {
            let angle = rng.next_f64() * std::f64::consts::TAU;
            let dist = min_distance * (1.0 + rng.next_f64());
            let candidate = Point::new(base.x + dist * angle.cos(), base.y + dist * angle.sin());
            if bbox.contains(&candidate) && grid.is_clear(&candidate, &samples, min_distance) {
                let index = samples.len();
                samples.push(candidate);
                active.push(index);
                grid.insert(&candidate, index);
                placed = true;
                break;
            }
        }

        if !placed {
            active.swap_remove(slot);
        }
    }

    samples
}

/// Texture cluster points inside the canopy polygon.
///
/// An empty result is valid: it happens whenever the canopy is no wider
/// than the minimum cluster spacing.
pub fn sample_clusters<R: SeededRandom + ?Sized>(
    polygon: &[Point],
    params: &SamplingParams,
    rng: &mut R,
) -> Vec<ClusterPoint> {
    let Some(raw_bbox) = BBox::of(polygon) else {
        return Vec::new();
    };
    let bbox = BBox {
        min_x: raw_bbox.min_x.max(0.0),
        min_y: raw_bbox.min_y.max(0.0),
        max_x: raw_bbox.max_x.min(VIEWBOX_SIZE),
        max_y: raw_bbox.max_y.min(VIEWBOX_SIZE),
    };

    if params.target_count == 0
        || polygon.len() < 3
        || bbox.width() <= params.min_distance
        || bbox.height() <= params.min_distance
    {
        debug!(
            width = bbox.width(),
            height = bbox.height(),
            min_distance = params.min_distance,
            "canopy too small for clusters"
        );
        return Vec::new();
    }

    let mut inside: Vec<Point> = poisson_disk(&bbox, polygon, params.min_distance, rng)
        .into_iter()
        .filter(|p| point_in_polygon(p, polygon))
        .collect();

    // Bridson grows outward from its first sample; shuffle so truncation
    // keeps an even spread over the whole canopy.
    for i in (1..inside.len()).rev() {
        let j = rng.index(i + 1);
        inside.swap(i, j);
    }
    inside.truncate(params.target_count);

    inside
        .into_iter()
        .map(|p| ClusterPoint {
            x: p.x,
            y: p.y,
            radius: rng.range(params.radius_min, params.radius_max),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ChaChaRandom, RandomStream};
    use proptest::prelude::*;

    fn circle(cx: f64, cy: f64, r: f64, steps: usize) -> Vec<Point> {
        (0..steps)
            .map(|i| {
                let a = i as f64 / steps as f64 * std::f64::consts::TAU;
                Point::new(cx + r * a.cos(), cy + r * a.sin())
            })
            .collect()
    }

    fn sample(
        polygon: &[Point],
        texture: CrownTexture,
        density: f64,
        seed: u64,
    ) -> Vec<ClusterPoint> {
        let params = SamplingParams::for_texture(texture, density, 1.0, 1.0);
        let mut rng = ChaChaRandom::new(seed, RandomStream::Clusters);
        sample_clusters(polygon, &params, &mut rng)
    }

    #[test]
    fn target_count_follows_texture_and_density() {
        assert_eq!(
            SamplingParams::for_texture(CrownTexture::Fine, 0.45, 1.0, 1.0).target_count,
            180
        );
        assert_eq!(
            SamplingParams::for_texture(CrownTexture::Coarse, 1.0, 1.0, 1.0).target_count,
            109
        );
        assert_eq!(
            SamplingParams::for_texture(CrownTexture::Medium, 7.0, 1.0, 1.0).target_count,
            186
        );
    }

    #[test]
    fn modifiers_scale_spacing_and_radius() {
        let base = SamplingParams::for_texture(CrownTexture::Medium, 0.5, 1.0, 1.0);
        let scaled = SamplingParams::for_texture(CrownTexture::Medium, 0.5, 1.5, 2.0);
        assert_eq!(scaled.min_distance, base.min_distance * 2.0);
        assert_eq!(scaled.radius_max, base.radius_max * 1.5);
        let junk = SamplingParams::for_texture(CrownTexture::Medium, 0.5, -1.0, f64::NAN);
        assert_eq!(junk, base);
    }

    #[test]
    fn samples_respect_spacing_and_count() {
        let canopy = circle(500.0, 500.0, 450.0, 64);
        let params = SamplingParams::for_texture(CrownTexture::Medium, 0.65, 1.0, 1.0);
        let points = sample(&canopy, CrownTexture::Medium, 0.65, 11);
        assert_eq!(points.len(), params.target_count);
        for (i, a) in points.iter().enumerate() {
            assert!(a.radius >= params.radius_min && a.radius < params.radius_max);
            for b in &points[i + 1..] {
                assert!(a.center().distance_sq(&b.center()).sqrt() >= params.min_distance - 1e-9);
            }
        }
    }

    #[test]
    fn extreme_spacing_stays_bounded() {
        let clamped = SamplingParams::for_texture(CrownTexture::Fine, 0.65, 1.0, 1e-4);
        assert_eq!(clamped.min_distance, 28.0 * MODIFIER_RANGE.0);

        let canopy = circle(500.0, 500.0, 450.0, 64);
        let params = SamplingParams {
            min_distance: 1e-4,
            target_count: 150,
            radius_min: 1.0,
            radius_max: 2.0,
        };
        let mut rng = ChaChaRandom::new(9, RandomStream::Clusters);
        let points = sample_clusters(&canopy, &params, &mut rng);
        assert_eq!(points.len(), 150);
        assert!(points.iter().all(|p| point_in_polygon(&p.center(), &canopy)));
    }

    #[test]
    fn finer_texture_gives_more_points() {
        let canopy = circle(500.0, 500.0, 450.0, 64);
        let fine = sample(&canopy, CrownTexture::Fine, 0.65, 3).len();
        let coarse = sample(&canopy, CrownTexture::Coarse, 0.65, 3).len();
        assert!(fine > coarse);
    }

    #[test]
    fn tiny_canopy_yields_no_clusters() {
        let canopy = circle(500.0, 500.0, 15.0, 48);
        assert!(sample(&canopy, CrownTexture::Coarse, 0.9, 5).is_empty());
        assert!(sample(&[], CrownTexture::Fine, 0.9, 5).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn every_cluster_is_inside(
            seed in any::<u64>(),
            r in 40.0f64..480.0,
            density in 0.0f64..1.0
        ) {
            let canopy = circle(500.0, 500.0, r, 48);
            let points = sample(&canopy, CrownTexture::Fine, density, seed);
            for p in &points {
                prop_assert!(point_in_polygon(&p.center(), &canopy));
            }
            let again = sample(&canopy, CrownTexture::Fine, density, seed);
            prop_assert_eq!(points, again);
        }
    }
}
