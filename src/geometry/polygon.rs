use super::Point;

/// Distance (in drawing units) under which a point counts as lying on an edge.
const BOUNDARY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Signed shoelace area; positive for counter-clockwise rings in y-up space.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        acc += a.x * b.y - b.x * a.y;
    }
    acc / 2.0
}

/// > 0 when `p` is left of the directed line a→b.
fn cross(a: &Point, b: &Point, p: &Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

fn on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    let len = a.distance_sq(b).sqrt();
    if len == 0.0 {
        return p.distance_sq(a).sqrt() <= BOUNDARY_EPSILON;
    }
    if (cross(a, b, p) / len).abs() > BOUNDARY_EPSILON {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    dot >= -BOUNDARY_EPSILON * len && dot <= len * len + BOUNDARY_EPSILON * len
}

/// Boundary-inclusive winding-number test.
///
/// Points on an edge or vertex are inside. Everything else is inside when
/// the winding number around it is non-zero.
pub fn point_in_polygon(p: &Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut winding = 0i32;
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        if on_segment(p, a, b) {
            return true;
        }
        if a.y <= p.y {
            if b.y > p.y && cross(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && cross(a, b, p) < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Closed-segment intersection, touching endpoints included.
pub fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(a1, b1, b2))
        || (d2 == 0.0 && on_segment(a2, b1, b2))
        || (d3 == 0.0 && on_segment(b1, a1, a2))
        || (d4 == 0.0 && on_segment(b2, a1, a2))
}

/// Index pair of the first two non-adjacent edges that cross, if any.
pub(crate) fn find_self_intersection(points: &[Point]) -> Option<(usize, usize)> {
    let n = points.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        let a1 = &points[i];
        let a2 = &points[(i + 1) % n];
        for j in (i + 2)..n {
            // The first and last edges share vertex 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b1 = &points[j];
            let b2 = &points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return Some((i, j));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{BBox, find_self_intersection, point_in_polygon, polygon_area};
    use crate::geometry::Point;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn interior_and_exterior_points() {
        let sq = square();
        assert!(point_in_polygon(&Point::new(5.0, 5.0), &sq));
        assert!(!point_in_polygon(&Point::new(15.0, 5.0), &sq));
        assert!(!point_in_polygon(&Point::new(-0.1, 5.0), &sq));
    }

    #[test]
    fn boundary_counts_as_inside() {
        let sq = square();
        assert!(point_in_polygon(&Point::new(0.0, 0.0), &sq));
        assert!(point_in_polygon(&Point::new(10.0, 4.0), &sq));
        assert!(point_in_polygon(&Point::new(3.0, 10.0), &sq));
    }

    #[test]
    fn orientation_does_not_matter() {
        let mut sq = square();
        sq.reverse();
        assert!(point_in_polygon(&Point::new(5.0, 5.0), &sq));
        assert!((polygon_area(&sq) + 100.0).abs() < 1e-9);
    }

    #[test]
    fn concave_notch_is_outside() {
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(9.0, 0.0),
            Point::new(9.0, 9.0),
            Point::new(6.0, 9.0),
            Point::new(6.0, 3.0),
            Point::new(3.0, 3.0),
            Point::new(3.0, 9.0),
            Point::new(0.0, 9.0),
        ];
        assert!(!point_in_polygon(&Point::new(4.5, 6.0), &u));
        assert!(point_in_polygon(&Point::new(1.5, 6.0), &u));
        assert!(find_self_intersection(&u).is_none());
    }

    #[test]
    fn bowtie_is_detected() {
        let bowtie = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        assert!(find_self_intersection(&bowtie).is_some());
        assert!(find_self_intersection(&square()).is_none());
    }

    #[test]
    fn bbox_extents() {
        let bbox = BBox::of(&square()).expect("non-empty");
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.center(), Point::new(5.0, 5.0));
        assert!(BBox::of(&[]).is_none());
    }
}
