//! Convex hull and minimum-area enclosing rectangle of planar point sets
//!
//! The hull is built with a Graham scan; the rectangle is found by sweeping
//! rotating calipers around the hull, using only dot and cross products.

use bbcloud_core::{Error, Point2f, Result, Vector2f};
use std::cmp::Ordering;

fn cross(o: &Point2f, a: &Point2f, b: &Point2f) -> f32 {
    let u = a - o;
    let v = b - o;
    u.x * v.y - u.y * v.x
}

/// Convex hull in counter-clockwise order, without collinear points.
///
/// Duplicate points are ignored; fewer than three distinct points are
/// returned as they are.
pub fn convex_hull(points: &[Point2f]) -> Vec<Point2f> {
    let mut unique: Vec<Point2f> = points.to_vec();
    unique.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
    });
    unique.dedup();
    if unique.len() < 3 {
        return unique;
    }

    // Pivot: lowest point, leftmost among the lowest
    let mut pivot_index = 0;
    for (i, p) in unique.iter().enumerate() {
        let q = &unique[pivot_index];
        if p.y < q.y || (p.y == q.y && p.x < q.x) {
            pivot_index = i;
        }
    }
    let pivot = unique.swap_remove(pivot_index);

    unique.sort_by(|a, b| {
        let turn = cross(&pivot, a, b);
        if turn > 0.0 {
            Ordering::Less
        } else if turn < 0.0 {
            Ordering::Greater
        } else {
            (a - pivot)
                .norm_squared()
                .partial_cmp(&(b - pivot).norm_squared())
                .unwrap_or(Ordering::Equal)
        }
    });

    let mut hull: Vec<Point2f> = Vec::with_capacity(unique.len() + 1);
    hull.push(pivot);
    for p in unique {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], &p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull
}

/// Minimum-area rectangle enclosing a planar point set
#[derive(Debug, Clone)]
pub struct RotatingCalipers {
    hull: Vec<Point2f>,
}

/// An oriented rectangle in the plane.
///
/// With `u` the direction of the supporting hull edge and `v` its inward
/// normal, the corners are ordered `p0 = max u, max v`, `p1 = max u, min v`,
/// `p2 = min u, min v`, `p3 = min u, max v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinAreaRect {
    pub corners: [Point2f; 4],
    pub area: f32,
}

impl RotatingCalipers {
    pub fn new(points: &[Point2f]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InvalidData(
                "Cannot enclose an empty point set".to_string(),
            ));
        }
        Ok(Self {
            hull: convex_hull(points),
        })
    }

    pub fn hull(&self) -> &[Point2f] {
        &self.hull
    }

    /// The minimum-area enclosing rectangle
    pub fn min_area_rectangle(&self) -> MinAreaRect {
        let hull = &self.hull;
        let h = hull.len();
        if h == 1 {
            return MinAreaRect {
                corners: [hull[0]; 4],
                area: 0.0,
            };
        }

        let edge = |i: usize| -> (Point2f, Vector2f, Vector2f) {
            let base = hull[i];
            let u = (hull[(i + 1) % h] - base).normalize();
            (base, u, Vector2f::new(-u.y, u.x))
        };

        // Extreme points for the first edge by brute force; afterwards every
        // caliper only moves forward around the hull
        let (base, u, v) = edge(0);
        let along = |p: &Point2f, base: &Point2f, dir: &Vector2f| (p - base).dot(dir);
        let mut far = argmax(hull, |p| along(p, &base, &v));
        let mut right = argmax(hull, |p| along(p, &base, &u));
        let mut left = argmax(hull, |p| -along(p, &base, &u));

        let mut best: Option<MinAreaRect> = None;
        for i in 0..h {
            let (base, u, v) = edge(i);
            far = advance(hull, far, |p| along(p, &base, &v));
            right = advance(hull, right, |p| along(p, &base, &u));
            left = advance(hull, left, |p| -along(p, &base, &u));

            let max_v = along(&hull[far], &base, &v).max(0.0);
            let max_u = along(&hull[right], &base, &u);
            let min_u = along(&hull[left], &base, &u);
            let area = (max_u - min_u) * max_v;

            if best.as_ref().map_or(true, |b| area < b.area) {
                best = Some(MinAreaRect {
                    corners: [
                        base + u * max_u + v * max_v,
                        base + u * max_u,
                        base + u * min_u,
                        base + u * min_u + v * max_v,
                    ],
                    area,
                });
            }
        }

        best.unwrap_or(MinAreaRect {
            corners: [hull[0]; 4],
            area: 0.0,
        })
    }
}

fn argmax<F>(hull: &[Point2f], key: F) -> usize
where
    F: Fn(&Point2f) -> f32,
{
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, p) in hull.iter().enumerate() {
        let value = key(p);
        if value > best_value {
            best_value = value;
            best = i;
        }
    }
    best
}

/// Walk a caliper forward while the next hull point is at least as extreme
fn advance<F>(hull: &[Point2f], start: usize, key: F) -> usize
where
    F: Fn(&Point2f) -> f32,
{
    let h = hull.len();
    let mut i = start;
    for _ in 0..h {
        let next = (i + 1) % h;
        if key(&hull[next]) >= key(&hull[i]) {
            i = next;
        } else {
            break;
        }
    }
    i
}
