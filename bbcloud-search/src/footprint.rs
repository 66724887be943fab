//! Billboard footprints
//!
//! A group's vertices are projected into a 2D frame of its plane, enclosed
//! by the minimum-area rectangle and lifted back to world space.

use crate::calipers::RotatingCalipers;
use bbcloud_core::{Error, Plane, Point2f, Point3f, Rectangle, Result, Triangle, Vector3f};

/// Normals closer than this to the Z axis take their frame from the X axis
const POLAR_THRESHOLD: f32 = 0.999;

/// An orthonormal 2D frame on a plane, anchored at the plane point nearest
/// the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFrame {
    pub origin: Point3f,
    pub x: Vector3f,
    pub y: Vector3f,
    pub normal: Vector3f,
}

impl PlaneFrame {
    /// The x axis is perpendicular to world Z where possible, `y = n x x`
    pub fn new(plane: &Plane) -> Self {
        let n = plane.normal;
        let x = if n.z.abs() > POLAR_THRESHOLD {
            (Vector3f::x() - n * n.x).normalize()
        } else {
            Vector3f::z().cross(&n).normalize()
        };
        let y = n.cross(&x);
        Self {
            origin: Point3f::from(n * plane.distance),
            x,
            y,
            normal: n,
        }
    }

    /// Plane coordinates of the orthogonal projection of `p`
    pub fn to_local(&self, p: &Point3f) -> Point2f {
        let d = p - self.origin;
        Point2f::new(d.dot(&self.x), d.dot(&self.y))
    }

    pub fn to_world(&self, p: &Point2f) -> Point3f {
        self.origin + self.x * p.x + self.y * p.y
    }
}

/// Minimum-area rectangle on `plane` enclosing the projected vertices of
/// the member triangles
pub fn fit_rectangle(plane: &Plane, triangles: &[Triangle], members: &[usize]) -> Result<Rectangle> {
    if members.is_empty() {
        return Err(Error::InvalidData(
            "Cannot fit a footprint to an empty group".to_string(),
        ));
    }

    let frame = PlaneFrame::new(plane);
    let points: Vec<Point2f> = members
        .iter()
        .flat_map(|&i| triangles[i].vertices())
        .map(|p| frame.to_local(&p))
        .collect();

    let rect = RotatingCalipers::new(&points)?.min_area_rectangle();
    let [p0, p1, p2, p3] = rect.corners.map(|c| frame.to_world(&c));
    Ok(Rectangle::new(p0, p1, p2, p3))
}
