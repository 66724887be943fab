//! Planar billboard rectangles

use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};

/// A planar rectangle given by four ordered corners.
///
/// In the billboard's local frame the corners are `p0` top-right, `p1`
/// bottom-right, `p2` bottom-left and `p3` top-left. The first axis runs from
/// `p0` to `p1`, the second from `p1` to `p2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub p0: Point3f,
    pub p1: Point3f,
    pub p2: Point3f,
    pub p3: Point3f,
    pub center: Point3f,
    pub axis_x: Vector3f,
    pub axis_y: Vector3f,
    pub axis_x_length: f32,
    pub axis_y_length: f32,
}

impl Rectangle {
    pub fn new(p0: Point3f, p1: Point3f, p2: Point3f, p3: Point3f) -> Self {
        let mut rect = Self {
            p0,
            p1,
            p2,
            p3,
            center: p0,
            axis_x: Vector3f::zeros(),
            axis_y: Vector3f::zeros(),
            axis_x_length: 0.0,
            axis_y_length: 0.0,
        };
        rect.update();
        rect
    }

    /// Recompute center, axes and lengths from the corners
    pub fn update(&mut self) {
        self.center = self.p0 + (self.p2 - self.p0) / 2.0;

        let x = self.p1 - self.p0;
        let y = self.p2 - self.p1;
        self.axis_x_length = x.magnitude();
        self.axis_y_length = y.magnitude();
        // Collapsed sides keep a zero axis; their texture size is rejected later
        self.axis_x = x.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros);
        self.axis_y = y.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros);
    }

    pub fn corners(&self) -> [Point3f; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    pub fn area(&self) -> f32 {
        self.axis_x_length * self.axis_y_length
    }

    /// Whether a point (assumed to lie in the rectangle's plane) is inside the
    /// rectangle, allowing `tolerance` of slack on every side.
    pub fn contains(&self, point: &Point3f, tolerance: f32) -> bool {
        let d = point - self.center;
        d.dot(&self.axis_x).abs() <= self.axis_x_length / 2.0 + tolerance
            && d.dot(&self.axis_y).abs() <= self.axis_y_length / 2.0 + tolerance
    }

    /// World-to-billboard transform used for texture baking.
    ///
    /// The local frame has its x axis along `axis_x`, its z axis along the
    /// plane `normal` and its y axis along `normal x axis_x`, with the origin
    /// at the rectangle center.
    pub fn world_to_local(&self, normal: &Vector3f) -> Transform3D {
        let z = *normal;
        let x = self.axis_x;
        let y = z.cross(&x).try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros);
        Transform3D::from_frame_axes(&x, &y, &z) * Transform3D::translation(-self.center.coords)
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::new(
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(1.0, -1.0, 0.0),
            Point3f::new(-1.0, -1.0, 0.0),
            Point3f::new(-1.0, 1.0, 0.0),
        )
    }
}
