//! Implicit planes and point-to-plane distance queries

use crate::point::*;
use crate::triangle::Triangle;
use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

/// A 3D plane `dot(normal, x) = distance` with a unit normal and a
/// non-negative offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3f,
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a normal and offset.
    ///
    /// The normal is normalized and the pair is flipped if needed so that
    /// `distance >= 0`.
    pub fn new(normal: Vector3f, distance: f32) -> Self {
        let magnitude = normal.magnitude();
        let (normal, distance) = if magnitude > 0.0 {
            (normal / magnitude, distance / magnitude)
        } else {
            (Vector3f::z(), distance)
        };
        if distance < 0.0 {
            Self { normal: -normal, distance: -distance }
        } else {
            Self { normal, distance }
        }
    }

    /// The plane through `point` with the given normal
    pub fn from_normal_and_point(normal: Vector3f, point: &Point3f) -> Self {
        let normal = normal.normalize();
        Self::new(normal, point.coords.dot(&normal))
    }

    /// The plane through three points, `None` if they are collinear
    pub fn from_points(p0: &Point3f, p1: &Point3f, p2: &Point3f) -> Option<Self> {
        let normal = (p1 - p0).cross(&(p2 - p0));
        if normal.magnitude() < 1e-12 {
            return None;
        }
        Some(Self::from_normal_and_point(normal, p0))
    }

    /// Implicit coefficients `(A, B, C, D)` of `Ax + By + Cz + D = 0`
    pub fn coefficients(&self) -> Vector4<f32> {
        Vector4::new(self.normal.x, self.normal.y, self.normal.z, -self.distance)
    }

    /// Signed distance, positive on the side the normal points to
    pub fn signed_distance(&self, point: &Point3f) -> f32 {
        point.coords.dot(&self.normal) - self.distance
    }

    /// Unsigned distance from a point to the plane
    pub fn point_distance(&self, point: &Point3f) -> f32 {
        self.signed_distance(point).abs()
    }

    /// Sum of the vertex distances of a triangle.
    ///
    /// Used as the assignment metric of the k-means clustering; the division
    /// by three of an average is omitted since it does not change the ordering.
    pub fn total_distance(&self, triangle: &Triangle) -> f32 {
        triangle.vertices().iter().map(|p| self.point_distance(p)).sum()
    }

    /// Largest vertex distance of a triangle
    pub fn max_distance(&self, triangle: &Triangle) -> f32 {
        triangle
            .vertices()
            .iter()
            .map(|p| self.point_distance(p))
            .fold(0.0, f32::max)
    }

    /// Smallest vertex distance of a triangle
    pub fn min_distance(&self, triangle: &Triangle) -> f32 {
        triangle
            .vertices()
            .iter()
            .map(|p| self.point_distance(p))
            .fold(f32::INFINITY, f32::min)
    }

    /// Whether every vertex of the triangle lies within `epsilon` of the plane
    pub fn fits(&self, triangle: &Triangle, epsilon: f32) -> bool {
        self.max_distance(triangle) <= epsilon
    }

    /// Orthogonal projection of a point onto the plane
    pub fn project_point(&self, point: &Point3f) -> Point3f {
        point - self.normal * self.signed_distance(point)
    }
}
