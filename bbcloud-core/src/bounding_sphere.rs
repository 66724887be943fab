//! Bounding sphere of a triangle set and tangent-plane sampling

use crate::error::{Error, Result};
use crate::plane::Plane;
use crate::point::*;
use crate::triangle::Triangle;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Approximate sphere enclosing a triangle set.
///
/// The center is the average of the triangle centroids and the radius is the
/// largest distance from that center to any triangle vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Point3f,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn from_triangles(triangles: &[Triangle]) -> Result<Self> {
        if triangles.is_empty() {
            return Err(Error::EmptyInput);
        }

        let sum = triangles
            .iter()
            .fold(Vector3f::zeros(), |acc, t| acc + t.centroid().coords);
        let center = Point3f::from(sum / triangles.len() as f32);

        let radius = triangles
            .iter()
            .flat_map(|t| t.vertices())
            .map(|p| (p - center).magnitude())
            .fold(0.0, f32::max);

        Ok(Self { center, radius })
    }

    pub fn diameter(&self) -> f32 {
        2.0 * self.radius
    }

    /// `k` tangent planes whose contact points are evenly spread over the
    /// sphere by Fibonacci sampling.
    pub fn tangent_planes(&self, k: usize) -> Vec<Plane> {
        fibonacci_sphere_points(&self.center, self.radius, k)
            .into_iter()
            .map(|point| {
                let outward = point - self.center;
                let normal = if outward.magnitude() > 0.0 {
                    outward.normalize()
                } else {
                    Vector3f::z()
                };
                Plane::from_normal_and_point(normal, &point)
            })
            .collect()
    }
}

/// `k` points spread over a sphere along the golden-angle spiral
pub fn fibonacci_sphere_points(center: &Point3f, radius: f32, k: usize) -> Vec<Point3f> {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let n = k as f32;

    (0..k)
        .map(|i| {
            let i = i as f32;
            let theta = golden_angle * i;
            let z = (1.0 - 2.0 * i / n) * (1.0 - 1.0 / n);
            let r = (1.0 - z * z).max(0.0).sqrt();
            *center + Vector3f::new(r * theta.cos(), r * theta.sin(), z) * radius
        })
        .collect()
}
