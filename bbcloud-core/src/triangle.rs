//! Triangles decomposed from an indexed mesh

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Cross-product magnitude below which a face is treated as degenerate
const DEGENERATE_CROSS: f32 = 1e-12;

/// A mesh triangle with cached metrics.
///
/// The normal is oriented so that `dot(p0, normal) >= 0`, which makes
/// `distance` (the offset of the triangle's supporting plane from the origin)
/// non-negative by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p0: Point3f,
    pub p1: Point3f,
    pub p2: Point3f,
    pub normal: Vector3f,
    /// Offset of the supporting plane from the origin along `normal`
    pub distance: f32,
    /// Face id in the source mesh
    pub face: usize,
    /// Positions of the three corners in the source mesh's flat index buffer
    pub indices: [usize; 3],
    area: f32,
    centroid: Point3f,
}

impl Triangle {
    /// Build a triangle, returning `None` when the corners are collinear.
    pub fn new(p0: Point3f, p1: Point3f, p2: Point3f, face: usize, indices: [usize; 3]) -> Option<Self> {
        let cross = (p1 - p0).cross(&(p2 - p0));
        if cross.magnitude() < DEGENERATE_CROSS {
            return None;
        }

        let mut normal = cross.normalize();
        if p0.coords.dot(&normal) < 0.0 {
            normal = -normal;
        }
        let distance = p0.coords.dot(&normal).abs();

        Some(Self {
            p0,
            p1,
            p2,
            normal,
            distance,
            face,
            indices,
            area: heron_area(&p0, &p1, &p2),
            centroid: Point3f::from((p0.coords + p1.coords + p2.coords) / 3.0),
        })
    }

    /// Area by Heron's formula
    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn centroid(&self) -> Point3f {
        self.centroid
    }

    /// The three corners in winding order
    pub fn vertices(&self) -> [Point3f; 3] {
        [self.p0, self.p1, self.p2]
    }
}

fn heron_area(p0: &Point3f, p1: &Point3f, p2: &Point3f) -> f32 {
    let a = (p0 - p1).magnitude();
    let b = (p2 - p1).magnitude();
    let c = (p0 - p2).magnitude();
    let s = (a + b + c) / 2.0;
    // Rounding can push the product slightly negative for slivers
    (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt()
}
