//! Cells of the spherical plane-parameter space
//!
//! A plane is parameterized by the azimuth `theta` and elevation `phi` of
//! its unit normal and its offset `rho` from the origin. A [`Bin`] is an
//! axis-aligned box in `(theta, phi, rho)`.

use bbcloud_core::{spherical_to_normal, Plane, Triangle, Vector3f};
use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    pub fn shifted(&self, offset: f32) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.min <= other.max && self.max >= other.min
    }

    /// Whether `other` lies entirely inside this interval
    pub fn contains(&self, other: &Interval) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    /// Length of the intersection, zero when disjoint
    pub fn overlap(&self, other: &Interval) -> f32 {
        (self.max.min(other.max) - self.min.max(other.min)).max(0.0)
    }

    /// Split into two halves
    pub fn halves(&self) -> [Interval; 2] {
        let c = self.center();
        [Interval::new(self.min, c), Interval::new(c, self.max)]
    }
}

/// A cell in `(theta, phi, rho)` space with an accumulated density score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub theta: Interval,
    pub phi: Interval,
    pub rho: Interval,
    pub density: f32,
    normal: Vector3f,
}

impl Bin {
    pub fn new(theta: Interval, phi: Interval, rho: Interval) -> Self {
        Self {
            theta,
            phi,
            rho,
            density: 0.0,
            normal: spherical_to_normal(theta.center(), phi.center()),
        }
    }

    /// Unit normal at the angular center of the bin
    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    /// `(theta, phi, rho)` at the center of the bin
    pub fn center(&self) -> (f32, f32, f32) {
        (self.theta.center(), self.phi.center(), self.rho.center())
    }

    /// The plane through the exact center of the bin
    pub fn center_plane(&self) -> Plane {
        Plane::new(self.normal, self.rho.center())
    }

    /// Normals at the four angular corners of the bin
    pub fn corner_normals(&self) -> [Vector3f; 4] {
        [
            spherical_to_normal(self.theta.min, self.phi.min),
            spherical_to_normal(self.theta.min, self.phi.max),
            spherical_to_normal(self.theta.max, self.phi.min),
            spherical_to_normal(self.theta.max, self.phi.max),
        ]
    }

    /// Offsets for which some plane with a normal inside this bin keeps every
    /// vertex of the triangle within `epsilon`, clamped to `[0, rho_max]`.
    ///
    /// The normal range is sampled at the bin corners. `None` when no
    /// non-negative offset qualifies.
    pub fn rho_interval(&self, triangle: &Triangle, epsilon: f32, rho_max: f32) -> Option<Interval> {
        let corners = self.corner_normals();
        let mut lo = f32::NEG_INFINITY;
        let mut hi = f32::INFINITY;
        for v in triangle.vertices() {
            let dots = corners.map(|n| v.coords.dot(&n));
            let min = dots.iter().copied().fold(f32::INFINITY, f32::min);
            let max = dots.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            lo = lo.max(min);
            hi = hi.min(max);
        }

        let lo = (lo - epsilon).clamp(0.0, rho_max);
        let hi = hi + epsilon;
        if hi < 0.0 {
            return None;
        }
        let hi = hi.min(rho_max);
        if lo > hi {
            return None;
        }
        Some(Interval::new(lo, hi))
    }

    /// Contribution weight of a triangle: its area scaled by how well its
    /// normal agrees with the bin's center normal.
    pub fn weight(&self, triangle: &Triangle) -> f32 {
        triangle.area() * triangle.normal.dot(&self.normal).abs()
    }

    /// The eight half-size children of this bin
    pub fn subdivide(&self) -> Vec<Bin> {
        let mut children = Vec::with_capacity(8);
        for rho in self.rho.halves() {
            for phi in self.phi.halves() {
                for theta in self.theta.halves() {
                    children.push(Bin::new(theta, phi, rho));
                }
            }
        }
        children
    }
}
