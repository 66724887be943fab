//! Discretized plane-parameter space
//!
//! The grid is a flat arena of [`Bin`]s addressed by integer
//! `(theta, phi, rho)` coordinates. Triangles vote into the bins whose
//! planes could carry them; the densest bin is then refined recursively
//! through its neighborhood until a single plane remains.

use crate::bin::{Bin, Interval};
use bbcloud_core::{best_fit_plane_of, Error, Plane, Result, Triangle};
use std::f32::consts::{FRAC_PI_2, PI};

/// Scale of the density subtracted just below a triangle's admissible offsets
pub const PENALTY_WEIGHT: f32 = 10.0;

/// Deepest bin subdivision tried before falling back to a direct fit
pub const MAX_REFINE_DEPTH: usize = 24;

const ANGLE_TOLERANCE: f32 = 1e-5;

/// Outcome of refining a bin down to one plane
#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    /// A plane found by the search; membership is decided by the tolerance
    Accepted(Plane),
    /// The search could not isolate a plane. The plane is the least-squares
    /// fit of the valid set, and the whole valid set belongs to it.
    FailSafe(Plane, Vec<usize>),
}

/// Density of a sub-bin during refinement
#[derive(Debug, Clone)]
struct SubBinScore {
    density: f32,
    /// Mean distance between the bin's offset and the middle of its
    /// members' admissible offsets
    offset: f32,
    members: Vec<usize>,
}

impl SubBinScore {
    /// Higher density wins; equal densities go to the better centered bin
    fn beats(&self, other: &SubBinScore) -> bool {
        self.density > other.density || (self.density == other.density && self.offset < other.offset)
    }
}

/// A regular grid of bins over `theta in [0, 2pi]`, `phi in [-pi/2, pi/2]`
/// and `rho in [0, rho_max]`.
#[derive(Debug, Clone)]
pub struct Discretization {
    theta_count: usize,
    phi_count: usize,
    rho_count: usize,
    rho_max: f32,
    epsilon: f32,
    bins: Vec<Bin>,
}

impl Discretization {
    pub fn new(
        theta_count: usize,
        phi_count: usize,
        rho_count: usize,
        rho_max: f32,
        epsilon: f32,
    ) -> Result<Self> {
        if theta_count == 0 || phi_count == 0 || rho_count == 0 {
            return Err(Error::InvalidParameter(
                "Discretization needs at least one bin along every axis".to_string(),
            ));
        }
        if !(rho_max > 0.0 && rho_max.is_finite()) {
            return Err(Error::InvalidParameter(format!("rho_max must be positive, got {}", rho_max)));
        }
        if !(epsilon > 0.0 && epsilon.is_finite()) {
            return Err(Error::InvalidParameter(format!("epsilon must be positive, got {}", epsilon)));
        }

        let theta_step = 2.0 * PI / theta_count as f32;
        let phi_step = PI / phi_count as f32;
        let rho_step = rho_max / rho_count as f32;

        let mut bins = Vec::with_capacity(theta_count * phi_count * rho_count);
        for r in 0..rho_count {
            let rho = Interval::new(r as f32 * rho_step, (r + 1) as f32 * rho_step);
            for p in 0..phi_count {
                let phi = Interval::new(-FRAC_PI_2 + p as f32 * phi_step, -FRAC_PI_2 + (p + 1) as f32 * phi_step);
                for t in 0..theta_count {
                    let theta = Interval::new(t as f32 * theta_step, (t + 1) as f32 * theta_step);
                    bins.push(Bin::new(theta, phi, rho));
                }
            }
        }

        Ok(Self {
            theta_count,
            phi_count,
            rho_count,
            rho_max,
            epsilon,
            bins,
        })
    }

    /// Flat index of the bin at `(theta, phi, rho)` grid coordinates
    pub fn index(&self, t: usize, p: usize, r: usize) -> usize {
        (r * self.phi_count + p) * self.theta_count + t
    }

    /// Grid coordinates `(theta, phi, rho)` of a flat index
    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let t = index % self.theta_count;
        let p = (index / self.theta_count) % self.phi_count;
        let r = index / (self.theta_count * self.phi_count);
        (t, p, r)
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn bin(&self, index: usize) -> &Bin {
        &self.bins[index]
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn rho_max(&self) -> f32 {
        self.rho_max
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.theta_count, self.phi_count, self.rho_count)
    }

    fn rho_step(&self) -> f32 {
        self.rho_max / self.rho_count as f32
    }

    fn rho_index(&self, rho: f32) -> usize {
        ((rho / self.rho_step()).floor().max(0.0) as usize).min(self.rho_count - 1)
    }

    /// Add the density contribution of the given triangles
    pub fn add_density(&mut self, triangles: &[Triangle], ids: &[usize]) {
        self.accumulate(triangles, ids, 1.0);
    }

    /// Remove a contribution previously added with [`Self::add_density`]
    pub fn remove_density(&mut self, triangles: &[Triangle], ids: &[usize]) {
        self.accumulate(triangles, ids, -1.0);
    }

    fn accumulate(&mut self, triangles: &[Triangle], ids: &[usize], sign: f32) {
        let step = self.rho_step();
        for &id in ids {
            let triangle = &triangles[id];
            for p in 0..self.phi_count {
                for t in 0..self.theta_count {
                    let cell = &self.bins[self.index(t, p, 0)];
                    let weight = cell.weight(triangle);
                    if weight <= 0.0 {
                        continue;
                    }
                    let Some(range) = cell.rho_interval(triangle, self.epsilon, self.rho_max) else {
                        continue;
                    };

                    let r_lo = self.rho_index(range.min);
                    let r_hi = self.rho_index(range.max);
                    if r_lo == r_hi {
                        let i = self.index(t, p, r_lo);
                        self.bins[i].density += sign * weight;
                    } else {
                        // Partially covered end bins are pro-rated
                        let lo_fraction = (((r_lo + 1) as f32 * step - range.min) / step).clamp(0.0, 1.0);
                        let hi_fraction = ((range.max - r_hi as f32 * step) / step).clamp(0.0, 1.0);
                        let i = self.index(t, p, r_lo);
                        self.bins[i].density += sign * weight * lo_fraction;
                        let i = self.index(t, p, r_hi);
                        self.bins[i].density += sign * weight * hi_fraction;
                        for r in r_lo + 1..r_hi {
                            let i = self.index(t, p, r);
                            self.bins[i].density += sign * weight;
                        }
                    }

                    // Bins below the lower-end bin only; that bin keeps its share
                    let below = range.min - self.epsilon;
                    if below > 0.0 {
                        for r in self.rho_index(below)..r_lo {
                            let i = self.index(t, p, r);
                            self.bins[i].density -= sign * weight * PENALTY_WEIGHT;
                        }
                    }
                }
            }
        }
    }

    /// Index of the bin with the highest density (the first one on ties)
    pub fn max_density_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, bin) in self.bins.iter().enumerate() {
            if best.map_or(true, |(_, d)| bin.density > d) {
                best = Some((i, bin.density));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Candidates whose admissible offsets over the bin's normal range
    /// overlap the bin's own offset range
    pub fn valid_set(&self, bin: &Bin, triangles: &[Triangle], candidates: &[usize]) -> Vec<usize> {
        candidates
            .iter()
            .copied()
            .filter(|&i| {
                bin.rho_interval(&triangles[i], self.epsilon, self.rho_max)
                    .is_some_and(|range| range.overlaps(&bin.rho))
            })
            .collect()
    }

    /// Refine `bin` down to a single plane for its non-empty valid set
    pub fn refine(&self, bin: &Bin, triangles: &[Triangle], valid: &[usize]) -> Result<Refinement> {
        if valid.is_empty() {
            return Err(Error::InvalidData("Cannot refine a bin with an empty valid set".to_string()));
        }
        let refinement = self.refine_at(bin, triangles, valid, 0)?;
        match refinement {
            Refinement::Accepted(plane) if self.fits_all(&plane, triangles, valid) => Ok(refinement),
            _ => self.reanchor(refinement, triangles, valid),
        }
    }

    /// Grid bin holding `plane`
    pub fn locate(&self, plane: &Plane) -> usize {
        let n = plane.normal;
        let theta = n.y.atan2(n.x).rem_euclid(2.0 * PI);
        let phi = n.z.clamp(-1.0, 1.0).asin();
        let t = ((theta / (2.0 * PI / self.theta_count as f32)).floor().max(0.0) as usize).min(self.theta_count - 1);
        let p = (((phi + FRAC_PI_2) / (PI / self.phi_count as f32)).floor().max(0.0) as usize).min(self.phi_count - 1);
        self.index(t, p, self.rho_index(plane.distance))
    }

    /// Second attempt for a refinement that left part of the valid set
    /// uncovered.
    ///
    /// The anchor is the own plane of the valid triangle that carries the
    /// most valid area. Refinement restarts from the grid bin holding that
    /// plane, and the anchor itself is kept when the restarted search does
    /// not cover as much area. The first result survives only when it beats
    /// both.
    fn reanchor(&self, first: Refinement, triangles: &[Triangle], valid: &[usize]) -> Result<Refinement> {
        let Some((anchor, anchor_area)) = self.anchor(triangles, valid) else {
            if matches!(first, Refinement::FailSafe(..)) {
                log::warn!("No triangle fits its own plane, falling back to a direct fit");
            }
            return Ok(first);
        };
        if let Refinement::Accepted(plane) = &first {
            if self.fitted_area(plane, triangles, valid) >= anchor_area {
                return Ok(first);
            }
        }

        let bin = self.bin(self.locate(&anchor)).clone();
        let members = self.valid_set(&bin, triangles, valid);
        if !members.is_empty() {
            if let Refinement::Accepted(plane) = self.refine_at(&bin, triangles, &members, 0)? {
                if self.fitted_area(&plane, triangles, valid) >= anchor_area {
                    log::debug!("Refinement restarted from the anchor bin");
                    return Ok(Refinement::Accepted(plane));
                }
            }
        }
        log::debug!("Keeping the anchor plane, carrying area {:.5}", anchor_area);
        Ok(Refinement::Accepted(anchor))
    }

    /// Own plane of the valid triangle carrying the most valid area
    fn anchor(&self, triangles: &[Triangle], valid: &[usize]) -> Option<(Plane, f32)> {
        let mut best: Option<(Plane, f32)> = None;
        for &i in valid {
            let plane = Plane::new(triangles[i].normal, triangles[i].distance);
            let area = self.fitted_area(&plane, triangles, valid);
            if area > 0.0 && best.map_or(true, |(_, a)| area > a) {
                best = Some((plane, area));
            }
        }
        best
    }

    fn fitted_area(&self, plane: &Plane, triangles: &[Triangle], ids: &[usize]) -> f32 {
        ids.iter()
            .map(|&i| &triangles[i])
            .filter(|t| plane.fits(t, self.epsilon))
            .map(Triangle::area)
            .sum()
    }

    fn fits_all(&self, plane: &Plane, triangles: &[Triangle], ids: &[usize]) -> bool {
        ids.iter().all(|&i| plane.fits(&triangles[i], self.epsilon))
    }

    fn refine_at(&self, bin: &Bin, triangles: &[Triangle], valid: &[usize], depth: usize) -> Result<Refinement> {
        let plane = bin.center_plane();
        let center_valid = valid
            .iter()
            .filter(|&&i| plane.fits(&triangles[i], self.epsilon))
            .count();
        if center_valid == valid.len() {
            return Ok(Refinement::Accepted(plane));
        }
        if depth >= MAX_REFINE_DEPTH {
            log::debug!("Bin refinement reached depth {}", depth);
            return self.fail_safe(triangles, valid);
        }

        let mut best: Option<(SubBinScore, Bin)> = None;
        for neighbor in self.neighbors(bin) {
            for sub in neighbor.subdivide() {
                let score = self.score(&sub, triangles, valid);
                if best.as_ref().map_or(true, |(b, _)| score.beats(b)) {
                    best = Some((score, sub));
                }
            }
        }

        match best {
            Some((score, sub)) if !score.members.is_empty() => {
                self.refine_at(&sub, triangles, &score.members, depth + 1)
            }
            _ if center_valid > 0 => Ok(Refinement::Accepted(plane)),
            _ => {
                log::debug!("No sub-bin keeps any of {} triangles", valid.len());
                self.fail_safe(triangles, valid)
            }
        }
    }

    fn fail_safe(&self, triangles: &[Triangle], valid: &[usize]) -> Result<Refinement> {
        let plane = best_fit_plane_of(valid.iter().map(|&i| &triangles[i]))?;
        Ok(Refinement::FailSafe(plane, valid.to_vec()))
    }

    /// Density of a candidate sub-bin over `valid`, and the members it keeps
    fn score(&self, bin: &Bin, triangles: &[Triangle], valid: &[usize]) -> SubBinScore {
        let mut density = 0.0;
        let mut offset = 0.0;
        let mut members = Vec::new();
        for &i in valid {
            let triangle = &triangles[i];
            let Some(range) = bin.rho_interval(triangle, self.epsilon, self.rho_max) else {
                continue;
            };
            if !range.overlaps(&bin.rho) {
                continue;
            }
            let fraction = if range.contains(&bin.rho) || bin.rho.contains(&range) || bin.rho.width() <= 0.0 {
                1.0
            } else {
                (range.overlap(&bin.rho) / bin.rho.width()).clamp(0.0, 1.0)
            };
            density += bin.weight(triangle) * fraction;
            offset += (bin.rho.center() - range.center()).abs();
            members.push(i);
        }
        if !members.is_empty() {
            offset /= members.len() as f32;
        }
        SubBinScore { density, offset, members }
    }

    /// The bin itself and its 26 same-size neighbors.
    ///
    /// Neighbors past a pole are reflected back over it and turned half way
    /// around in theta; theta wraps at `2pi`. Neighbors outside
    /// `[0, rho_max]` are dropped.
    pub fn neighbors(&self, bin: &Bin) -> Vec<Bin> {
        let theta_width = bin.theta.width();
        let phi_width = bin.phi.width();
        let rho_width = bin.rho.width();
        let rho_tolerance = 1e-6 * self.rho_max;

        let mut neighbors = Vec::with_capacity(27);
        for dr in -1i32..=1 {
            let rho = bin.rho.shifted(dr as f32 * rho_width);
            if rho.min < -rho_tolerance || rho.max > self.rho_max + rho_tolerance {
                continue;
            }
            for dp in -1i32..=1 {
                for dt in -1i32..=1 {
                    let mut theta = bin.theta.shifted(dt as f32 * theta_width);
                    let mut phi = bin.phi.shifted(dp as f32 * phi_width);
                    if phi.max > FRAC_PI_2 + ANGLE_TOLERANCE {
                        phi = Interval::new(PI - phi.max, PI - phi.min);
                        theta = theta.shifted(PI);
                    } else if phi.min < -FRAC_PI_2 - ANGLE_TOLERANCE {
                        phi = Interval::new(-PI - phi.max, -PI - phi.min);
                        theta = theta.shifted(PI);
                    }
                    neighbors.push(Bin::new(wrap_theta(theta), phi, rho));
                }
            }
        }
        neighbors
    }
}

/// Shift a theta range so that its start lies in `[0, 2pi)`
fn wrap_theta(theta: Interval) -> Interval {
    let start = theta.min.rem_euclid(2.0 * PI);
    theta.shifted(start - theta.min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bbcloud_core::{Point3f, Vector3f};

    // ============================================================
    // Helper Functions
    // ============================================================

    /// Two triangles of the square `[-0.5, 0.5]^2` at height `z`
    fn square_at(z: f32) -> Vec<Triangle> {
        let a = Point3f::new(-0.5, -0.5, z);
        let b = Point3f::new(0.5, -0.5, z);
        let c = Point3f::new(0.5, 0.5, z);
        let d = Point3f::new(-0.5, 0.5, z);
        vec![
            Triangle::new(a, b, c, 0, [0, 1, 2]).unwrap(),
            Triangle::new(a, c, d, 1, [3, 4, 5]).unwrap(),
        ]
    }

    /// Two triangles of a unit square parallel to the xy-plane around `center`
    fn square_around(center: [f32; 3]) -> Vec<Triangle> {
        let [x, y, z] = center;
        let a = Point3f::new(x - 0.5, y - 0.5, z);
        let b = Point3f::new(x + 0.5, y - 0.5, z);
        let c = Point3f::new(x + 0.5, y + 0.5, z);
        let d = Point3f::new(x - 0.5, y + 0.5, z);
        vec![
            Triangle::new(a, b, c, 0, [0, 1, 2]).unwrap(),
            Triangle::new(a, c, d, 1, [3, 4, 5]).unwrap(),
        ]
    }

    fn grid() -> Discretization {
        Discretization::new(20, 20, 75, 0.5, 0.0346).unwrap()
    }

    // ============================================================
    // Tests
    // ============================================================

    #[test]
    fn test_rejects_invalid_dimensions() {
        assert!(Discretization::new(0, 20, 10, 1.0, 0.1).is_err());
        assert!(Discretization::new(20, 20, 10, 0.0, 0.1).is_err());
        assert!(Discretization::new(20, 20, 10, 1.0, -0.1).is_err());
    }

    #[test]
    fn test_index_coords_roundtrip() {
        let d = Discretization::new(6, 4, 3, 1.0, 0.1).unwrap();
        assert_eq!(d.len(), 72);
        for i in [0, 5, 6, 23, 24, 71] {
            let (t, p, r) = d.coords(i);
            assert_eq!(d.index(t, p, r), i);
        }
        let bin = d.bin(d.index(2, 3, 1));
        assert_relative_eq!(bin.theta.min, 2.0 * 2.0 * PI / 6.0, epsilon = 1e-5);
        assert_relative_eq!(bin.phi.max, FRAC_PI_2, epsilon = 1e-5);
        assert_relative_eq!(bin.rho.min, 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_density_add_remove_balances() {
        let triangles = square_at(0.5);
        let mut d = grid();
        d.add_density(&triangles, &[0, 1]);
        assert!(d.bins().iter().any(|b| b.density > 0.0));

        d.remove_density(&triangles, &[0, 1]);
        for bin in d.bins() {
            assert!(bin.density.abs() < 1e-4);
        }
    }

    #[test]
    fn test_densest_bin_matches_plane() {
        let triangles = square_at(0.5);
        let mut d = grid();
        d.add_density(&triangles, &[0, 1]);

        let best = d.bin(d.max_density_bin().unwrap());
        assert!(best.normal().z > 0.99);
        assert!(best.rho.max > 0.5 - 0.0346 * 2.0);
        assert_eq!(d.valid_set(best, &triangles, &[0, 1]), vec![0, 1]);
    }

    #[test]
    fn test_refine_finds_fitting_plane() {
        let triangles = square_at(0.5);
        let mut d = grid();
        d.add_density(&triangles, &[0, 1]);
        let best = d.bin(d.max_density_bin().unwrap()).clone();

        match d.refine(&best, &triangles, &[0, 1]).unwrap() {
            Refinement::Accepted(plane) => {
                assert!(plane.fits(&triangles[0], d.epsilon()));
                assert!(plane.fits(&triangles[1], d.epsilon()));
            }
            Refinement::FailSafe(plane, members) => {
                assert_eq!(members, vec![0, 1]);
                assert_relative_eq!(plane.normal.z.abs(), 1.0, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_refine_far_from_origin() {
        // Offsets spread over many rho bins across one angular cell
        let triangles = square_around([50.0, -30.0, 20.0]);
        let mut d = Discretization::new(20, 20, 500, 25.0, 0.005).unwrap();
        d.add_density(&triangles, &[0, 1]);
        let best = d.bin(d.max_density_bin().unwrap()).clone();
        let valid = d.valid_set(&best, &triangles, &[0, 1]);
        assert_eq!(valid, vec![0, 1]);

        match d.refine(&best, &triangles, &valid).unwrap() {
            Refinement::Accepted(plane) => {
                assert!(plane.fits(&triangles[0], d.epsilon()));
                assert!(plane.fits(&triangles[1], d.epsilon()));
                assert_relative_eq!(plane.normal.z.abs(), 1.0, epsilon = 1e-3);
            }
            other => panic!("expected an accepted plane, got {:?}", other),
        }
    }

    #[test]
    fn test_refine_prefers_level_with_most_area() {
        // Two parallel levels far from the origin share one angular cell
        let mut triangles = square_around([40.0, 10.0, 12.0]);
        triangles.extend(square_around([40.0, 10.0, 15.0]));
        triangles.push(
            Triangle::new(
                Point3f::new(38.0, 8.0, 15.0),
                Point3f::new(42.0, 8.0, 15.0),
                Point3f::new(40.0, 12.0, 15.0),
                4,
                [12, 13, 14],
            )
            .unwrap(),
        );
        let all: Vec<usize> = (0..triangles.len()).collect();

        let mut d = Discretization::new(20, 20, 500, 20.0, 0.005).unwrap();
        d.add_density(&triangles, &all);
        let best = d.bin(d.max_density_bin().unwrap()).clone();
        let valid = d.valid_set(&best, &triangles, &all);
        assert!(valid.contains(&4));

        let Refinement::Accepted(plane) = d.refine(&best, &triangles, &valid).unwrap() else {
            panic!("expected an accepted plane");
        };
        for &i in &valid {
            let on_top = (triangles[i].p0.z - 15.0).abs() < 1e-3;
            assert_eq!(plane.fits(&triangles[i], d.epsilon()), on_top, "triangle {}", i);
        }
    }

    #[test]
    fn test_locate_plane() {
        let d = grid();
        let (t, p, r) = d.coords(d.locate(&Plane::new(Vector3f::z(), 0.25)));
        assert_eq!((t, p), (0, 19));
        assert!(d.bin(d.index(t, p, r)).rho.min <= 0.25 && d.bin(d.index(t, p, r)).rho.max > 0.25);

        let normal = bbcloud_core::spherical_to_normal(1.0, 0.3);
        let bin = d.bin(d.locate(&Plane::new(normal, 0.1)));
        assert!(bin.theta.min <= 1.0 && bin.theta.max > 1.0);
        assert!(bin.phi.min <= 0.3 && bin.phi.max > 0.3);
        assert!(bin.rho.min <= 0.1 && bin.rho.max > 0.1);
    }

    #[test]
    fn test_penalty_stops_below_lower_end_bin() {
        let triangles = square_at(0.3);
        let mut d = grid();
        d.add_density(&triangles, &[0]);

        let (t, p, _) = d.coords(d.locate(&Plane::new(Vector3f::z(), 0.3)));
        let range = d
            .bin(d.index(t, p, 0))
            .rho_interval(&triangles[0], d.epsilon(), d.rho_max())
            .unwrap();
        let step = d.rho_max() / d.dimensions().2 as f32;
        let below = range.min - d.epsilon();
        assert!(below > 0.0);
        let r_lo = (range.min / step).floor() as usize;
        let r_below = (below / step).floor() as usize;
        assert!(r_below < r_lo);

        // The bin holding the lower end keeps its share of the vote
        assert!(d.bin(d.index(t, p, r_lo)).density > 0.0);
        for r in r_below..r_lo {
            let density = d.bin(d.index(t, p, r)).density;
            assert!(density < 0.0, "bin {} has density {}", r, density);
        }
        assert_eq!(d.bin(d.index(t, p, r_below.saturating_sub(1))).density, 0.0);
    }

    #[test]
    fn test_refine_rejects_empty_valid_set() {
        let d = grid();
        assert!(d.refine(d.bin(0), &square_at(0.5), &[]).is_err());
    }

    #[test]
    fn test_neighbors_interior() {
        let d = grid();
        let bin = d.bin(d.index(5, 10, 30));
        let neighbors = d.neighbors(bin);
        assert_eq!(neighbors.len(), 27);
        assert!(neighbors.contains(bin));
    }

    #[test]
    fn test_neighbors_drop_outside_rho_range() {
        let d = grid();
        assert_eq!(d.neighbors(d.bin(d.index(5, 10, 0))).len(), 18);
        assert_eq!(d.neighbors(d.bin(d.index(5, 10, 74))).len(), 18);
    }

    #[test]
    fn test_neighbors_wrap_at_pole_and_seam() {
        let d = grid();
        let bin = d.bin(d.index(0, 19, 30));
        for n in d.neighbors(bin) {
            assert!(n.phi.min >= -FRAC_PI_2 - 1e-4 && n.phi.max <= FRAC_PI_2 + 1e-4);
            assert!(n.theta.min >= 0.0 && n.theta.min < 2.0 * PI);
            assert_relative_eq!(n.theta.width(), bin.theta.width(), epsilon = 1e-4);
        }
    }
}
