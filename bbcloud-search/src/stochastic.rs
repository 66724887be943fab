//! Stochastic seed-and-grow plane search
//!
//! Each round draws random seed triangles, jitters their vertices along the
//! seed normal within the tolerance and keeps the candidate plane that
//! gathers the largest orientation-weighted area.

use crate::group::{refit_within, remove_members, Membership, PlaneGroup, SearchOutcome};
use crate::PlaneSearch;
use bbcloud_core::{BoundingSphere, Error, Plane, Result, Triangle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::FRAC_PI_2;

/// Recommended error-percentage range for the stochastic search
pub const STOCHASTIC_EPSILON_RANGE: (f32, f32) = (0.003, 0.025);

/// Recommended trial count per round
pub const STOCHASTIC_ITERATION_RANGE: (usize, usize) = (20, 600);

/// Randomized seed-and-grow plane search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticSearch {
    /// Tolerance as a fraction of the bounding-sphere diameter
    pub epsilon_percentage: f32,
    /// Trials per round
    pub iterations: usize,
    /// Seed for reproducible runs, `None` draws from system entropy
    pub seed: Option<u64>,
}

impl Default for StochasticSearch {
    fn default() -> Self {
        Self {
            epsilon_percentage: 0.01,
            iterations: 100,
            seed: None,
        }
    }
}

/// Best candidate of a round
struct Candidate {
    plane: Plane,
    score: f32,
    members: Vec<usize>,
}

impl StochasticSearch {
    pub fn new(epsilon_percentage: f32, iterations: usize) -> Result<Self> {
        if !(epsilon_percentage > 0.0 && epsilon_percentage.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "epsilon_percentage must be positive, got {}",
                epsilon_percentage
            )));
        }
        if iterations == 0 {
            return Err(Error::InvalidParameter("iterations must be positive".to_string()));
        }
        if epsilon_percentage < STOCHASTIC_EPSILON_RANGE.0 || epsilon_percentage > STOCHASTIC_EPSILON_RANGE.1 {
            log::warn!(
                "epsilon_percentage {} is outside the recommended range {:?}",
                epsilon_percentage,
                STOCHASTIC_EPSILON_RANGE
            );
        }
        if iterations < STOCHASTIC_ITERATION_RANGE.0 || iterations > STOCHASTIC_ITERATION_RANGE.1 {
            log::warn!(
                "iterations {} is outside the recommended range {:?}",
                iterations,
                STOCHASTIC_ITERATION_RANGE
            );
        }
        Ok(Self {
            epsilon_percentage,
            iterations,
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// One trial: a plane through the seed's vertices jittered along its normal
    fn candidate_plane(seed: &Triangle, epsilon: f32, rng: &mut StdRng) -> Option<Plane> {
        let [p0, p1, p2] = seed
            .vertices()
            .map(|p| p + seed.normal * rng.gen_range(-epsilon..=epsilon));

        let mut normal = (p1 - p0).cross(&(p2 - p0));
        if normal.magnitude() < 1e-12 {
            return None;
        }
        if normal.dot(&seed.normal) < 0.0 {
            normal = -normal;
        }
        Some(Plane::from_normal_and_point(normal, &p0))
    }

    /// Members within `epsilon` of the plane and their orientation-weighted area
    fn gather(plane: &Plane, triangles: &[Triangle], remaining: &[usize], epsilon: f32) -> (f32, Vec<usize>) {
        let mut score = 0.0;
        let mut members = Vec::new();
        for &i in remaining {
            let triangle = &triangles[i];
            if !plane.fits(triangle, epsilon) {
                continue;
            }
            let angle = triangle.normal.dot(&plane.normal).abs().min(1.0).acos();
            score += triangle.area() * (FRAC_PI_2 - angle) / FRAC_PI_2;
            members.push(i);
        }
        (score, members)
    }
}

impl PlaneSearch for StochasticSearch {
    fn name(&self) -> &'static str {
        "stochastic"
    }

    fn search(&self, triangles: &[Triangle], sphere: &BoundingSphere) -> Result<SearchOutcome> {
        if triangles.is_empty() {
            return Err(Error::EmptyInput);
        }

        let epsilon = sphere.diameter() * self.epsilon_percentage;
        let mut rng = self.rng();
        let mut remaining: Vec<usize> = (0..triangles.len()).collect();
        let mut outcome = SearchOutcome {
            epsilon: Some(epsilon),
            ..Default::default()
        };

        while !remaining.is_empty() {
            let mut best: Option<Candidate> = None;
            for _ in 0..self.iterations {
                let seed = &triangles[remaining[rng.gen_range(0..remaining.len())]];
                let Some(plane) = Self::candidate_plane(seed, epsilon, &mut rng) else {
                    continue;
                };
                let (score, members) = Self::gather(&plane, triangles, &remaining, epsilon);
                if !members.is_empty() && best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(Candidate { plane, score, members });
                }
            }

            let Some(best) = best else {
                log::warn!(
                    "No candidate plane fits any triangle, skipping the remaining {}",
                    remaining.len()
                );
                outcome.skipped = remaining.len();
                break;
            };

            remove_members(&mut remaining, &best.members, triangles.len());
            let plane = refit_within(best.plane, triangles, &best.members, epsilon);
            log::debug!(
                "Plane {} carries {} triangles (score {:.4}), {} left",
                outcome.groups.len(),
                best.members.len(),
                best.score,
                remaining.len()
            );
            outcome.groups.push(PlaneGroup {
                plane,
                members: best.members,
                membership: Membership::Tolerance,
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bbcloud_core::{Point3f, Vector3f};

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3], face: usize) -> Triangle {
        Triangle::new(a.into(), b.into(), c.into(), face, [3 * face, 3 * face + 1, 3 * face + 2]).unwrap()
    }

    #[test]
    fn test_new_validates() {
        assert!(StochasticSearch::new(0.0, 50).is_err());
        assert!(StochasticSearch::new(0.01, 0).is_err());
        assert!(StochasticSearch::new(0.01, 5).is_ok());
    }

    #[test]
    fn test_candidate_plane_keeps_seed() {
        let seed = tri([0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0], 0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let plane = StochasticSearch::candidate_plane(&seed, 0.05, &mut rng).unwrap();
            assert!(plane.normal.dot(&seed.normal) > 0.0);
            assert!(plane.max_distance(&seed) <= 0.05 + 1e-5);
        }
    }

    #[test]
    fn test_two_parallel_layers() {
        let triangles = vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 0),
            tri([1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], 1),
            tri([0.0, 0.0, 3.0], [1.0, 0.0, 3.0], [0.0, 1.0, 3.0], 2),
            tri([1.0, 0.0, 3.0], [1.0, 1.0, 3.0], [0.0, 1.0, 3.0], 3),
        ];
        let sphere = BoundingSphere::from_triangles(&triangles).unwrap();
        let search = StochasticSearch::new(0.01, 30).unwrap().with_seed(42);

        let outcome = search.search(&triangles, &sphere).unwrap();
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.plane_count(), 2);
        for group in &outcome.groups {
            assert_eq!(group.members.len(), 2);
            assert_relative_eq!(group.plane.normal.dot(&Vector3f::z()).abs(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let triangles = vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 0),
            tri([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], 1),
            tri([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0], 2),
        ];
        let sphere = BoundingSphere::from_triangles(&triangles).unwrap();
        let search = StochasticSearch::new(0.01, 20).unwrap().with_seed(3);

        let a = search.search(&triangles, &sphere).unwrap();
        let b = search.search(&triangles, &sphere).unwrap();
        assert_eq!(a.groups, b.groups);
        assert_eq!(a.assigned_count(), 3);
    }

    #[test]
    fn test_candidate_plane_passes_near_seed_corner() {
        let seed = tri([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0], 0);
        let mut rng = StdRng::seed_from_u64(11);
        let plane = StochasticSearch::candidate_plane(&seed, 1e-3, &mut rng).unwrap();
        assert!(plane.point_distance(&Point3f::new(0.0, 0.0, 1.0)) <= 1e-3 + 1e-6);
    }
}
