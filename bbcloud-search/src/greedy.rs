//! Greedy plane search over a discretized parameter space
//!
//! Every round takes the densest bin of the grid, refines it down to one
//! plane and removes the triangles that plane carries, until no triangle is
//! left or the densest bin no longer admits any triangle.

use crate::discretization::{Discretization, Refinement};
use crate::group::{refit_within, remove_members, Membership, PlaneGroup, SearchOutcome};
use crate::PlaneSearch;
use bbcloud_core::{BoundingSphere, Error, Result, Triangle};

/// Recommended error-percentage range for the greedy search
pub const GREEDY_EPSILON_RANGE: (f32, f32) = (0.003, 0.025);

/// Offset bins are sized so that `rho_count = RHO_SCALE / epsilon_percentage`
const RHO_SCALE: f32 = 1.5;

/// Greedy bin-discretization plane search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyBinSearch {
    /// Tolerance as a fraction of the bounding-sphere diameter
    pub epsilon_percentage: f32,
    pub theta_bins: usize,
    pub phi_bins: usize,
}

impl Default for GreedyBinSearch {
    fn default() -> Self {
        Self {
            epsilon_percentage: 0.01,
            theta_bins: 20,
            phi_bins: 20,
        }
    }
}

impl GreedyBinSearch {
    pub fn new(epsilon_percentage: f32, theta_bins: usize, phi_bins: usize) -> Result<Self> {
        if !(epsilon_percentage > 0.0 && epsilon_percentage.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "epsilon_percentage must be positive, got {}",
                epsilon_percentage
            )));
        }
        if theta_bins == 0 || phi_bins == 0 {
            return Err(Error::InvalidParameter("Bin counts must be positive".to_string()));
        }
        if epsilon_percentage < GREEDY_EPSILON_RANGE.0 || epsilon_percentage > GREEDY_EPSILON_RANGE.1 {
            log::warn!(
                "epsilon_percentage {} is outside the recommended range {:?}",
                epsilon_percentage,
                GREEDY_EPSILON_RANGE
            );
        }
        Ok(Self {
            epsilon_percentage,
            theta_bins,
            phi_bins,
        })
    }

    /// Number of offset bins used for this tolerance
    pub fn rho_bins(&self) -> usize {
        ((RHO_SCALE / self.epsilon_percentage + 1e-4).floor() as usize).max(1)
    }
}

impl PlaneSearch for GreedyBinSearch {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn search(&self, triangles: &[Triangle], sphere: &BoundingSphere) -> Result<SearchOutcome> {
        if triangles.is_empty() {
            return Err(Error::EmptyInput);
        }

        let epsilon = sphere.diameter() * self.epsilon_percentage;
        let rho_max = triangles
            .iter()
            .map(|t| t.distance)
            .fold(0.0, f32::max)
            .max(epsilon);

        let mut grid = Discretization::new(self.theta_bins, self.phi_bins, self.rho_bins(), rho_max, epsilon)?;
        let mut remaining: Vec<usize> = (0..triangles.len()).collect();
        grid.add_density(triangles, &remaining);

        let mut outcome = SearchOutcome {
            epsilon: Some(epsilon),
            ..Default::default()
        };

        while !remaining.is_empty() {
            let Some(best) = grid.max_density_bin() else {
                break;
            };
            let bin = grid.bin(best).clone();
            let valid = grid.valid_set(&bin, triangles, &remaining);
            if valid.is_empty() {
                log::warn!(
                    "Densest bin admits no triangle, skipping the remaining {}",
                    remaining.len()
                );
                outcome.skipped = remaining.len();
                break;
            }

            let (plane, fitted, membership) = match grid.refine(&bin, triangles, &valid)? {
                Refinement::Accepted(plane) => {
                    let fitted: Vec<usize> = remaining
                        .iter()
                        .copied()
                        .filter(|&i| plane.fits(&triangles[i], epsilon))
                        .collect();
                    (plane, fitted, Membership::Tolerance)
                }
                Refinement::FailSafe(plane, group) => (plane, group, Membership::DirectFit),
            };
            if fitted.is_empty() {
                log::warn!("Refined plane fits no triangle, skipping the remaining {}", remaining.len());
                outcome.skipped = remaining.len();
                break;
            }

            grid.remove_density(triangles, &fitted);
            remove_members(&mut remaining, &fitted, triangles.len());

            let plane = if membership == Membership::Tolerance {
                refit_within(plane, triangles, &fitted, epsilon)
            } else {
                plane
            };
            log::debug!(
                "Plane {} carries {} triangles ({:?}), {} left",
                outcome.groups.len(),
                fitted.len(),
                membership,
                remaining.len()
            );
            outcome.groups.push(PlaneGroup {
                plane,
                members: fitted,
                membership,
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbcloud_core::Point3f;

    fn square_at(z: f32, face: usize) -> Vec<Triangle> {
        let a = Point3f::new(-0.5, -0.5, z);
        let b = Point3f::new(0.5, -0.5, z);
        let c = Point3f::new(0.5, 0.5, z);
        let d = Point3f::new(-0.5, 0.5, z);
        vec![
            Triangle::new(a, b, c, face, [0, 1, 2]).unwrap(),
            Triangle::new(a, c, d, face + 1, [3, 4, 5]).unwrap(),
        ]
    }

    #[test]
    fn test_new_validates() {
        assert!(GreedyBinSearch::new(0.0, 20, 20).is_err());
        assert!(GreedyBinSearch::new(0.01, 0, 20).is_err());
        assert!(GreedyBinSearch::new(f32::NAN, 20, 20).is_err());
        // Out of the recommended range is only advisory
        assert!(GreedyBinSearch::new(0.1, 20, 20).is_ok());
    }

    #[test]
    fn test_rho_bins() {
        assert_eq!(GreedyBinSearch::new(0.02, 20, 20).unwrap().rho_bins(), 75);
        assert_eq!(GreedyBinSearch::new(0.01, 20, 20).unwrap().rho_bins(), 150);
    }

    #[test]
    fn test_single_square_one_plane() {
        let triangles = square_at(0.5, 0);
        let sphere = BoundingSphere::from_triangles(&triangles).unwrap();
        let search = GreedyBinSearch::new(0.02, 20, 20).unwrap();

        let outcome = search.search(&triangles, &sphere).unwrap();
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.plane_count(), 1);
        let group = &outcome.groups[0];
        assert_eq!(group.members.len(), 2);
        assert!(group.plane.normal.z.abs() > 0.999);
    }

    #[test]
    fn test_empty_input() {
        let sphere = BoundingSphere {
            center: Point3f::origin(),
            radius: 1.0,
        };
        let result = GreedyBinSearch::default().search(&[], &sphere);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }
}
