//! Plane groups produced by the search strategies

use bbcloud_core::{best_fit_plane_of, Plane, Triangle};
use serde::{Deserialize, Serialize};

/// How the members of a group were decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Membership {
    /// Every member lies within the search tolerance of the plane
    Tolerance,
    /// Members were taken as a whole from a fail-safe fit; their distance to
    /// the plane is not bounded by the tolerance
    DirectFit,
    /// Members were assigned to their nearest cluster plane
    Nearest,
}

/// One discovered plane and the triangles assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGroup {
    pub plane: Plane,
    /// Positions in the searched triangle slice
    pub members: Vec<usize>,
    pub membership: Membership,
}

/// Result of one plane-search run
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub groups: Vec<PlaneGroup>,
    /// Triangles left without a plane
    pub skipped: usize,
    /// Absolute tolerance the run used, if it works with one
    pub epsilon: Option<f32>,
}

impl SearchOutcome {
    pub fn plane_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of triangles placed in some group
    pub fn assigned_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Swap `plane` for the least-squares plane of the members when that plane
/// still keeps every member within `epsilon`.
pub(crate) fn refit_within(plane: Plane, triangles: &[Triangle], members: &[usize], epsilon: f32) -> Plane {
    match best_fit_plane_of(members.iter().map(|&i| &triangles[i])) {
        Ok(fitted) if members.iter().all(|&i| fitted.fits(&triangles[i], epsilon)) => fitted,
        Ok(_) => plane,
        Err(e) => {
            log::debug!("Keeping search plane, refit failed: {}", e);
            plane
        }
    }
}

/// Remove `taken` from the working set, keeping the order of the rest
pub(crate) fn remove_members(working: &mut Vec<usize>, taken: &[usize], total: usize) {
    let mut mask = vec![false; total];
    for &i in taken {
        mask[i] = true;
    }
    working.retain(|&i| !mask[i]);
}
