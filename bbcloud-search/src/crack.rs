//! Optional crack reduction between neighbouring billboards
//!
//! Each plane also takes the triangles of other groups that lie entirely
//! inside its own envelope, so adjacent billboards overlap along shared
//! seams. Membership stops being a partition once this pass runs.

use crate::group::PlaneGroup;
use bbcloud_core::Triangle;

/// Extended member lists, one per group, in group order.
///
/// The envelope of a group is the largest vertex distance of its own members
/// from its plane. Triangles of other groups whose vertices are all strictly
/// closer than that are appended after the group's own members.
pub fn crack_candidates(groups: &[PlaneGroup], triangles: &[Triangle]) -> Vec<Vec<usize>> {
    let mut owner = vec![None; triangles.len()];
    for (g, group) in groups.iter().enumerate() {
        for &i in &group.members {
            owner[i] = Some(g);
        }
    }

    groups
        .iter()
        .enumerate()
        .map(|(g, group)| {
            let envelope = group
                .members
                .iter()
                .map(|&i| group.plane.max_distance(&triangles[i]))
                .fold(0.0f32, f32::max);

            let mut members = group.members.clone();
            let borrowed = owner
                .iter()
                .enumerate()
                .filter(|(_, o)| matches!(o, Some(other) if *other != g))
                .map(|(i, _)| i)
                .filter(|&i| group.plane.max_distance(&triangles[i]) < envelope);
            members.extend(borrowed);

            if members.len() > group.members.len() {
                log::debug!(
                    "Crack reduction: plane {} takes {} extra triangles",
                    g,
                    members.len() - group.members.len()
                );
            }
            members
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Membership;
    use bbcloud_core::{Plane, Vector3f};

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3], face: usize) -> Triangle {
        Triangle::new(a.into(), b.into(), c.into(), face, [0, 1, 2]).unwrap()
    }

    fn group(normal: Vector3f, distance: f32, members: Vec<usize>) -> PlaneGroup {
        PlaneGroup {
            plane: Plane::new(normal, distance),
            members,
            membership: Membership::Tolerance,
        }
    }

    #[test]
    fn test_envelope_borrows_nearby_triangles() {
        let triangles = vec![
            // Thick slab around z = 1
            tri([0.0, 0.0, 0.8], [1.0, 0.0, 1.0], [0.0, 1.0, 1.2], 0),
            // Thin sliver at z = 1.1, owned by the second group
            tri([0.0, 0.0, 1.1], [0.2, 0.0, 1.1], [0.0, 0.2, 1.1], 1),
            // Far away, never borrowed
            tri([0.0, 0.0, 3.0], [1.0, 0.0, 3.0], [0.0, 1.0, 3.0], 2),
        ];
        let groups = vec![
            group(Vector3f::z(), 1.0, vec![0]),
            group(Vector3f::z(), 1.1, vec![1]),
            group(Vector3f::z(), 3.0, vec![2]),
        ];

        let extended = crack_candidates(&groups, &triangles);
        assert_eq!(extended.len(), 3);
        assert_eq!(extended[0], vec![0, 1]);
        // Zero envelope borrows nothing
        assert_eq!(extended[1], vec![1]);
        assert_eq!(extended[2], vec![2]);
    }

    #[test]
    fn test_no_groups() {
        assert!(crack_candidates(&[], &[]).is_empty());
    }
}
