//! Point types and related functionality

use nalgebra::{Point2, Point3, Vector2, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A point in a plane's local 2D frame
pub type Point2f = Point2<f32>;

/// A vector in a plane's local 2D frame
pub type Vector2f = Vector2<f32>;

/// Convert spherical plane-parameter angles into a unit normal.
///
/// `theta` is the azimuth in the XY plane, `phi` the elevation towards +Z.
pub fn spherical_to_normal(theta: f32, phi: f32) -> Vector3f {
    let xy = phi.cos();
    Vector3f::new(xy * theta.cos(), xy * theta.sin(), phi.sin())
}

/// Arithmetic mean of a set of points, `None` for an empty set
pub fn centroid_of(points: &[Point3f]) -> Option<Point3f> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3f::zeros(), |acc, p| acc + p.coords);
    Some(Point3f::from(sum / points.len() as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_spherical_axes() {
        let x = spherical_to_normal(0.0, 0.0);
        assert_relative_eq!(x, Vector3f::x(), epsilon = 1e-6);

        let neg_y = spherical_to_normal(1.5 * PI, 0.0);
        assert_relative_eq!(neg_y, -Vector3f::y(), epsilon = 1e-6);

        let z = spherical_to_normal(0.7, FRAC_PI_2);
        assert_relative_eq!(z, Vector3f::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_centroid_of() {
        assert!(centroid_of(&[]).is_none());
        let c = centroid_of(&[
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(1.0, 3.0, 0.0),
        ])
        .unwrap();
        assert_relative_eq!(c, Point3f::new(1.0, 1.0, 0.0), epsilon = 1e-6);
    }
}
