//! Core data structures for billboard cloud generation
//!
//! This crate provides the geometric primitives shared by every plane-search
//! strategy: triangles decomposed from an indexed mesh, implicit planes,
//! billboard rectangles, the bounding sphere of a triangle set and the
//! SVD best-fit plane of a point set.

pub mod point;
pub mod mesh;
pub mod triangle;
pub mod plane;
pub mod rectangle;
pub mod bounding_sphere;
pub mod fit;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use triangle::*;
pub use plane::*;
pub use rectangle::*;
pub use bounding_sphere::*;
pub use fit::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector2, Vector3, Matrix3, Matrix4};
