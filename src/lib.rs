//! # bbcloud
//!
//! Billboard cloud generation for mesh level-of-detail rendering.
//!
//! This is the umbrella crate that provides convenient access to all bbcloud
//! functionality. Use the individual crates for more granular control over
//! dependencies.
//!
//! ## Features
//!
//! - **Core**: geometric primitives (Triangle, Plane, Rectangle, BoundingSphere, mesh input)
//! - **Search**: plane-search strategies, rotating calipers, billboard clouds
//!
//! ## Quick Start
//!
//! ```rust
//! use bbcloud::prelude::*;
//!
//! let mesh = TriangleMesh::from_flat(
//!     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
//!     &[0, 1, 2, 0, 2, 3],
//! )?;
//!
//! let config = EngineConfig {
//!     algorithm: Algorithm::KMeans { clusters: 1, max_iterations: 20 },
//!     ..EngineConfig::default()
//! };
//! let cloud = PlaneSearchEngine::new(config)?.run(&mesh)?;
//! assert_eq!(cloud.plane_count(), 1);
//! # Ok::<(), bbcloud::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables search
//! - `search`: Plane search and billboard cloud generation

// Re-export core functionality
pub use bbcloud_core::*;

#[cfg(feature = "search")]
pub use bbcloud_search as search;

/// Convenient imports for common use cases
pub mod prelude {
    pub use bbcloud_core::*;

    #[cfg(feature = "search")]
    pub use bbcloud_search::*;
}
