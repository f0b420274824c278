//! Orbit representations: the central attractor, classical elements, and the `Orbit` value object.

pub mod anomaly;
pub mod attractor;
pub mod elements;
pub mod orbit;

pub use attractor::Attractor;
pub use elements::{
    ClassicalElements, OrbitGeometry, OrbitKind, to_classical, to_vectors, to_vectors_with_p,
};
pub use orbit::Orbit;

/// Eccentricity and inclination tolerance used to classify degenerate geometries.
pub const GEOMETRY_TOL: f64 = 1e-8;
