//! Two-body and perturbed orbital mechanics.
//!
//! Each concern lives in its own workspace crate; this facade re-exports
//! them under short names and adds [`catalog`], which turns configuration
//! records into the runtime types the solvers take.

pub mod catalog;

pub use astro_config as config;
pub use astro_core as core;
pub use astro_export as export;
pub use astro_impulsive as impulsive;
pub use astro_lowthrust as lowthrust;
pub use astro_orbits as orbits;
pub use astro_propagation as propagation;
pub use astro_threebody as threebody;

pub use astro_core::{OrbitError, Result};
pub use astro_orbits::{Attractor, ClassicalElements, Orbit, OrbitKind};

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
