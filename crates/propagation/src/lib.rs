//! Orbit propagation: analytic Kepler, mean-motion, and Cowell integration with
//! pluggable perturbations.

pub mod cowell;
pub mod integrator;
pub mod kepler;
pub mod mean_motion;
pub mod perturbations;
pub mod propagator;
pub mod stumpff;

pub use cowell::{Cowell, CowellSettings, propagate_cowell};
pub use kepler::{Kepler, kepler};
pub use mean_motion::MeanMotion;
pub use perturbations::{
    AccelerationModel, AtmosphericDrag, J2Perturbation, J3Perturbation, NoPerturbation,
    RadiationPressure, Sum, ThirdBody,
};
pub use propagator::{Propagator, propagate, propagate_many, sample};
