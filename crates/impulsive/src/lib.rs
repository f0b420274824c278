//! Impulsive transfers: maneuvers, analytic transfer budgets and the Lambert solver.

pub mod lambert;
pub mod maneuver;
pub mod transfers;

pub use lambert::{Lambert, LambertBranch, LambertSolution, lambert, lambert_single};
pub use maneuver::{Impulse, Maneuver, apply_maneuver, apply_maneuver_intermediate};
pub use transfers::{BiEllipticBudget, HohmannBudget, bi_elliptic, hohmann};
