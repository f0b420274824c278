use thiserror::Error;

/// Failure taxonomy shared by every solver in the workspace.
///
/// Solvers never hand back partial results: they either succeed or return one
/// of these variants carrying the offending values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    /// Inputs outside the mathematical domain of the operation.
    #[error("domain error: {reason}")]
    Domain { reason: String },
    /// An iterative solver exhausted its budget or could not bracket a root.
    #[error("{solver} did not converge: {detail}")]
    Convergence {
        solver: &'static str,
        detail: String,
    },
    /// The adaptive integrator could not make progress.
    #[error("integration failed at t = {t}: {reason} (step = {step:e})")]
    Integration {
        reason: &'static str,
        t: f64,
        step: f64,
    },
}

impl OrbitError {
    pub fn domain(reason: impl Into<String>) -> Self {
        Self::Domain {
            reason: reason.into(),
        }
    }

    pub fn convergence(solver: &'static str, detail: impl Into<String>) -> Self {
        Self::Convergence {
            solver,
            detail: detail.into(),
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }

    pub fn is_convergence(&self) -> bool {
        matches!(self, Self::Convergence { .. })
    }

    pub fn is_integration(&self) -> bool {
        matches!(self, Self::Integration { .. })
    }
}

pub type Result<T> = std::result::Result<T, OrbitError>;
