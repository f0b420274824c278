use log::warn;
use serde::Serialize;

/// Budget of a continuous-thrust guidance law.
///
/// Infeasible or degenerate commands are reported as their own variants instead
/// of a truncated or saturated number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeOfFlightEstimate {
    Valid { delta_v: f64, time_of_flight: f64 },
    /// The analytic estimate has no finite value for this command.
    Divergent { reason: String },
    /// Finite, but longer than the caller's time bound.
    ExceedsBound {
        delta_v: f64,
        time_of_flight: f64,
        bound: f64,
    },
}

impl TimeOfFlightEstimate {
    /// Classify a delta-v obtained under constant thrust acceleration `f`.
    pub(crate) fn from_delta_v(delta_v: f64, f: f64, law: &str) -> Self {
        let time_of_flight = delta_v / f;
        if delta_v.is_finite() && delta_v >= 0.0 && time_of_flight.is_finite() {
            TimeOfFlightEstimate::Valid {
                delta_v,
                time_of_flight,
            }
        } else {
            TimeOfFlightEstimate::Divergent {
                reason: format!("{law} estimate diverges (delta-v = {delta_v})"),
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TimeOfFlightEstimate::Valid { .. })
    }

    /// Delta-v of a valid estimate.
    pub fn delta_v(&self) -> Option<f64> {
        match self {
            TimeOfFlightEstimate::Valid { delta_v, .. } => Some(*delta_v),
            _ => None,
        }
    }

    /// Burn time of a valid estimate.
    pub fn time_of_flight(&self) -> Option<f64> {
        match self {
            TimeOfFlightEstimate::Valid { time_of_flight, .. } => Some(*time_of_flight),
            _ => None,
        }
    }

    /// Re-classify against `bound`; divergent estimates stay divergent.
    pub fn with_time_bound(self, bound: f64) -> Self {
        match self {
            TimeOfFlightEstimate::Valid {
                delta_v,
                time_of_flight,
            }
            | TimeOfFlightEstimate::ExceedsBound {
                delta_v,
                time_of_flight,
                ..
            } => {
                if time_of_flight > bound {
                    TimeOfFlightEstimate::ExceedsBound {
                        delta_v,
                        time_of_flight,
                        bound,
                    }
                } else {
                    TimeOfFlightEstimate::Valid {
                        delta_v,
                        time_of_flight,
                    }
                }
            }
            divergent => divergent,
        }
    }
}

/// Guidance law paired with its budget.
///
/// `law` is an acceleration model meant for Cowell propagation; it is evaluated
/// per integration step and never integrates anything itself.
#[derive(Debug, Clone)]
pub struct ThrustPlan<L> {
    pub law: L,
    pub estimate: TimeOfFlightEstimate,
}

impl<L> ThrustPlan<L> {
    pub(crate) fn new(law: L, estimate: TimeOfFlightEstimate) -> Self {
        report(&estimate);
        Self { law, estimate }
    }

    pub fn with_time_bound(self, bound: f64) -> Self {
        let estimate = self.estimate.with_time_bound(bound);
        report(&estimate);
        Self {
            law: self.law,
            estimate,
        }
    }
}

fn report(estimate: &TimeOfFlightEstimate) {
    match estimate {
        TimeOfFlightEstimate::Valid { .. } => {}
        TimeOfFlightEstimate::Divergent { reason } => warn!("thrust estimate invalid: {reason}"),
        TimeOfFlightEstimate::ExceedsBound {
            time_of_flight,
            bound,
            ..
        } => warn!("thrust estimate invalid: burn time {time_of_flight} s exceeds bound {bound} s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_from_delta_v() {
        let estimate = TimeOfFlightEstimate::from_delta_v(2.0, 1e-3, "test");
        assert_eq!(estimate.time_of_flight(), Some(2000.0));
        assert!(!TimeOfFlightEstimate::from_delta_v(f64::NAN, 1e-3, "test").is_valid());
        assert!(!TimeOfFlightEstimate::from_delta_v(f64::INFINITY, 1e-3, "test").is_valid());
    }

    #[test]
    fn time_bound_reclassifies_both_ways() {
        let estimate = TimeOfFlightEstimate::from_delta_v(2.0, 1e-3, "test");
        let exceeded = estimate.clone().with_time_bound(1000.0);
        assert_eq!(
            exceeded,
            TimeOfFlightEstimate::ExceedsBound {
                delta_v: 2.0,
                time_of_flight: 2000.0,
                bound: 1000.0
            }
        );
        assert_eq!(exceeded.delta_v(), None);
        assert_eq!(exceeded.with_time_bound(5000.0), estimate);
    }

    #[test]
    fn divergent_estimates_ignore_bounds() {
        let divergent = TimeOfFlightEstimate::Divergent {
            reason: "no".into(),
        };
        assert_eq!(divergent.clone().with_time_bound(1e9), divergent);
    }
}
