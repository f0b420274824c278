//! Stumpff functions `c2(ψ)` and `c3(ψ)` of the universal-variable formulation.

/// Below this |ψ| the closed forms lose digits to cancellation; use the series.
const SERIES_LIMIT: f64 = 1e-3;

/// `c2(ψ) = (1 - cos √ψ) / ψ`, continued analytically for ψ ≤ 0.
pub fn c2(psi: f64) -> f64 {
    if psi > SERIES_LIMIT {
        (1.0 - psi.sqrt().cos()) / psi
    } else if psi < -SERIES_LIMIT {
        (1.0 - (-psi).sqrt().cosh()) / psi
    } else {
        // Σ (-ψ)^j / (2j + 2)!
        1.0 / 2.0 - psi / 24.0 + psi * psi / 720.0 - psi.powi(3) / 40_320.0
            + psi.powi(4) / 3_628_800.0
    }
}

/// `c3(ψ) = (√ψ - sin √ψ) / ψ^{3/2}`, continued analytically for ψ ≤ 0.
pub fn c3(psi: f64) -> f64 {
    if psi > SERIES_LIMIT {
        let s = psi.sqrt();
        (s - s.sin()) / (psi * s)
    } else if psi < -SERIES_LIMIT {
        let s = (-psi).sqrt();
        (s.sinh() - s) / (-psi * s)
    } else {
        // Σ (-ψ)^j / (2j + 3)!
        1.0 / 6.0 - psi / 120.0 + psi * psi / 5_040.0 - psi.powi(3) / 362_880.0
            + psi.powi(4) / 39_916_800.0
    }
}
