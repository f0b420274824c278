//! Conversions from configuration records to solver inputs.

use astro_config::{AttractorConfig, ConfigError, SolverConfig, find_attractor};
use astro_core::OrbitError;
use astro_impulsive::Lambert;
use astro_orbits::Attractor;
use astro_propagation::{CowellSettings, Kepler};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("attractor catalog is empty")]
    EmptyCatalog,
    #[error("attractor `{0}` not found in catalog")]
    NotFound(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

pub fn attractor_from_config(config: &AttractorConfig) -> Result<Attractor, CatalogError> {
    let mut attractor = Attractor::new(config.k, config.radius)?;
    if let Some(j2) = config.j2 {
        attractor = attractor.with_j2(j2);
    }
    if let Some(j3) = config.j3 {
        attractor = attractor.with_j3(j3);
    }
    Ok(attractor)
}

/// Pick an attractor by name (case-insensitive), or the first entry when no
/// name is requested.
pub fn select_attractor(
    configs: &[AttractorConfig],
    requested: Option<&str>,
) -> Result<Attractor, CatalogError> {
    if configs.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }
    let chosen = match requested {
        Some(name) => find_attractor(configs, name).map_err(|err| match err {
            ConfigError::UnknownAttractor(name) => CatalogError::NotFound(name),
            other => CatalogError::Config(other),
        })?,
        None => &configs[0],
    };
    attractor_from_config(chosen)
}

pub fn kepler_from_config(config: &SolverConfig) -> Kepler {
    Kepler::new(config.kepler.tolerance, config.kepler.max_iterations)
}

pub fn cowell_settings_from_config(config: &SolverConfig) -> CowellSettings {
    let cowell = &config.cowell;
    CowellSettings {
        rtol: cowell.rtol,
        atol: cowell.atol,
        max_steps: cowell.max_steps,
        min_step: cowell.min_step,
        initial_step: cowell.initial_step,
    }
}

pub fn lambert_from_config(config: &SolverConfig) -> Lambert {
    Lambert::new(config.lambert.rtol, config.lambert.max_iterations)
}
