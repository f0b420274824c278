//! Configuration models and loaders for attractor catalogs and solver settings.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Central body entry from an attractor catalog.
///
/// Units follow the bundled catalogs: `k` in km³/s², `radius` in km.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AttractorConfig {
    pub name: String,
    pub k: f64,
    pub radius: f64,
    #[serde(default)]
    pub j2: Option<f64>,
    #[serde(default)]
    pub j3: Option<f64>,
}

impl AttractorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("name", "must not be empty"));
        }
        if !(self.k.is_finite() && self.k > 0.0) {
            return Err(ConfigError::invalid(
                "k",
                format!("{}: must be positive, got {}", self.name, self.k),
            ));
        }
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(ConfigError::invalid(
                "radius",
                format!("{}: must be non-negative, got {}", self.name, self.radius),
            ));
        }
        for (field, value) in [("j2", self.j2), ("j3", self.j3)] {
            if value.is_some_and(|j| !j.is_finite()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{}: must be finite", self.name),
                ));
            }
        }
        Ok(())
    }
}

/// Universal-variable Kepler solver settings.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct KeplerSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for KeplerSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

/// Adaptive Dormand–Prince settings used by Cowell propagation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CowellConfig {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
    pub min_step: f64,
    pub initial_step: Option<f64>,
}

impl Default for CowellConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-11,
            atol: 1e-12,
            max_steps: 1_000_000,
            min_step: 0.0,
            initial_step: None,
        }
    }
}

/// Lambert solver iteration settings.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LambertConfig {
    pub rtol: f64,
    pub max_iterations: usize,
}

impl Default for LambertConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            max_iterations: 35,
        }
    }
}

/// Numerical settings for every solver, each section optional.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct SolverConfig {
    pub kepler: KeplerSettings,
    pub cowell: CowellConfig,
    pub lambert: LambertConfig,
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("kepler.tolerance", self.kepler.tolerance)?;
        nonzero("kepler.max_iterations", self.kepler.max_iterations)?;
        positive("cowell.rtol", self.cowell.rtol)?;
        positive("cowell.atol", self.cowell.atol)?;
        nonzero("cowell.max_steps", self.cowell.max_steps)?;
        if !(self.cowell.min_step.is_finite() && self.cowell.min_step >= 0.0) {
            return Err(ConfigError::invalid(
                "cowell.min_step",
                format!("must be non-negative, got {}", self.cowell.min_step),
            ));
        }
        if let Some(h0) = self.cowell.initial_step {
            positive("cowell.initial_step", h0)?;
        }
        positive("lambert.rtol", self.lambert.rtol)?;
        nonzero("lambert.max_iterations", self.lambert.max_iterations)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be positive, got {value}"),
        ))
    }
}

fn nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::invalid(field, "must be at least 1"))
    } else {
        Ok(())
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("unknown attractor `{0}`")]
    UnknownAttractor(String),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Load attractor entries from a YAML list, a single TOML file, or a
/// directory of TOML files (read in file-name order).
pub fn load_attractors<P: AsRef<Path>>(path: P) -> Result<Vec<AttractorConfig>, ConfigError> {
    let attractors: Vec<AttractorConfig> = load_records(path)?;
    for attractor in &attractors {
        attractor.validate()?;
    }
    Ok(attractors)
}

/// Look up an attractor by name, ignoring ASCII case.
pub fn find_attractor<'a>(
    attractors: &'a [AttractorConfig],
    name: &str,
) -> Result<&'a AttractorConfig, ConfigError> {
    attractors
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| ConfigError::UnknownAttractor(name.to_string()))
}

/// Load solver settings from TOML (or YAML for any other extension).
/// Missing sections fall back to their defaults.
pub fn load_solver_config<P: AsRef<Path>>(path: P) -> Result<SolverConfig, ConfigError> {
    let path = path.as_ref();
    let config: SolverConfig = if is_toml(path) {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        serde_yaml::from_reader(File::open(path)?)?
    };
    config.validate()?;
    Ok(config)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
