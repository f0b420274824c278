//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod ephemeris {
    use std::io::{self, Write};

    use astro_orbits::Orbit;
    use serde::Serialize;

    /// One CSV row: epoch, position and velocity of a sampled orbit.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct EphemerisRow {
        pub epoch: f64,
        pub x: f64,
        pub y: f64,
        pub z: f64,
        pub vx: f64,
        pub vy: f64,
        pub vz: f64,
    }

    impl From<&Orbit> for EphemerisRow {
        fn from(orbit: &Orbit) -> Self {
            let [x, y, z] = orbit.r();
            let [vx, vy, vz] = orbit.v();
            Self {
                epoch: orbit.epoch(),
                x,
                y,
                z,
                vx,
                vy,
                vz,
            }
        }
    }

    /// Write sampled orbits as CSV with a header row.
    pub fn write_csv<W: Write>(writer: W, orbits: &[Orbit]) -> io::Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for orbit in orbits {
            csv.serialize(EphemerisRow::from(orbit))?;
        }
        csv.flush()
    }
}

pub mod maneuver {
    use std::io::{self, Write};
    use std::path::Path;

    use astro_core::vector::norm;
    use astro_impulsive::Maneuver;
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use crate::writer_for_path;

    /// Single burn as exported: offset, vector and magnitude.
    #[derive(Debug, Clone, Serialize)]
    pub struct ImpulseSummary {
        pub dt: f64,
        pub dv: [f64; 3],
        pub dv_norm: f64,
    }

    /// Envelope describing a maneuver's burns and totals.
    #[derive(Debug, Clone, Serialize)]
    pub struct ManeuverSummary {
        pub label: String,
        pub total_cost: f64,
        pub total_time: f64,
        pub impulses: Vec<ImpulseSummary>,
    }

    impl ManeuverSummary {
        pub fn new(label: impl Into<String>, maneuver: &Maneuver) -> Self {
            Self {
                label: label.into(),
                total_cost: maneuver.total_cost(),
                total_time: maneuver.total_time(),
                impulses: maneuver
                    .impulses()
                    .iter()
                    .map(|impulse| ImpulseSummary {
                        dt: impulse.dt,
                        dv: impulse.dv,
                        dv_norm: norm(&impulse.dv),
                    })
                    .collect(),
            }
        }
    }

    /// Write the summary as pretty-printed JSON (`-` for stdout).
    pub fn write_summary_json(path: &Path, summary: &ManeuverSummary) -> io::Result<()> {
        let mut writer = writer_for_path(path)?;
        to_writer_pretty(&mut writer, summary)?;
        writeln!(writer)?;
        writer.flush()
    }
}
