//! JSON fixture format for the in-memory snapshot loader.

use std::io::Read;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Appointment, Department, Doctor, DoctorSchedule, Patient, Specialization};

/// Flat clinic dataset. Relations are joined by id when snapshots are read,
/// so nested `doctor`/`patient` objects in the file are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicFixture {
    /// Specialization rows.
    #[serde(default)]
    pub specializations: Vec<Specialization>,
    /// Department rows.
    #[serde(default)]
    pub departments: Vec<Department>,
    /// Doctor rows.
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    /// Patient rows.
    #[serde(default)]
    pub patients: Vec<Patient>,
    /// Appointment rows; relations are re-joined on read.
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    /// Weekly schedule rows.
    #[serde(default)]
    pub schedules: Vec<DoctorSchedule>,
}

/// Errors raised while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Fixture file could not be opened or read.
    #[error("failed to read fixture at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Fixture contents are not valid JSON for the expected shape.
    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two records of the same entity share an id.
    #[error("duplicate {entity} id {id} in fixture")]
    DuplicateId { entity: &'static str, id: String },
}

impl ClinicFixture {
    /// Parse a fixture from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse the fixture at `path`.
    pub fn read(path: &Path) -> Result<Self, FixtureError> {
        let read_error = |source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parent = containing_dir(path);
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "fixture path must name a file",
            ))
        })?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let mut raw = String::new();
        directory
            .open(Path::new(file_name))
            .and_then(|mut file| file.read_to_string(&mut raw))
            .map_err(read_error)?;
        Self::from_json(&raw)
    }
}

/// Directory holding `path`; a bare file name resolves to the working directory.
fn containing_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
