//! Attendance report assembly.
//!
//! The assembler validates the request before touching the loader, then
//! performs one doctor lookup and one bulk appointment fetch. Grouping and
//! ordering happen in the pure builder so equal inputs give equal reports.

mod period;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

pub use period::ReportPeriod;

use super::error::PipelineError;
use super::ids::DoctorId;
use super::messages::{DomainMessage, builder};
use super::ports::SnapshotLoader;

/// Raw report request as received from the CRUD layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    /// Doctor to report on; nil is treated as unknown.
    pub doctor_id: DoctorId,
    /// First reported day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last reported day, inclusive.
    pub end_date: Option<NaiveDate>,
}

impl ReportRequest {
    /// Request with both bounds present.
    #[must_use]
    pub const fn new(doctor_id: DoctorId, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            doctor_id,
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }
}

/// Builds [`DoctorReportData`](super::messages::DoctorReportData) messages.
#[derive(Clone)]
pub struct ReportAssembler {
    loader: Arc<dyn SnapshotLoader>,
}

impl ReportAssembler {
    /// Assembler reading doctors and appointments through `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn SnapshotLoader>) -> Self {
        Self { loader }
    }

    /// Assemble the report message for `request`.
    ///
    /// # Errors
    /// - `InvalidRange` for absent, zero-valued, or inverted bounds; no query
    ///   is issued.
    /// - `DoctorNotFound` for a nil id or an unknown doctor.
    /// - `MissingRelation` when an in-range appointment lacks its patient.
    /// - `SnapshotUnavailable` / `SnapshotQuery` from the loader.
    pub async fn assemble(&self, request: &ReportRequest) -> Result<DomainMessage, PipelineError> {
        let period = ReportPeriod::new(request.start_date, request.end_date)?;
        if request.doctor_id.is_nil() {
            return Err(PipelineError::doctor_not_found(request.doctor_id));
        }

        let doctor = self
            .loader
            .find_doctor(&request.doctor_id)
            .await?
            .ok_or_else(|| PipelineError::doctor_not_found(request.doctor_id))?;
        let appointments = self
            .loader
            .appointments_for_doctor_between(&doctor.id, &period.window())
            .await?;

        debug!(
            doctor_id = %doctor.id,
            period = %period.label(),
            loaded = appointments.len(),
            "assembling doctor report"
        );
        builder::doctor_report(&doctor, &period, &appointments)
    }
}
