//! Clinic change-notification and reporting pipeline.
//!
//! Reacts to committed CRUD writes by building domain messages, fanning
//! schedule notices out to affected patients, assembling attendance reports,
//! and publishing everything through a single bus gateway.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;

pub use domain::TraceId;
