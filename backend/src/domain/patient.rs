//! Patient snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::PatientId;

/// Read-only patient snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Patient identifier.
    pub id: PatientId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth; optional upstream.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Free-text gender.
    #[serde(default)]
    pub gender: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: String,
    /// Contact e-mail.
    #[serde(default)]
    pub email: String,
    /// Postal address.
    #[serde(default)]
    pub address: String,
    /// Insurance policy number.
    #[serde(default)]
    pub insurance_number: String,
}

impl Patient {
    /// Display name in `"{first} {last}"` form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
