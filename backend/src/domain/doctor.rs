//! Doctor snapshot and its optional organisational relations.

use serde::{Deserialize, Serialize};

use super::ids::{DepartmentId, DoctorId, SpecializationId};

/// Medical specialization. The upstream record allows a missing name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    /// Specialization identifier.
    pub id: SpecializationId,
    /// Human-readable label, e.g. "Cardiology".
    #[serde(default)]
    pub name: Option<String>,
}

/// Clinic department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Department identifier.
    pub id: DepartmentId,
    /// Department name.
    pub name: String,
    /// Building or floor location.
    #[serde(default)]
    pub location: String,
}

/// Read-only doctor snapshot as supplied by the CRUD layer.
///
/// `specialization` and `department` are populated only when the loader was
/// asked to include them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// Doctor identifier.
    pub id: DoctorId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Reference to the specialization row.
    pub specialization_id: SpecializationId,
    /// Reference to the department row.
    pub department_id: DepartmentId,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: String,
    /// Contact e-mail.
    #[serde(default)]
    pub email: String,
    /// Consultation room.
    #[serde(default)]
    pub room_number: String,
    /// Loaded specialization, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Specialization>,
    /// Loaded department, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
}

impl Doctor {
    /// Display name in `"{first} {last}"` form.
    ///
    /// # Examples
    /// ```
    /// use clinic_notify::domain::{Doctor, DoctorId, DepartmentId, SpecializationId};
    ///
    /// let doctor = Doctor {
    ///     id: DoctorId::random(),
    ///     first_name: "Gregory".to_owned(),
    ///     last_name: "House".to_owned(),
    ///     specialization_id: SpecializationId::random(),
    ///     department_id: DepartmentId::random(),
    ///     phone_number: String::new(),
    ///     email: String::new(),
    ///     room_number: String::new(),
    ///     specialization: None,
    ///     department: None,
    /// };
    /// assert_eq!(doctor.full_name(), "Gregory House");
    /// ```
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Specialization label when the relation and its name are both present.
    #[must_use]
    pub fn specialization_label(&self) -> Option<&str> {
        self.specialization
            .as_ref()
            .and_then(|specialization| specialization.name.as_deref())
    }
}
