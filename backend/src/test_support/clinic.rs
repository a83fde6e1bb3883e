//! Entity builders with readable defaults.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::domain::{
    Appointment, AppointmentId, DepartmentId, Doctor, DoctorId, DoctorSchedule, Patient,
    PatientId, ScheduleId, Specialization, SpecializationId,
};

pub fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid fixture timestamp")
}

pub fn doctor(first_name: &str, last_name: &str) -> Doctor {
    let specialization_id = SpecializationId::random();
    Doctor {
        id: DoctorId::random(),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        specialization_id,
        department_id: DepartmentId::random(),
        phone_number: "+44 131 000 0000".to_owned(),
        email: format!("{}@clinic.test", last_name.to_lowercase()),
        room_number: "12B".to_owned(),
        specialization: Some(Specialization {
            id: specialization_id,
            name: Some("Cardiology".to_owned()),
        }),
        department: None,
    }
}

pub fn patient(first_name: &str, last_name: &str) -> Patient {
    Patient {
        id: PatientId::random(),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        date_of_birth: NaiveDate::from_ymd_opt(1980, 6, 1),
        gender: "F".to_owned(),
        phone_number: "+44 131 111 1111".to_owned(),
        email: format!("{}@mail.test", first_name.to_lowercase()),
        address: "1 High Street".to_owned(),
        insurance_number: "INS-001".to_owned(),
    }
}

/// Appointment with both relations loaded.
pub fn appointment_at(doctor: &Doctor, patient: &Patient, scheduled_at: NaiveDateTime) -> Appointment {
    Appointment {
        id: AppointmentId::random(),
        patient_id: patient.id,
        doctor_id: doctor.id,
        scheduled_at,
        status: "In processing".to_owned(),
        notes: format!("checkup for {}", patient.first_name),
        patient: Some(patient.clone()),
        doctor: Some(doctor.clone()),
    }
}

/// Monday 09:00-17:00 schedule with the doctor loaded.
pub fn schedule_for(doctor: &Doctor) -> DoctorSchedule {
    DoctorSchedule {
        id: ScheduleId::random(),
        doctor_id: doctor.id,
        day_of_week: Weekday::Mon,
        available_from: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
        available_to: NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"),
        doctor: Some(doctor.clone()),
    }
}
