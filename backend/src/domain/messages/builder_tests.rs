//! Tests for the message builders.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::error::{ErrorKind, Relation};
use crate::domain::report::ReportPeriod;
use crate::test_support::{appointment_at, doctor, patient, schedule_for, timestamp};

#[fixture]
fn house() -> Doctor {
    doctor("Gregory", "House")
}

#[rstest]
fn new_appointment_uses_full_names(house: Doctor) {
    let alice = patient("Alice", "Smith");
    let appointment = appointment_at(&house, &alice, timestamp(2024, 1, 5, 9, 30));

    let DomainMessage::NewAppointment(message) =
        new_appointment(&appointment).expect("relations loaded")
    else {
        panic!("expected a new-appointment message");
    };

    assert_eq!(message.patient_full_name, "Alice Smith");
    assert_eq!(message.doctor_full_name, "Gregory House");
    assert_eq!(message.status, "In processing");
    assert_eq!(message.scheduled_at, appointment.scheduled_at);
}

#[rstest]
#[case::patient(true, false, Relation::Patient)]
#[case::doctor(false, true, Relation::Doctor)]
#[case::both(true, true, Relation::Patient)]
fn new_appointment_rejects_under_loaded_snapshot(
    house: Doctor,
    #[case] drop_patient: bool,
    #[case] drop_doctor: bool,
    #[case] expected: Relation,
) {
    let mut appointment = appointment_at(&house, &patient("Bob", "Jones"), timestamp(2024, 1, 5, 9, 0));
    if drop_patient {
        appointment.patient = None;
    }
    if drop_doctor {
        appointment.doctor = None;
    }

    let err = new_appointment(&appointment).expect_err("relation missing");
    assert_eq!(err.kind(), ErrorKind::MissingRelation);
    assert!(matches!(err, PipelineError::MissingRelation { relation, .. } if relation == expected));
}

#[rstest]
fn schedule_messages_require_doctor(house: Doctor) {
    let mut schedule = schedule_for(&house);
    schedule.doctor = None;
    let alice = patient("Alice", "Smith");
    let affected = AffectedPatient::new(
        alice.clone(),
        appointment_at(&house, &alice, timestamp(2024, 2, 1, 10, 0)),
    );

    assert!(schedule_updated(&schedule).is_err());
    assert!(patient_schedule_notice(&schedule, &affected).is_err());
}

#[rstest]
fn patient_notice_carries_window_and_representative_appointment(house: Doctor) {
    let schedule = schedule_for(&house);
    let alice = patient("Alice", "Smith");
    let appointment = appointment_at(&house, &alice, timestamp(2024, 2, 1, 10, 0));
    let affected = AffectedPatient::new(alice, appointment.clone());

    let DomainMessage::PatientScheduleNotice(notice) =
        patient_schedule_notice(&schedule, &affected).expect("doctor loaded")
    else {
        panic!("expected a patient notice");
    };

    assert_eq!(notice.window, schedule.window());
    assert_eq!(notice.appointment_id, appointment.id);
    assert_eq!(notice.doctor_full_name, "Gregory House");
    assert_eq!(notice.patient_full_name, "Alice Smith");
}

#[rstest]
fn new_patient_copies_contact_fields() {
    let alice = patient("Alice", "Smith");
    let DomainMessage::NewPatient(message) = new_patient(&alice) else {
        panic!("expected a new-patient message");
    };
    assert_eq!(message.full_name, "Alice Smith");
    assert_eq!(message.email, alice.email);
    assert_eq!(message.date_of_birth, alice.date_of_birth);
}

fn january() -> ReportPeriod {
    ReportPeriod::new(
        chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
        chrono::NaiveDate::from_ymd_opt(2024, 1, 31),
    )
    .expect("valid period")
}

#[rstest]
fn report_counts_visits_and_orders_by_timestamp(house: Doctor) {
    let alice = patient("Alice", "Smith");
    let bob = patient("Bob", "Jones");
    let appointments = vec![
        appointment_at(&house, &bob, timestamp(2024, 1, 20, 14, 0)),
        appointment_at(&house, &alice, timestamp(2024, 1, 31, 23, 30)),
        appointment_at(&house, &alice, timestamp(2024, 1, 2, 9, 0)),
        appointment_at(&house, &bob, timestamp(2024, 2, 1, 0, 0)),
    ];

    let DomainMessage::DoctorReport(report) =
        doctor_report(&house, &january(), &appointments).expect("report builds")
    else {
        panic!("expected a doctor report");
    };

    assert_eq!(report.total_patients, 3);
    assert_eq!(report.period, "01.01.2024 - 31.01.2024");
    assert_eq!(report.specialization.as_deref(), Some("Cardiology"));
    let names: Vec<_> = report
        .patient_details
        .iter()
        .map(|visit| visit.first_name.as_str())
        .collect();
    assert_eq!(names, ["Alice", "Bob", "Alice"]);
}

#[rstest]
fn report_ignores_other_doctors(house: Doctor) {
    let wilson = doctor("James", "Wilson");
    let alice = patient("Alice", "Smith");
    let appointments = vec![appointment_at(&wilson, &alice, timestamp(2024, 1, 10, 9, 0))];

    let DomainMessage::DoctorReport(report) =
        doctor_report(&house, &january(), &appointments).expect("report builds")
    else {
        panic!("expected a doctor report");
    };
    assert_eq!(report.total_patients, 0);
    assert!(report.patient_details.is_empty());
}

#[rstest]
fn report_is_independent_of_input_order(house: Doctor) {
    let alice = patient("Alice", "Smith");
    let bob = patient("Bob", "Jones");
    let same_slot = timestamp(2024, 1, 10, 9, 0);
    let mut appointments = vec![
        appointment_at(&house, &alice, same_slot),
        appointment_at(&house, &bob, same_slot),
        appointment_at(&house, &bob, timestamp(2024, 1, 3, 9, 0)),
    ];

    let first = serde_json::to_vec(&doctor_report(&house, &january(), &appointments).expect("report"))
        .expect("encode");
    appointments.reverse();
    let second = serde_json::to_vec(&doctor_report(&house, &january(), &appointments).expect("report"))
        .expect("encode");

    assert_eq!(first, second);
}

#[rstest]
fn report_requires_patient_on_in_range_visits(house: Doctor) {
    let mut appointment = appointment_at(&house, &patient("Alice", "Smith"), timestamp(2024, 1, 10, 9, 0));
    appointment.patient = None;

    let err = doctor_report(&house, &january(), &[appointment]).expect_err("patient missing");
    assert_eq!(err.kind(), ErrorKind::MissingRelation);
}
