//! Tests for the inbound entry points against mocked loaders and a
//! recording bus.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::{fixture, rstest};
use serde_json::Value;

use super::*;
use crate::domain::error::ErrorKind;
use crate::domain::ports::{MessageBusError, MockSnapshotLoader};
use crate::domain::{Doctor, MessageKind};
use crate::test_support::{FixedClock, RecordingBus, appointment_at, doctor, patient, schedule_for, timestamp};

struct Harness {
    service: NotificationService,
    bus: Arc<RecordingBus>,
}

fn harness(loader: MockSnapshotLoader) -> Harness {
    let bus = Arc::new(RecordingBus::default());
    let service = NotificationService::new(
        NotificationServicePorts {
            loader: Arc::new(loader),
            bus: bus.clone(),
        },
        Arc::new(FixedClock::at_fixture_instant()),
        NotificationServiceConfig::default(),
    );
    Harness { service, bus }
}

fn decode(payload: &[u8]) -> Value {
    serde_json::from_slice(payload).expect("payload is json")
}

#[fixture]
fn house() -> Doctor {
    doctor("Gregory", "House")
}

#[rstest]
#[tokio::test]
async fn schedule_update_publishes_primary_then_one_notice_per_patient(house: Doctor) {
    let alice = patient("Alice", "Smith");
    let bob = patient("Bob", "Jones");
    let appointments = vec![
        appointment_at(&house, &alice, timestamp(2024, 5, 6, 9, 0)),
        appointment_at(&house, &bob, timestamp(2024, 5, 6, 10, 0)),
        appointment_at(&house, &alice, timestamp(2024, 5, 13, 9, 0)),
    ];
    let mut loader = MockSnapshotLoader::new();
    loader
        .expect_appointments_for_doctor()
        .times(1)
        .returning(move |_| Ok(appointments.clone()));
    let Harness { service, bus } = harness(loader);

    let outcome = service
        .on_schedule_updated(schedule_for(&house))
        .await
        .expect("schedule update succeeds");

    assert_eq!(outcome.primary.kind, MessageKind::ScheduleUpdated);
    assert_eq!(outcome.notices.succeeded.len(), 2);
    let topics = bus.published_topics();
    assert_eq!(topics.len(), 3);
    assert_eq!(topics[0], "clinic.schedule.updated");
    assert!(
        topics[1..]
            .iter()
            .all(|topic| *topic == "clinic.schedule.patient_notice")
    );
}

#[rstest]
#[tokio::test]
async fn failed_primary_suppresses_notices(house: Doctor) {
    let alice = patient("Alice", "Smith");
    let appointments = vec![appointment_at(&house, &alice, timestamp(2024, 5, 6, 9, 0))];
    let mut loader = MockSnapshotLoader::new();
    loader
        .expect_appointments_for_doctor()
        .returning(move |_| Ok(appointments.clone()));
    let Harness { service, bus } = harness(loader);
    bus.fail_when_payload_contains("schedule_updated", MessageBusError::unavailable("down"));

    let err = service
        .on_schedule_updated(schedule_for(&house))
        .await
        .expect_err("primary publish fails");

    assert_eq!(err.kind(), ErrorKind::TransientBus);
    assert_eq!(bus.attempts(), 1);
}

#[rstest]
#[tokio::test]
async fn schedule_without_doctor_publishes_nothing(house: Doctor) {
    let mut loader = MockSnapshotLoader::new();
    loader.expect_appointments_for_doctor().never();
    let Harness { service, bus } = harness(loader);
    let mut schedule = schedule_for(&house);
    schedule.doctor = None;

    let err = service
        .on_schedule_updated(schedule)
        .await
        .expect_err("doctor missing");

    assert_eq!(err.kind(), ErrorKind::MissingRelation);
    assert_eq!(bus.attempts(), 0);
}

#[rstest]
#[tokio::test]
async fn schedule_messages_share_one_trace_id(house: Doctor) {
    let alice = patient("Alice", "Smith");
    let appointments = vec![appointment_at(&house, &alice, timestamp(2024, 5, 6, 9, 0))];
    let mut loader = MockSnapshotLoader::new();
    loader
        .expect_appointments_for_doctor()
        .returning(move |_| Ok(appointments.clone()));
    let Harness { service, bus } = harness(loader);

    service
        .on_schedule_updated(schedule_for(&house))
        .await
        .expect("schedule update succeeds");

    let published = bus.published();
    assert_eq!(published.len(), 2);
    assert!(published[0].trace_id.is_some());
    assert_eq!(published[0].trace_id, published[1].trace_id);
}

#[rstest]
#[tokio::test]
async fn new_appointment_is_published_with_display_names(house: Doctor) {
    let Harness { service, bus } = harness(MockSnapshotLoader::new());
    let alice = patient("Alice", "Smith");

    let ack = service
        .on_appointment_created(appointment_at(&house, &alice, timestamp(2024, 5, 6, 9, 0)))
        .await
        .expect("appointment published");

    assert_eq!(ack.kind, MessageKind::NewAppointment);
    let body = decode(&bus.published()[0].payload);
    assert_eq!(body["message"]["payload"]["patientFullName"], "Alice Smith");
    assert_eq!(body["message"]["payload"]["doctorFullName"], "Gregory House");
}

#[rstest]
#[tokio::test]
async fn new_patient_is_published() {
    let Harness { service, bus } = harness(MockSnapshotLoader::new());

    let ack = service
        .on_patient_created(patient("Alice", "Smith"))
        .await
        .expect("patient published");

    assert_eq!(ack.kind, MessageKind::NewPatient);
    assert_eq!(bus.published_topics(), ["clinic.patient.created"]);
}

#[rstest]
#[tokio::test]
async fn report_request_publishes_one_report(house: Doctor) {
    let alice = patient("Alice", "Smith");
    let appointments = vec![
        appointment_at(&house, &alice, timestamp(2024, 1, 10, 9, 0)),
        appointment_at(&house, &alice, timestamp(2024, 1, 24, 9, 0)),
    ];
    let mut loader = MockSnapshotLoader::new();
    let found = house.clone();
    loader
        .expect_find_doctor()
        .returning(move |_| Ok(Some(found.clone())));
    loader
        .expect_appointments_for_doctor_between()
        .returning(move |_, _| Ok(appointments.clone()));
    let Harness { service, bus } = harness(loader);

    let request = ReportRequest::new(
        house.id,
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 1, 31).expect("valid date"),
    );
    let ack = service
        .on_report_requested(request)
        .await
        .expect("report published");

    assert_eq!(ack.kind, MessageKind::DoctorReport);
    let body = decode(&bus.published()[0].payload);
    assert_eq!(body["message"]["payload"]["totalPatients"], 2);
    assert_eq!(body["message"]["payload"]["period"], "01.01.2024 - 31.01.2024");
}

#[rstest]
#[tokio::test]
async fn invalid_report_request_publishes_nothing() {
    let Harness { service, bus } = harness(MockSnapshotLoader::new());
    let request = ReportRequest {
        doctor_id: crate::domain::DoctorId::random(),
        start_date: None,
        end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
    };

    let err = service
        .on_report_requested(request)
        .await
        .expect_err("start date missing");

    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert_eq!(bus.attempts(), 0);
}
