//! `clinic-notify`: replay one clinic change event against a fixture.
//!
//! Loads a JSON clinic fixture, runs a single inbound entry point through the
//! notification pipeline over an in-process bus, and logs every message the
//! bus accepted.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clinic_notify::config::PipelineSettings;
use ortho_config::OrthoConfig;
use clinic_notify::domain::ports::ChangeNotificationCommand;
use clinic_notify::domain::{
    AppointmentId, DoctorId, NotificationService, NotificationServicePorts, PatientId,
    ReportRequest, ScheduleId,
};
use clinic_notify::outbound::bus::{BusSubscription, ChannelBus};
use clinic_notify::outbound::snapshots::{ClinicFixture, InMemorySnapshotLoader};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `clinic-notify` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clinic-notify",
    about = "Replay a clinic change event through the notification pipeline",
    version
)]
struct CliArgs {
    /// Path to a JSON clinic fixture.
    #[arg(long, value_name = "path")]
    fixture: PathBuf,
    #[command(subcommand)]
    event: Event,
}

#[derive(Debug, Clone, Subcommand)]
enum Event {
    /// A patient was registered.
    PatientCreated {
        #[arg(long, value_name = "uuid")]
        patient_id: PatientId,
    },
    /// An appointment was booked.
    AppointmentCreated {
        #[arg(long, value_name = "uuid")]
        appointment_id: AppointmentId,
    },
    /// A doctor's schedule changed.
    ScheduleUpdated {
        #[arg(long, value_name = "uuid")]
        schedule_id: ScheduleId,
    },
    /// A doctor attendance report was requested.
    Report {
        #[arg(long, value_name = "uuid")]
        doctor_id: DoctorId,
        /// First day of the period, `YYYY-MM-DD`.
        #[arg(long, value_name = "date")]
        start: Option<NaiveDate>,
        /// Last day of the period, `YYYY-MM-DD`.
        #[arg(long, value_name = "date")]
        end: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = PipelineSettings::load_from_iter([OsString::from("clinic-notify")])
        .map_err(|error| eyre!("failed to load pipeline settings: {error}"))?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build tokio runtime")?;
    runtime.block_on(replay(args, &settings))
}

async fn replay(args: CliArgs, settings: &PipelineSettings) -> Result<()> {
    let fixture = ClinicFixture::read(&args.fixture)?;
    let loader = Arc::new(InMemorySnapshotLoader::new(fixture)?);
    let (bus, mut subscription) = ChannelBus::open(settings.bus_channel_capacity());
    let service = NotificationService::new(
        NotificationServicePorts {
            loader: loader.clone(),
            bus: Arc::new(bus),
        },
        Arc::new(DefaultClock),
        settings.service_config(),
    );

    let outcome = dispatch(&service, &loader, args.event).await;
    let flushed = service.flush_buffered().await;
    if !flushed.delivered.is_empty() || flushed.rebuffered > 0 {
        info!(
            delivered = flushed.delivered.len(),
            still_buffered = flushed.rebuffered,
            "retried buffered envelopes"
        );
    }
    log_delivered(&mut subscription);
    outcome
}

async fn dispatch(
    service: &NotificationService,
    loader: &InMemorySnapshotLoader,
    event: Event,
) -> Result<()> {
    match event {
        Event::PatientCreated { patient_id } => {
            let patient = loader
                .patient(&patient_id)
                .ok_or_else(|| eyre!("patient {patient_id} is not in the fixture"))?;
            service.on_patient_created(patient).await?;
        }
        Event::AppointmentCreated { appointment_id } => {
            let appointment = loader
                .appointment(&appointment_id)
                .ok_or_else(|| eyre!("appointment {appointment_id} is not in the fixture"))?;
            service.on_appointment_created(appointment).await?;
        }
        Event::ScheduleUpdated { schedule_id } => {
            let schedule = loader
                .schedule(&schedule_id)
                .ok_or_else(|| eyre!("schedule {schedule_id} is not in the fixture"))?;
            let outcome = service.on_schedule_updated(schedule).await?;
            for failure in &outcome.notices.failed {
                warn!(
                    patient_id = %failure.patient_id,
                    kind = failure.error.kind().code(),
                    error = %failure.error,
                    "notice failed"
                );
            }
            info!(
                delivered = outcome.notices.succeeded.len(),
                failed = outcome.notices.failed.len(),
                "schedule update replayed"
            );
        }
        Event::Report {
            doctor_id,
            start,
            end,
        } => {
            service
                .on_report_requested(ReportRequest {
                    doctor_id,
                    start_date: start,
                    end_date: end,
                })
                .await?;
        }
    }
    Ok(())
}

fn log_delivered(subscription: &mut BusSubscription) {
    for message in subscription.drain() {
        info!(
            message_id = %message.message_id,
            topic = message.topic,
            payload = %String::from_utf8_lossy(&message.payload),
            "bus message delivered"
        );
    }
}
