//! Orchestration of the inbound change events.
//!
//! Each entry point runs under one [`TraceId`]: it builds its primary message,
//! seals it, and publishes through the shared gateway. Schedule changes also
//! resolve affected patients and fan notices out once the primary message
//! has been acknowledged.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::TraceId;
use super::affected_patients::AffectedPatientResolver;
use super::appointment::Appointment;
use super::error::PipelineError;
use super::fan_out::{FanOutConfig, FanOutPublisher};
use super::messages::{DomainMessage, Envelope, builder};
use super::patient::Patient;
use super::ports::{ChangeNotificationCommand, MessageBus, ScheduleUpdateOutcome, SnapshotLoader};
use super::publish_gateway::{Ack, FlushReport, PublishGateway, PublishGatewayConfig, Publication};
use super::report::{ReportAssembler, ReportRequest};
use super::schedule::DoctorSchedule;

/// Driven ports required by the service.
pub struct NotificationServicePorts {
    /// Read-only snapshot source.
    pub loader: Arc<dyn SnapshotLoader>,
    /// Long-lived bus handle shared by every publish.
    pub bus: Arc<dyn MessageBus>,
}

/// Service tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationServiceConfig {
    /// Timeout and retry buffer of the shared gateway.
    pub gateway: PublishGatewayConfig,
    /// Concurrency of schedule notice fan-out.
    pub fan_out: FanOutConfig,
}

/// Domain service implementing [`ChangeNotificationCommand`].
pub struct NotificationService {
    clock: Arc<dyn Clock>,
    gateway: Arc<PublishGateway>,
    resolver: AffectedPatientResolver,
    fan_out: FanOutPublisher,
    reports: ReportAssembler,
}

impl NotificationService {
    /// Wire the pipeline stages over `ports`; all publishes share one gateway.
    #[must_use]
    pub fn new(
        ports: NotificationServicePorts,
        clock: Arc<dyn Clock>,
        config: NotificationServiceConfig,
    ) -> Self {
        let gateway = Arc::new(PublishGateway::new(ports.bus, Arc::clone(&clock), config.gateway));
        Self {
            resolver: AffectedPatientResolver::new(Arc::clone(&ports.loader)),
            reports: ReportAssembler::new(ports.loader),
            fan_out: FanOutPublisher::new(Arc::clone(&gateway), Arc::clone(&clock), config.fan_out),
            gateway,
            clock,
        }
    }

    /// Handle a schedule change, honouring `cancel` during fan-out.
    ///
    /// Affected patients are resolved first so a loader failure publishes
    /// nothing. The `ScheduleUpdated` message must be acknowledged before any
    /// notice is started; if it fails, its error is returned and no notices
    /// are sent.
    ///
    /// # Errors
    /// `MissingRelation` when the schedule lacks its doctor, loader errors
    /// from the resolver, or the primary publish failure.
    pub async fn notify_schedule_updated(
        &self,
        schedule: &DoctorSchedule,
        cancel: &CancellationToken,
    ) -> Result<ScheduleUpdateOutcome, PipelineError> {
        traced(async {
            let primary = builder::schedule_updated(schedule)?;
            let affected = self.resolver.resolve(&schedule.doctor_id).await?;
            let primary = self.publish_message(primary).await?;

            let notices = self.fan_out.fan_out(schedule, affected, cancel).await;
            if !notices.is_complete() {
                warn!(
                    schedule_id = %schedule.id,
                    failed = notices.failed.len(),
                    cancelled = notices.cancelled.len(),
                    "schedule notices partially delivered"
                );
            }
            Ok(ScheduleUpdateOutcome { primary, notices })
        })
        .await
    }

    /// Re-attempt envelopes retained by the gateway's retry buffer.
    pub async fn flush_buffered(&self) -> FlushReport {
        self.gateway.flush_buffered().await
    }

    async fn publish_message(&self, message: DomainMessage) -> Result<Ack, PipelineError> {
        let mut publication = Publication::new(Envelope::seal(message, self.clock.as_ref()));
        let ack = publication.publish_via(&self.gateway).await?;
        info!(message_id = %ack.message_id, kind = ?ack.kind, "message published");
        Ok(ack)
    }
}

/// Run `fut` under the trace id in scope, or a fresh one.
async fn traced<Fut>(fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    TraceId::scope(TraceId::current_or_generate(), fut).await
}

#[async_trait]
impl ChangeNotificationCommand for NotificationService {
    async fn on_patient_created(&self, patient: Patient) -> Result<Ack, PipelineError> {
        traced(self.publish_message(builder::new_patient(&patient))).await
    }

    async fn on_appointment_created(&self, appointment: Appointment) -> Result<Ack, PipelineError> {
        traced(async {
            let message = builder::new_appointment(&appointment)?;
            self.publish_message(message).await
        })
        .await
    }

    async fn on_schedule_updated(
        &self,
        schedule: DoctorSchedule,
    ) -> Result<ScheduleUpdateOutcome, PipelineError> {
        self.notify_schedule_updated(&schedule, &CancellationToken::new())
            .await
    }

    async fn on_report_requested(&self, request: ReportRequest) -> Result<Ack, PipelineError> {
        traced(async {
            let message = self.reports.assemble(&request).await?;
            self.publish_message(message).await
        })
        .await
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
