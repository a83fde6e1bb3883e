//! Concurrent, best-effort delivery of per-patient schedule notices.
//!
//! Each affected patient gets an independent publish. A bounded semaphore
//! caps how many publishes are in flight; workers report back over a channel
//! to a single collector. One recipient's failure never blocks or rolls back
//! another's delivery. Cancellation stops admission of new recipients but
//! lets in-flight publishes finish.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::TraceId;
use super::affected_patients::AffectedPatient;
use super::error::PipelineError;
use super::ids::PatientId;
use super::messages::{Envelope, builder};
use super::publish_gateway::{Ack, PublishGateway, Publication};
use super::schedule::DoctorSchedule;

/// Fan-out tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutConfig {
    /// Upper bound on concurrent per-patient publishes.
    pub max_concurrent_publishes: usize,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            max_concurrent_publishes: 8,
        }
    }
}

/// Notice the bus accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredNotice {
    /// Recipient of the notice.
    pub patient_id: PatientId,
    /// Bus acknowledgement.
    pub ack: Ack,
}

/// Notice that could not be delivered.
///
/// `publication` is kept when an envelope was built so the caller can retry
/// that exact instance; it is `None` when the notice failed to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedNotice {
    /// Recipient of the notice.
    pub patient_id: PatientId,
    /// Why the notice was not delivered.
    pub error: PipelineError,
    /// Built publication, ready to be retried as-is.
    pub publication: Option<Publication>,
}

/// Per-recipient outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutResult {
    /// Notices the bus accepted.
    pub succeeded: Vec<DeliveredNotice>,
    /// Notices that failed to build or publish.
    pub failed: Vec<FailedNotice>,
    /// Recipients never started because the fan-out was cancelled.
    pub cancelled: Vec<PatientId>,
}

impl FanOutResult {
    /// Whether every recipient was delivered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }
}

enum NoticeOutcome {
    Delivered(DeliveredNotice),
    Failed(FailedNotice),
}

/// Publishes one notice per affected patient through the gateway.
pub struct FanOutPublisher {
    gateway: Arc<PublishGateway>,
    clock: Arc<dyn Clock>,
    permits: Arc<Semaphore>,
}

impl FanOutPublisher {
    /// Publisher sharing `gateway`; concurrency is clamped to at least one.
    #[must_use]
    pub fn new(gateway: Arc<PublishGateway>, clock: Arc<dyn Clock>, config: FanOutConfig) -> Self {
        Self {
            gateway,
            clock,
            permits: Arc::new(Semaphore::new(config.max_concurrent_publishes.max(1))),
        }
    }

    /// Build and publish a notice for every recipient in `affected`.
    pub async fn fan_out(
        &self,
        schedule: &DoctorSchedule,
        affected: Vec<AffectedPatient>,
        cancel: &CancellationToken,
    ) -> FanOutResult {
        let trace_id = TraceId::current_or_generate();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut result = FanOutResult::default();
        let mut dispatched = HashSet::new();
        let mut pending = affected.into_iter();

        while let Some(recipient) = pending.next() {
            let patient_id = recipient.patient_id();
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                permit = Arc::clone(&self.permits).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                result.cancelled.push(patient_id);
                result
                    .cancelled
                    .extend(pending.by_ref().map(|rest| rest.patient_id()));
                break;
            };

            let publication = match builder::patient_schedule_notice(schedule, &recipient) {
                Ok(message) => Publication::new(Envelope::seal(message, self.clock.as_ref())),
                Err(error) => {
                    drop(permit);
                    result.failed.push(FailedNotice {
                        patient_id,
                        error,
                        publication: None,
                    });
                    continue;
                }
            };

            dispatched.insert(patient_id);
            let gateway = Arc::clone(&self.gateway);
            let sender = sender.clone();
            tokio::spawn(TraceId::scope(trace_id, async move {
                let outcome = deliver(patient_id, publication, &gateway).await;
                drop(permit);
                if sender.send(outcome).is_err() {
                    debug!(%patient_id, "fan-out abandoned before notice outcome was collected");
                }
            }));
        }
        drop(sender);

        while let Some(outcome) = receiver.recv().await {
            match outcome {
                NoticeOutcome::Delivered(notice) => {
                    dispatched.remove(&notice.patient_id);
                    result.succeeded.push(notice);
                }
                NoticeOutcome::Failed(notice) => {
                    dispatched.remove(&notice.patient_id);
                    result.failed.push(notice);
                }
            }
        }
        // A worker that panicked dropped its sender without reporting.
        for patient_id in dispatched {
            result.failed.push(FailedNotice {
                patient_id,
                error: PipelineError::transient_bus("notice worker stopped before reporting"),
                publication: None,
            });
        }

        debug!(
            schedule_id = %schedule.id,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            cancelled = result.cancelled.len(),
            "fan-out finished"
        );
        result
    }
}

async fn deliver(
    patient_id: PatientId,
    mut publication: Publication,
    gateway: &PublishGateway,
) -> NoticeOutcome {
    match publication.publish_via(gateway).await {
        Ok(ack) => NoticeOutcome::Delivered(DeliveredNotice { patient_id, ack }),
        Err(error) => {
            warn!(%patient_id, error = %error, "patient notice not delivered");
            NoticeOutcome::Failed(FailedNotice {
                patient_id,
                error,
                publication: Some(publication),
            })
        }
    }
}
