//! Pipeline settings loaded via OrthoConfig.

use std::num::NonZeroUsize;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{FanOutConfig, NotificationServiceConfig, PublishGatewayConfig};

/// Tunables for the notification pipeline, read from `CLINIC_NOTIFY_*`.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC_NOTIFY")]
pub struct PipelineSettings {
    /// Maximum per-patient notices published concurrently.
    #[ortho_config(default = 8)]
    pub fan_out_concurrency: usize,
    /// Upper bound on a single bus publish, in milliseconds.
    #[ortho_config(default = 5000)]
    pub publish_timeout_ms: u64,
    /// Envelopes retained after transient failures; absent or zero disables.
    pub retry_buffer_capacity: Option<usize>,
    /// Capacity of the in-process bus channel.
    #[ortho_config(default = 1024)]
    pub bus_channel_capacity: usize,
}

impl PipelineSettings {
    /// Concurrency limit, never below one.
    pub fn fan_out_concurrency(&self) -> usize {
        self.fan_out_concurrency.max(1)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    pub fn retry_buffer_capacity(&self) -> Option<NonZeroUsize> {
        self.retry_buffer_capacity.and_then(NonZeroUsize::new)
    }

    /// Channel capacity, never below one.
    pub fn bus_channel_capacity(&self) -> usize {
        self.bus_channel_capacity.max(1)
    }

    /// Domain-facing service configuration.
    pub fn service_config(&self) -> NotificationServiceConfig {
        NotificationServiceConfig {
            gateway: PublishGatewayConfig {
                publish_timeout: self.publish_timeout(),
                retry_buffer_capacity: self.retry_buffer_capacity(),
            },
            fan_out: FanOutConfig {
                max_concurrent_publishes: self.fan_out_concurrency(),
            },
        }
    }
}
