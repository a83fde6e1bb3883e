//! Correlation identifier carried by every pipeline invocation.
//!
//! Each inbound change event runs under one `TraceId`. The identifier lives in
//! task-local storage so builders and the gateway can stamp it into envelopes
//! without threading it through every call. Spawned fan-out tasks do not
//! inherit task-locals; wrap them in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// Trace identifier for one inbound change event.
///
/// # Examples
/// ```
/// use clinic_notify::TraceId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let trace_id = TraceId::generate();
/// let seen = TraceId::scope(trace_id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier received from upstream.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Identifier in scope for the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Identifier in scope, or a freshly generated one.
    #[must_use]
    pub fn current_or_generate() -> Self {
        Self::current().unwrap_or_else(Self::generate)
    }

    /// Inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nothing_in_scope_outside_an_event() {
        assert!(TraceId::current().is_none());
    }

    #[tokio::test]
    async fn scope_exposes_identifier_to_nested_calls() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async { TraceId::current_or_generate() }).await;
        assert_eq!(observed, expected);
    }

    #[tokio::test]
    async fn spawned_tasks_need_explicit_scope() {
        let trace_id = TraceId::generate();
        let (bare, scoped) = TraceId::scope(trace_id, async move {
            let bare = tokio::spawn(async { TraceId::current() });
            let scoped = tokio::spawn(TraceId::scope(trace_id, async { TraceId::current() }));
            (bare.await.expect("join"), scoped.await.expect("join"))
        })
        .await;
        assert_eq!(bare, None);
        assert_eq!(scoped, Some(trace_id));
    }

    #[test]
    fn parses_hyphenated_uuid() {
        let trace_id: TraceId = "3fa85f64-5717-4562-b3fc-2c963f66afa6"
            .parse()
            .expect("valid uuid");
        assert_eq!(trace_id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }
}
