// Notifier module - request lifecycle callbacks
// This file defines the notification record handed over by the forwarding
// path and the trait every telemetry or logging sink implements
//
// Numan Thabit 2025 Nov

pub mod function;
pub mod logging;
pub mod service;

pub use function::FunctionMetricsNotifier;
pub use logging::LoggingNotifier;
pub use service::ServiceMetricsNotifier;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const EVENT_STARTED: &str = "started";
pub const EVENT_COMPLETED: &str = "completed";

/// Point in the request lifecycle a notification refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    /// Before dispatch to the backend.
    Started,
    /// After the response, or failure, has been observed.
    Completed,
    /// Reserved; notifiers ignore it.
    Other(String),
}

impl From<&str> for RequestEvent {
    fn from(raw: &str) -> Self {
        match raw {
            EVENT_STARTED => Self::Started,
            EVENT_COMPLETED => Self::Completed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RequestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str(EVENT_STARTED),
            Self::Completed => f.write_str(EVENT_COMPLETED),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// One lifecycle notification for a single request.
#[derive(Debug, Clone)]
pub struct Notification<'a> {
    pub method: &'a str,
    /// Path actually dispatched to the backend.
    pub forwarded_url: &'a str,
    /// Path as received by the gateway.
    pub original_url: &'a str,
    pub status: u16,
    pub event: RequestEvent,
    pub duration: Duration,
}

/// Status reported with `Started` notifications, before any response exists.
pub const STATUS_PROCESSING: u16 = 102;

impl<'a> Notification<'a> {
    pub fn started(method: &'a str, forwarded_url: &'a str, original_url: &'a str) -> Self {
        Self {
            method,
            forwarded_url,
            original_url,
            status: STATUS_PROCESSING,
            event: RequestEvent::Started,
            duration: Duration::ZERO,
        }
    }

    pub fn completed(
        method: &'a str,
        forwarded_url: &'a str,
        original_url: &'a str,
        status: u16,
        duration: Duration,
    ) -> Self {
        Self {
            method,
            forwarded_url,
            original_url,
            status,
            event: RequestEvent::Completed,
            duration,
        }
    }
}

/// Callback invoked by the forwarding path at request boundaries.
///
/// There is no error channel: telemetry is best-effort and `notify`
/// returns once its side effects are done.
#[async_trait]
pub trait HttpNotifier: Send + Sync {
    async fn notify(&self, notification: &Notification<'_>);
}

#[async_trait]
impl<N: HttpNotifier + ?Sized> HttpNotifier for Arc<N> {
    async fn notify(&self, notification: &Notification<'_>) {
        (**self).notify(notification).await
    }
}

/// Runs several notifiers over the same request, in insertion order.
#[derive(Clone, Default)]
pub struct FanoutNotifier {
    notifiers: Vec<Arc<dyn HttpNotifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: impl HttpNotifier + 'static) -> Self {
        self.notifiers.push(Arc::new(notifier));
        self
    }

    pub fn push(&mut self, notifier: Arc<dyn HttpNotifier>) {
        self.notifiers.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl HttpNotifier for FanoutNotifier {
    async fn notify(&self, notification: &Notification<'_>) {
        for notifier in &self.notifiers {
            notifier.notify(notification).await;
        }
    }
}
