// Logging notifier
// Emits one human-readable line per completed request
//
// Numan Thabit 2025 Nov

use super::{HttpNotifier, Notification, RequestEvent};
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

/// Render the request line, or `None` for anything but a completed event.
pub fn forwarded_line(n: &Notification<'_>) -> Option<String> {
    if n.event != RequestEvent::Completed {
        return None;
    }
    Some(format!(
        "Forwarded [{}] to {} - [{}] - {:.6}s seconds",
        n.method,
        n.original_url,
        n.status,
        n.duration.as_secs_f64()
    ))
}

#[async_trait]
impl HttpNotifier for LoggingNotifier {
    async fn notify(&self, n: &Notification<'_>) {
        if let Some(line) = forwarded_line(n) {
            info!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[test]
    fn formats_completed_requests() {
        let n = Notification::completed("GET", "/x", "/x", 500, Duration::from_millis(1250));
        assert_eq!(
            forwarded_line(&n).as_deref(),
            Some("Forwarded [GET] to /x - [500] - 1.250000s seconds")
        );
    }

    #[test]
    fn uses_original_url() {
        let n = Notification::completed(
            "POST",
            "/",
            "/function/echo?q=1",
            200,
            Duration::from_micros(1500),
        );
        assert_eq!(
            forwarded_line(&n).as_deref(),
            Some("Forwarded [POST] to /function/echo?q=1 - [200] - 0.001500s seconds")
        );
    }

    #[test]
    fn other_events_are_silent() {
        let started = Notification::started("GET", "/x", "/x");
        assert!(forwarded_line(&started).is_none());

        let mut other = Notification::completed("GET", "/x", "/x", 200, Duration::ZERO);
        other.event = RequestEvent::Other("retry".into());
        assert!(forwarded_line(&other).is_none());
    }

    #[tokio::test]
    #[traced_test]
    async fn completed_request_logs_exactly_one_line() {
        let notifier = LoggingNotifier::new();
        notifier
            .notify(&Notification::started("GET", "/function/echo", "/function/echo"))
            .await;
        notifier
            .notify(&Notification::completed(
                "GET",
                "/function/echo",
                "/function/echo?x=1",
                200,
                Duration::from_millis(5),
            ))
            .await;

        assert!(logs_contain(
            "Forwarded [GET] to /function/echo?x=1 - [200] - 0.005000s seconds"
        ));
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains("Forwarded [")).count() {
                1 => Ok(()),
                n => Err(format!("expected one forwarded line, got {n}")),
            }
        });
    }

    #[tokio::test]
    #[traced_test]
    async fn started_request_logs_nothing() {
        LoggingNotifier::new()
            .notify(&Notification::started("POST", "/system/functions", "/system/functions"))
            .await;

        assert!(!logs_contain("Forwarded ["));
    }
}
