//! Notification sink implementations.
//!
//! All of them are best-effort: a failed delivery is reported to the
//! caller (who logs and drops it) and is never retried here. The
//! webhook sinks block on HTTP and are always invoked from
//! `spawn_blocking` context.

use std::time::Duration;

use chrono::{DateTime, Utc};

use zonewatch_core::Coordinate;
use zonewatch_engine::{NotificationSink, SinkError};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn format_position(position: Option<Coordinate>) -> String {
    match position {
        Some(c) => c.to_string(),
        None => "unknown".to_string(),
    }
}

pub(crate) fn breach_message(position: Option<Coordinate>, at: DateTime<Utc>) -> String {
    format!(
        "Asset left the safe zone. Location: {}. Time: {}",
        format_position(position),
        at.to_rfc3339()
    )
}

pub(crate) fn restore_message(position: Option<Coordinate>, at: DateTime<Utc>) -> String {
    format!(
        "Asset returned to the safe zone. Location: {}. Time: {}",
        format_position(position),
        at.to_rfc3339()
    )
}

// ─── Trace Notifier ───────────────────────────────────────────────

/// Fallback sink that records transitions in the daemon log. Always
/// installed, so a transition is observable even with no webhooks
/// configured.
pub struct TraceNotifier;

impl NotificationSink for TraceNotifier {
    fn notify_zone_breach(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        tracing::warn!("ZONE BREACH: {}", breach_message(position, at));
        Ok(())
    }

    fn notify_zone_restored(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        tracing::info!("zone restored: {}", restore_message(position, at));
        Ok(())
    }
}

// ─── Chat Notifier ────────────────────────────────────────────────

/// Chat-message channel: POSTs `{"text": "..."}` to a webhook
/// (Telegram-bot relay, Slack webhook, or similar).
pub struct ChatNotifier {
    client: reqwest::blocking::Client,
    webhook_url: String,
}

impl ChatNotifier {
    pub fn new(webhook_url: String) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    fn post_text(&self, text: String) -> Result<(), SinkError> {
        self.client
            .post(&self.webhook_url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| SinkError::Dispatch(e.to_string()))?;
        Ok(())
    }
}

impl NotificationSink for ChatNotifier {
    fn notify_zone_breach(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        self.post_text(breach_message(position, at))
    }

    fn notify_zone_restored(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        self.post_text(restore_message(position, at))
    }
}

// ─── Push Notifier ────────────────────────────────────────────────

/// Push channel: POSTs a structured alert (title/body/coordinates)
/// for a mobile push relay to fan out.
pub struct PushNotifier {
    client: reqwest::blocking::Client,
    webhook_url: String,
}

impl PushNotifier {
    pub fn new(webhook_url: String) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    fn post_alert(
        &self,
        title: &str,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        let body = serde_json::json!({
            "title": title,
            "body": format!("Asset at {}", format_position(position)),
            "lat": position.map(|c| c.lat),
            "lon": position.map(|c| c.lon),
            "at": at.to_rfc3339(),
        });
        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| SinkError::Dispatch(e.to_string()))?;
        Ok(())
    }
}

impl NotificationSink for PushNotifier {
    fn notify_zone_breach(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        self.post_alert("Asset left the safe zone", position, at)
    }

    fn notify_zone_restored(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        self.post_alert("Asset back in the safe zone", position, at)
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
            .expect("valid RFC3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn breach_message_includes_location_and_time() {
        let msg = breach_message(Some(Coordinate::new(-6.2, 106.816)), at());
        assert!(msg.contains("left the safe zone"));
        assert!(msg.contains("-6.2, 106.816"));
        assert!(msg.contains("2026-03-01T08:00:00"));
    }

    #[test]
    fn restore_message_handles_unknown_position() {
        let msg = restore_message(None, at());
        assert!(msg.contains("returned to the safe zone"));
        assert!(msg.contains("unknown"));
    }

    #[test]
    fn trace_notifier_never_fails() {
        let sink = TraceNotifier;
        assert!(sink.notify_zone_breach(None, at()).is_ok());
        assert!(sink.notify_zone_restored(None, at()).is_ok());
    }

    #[test]
    fn chat_notifier_reports_unreachable_webhook() {
        // Port 9 (discard) is not listening; delivery must fail
        // gracefully with a Dispatch error, not panic.
        let sink =
            ChatNotifier::new("http://127.0.0.1:9/webhook".to_string()).expect("build client");
        let err = sink
            .notify_zone_breach(Some(Coordinate::new(1.0, 2.0)), at())
            .unwrap_err();
        assert!(matches!(err, SinkError::Dispatch(_)));
    }
}
