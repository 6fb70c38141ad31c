//! Monitor: wires the engine, the fan-out hub, and the outbound
//! sinks, and runs the daemon.
//!
//! Engine state lives behind one async mutex: ingest, arm/disarm,
//! and alarm overrides are serialized critical sections. Hub
//! publication is enqueue-only and happens after the engine lock is
//! released; notification and log sink calls run on `spawn_blocking`
//! tasks, fire-and-forget. A sink failure is logged and dropped;
//! the state transition that produced it stands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use zonewatch_core::{Coordinate, PositionUpdate, ZoneError};
use zonewatch_engine::{
    Engine, EngineEvent, LocationPayload, LogSink, MonitoringSnapshot, NotificationRequest,
    NotificationSink, SystemStatus,
};
use zonewatch_hub::{EventHub, SubscriberHandle, Subscription};

use crate::cli::DaemonOpts;
use crate::csv_log::CsvLogSink;
use crate::notify::{ChatNotifier, PushNotifier, TraceNotifier};
use crate::server;

/// Shared monitor: the daemon's top-level object.
pub struct Monitor {
    engine: Mutex<Engine>,
    hub: EventHub<EngineEvent>,
    notifiers: Vec<Arc<dyn NotificationSink>>,
    log_sink: Option<Arc<dyn LogSink>>,
}

impl Monitor {
    pub fn new(
        engine: Engine,
        notifiers: Vec<Arc<dyn NotificationSink>>,
        log_sink: Option<Arc<dyn LogSink>>,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            hub: EventHub::new(),
            notifiers,
            log_sink,
        }
    }

    /// Ingest one position update from the transport collaborator.
    ///
    /// Always returns the resulting snapshot; never fails.
    pub async fn on_position_update(
        &self,
        update: PositionUpdate,
        now: DateTime<Utc>,
    ) -> LocationPayload {
        let outcome = {
            let mut engine = self.engine.lock().await;
            engine.ingest(update, now)
        };

        self.hub.publish(EngineEvent::Location(outcome.snapshot));
        if let Some(on) = outcome.alarm {
            self.hub.publish(EngineEvent::Alarm { on });
        }
        if let Some(request) = outcome.notification {
            self.dispatch_notification(request);
        }
        if let Some(record) = outcome.log_record {
            self.dispatch_log(record);
        }

        outcome.snapshot
    }

    /// Arm or disarm; rejected commands mutate nothing and publish
    /// nothing.
    pub async fn on_system_command(
        &self,
        active: bool,
        center: Option<Coordinate>,
        radius_m: Option<f64>,
    ) -> Result<SystemStatus, ZoneError> {
        let status = {
            let mut engine = self.engine.lock().await;
            engine.on_system_command(active, center, radius_m)?
        };
        self.hub.publish(EngineEvent::System {
            active: status.active,
        });
        Ok(status)
    }

    /// Explicit alarm override; always announced on the hub.
    pub async fn on_alarm_command(&self, on: bool, now: DateTime<Utc>) -> bool {
        let on = {
            let mut engine = self.engine.lock().await;
            engine.set_alarm(on, now)
        };
        self.hub.publish(EngineEvent::Alarm { on });
        on
    }

    pub fn trigger_camera(&self) {
        self.hub.publish(EngineEvent::Camera { capture: true });
    }

    pub async fn monitoring(&self) -> MonitoringSnapshot {
        self.engine.lock().await.monitoring()
    }

    pub fn subscribe(&self) -> Subscription<EngineEvent> {
        self.hub.subscribe()
    }

    pub fn unsubscribe(&self, handle: SubscriberHandle) {
        self.hub.unsubscribe(handle);
    }

    fn dispatch_notification(&self, request: NotificationRequest) {
        let sinks = self.notifiers.clone();
        tokio::task::spawn_blocking(move || {
            for sink in &sinks {
                if let Err(e) = request.dispatch(sink.as_ref()) {
                    tracing::warn!("notification dispatch failed: {e}");
                }
            }
        });
    }

    fn dispatch_log(&self, record: LocationPayload) {
        let Some(sink) = self.log_sink.clone() else {
            return;
        };
        tokio::task::spawn_blocking(move || {
            if let Err(e) = sink.record(&record) {
                tracing::warn!("log sink append failed: {e}");
            }
        });
    }
}

/// Build the monitor from daemon options and run until shutdown.
pub async fn run_daemon(opts: DaemonOpts, socket_path: &str) -> anyhow::Result<()> {
    let mut notifiers: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(TraceNotifier)];
    if let Some(url) = &opts.chat_webhook {
        notifiers.push(Arc::new(ChatNotifier::new(url.clone())?));
    } else {
        tracing::warn!("no chat webhook configured - chat notifications disabled");
    }
    if let Some(url) = &opts.push_webhook {
        notifiers.push(Arc::new(PushNotifier::new(url.clone())?));
    } else {
        tracing::warn!("no push webhook configured - push notifications disabled");
    }

    let log_sink: Arc<dyn LogSink> = Arc::new(CsvLogSink::new(opts.log_file.clone()));
    let engine =
        Engine::with_log_policy(zonewatch_engine::LogPolicy::new(opts.log_interval_secs));
    let monitor = Arc::new(Monitor::new(engine, notifiers, Some(log_sink)));

    // Start UDS server
    let server_monitor = Arc::clone(&monitor);
    let server_socket = socket_path.to_string();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::run_server(&server_socket, server_monitor).await {
            tracing::error!("UDS server error: {e}");
        }
    });

    // Wait for shutdown signal (ctrl-c or SIGTERM)
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
                _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
            tracing::info!("received ctrl-c, shutting down");
        }
    };

    tokio::select! {
        () = shutdown => {}
        _ = server_handle => {
            tracing::warn!("server exited unexpectedly");
        }
    }

    // Cleanup socket
    let _ = std::fs::remove_file(socket_path);
    tracing::info!("daemon stopped");
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use zonewatch_engine::SinkError;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid RFC3339")
            .with_timezone(&Utc)
    }

    fn t0() -> DateTime<Utc> {
        ts("2026-03-01T08:00:00Z")
    }

    const CENTER: (f64, f64) = (-6.2, 106.816);

    fn north_of_center(meters: f64) -> Coordinate {
        Coordinate::new(CENTER.0 + meters / 111_194.9, CENTER.1)
    }

    fn update_at(position: Coordinate, at: DateTime<Utc>) -> PositionUpdate {
        PositionUpdate {
            primary: Some(position),
            alternate: None,
            timestamp: at,
        }
    }

    /// Sink that reports every call on a channel.
    struct ChannelSink {
        tx: mpsc::UnboundedSender<&'static str>,
    }

    impl NotificationSink for ChannelSink {
        fn notify_zone_breach(
            &self,
            _position: Option<Coordinate>,
            _at: DateTime<Utc>,
        ) -> Result<(), SinkError> {
            let _ = self.tx.send("breach");
            Ok(())
        }

        fn notify_zone_restored(
            &self,
            _position: Option<Coordinate>,
            _at: DateTime<Utc>,
        ) -> Result<(), SinkError> {
            let _ = self.tx.send("restored");
            Ok(())
        }
    }

    /// Sink that blocks for a long time, then fails.
    struct StuckSink;

    impl NotificationSink for StuckSink {
        fn notify_zone_breach(
            &self,
            _position: Option<Coordinate>,
            _at: DateTime<Utc>,
        ) -> Result<(), SinkError> {
            std::thread::sleep(Duration::from_secs(2));
            Err(SinkError::Dispatch("stuck".into()))
        }

        fn notify_zone_restored(
            &self,
            _position: Option<Coordinate>,
            _at: DateTime<Utc>,
        ) -> Result<(), SinkError> {
            std::thread::sleep(Duration::from_secs(2));
            Err(SinkError::Dispatch("stuck".into()))
        }
    }

    fn monitor_with_sinks(
        notifiers: Vec<Arc<dyn NotificationSink>>,
    ) -> Monitor {
        Monitor::new(Engine::new(), notifiers, None)
    }

    async fn armed_monitor(notifiers: Vec<Arc<dyn NotificationSink>>) -> Monitor {
        let monitor = monitor_with_sinks(notifiers);
        monitor
            .on_system_command(true, Some(Coordinate::new(CENTER.0, CENTER.1)), None)
            .await
            .expect("arm");
        monitor
    }

    #[tokio::test]
    async fn location_event_published_on_every_update() {
        let monitor = armed_monitor(vec![]).await;
        let mut sub = monitor.subscribe();

        monitor
            .on_position_update(update_at(north_of_center(5.0), t0()), t0())
            .await;

        let event = sub.events.recv().await.expect("event");
        match event {
            EngineEvent::Location(payload) => {
                assert_eq!(payload.status_zona.as_str(), "Aman");
            }
            other => panic!("expected location, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn breach_publishes_location_then_alarm() {
        let monitor = armed_monitor(vec![]).await;
        // Establish Inside first so the breach is a real edge.
        monitor
            .on_position_update(update_at(north_of_center(5.0), t0()), t0())
            .await;

        let mut sub = monitor.subscribe();
        monitor
            .on_position_update(update_at(north_of_center(35.0), t0()), t0())
            .await;

        let first = sub.events.recv().await.expect("location");
        assert!(matches!(first, EngineEvent::Location(_)));
        let second = sub.events.recv().await.expect("alarm");
        assert_eq!(second, EngineEvent::Alarm { on: true });
    }

    #[tokio::test]
    async fn breach_notifies_each_sink_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let monitor = armed_monitor(vec![Arc::new(ChannelSink { tx })]).await;

        monitor
            .on_position_update(update_at(north_of_center(35.0), t0()), t0())
            .await;

        let call = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("notification within bound")
            .expect("one call");
        assert_eq!(call, "breach");

        // Loitering outside must stay silent.
        monitor
            .on_position_update(update_at(north_of_center(36.0), t0()), t0())
            .await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err(), "no repeat notification");
    }

    #[tokio::test]
    async fn stuck_sink_does_not_block_ingestion() {
        let monitor = armed_monitor(vec![Arc::new(StuckSink)]).await;

        let started = std::time::Instant::now();
        monitor
            .on_position_update(update_at(north_of_center(35.0), t0()), t0())
            .await;
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "ingest must not wait on the sink"
        );
        assert!(monitor.monitoring().await.alarm_on, "transition committed");
    }

    #[tokio::test]
    async fn alarm_override_announced_both_times() {
        let monitor = monitor_with_sinks(vec![]);
        let mut sub = monitor.subscribe();

        monitor.on_alarm_command(true, t0()).await;
        monitor.on_alarm_command(true, t0()).await;

        assert_eq!(
            sub.events.recv().await,
            Some(EngineEvent::Alarm { on: true })
        );
        assert_eq!(
            sub.events.recv().await,
            Some(EngineEvent::Alarm { on: true }),
            "second identical override still announced"
        );
    }

    #[tokio::test]
    async fn system_events_on_arm_and_disarm() {
        let monitor = monitor_with_sinks(vec![]);
        let mut sub = monitor.subscribe();

        monitor
            .on_system_command(true, Some(Coordinate::new(1.0, 2.0)), None)
            .await
            .expect("arm");
        monitor
            .on_system_command(false, None, None)
            .await
            .expect("disarm");

        assert_eq!(
            sub.events.recv().await,
            Some(EngineEvent::System { active: true })
        );
        assert_eq!(
            sub.events.recv().await,
            Some(EngineEvent::System { active: false })
        );
    }

    #[tokio::test]
    async fn rejected_arm_publishes_nothing() {
        let monitor = monitor_with_sinks(vec![]);
        let mut sub = monitor.subscribe();

        let err = monitor.on_system_command(true, None, None).await;
        assert!(err.is_err());
        assert!(sub.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn camera_trigger_fans_out() {
        let monitor = monitor_with_sinks(vec![]);
        let mut sub = monitor.subscribe();

        monitor.trigger_camera();
        assert_eq!(
            sub.events.recv().await,
            Some(EngineEvent::Camera { capture: true })
        );
    }
}
