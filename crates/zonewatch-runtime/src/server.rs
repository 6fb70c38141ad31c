//! UDS JSON-RPC server: minimal hand-rolled implementation.
//! Newline-delimited JSON, one request per connection, except
//! `subscribe`, which holds the connection open and streams hub
//! events as notification frames.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::net::unix::OwnedWriteHalf;

use zonewatch_core::{Coordinate, PositionUpdate};
use zonewatch_engine::EngineEvent;

use crate::monitor::Monitor;

/// Run the UDS JSON-RPC server.
pub async fn run_server(socket_path: &str, monitor: Arc<Monitor>) -> anyhow::Result<()> {
    // Create socket directory with mode 0700
    let socket_dir = std::path::Path::new(socket_path)
        .parent()
        .ok_or_else(|| anyhow::anyhow!("invalid socket path"))?;

    std::fs::create_dir_all(socket_dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(socket_dir, std::fs::Permissions::from_mode(0o700))?;
    }

    // Check for stale socket
    if std::path::Path::new(socket_path).exists() {
        if tokio::net::UnixStream::connect(socket_path).await.is_err() {
            std::fs::remove_file(socket_path)?;
            tracing::info!("removed stale socket at {socket_path}");
        } else {
            anyhow::bail!("another daemon is already running at {socket_path}");
        }
    }

    let listener = UnixListener::bind(socket_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!("UDS server listening on {socket_path}");

    loop {
        let (stream, _) = listener.accept().await?;
        let monitor = Arc::clone(&monitor);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, monitor).await {
                tracing::debug!("connection error: {e}");
            }
        });
    }
}

async fn handle_connection(
    stream: tokio::net::UnixStream,
    monitor: Arc<Monitor>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let request: serde_json::Value = serde_json::from_str(line.trim())?;
    let method = request["method"].as_str().unwrap_or("");
    let id = request["id"].clone();
    let params = request["params"].clone();

    if method == "subscribe" {
        return stream_events(reader, writer, monitor, id).await;
    }

    let result = match method {
        "monitoring" => serde_json::to_value(monitor.monitoring().await)?,
        "position_update" => {
            let now = Utc::now();
            let update = parse_position_update(&params, now);
            let snapshot = monitor.on_position_update(update, now).await;
            serde_json::to_value(snapshot)?
        }
        "system_status" => {
            let Some(active) = params["active"].as_bool() else {
                return write_error(&mut writer, id, -32602, "missing required param: active")
                    .await;
            };
            let center = parse_center(&params);
            let radius_m = parse_f64(&params["radius_m"]);
            match monitor.on_system_command(active, center, radius_m).await {
                Ok(status) => serde_json::to_value(status)?,
                Err(e) => {
                    return write_error(&mut writer, id, -32602, &e.to_string()).await;
                }
            }
        }
        "alarm" => {
            let Some(on) = params["on"].as_bool() else {
                return write_error(&mut writer, id, -32602, "\"on\" must be a boolean").await;
            };
            let on = monitor.on_alarm_command(on, Utc::now()).await;
            serde_json::json!({ "on": on })
        }
        "trigger_camera" => {
            monitor.trigger_camera();
            serde_json::json!({ "triggered": true })
        }
        _ => {
            return write_error(&mut writer, id, -32601, &format!("method not found: {method}"))
                .await;
        }
    };

    let response = serde_json::json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": id,
    });
    write_line(&mut writer, &response).await
}

/// Serve a `subscribe` connection: ack, hello, then forward hub
/// events until the client disconnects or a write fails. The
/// subscription is removed on the way out.
async fn stream_events(
    mut reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    mut writer: OwnedWriteHalf,
    monitor: Arc<Monitor>,
    id: serde_json::Value,
) -> anyhow::Result<()> {
    let mut sub = monitor.subscribe();

    let ack = serde_json::json!({
        "jsonrpc": "2.0",
        "result": { "subscribed": true },
        "id": id,
    });
    write_line(&mut writer, &ack).await?;

    let hello = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "hello",
        "params": { "connected": true },
    });
    write_line(&mut writer, &hello).await?;

    let mut drain = String::new();
    loop {
        tokio::select! {
            event = sub.events.recv() => {
                let Some(event) = event else { break };
                let frame = notification_frame(&event);
                if write_line(&mut writer, &frame).await.is_err() {
                    tracing::debug!("subscriber write failed, dropping");
                    break;
                }
            }
            read = reader.read_line(&mut drain) => {
                match read {
                    // EOF or read error: client is gone.
                    Ok(0) | Err(_) => break,
                    Ok(_) => drain.clear(),
                }
            }
        }
    }

    monitor.unsubscribe(sub.handle);
    Ok(())
}

/// Wrap an engine event as a notification frame:
/// `{"jsonrpc":"2.0","method":"<event name>","params":{...}}`.
pub(crate) fn notification_frame(event: &EngineEvent) -> serde_json::Value {
    let tagged = serde_json::to_value(event).unwrap_or_default();
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": event.name(),
        "params": tagged["data"],
    })
}

async fn write_line(writer: &mut OwnedWriteHalf, value: &serde_json::Value) -> anyhow::Result<()> {
    let mut text = serde_json::to_string(value)?;
    text.push('\n');
    writer.write_all(text.as_bytes()).await?;
    Ok(())
}

async fn write_error(
    writer: &mut OwnedWriteHalf,
    id: serde_json::Value,
    code: i64,
    message: &str,
) -> anyhow::Result<()> {
    let response = serde_json::json!({
        "jsonrpc": "2.0",
        "error": { "code": code, "message": message },
        "id": id,
    });
    write_line(writer, &response).await
}

// ─── Param parsing ────────────────────────────────────────────────

/// Tolerant numeric field: accepts JSON numbers and numeric strings
/// (tracker firmware sends both); anything else is absent.
pub(crate) fn parse_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Decode a `position_update` request body. Unusable coordinates
/// become absent rather than errors; a missing/invalid `waktu`
/// falls back to the receive time.
pub(crate) fn parse_position_update(
    params: &serde_json::Value,
    received_at: DateTime<Utc>,
) -> PositionUpdate {
    let lat_raw = parse_f64(&params["lat_raw"]).or_else(|| parse_f64(&params["latitude"]));
    let lon_raw = parse_f64(&params["lon_raw"]).or_else(|| parse_f64(&params["longitude"]));
    let lat_alt = parse_f64(&params["lat_alt"]);
    let lon_alt = parse_f64(&params["lon_alt"]);

    let timestamp = params["waktu"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(received_at);

    PositionUpdate {
        primary: lat_raw
            .zip(lon_raw)
            .and_then(|(lat, lon)| Coordinate::finite(lat, lon)),
        alternate: lat_alt
            .zip(lon_alt)
            .and_then(|(lat, lon)| Coordinate::finite(lat, lon)),
        timestamp,
    }
}

/// Zone center from a `system_status` request, if usable.
pub(crate) fn parse_center(params: &serde_json::Value) -> Option<Coordinate> {
    parse_f64(&params["lat"])
        .zip(parse_f64(&params["lon"]))
        .and_then(|(lat, lon)| Coordinate::finite(lat, lon))
}

// ─── Tests ────────────────────────────────────────────────────────
