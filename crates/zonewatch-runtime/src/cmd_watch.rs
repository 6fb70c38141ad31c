//! `zonewatch watch` — stream live events to the terminal.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Entry point for `zonewatch watch`. Subscribes to the daemon's
/// event stream and prints one line per event until ctrl-c.
pub async fn cmd_watch(socket_path: &str) -> anyhow::Result<()> {
    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot connect to daemon at {socket_path}: {e}"))?;

    let (reader, mut writer) = stream.into_split();

    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "subscribe",
        "params": {},
        "id": 1,
    });
    let mut req = serde_json::to_string(&request)?;
    req.push('\n');
    writer.write_all(req.as_bytes()).await?;

    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        tokio::select! {
            read = reader.read_line(&mut line) => {
                if read? == 0 {
                    println!("daemon closed the stream");
                    break;
                }
                let frame: serde_json::Value = match serde_json::from_str(line.trim()) {
                    Ok(v) => v,
                    Err(_) => continue,
                };
                if let Some(text) = format_frame(&frame) {
                    println!("{text}");
                }
            }
            _ = tokio::signal::ctrl_c() => { break; }
        }
    }

    Ok(())
}

/// One-line rendering of a stream frame; `None` for frames that are
/// not events (the subscribe ack).
pub(crate) fn format_frame(frame: &serde_json::Value) -> Option<String> {
    let method = frame["method"].as_str()?;
    let params = &frame["params"];
    let text = match method {
        "hello" => "connected".to_string(),
        "location" => format!(
            "location  {} {}  [{}]  {}",
            params["lat_raw"],
            params["lon_raw"],
            params["statusZona"].as_str().unwrap_or("?"),
            params["waktu"].as_str().unwrap_or("")
        ),
        "alarm" => format!(
            "alarm     {}",
            if params["on"].as_bool().unwrap_or(false) {
                "ON"
            } else {
                "off"
            }
        ),
        "system" => format!(
            "system    {}",
            if params["active"].as_bool().unwrap_or(false) {
                "armed"
            } else {
                "disarmed"
            }
        ),
        "camera" => "camera    capture".to_string(),
        other => format!("{other}   {params}"),
    };
    Some(text)
}
