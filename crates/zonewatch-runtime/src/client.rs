//! UDS JSON-RPC client for CLI subcommands.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

pub(crate) async fn rpc_call(
    socket_path: &str,
    method: &str,
    params: serde_json::Value,
) -> anyhow::Result<serde_json::Value> {
    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot connect to daemon at {socket_path}: {e}"))?;

    let (reader, mut writer) = stream.into_split();

    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1,
    });
    let mut req = serde_json::to_string(&request)?;
    req.push('\n');
    writer.write_all(req.as_bytes()).await?;
    writer.shutdown().await?;

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let response: serde_json::Value = serde_json::from_str(line.trim())?;

    if let Some(error) = response.get("error") {
        anyhow::bail!("RPC error: {error}");
    }

    Ok(response["result"].clone())
}

/// `zonewatch status` — human-readable monitoring snapshot.
pub async fn cmd_status(socket_path: &str) -> anyhow::Result<()> {
    let snapshot = rpc_call(socket_path, "monitoring", serde_json::json!({})).await?;
    println!("{}", format_status(&snapshot));
    Ok(())
}

/// Pure formatting logic for status output, separated for testability.
pub(crate) fn format_status(snapshot: &serde_json::Value) -> String {
    let mut lines = Vec::new();

    let armed = snapshot["active"].as_bool().unwrap_or(false);
    lines.push(format!("system:   {}", if armed { "armed" } else { "disarmed" }));

    let alarm = snapshot["alarm_on"].as_bool().unwrap_or(false);
    lines.push(format!("alarm:    {}", if alarm { "ON" } else { "off" }));

    lines.push(format!(
        "zone:     {}",
        snapshot["zone"]
            .as_object()
            .map(|z| {
                format!(
                    "center {}, {} radius {}m",
                    z["center"]["lat"], z["center"]["lon"], z["radius_m"]
                )
            })
            .unwrap_or_else(|| "none".to_string())
    ));

    match (snapshot["latitude"].as_f64(), snapshot["longitude"].as_f64()) {
        (Some(lat), Some(lon)) => lines.push(format!("position: {lat}, {lon}")),
        _ => lines.push("position: unknown".to_string()),
    }

    lines.push(format!(
        "verdict:  {}",
        snapshot["statusZona"].as_str().unwrap_or("Tidak Diketahui")
    ));

    if let Some(waktu) = snapshot["waktu"].as_str() {
        lines.push(format!("seen:     {waktu}"));
    }

    lines.join("\n")
}

/// `zonewatch arm` — set the safe zone.
pub async fn cmd_arm(
    socket_path: &str,
    lat: Option<f64>,
    lon: Option<f64>,
    radius_m: Option<f64>,
) -> anyhow::Result<()> {
    let mut params = serde_json::json!({ "active": true });
    if let (Some(lat), Some(lon)) = (lat, lon) {
        params["lat"] = lat.into();
        params["lon"] = lon.into();
    }
    if let Some(radius) = radius_m {
        params["radius_m"] = radius.into();
    }

    let result = rpc_call(socket_path, "system_status", params).await?;
    let zone = &result["zone"];
    println!(
        "armed: center {}, {} radius {}m",
        zone["center"]["lat"], zone["center"]["lon"], zone["radius_m"]
    );
    Ok(())
}

/// `zonewatch disarm` — clear the safe zone.
pub async fn cmd_disarm(socket_path: &str) -> anyhow::Result<()> {
    rpc_call(
        socket_path,
        "system_status",
        serde_json::json!({ "active": false }),
    )
    .await?;
    println!("disarmed");
    Ok(())
}

/// `zonewatch alarm on|off` — operator alarm override.
pub async fn cmd_alarm(socket_path: &str, on: bool) -> anyhow::Result<()> {
    let result = rpc_call(socket_path, "alarm", serde_json::json!({ "on": on })).await?;
    let on = result["on"].as_bool().unwrap_or(on);
    println!("alarm {}", if on { "ON" } else { "off" });
    Ok(())
}

/// `zonewatch camera` — trigger a capture.
pub async fn cmd_camera(socket_path: &str) -> anyhow::Result<()> {
    rpc_call(socket_path, "trigger_camera", serde_json::json!({})).await?;
    println!("camera trigger sent");
    Ok(())
}

/// `zonewatch send` — inject a position update.
pub async fn cmd_send(
    socket_path: &str,
    lat: f64,
    lon: f64,
    alt_lat: Option<f64>,
    alt_lon: Option<f64>,
) -> anyhow::Result<()> {
    let mut params = serde_json::json!({ "lat_raw": lat, "lon_raw": lon });
    if let (Some(alat), Some(alon)) = (alt_lat, alt_lon) {
        params["lat_alt"] = alat.into();
        params["lon_alt"] = alon.into();
    }

    let snapshot = rpc_call(socket_path, "position_update", params).await?;
    println!(
        "sent; verdict: {}",
        snapshot["statusZona"].as_str().unwrap_or("Tidak Diketahui")
    );
    Ok(())
}
