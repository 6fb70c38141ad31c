//! CLI definition using clap derive.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "zonewatch", about = "real-time geofence monitor")]
pub struct Cli {
    /// UDS socket path (default: /tmp/zonewatch-$USER/zonewatchd.sock)
    #[arg(long, short = 's', global = true)]
    pub socket_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the daemon (position ingestion + UDS server)
    Daemon(DaemonOpts),
    /// Show the current monitoring snapshot
    Status,
    /// Stream live events (location/system/alarm/camera)
    Watch,
    /// Arm the system: set the safe zone
    Arm(ArmOpts),
    /// Disarm the system: clear the safe zone
    Disarm,
    /// Override the alarm state
    Alarm(AlarmOpts),
    /// Trigger a camera capture
    Camera,
    /// Inject a position update (device simulator / bridge testing)
    Send(SendOpts),
}

#[derive(clap::Args)]
pub struct DaemonOpts {
    /// CSV log file for sampled position records
    #[arg(long, default_value = "gps_log.csv")]
    pub log_file: PathBuf,

    /// Minimum seconds between CSV log records
    #[arg(long, default_value = "30")]
    pub log_interval_secs: i64,

    /// Webhook URL for chat-message breach/restore notifications
    #[arg(long, env = "ZONEWATCH_CHAT_WEBHOOK")]
    pub chat_webhook: Option<String>,

    /// Webhook URL for push breach/restore notifications
    #[arg(long, env = "ZONEWATCH_PUSH_WEBHOOK")]
    pub push_webhook: Option<String>,
}

#[derive(clap::Args)]
pub struct ArmOpts {
    /// Zone center latitude (omit to use the asset's last position)
    #[arg(long)]
    pub lat: Option<f64>,

    /// Zone center longitude (omit to use the asset's last position)
    #[arg(long)]
    pub lon: Option<f64>,

    /// Zone radius in meters (default 20)
    #[arg(long)]
    pub radius_m: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlarmValue {
    On,
    Off,
}

#[derive(clap::Args)]
pub struct AlarmOpts {
    /// Desired alarm state
    #[arg(value_enum)]
    pub state: AlarmValue,
}

#[derive(clap::Args)]
pub struct SendOpts {
    /// Raw latitude
    #[arg(long)]
    pub lat: f64,

    /// Raw longitude
    #[arg(long)]
    pub lon: f64,

    /// Filtered (alternate) latitude
    #[arg(long)]
    pub alt_lat: Option<f64>,

    /// Filtered (alternate) longitude
    #[arg(long)]
    pub alt_lon: Option<f64>,
}

/// Default socket path using $USER for per-user isolation.
pub fn default_socket_path() -> String {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return format!("{dir}/zonewatch/zonewatchd.sock");
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    format!("/tmp/zonewatch-{user}/zonewatchd.sock")
}
