//! zonewatch: real-time geofence monitor binary.
//! Single-process daemon embedding the engine, fan-out hub, and
//! collaborator sinks, plus the one-shot CLI commands that talk to it.

use clap::Parser;

mod cli;
mod client;
mod cmd_watch;
mod csv_log;
mod monitor;
mod notify;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let socket_path = args.socket_path.unwrap_or_else(cli::default_socket_path);

    match args.command {
        cli::Command::Daemon(opts) => {
            let filter = std::env::var("ZONEWATCH_LOG")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string());
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
                .init();

            tracing::info!("zonewatch daemon starting");

            monitor::run_daemon(opts, &socket_path).await?;
        }
        cli::Command::Status => {
            client::cmd_status(&socket_path).await?;
        }
        cli::Command::Watch => {
            cmd_watch::cmd_watch(&socket_path).await?;
        }
        cli::Command::Arm(opts) => {
            client::cmd_arm(&socket_path, opts.lat, opts.lon, opts.radius_m).await?;
        }
        cli::Command::Disarm => {
            client::cmd_disarm(&socket_path).await?;
        }
        cli::Command::Alarm(opts) => {
            client::cmd_alarm(&socket_path, opts.state == cli::AlarmValue::On).await?;
        }
        cli::Command::Camera => {
            client::cmd_camera(&socket_path).await?;
        }
        cli::Command::Send(opts) => {
            client::cmd_send(&socket_path, opts.lat, opts.lon, opts.alt_lat, opts.alt_lon).await?;
        }
    }

    Ok(())
}
