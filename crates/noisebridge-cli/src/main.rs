//! Command-line frontend for the noisebridge MQTT media-player bridge.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use noisebridge::{
    BridgeConfig, BridgeEvent, CommandKind, MediaBridge, MqttConfig, MqttTransport, PlayerView,
};

/// Bridge a noisemusicsystem device to the local console.
#[derive(Parser, Debug)]
#[command(name = "noisebridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Device identifier (the device's topic segment).
    #[arg(short, long)]
    device: String,

    /// MQTT broker host.
    #[arg(long, default_value = "localhost")]
    broker: String,

    /// MQTT broker port.
    #[arg(long, default_value_t = 1883)]
    port: u16,

    /// MQTT username.
    #[arg(long)]
    username: Option<String>,

    /// MQTT password.
    #[arg(long)]
    password: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Action to perform.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to the broker and print state changes as they arrive.
    Watch {
        /// Print the resolved position every N seconds (0 disables).
        #[arg(long, default_value_t = 5)]
        poll: u64,
    },
    /// Send a single playback command and exit.
    Send {
        /// Command kind: next, previous, play, pause, stop, mute, repeat, seek, volume.
        kind: String,
        /// Command parameter (seek seconds, volume level, mute true/false).
        parameter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = MqttConfig::new(args.broker.clone()).with_port(args.port);
    if let (Some(user), Some(pass)) = (&args.username, &args.password) {
        config = config.with_auth(user.clone(), pass.clone());
    }

    let bridge = Arc::new(MediaBridge::new(BridgeConfig::new(
        args.device.clone(),
        args.device.clone(),
    )));

    match args.command {
        Command::Watch { poll } => watch(&config, bridge, poll).await,
        Command::Send { kind, parameter } => send(&config, bridge, &kind, parameter.as_deref()).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "noisebridge=debug"
    } else {
        "noisebridge=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let json_logging = std::env::var("NOISEBRIDGE_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    }
}

async fn watch(config: &MqttConfig, bridge: Arc<MediaBridge>, poll: u64) -> Result<()> {
    let transport = MqttTransport::start(config, bridge.clone())
        .await
        .context("failed to start MQTT transport")?;

    println!(
        "watching {} via {} (ctrl-c to stop)",
        bridge.device_id(),
        config.broker_addr()
    );

    let mut events = bridge.subscribe_events();
    let mut ticker = (poll > 0).then(|| tokio::time::interval(Duration::from_secs(poll)));

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(BridgeEvent::AvailabilityChanged(availability)) => {
                    println!("availability: {availability:?}");
                }
                Ok(BridgeEvent::StateChanged(_)) => {
                    print_view(&bridge.current_view());
                }
                Err(RecvError::Lagged(n)) => warn!("dropped {n} bridge events"),
                Err(RecvError::Closed) => break,
            },
            _ = tick(ticker.as_mut()), if ticker.is_some() => {
                let view = bridge.current_view();
                if view.is_available() {
                    println!(
                        "position: {}s / {}s",
                        view.position_secs, view.state.duration_secs
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    transport.stop().await;
    Ok(())
}

async fn tick(ticker: Option<&mut tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        // Branch is disabled by the select guard; never resolve.
        None => std::future::pending::<()>().await,
    }
}

async fn send(
    config: &MqttConfig,
    bridge: Arc<MediaBridge>,
    kind: &str,
    parameter: Option<&str>,
) -> Result<()> {
    let kind: CommandKind = kind.parse().map_err(|e| anyhow::anyhow!("{e}"))?;

    let transport = MqttTransport::start(config, bridge.clone())
        .await
        .context("failed to start MQTT transport")?;

    bridge.issue_command(kind, parameter).await?;
    println!("sent '{kind}' to {}", bridge.device_id());

    // Give the client a beat to flush the publish before disconnecting.
    tokio::time::sleep(Duration::from_millis(200)).await;
    transport.stop().await;
    Ok(())
}

fn print_view(view: &PlayerView) {
    let state = &view.state;
    let muted = if state.muted { " [muted]" } else { "" };
    println!(
        "{:?}: {} - {} ({}) #{} {}s/{}s vol {}{}",
        state.play_state,
        state.artist,
        state.track_name,
        state.album,
        state.track_number,
        view.position_secs,
        state.duration_secs,
        state.volume,
        muted,
    );
}
