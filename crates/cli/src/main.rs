//! bellbot — intercom doorbell bot.
//!
//! Invoked by the Asterisk dial-plan once per intercom call, with the path
//! of the recorded voice message as the only positional argument. The exit
//! status tells the dial-plan how the session ended (see
//! `bellbot_session::ExitStatus`).

use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    clap::Parser,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    bellbot_config::BellbotConfig,
    bellbot_session::{DoorGateway, ExitStatus, NoopDoorGateway, NotificationChannel, Orchestrator},
    bellbot_telegram::TelegramChannel,
};

#[derive(Parser)]
#[command(name = "bellbot", about = "Intercom doorbell bot — forwards door calls to Telegram")]
struct Cli {
    /// Path to the recorded voice message left at the intercom.
    recording: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Config file path (default: discover bellbot.{toml,json}).
    #[arg(long, env = "BELLBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the operator response window, in seconds.
    #[arg(long)]
    window_secs: Option<u64>,

    /// Force the no-op door gateway even inside a live call (dry run).
    #[arg(long, default_value_t = false)]
    no_call: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Pick the door gateway for this invocation. Running outside a live call
/// (or with `--no-call`) is a valid configuration, not an error.
fn build_gateway(config: &BellbotConfig, no_call: bool) -> anyhow::Result<Arc<dyn DoorGateway>> {
    let live = config
        .agi
        .enabled
        .unwrap_or_else(bellbot_agi::call_context_present);

    if no_call || !live {
        info!("no live call context; door gateway disabled");
        return Ok(Arc::new(NoopDoorGateway));
    }

    let mut conn = bellbot_agi::accept_stdio()?;
    conn.verbose("bellbot agi session started")?;
    Ok(Arc::new(bellbot_agi::AgiGateway::new(conn)))
}

/// Stop the decision wait when the host tears the call down (SIGHUP).
#[cfg(unix)]
fn install_hangup_watcher(channel: &Arc<TelegramChannel>) {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::hangup()) {
        Ok(mut hangup) => {
            let channel = Arc::clone(channel);
            tokio::spawn(async move {
                if hangup.recv().await.is_some() {
                    warn!("call torn down by host (SIGHUP); stopping listener");
                    channel.stop_listening();
                }
            });
        },
        Err(e) => warn!(error = %e, "failed to install SIGHUP watcher"),
    }
}

#[cfg(not(unix))]
fn install_hangup_watcher(_channel: &Arc<TelegramChannel>) {}

async fn run(cli: Cli) -> i32 {
    let config = match bellbot_config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load config");
            return ExitStatus::UnknownError.code();
        },
    };

    let channel = match TelegramChannel::connect(&config.telegram).await {
        Ok(channel) => Arc::new(channel),
        Err(e) => {
            error!(error = %e, "failed to connect telegram bot");
            return ExitStatus::UnknownError.code();
        },
    };

    let gateway = match build_gateway(&config, cli.no_call) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(error = %e, "failed to accept agi session");
            return ExitStatus::UnknownError.code();
        },
    };

    install_hangup_watcher(&channel);

    let window = Duration::from_secs(
        cli.window_secs
            .unwrap_or(config.session.response_window_secs),
    );

    let mut orchestrator = Orchestrator::new(channel, gateway, window);
    match orchestrator.run(&cli.recording).await {
        Ok(report) => {
            let status = report.exit_status();
            info!(decision = ?report.decision, code = status.code(), "session complete");
            status.code()
        },
        Err(e) => {
            let status = ExitStatus::from(&e);
            error!(error = %e, code = status.code(), "session failed");
            status.code()
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_telemetry(&cli);

    let code = run(cli).await;
    std::process::exit(code);
}
