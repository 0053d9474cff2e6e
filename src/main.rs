//! wait-for-broker
//!
//! ```text
//!   env / flags / config file
//!          │
//!          ▼
//!   ┌──────────────┐   probe   ┌──────────────┐
//!   │ ReadinessGate│──────────▶│ broker:1883  │
//!   └──────┬───────┘  (retry)  └──────────────┘
//!          │ Reachable | TimedOut
//!          ▼
//!   exec COMMAND [ARGS...]
//! ```

use std::process::ExitCode;

use clap::Parser;

use broker_gate::cli::Cli;
use broker_gate::config::build_config;
use broker_gate::lifecycle::startup;
use broker_gate::lifecycle::HandoffMode;
use broker_gate::observability::init_logging;

/// Exit code for an unusable configuration.
const EXIT_CONFIG: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(
        cli.config.as_deref(),
        |var| std::env::var(var).ok(),
        &cli.overrides(),
    ) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        target = %config.gate.target(),
        probe = %config.gate.probe,
        "wait-for-broker starting"
    );

    let command = cli.command_spec();
    let code = startup::run(&config.gate, command.as_ref(), HandoffMode::default()).await;

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
