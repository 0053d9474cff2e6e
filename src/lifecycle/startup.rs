//! Startup orchestration: gate, then hand-off.

use crate::config::GateConfig;
use crate::health::{self, Outcome};
use crate::lifecycle::handoff::{hand_off, CommandSpec, HandoffMode};

/// Exit code for a timed-out gate with no command, in strict mode.
pub const EXIT_GATE_TIMEOUT: i32 = 1;

/// Wait for the broker, then run `command` whatever the outcome.
///
/// Returns the exit code the process should finish with: the command's own
/// code when there is one, otherwise 0 (or [`EXIT_GATE_TIMEOUT`] for a
/// timeout under `strict`). With [`HandoffMode::Exec`] on Unix a successful
/// hand-off never returns.
pub async fn run(config: &GateConfig, command: Option<&CommandSpec>, mode: HandoffMode) -> i32 {
    let outcome = health::await_reachable(config).await;
    finish(outcome, config, command, mode).await
}

/// Everything after the gate resolves.
pub async fn finish(
    outcome: Outcome,
    config: &GateConfig,
    command: Option<&CommandSpec>,
    mode: HandoffMode,
) -> i32 {
    match command {
        Some(spec) => {
            if outcome == Outcome::TimedOut {
                tracing::info!(
                    target = %config.target(),
                    "Starting command without a reachable broker"
                );
            }
            match hand_off(spec, mode).await {
                Ok(code) => code,
                Err(e) => {
                    tracing::error!(error = %e, "Command could not be started");
                    e.exit_code()
                }
            }
        }
        None if outcome == Outcome::TimedOut && config.strict => EXIT_GATE_TIMEOUT,
        None => 0,
    }
}
