//! Command-line interface.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{Overrides, ProbeKind};
use crate::lifecycle::CommandSpec;

#[derive(Debug, Parser)]
#[command(name = "wait-for-broker")]
#[command(version)]
#[command(
    about = "Wait until the MQTT broker is reachable, then run a command",
    long_about = "Polls the broker's TCP port until it accepts a connection or the \
                  timeout elapses, then replaces itself with COMMAND. The command \
                  runs on timeout too; its exit code becomes this process's exit code.\n\n\
                  Environment: MQTT_BROKER_HOST, MQTT_BROKER_PORT, WAIT_TIMEOUT, SLEEP (or WAIT_SLEEP), \
                  CONNECT_TIMEOUT, WAIT_PROBE, MQTT_CLIENT_ID, MQTT_USERNAME, MQTT_PASSWORD. \
                  Flags override the environment, which overrides --config."
)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Broker host [env: MQTT_BROKER_HOST, default: mosquitto]
    #[arg(long)]
    pub host: Option<String>,

    /// Broker port [env: MQTT_BROKER_PORT, default: 1883]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Total seconds to wait [env: WAIT_TIMEOUT, default: 60]
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds between attempts [env: SLEEP or WAIT_SLEEP, default: 1]
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Upper bound on one attempt in seconds [env: CONNECT_TIMEOUT, default: 5]
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// tcp or mqtt [env: WAIT_PROBE, default: tcp]
    #[arg(long)]
    pub probe: Option<ProbeKind>,

    /// Exit 1 on timeout when no command is given
    #[arg(long)]
    pub strict: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to run once the gate resolves, with its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<OsString>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            timeout_secs: self.timeout,
            poll_interval_secs: self.interval,
            connect_timeout_secs: self.connect_timeout,
            probe: self.probe,
            strict: self.strict,
            log_level: self.log_level.clone(),
        }
    }

    pub fn command_spec(&self) -> Option<CommandSpec> {
        CommandSpec::from_argv(self.command.iter().cloned())
    }
}
