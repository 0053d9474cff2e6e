//! Hand-off to the dependent command.
//!
//! On Unix the gate process is replaced by the command (`execvp`), so the
//! command inherits the pid, stdio and signals and its exit code is the
//! container's. Elsewhere the command is spawned and waited on and its exit
//! code is propagated.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Exit code when the command cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code when the command exists but cannot be started.
pub const EXIT_CANNOT_EXECUTE: i32 = 126;

/// Program plus arguments, passed through exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    /// Split a trailing command line. Returns `None` if it is empty.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next()?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    fn spawn(spec: &CommandSpec, source: io::Error) -> Self {
        LaunchError::Spawn {
            program: spec.program.to_string_lossy().into_owned(),
            source,
        }
    }

    /// Shell-style exit code for a command that never ran.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                EXIT_NOT_FOUND
            }
            LaunchError::Spawn { .. } => EXIT_CANNOT_EXECUTE,
        }
    }
}

/// How the command is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffMode {
    /// Replace the current process image where the platform allows it.
    Exec,
    /// Spawn a child, wait for it, return its exit code.
    SpawnAndWait,
}

impl Default for HandoffMode {
    fn default() -> Self {
        if cfg!(unix) {
            HandoffMode::Exec
        } else {
            HandoffMode::SpawnAndWait
        }
    }
}

/// Start `spec` in the given mode and return the exit code the gate process
/// should finish with.
pub async fn hand_off(spec: &CommandSpec, mode: HandoffMode) -> Result<i32, LaunchError> {
    tracing::info!(command = %spec, "Handing off to command");
    match mode {
        HandoffMode::Exec => Err(exec(spec)),
        HandoffMode::SpawnAndWait => spawn_and_wait(spec).await,
    }
}

/// Replace the process image with `spec`. Only returns on failure.
#[cfg(unix)]
pub fn exec(spec: &CommandSpec) -> LaunchError {
    use std::os::unix::process::CommandExt;

    let source = std::process::Command::new(&spec.program)
        .args(&spec.args)
        .exec();
    LaunchError::spawn(spec, source)
}

#[cfg(not(unix))]
pub fn exec(spec: &CommandSpec) -> LaunchError {
    LaunchError::spawn(
        spec,
        io::Error::new(io::ErrorKind::Unsupported, "process replacement needs unix"),
    )
}

/// Spawn `spec` with inherited stdio and wait for it.
pub async fn spawn_and_wait(spec: &CommandSpec) -> Result<i32, LaunchError> {
    let status = tokio::process::Command::new(&spec.program)
        .args(&spec.args)
        .status()
        .await
        .map_err(|e| LaunchError::spawn(spec, e))?;

    let code = exit_code(status);
    tracing::debug!(command = %spec, code, "Command exited");
    Ok(code)
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, extra: &[&str]) -> CommandSpec {
        let mut argv = vec!["sh", "-c", script, "sh"];
        argv.extend_from_slice(extra);
        CommandSpec::from_argv(argv).unwrap()
    }

    #[test]
    fn empty_argv_has_no_command() {
        assert_eq!(CommandSpec::from_argv(Vec::<String>::new()), None);
    }

    #[test]
    fn argv_split_keeps_arguments_intact() {
        let spec = CommandSpec::from_argv(["python", "publisher.py", "config file.yml", ""]).unwrap();
        assert_eq!(spec.program, "python");
        assert_eq!(spec.args, vec!["publisher.py", "config file.yml", ""]);
        assert_eq!(spec.to_string(), "python publisher.py config file.yml ");
    }

    #[tokio::test]
    async fn propagates_exit_code() {
        let code = spawn_and_wait(&sh("exit 3", &[])).await.unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn signal_maps_to_128_plus_signal() {
        let code = spawn_and_wait(&sh("kill -TERM $$", &[])).await.unwrap();
        assert_eq!(code, 128 + 15);
    }

    #[tokio::test]
    async fn missing_program_maps_to_127() {
        let spec = CommandSpec::from_argv(["/nonexistent/broker-gate-publisher"]).unwrap();
        let err = spawn_and_wait(&spec).await.unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
    }

    #[test]
    fn exec_failure_is_reported() {
        let spec = CommandSpec::from_argv(["/nonexistent/broker-gate-publisher"]).unwrap();
        assert_eq!(exec(&spec).exit_code(), EXIT_NOT_FOUND);
    }
}
