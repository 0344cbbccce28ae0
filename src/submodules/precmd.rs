// src/submodules/precmd.rs

//! Pre-command execution.
//!
//! A module's pre-command runs to completion inside the module directory
//! before any of its files are listed. Commands are spawned directly from
//! their argv, never through a shell. stderr passes through to the parent
//! process; stdout is captured only when a capture hook wants it and is
//! discarded otherwise.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::errors::ProcessError;

/// Run `argv` inside `dir`, waiting for it to exit.
///
/// Returns the raw stdout when `capture` is set. A non-zero exit or a
/// signal death is an error; nothing is captured from a failed command.
pub async fn run_precmd(
    argv: &[String],
    dir: &Path,
    capture: bool,
) -> Result<Option<String>, ProcessError> {
    let command_name = argv.join(" ");
    let Some((program, args)) = argv.split_first() else {
        return Err(ProcessError::Spawn {
            command: command_name,
            dir: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
        });
    };

    debug!(command = %command_name, dir = %dir.display(), "running pre-command");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(if capture { Stdio::piped() } else { Stdio::null() })
        .stderr(Stdio::inherit());

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        command: command_name.clone(),
        dir: dir.to_path_buf(),
        source,
    })?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| ProcessError::Wait {
            command: command_name.clone(),
            source,
        })?;

    check_status(&command_name, output.status)?;
    debug!(command = %command_name, "pre-command finished");

    if capture {
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    } else {
        Ok(None)
    }
}

fn check_status(command: &str, status: ExitStatus) -> Result<(), ProcessError> {
    if status.success() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(ProcessError::Signal {
                command: command.to_string(),
                signal: signal_name(signal),
            });
        }
    }

    Err(ProcessError::Exit {
        command: command.to_string(),
        code: status.code().unwrap_or(-1),
    })
}

#[cfg(unix)]
fn signal_name(signal: i32) -> String {
    match signal {
        1 => "SIGHUP".to_string(),
        2 => "SIGINT".to_string(),
        3 => "SIGQUIT".to_string(),
        6 => "SIGABRT".to_string(),
        9 => "SIGKILL".to_string(),
        11 => "SIGSEGV".to_string(),
        13 => "SIGPIPE".to_string(),
        15 => "SIGTERM".to_string(),
        other => format!("signal {other}"),
    }
}
