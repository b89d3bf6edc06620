use std::ffi::OsStr;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Runs `program` to completion, killing it once `timeout` elapses.
///
/// A non-zero exit is an error carrying the tail of stderr.
pub async fn run<I, S>(program: &str, args: I, timeout: Duration) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    trace!(?command, "running external tool");

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(ToolError::Spawn {
                program: program.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(ToolError::Timeout {
                program: program.to_string(),
                timeout,
            })
        }
    };

    if output.status.success() {
        Ok(output)
    } else {
        Err(ToolError::Exit {
            program: program.to_string(),
            status: output.status,
            stderr: stderr_tail(&output.stderr),
        })
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    const KEEP: usize = 512;
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    match text.char_indices().rev().nth(KEEP) {
        Some((idx, _)) => format!("...{}", &text[idx..]),
        None => text.to_string(),
    }
}
