//! Command fetch: `sh -c <command>`, stdout is the content

use super::failure::stderr_excerpt;
use super::AttemptFailure;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// One attempt; exit status 0 counts as success
///
/// The child is killed when the timeout elapses.
pub async fn run(command: &str, timeout: Duration) -> Result<Vec<u8>, AttemptFailure> {
    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AttemptFailure::CommandSpawn {
            cause: e.to_string(),
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| AttemptFailure::CommandSpawn {
            cause: e.to_string(),
        })?,
        Err(_) => return Err(AttemptFailure::CommandTimeout { timeout }),
    };

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(AttemptFailure::CommandExit {
            code: output.status.code(),
            stderr: stderr_excerpt(&output.stderr),
        })
    }
}
