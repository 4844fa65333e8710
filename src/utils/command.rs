use crate::error::GenericSensorError;
use log::debug;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use subprocess::{Exec, NullFile, Redirection};

/// Runs the executable at `path` and returns its trimmed stdout.
///
/// The child is killed if it has not finished within `timeout`.
pub fn run_with_timeout(path: &Path, timeout: Duration) -> Result<String, GenericSensorError> {
    let start = Instant::now();
    let exec_error = |reason: String| GenericSensorError::Exec {
        path: path.to_path_buf(),
        reason,
    };

    let mut process = Exec::cmd(path)
        .stdin(NullFile)
        .stdout(Redirection::Pipe)
        .stderr(Redirection::Pipe)
        .popen()
        .map_err(|e| exec_error(e.to_string()))?;

    let output = process
        .communicate_start(None)
        .limit_time(timeout)
        .read_string();
    let (stdout, stderr) = match output {
        Ok(output) => output,
        Err(e) => {
            // Best effort, the process may already be gone.
            let _ = process.kill();
            let _ = process.wait();
            if e.kind() == io::ErrorKind::TimedOut {
                return Err(GenericSensorError::Timeout {
                    path: path.to_path_buf(),
                    timeout,
                });
            }
            return Err(exec_error(e.to_string()));
        }
    };

    let remaining = timeout.saturating_sub(start.elapsed());
    let status = match process.wait_timeout(remaining) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = process.kill();
            let _ = process.wait();
            return Err(GenericSensorError::Timeout {
                path: path.to_path_buf(),
                timeout,
            });
        }
        Err(e) => return Err(exec_error(e.to_string())),
    };

    let stderr = stderr.unwrap_or_default();
    if !stderr.trim().is_empty() {
        debug!("{} stderr: {}", path.display(), stderr.trim());
    }
    if !status.success() {
        return Err(GenericSensorError::ExitStatus {
            path: path.to_path_buf(),
            status: format!("{:?}", status),
        });
    }

    debug!(
        "run_with_timeout {} took: {} ms",
        path.display(),
        start.elapsed().as_millis()
    );
    Ok(stdout.unwrap_or_default().trim().to_string())
}
