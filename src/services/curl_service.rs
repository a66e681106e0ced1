//! Curl service - Runs a curl command line as a subprocess with a timeout

use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Outcome reported back to the host as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurlResult {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CurlResult {
    fn failure(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }
}

/// Execute `command`, which must start with `curl`.
///
/// Never fails: spawn errors, non-zero exits and timeouts are reported in
/// the result.
pub async fn execute_curl(command: &str, timeout: Duration) -> CurlResult {
    let Some(args) = shlex::split(command) else {
        return CurlResult::failure("", "Failed to parse command: No closing quotation");
    };
    if args.first().map(String::as_str) != Some("curl") {
        return CurlResult::failure("", "Command must start with 'curl'");
    }

    tracing::info!(args = args.len() - 1, "running curl");
    let mut cmd = Command::new(&args[0]);
    cmd.args(&args[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => {
            tracing::warn!(secs = timeout.as_secs(), "curl timed out");
            return CurlResult::failure(
                "",
                format!("Command timed out after {}s", timeout.as_secs()),
            );
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return CurlResult::failure("", "curl not found on system");
        }
        Ok(Err(e)) => return CurlResult::failure("", e.to_string()),
        Ok(Ok(output)) => output,
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if output.status.success() {
        return CurlResult {
            success: true,
            output: stdout,
            error: None,
        };
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let error = if stderr.is_empty() {
        match output.status.code() {
            Some(code) => format!("Exit code: {}", code),
            None => "Terminated by signal".to_string(),
        }
    } else {
        stderr
    };
    CurlResult::failure(stdout, error)
}
