//! Command-mode job execution: run a shell command and capture its
//! output (SPEC_FULL.md §2, §4.5).

use std::process::Stdio;

use crate::error::ExecError;
use crate::vars::render;

pub async fn run(
    command: Option<&str>,
    vars: Option<&serde_json::Value>,
    workdir: &std::path::Path,
) -> Result<serde_json::Value, ExecError> {
    let command = command.ok_or(ExecError::MissingCommand)?;
    let rendered = render(command, vars);

    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&rendered)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(ExecError::Spawn)?;

    if !output.status.success() {
        return Err(ExecError::NonZeroExit(output.status.code().unwrap_or(-1)));
    }

    Ok(serde_json::json!({
        "stdout": String::from_utf8_lossy(&output.stdout),
        "stderr": String::from_utf8_lossy(&output.stderr),
        "exit_code": output.status.code(),
    }))
}
