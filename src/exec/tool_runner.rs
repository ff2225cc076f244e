// src/exec/tool_runner.rs

//! Individual tool process runner.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::errors::{Result, WorkflowError};

use super::backend::ToolInvocation;

/// Run a single tool process to completion.
///
/// The program is spawned directly (no shell), so arguments containing
/// spaces, such as a center like `10.68 41.27`, reach the tool intact.
/// Both output streams are forwarded to the log at debug level.
pub async fn run_tool(invocation: ToolInvocation) -> Result<()> {
    info!(tool = %invocation.program, "Running sub command: {}", invocation);

    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning process for tool '{}'", invocation.program))?;

    let mut forwarders = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        let tool = invocation.program.clone();
        forwarders.push(tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(tool = %tool, "stdout: {}", line);
            }
        }));
    }
    if let Some(stderr) = child.stderr.take() {
        let tool = invocation.program.clone();
        forwarders.push(tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(tool = %tool, "stderr: {}", line);
            }
        }));
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of tool '{}'", invocation.program))?;

    for handle in forwarders {
        let _ = handle.await;
    }

    let code = status.code().unwrap_or(-1);
    debug!(
        tool = %invocation.program,
        exit_code = code,
        success = status.success(),
        "tool process exited"
    );

    if !status.success() {
        error!(tool = %invocation.program, exit_code = code, "Command failed!");
        return Err(WorkflowError::ToolFailed {
            tool: invocation.program,
            code,
        });
    }

    Ok(())
}
