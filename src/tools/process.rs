use crate::error::{CiPublishError, Result};
use crate::tools::{Invocation, ToolRunner};
use std::path::PathBuf;
use std::process::Command;

/// Runs tools as child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        ProcessRunner
    }
}

impl ToolRunner for ProcessRunner {
    fn ensure_available(&self, program: &str) -> Result<PathBuf> {
        let path = which::which(program).map_err(|_| CiPublishError::tool_missing(program))?;
        tracing::debug!(program, path = %path.display(), "resolved tool");
        Ok(path)
    }

    fn run(&self, invocation: &Invocation) -> Result<()> {
        tracing::debug!(command = %invocation, "running");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CiPublishError::tool_missing(&invocation.program)
                } else {
                    CiPublishError::Io(e)
                }
            })?;

        if !status.success() {
            // Killed by a signal: no code, report a generic failure.
            let code = status.code().unwrap_or(1);
            tracing::debug!(command = %invocation, code, "command failed");
            return Err(CiPublishError::tool_failed(&invocation.program, code));
        }

        Ok(())
    }
}
