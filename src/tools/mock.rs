use crate::error::{CiPublishError, Result};
use crate::tools::{Invocation, ToolRunner};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;

/// Tool runner that records invocations instead of spawning processes
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    missing: HashSet<String>,
    failures: Vec<(String, i32)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `program` is not installed
    pub fn without_tool(mut self, program: impl Into<String>) -> Self {
        self.missing.insert(program.into());
        self
    }

    /// Fail any invocation whose command line starts with `prefix`
    pub fn failing(mut self, prefix: impl Into<String>, code: i32) -> Self {
        self.failures.push((prefix.into(), code));
        self
    }

    /// Every invocation run so far, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }
}

impl ToolRunner for RecordingRunner {
    fn ensure_available(&self, program: &str) -> Result<PathBuf> {
        if self.missing.contains(program) {
            return Err(CiPublishError::tool_missing(program));
        }
        Ok(PathBuf::from("/usr/bin").join(program))
    }

    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls.borrow_mut().push(invocation.clone());

        let line = invocation.to_string();
        if let Some((_, code)) = self
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
        {
            return Err(CiPublishError::tool_failed(&invocation.program, *code));
        }

        Ok(())
    }
}
