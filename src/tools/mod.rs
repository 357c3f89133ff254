//! External tool invocation
//!
//! The publish pipeline never spawns processes directly. It describes each
//! external command as an [Invocation] and hands it to a [ToolRunner]:
//!
//! - [process::ProcessRunner]: resolves programs on `PATH` and runs them
//! - [mock::RecordingRunner]: records invocations and fakes failures for tests

pub mod mock;
pub mod process;

pub use mock::RecordingRunner;
pub use process::ProcessRunner;

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

/// One external command: program name plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Locates and runs external programs
pub trait ToolRunner {
    /// Resolve a program, failing with `ToolMissing` if it cannot be found
    fn ensure_available(&self, program: &str) -> Result<PathBuf>;

    /// Run an invocation to completion
    ///
    /// # Returns
    /// * `Ok(())` - The program exited with status 0
    /// * `Err(ToolFailed)` - The program exited non-zero
    /// * `Err` - The program could not be started
    fn run(&self, invocation: &Invocation) -> Result<()>;
}
