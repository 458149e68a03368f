//! External process invocation.
//!
//! All toolchain processes go through a [`ProcessRunner`] so the scheduler and
//! link driver can be exercised without Emscripten installed.

use crate::error::{BuildError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A fully assembled command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status plus combined stdout/stderr of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait ProcessRunner: Sync {
    /// Run to completion. `Err` only when the process could not be spawned.
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;

    /// Whether `program` can be spawned at all.
    fn is_available(&self, program: &str) -> bool;
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .map_err(|e| BuildError::io(format!("failed to execute {}", invocation.program), e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProcessOutput {
            code: output.status.code(),
            output: combined,
        })
    }

    fn is_available(&self, program: &str) -> bool {
        // Spawn success is what matters; some wrappers exit non-zero on --version.
        Command::new(program).arg("--version").output().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display_joins_tokens() {
        let inv = Invocation::new("em++")
            .args(["-O1", "-g"])
            .arg("-c")
            .path_arg(Path::new("main/src/main.cpp"));
        assert_eq!(inv.to_string(), "em++ -O1 -g -c main/src/main.cpp");
        assert!(inv.cwd.is_none());
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        assert!(!SystemRunner.is_available("emforge-definitely-not-a-real-binary"));
    }

    #[test]
    fn test_spawn_failure_is_io_error() {
        let err = SystemRunner
            .run(&Invocation::new("emforge-definitely-not-a-real-binary"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
