//! Error taxonomy for the build pipeline.
//!
//! Every variant is fatal: the pipeline stops at the first one and nothing is
//! retried. [`BuildError::exit_code`] maps a variant to the process exit code.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Emscripten tools not found: {}. Load emsdk environment first.", .0.join(", "))]
    ToolchainMissing(Vec<String>),

    #[error("{0}")]
    MissingDependency(String),

    #[error("No source files found for {0}.")]
    NoSourcesFound(String),

    #[error(
        "object path collision in module '{module}': {} and {} both map to the same object",
        .first.display(),
        .second.display()
    )]
    ObjectPathCollision {
        module: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("compile failed for {} with exit code {}", .unit.display(), display_code(.code))]
    CompileFailed {
        unit: PathBuf,
        code: Option<i32>,
        output: String,
    },

    #[error("link failed with exit code {}", display_code(.code))]
    LinkFailed { code: Option<i32>, output: String },

    #[error("unknown build mode '{0}' (expected 'debug' or 'release')")]
    UnknownBuildMode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

impl BuildError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::Io {
            context: context.into(),
            source,
        }
    }

    /// Subprocess failures propagate the child's exit code; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::CompileFailed { code, .. } | BuildError::LinkFailed { code, .. } => {
                match code {
                    Some(c) if *c != 0 => *c,
                    _ => 1,
                }
            }
            _ => 1,
        }
    }

    /// Raw toolchain output attached to the failure, if any.
    pub fn toolchain_output(&self) -> Option<&str> {
        match self {
            BuildError::CompileFailed { output, .. } | BuildError::LinkFailed { output, .. } => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_failures_propagate_exit_code() {
        let err = BuildError::CompileFailed {
            unit: PathBuf::from("main/src/main.cpp"),
            code: Some(2),
            output: String::new(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = BuildError::LinkFailed {
            code: Some(42),
            output: String::new(),
        };
        assert_eq!(err.exit_code(), 42);
    }

    #[test]
    fn test_signal_terminated_process_exits_with_one() {
        let err = BuildError::LinkFailed {
            code: None,
            output: String::new(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_internal_conditions_exit_with_one() {
        assert_eq!(BuildError::NoSourcesFound("libbu".into()).exit_code(), 1);
        assert_eq!(BuildError::UnknownBuildMode("fast".into()).exit_code(), 1);
        assert_eq!(
            BuildError::ToolchainMissing(vec!["emcc".into()]).exit_code(),
            1
        );
    }

    #[test]
    fn test_toolchain_missing_lists_tools() {
        let err = BuildError::ToolchainMissing(vec!["emcc".into(), "emmake".into()]);
        assert_eq!(
            err.to_string(),
            "Emscripten tools not found: emcc, emmake. Load emsdk environment first."
        );
    }
}
