//! Toolchain resolution and pre-flight checks.
//!
//! The build needs `emcc`, `em++` and `emmake` on PATH (normally provided by
//! sourcing `emsdk_env.sh`). Names can be overridden in `[toolchain]`.

pub mod types;

pub use types::Toolchain;

use crate::error::{BuildError, Result};
use crate::process::ProcessRunner;

/// Fail with `ToolchainMissing` listing every binary that cannot be spawned.
pub fn verify(toolchain: &Toolchain, runner: &dyn ProcessRunner) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();
    for tool in toolchain.required() {
        if !missing.iter().any(|m| m == tool) && !runner.is_available(tool) {
            missing.push(tool.to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BuildError::ToolchainMissing(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::SourceKind;
    use crate::process::{Invocation, ProcessOutput};

    struct OnlyThese(&'static [&'static str]);

    impl ProcessRunner for OnlyThese {
        fn run(&self, _: &Invocation) -> Result<ProcessOutput> {
            Ok(ProcessOutput::default())
        }

        fn is_available(&self, program: &str) -> bool {
            self.0.contains(&program)
        }
    }

    #[test]
    fn test_all_tools_present() {
        let tc = Toolchain::default();
        assert!(verify(&tc, &OnlyThese(&["emcc", "em++", "emmake"])).is_ok());
    }

    #[test]
    fn test_missing_tools_are_listed_in_order() {
        let tc = Toolchain::default();
        match verify(&tc, &OnlyThese(&["em++"])) {
            Err(BuildError::ToolchainMissing(missing)) => {
                assert_eq!(missing, ["emcc", "emmake"]);
            }
            other => panic!("expected ToolchainMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_compiler_selection_by_kind() {
        let tc = Toolchain::default();
        assert_eq!(tc.compiler_for(SourceKind::C), "emcc");
        assert_eq!(tc.compiler_for(SourceKind::Cpp), "em++");
        assert_eq!(tc.linker(), "em++");
    }
}
