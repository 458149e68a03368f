//! Acquisition of the prebuilt external library (raylib for the web).
//!
//! The library is built by the dependency's own makefile through the
//! Emscripten make wrapper. Fetching its sources is left to the operator.

use crate::config::ForgeConfig;
use crate::error::{BuildError, Result};
use crate::process::{Invocation, ProcessRunner};
use crate::toolchain::Toolchain;
use crate::ui;
use std::path::PathBuf;

pub fn ensure(
    config: &ForgeConfig,
    toolchain: &Toolchain,
    runner: &dyn ProcessRunner,
) -> Result<PathBuf> {
    let library = config.external_library();
    if library.exists() {
        return Ok(library);
    }

    let source = config.external_source();
    if !source.exists() {
        return Err(BuildError::MissingDependency(format!(
            "external library source not found at {}.\nClone it first, for example:\n  {}",
            source.display(),
            config.external.acquire
        )));
    }

    let invocation = Invocation::new(&toolchain.make)
        .args(config.external.make_args.iter().cloned())
        .current_dir(&source);
    ui::cmd(&invocation);

    let output = runner.run(&invocation)?;
    if !output.success() {
        return Err(BuildError::MissingDependency(format!(
            "building the external library in {} failed with exit code {}:\n{}",
            source.display(),
            output
                .code
                .map_or_else(|| "none".to_string(), |c| c.to_string()),
            output.output.trim_end()
        )));
    }

    if library.exists() {
        Ok(library)
    } else {
        Err(BuildError::MissingDependency(format!(
            "external library was not generated: {}",
            library.display()
        )))
    }
}
