//! Build pipeline: toolchain check, external library, catalog, compile, link.
//!
//! ```text
//! Uninitialized -> ToolchainVerified -> ExternalDependencyReady
//!   -> Cataloged -> Compiled -> Linked -> Done
//! ```
//!
//! Any error moves the pipeline to `Failed` and stops it. A pipeline runs once;
//! [`Pipeline::run`] consumes it.

use super::catalog;
use super::clean;
use super::external;
use super::flags::BuildMode;
use super::link::LinkDriver;
use super::scheduler::{CompileCommand, CompileScheduler, CompileSummary, ObjectArtifact};
use super::staleness::{ContentHashPolicy, MtimePolicy, StalenessPolicy};
use crate::config::{ForgeConfig, StalenessKind};
use crate::error::{BuildError, Result};
use crate::process::ProcessRunner;
use crate::toolchain::{self, Toolchain};
use crate::ui;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    ToolchainVerified,
    ExternalDependencyReady,
    Cataloged,
    Compiled,
    Linked,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub mode: BuildMode,
    /// Parallel compile jobs; values below 1 are treated as 1.
    pub jobs: usize,
    /// Remove the build directory first.
    pub clean: bool,
    pub verbose: bool,
    /// Draw a progress bar during compilation.
    pub progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            mode: BuildMode::Debug,
            jobs: default_jobs(),
            clean: false,
            verbose: false,
            progress: false,
        }
    }
}

pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub mode: BuildMode,
    pub output: PathBuf,
    pub external: PathBuf,
    pub summary: CompileSummary,
    /// Sorted by path; exactly what was passed to the linker.
    pub objects: Vec<ObjectArtifact>,
}

/// Outcome of a pipeline run together with every state it passed through.
#[derive(Debug)]
pub struct PipelineRun {
    pub history: Vec<PipelineState>,
    pub result: Result<BuildReport>,
}

impl PipelineRun {
    pub fn final_state(&self) -> PipelineState {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineState::Uninitialized)
    }

    pub fn reached(&self, state: PipelineState) -> bool {
        self.history.contains(&state)
    }
}

pub struct Pipeline<'a> {
    config: &'a ForgeConfig,
    options: BuildOptions,
    runner: &'a dyn ProcessRunner,
    toolchain: Toolchain,
    history: Vec<PipelineState>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ForgeConfig, options: BuildOptions, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            config,
            options,
            runner,
            toolchain: Toolchain::from_config(&config.toolchain),
            history: vec![PipelineState::Uninitialized],
        }
    }

    pub fn run(mut self) -> PipelineRun {
        let result = self.execute();
        if result.is_err() {
            self.history.push(PipelineState::Failed);
        }
        PipelineRun {
            history: self.history,
            result,
        }
    }

    fn advance(&mut self, state: PipelineState) {
        self.history.push(state);
    }

    fn execute(&mut self) -> Result<BuildReport> {
        let start = Instant::now();
        let config = self.config;
        let runner = self.runner;
        let build_dir = config.build_dir();

        toolchain::verify(&self.toolchain, runner)?;
        self.advance(PipelineState::ToolchainVerified);

        if self.options.clean {
            clean::clean(&build_dir)?;
        }
        fs::create_dir_all(&build_dir)
            .map_err(|e| BuildError::io(format!("failed to create {}", build_dir.display()), e))?;

        let external = external::ensure(config, &self.toolchain, runner)?;
        self.advance(PipelineState::ExternalDependencyReady);

        let units = catalog::discover(config)?;
        self.advance(PipelineState::Cataloged);

        let policy: &dyn StalenessPolicy = match config.build.staleness {
            StalenessKind::Mtime => &MtimePolicy,
            StalenessKind::Content => &ContentHashPolicy,
        };
        let include_flags = config.include_flags();
        let scheduler = CompileScheduler {
            toolchain: &self.toolchain,
            runner,
            policy,
            root: &config.root,
            build_dir: &build_dir,
            include_flags: &include_flags,
            jobs: self.options.jobs,
            verbose: self.options.verbose,
            progress: self.options.progress,
        };
        let outcome = scheduler.compile(&units, self.options.mode)?;
        self.advance(PipelineState::Compiled);

        write_compile_commands(&build_dir, &outcome.commands)?;

        let assets_dir = config.assets_dir();
        let shell_file = config.shell_file();
        let driver = LinkDriver {
            toolchain: &self.toolchain,
            runner,
            assets_dir: &assets_dir,
            shell_file: &shell_file,
            output_stem: &config.project.name,
        };
        let output = driver.link(&outcome.objects, &external, self.options.mode, &build_dir)?;
        self.advance(PipelineState::Linked);

        ui::ok(format!(
            "{} web build complete: {} ({:.2?})",
            self.options.mode,
            output.display(),
            start.elapsed()
        ));
        self.advance(PipelineState::Done);

        Ok(BuildReport {
            mode: self.options.mode,
            output,
            external,
            summary: outcome.summary,
            objects: outcome.objects,
        })
    }
}

fn write_compile_commands(build_dir: &Path, commands: &[CompileCommand]) -> Result<()> {
    let path = build_dir.join("compile_commands.json");
    let json = serde_json::to_string_pretty(commands)
        .map_err(|e| BuildError::io("failed to serialize compile commands", e.into()))?;
    fs::write(&path, json)
        .map_err(|e| BuildError::io(format!("failed to write {}", path.display()), e))
}
