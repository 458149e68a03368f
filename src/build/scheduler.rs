//! Parallel compilation of stale source units.
//!
//! Each unit is independent: it maps to its own object path, so workers share
//! nothing but the filesystem. A rayon pool sized to `jobs` lives only for the
//! duration of [`CompileScheduler::compile`].

use super::catalog::SourceUnit;
use super::flags::{self, BuildMode};
use super::staleness::StalenessPolicy;
use crate::error::{BuildError, Result};
use crate::process::{Invocation, ProcessRunner};
use crate::toolchain::Toolchain;
use crate::ui;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Result of compiling (or reusing) one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArtifact {
    pub path: PathBuf,
    pub freshly_compiled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileSummary {
    pub compiled: usize,
    pub reused: usize,
}

impl CompileSummary {
    pub fn total(&self) -> usize {
        self.compiled + self.reused
    }
}

/// One `compile_commands.json` entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompileCommand {
    pub directory: String,
    pub command: String,
    pub file: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    /// Sorted by object path.
    pub objects: Vec<ObjectArtifact>,
    pub summary: CompileSummary,
    pub commands: Vec<CompileCommand>,
}

pub struct CompileScheduler<'a> {
    pub toolchain: &'a Toolchain,
    pub runner: &'a dyn ProcessRunner,
    pub policy: &'a dyn StalenessPolicy,
    pub root: &'a Path,
    pub build_dir: &'a Path,
    pub include_flags: &'a [String],
    pub jobs: usize,
    pub verbose: bool,
    pub progress: bool,
}

impl CompileScheduler<'_> {
    pub fn compile(&self, units: &[SourceUnit], mode: BuildMode) -> Result<CompileOutcome> {
        let obj_dirs: BTreeSet<PathBuf> = units
            .iter()
            .filter_map(|u| u.object_path(self.build_dir).parent().map(Path::to_path_buf))
            .collect();
        for dir in &obj_dirs {
            fs::create_dir_all(dir)
                .map_err(|e| BuildError::io(format!("failed to create {}", dir.display()), e))?;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.max(1))
            .build()
            .map_err(|e| {
                BuildError::io("failed to start compile workers", std::io::Error::other(e))
            })?;

        let pb = self.progress_bar(units.len());

        // First error stops rayon from handing out further units; stragglers
        // already running finish but their results are dropped with the Vec.
        let results = pool.install(|| {
            units
                .par_iter()
                .map(|unit| self.compile_unit(unit, mode, &pb))
                .collect::<Result<Vec<_>>>()
        });

        pb.finish_and_clear();
        let mut results = results?;
        results.sort_by(|a, b| a.0.path.cmp(&b.0.path));

        let (objects, commands): (Vec<ObjectArtifact>, Vec<CompileCommand>) =
            results.into_iter().unzip();
        let compiled = objects.iter().filter(|o| o.freshly_compiled).count();
        let summary = CompileSummary {
            compiled,
            reused: objects.len() - compiled,
        };

        ui::info(format!(
            "compile summary: compiled={}, cached={}, total={}",
            summary.compiled,
            summary.reused,
            summary.total()
        ));

        Ok(CompileOutcome {
            objects,
            summary,
            commands,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let pb = ProgressBar::new(len as u64);
        pb.set_style(style);
        pb.set_message("Compiling...");
        pb
    }

    pub fn invocation(&self, unit: &SourceUnit, mode: BuildMode) -> Invocation {
        Invocation::new(self.toolchain.compiler_for(unit.kind))
            .args(flags::compile_flags(mode, unit.kind))
            .args(self.include_flags.iter().cloned())
            .arg("-c")
            .path_arg(&unit.path)
            .arg("-o")
            .path_arg(&unit.object_path(self.build_dir))
    }

    fn compile_unit(
        &self,
        unit: &SourceUnit,
        mode: BuildMode,
        pb: &ProgressBar,
    ) -> Result<(ObjectArtifact, CompileCommand)> {
        let obj_path = unit.object_path(self.build_dir);
        let invocation = self.invocation(unit, mode);
        let entry = CompileCommand {
            directory: self.root.to_string_lossy().to_string(),
            command: invocation.to_string(),
            file: unit.path.to_string_lossy().to_string(),
        };

        if !self.policy.is_stale(&unit.path, &obj_path) {
            if self.verbose {
                pb.suspend(|| ui::ok(format!("cached   {}", unit.path.display())));
            }
            pb.inc(1);
            return Ok((
                ObjectArtifact {
                    path: obj_path,
                    freshly_compiled: false,
                },
                entry,
            ));
        }

        if let Some(stem) = unit.path.file_stem() {
            pb.set_message(format!("Compiling {}", stem.to_string_lossy()));
        }
        if self.verbose {
            pb.suspend(|| ui::cmd(&invocation));
        }

        let output = self.runner.run(&invocation)?;
        if !output.success() {
            // Leave nothing behind so the unit is retried next run.
            if let Err(e) = fs::remove_file(&obj_path)
                && e.kind() != ErrorKind::NotFound
            {
                pb.suspend(|| {
                    ui::warn(format!("could not remove {}: {}", obj_path.display(), e))
                });
            }
            return Err(BuildError::CompileFailed {
                unit: unit.path.clone(),
                code: output.code,
                output: output.output,
            });
        }

        if !output.output.trim().is_empty() {
            pb.suspend(|| {
                ui::warn(format!("warnings in {}:", unit.path.display()));
                eprintln!("{}", output.output.trim_end());
            });
        }

        self.policy.record(&unit.path, &obj_path).map_err(|e| {
            BuildError::io(format!("failed to record state for {}", obj_path.display()), e)
        })?;

        if self.verbose {
            pb.suspend(|| ui::ok(format!("compiled {} [{}]", unit.path.display(), unit.kind)));
        }
        pb.inc(1);

        Ok((
            ObjectArtifact {
                path: obj_path,
                freshly_compiled: true,
            },
            entry,
        ))
    }
}
