//! # emforge CLI Entry Point
//!
//! Parses flags with clap, runs the build pipeline once and maps the outcome
//! to a process exit code: 0 on success, the failing toolchain process's code
//! for compile/link failures, 1 for everything else.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use emforge::BuildError;
use emforge::build::{self, BuildMode, BuildOptions, FeedbackAnalyzer, Pipeline};
use emforge::config::{self, ForgeConfig};
use emforge::process::SystemRunner;
use emforge::serve;
use emforge::ui;

#[derive(Parser)]
#[command(name = "emforge")]
#[command(about = "Build a multi-module C/C++ project for the web with Emscripten", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Build in release mode (default is debug)
    #[arg(long)]
    release: bool,
    /// Build mode by name (debug or release)
    #[arg(long, value_name = "MODE", conflicts_with = "release")]
    mode: Option<String>,
    /// Delete the build directory before building
    #[arg(long)]
    clean: bool,
    /// Parallel compile jobs [default: host parallelism]
    #[arg(short, long, allow_negative_numbers = true)]
    jobs: Option<i64>,
    /// Serve the build directory over HTTP after building
    #[arg(long)]
    run: bool,
    /// Print effective configuration and exit
    #[arg(long)]
    info: bool,
    /// Print every compile command and cache decision
    #[arg(short, long)]
    verbose: bool,
    /// Project root [default: current directory]
    #[arg(short = 'C', long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Configuration file, relative to the project root
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = match e.downcast_ref::<BuildError>() {
                Some(build_err) => {
                    report(build_err);
                    build_err.exit_code()
                }
                None => {
                    ui::error(format!("{:#}", e));
                    1
                }
            };
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = match &cli.root {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to determine current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("project root not found: {}", root.display()))?;

    let config = config::load_config(&root, cli.config.as_deref())?;
    let mode = match &cli.mode {
        Some(name) => name.parse::<BuildMode>()?,
        None if cli.release => BuildMode::Release,
        None => BuildMode::Debug,
    };
    let jobs = cli
        .jobs
        .map(|j| usize::try_from(j.max(1)).unwrap_or(1))
        .unwrap_or_else(build::pipeline::default_jobs);

    if cli.info {
        print_info(&config, mode, jobs);
        return Ok(());
    }

    let options = BuildOptions {
        mode,
        jobs,
        clean: cli.clean,
        verbose: cli.verbose,
        progress: console::Term::stdout().is_term(),
    };

    let runner = SystemRunner;
    let outcome = Pipeline::new(&config, options, &runner).run();
    let report = outcome.result?;

    if cli.run {
        serve::serve(&config.build_dir(), &report.output, config.serve.port)?;
    }
    Ok(())
}

/// One diagnostic line naming the condition, then any toolchain output.
fn report(err: &BuildError) {
    ui::error(err);
    if let Some(output) = err.toolchain_output() {
        let output = output.trim_end();
        if !output.is_empty() {
            eprintln!("{}", output);
        }
        if let Some(hint) = FeedbackAnalyzer::analyze(output) {
            ui::hint(hint);
        }
    }
}

fn print_info(config: &ForgeConfig, mode: BuildMode, jobs: usize) {
    let mut table = ui::Table::new(&["Setting", "Value"]);
    let mut row = |k: &str, v: String| table.add_row(vec![k.to_string(), v]);

    row("root", config.root.display().to_string());
    row("build_dir", config.build_dir().display().to_string());
    row("build_type", mode.to_string());
    row("jobs", jobs.to_string());
    row(
        "toolchain",
        format!(
            "{} / {} / {}",
            config.toolchain.cc, config.toolchain.cxx, config.toolchain.make
        ),
    );
    row("external_src", config.external_source().display().to_string());
    row("external_lib", config.external_library().display().to_string());
    for module in &config.modules {
        let dirs: Vec<String> = module
            .sources
            .iter()
            .map(|s| format!("{} ({})", s.dir.display(), s.ext.join(",")))
            .collect();
        row(&format!("module {}", module.name), dirs.join("; "));
    }
    row(
        "output",
        config
            .build_dir()
            .join(mode.output_file_name(&config.project.name))
            .display()
            .to_string(),
    );

    table.print();
}
