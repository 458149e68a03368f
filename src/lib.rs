//! # emforge - Emscripten build orchestrator
//!
//! emforge compiles a multi-module C/C++ tree to WebAssembly by driving
//! `emcc`/`em++` directly, without CMake.
//!
//! ## Features
//!
//! - **Incremental**: objects are reused until their source is newer
//! - **Parallel**: compile jobs run on a bounded worker pool
//! - **Reproducible links**: objects reach the linker sorted by path
//! - **Zero config**: an `emforge.toml` is optional
//!
//! ## Quick Start
//!
//! ```bash
//! source ~/emsdk/emsdk_env.sh
//! emforge --release --run
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Catalog, staleness, flags, scheduler, link and pipeline
//! - [`config`] - Configuration parsing (`emforge.toml`)
//! - [`toolchain`] - Emscripten binaries and pre-flight checks
//! - [`process`] - External process invocation

/// Build engine: catalog, staleness, flags, scheduling and linking.
pub mod build;

/// Configuration file parsing (`emforge.toml`).
pub mod config;

/// Error taxonomy and exit codes.
pub mod error;

/// External process invocation.
pub mod process;

/// Static file server for the built page.
pub mod serve;

/// Toolchain resolution and pre-flight checks.
pub mod toolchain;

/// Terminal output helpers.
pub mod ui;

pub use error::{BuildError, Result};
