//! Compiler and linker flag assembly per build mode.
//!
//! Pure functions of `(mode, kind)`; nothing here touches the filesystem.

use super::catalog::SourceKind;
use crate::error::BuildError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildMode {
    #[default]
    Debug,
    Release,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }

    /// Linked page name: debug and release never share a file.
    pub fn output_file_name(&self, stem: &str) -> String {
        match self {
            BuildMode::Debug => format!("{}.html", stem),
            BuildMode::Release => format!("{}.release.html", stem),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildMode::Debug),
            "release" => Ok(BuildMode::Release),
            _ => Err(BuildError::UnknownBuildMode(s.to_string())),
        }
    }
}

pub fn std_flag(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::C => "-std=c11",
        SourceKind::Cpp => "-std=c++17",
    }
}

pub fn compile_flags(mode: BuildMode, kind: SourceKind) -> Vec<String> {
    let mut flags = vec!["-DPLATFORM_WEB", std_flag(kind)];
    match mode {
        BuildMode::Release => flags.extend(["-O3", "-DNDEBUG"]),
        BuildMode::Debug => flags.extend(["-O1", "-g", "-DDEBUG", "-D_DEBUG"]),
    }
    flags.into_iter().map(String::from).collect()
}

/// Runtime settings shared by every mode.
const LINK_SETTINGS: &[&str] = &[
    "USE_GLFW=3",
    "ALLOW_MEMORY_GROWTH=1",
    "STACK_SIZE=5242880",
    "FORCE_FILESYSTEM=1",
    "EXPORTED_RUNTIME_METHODS=['ccall','cwrap']",
    "EXPORTED_FUNCTIONS=['_main']",
];

fn settings(values: &[&str]) -> impl Iterator<Item = String> {
    values
        .iter()
        .flat_map(|v| ["-s".to_string(), v.to_string()])
}

pub fn link_flags(mode: BuildMode) -> Vec<String> {
    let (opt, checks): (&[&str], &[&str]) = match mode {
        BuildMode::Release => (&["-O3", "-DNDEBUG"], &["ASSERTIONS=0"]),
        BuildMode::Debug => (&["-O1", "-g"], &["ASSERTIONS=2", "SAFE_HEAP=1"]),
    };

    opt.iter()
        .map(|s| s.to_string())
        .chain(settings(LINK_SETTINGS))
        .chain(settings(checks))
        .collect()
}
