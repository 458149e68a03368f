//! Source discovery and classification.

use crate::config::{ForgeConfig, ModuleConfig};
use crate::error::{BuildError, Result};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    C,
    Cpp,
}

impl SourceKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" => Some(SourceKind::C),
            "cpp" | "cc" | "cxx" => Some(SourceKind::Cpp),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::C => write!(f, "C"),
            SourceKind::Cpp => write!(f, "C++"),
        }
    }
}

/// One compilable file. Never mutated after discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub module: String,
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl SourceUnit {
    pub fn new(module: impl Into<String>, path: impl Into<PathBuf>, kind: SourceKind) -> Self {
        Self {
            module: module.into(),
            path: path.into(),
            kind,
        }
    }

    /// `<build_dir>/obj/<module>/<stem>.o`
    pub fn object_path(&self, build_dir: &Path) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .unwrap_or_else(|| OsStr::new("unnamed"))
            .to_string_lossy();
        build_dir
            .join("obj")
            .join(&self.module)
            .join(format!("{}.o", stem))
    }
}

/// Scan every configured module. Modules keep configuration order; units are
/// sorted by path within a module.
pub fn discover(config: &ForgeConfig) -> Result<Vec<SourceUnit>> {
    let mut units = Vec::new();
    for module in &config.modules {
        let mut found = scan_module(config, module)?;
        found.sort_by(|a, b| a.path.cmp(&b.path));
        check_collisions(&config.build_dir(), &found)?;
        units.extend(found);
    }

    if units.is_empty() {
        let names: Vec<&str> = config.modules.iter().map(|m| m.name.as_str()).collect();
        return Err(BuildError::NoSourcesFound(names.join("/")));
    }
    Ok(units)
}

fn scan_module(config: &ForgeConfig, module: &ModuleConfig) -> Result<Vec<SourceUnit>> {
    let mut units = Vec::new();
    for source in &module.sources {
        let dir = config.resolve(&source.dir);
        if !dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                BuildError::io(format!("failed to scan {}", dir.display()), e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
                continue;
            };
            if !source.ext.iter().any(|wanted| wanted.as_str() == &*ext) {
                continue;
            }
            if let Some(kind) = SourceKind::from_extension(&ext) {
                units.push(SourceUnit::new(&module.name, path, kind));
            }
        }
    }
    Ok(units)
}

/// Two units of one module must not share an object file.
fn check_collisions(build_dir: &Path, units: &[SourceUnit]) -> Result<()> {
    let mut seen: HashMap<PathBuf, &SourceUnit> = HashMap::new();
    for unit in units {
        if let Some(first) = seen.insert(unit.object_path(build_dir), unit) {
            return Err(BuildError::ObjectPathCollision {
                module: unit.module.clone(),
                first: first.path.clone(),
                second: unit.path.clone(),
            });
        }
    }
    Ok(())
}
