//! Project layout configuration (`emforge.toml`).
//!
//! Every section is optional. A project without an `emforge.toml` builds with
//! the defaults below, which describe the `libbu` / `graphics` / `main` layout
//! with raylib vendored under `external/raylib`.

use crate::error::{BuildError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "emforge.toml";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Project root every relative path resolves against. Not read from TOML.
    #[serde(skip)]
    pub root: PathBuf,
    pub project: ProjectConfig,
    pub toolchain: ToolchainConfig,
    #[serde(rename = "module", default = "default_modules")]
    pub modules: Vec<ModuleConfig>,
    pub build: BuildConfig,
    pub external: ExternalConfig,
    pub serve: ServeConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Stem of the linked page: `<name>.html` / `<name>.release.html`.
    pub name: String,
    pub build_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            build_dir: PathBuf::from("build/web"),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    pub cc: String,
    pub cxx: String,
    pub make: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cc: "emcc".to_string(),
            cxx: "em++".to_string(),
            make: "emmake".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
    pub sources: Vec<SourceDir>,
}

/// One directory scanned (non-recursively) for the listed extensions.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceDir {
    pub dir: PathBuf,
    pub ext: Vec<String>,
}

impl SourceDir {
    fn new(dir: &str, ext: &[&str]) -> Self {
        Self {
            dir: PathBuf::from(dir),
            ext: ext.iter().map(|e| e.to_string()).collect(),
        }
    }
}

fn default_modules() -> Vec<ModuleConfig> {
    vec![
        ModuleConfig {
            name: "libbu".to_string(),
            sources: vec![
                SourceDir::new("libbu/libbu/src", &["cpp", "c"]),
                SourceDir::new("libbu/libbu/src/miniz", &["c"]),
            ],
        },
        ModuleConfig {
            name: "graphics".to_string(),
            sources: vec![SourceDir::new("graphics/src", &["cpp"])],
        },
        ModuleConfig {
            name: "main".to_string(),
            sources: vec![SourceDir::new("main/src", &["cpp"])],
        },
    ]
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StalenessKind {
    #[default]
    Mtime,
    Content,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub include: Vec<PathBuf>,
    pub assets: PathBuf,
    pub shell: PathBuf,
    pub staleness: StalenessKind,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            include: [
                "libbu/libbu/include",
                "libbu/libbu/src",
                "libbu/libbu/src/miniz",
                "graphics/src",
                "main/src",
            ]
            .iter()
            .map(PathBuf::from)
            .collect(),
            assets: PathBuf::from("bin/assets"),
            shell: PathBuf::from("shell.html"),
            staleness: StalenessKind::Mtime,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalConfig {
    /// Prebuilt static library handed to the linker.
    pub library: PathBuf,
    /// Source tree the library is built from when it is missing.
    pub source: PathBuf,
    /// Arguments passed to the make wrapper inside `source`.
    pub make_args: Vec<String>,
    /// Shown to the operator when neither library nor source exists.
    pub acquire: String,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            library: PathBuf::from("external/raylib/src/libraylib.web.a"),
            source: PathBuf::from("external/raylib/src"),
            make_args: vec![
                "make".to_string(),
                "PLATFORM=PLATFORM_WEB".to_string(),
                "-B".to_string(),
            ],
            acquire: "git clone --depth 1 https://github.com/raysan5/raylib.git external/raylib"
                .to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl ForgeConfig {
    /// Built-in layout rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            modules: default_modules(),
            ..Default::default()
        }
    }

    pub fn resolve(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.resolve(&self.project.build_dir)
    }

    pub fn external_library(&self) -> PathBuf {
        self.resolve(&self.external.library)
    }

    pub fn external_source(&self) -> PathBuf {
        self.resolve(&self.external.source)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.resolve(&self.build.assets)
    }

    pub fn shell_file(&self) -> PathBuf {
        self.resolve(&self.build.shell)
    }

    /// Include directories that exist on disk, followed by the external source dir.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        self.build
            .include
            .iter()
            .map(|p| self.resolve(p))
            .chain(std::iter::once(self.external_source()))
            .filter(|p| p.exists())
            .collect()
    }

    pub fn include_flags(&self) -> Vec<String> {
        self.include_dirs()
            .iter()
            .map(|p| format!("-I{}", p.display()))
            .collect()
    }
}

/// Load `emforge.toml` from `root`, or `explicit` when given.
///
/// A missing default file yields the built-in layout; a missing explicit file
/// is an error.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ForgeConfig> {
    let path = match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None => root.join(CONFIG_FILE),
    };

    if !path.exists() {
        if explicit.is_some() {
            return Err(BuildError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(ForgeConfig::with_root(root));
    }

    let text = fs::read_to_string(&path)
        .map_err(|e| BuildError::io(format!("failed to read {}", path.display()), e))?;
    let mut config = parse_config(&text)
        .map_err(|e| BuildError::Config(format!("{}: {}", path.display(), e)))?;
    config.root = root.to_path_buf();
    Ok(config)
}

pub fn parse_config(text: &str) -> std::result::Result<ForgeConfig, toml::de::Error> {
    toml::from_str(text)
}
