use crate::build::SourceKind;
use crate::config::ToolchainConfig;

/// The Emscripten binaries a build drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// C compiler (`emcc`)
    pub cc: String,

    /// C++ compiler, also used as the linker (`em++`)
    pub cxx: String,

    /// Make wrapper used to build the external library (`emmake`)
    pub make: String,
}

impl Toolchain {
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self {
            cc: config.cc.clone(),
            cxx: config.cxx.clone(),
            make: config.make.clone(),
        }
    }

    /// Compiler for a given source kind.
    pub fn compiler_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::C => &self.cc,
            SourceKind::Cpp => &self.cxx,
        }
    }

    pub fn linker(&self) -> &str {
        &self.cxx
    }

    /// Every binary the pre-flight check requires, in check order.
    pub fn required(&self) -> [&str; 3] {
        [&self.cc, &self.cxx, &self.make]
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::from_config(&ToolchainConfig::default())
    }
}
