//! Final link step.

use super::flags::{self, BuildMode};
use super::scheduler::ObjectArtifact;
use crate::error::{BuildError, Result};
use crate::process::{Invocation, ProcessRunner};
use crate::toolchain::Toolchain;
use crate::ui;
use std::path::{Path, PathBuf};

pub struct LinkDriver<'a> {
    pub toolchain: &'a Toolchain,
    pub runner: &'a dyn ProcessRunner,
    /// Preloaded into the virtual filesystem at `/assets` when present.
    pub assets_dir: &'a Path,
    /// HTML shell template, used when present.
    pub shell_file: &'a Path,
    pub output_stem: &'a str,
}

impl LinkDriver<'_> {
    pub fn output_path(&self, out_dir: &Path, mode: BuildMode) -> PathBuf {
        out_dir.join(mode.output_file_name(self.output_stem))
    }

    /// `<linker> <objects…> <external> <flags…> [--preload-file …] [--shell-file …] -o <out>`
    pub fn invocation(
        &self,
        objects: &[ObjectArtifact],
        external: &Path,
        mode: BuildMode,
        out_dir: &Path,
    ) -> Invocation {
        let mut inv = Invocation::new(self.toolchain.linker())
            .args(objects.iter().map(|o| o.path.to_string_lossy().to_string()))
            .path_arg(external)
            .args(flags::link_flags(mode));

        if self.assets_dir.exists() {
            inv = inv
                .arg("--preload-file")
                .arg(format!("{}@/assets", self.assets_dir.display()));
        }
        if self.shell_file.exists() {
            inv = inv.arg("--shell-file").path_arg(self.shell_file);
        }

        inv.arg("-o").path_arg(&self.output_path(out_dir, mode))
    }

    pub fn link(
        &self,
        objects: &[ObjectArtifact],
        external: &Path,
        mode: BuildMode,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let invocation = self.invocation(objects, external, mode, out_dir);
        ui::cmd(&invocation);

        let output = self.runner.run(&invocation)?;
        if !output.success() {
            return Err(BuildError::LinkFailed {
                code: output.code,
                output: output.output,
            });
        }
        Ok(self.output_path(out_dir, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutput;
    use std::fs;

    struct ExitWith(i32);

    impl ProcessRunner for ExitWith {
        fn run(&self, _: &Invocation) -> Result<ProcessOutput> {
            Ok(ProcessOutput {
                code: Some(self.0),
                output: "wasm-ld: error: undefined symbol: InitWindow".into(),
            })
        }

        fn is_available(&self, _: &str) -> bool {
            true
        }
    }

    fn objects(paths: &[&str]) -> Vec<ObjectArtifact> {
        paths
            .iter()
            .map(|p| ObjectArtifact {
                path: PathBuf::from(p),
                freshly_compiled: true,
            })
            .collect()
    }

    #[test]
    fn test_invocation_without_optional_inputs() {
        let tc = Toolchain::default();
        let driver = LinkDriver {
            toolchain: &tc,
            runner: &ExitWith(0),
            assets_dir: Path::new("/nonexistent/assets"),
            shell_file: Path::new("/nonexistent/shell.html"),
            output_stem: "main",
        };
        let inv = driver.invocation(
            &objects(&["/b/obj/x/a.o", "/b/obj/x/b.o"]),
            Path::new("/r/libraylib.web.a"),
            BuildMode::Debug,
            Path::new("/b"),
        );

        assert_eq!(inv.program, "em++");
        assert_eq!(&inv.args[..3], ["/b/obj/x/a.o", "/b/obj/x/b.o", "/r/libraylib.web.a"]);
        assert_eq!(&inv.args[inv.args.len() - 2..], ["-o", "/b/main.html"]);
        assert!(!inv.args.iter().any(|a| a == "--preload-file"));
        assert!(!inv.args.iter().any(|a| a == "--shell-file"));
    }

    #[test]
    fn test_optional_inputs_are_presence_detected() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("bin/assets");
        let shell = dir.path().join("shell.html");
        fs::create_dir_all(&assets).unwrap();
        fs::write(&shell, "<html>{{{ SCRIPT }}}</html>").unwrap();

        let tc = Toolchain::default();
        let driver = LinkDriver {
            toolchain: &tc,
            runner: &ExitWith(0),
            assets_dir: &assets,
            shell_file: &shell,
            output_stem: "main",
        };

        for mode in [BuildMode::Debug, BuildMode::Release] {
            let inv = driver.invocation(&objects(&["a.o"]), Path::new("lib.a"), mode, dir.path());
            let preload = inv.args.iter().position(|a| a == "--preload-file").unwrap();
            assert_eq!(inv.args[preload + 1], format!("{}@/assets", assets.display()));
            let shell_at = inv.args.iter().position(|a| a == "--shell-file").unwrap();
            assert_eq!(inv.args[shell_at + 1], shell.to_string_lossy());
        }
    }

    #[test]
    fn test_release_output_name() {
        let tc = Toolchain::default();
        let driver = LinkDriver {
            toolchain: &tc,
            runner: &ExitWith(0),
            assets_dir: Path::new("/nonexistent"),
            shell_file: Path::new("/nonexistent"),
            output_stem: "game",
        };
        let out = driver
            .link(&objects(&["a.o"]), Path::new("lib.a"), BuildMode::Release, Path::new("/b"))
            .unwrap();
        assert_eq!(out, PathBuf::from("/b/game.release.html"));
    }

    #[test]
    fn test_non_zero_exit_is_link_failed() {
        let tc = Toolchain::default();
        let driver = LinkDriver {
            toolchain: &tc,
            runner: &ExitWith(3),
            assets_dir: Path::new("/nonexistent"),
            shell_file: Path::new("/nonexistent"),
            output_stem: "main",
        };
        let err = driver
            .link(&objects(&["a.o"]), Path::new("lib.a"), BuildMode::Debug, Path::new("/b"))
            .unwrap_err();
        assert!(matches!(err, BuildError::LinkFailed { code: Some(3), .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
