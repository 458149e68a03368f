//! Build directory cleanup (`--clean`).

use crate::error::{BuildError, Result};
use crate::ui;
use std::fs;
use std::path::Path;

/// Remove `build_dir` and everything in it. Returns whether anything was removed.
pub fn clean(build_dir: &Path) -> Result<bool> {
    if !build_dir.exists() {
        return Ok(false);
    }
    ui::info(format!("removing {}", build_dir.display()));
    fs::remove_dir_all(build_dir)
        .map_err(|e| BuildError::io(format!("failed to remove {}", build_dir.display()), e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_objects() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build/web");
        fs::create_dir_all(build.join("obj/main")).unwrap();
        fs::write(build.join("obj/main/main.o"), "obj").unwrap();

        assert!(clean(&build).unwrap());
        assert!(!build.exists());
        assert!(dir.path().join("build").exists());
    }

    #[test]
    fn test_clean_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!clean(&dir.path().join("build/web")).unwrap());
    }
}
