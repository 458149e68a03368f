//! Decides whether a cached object can be reused.
//!
//! Neither policy tracks headers or compile flags: switching build mode or
//! editing an included header does not make an object stale.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub trait StalenessPolicy: Sync {
    fn is_stale(&self, source: &Path, object: &Path) -> bool;

    /// Called after `object` was successfully rebuilt from `source`.
    fn record(&self, _source: &Path, _object: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

/// Stale when the object is missing or the source is strictly newer.
#[derive(Debug, Default, Clone, Copy)]
pub struct MtimePolicy;

impl StalenessPolicy for MtimePolicy {
    fn is_stale(&self, source: &Path, object: &Path) -> bool {
        if !object.exists() {
            return true;
        }
        let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified());
        match (modified(source), modified(object)) {
            (Ok(src), Ok(obj)) => src > obj,
            // Unreadable metadata, safe to recompile
            _ => true,
        }
    }
}

/// Stale when the object is missing or the source digest differs from the one
/// recorded in `<object>.sha256` at the last compile.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentHashPolicy;

impl ContentHashPolicy {
    fn sidecar(object: &Path) -> PathBuf {
        let mut name = object.as_os_str().to_owned();
        name.push(".sha256");
        PathBuf::from(name)
    }
}

impl StalenessPolicy for ContentHashPolicy {
    fn is_stale(&self, source: &Path, object: &Path) -> bool {
        if !object.exists() {
            return true;
        }
        let recorded = match fs::read_to_string(Self::sidecar(object)) {
            Ok(s) => s,
            Err(_) => return true,
        };
        match hash_file(source) {
            Ok(current) => current != recorded.trim(),
            Err(_) => true,
        }
    }

    fn record(&self, source: &Path, object: &Path) -> std::io::Result<()> {
        fs::write(Self::sidecar(object), hash_file(source)?)
    }
}

pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn write_with_mtime(path: &Path, contents: &str, mtime: SystemTime) {
        fs::write(path, contents).unwrap();
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[test]
    fn test_missing_object_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.cpp");
        fs::write(&src, "int a;").unwrap();
        let obj = dir.path().join("a.o");
        assert!(MtimePolicy.is_stale(&src, &obj));
        assert!(ContentHashPolicy.is_stale(&src, &obj));
    }

    #[test]
    fn test_mtime_policy_compares_strictly() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.cpp");
        let obj = dir.path().join("a.o");
        let t0 = SystemTime::now() - Duration::from_secs(100);

        write_with_mtime(&src, "int a;", t0);
        write_with_mtime(&obj, "obj", t0);
        assert!(!MtimePolicy.is_stale(&src, &obj), "equal mtimes are fresh");

        write_with_mtime(&obj, "obj", t0 + Duration::from_secs(10));
        assert!(!MtimePolicy.is_stale(&src, &obj));

        write_with_mtime(&src, "int a;", t0 + Duration::from_secs(20));
        assert!(MtimePolicy.is_stale(&src, &obj));
    }

    #[test]
    fn test_content_policy_ignores_touch_but_sees_edits() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        let obj = dir.path().join("a.o");
        let t0 = SystemTime::now() - Duration::from_secs(100);

        write_with_mtime(&src, "int a;", t0);
        fs::write(&obj, "obj").unwrap();
        assert!(ContentHashPolicy.is_stale(&src, &obj), "no sidecar yet");

        ContentHashPolicy.record(&src, &obj).unwrap();
        assert!(!ContentHashPolicy.is_stale(&src, &obj));

        write_with_mtime(&src, "int a;", SystemTime::now() + Duration::from_secs(60));
        assert!(!ContentHashPolicy.is_stale(&src, &obj));

        fs::write(&src, "int b;").unwrap();
        assert!(ContentHashPolicy.is_stale(&src, &obj));
    }

    #[test]
    fn test_sidecar_sits_next_to_object() {
        assert_eq!(
            ContentHashPolicy::sidecar(Path::new("/b/obj/main/main.o")),
            PathBuf::from("/b/obj/main/main.o.sha256")
        );
    }
}
