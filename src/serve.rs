//! Serve the build directory over HTTP after a successful build (`--run`).
//!
//! Delegates to Python's built-in static file server; blocks until it exits.

use crate::error::{BuildError, Result};
use crate::process::Invocation;
use crate::ui;
use std::path::Path;
use std::process::Command;

pub fn invocation(build_dir: &Path, port: u16) -> Invocation {
    Invocation::new("python3")
        .args(["-m", "http.server"])
        .arg(port.to_string())
        .current_dir(build_dir)
}

pub fn page_url(output: &Path, port: u16) -> String {
    let page = output
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("http://localhost:{}/{}", port, page)
}

pub fn serve(build_dir: &Path, output: &Path, port: u16) -> Result<()> {
    ui::info(format!(
        "serving {} at {}",
        build_dir.display(),
        page_url(output, port)
    ));

    let inv = invocation(build_dir, port);
    ui::cmd(&inv);
    // Inherit stdio so the server's request log reaches the terminal.
    Command::new(&inv.program)
        .args(&inv.args)
        .current_dir(build_dir)
        .status()
        .map_err(|e| BuildError::io("failed to start http server", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_uses_output_file_name() {
        assert_eq!(
            page_url(Path::new("/p/build/web/main.release.html"), 8000),
            "http://localhost:8000/main.release.html"
        );
    }

    #[test]
    fn test_server_runs_inside_build_dir() {
        let inv = invocation(Path::new("/p/build/web"), 8080);
        assert_eq!(inv.to_string(), "python3 -m http.server 8080");
        assert_eq!(inv.cwd.as_deref(), Some(Path::new("/p/build/web")));
    }
}
