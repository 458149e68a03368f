use colored::*;
use regex::Regex;

/// Turns raw Emscripten output into a short hint for the most common failures.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        // 1. Missing entry point (exported as _main)
        if output.contains("undefined symbol: main")
            || output.contains("undefined exported symbol: \"_main\"")
        {
            return Some(format!(
                "The link is missing a {} function.\nThe page exports {}; make sure the {} module defines it.",
                "main()".bold().yellow(),
                "_main".bold(),
                "main".bold().green()
            ));
        }

        // 2. Unresolved symbol (wasm-ld)
        let undefined = Regex::new(r"undefined symbol: ([A-Za-z_][\w:<>~]*)").ok()?;
        if let Some(caps) = undefined.captures(output) {
            return Some(format!(
                "It looks like a {} error for {}.\nCheck that the external library was built for the web and that every module is listed in {}.",
                "Linker".bold().red(),
                caps[1].bold().yellow(),
                "emforge.toml".bold().yellow()
            ));
        }

        // 3. Missing header
        let header = Regex::new(r"fatal error: '?([^':\s]+)'? file not found").ok()?;
        if let Some(caps) = header.captures(output) {
            return Some(format!(
                "It looks like a {} error ({}).\nAdd its directory to {} in emforge.toml.",
                "Missing Header".bold().red(),
                caps[1].bold().yellow(),
                "[build] include".bold().yellow()
            ));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linker_error() {
        let err = "wasm-ld: error: main.o: undefined symbol: DrawText";
        let msg = FeedbackAnalyzer::analyze(err).unwrap();
        assert!(msg.contains("Linker"));
        assert!(msg.contains("DrawText"));
    }

    #[test]
    fn test_include_error() {
        let err = "main/src/main.cpp:1:10: fatal error: 'raylib.h' file not found";
        let msg = FeedbackAnalyzer::analyze(err).unwrap();
        assert!(msg.contains("Missing Header"));
        assert!(msg.contains("raylib.h"));
    }

    #[test]
    fn test_main_error() {
        let err = "wasm-ld: error: symbol exported via --export not found: undefined exported symbol: \"_main\"";
        let msg = FeedbackAnalyzer::analyze(err).unwrap();
        assert!(msg.contains("main()"));
    }

    #[test]
    fn test_unrecognised_output() {
        assert!(FeedbackAnalyzer::analyze("warning: unused variable 'x'").is_none());
    }
}
