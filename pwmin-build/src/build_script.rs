//! Helpers for calling the allocator from a firmware `build.rs`
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     pwmin_build::build_script::validate_or_panic("pwm_in.toml");
//! }
//!
//! // firmware
//! const PINS: &str = env!("RP2040_PWM_IN_PINS");
//! ```

use std::io::Write;
use std::path::Path;

use crate::config::load_config;
use crate::diagnostics::render_build_error;
use crate::emitter::CargoEnvEmitter;
use crate::pass::{run_build, BuildError, BuildReport};

/// Validate the config at `path` and emit the pin list as cargo env vars to `out`
pub fn validate_and_emit<W: Write>(
    path: impl AsRef<Path>,
    mut out: W,
) -> Result<BuildReport, BuildError> {
    let path = path.as_ref();
    // Re-run if the config changes
    writeln!(out, "cargo:rerun-if-changed={}", path.display())
        .map_err(|e| BuildError::Emit(e.into()))?;

    let config = load_config(path)?;
    let report = run_build(&config, CargoEnvEmitter::new(&mut out))?;

    writeln!(
        out,
        "cargo:warning={} validated successfully ({} PWM input sensor(s))",
        path.display(),
        report.bindings.len()
    )
    .map_err(|e| BuildError::Emit(e.into()))?;
    Ok(report)
}

/// Build script entry point
///
/// # Panics
///
/// Panics with a boxed diagnostic if the config cannot be loaded or any
/// sensor is rejected, which fails the build.
pub fn validate_or_panic(path: impl AsRef<Path>) -> BuildReport {
    match validate_and_emit(path, std::io::stdout()) {
        Ok(report) => report,
        Err(e) => panic!("\n{}\n", render_build_error(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_and_emit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pwm_in.toml");
        let toml = r#"
        board = "rpipico"

        [[sensor]]
        name = "a"
        pin = 3

        [[sensor]]
        name = "b"
        pin = 7
        "#;
        std::fs::write(&path, toml).unwrap();

        let mut out = Vec::new();
        let report = validate_and_emit(&path, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(report.bindings.len(), 2);
        assert!(lines[0].starts_with("cargo:rerun-if-changed="));
        assert_eq!(lines[1], "cargo:rustc-env=RP2040_PWM_IN_PINS=3,7");
        assert!(lines[2].starts_with("cargo:warning="));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_validate_and_emit_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pwm_in.toml");
        let toml = r#"
        board = "rpipico"

        [[sensor]]
        name = "a"
        pin = 3

        [[sensor]]
        name = "b"
        pin = 3
        "#;
        std::fs::write(&path, toml).unwrap();

        let mut out = Vec::new();
        let err = validate_and_emit(&path, &mut out).unwrap_err();
        assert!(matches!(err, BuildError::Declaration { index: 1, .. }));
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("rustc-env"));
    }

    #[test]
    fn test_missing_config() {
        let mut out = Vec::new();
        let err = validate_and_emit("does_not_exist.toml", &mut out).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    #[should_panic(expected = "Invalid PWM input configuration")]
    fn test_validate_or_panic() {
        validate_or_panic("does_not_exist.toml");
    }
}
