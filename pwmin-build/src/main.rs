//! `pwmin-check`: validate a PWM input config outside of a build

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pwmin_build::diagnostics::render_build_error;
use pwmin_build::{load_config, run_build, BuildError, BuildReport, DefineSet, HeaderEmitter};

#[derive(Parser, Debug)]
#[command(
    name = "pwmin-check",
    version,
    about = "Check PWM input pin allocation for an RP2xxx build"
)]
struct Args {
    /// Build configuration (TOML)
    config: PathBuf,

    /// Override the board named in the config
    #[arg(long)]
    board: Option<String>,

    /// Only check pin parity, allow shared slices
    #[arg(long)]
    parity_only: bool,

    /// Write the pin list to a C header
    #[arg(long, value_name = "FILE")]
    header: Option<PathBuf>,
}

fn check(args: &Args) -> Result<BuildReport, BuildError> {
    tracing::info!("Loading configuration from: {}", args.config.display());
    let mut config = load_config(&args.config)?;
    if let Some(board) = &args.board {
        config.board = Some(board.clone());
    }
    if args.parity_only {
        config.enforce_slice_exclusivity = false;
    }

    let mut defines = DefineSet::new();
    let report = run_build(&config, &mut defines)?;

    // Only touch the header once the whole pass succeeded
    if let Some(path) = &args.header {
        let mut header = HeaderEmitter::create(path).map_err(|e| BuildError::Emit(e.into()))?;
        defines
            .replay(&mut header)
            .map_err(|e| BuildError::Emit(e.into()))?;
        header.finish().map_err(|e| BuildError::Emit(e.into()))?;
        tracing::info!("Wrote {}", path.display());
    }
    Ok(report)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match check(&args) {
        Ok(report) => {
            report.log_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", render_build_error(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEEDED: &str = "#pragma once\n#define RP2040_PWM_IN_PINS 3,7\n";

    fn args(dir: &tempfile::TempDir, pins: &[u8]) -> Args {
        let mut toml = String::from("board = \"rpipico\"\n");
        for (i, pin) in pins.iter().enumerate() {
            toml.push_str(&format!("[[sensor]]\nname = \"s{}\"\npin = {}\n", i, pin));
        }
        let config = dir.path().join("pwm_in.toml");
        std::fs::write(&config, toml).unwrap();

        let header = dir.path().join("pwm_in_pins.h");
        std::fs::write(&header, SEEDED).unwrap();

        Args {
            config,
            board: None,
            parity_only: false,
            header: Some(header),
        }
    }

    #[test]
    fn test_rejected_config_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        // GPIO3 and GPIO19 share slice 1
        let args = args(&dir, &[3, 19]);

        let err = check(&args).unwrap_err();
        assert!(matches!(err, BuildError::Declaration { index: 1, .. }));
        let contents = std::fs::read_to_string(args.header.unwrap()).unwrap();
        assert_eq!(contents, SEEDED);
    }

    #[test]
    fn test_accepted_config_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(&dir, &[5, 9]);

        let report = check(&args).unwrap();
        assert_eq!(report.bindings.len(), 2);
        let contents = std::fs::read_to_string(args.header.unwrap()).unwrap();
        assert!(contents.starts_with("// Generated by pwmin"));
        assert!(contents.ends_with("#define RP2040_PWM_IN_PINS 5,9\n"));
    }
}
