//! Code emitters
//!
//! Concrete sinks for the build-time constants produced by an allocation.
//!
//! - [`DefineSet`] keeps defines in memory
//! - [`CargoEnvEmitter`] prints `cargo:rustc-env` lines from a build script,
//!   read back in firmware with `env!`
//! - [`HeaderEmitter`] writes a C header with `#define` lines

use std::convert::Infallible;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use pwmin_core::CodeEmitter;

/// In-memory list of defines, in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineSet {
    defines: Vec<(String, String)>,
}

impl DefineSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a define, if it was emitted
    pub fn get(&self, name: &str) -> Option<&str> {
        self.defines
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All defines in emission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defines.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of emitted defines
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    /// Check if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Forward every define, in emission order, to another emitter
    pub fn replay<E: CodeEmitter>(&self, mut emitter: E) -> Result<(), E::Error> {
        for (name, value) in self.iter() {
            emitter.add_define(name, value)?;
        }
        Ok(())
    }
}

impl CodeEmitter for DefineSet {
    type Error = Infallible;

    fn add_define(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        self.defines.push((name.to_string(), value.to_string()));
        Ok(())
    }
}

/// Emits `cargo:rustc-env=NAME=VALUE` lines
pub struct CargoEnvEmitter<W: Write> {
    out: W,
}

impl CargoEnvEmitter<io::Stdout> {
    /// Emitter writing to stdout, for use inside `build.rs`
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CargoEnvEmitter<W> {
    /// Create an emitter writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Return the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CodeEmitter for CargoEnvEmitter<W> {
    type Error = io::Error;

    fn add_define(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        tracing::debug!("cargo:rustc-env {}={}", name, value);
        writeln!(self.out, "cargo:rustc-env={}={}", name, value)
    }
}

/// Writes a C header with one `#define` per constant
///
/// The header is written even when no define follows, so firmware sees an
/// empty allocation rather than a missing file.
pub struct HeaderEmitter<W: Write> {
    out: W,
}

impl HeaderEmitter<BufWriter<File>> {
    /// Create (or truncate) a header file at `path`
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> HeaderEmitter<W> {
    /// Start a header on `out`
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "// Generated by pwmin. Do not edit.")?;
        writeln!(out, "#pragma once")?;
        writeln!(out)?;
        Ok(Self { out })
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> CodeEmitter for HeaderEmitter<W> {
    type Error = io::Error;

    fn add_define(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        writeln!(self.out, "#define {} {}", name, value)
    }
}
