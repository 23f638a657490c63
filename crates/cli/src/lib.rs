#![deny(unsafe_code)]

//! # Overview
//!
//! `rfuzzy_cli` implements the command-line front-end for the rfuzzy fuzzy
//! hashing tool. It recognises the classic switch set (`-m`, `-k`, `-d`,
//! `-p`, `-g`, `-x`, `-r`, `-c`, `-a`, `-t`, `-b`, `-l`, `-s`, `-v`,
//! `-V`/`-h`) and wires the walker, the digest engine, the match index, and
//! the cluster set together per mode.
//!
//! # Design
//!
//! [`run`] accepts an argument iterator together with handles for standard
//! output and error, so the binary stays a two-line wrapper and every mode
//! is testable against in-memory buffers. Result output (signatures,
//! matches, clusters) goes to the standard-output handle; diagnostics flow
//! through the `logging` crate where `-s` and `-v` are honoured.
//!
//! # Invariants
//!
//! - [`run`] never panics; fatal conditions surface as a non-zero status.
//! - Per-file failures (unreadable inputs, malformed signature lines) are
//!   reported and skipped; they never abort the run.

mod app;
mod options;
mod output;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

/// Parses arguments and executes the selected mode.
///
/// Returns the process status: `0` for success (including `--help` and
/// `--version`), `1` for usage or fatal I/O errors.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let parsed = match options::parse(arguments) {
        Ok(parsed) => parsed,
        Err(err) => {
            use clap::error::ErrorKind;
            let rendered = err.render();
            return if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = write!(stdout, "{rendered}");
                0
            } else {
                let _ = write!(stderr, "{rendered}");
                1
            };
        }
    };
    app::run_parsed(&parsed, stdout, stderr)
}

/// Maps a status from [`run`] onto a process exit code.
#[must_use]
pub fn exit_code_from(status: i32) -> ExitCode {
    if status == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(u8::try_from(status).unwrap_or(1))
    }
}
