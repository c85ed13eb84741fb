//! Command-line argument parsing.
//!
//! Usage:
//!   starjs [--config <file>] [-v…] [--pretty] run <file|-> [-f <name>] [<arg>…]
//!   starjs [--config <file>] [-v…] serve

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};

use crate::value::HostValue;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "starjs", version, about = "Run Starlark functions with JSON arguments")]
pub struct CliArgs {
    /// Configuration file (overrides `STARJS_CONFIG` and the user config dir).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Pretty-print the `run` envelope.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a source file, call one function, print the result envelope.
    Run {
        /// Starlark source file, or `-` for stdin.
        file: PathBuf,

        /// Function to call (defaults to `interpreter.default_function`).
        #[arg(short, long)]
        function: Option<String>,

        /// Call arguments.  Each is parsed as JSON; anything that is not
        /// valid JSON is passed as a string.
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },
    /// Stay resident, answering one JSON argument array per stdin line.
    Serve,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv<I, T>(argv: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(argv)
}

/// Interpret one command-line call argument.
pub fn parse_host_arg(arg: &str) -> HostValue {
    serde_json::from_str::<HostValue>(arg).unwrap_or_else(|_| HostValue::String(arg.to_owned()))
}

/// Read the source text from a file, or stdin when `path` is `-`.
pub fn read_source(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        Ok(s)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Assemble the positional host arguments for one `run` call.
///
/// A missing function name is sent as null so the gateway picks its
/// configured default.
pub fn host_args(source: String, function: Option<String>, args: &[String]) -> Vec<HostValue> {
    let mut out = Vec::with_capacity(args.len() + 2);
    out.push(HostValue::String(source));
    out.push(function.map_or(HostValue::Null, HostValue::String));
    out.extend(args.iter().map(|a| parse_host_arg(a)));
    out
}

/// Log filter for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
