//! Command-line interface for Geoshift's coordinate and address tooling.
#![forbid(unsafe_code)]

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use geoshift_core::FramePolicy;
use tracing_subscriber::EnvFilter;

mod address;
mod convert;
mod error;
mod track;

pub use error::CliError;

use address::AddressArgs;
use convert::ConvertArgs;
use track::TrackArgs;

const ARG_LATITUDE: &str = "latitude";
const ARG_LONGITUDE: &str = "longitude";
const ARG_FROM: &str = "from";
const ARG_TO: &str = "to";
const ENV_LATITUDE: &str = "GEOSHIFT_CMDS_ADDRESS_LATITUDE";
const ENV_LONGITUDE: &str = "GEOSHIFT_CMDS_ADDRESS_LONGITUDE";

/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// Run the Geoshift CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print().map_err(CliError::WriteOutput)?;
            return Ok(());
        }
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    let mut stdout = io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Convert(args) => convert::run_convert(args, writer),
        Command::Address(args) => address::run_address(args, writer),
        Command::Track(args) => track::run_track(&args, io::stdin().lock(), writer),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
    if installed.is_err() {
        log::debug!("log subscriber already installed");
    }
}

const fn policy(strict: bool) -> FramePolicy {
    if strict {
        FramePolicy::Strict
    } else {
        FramePolicy::Lenient
    }
}

fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writer
        .write_all(line.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}

#[derive(Debug, Parser)]
#[command(
    name = "geoshift",
    about = "Convert coordinates between WGS84, GCJ02 and BD09 and resolve addresses",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a position between coordinate frames.
    Convert(ConvertArgs),
    /// Resolve a position to an address.
    Address(AddressArgs),
    /// Re-express a stream of BD09 fixes in another frame.
    Track(TrackArgs),
}

#[cfg(test)]
mod tests;
