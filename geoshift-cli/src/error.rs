//! Error types emitted by the Geoshift CLI.

use std::io;
use std::sync::Arc;

use geoshift_core::ConversionError;
use geoshift_geocode::{ProviderBuildError, RequestError};
use thiserror::Error;

/// Errors emitted by the Geoshift CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A required flag was not supplied.
    #[error("missing --{flag}")]
    MissingFlag { flag: &'static str },
    /// A frame name or conversion payload was rejected.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// The address query could not be built.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// Building the geocode provider failed.
    #[error("failed to configure geocode provider for {endpoint}: {source}")]
    BuildGeocodeProvider {
        endpoint: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
    /// The lookup finished without a result.
    #[error("address lookup failed: {reason}")]
    LookupFailed { reason: String },
    /// The lookup was dropped before it produced an outcome.
    #[error("address lookup was abandoned before it completed")]
    LookupAbandoned,
    /// A line of fix input could not be parsed.
    #[error("invalid fix on line {line}: {message}")]
    InvalidFix { line: usize, message: String },
    /// Reading input failed.
    #[error("failed to read input: {0}")]
    ReadInput(#[source] io::Error),
    /// Serialising output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] io::Error),
}
