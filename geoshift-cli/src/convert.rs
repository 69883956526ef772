//! `convert` command implementation.

use std::io::Write;

use clap::Parser;
use geoshift_core::{ConversionRequest, convert_json};
use log::debug;

use crate::{ARG_FROM, ARG_LATITUDE, ARG_LONGITUDE, ARG_TO, CliError, policy, write_line};

/// CLI arguments for the `convert` subcommand.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    long_about = "Convert a position between frames. Supply the position and \
                 frame names as flags, or pass a full request as JSON with \
                 --json. Unknown frame names return the position unchanged \
                 unless --strict is set.",
    about = "Convert a position between coordinate frames"
)]
pub(crate) struct ConvertArgs {
    /// Frame the position is given in (wgs84, gcj02 or bd09).
    #[arg(long = ARG_FROM, value_name = "frame", required_unless_present = "json")]
    pub(crate) from: Option<String>,
    /// Frame to convert into.
    #[arg(long = ARG_TO, value_name = "frame", required_unless_present = "json")]
    pub(crate) to: Option<String>,
    /// Latitude in degrees.
    #[arg(
        long = ARG_LATITUDE,
        value_name = "degrees",
        allow_negative_numbers = true,
        required_unless_present = "json"
    )]
    pub(crate) latitude: Option<f64>,
    /// Longitude in degrees.
    #[arg(
        long = ARG_LONGITUDE,
        value_name = "degrees",
        allow_negative_numbers = true,
        required_unless_present = "json"
    )]
    pub(crate) longitude: Option<f64>,
    /// Conversion request as `{"latitude", "longitude", "from", "to"}` JSON.
    #[arg(long, value_name = "payload", conflicts_with_all = [ARG_FROM, ARG_TO, ARG_LATITUDE, ARG_LONGITUDE])]
    pub(crate) json: Option<String>,
    /// Reject unknown frame names.
    #[arg(long)]
    pub(crate) strict: bool,
}

impl ConvertArgs {
    pub(crate) fn into_request(self) -> Result<ConversionRequest, CliError> {
        Ok(ConversionRequest {
            latitude: self
                .latitude
                .ok_or(CliError::MissingFlag { flag: ARG_LATITUDE })?,
            longitude: self
                .longitude
                .ok_or(CliError::MissingFlag { flag: ARG_LONGITUDE })?,
            from: self.from.ok_or(CliError::MissingFlag { flag: ARG_FROM })?,
            to: self.to.ok_or(CliError::MissingFlag { flag: ARG_TO })?,
        })
    }
}

pub(crate) fn run_convert(args: ConvertArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let output = execute_convert(args)?;
    write_line(writer, &output)
}

/// Produce the `{"longitude", "latitude"}` response for `args`.
pub(crate) fn execute_convert(args: ConvertArgs) -> Result<String, CliError> {
    let policy = policy(args.strict);
    if let Some(payload) = &args.json {
        debug!("converting JSON request");
        return Ok(convert_json(payload, policy)?);
    }
    let request = args.into_request()?;
    debug!("converting {} -> {}", request.from, request.to);
    let response = request.resolve(policy)?;
    serde_json::to_string(&response).map_err(CliError::SerialiseOutput)
}
