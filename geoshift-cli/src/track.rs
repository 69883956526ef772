//! `track` command: re-express a stream of provider fixes in another frame.

use std::io::{BufRead, Write};
use std::sync::mpsc;

use clap::Parser;
use geoshift_core::live::{ConvertedFix, RawFix};
use geoshift_core::{LiveLocationAdapter, parse_target_frame};
use log::{debug, info};

use crate::{CliError, policy, write_line};

const ARG_TARGET: &str = "target";

/// CLI arguments for the `track` subcommand.
///
/// Fixes are read from stdin as `latitude,longitude,radius` lines in the
/// provider frame and written to stdout in the same shape.
#[derive(Debug, Clone, Parser)]
#[command(name = "track", about = "Re-express a stream of BD09 fixes in another frame")]
pub(crate) struct TrackArgs {
    /// Frame to deliver fixes in.
    #[arg(long = ARG_TARGET, value_name = "frame", default_value = "bd09")]
    pub(crate) target: String,
    /// Reject an unknown target frame instead of passing fixes through.
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) fn run_track(
    args: &TrackArgs,
    reader: impl BufRead,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let target = parse_target_frame(&args.target, policy(args.strict))?;
    info!("tracking fixes in {target}");

    let (tx, rx) = mpsc::channel::<ConvertedFix>();
    let subscriber = move |fix: ConvertedFix| {
        if tx.send(fix).is_err() {
            debug!("fix receiver closed");
        }
    };
    let adapter = LiveLocationAdapter::new(subscriber).with_target_frame(target);

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(CliError::ReadInput)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        adapter.on_fix(parse_fix(index + 1, trimmed)?);
        for fix in rx.try_iter() {
            write_line(
                writer,
                &format!("{},{},{}", fix.latitude, fix.longitude, fix.radius),
            )?;
        }
    }
    Ok(())
}

/// Parse a `latitude,longitude,radius` line.
pub(crate) fn parse_fix(line: usize, input: &str) -> Result<RawFix, CliError> {
    let invalid = |message: String| CliError::InvalidFix { line, message };
    let fields: Vec<&str> = input.split(',').map(str::trim).collect();
    let [latitude, longitude, radius] = fields.as_slice() else {
        return Err(invalid(format!(
            "expected latitude,longitude,radius but found {} fields",
            fields.len()
        )));
    };
    let latitude = latitude
        .parse::<f64>()
        .map_err(|err| invalid(format!("latitude {latitude:?}: {err}")))?;
    let longitude = longitude
        .parse::<f64>()
        .map_err(|err| invalid(format!("longitude {longitude:?}: {err}")))?;
    let radius = radius
        .parse::<f32>()
        .map_err(|err| invalid(format!("radius {radius:?}: {err}")))?;
    Ok(RawFix {
        latitude,
        longitude,
        radius,
    })
}
