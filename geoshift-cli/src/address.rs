//! `address` command implementation.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use geoshift_geocode::provider::DEFAULT_ENDPOINT;
use geoshift_geocode::{
    AddressQuery, Delivery, GeocodeOrchestrator, GeocodeOutcome, GeocodeProvider, GeocodeRequest,
    HttpGeocodeProvider, HttpGeocodeProviderConfig,
};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::oneshot;

use crate::{
    ARG_LATITUDE, ARG_LONGITUDE, CliError, ENV_LATITUDE, ENV_LONGITUDE, policy, write_line,
};

pub(crate) const ARG_FRAME: &str = "frame";
pub(crate) const ARG_DETAIL: &str = "detail";
pub(crate) const ARG_CORRELATION_ID: &str = "correlation-id";
pub(crate) const ARG_QUERY: &str = "query";
pub(crate) const ARG_ENDPOINT: &str = "endpoint";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_STRICT: &str = "strict";

/// CLI arguments for the `address` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "address",
    long_about = "Resolve a position to an address through the reverse \
                 geocode provider. The position is converted to the provider \
                 frame first. Provider settings can come from CLI flags, \
                 configuration files, or GEOSHIFT_* environment variables.",
    about = "Resolve a position to an address"
)]
#[ortho_config(prefix = "GEOSHIFT")]
pub(crate) struct AddressArgs {
    /// Latitude in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Frame the position is given in (defaults to bd09).
    #[arg(long = ARG_FRAME, value_name = "frame")]
    #[serde(default)]
    pub(crate) frame: Option<String>,
    /// Print the structured address as JSON.
    #[arg(long = ARG_DETAIL)]
    #[serde(default)]
    pub(crate) detail: bool,
    /// Token echoed back with the result.
    #[arg(long = ARG_CORRELATION_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) correlation_id: Option<String>,
    /// Address query as `{"latitude", "longitude", "type", "flag"}` JSON.
    #[arg(long = ARG_QUERY, value_name = "payload", conflicts_with_all = ["latitude", "longitude", "frame", "detail"])]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Reverse geocode endpoint URL.
    #[arg(long = ARG_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    /// Provider access key.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Reject unknown frame names.
    #[arg(long = ARG_STRICT)]
    #[serde(default)]
    pub(crate) strict: bool,
}

impl AddressArgs {
    pub(crate) fn into_config(self) -> Result<AddressConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AddressConfig::try_from(merged)
    }
}

/// Resolved `address` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct AddressConfig {
    /// Lookup to perform.
    pub(crate) request: GeocodeRequest,
    /// Provider settings.
    pub(crate) provider: HttpGeocodeProviderConfig,
}

impl TryFrom<AddressArgs> for AddressConfig {
    type Error = CliError;

    fn try_from(args: AddressArgs) -> Result<Self, Self::Error> {
        let query = match args.query {
            Some(payload) => AddressQuery::from_json(&payload)?,
            None => AddressQuery {
                latitude: args.latitude.ok_or(CliError::MissingArgument {
                    field: ARG_LATITUDE,
                    env: ENV_LATITUDE,
                })?,
                longitude: args.longitude.ok_or(CliError::MissingArgument {
                    field: ARG_LONGITUDE,
                    env: ENV_LONGITUDE,
                })?,
                frame: args
                    .frame
                    .unwrap_or_else(|| geoshift_core::Frame::PROVIDER_NATIVE.to_string()),
                flag: i64::from(args.detail),
            },
        };
        let request = query.into_request(args.correlation_id, policy(args.strict))?;

        let mut provider =
            HttpGeocodeProviderConfig::new(args.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()));
        if let Some(key) = args.api_key {
            provider = provider.with_api_key(key);
        }
        if let Some(secs) = args.timeout_secs {
            provider = provider.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self { request, provider })
    }
}

pub(crate) fn run_address(args: AddressArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let provider = HttpGeocodeProvider::with_config(config.provider.clone()).map_err(|source| {
        CliError::BuildGeocodeProvider {
            endpoint: config.provider.endpoint.clone(),
            source,
        }
    })?;
    execute_address(provider, config.request, writer)
}

/// Run one lookup against `provider` and print its outcome.
pub(crate) fn execute_address<P>(
    provider: P,
    request: GeocodeRequest,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    P: GeocodeProvider + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let detail = request.detail;
    info!(
        "resolving {},{} ({})",
        request.coordinate.y, request.coordinate.x, request.frame
    );

    let orchestrator = GeocodeOrchestrator::new(provider, runtime.handle().clone());
    let (tx, rx) = oneshot::channel();
    orchestrator.submit(request, tx);
    let delivery = runtime
        .block_on(rx)
        .map_err(|_| CliError::LookupAbandoned)?;

    let line = render_delivery(delivery, detail)?;
    write_line(writer, &line)
}

/// Render a delivery as the command's output line.
///
/// Plain lookups print the address text; detailed lookups print the
/// structured address as JSON. A correlation id wraps either form in
/// `{"correlation_id", "result"}`.
pub(crate) fn render_delivery(delivery: Delivery, detail: bool) -> Result<String, CliError> {
    let address = match delivery.outcome {
        GeocodeOutcome::Success(address) => address,
        GeocodeOutcome::Failure { reason } => return Err(CliError::LookupFailed { reason }),
    };
    let result = if detail {
        address.to_json()
    } else {
        serde_json::Value::from(address.formatted_address)
    };
    match (delivery.correlation_id, result) {
        (Some(id), result) => serde_json::to_string(&json!({
            "correlation_id": id,
            "result": result,
        }))
        .map_err(CliError::SerialiseOutput),
        (None, serde_json::Value::String(text)) => Ok(text),
        (None, result) => serde_json::to_string(&result).map_err(CliError::SerialiseOutput),
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AddressConfig, CliError> {
    let merged = AddressArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AddressConfig::try_from(merged)
}
