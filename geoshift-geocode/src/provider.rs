//! HTTP-based reverse geocoding.
//!
//! [`HttpGeocodeProvider`] issues one `GET` per lookup against a provider
//! endpoint and decodes the JSON envelope described in [`crate::response`].
//! The provider expects `location=<lat>,<lon>`, latitude first, which is the
//! opposite of the `geo::Coord` convention used everywhere else.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use geoshift_geocode::{GeocodeProvider, HttpGeocodeProvider, HttpGeocodeProviderConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpGeocodeProviderConfig::default()
//!     .with_api_key("my-key")
//!     .with_timeout(Duration::from_secs(5));
//! let provider = HttpGeocodeProvider::with_config(config)?;
//! let address = provider.reverse_geocode(Coord { x: 116.4166, y: 39.9227 }).await?;
//! println!("{}", address.formatted_address.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use geoshift_core::Frame;
use reqwest::Client;
use url::Url;

use crate::response::{GeocodeResponse, ReverseGeocodeResponse};
use crate::{GeocodeError, ProviderBuildError};

/// Resolves coordinates to addresses.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Frame the provider expects coordinates in.
    fn native_frame(&self) -> Frame {
        Frame::PROVIDER_NATIVE
    }

    /// Look up the address at `location`, given in [`Self::native_frame`].
    async fn reverse_geocode(&self, location: Coord) -> Result<GeocodeResponse, GeocodeError>;
}

/// Default reverse geocode endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://api.map.baidu.com/geocoder/v2/";

/// Default user agent for geocode requests.
pub const DEFAULT_USER_AGENT: &str = "geoshift-geocode/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpGeocodeProvider`].
#[derive(Debug, Clone)]
pub struct HttpGeocodeProviderConfig {
    /// Endpoint URL, without query string parameters for the lookup.
    pub endpoint: String,
    /// Access key appended as `ak` when set.
    pub api_key: Option<String>,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpGeocodeProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpGeocodeProviderConfig {
    /// Create a new configuration with the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the access key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Reverse geocode provider speaking the `geocoder/v2` HTTP protocol.
///
/// The underlying [`Client`] and its connection pool are shared by every
/// lookup; per-request state lives in the request future and is released
/// when that future completes or is dropped.
#[derive(Debug)]
pub struct HttpGeocodeProvider {
    client: Client,
    endpoint: Url,
    config: HttpGeocodeProviderConfig,
}

impl HttpGeocodeProvider {
    /// Create a provider for `endpoint` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpGeocodeProviderConfig::new(endpoint))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// fails to build.
    pub fn with_config(config: HttpGeocodeProviderConfig) -> Result<Self, ProviderBuildError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| ProviderBuildError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// Configuration the provider was built with.
    #[must_use]
    pub const fn config(&self) -> &HttpGeocodeProviderConfig {
        &self.config
    }

    /// Build the lookup URL for `location`.
    ///
    /// Query parameters already present on the endpoint are kept in front of
    /// the lookup parameters.
    fn build_lookup_url(&self, location: Coord) -> Url {
        let lookup = format!("output=json&location={},{}", location.y, location.x);
        let query = match self.endpoint.query().filter(|existing| !existing.is_empty()) {
            Some(existing) => format!("{existing}&{lookup}"),
            None => lookup,
        };
        let mut url = self.endpoint.clone();
        url.set_query(Some(&query));
        if let Some(key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("ak", key);
        }
        url
    }

    /// Convert a reqwest error to a `GeocodeError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &Url) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return GeocodeError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() {
            return GeocodeError::Parse {
                message: error.to_string(),
            };
        }

        GeocodeError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl GeocodeProvider for HttpGeocodeProvider {
    async fn reverse_geocode(&self, location: Coord) -> Result<GeocodeResponse, GeocodeError> {
        let url = self.build_lookup_url(location);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let envelope: ReverseGeocodeResponse = response
            .json()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        envelope.into_result()
    }
}
