//! Error types for reverse geocoding.

use thiserror::Error;

/// Failure reason delivered for every transport-level error.
pub const NETWORK_ERROR_REASON: &str = "network error";

/// Errors raised while resolving a coordinate to an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The provider answered with a non-success HTTP status.
    #[error("geocode request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Transport diagnostic.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("geocode request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in whole seconds.
        timeout_secs: u64,
    },
    /// The provider could not be reached.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport diagnostic.
        message: String,
    },
    /// The response body was not a valid reverse geocode response.
    #[error("failed to parse geocode response: {message}")]
    Parse {
        /// Decoder diagnostic.
        message: String,
    },
    /// The provider reported a non-zero status.
    #[error("geocode provider returned status {status}: {message}")]
    Provider {
        /// Status as reported by the provider.
        status: String,
        /// Provider message, verbatim.
        message: String,
    },
}

impl GeocodeError {
    /// Reason string reported to callers in a failed outcome.
    ///
    /// Provider failures carry the provider's own message; every transport
    /// and decoding failure collapses to [`NETWORK_ERROR_REASON`].
    #[must_use]
    pub fn failure_reason(&self) -> String {
        match self {
            Self::Provider { message, .. } => message.clone(),
            Self::Http { .. } | Self::Timeout { .. } | Self::Network { .. } | Self::Parse { .. } => {
                NETWORK_ERROR_REASON.to_owned()
            }
        }
    }

    /// Whether the error originated below the provider protocol.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Provider { .. })
    }
}

/// Error type for [`crate::HttpGeocodeProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured endpoint is not an absolute URL.
    #[error("invalid geocode endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser diagnostic.
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GeocodeError::Http { url: "http://x".into(), status: 502, message: "bad gateway".into() })]
    #[case(GeocodeError::Timeout { url: "http://x".into(), timeout_secs: 30 })]
    #[case(GeocodeError::Network { url: "http://x".into(), message: "refused".into() })]
    #[case(GeocodeError::Parse { message: "eof".into() })]
    fn transport_failures_collapse_to_network_error(#[case] err: GeocodeError) {
        assert!(err.is_transport());
        assert_eq!(err.failure_reason(), NETWORK_ERROR_REASON);
    }

    #[rstest]
    fn provider_failure_keeps_message_verbatim() {
        let err = GeocodeError::Provider {
            status: "302".into(),
            message: "天配额超限，限制访问".into(),
        };
        assert!(!err.is_transport());
        assert_eq!(err.failure_reason(), "天配额超限，限制访问");
    }
}
