//! Crate-level error taxonomy shared by the loader, normalizer, token manager, and orchestrator.

// self
use crate::{_prelude::*, mail::ValidationError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error surfaced by every public operation.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The caller's request is malformed or incomplete; fix the input before retrying.
	#[error("Invalid email payload: {0}")]
	InvalidRequest(#[from] ValidationError),
	/// Server-side configuration is incomplete; the operator must fix the environment.
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),
	/// Acquiring a bearer token failed.
	#[error("Failed to acquire Graph access token: {0}")]
	Auth(#[from] AuthError),
	/// The mail API rejected the request.
	#[error("Microsoft Graph sendMail failed ({status}): {message}")]
	Provider {
		/// HTTP status code returned by the mail API.
		status: u16,
		/// Provider message extracted from the response body.
		message: String,
	},
	/// No response was received from the mail API.
	#[error("Network error calling Microsoft Graph: {0}")]
	Network(#[from] TransportError),
}
impl Error {
	/// Returns `true` when the failure was caused by the caller's input rather than by the
	/// server, its credentials, or the remote API.
	pub fn is_caller_error(&self) -> bool {
		matches!(self, Self::InvalidRequest(_))
	}
}

/// Configuration failures raised while loading settings or building clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Neither a delegated token nor a complete client-credential set is configured.
	#[error("Missing Microsoft Graph configuration variables: {}", names.join(", "))]
	MissingVariables {
		/// Names of the unset credential variables.
		names: Vec<&'static str>,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint URL could not be derived from the configured bases.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An endpoint base cannot carry path segments (e.g. a `data:` URL).
	#[error("Endpoint base `{base}` cannot carry path segments.")]
	CannotBeABase {
		/// Offending base URL.
		base: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token acquisition failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The client-credential flow was selected but some credentials are missing.
	#[error(
		"Client credential flow requires tenant_id, client_id, and client_secret to be provided either as parameters or environment variables (missing: {})",
		missing.join(", ")
	)]
	MissingCredentials {
		/// Names of the missing credential fields.
		missing: Vec<&'static str>,
	},
	/// Endpoint configuration prevented building the token URL.
	#[error(transparent)]
	Endpoint(#[from] ConfigError),
	/// The identity provider could not be reached.
	#[error("Failed to contact Microsoft identity platform: {source}")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The token endpoint answered with a non-success status.
	#[error("Token endpoint returned {status}: {body}")]
	Rejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// The token endpoint answered with a body that is not a JSON object.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The token endpoint answered with JSON that lacks a usable token or lifetime.
	#[error("Token response {reason}.")]
	InvalidResponse {
		/// Description of the missing or invalid field.
		reason: &'static str,
	},
}
impl AuthError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Transport-level failures reaching the mail API.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure or timeout.
	#[error("{source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
