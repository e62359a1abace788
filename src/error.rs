//! Crate-level error types shared by the token cache, member lookup, and trait client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// M2M token exchange failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Member API transport or HTTP failure.
	#[error(transparent)]
	Network(#[from] NetworkError),

	/// No member exists for the requested user id.
	#[error("User with id {user_id} does not exist.")]
	NotFound {
		/// User id that produced an empty lookup result.
		user_id: u64,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required configuration value is absent or empty.
	#[error("Configuration value `{key}` is required.")]
	MissingVar {
		/// Configuration key.
		key: &'static str,
	},
	/// A configuration value cannot be parsed as a URL.
	#[error("Configuration value `{key}` is not a valid URL.")]
	InvalidUrl {
		/// Configuration key.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL cannot carry path segments (e.g. `mailto:`), so resource paths cannot be built.
	#[error("Configuration value `{key}` cannot be used as a base URL.")]
	CannotBeBase {
		/// Configuration key.
		key: &'static str,
	},
	/// A process-wide helper was installed already.
	#[error("A process-wide member traits helper is already installed.")]
	AlreadyInstalled,
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

/// M2M token exchange failures. Returned unmodified by the token cache.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with an OAuth error (bad credentials, unknown audience, ...).
	#[error("Token endpoint rejected the credentials: {error}.")]
	Rejected {
		/// OAuth error code.
		error: String,
		/// Optional human-readable description supplied by the endpoint.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an unexpected but non-OAuth response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token request could not be built.
	#[error("Token request could not be built.")]
	Request(#[from] oauth2::http::Error),
	/// Network failure while calling the token endpoint.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during the exchange.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl AuthError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// HTTP status reported by the token endpoint, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. }
			| Self::TokenEndpoint { status, .. }
			| Self::TokenResponseParse { status, .. } => *status,
			_ => None,
		}
	}
}

/// Member API failures outside of token acquisition.
#[derive(Debug, ThisError)]
pub enum NetworkError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the member API.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Member API answered with a non-success status.
	#[error("Member API returned {status} for {method} {url}.")]
	Status {
		/// HTTP method of the failed call.
		method: &'static str,
		/// Request URL.
		url: String,
		/// HTTP status code.
		status: u16,
		/// Leading part of the response body, for diagnostics.
		body_preview: String,
	},
	/// Member API returned a body that does not match the expected shape.
	#[error("Member API returned a malformed body.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
}
impl NetworkError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}
impl From<ReqwestError> for NetworkError {
	fn from(e: ReqwestError) -> Self {
		Self::transport(e)
	}
}
