//! Typed configuration for the member API, the M2M authenticator, and Kafka.
//!
//! Values are read from environment variables named after the keys below. Empty values are
//! treated as absent, so `KAFKA_CLIENT_CERT=""` behaves the same as an unset variable.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

const KAFKA_URL: &str = "KAFKA_URL";
const KAFKA_GROUP_ID: &str = "KAFKA_GROUP_ID";
const KAFKA_CLIENT_CERT: &str = "KAFKA_CLIENT_CERT";
const KAFKA_CLIENT_CERT_KEY: &str = "KAFKA_CLIENT_CERT_KEY";
const MEMBER_API_URL: &str = "MEMBER_API_URL";
const AUTH0_URL: &str = "AUTH0_URL";
const AUTH0_AUDIENCE: &str = "AUTH0_AUDIENCE";
const AUTH0_PROXY_SERVER_URL: &str = "AUTH0_PROXY_SERVER_URL";
const AUTH0_CLIENT_ID: &str = "AUTH0_CLIENT_ID";
const AUTH0_CLIENT_SECRET: &str = "AUTH0_CLIENT_SECRET";

const DEFAULT_KAFKA_URL: &str = "localhost:9092";

/// Full service configuration.
#[derive(Clone, Debug)]
pub struct Config {
	/// Kafka connection parameters.
	pub kafka: KafkaConfig,
	/// Base URL of the member-profile API (e.g. `https://api.example.com/v5/members`).
	pub member_api_url: Url,
	/// M2M authenticator settings and client credentials.
	pub auth0: Auth0Config,
}
impl Config {
	/// Loads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Loads the configuration through an arbitrary key lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let require = |key: &'static str| get(key).ok_or(ConfigError::MissingVar { key });
		let kafka = KafkaConfig {
			url: get(KAFKA_URL).unwrap_or_else(|| DEFAULT_KAFKA_URL.into()),
			group_id: require(KAFKA_GROUP_ID)?,
			client_cert: get(KAFKA_CLIENT_CERT),
			client_cert_key: get(KAFKA_CLIENT_CERT_KEY).map(Secret::new),
		};
		let member_api_url = parse_url(MEMBER_API_URL, &require(MEMBER_API_URL)?)?;

		if member_api_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeBase { key: MEMBER_API_URL });
		}

		let auth0 = Auth0Config {
			url: parse_url(AUTH0_URL, &require(AUTH0_URL)?)?,
			audience: require(AUTH0_AUDIENCE)?,
			proxy_server_url: get(AUTH0_PROXY_SERVER_URL)
				.map(|raw| parse_url(AUTH0_PROXY_SERVER_URL, &raw))
				.transpose()?,
			client_id: require(AUTH0_CLIENT_ID)?,
			client_secret: Secret::new(require(AUTH0_CLIENT_SECRET)?),
		};

		Ok(Self { kafka, member_api_url, auth0 })
	}
}

/// Kafka connection parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KafkaConfig {
	/// Broker connection string (`host:port[,host:port]`).
	pub url: String,
	/// Consumer group identifier.
	pub group_id: String,
	/// PEM client certificate, when TLS client auth is used.
	pub client_cert: Option<String>,
	/// PEM client key, when TLS client auth is used.
	pub client_cert_key: Option<Secret>,
}

/// M2M authenticator settings and client credentials.
#[derive(Clone, Debug)]
pub struct Auth0Config {
	/// Token endpoint URL.
	pub url: Url,
	/// API audience requested for machine tokens.
	pub audience: String,
	/// Optional proxy that forwards token requests to [`Auth0Config::url`].
	pub proxy_server_url: Option<Url>,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })
}
