//! Contract for components that mint machine-to-machine tokens.

// self
use crate::{_prelude::*, auth::Secret, config::Auth0Config, error::AuthError};

/// Boxed future returned by [`MachineAuthenticator::machine_token`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<Secret, AuthError>> + 'a + Send>>;

/// Builds the process-lifetime authenticator from its endpoint settings.
pub type AuthenticatorFactory =
	dyn Fn(AuthenticatorSettings) -> Arc<dyn MachineAuthenticator> + Send + Sync;

/// Mints bearer tokens for a client id/secret pair.
///
/// Implementations own token reuse and refresh. Callers ask on every request and never
/// inspect expiry themselves.
pub trait MachineAuthenticator: Send + Sync {
	/// Returns a currently valid machine token for the client.
	fn machine_token<'a>(&'a self, client_id: &'a str, client_secret: &'a Secret)
	-> AuthFuture<'a>;
}

/// Endpoint settings an authenticator is constructed from.
///
/// Only the endpoint subset of [`Auth0Config`] is carried here; client credentials are passed
/// per call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatorSettings {
	/// Token endpoint URL.
	pub auth_url: Url,
	/// API audience requested for machine tokens.
	pub audience: String,
	/// Optional proxy that forwards token requests to `auth_url`.
	pub proxy_url: Option<Url>,
}
impl AuthenticatorSettings {
	/// Picks the endpoint settings out of an Auth0 configuration.
	pub fn from_config(config: &Auth0Config) -> Self {
		Self {
			auth_url: config.url.clone(),
			audience: config.audience.clone(),
			proxy_url: config.proxy_server_url.clone(),
		}
	}

	/// URL the token request is sent to: the proxy when configured, otherwise `auth_url`.
	pub fn token_endpoint(&self) -> &Url {
		self.proxy_url.as_ref().unwrap_or(&self.auth_url)
	}
}
