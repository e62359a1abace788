//! Process-lifetime holder for the M2M authenticator.
//!
//! The authenticator is built lazily on the first [`TokenCache::get_token`] call through a
//! [`OnceLock`], so concurrent first callers never construct more than one instance. Every call
//! then asks that authenticator for a token; reuse and refresh stay inside the authenticator.

// self
use crate::{
	_prelude::*,
	auth::{
		Auth0Authenticator, AuthenticatorFactory, AuthenticatorSettings, MachineAuthenticator,
		Secret,
	},
	config::Auth0Config,
	error::AuthError,
	http::ReqwestHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Lazily constructed, never recreated M2M authenticator plus the credentials it is asked with.
pub struct TokenCache {
	config: Auth0Config,
	factory: Arc<AuthenticatorFactory>,
	authenticator: OnceLock<Arc<dyn MachineAuthenticator>>,
}
impl TokenCache {
	/// Creates a cache whose authenticator is an [`Auth0Authenticator`] sharing `http_client`.
	pub fn new(config: Auth0Config, http_client: ReqwestHttpClient) -> Self {
		let factory: Arc<AuthenticatorFactory> =
			Arc::new(move |settings: AuthenticatorSettings| {
				let authenticator: Arc<dyn MachineAuthenticator> =
					Arc::new(Auth0Authenticator::new(settings, http_client.clone()));

				authenticator
			});

		Self::with_factory(config, factory)
	}

	/// Creates a cache that builds its authenticator with a caller-supplied factory.
	pub fn with_factory(config: Auth0Config, factory: Arc<AuthenticatorFactory>) -> Self {
		Self { config, factory, authenticator: OnceLock::new() }
	}

	/// Returns a current bearer token, constructing the authenticator on first use.
	pub async fn get_token(&self) -> Result<Secret, AuthError> {
		const KIND: CallKind = CallKind::Token;

		let span = CallSpan::new(KIND, "get_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let authenticator = self.authenticator();

				authenticator
					.machine_token(&self.config.client_id, &self.config.client_secret)
					.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Returns whether the authenticator has been constructed yet.
	pub fn is_initialized(&self) -> bool {
		self.authenticator.get().is_some()
	}

	fn authenticator(&self) -> &Arc<dyn MachineAuthenticator> {
		self.authenticator.get_or_init(|| {
			obs::debug("token_cache", "authenticator", "constructing M2M authenticator");

			(self.factory)(AuthenticatorSettings::from_config(&self.config))
		})
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("client_id", &self.config.client_id)
			.field("initialized", &self.is_initialized())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::auth::AuthFuture;

	struct EchoAuthenticator;
	impl MachineAuthenticator for EchoAuthenticator {
		fn machine_token<'a>(
			&'a self,
			client_id: &'a str,
			_client_secret: &'a Secret,
		) -> AuthFuture<'a> {
			Box::pin(async move { Ok(Secret::new(format!("token-for-{client_id}"))) })
		}
	}

	fn config() -> Auth0Config {
		Auth0Config {
			url: Url::parse("https://auth.example.com/oauth/token")
				.expect("Auth URL should parse."),
			audience: "https://m2m.example.com/".into(),
			proxy_server_url: None,
			client_id: "svc".into(),
			client_secret: Secret::new("svc-secret"),
		}
	}

	#[tokio::test]
	async fn authenticator_is_built_lazily_once() {
		let constructions = Arc::new(AtomicUsize::new(0));
		let counter = constructions.clone();
		let cache = TokenCache::with_factory(
			config(),
			Arc::new(move |_settings: AuthenticatorSettings| {
				counter.fetch_add(1, Ordering::SeqCst);

				let authenticator: Arc<dyn MachineAuthenticator> = Arc::new(EchoAuthenticator);

				authenticator
			}),
		);

		assert!(!cache.is_initialized());
		assert_eq!(constructions.load(Ordering::SeqCst), 0);

		for _ in 0..3 {
			let token = cache.get_token().await.expect("Echo authenticator should not fail.");

			assert_eq!(token.expose(), "token-for-svc");
		}

		assert!(cache.is_initialized());
		assert_eq!(constructions.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn debug_output_hides_secret() {
		let cache = TokenCache::with_factory(
			config(),
			Arc::new(|_settings: AuthenticatorSettings| {
				let authenticator: Arc<dyn MachineAuthenticator> = Arc::new(EchoAuthenticator);

				authenticator
			}),
		);
		let rendered = format!("{cache:?}");

		assert!(rendered.contains("svc"));
		assert!(!rendered.contains("svc-secret"));
	}
}
