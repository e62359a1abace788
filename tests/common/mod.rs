//! Helpers shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// self
use m2m_member_traits::{
	auth::{
		AuthFuture, AuthenticatorFactory, AuthenticatorSettings, MachineAuthenticator, Secret,
		TokenCache,
	},
	config::{Auth0Config, Config, KafkaConfig},
	error::AuthError,
	http::ReqwestHttpClient,
	member::MemberApi,
	url::Url,
};

pub const CLIENT_ID: &str = "member-sync-client";
pub const CLIENT_SECRET: &str = "member-sync-secret";
pub const AUDIENCE: &str = "https://m2m.example.com/";
pub const STUB_TOKEN: &str = "stub-token";

pub fn auth0_config(auth_url: &str, proxy_url: Option<&str>) -> Auth0Config {
	Auth0Config {
		url: Url::parse(auth_url).expect("Test Auth0 URL should parse."),
		audience: AUDIENCE.into(),
		proxy_server_url: proxy_url
			.map(|value| Url::parse(value).expect("Test proxy URL should parse.")),
		client_id: CLIENT_ID.into(),
		client_secret: Secret::new(CLIENT_SECRET),
	}
}

/// Configuration whose member API and token endpoint both live on `base_url`.
pub fn config(base_url: &str) -> Config {
	let base = base_url.trim_end_matches('/');

	Config {
		kafka: KafkaConfig {
			url: "localhost:9092".into(),
			group_id: "member-traits-test".into(),
			client_cert: None,
			client_cert_key: None,
		},
		member_api_url: Url::parse(&format!("{base}/v5/members"))
			.expect("Test member API URL should parse."),
		auth0: auth0_config(&format!("{base}/oauth/token"), None),
	}
}

/// Authenticator stub that counts calls and returns a fixed token or a fixed rejection.
#[derive(Debug, Default)]
pub struct StubAuthenticator {
	token: Option<String>,
	calls: AtomicUsize,
}
impl StubAuthenticator {
	pub fn issuing(token: impl Into<String>) -> Self {
		Self { token: Some(token.into()), calls: AtomicUsize::new(0) }
	}

	pub fn rejecting() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl MachineAuthenticator for StubAuthenticator {
	fn machine_token<'a>(
		&'a self,
		client_id: &'a str,
		client_secret: &'a Secret,
	) -> AuthFuture<'a> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			assert_eq!(client_id, CLIENT_ID);
			assert_eq!(client_secret.expose(), CLIENT_SECRET);

			match &self.token {
				Some(token) => Ok(Secret::new(token.clone())),
				None => Err(AuthError::Rejected {
					error: "invalid_client".into(),
					description: Some("Unknown client.".into()),
					status: Some(401),
				}),
			}
		})
	}
}

/// Factory handing out `authenticator` and counting its own invocations.
pub fn counting_factory(
	authenticator: Arc<StubAuthenticator>,
	constructions: Arc<AtomicUsize>,
) -> Arc<AuthenticatorFactory> {
	Arc::new(move |_settings: AuthenticatorSettings| {
		constructions.fetch_add(1, Ordering::SeqCst);

		let authenticator: Arc<dyn MachineAuthenticator> = authenticator.clone();

		authenticator
	})
}

/// Member API client against `config` whose tokens come from `authenticator`.
pub fn stubbed_member_api(config: &Config, authenticator: Arc<StubAuthenticator>) -> MemberApi {
	let factory = counting_factory(authenticator, Default::default());
	let tokens = Arc::new(TokenCache::with_factory(config.auth0.clone(), factory));

	MemberApi::new(ReqwestHttpClient::default(), config.member_api_url.clone(), tokens)
}
