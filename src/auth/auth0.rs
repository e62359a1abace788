//! Auth0 client-credentials authenticator with per-client token reuse.
//!
//! Tokens are minted through the `oauth2` crate's client-credentials request with the client
//! secret in the request body and the configured `audience` as an extra parameter. When a proxy
//! is configured the request is posted to the proxy instead and carries `auth0_url` so the proxy
//! knows where to forward it. A minted token is reused for its client id while more than
//! [`REFRESH_MARGIN`] of its lifetime remains; concurrent misses for the same client id share a
//! single exchange through an async guard.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use oauth2::{
	AuthType, ClientId, ClientSecret, HttpClientError, RequestTokenError, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{AuthFuture, AuthenticatorSettings, MachineAuthenticator, Secret},
	error::AuthError,
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Remaining lifetime below which a cached token is exchanged again.
pub const REFRESH_MARGIN: Duration = Duration::seconds(60);

/// Machine authenticator backed by an Auth0 (or Auth0-proxy) token endpoint.
pub struct Auth0Authenticator {
	settings: AuthenticatorSettings,
	http_client: ReqwestHttpClient,
	tokens: Mutex<HashMap<String, CachedToken>>,
	guards: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}
impl Auth0Authenticator {
	/// Creates an authenticator for the given endpoint settings.
	pub fn new(settings: AuthenticatorSettings, http_client: ReqwestHttpClient) -> Self {
		Self {
			settings,
			http_client,
			tokens: Default::default(),
			guards: Default::default(),
		}
	}

	/// Endpoint settings this authenticator was constructed from.
	pub fn settings(&self) -> &AuthenticatorSettings {
		&self.settings
	}

	fn fresh_token(&self, client_id: &str, now: OffsetDateTime) -> Option<Secret> {
		self.tokens
			.lock()
			.get(client_id)
			.filter(|cached| cached.is_fresh_at(now))
			.map(|cached| cached.token.clone())
	}

	fn guard(&self, client_id: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards
			.entry(client_id.to_owned())
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone()
	}

	async fn exchange(
		&self,
		client_id: &str,
		client_secret: &Secret,
	) -> Result<CachedToken, AuthError> {
		const KIND: CallKind = CallKind::TokenExchange;

		let span = CallSpan::new(KIND, "exchange_client_credentials");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		obs::debug(
			"auth0",
			"exchange_client_credentials",
			format!("client_id: {client_id}, endpoint: {}", self.settings.token_endpoint()),
		);

		let result = span
			.instrument(async move {
				let meta = ResponseMetadataSlot::default();
				let instrumented = self.http_client.with_metadata(meta.clone());
				let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
					.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
					.set_token_uri(TokenUrl::from_url(self.settings.token_endpoint().clone()))
					.set_auth_type(AuthType::RequestBody);
				let mut request = oauth_client
					.exchange_client_credentials()
					.add_extra_param("audience", self.settings.audience.clone());

				if self.settings.proxy_url.is_some() {
					request =
						request.add_extra_param("auth0_url", self.settings.auth_url.to_string());
				}

				let response = request
					.request_async(&instrumented)
					.await
					.map_err(|err| map_request_error(meta.take(), err))?;
				let token = response.access_token().secret().to_owned();
				let issued_at = OffsetDateTime::now_utc();
				let expires_at = match response.expires_in() {
					Some(lifetime) => i64::try_from(lifetime.as_secs())
						.ok()
						.and_then(|secs| issued_at.checked_add(Duration::seconds(secs))),
					None => jwt_expiry(&token),
				};

				Ok(CachedToken { token: Secret::new(token), expires_at })
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}
impl MachineAuthenticator for Auth0Authenticator {
	fn machine_token<'a>(
		&'a self,
		client_id: &'a str,
		client_secret: &'a Secret,
	) -> AuthFuture<'a> {
		Box::pin(async move {
			if let Some(token) = self.fresh_token(client_id, OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let guard = self.guard(client_id);
			let _singleflight = guard.lock().await;

			// Another caller may have finished the exchange while this one waited.
			if let Some(token) = self.fresh_token(client_id, OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let cached = self.exchange(client_id, client_secret).await?;
			let token = cached.token.clone();

			self.tokens.lock().insert(client_id.to_owned(), cached);

			Ok(token)
		})
	}
}
impl Debug for Auth0Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Auth0Authenticator")
			.field("settings", &self.settings)
			.field("cached_clients", &self.tokens.lock().len())
			.finish()
	}
}

#[derive(Clone, Debug)]
struct CachedToken {
	token: Secret,
	expires_at: Option<OffsetDateTime>,
}
impl CachedToken {
	fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| expires_at - now > REFRESH_MARGIN)
	}
}

/// Reads the `exp` claim from a JWT payload without verifying the signature.
fn jwt_expiry(token: &str) -> Option<OffsetDateTime> {
	#[derive(Deserialize)]
	struct Claims {
		exp: i64,
	}

	let payload = token.split('.').nth(1)?;
	let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
	let claims = serde_json::from_slice::<Claims>(&bytes).ok()?;

	OffsetDateTime::from_unix_timestamp(claims.exp).ok()
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> AuthError {
	let status = meta.as_ref().and_then(|value| value.status);
	let retry_after = meta.as_ref().and_then(|value| value.retry_after);

	match err {
		RequestTokenError::ServerResponse(response) => AuthError::Rejected {
			error: response.error().as_ref().to_owned(),
			description: response.error_description().cloned(),
			status,
		},
		RequestTokenError::Request(HttpClientError::Reqwest(inner)) if inner.is_timeout() =>
			AuthError::TokenEndpoint {
				message: "Request timed out while calling the token endpoint".into(),
				status,
				retry_after,
			},
		RequestTokenError::Request(HttpClientError::Reqwest(inner)) =>
			AuthError::transport(*inner),
		RequestTokenError::Request(HttpClientError::Http(inner)) => AuthError::Request(inner),
		RequestTokenError::Request(HttpClientError::Io(inner)) => AuthError::Io(inner),
		RequestTokenError::Request(HttpClientError::Other(message)) =>
			AuthError::TokenEndpoint { message, status, retry_after },
		RequestTokenError::Request(_) => AuthError::TokenEndpoint {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
			retry_after,
		},
		RequestTokenError::Parse(source, _body) =>
			AuthError::TokenResponseParse { source, status },
		RequestTokenError::Other(message) =>
			AuthError::TokenEndpoint { message, status, retry_after },
	}
}
