//! One-stop facade over the token cache, member API client, and Kafka options.
//!
//! A service builds one [`MemberTraitsHelper`] at startup and, if it wants the helper to be
//! reachable from anywhere, installs it process-wide with [`MemberTraitsHelper::install`].
//! Every operation is independent; no session object is handed out.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenCache},
	config::Config,
	error::ConfigError,
	http::ReqwestHttpClient,
	kafka::KafkaOptions,
	member::{MemberApi, TraitWrite},
};

static GLOBAL: OnceLock<MemberTraitsHelper> = OnceLock::new();

/// Facade exposing the Kafka, token, handle, and traits operations.
#[derive(Clone, Debug)]
pub struct MemberTraitsHelper {
	config: Arc<Config>,
	tokens: Arc<TokenCache>,
	members: MemberApi,
}
impl MemberTraitsHelper {
	/// Builds the helper with a fresh reqwest client.
	pub fn from_config(config: Config) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self::with_http_client(config, client))
	}

	/// Builds the helper around a caller-provided HTTP client.
	pub fn with_http_client(config: Config, http_client: impl Into<ReqwestHttpClient>) -> Self {
		let http_client = http_client.into();
		let tokens = Arc::new(TokenCache::new(config.auth0.clone(), http_client.clone()));
		let members = MemberApi::new(http_client, config.member_api_url.clone(), tokens.clone());

		Self::from_parts(config, tokens, members)
	}

	/// Assembles the helper from an existing token cache and member API client.
	pub fn from_parts(config: Config, tokens: Arc<TokenCache>, members: MemberApi) -> Self {
		Self { config: Arc::new(config), tokens, members }
	}

	/// Installs `self` as the process-wide helper and returns the installed instance.
	pub fn install(self) -> Result<&'static Self> {
		GLOBAL.set(self).map_err(|_| ConfigError::AlreadyInstalled)?;

		GLOBAL.get().ok_or_else(|| ConfigError::AlreadyInstalled.into())
	}

	/// Returns the process-wide helper, if one was installed.
	pub fn global() -> Option<&'static Self> {
		GLOBAL.get()
	}

	/// Configuration the helper was built from.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Kafka connection options for the configured brokers.
	pub fn kafka_options(&self) -> KafkaOptions {
		KafkaOptions::from_config(&self.config.kafka)
	}

	/// Current M2M bearer token.
	pub async fn m2m_token(&self) -> Result<Secret> {
		Ok(self.tokens.get_token().await?)
	}

	/// Handle of the member identified by `user_id`.
	pub async fn handle_by_user_id(&self, user_id: u64) -> Result<String> {
		self.members.resolve_handle(user_id).await
	}

	/// Traits of type `trait_id` for `handle`, as returned by the member API.
	pub async fn member_traits(&self, handle: &str, trait_id: &str) -> Result<Value> {
		self.members.fetch_traits(handle, trait_id).await
	}

	/// Creates (`is_create`) or updates the traits of `handle`.
	pub async fn save_member_traits<B>(&self, handle: &str, body: &B, is_create: bool) -> Result<()>
	where
		B: ?Sized + Serialize + Sync,
	{
		self.members.save_traits(handle, body, TraitWrite::from_create_flag(is_create)).await
	}
}
