//! Member-profile API client: handle lookup plus authenticated trait reads and writes.
//!
//! Wire format, relative to the configured member API base URL:
//!
//! - `GET {base}?userId={id}&fields=handle` (unauthenticated)
//! - `GET {base}/{handle}/traits?traitIds={trait_id}` (bearer token)
//! - `POST | PUT {base}/{handle}/traits` with a JSON body (bearer token)
//!
//! Authenticated calls obtain their token from the shared [`TokenCache`] before the request
//! is sent. Nothing is retried.

mod lookup;
pub mod traits;

pub use traits::*;

// self
use crate::{_prelude::*, auth::TokenCache, error::ConfigError, http::ReqwestHttpClient};

/// Client for the member-profile API.
#[derive(Clone)]
pub struct MemberApi {
	/// HTTP client wrapper used for every member API request.
	pub http_client: ReqwestHttpClient,
	/// Member API base URL.
	pub base_url: Url,
	/// Token cache consulted before every authenticated call.
	pub tokens: Arc<TokenCache>,
}
impl MemberApi {
	/// Creates a client for `base_url` sharing `tokens` with the rest of the process.
	pub fn new(
		http_client: impl Into<ReqwestHttpClient>,
		base_url: Url,
		tokens: Arc<TokenCache>,
	) -> Self {
		Self { http_client: http_client.into(), base_url, tokens }
	}

	/// `{base}/{handle}/traits`, with `handle` percent-encoded as a single path segment.
	pub fn traits_url(&self, handle: &str) -> Result<Url> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeBase { key: "MEMBER_API_URL" })?
			.pop_if_empty()
			.push(handle)
			.push("traits");

		Ok(url)
	}
}
impl Debug for MemberApi {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemberApi")
			.field("base_url", &self.base_url.as_str())
			.field("tokens", &self.tokens)
			.finish()
	}
}
