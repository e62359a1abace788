//! Authenticated trait reads and create-or-update writes.

// crates.io
use reqwest::Method;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::NetworkError,
	http,
	member::MemberApi,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// How a traits payload is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraitWrite {
	/// Insert new traits (`POST`).
	Create,
	/// Replace existing traits (`PUT`).
	Update,
}
impl TraitWrite {
	/// Maps the `is_create` flag used by callers onto a write mode.
	pub const fn from_create_flag(is_create: bool) -> Self {
		if is_create { Self::Create } else { Self::Update }
	}

	/// HTTP method used for this write mode.
	pub fn method(self) -> Method {
		match self {
			Self::Create => Method::POST,
			Self::Update => Method::PUT,
		}
	}

	/// Returns the method name as a static label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Create => "POST",
			Self::Update => "PUT",
		}
	}
}
impl From<bool> for TraitWrite {
	fn from(is_create: bool) -> Self {
		Self::from_create_flag(is_create)
	}
}

impl MemberApi {
	/// Fetches the traits of type `trait_id` for `handle` and returns the body untouched.
	pub async fn fetch_traits(&self, handle: &str, trait_id: &str) -> Result<Value> {
		const KIND: CallKind = CallKind::TraitsFetch;

		let span = CallSpan::new(KIND, "fetch_traits");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		obs::debug(
			"member",
			"fetch_traits",
			format_args!("{{ handle: {handle}, traitId: {trait_id} }}"),
		);

		let result = span
			.instrument(async move {
				let token = self.tokens.get_token().await?;
				let response = self
					.http_client
					.get(self.traits_url(handle)?)
					.query(&[("traitIds", trait_id)])
					.bearer_auth(token.expose())
					.send()
					.await
					.map_err(NetworkError::from)?;
				let response = http::ensure_success("GET", response).await?;

				Ok(http::decode_json::<Value>(response).await?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Creates (`POST`) or replaces (`PUT`) the traits of `handle` with `body`.
	///
	/// The token is obtained before the write is sent, and exactly one write is attempted.
	pub async fn save_traits<B>(&self, handle: &str, body: &B, write: TraitWrite) -> Result<()>
	where
		B: ?Sized + Serialize + Sync,
	{
		const KIND: CallKind = CallKind::TraitsSave;

		let span = CallSpan::new(KIND, "save_traits");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		obs::debug(
			"member",
			"save_traits",
			format_args!(
				"{{ handle: {handle}, body: {}, isCreate: {} }}",
				JsonPreview(body),
				write == TraitWrite::Create,
			),
		);

		let result = span
			.instrument(async move {
				let token = self.tokens.get_token().await?;
				let response = self
					.http_client
					.request(write.method(), self.traits_url(handle)?)
					.bearer_auth(token.expose())
					.json(body)
					.send()
					.await
					.map_err(NetworkError::from)?;

				http::ensure_success(write.as_str(), response).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}

/// Renders a request body as JSON only when the log event carrying it is emitted.
struct JsonPreview<'a, B>(&'a B)
where
	B: ?Sized;
impl<B> Display for JsonPreview<'_, B>
where
	B: ?Sized + Serialize,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match serde_json::to_string(self.0) {
			Ok(json) => f.write_str(&json),
			Err(e) => write!(f, "<unserializable: {e}>"),
		}
	}
}
