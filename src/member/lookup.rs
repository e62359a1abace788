//! User id to handle resolution.

// self
use crate::{
	_prelude::*,
	error::NetworkError,
	http,
	member::MemberApi,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

#[derive(Debug, Deserialize)]
struct MemberHandle {
	handle: String,
}

impl MemberApi {
	/// Resolves `user_id` to the member's handle.
	///
	/// The lookup is unauthenticated and returns the first handle when several members match.
	/// An empty result fails with [`Error::NotFound`], which is logged before it is returned.
	pub async fn resolve_handle(&self, user_id: u64) -> Result<String> {
		const KIND: CallKind = CallKind::HandleLookup;

		let span = CallSpan::new(KIND, "resolve_handle");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		obs::debug("member", "resolve_handle", format_args!("userId: {user_id}"));

		let result = span
			.instrument(async move {
				let response = self
					.http_client
					.get(self.base_url.clone())
					.query(&[("userId", user_id.to_string()), ("fields", "handle".into())])
					.send()
					.await
					.map_err(NetworkError::from)?;
				let response = http::ensure_success("GET", response).await?;
				let members = http::decode_json::<Vec<MemberHandle>>(response).await?;

				match members.into_iter().next() {
					Some(member) => Ok(member.handle),
					None => {
						let err = Error::NotFound { user_id };

						obs::log_full_error(&err, "member");

						Err(err)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}
