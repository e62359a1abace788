//! Observability helpers for token and member API calls.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits spans named `m2m_member_traits.call` with the `call` and `stage`
//!   fields, and backs the [`debug`] and [`log_full_error`] events.
//! - `metrics` increments the `m2m_member_traits_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`.

mod counter;
mod event;
mod span;

pub use counter::*;
pub use event::*;
pub use span::*;

/// Outbound call kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Token request served through the token cache.
	Token,
	/// Client-credentials exchange against the token endpoint.
	TokenExchange,
	/// User id to handle lookup.
	HandleLookup,
	/// Authenticated traits read.
	TraitsFetch,
	/// Authenticated traits create or update.
	TraitsSave,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Token => "token",
			CallKind::TokenExchange => "token_exchange",
			CallKind::HandleLookup => "handle_lookup",
			CallKind::TraitsFetch => "traits_fetch",
			CallKind::TraitsSave => "traits_save",
		}
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
