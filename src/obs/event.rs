// self
use crate::_prelude::*;

/// Emits a debug event tagged with the component and operation it came from.
pub fn debug(component: &'static str, context: &'static str, message: impl Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(component, context, message = %message);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (component, context, message);
	}
}

/// Logs an error together with every `source()` below it.
pub fn log_full_error(err: &(dyn StdError + 'static), component: &'static str) {
	let chain = error_chain(err);

	#[cfg(feature = "tracing")]
	{
		tracing::error!(component, error = %chain, "{err}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (chain, component);
	}
}

/// Renders `err` and its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
	let mut rendered = err.to_string();
	let mut source = err.source();

	while let Some(inner) = source {
		rendered.push_str(": ");
		rendered.push_str(&inner.to_string());

		source = inner.source();
	}

	rendered
}
