//! M2M authentication: redacted secrets, the authenticator contract, the Auth0
//! client-credentials authenticator, and the process-lifetime token cache.

pub mod auth0;
pub mod authenticator;
pub mod secret;
pub mod token_cache;

pub use auth0::*;
pub use authenticator::*;
pub use secret::*;
pub use token_cache::*;
