//! Authentication against the strato identity provider.
//!
//! Login is an Authorization-Code-with-PKCE round trip: generate a verifier,
//! open the provider's authorization page in the browser, capture the
//! redirect on a local listener, exchange the code for a token triple and
//! persist it. Every other command goes through [`Authenticator::get_token`],
//! which validates the stored access token and refreshes it transparently
//! when it has expired.

pub mod browser;
pub mod callback_server;
pub mod error;
pub mod flow;
pub mod pkce;
pub mod storage;
pub mod types;
pub mod validate;

pub use callback_server::CallbackServer;
pub use error::AuthError;
pub use flow::{AuthFlow, Authenticator};
pub use storage::TokenStore;
pub use types::{AuthRequest, CallbackParams, OauthToken, PkceChallenge, ProviderConfig};
pub use validate::TokenValidator;
