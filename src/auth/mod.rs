//! Session collaborator.
//!
//! - [`Session`] / [`SessionProvider`]: what the engine needs to call the API
//! - [`SessionStore`]: sign-up, confirmation, sign-in and logout sequencing
//! - [`AuthEvent`]: broadcast the host subscribes to (e.g. reset on logout)

mod session;
mod store;
mod token;

pub use session::{Session, SessionProvider, UserProfile};
pub use store::{AuthEvent, AuthTokens, IdentityProvider, SessionStore};
pub use token::{IdTokenClaims, decode_id_token};
