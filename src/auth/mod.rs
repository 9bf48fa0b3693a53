//! Identity provider integration.
//!
//! The portal does not store credentials. Sign-in, one-time links, password
//! changes and session renewal are delegated to a GoTrue-compatible identity
//! service; the resulting session travels in an HTTP-only cookie.

mod client;
mod error;
mod pkce;
mod provider;
mod session;

pub use client::HttpIdentityProvider;
pub use error::IdentityError;
pub use pkce::PkceChallenge;
pub use provider::{IdentityProvider, ProviderSession, ProviderUser};
pub use session::{
    CookieMutation, SessionCookie, code_verifier_cookie, expired_cookie, session_cookie,
};
