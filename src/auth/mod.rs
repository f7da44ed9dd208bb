//! Auth module - sign-in and token acquisition
//!
//! The session manager drives an identity provider; Entra ID is the one
//! shipped here.

pub mod entra;
pub mod loopback;
pub mod provider;
pub mod session;

pub use entra::EntraIdProvider;
pub use provider::IdentityProvider;
pub use session::{with_interactive_fallback, SessionManager};
