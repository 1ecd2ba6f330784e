pub mod client;
pub mod models;
pub mod session;

pub use client::IdentityClient;
pub use models::{IdentityUser, NewUser};
pub use session::{AuthUser, SessionClaims, SessionVerifier};
