pub mod auth;
pub mod refresh;
pub mod session_token;

pub use auth::{Auth, IssuedSession};
pub use refresh::TokenRefresher;
pub use session_token::{SessionClaims, SessionCodec};
