//! Credential backends: the remote identity service and its stand-ins.

pub mod base;
pub mod dev_backend;
pub mod http_backend;
pub mod unconfigured_backend;

pub use base::{create_backend, BackendUser, CredentialBackend, LoginResponse, LoginToken, RefreshResponse};
