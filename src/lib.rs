//! Library exports for sessiontron, shared between the binary and tests.

pub mod auth;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod seo;
pub mod startup;
pub mod state;
pub mod storage;
pub mod utils;
pub mod validation;
