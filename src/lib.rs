//! An asynchronous admin client for the Avtoshkola driving-school API.
//!
//! The backend is a headless content API; this crate owns the pieces with a
//! contract worth getting right: credential persistence ([`SessionStore`]),
//! request dispatch and error normalization ([`ApiClient`]), the
//! authentication gate ([`AuthGate`]), and typed operations over the four
//! backend collections ([`endpoints`]).

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod client;
mod config;
pub mod endpoints;
mod gate;
mod id;
pub mod models;
mod session;
mod store;

pub use client::{ApiClient, ApiError};
pub use config::Config;
pub use gate::{policies, AuthError, AuthGate, AuthPolicy};
pub use id::Id;
pub use session::{AuthState, Role, Session, SessionUser};
pub use store::SessionStore;

/// The default user agent to use when communicating with the backend.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
