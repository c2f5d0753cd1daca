//! Authentication module for the marketplace server
//!
//! Email/password login, signup and bearer-token verification, all
//! behind `AuthService`.

pub mod handlers;
mod service;

pub use service::{AuthService, Claims, Credentials, NewAccount, Session};
