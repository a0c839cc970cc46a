//! globy-api
//!
//! reqwest-based client for the GLOBY backend HTTP interface (`/search`,
//! `/gallery`, `/users/login`, `/photos/upload`). See `client`.

pub mod client;

pub use client::ApiClient;
