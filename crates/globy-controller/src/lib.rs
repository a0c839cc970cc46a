//! globy-controller
//!
//! Incremental search controller: debounces keystrokes, keeps at most one
//! authoritative lookup in flight, and publishes a race-free view of its
//! outcome through a watch channel. See `controller`.

pub mod controller;
pub mod state;

pub use controller::SearchController;
pub use state::SearchState;
