//! # advertx API
//!
//! Read-only REST surface over a [`RefreshCoordinator`](advertx_refresh::RefreshCoordinator).

pub mod rest;

pub use rest::{ApiState, RestApi};
