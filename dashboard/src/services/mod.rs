//! # External Services
//!
//! - `api`: HTTP transport for the account server

pub mod api;
