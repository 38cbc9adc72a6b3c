//! Fact Guard - streaming front-end for URL fact-check analyses
//!
//! This crate provides a server that accepts a URL from the browser, forwards
//! it to an upstream analysis service and relays the resulting event stream
//! back to the client, or replays a canned analysis in demo mode.

pub mod admin;
pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod proxy;
pub mod sse;

pub use error::FactGuardError;
