//! Cardcraft API — content API adapter and payload builders.
//!
//! This crate owns every interaction with the remote learning-content API:
//!
//! - [`client`]: the authenticated HTTP adapter ([`ApiClient`])
//! - [`courses`]: course creation payloads
//! - [`cards`]: the nine card payload builders, local validation, and the
//!   read-merge-write update path
//!
//! Payload construction is pure; only [`ApiClient`] touches the network.

pub mod cards;
pub mod client;
pub mod courses;

pub use client::ApiClient;
