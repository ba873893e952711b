//! Cardcraft MCP — server infrastructure and tool registries.
//!
//! # Key Abstractions
//!
//! - [`registry::ToolRegistry`]: domain tool groups register their tools
//! - [`server::CardcraftServer`]: aggregates registries behind one MCP
//!   server handler, served over stdio
//! - [`tools`]: the course, card, media, and diagnostic tool groups

pub mod registry;
pub mod server;
pub mod tools;

pub use registry::{ToolRegistry, ToolResult};
pub use server::CardcraftServer;
