// Library root — exposes the resolver, presenter and server to both binaries
// and to integration tests. The server entry point is src/main.rs.

pub mod cache;
pub mod config;
pub mod error;
pub mod explain;
pub mod llm;
pub mod logger;
pub mod presenter;
pub mod resolver;
pub mod server;
