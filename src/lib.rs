//! wikiracer-server core: concurrent Wikipedia link-chasing jobs plus the
//! thin HTTP surface in front of them.

pub mod api;
pub mod crawler;
pub mod error;
pub mod frontier;
pub mod job;
pub mod parent_map;
pub mod pool;
pub mod types;
pub mod visited;

pub const DEFAULT_PORT: u16 = 8081;

/// Reads `WIKI_PORT`, defaulting to `DEFAULT_PORT` if it is unset or fails
/// to parse as an integer, per spec §6's "Environment" contract.
pub fn port_from_env() -> u16 {
    match std::env::var("WIKI_PORT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::error!(value = %raw, "unable to parse WIKI_PORT, using default {}", DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}
