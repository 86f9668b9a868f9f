pub mod api;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod reporter;
pub mod state;
pub mod types;

/// Codex (defined.fi) GraphQL endpoint.
pub const CODEX_API_URL: &str = "https://graph.defined.fi/graphql";

/// Swaps requested per page.
pub const PAGE_SIZE: usize = 100;

/// Maximum pages fetched per leaderboard request (at most 300 swaps).
pub const MAX_PAGES: usize = 3;

/// Number of wallets kept on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;
