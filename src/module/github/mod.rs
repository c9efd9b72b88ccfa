///! GitHub PR status module
///!
///! Fetches pull requests authored by the configured identity for each
///! tracked repository and classifies quota-exhausted responses so the
///! reconciler can preserve prior data.

pub mod client;
pub mod parser;
pub mod types;

pub use client::GithubClient;
pub use types::{PrFetch, PrState, PullRequest};
