///! CurseForge release status module
///!
///! Checks whether each in-development mod has a published build for its
///! target game version, tolerating the several payload shapes the
///! files-listing endpoint has used over time.

pub mod client;
pub mod parser;
pub mod types;

pub use client::CurseforgeClient;
pub use types::ReleaseCheck;
