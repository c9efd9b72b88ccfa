///! Tracked mods module
///!
///! Data model for the persisted mod status document plus its on-disk I/O.

pub mod store;
pub mod types;

pub use types::{ModBuckets, ModRecord, PersistedState, Section};
