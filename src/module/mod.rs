pub mod curseforge;
pub mod github;
pub mod layout;
pub mod mods;
pub mod pacing;
pub mod reconcile;
pub mod renderer;
pub mod splice;
pub mod updater;
