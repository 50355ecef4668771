//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `player-traits`, `player-backends`, `player-core`).
//! Host applications can depend on `av-player-workspace` and enable the
//! documented features without needing to wire each crate individually.
