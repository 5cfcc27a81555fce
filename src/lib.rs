//! Action Timeline - combat action record compiler
//!
//! Turns the dereferenced record graph of a game's combat actions into
//! declarative per-entity configurations: when each action lands, when it
//! can be cancelled, and which damage, buff and affliction effects it
//! applies along the way.

pub mod abilities;
pub mod assemble;
pub mod compile;
pub mod core;
pub mod effects;
pub mod export;
pub mod records;
pub mod timeline;
