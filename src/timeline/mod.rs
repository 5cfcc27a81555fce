//! Timeline analysis of an action's part list
//!
//! An action is an ordered list of parts. This module tags each part by its
//! command, derives startup / recovery from the competing timing signals and
//! turns cancel targets into interrupt / cancel windows.

pub mod follow;
pub mod part;
pub mod timing;

pub use follow::{follow_windows, FollowWindows};
pub use part::{action_parts, ActionPart, CommandType, HitGroup};
pub use timing::{resolve_skill_recovery, resolve_timing, Timing, TimingOptions};
