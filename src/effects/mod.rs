//! Effect normalization
//!
//! Lowers the raw hit attributes of an action into [`ConvertedAttr`]
//! instances: damage, resource recovery, buffs, debuffs, afflictions and
//! dispels, each stamped with the time it lands. Parts that fire more than
//! once are expanded into repeated instances.

pub mod action;
pub mod attr;
pub mod condition;
pub mod hitattr;
pub mod ledger;
pub mod pattern;
pub mod repeat;

pub use action::convert_action_attrs;
pub use attr::{AttrEntry, ConvertedAttr};
pub use hitattr::{convert_hitattr, AltFormSink};
pub use ledger::{GrantLedger, Resource};
pub use pattern::LabelPattern;
