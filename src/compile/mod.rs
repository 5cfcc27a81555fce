//! Skill / combo compiler
//!
//! Runs timing resolution and effect conversion over one action and shapes
//! the result into a [`SkillTimingConfig`] for a named slot.

pub mod burst;
pub mod combo;
pub mod skill;

use serde::Serialize;

use crate::core::Num;
use crate::effects::AttrEntry;
use crate::timeline::follow::WindowMap;

pub use burst::{compile_burst, compile_charge_cancel, BurstSlots};
pub use combo::{attach_attrs, compile_combo, ComboOptions};
pub use skill::{compile_skill_action, skill_action, CompiledSkill};

/// Timing and effects of one named action slot (`x1`, `fs`, `s1`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillTimingConfig {
    /// Skill point cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp: Option<Num>,
    /// Seconds of charge before release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<Num>,
    /// Relative to startup; null is missing endlag
    pub recovery: Option<Num>,
    /// Parts of a chained next action were appended
    #[serde(rename = "DEBUG_CHECK_NEXTACT", skip_serializing_if = "std::ops::Not::not")]
    pub merged_next_action: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<Num>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attr: Vec<AttrEntry>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub energizable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupt: Option<WindowMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel: Option<WindowMap>,
    /// Dragon dodge that moves backwards
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub backdash: bool,
}

impl SkillTimingConfig {
    pub fn startup(&self) -> f64 {
        self.startup.map_or(0.0, Num::value)
    }

    pub fn recovery(&self) -> Option<f64> {
        self.recovery.map(Num::value)
    }

    pub fn has_damage(&self) -> bool {
        self.attr
            .iter()
            .filter_map(AttrEntry::as_hit)
            .any(|a| a.deals_damage())
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
