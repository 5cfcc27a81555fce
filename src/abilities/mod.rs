//! Ability text compiler
//!
//! Condenses ability records into short tuples such as `["a", 0.15, "hp70"]`
//! that the simulator reads as passive modifiers. Each ability holds up to
//! three effects (`_AbilityType1..3`); every effect is dispatched on its
//! [`AbilityKind`]. Abilities nothing could be read from are reported as
//! skipped instead of failing the entity.

pub mod actcond;
pub mod cond;
pub mod kind;

use serde::Serialize;
use serde_json::Value;

use crate::core::num;
use crate::records::Fields;

pub use cond::condition_suffix;
pub use kind::{AbilityEffect, AbilityKind};

/// Abilities with hand-written tuples
pub fn special_ability(id: u64) -> Option<Vec<Value>> {
    match id {
        448 => Some(vec![Value::from("spu"), num(0.08)]),
        1402 => Some(vec![Value::from("au"), num(0.08)]),
        _ => None,
    }
}

/// `(id, name)` of an ability nothing was read from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedAbility(pub Option<u64>, pub Option<String>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedAbilities {
    /// Condensed tuples in effect order
    pub converted: Vec<Value>,
    pub skipped: Vec<SkippedAbility>,
}

impl ConvertedAbilities {
    pub fn extend(&mut self, other: ConvertedAbilities) {
        self.converted.extend(other.converted);
        self.skipped.extend(other.skipped);
    }
}

/// Convert one ability record
pub fn convert_ability(ability: &Value) -> ConvertedAbilities {
    let mut result = ConvertedAbilities::default();
    if let Some(special) = ability.record_id().and_then(special_ability) {
        result.converted.push(Value::from(special));
        return result;
    }

    for index in 1..=3 {
        let Some(effect) = AbilityEffect::read(ability, index) else {
            continue;
        };
        match effect.kind {
            AbilityKind::Nested => {
                for suffix in ["a", "b", "c"] {
                    if let Some(sub) = ability.record(&format!("_VariousId{}{}", index, suffix)) {
                        result.extend(convert_ability(sub));
                    }
                }
            }
            _ => {
                if let Some(tuple) = effect.convert() {
                    result.converted.push(Value::from(tuple));
                }
            }
        }
    }

    if result.converted.is_empty() {
        result.skipped.push(SkippedAbility(
            ability.record_id(),
            ability.text("_Name").map(str::to_string),
        ));
    }
    result
}
