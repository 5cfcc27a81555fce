//! Condition suffix shared by every ability tuple

use serde_json::Value;

use crate::records::mappings::{element_name, enum_label, weapon_type_name};
use crate::records::Fields;

/// Element, weapon type and an hp / combo threshold joined with `_`,
/// e.g. `flame_sword_hp70`. `None` when the ability is unconditional.
pub fn condition_suffix(ability: &Value) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(element) = ability.field("_ElementalType").and_then(|v| enum_label(v, element_name)) {
        parts.push(element);
    }
    if let Some(weapon) = ability.field("_WeaponType").and_then(|v| enum_label(v, weapon_type_name)) {
        parts.push(weapon);
    }

    let value = ability.number_or_zero("_ConditionValue") as i64;
    match ability.text("_ConditionType") {
        Some("hp geq") => parts.push(format!("hp{}", value)),
        Some("hp leq") => parts.push(format!("hp≤{}", value)),
        Some("combo") => parts.push(format!("hit{}", value)),
        _ => {}
    }

    (!parts.is_empty()).then(|| parts.join("_"))
}
