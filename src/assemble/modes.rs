//! Pieces shared by adventurer modes and gun modes

use serde_json::Value;

use super::linked_record;
use crate::core::Result;
use crate::records::{Fields, RecordSource, Table};

/// Mode burst and its charge marker. Bursts without an embedded marker use
/// the action four ids after the burst.
pub fn mode_burst(source: &dyn RecordSource, mode: &Value) -> Result<Option<(Value, Option<Value>)>> {
    let Some(burst) = linked_record(source, Table::PlayerAction, mode, "_BurstAttackId")? else {
        return Ok(None);
    };
    let marker = match linked_record(source, Table::PlayerAction, &burst, "_BurstMarkerId")? {
        Some(marker) => Some(marker),
        None => match burst.record_id() {
            Some(id) => source.get_record(Table::PlayerAction, id + 4)?,
            None => None,
        },
    };
    Ok(Some((burst, marker)))
}

/// Unique combo hits of a mode as `(x{n}_{mode}[ex], action)`
pub fn unique_combos(
    source: &dyn RecordSource,
    mode: &Value,
    mode_name: &str,
) -> Result<Vec<(String, Value)>> {
    let Some(combo) = linked_record(source, Table::CharaUniqueCombo, mode, "_UniqueComboId")? else {
        return Ok(Vec::new());
    };
    let mut hits = Vec::new();
    for (key, suffix) in [("_ActionId", ""), ("_ExActionId", "ex")] {
        let actions = super::linked_records(source, Table::PlayerAction, &combo, key)?;
        for (n, action) in actions.into_iter().enumerate() {
            hits.push((format!("x{}_{}{}", n + 1, mode_name, suffix), action));
        }
    }
    Ok(hits)
}
