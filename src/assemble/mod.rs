//! Entity assembler
//!
//! Builds the full slot mapping of one adventurer, dragon or weapon-type
//! base from its dereferenced record, compiling every action it can reach.

pub mod adventurer;
pub mod base;
pub mod context;
pub mod dragon;
pub mod loops;
pub mod modes;

use deunicode::deunicode;
use serde_json::{Map, Value};

use crate::compile::{BurstSlots, SkillTimingConfig};
use crate::core::{ExportError, Result};
use crate::records::{Fields, RecordSource, Table};

pub use adventurer::assemble_adventurer;
pub use base::assemble_base;
pub use context::{ChainEntry, CompileContext, ProcessedSkill, WorkList};
pub use dragon::assemble_dragon;

/// Slot name -> compiled config
pub type SlotMap = Map<String, Value>;

/// Compiled configuration of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityOutput {
    /// File stem
    pub name: String,
    pub slots: SlotMap,
    /// Slots whose recovery could not be resolved
    pub missing_endlag: Vec<String>,
}

/// File-system friendly name: `&` spelled out, transliterated to ASCII,
/// punctuation dropped and spaces replaced by underscores
pub fn snakey(name: &str) -> String {
    deunicode(&name.replace('&', "and"))
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .replace(' ', "_")
}

/// A field holding either an embedded record or the id of one in `table`
pub fn linked_record(
    source: &dyn RecordSource,
    table: Table,
    record: &Value,
    key: &str,
) -> Result<Option<Value>> {
    match record.field(key) {
        Some(v @ Value::Object(_)) => Ok(Some(v.clone())),
        Some(_) => match record.id_of(key) {
            Some(id) => source.get_record(table, id),
            None => Ok(None),
        },
        None => Ok(None),
    }
}

/// A field holding a list of embedded records and / or ids in `table`
pub fn linked_records(
    source: &dyn RecordSource,
    table: Table,
    record: &Value,
    key: &str,
) -> Result<Vec<Value>> {
    let items: Vec<&Value> = match record.field(key) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
        None => return Ok(Vec::new()),
    };
    let mut linked = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(_) => linked.push(item.clone()),
            Value::Number(n) => {
                if let Some(found) = n.as_u64().filter(|&id| id != 0) {
                    linked.extend(source.get_record(table, found)?);
                }
            }
            _ => {}
        }
    }
    Ok(linked)
}

/// Insert a compiled slot. An action that never connects is reported as
/// missing endlag and left out instead of failing the entity.
pub(crate) fn insert_slot(
    ctx: &mut CompileContext<'_>,
    slots: &mut SlotMap,
    name: String,
    compiled: Result<SkillTimingConfig>,
) -> Result<()> {
    match compiled {
        Ok(conf) => {
            if conf.recovery.is_none() {
                ctx.note_missing_endlag(&name);
            }
            slots.insert(name, conf.to_value());
            Ok(())
        }
        Err(ExportError::MissingStartup(action)) => {
            tracing::warn!("{} ({}) has no hit, slot skipped", name, action);
            ctx.note_missing_endlag(&name);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Insert burst slots as `<slot><suffix>`
pub(crate) fn insert_bursts(
    ctx: &mut CompileContext<'_>,
    slots: &mut SlotMap,
    suffix: &str,
    compiled: Result<BurstSlots>,
) -> Result<()> {
    match compiled {
        Ok(bursts) => {
            for (slot, conf) in bursts {
                insert_slot(ctx, slots, format!("{}{}", slot, suffix), Ok(conf))?;
            }
            Ok(())
        }
        Err(e) => insert_slot(ctx, slots, format!("fs{}", suffix), Err(e)),
    }
}
