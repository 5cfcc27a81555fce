//! Batch export
//!
//! Compiles every selected entity of a kind in parallel. One entity failing
//! never affects the others: its error is logged and recorded in the
//! [`ExportReport`] and the batch carries on.

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::assemble::{
    assemble_adventurer, assemble_base, assemble_dragon, snakey, EntityOutput, SlotMap,
};
use crate::compile::{compile_burst, compile_combo, compile_skill_action, ComboOptions};
use crate::core::{CompilerConfig, ExportError, Result};
use crate::effects::hitattr::NoAltForms;
use crate::records::{record_name, Fields, RecordSource, Table};

/// What a batch compiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Adventurer,
    Dragon,
    Base,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Adventurer, EntityKind::Dragon, EntityKind::Base];

    pub fn table(self) -> Table {
        match self {
            EntityKind::Adventurer => Table::CharaData,
            EntityKind::Dragon => Table::DragonData,
            EntityKind::Base => Table::WeaponType,
        }
    }

    /// Output sub-directory
    pub fn dir_name(self) -> &'static str {
        match self {
            EntityKind::Adventurer => "adv",
            EntityKind::Dragon => "drg",
            EntityKind::Base => "base",
        }
    }

    /// Whether a record of this kind is part of the batch
    pub fn selects(self, record: &Value, config: &CompilerConfig) -> bool {
        match self {
            EntityKind::Adventurer => {
                record.flag("_IsPlayable") && record.id_of("_ElementalType") != Some(99)
            }
            EntityKind::Dragon => {
                let id = record.record_id();
                let summonable = record.number("_SellDewPoint") == Some(8500.0)
                    || id.is_some_and(|id| config.extra_dragons.contains(&id));
                record.number("_Rarity") == Some(5.0)
                    && record.flag("_IsPlayable")
                    && summonable
                    && id.is_some()
                    && id == record.id_of("_EmblemId")
            }
            EntityKind::Base => true,
        }
    }

    pub fn assemble(
        self,
        record: &Value,
        source: &dyn RecordSource,
        config: &CompilerConfig,
    ) -> Result<EntityOutput> {
        match self {
            EntityKind::Adventurer => assemble_adventurer(record, source, config),
            EntityKind::Dragon => assemble_dragon(record, source, config),
            EntityKind::Base => assemble_base(record, source, config),
        }
    }
}

/// An entity whose export was aborted
#[derive(Debug, Clone, Serialize)]
pub struct ExportFailure {
    pub kind: EntityKind,
    pub id: Option<u64>,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub exported: usize,
    /// `entity: slot` of every slot without a resolvable recovery
    pub missing_endlag: Vec<String>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn merge(&mut self, other: ExportReport) {
        self.exported += other.exported;
        self.missing_endlag.extend(other.missing_endlag);
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sort key of a top-level slot. `x` slots sort by their mode suffix so
/// each mode's combo stays together in hit order.
fn slot_key(key: &str) -> String {
    if key.starts_with('x') {
        if let Some(suffix) = key.split('_').nth(1) {
            return format!("x{}", suffix);
        }
    }
    key.to_string()
}

/// Order top-level slots for output; nested maps keep insertion order
pub fn slot_order(slots: SlotMap) -> SlotMap {
    let mut entries: Vec<(String, Value)> = slots.into_iter().collect();
    entries.sort_by_cached_key(|(k, _)| slot_key(k));
    entries.into_iter().collect()
}

/// Compile every selected entity of `kind`
pub fn compile_batch(
    kind: EntityKind,
    source: &dyn RecordSource,
    config: &CompilerConfig,
) -> Result<(Vec<EntityOutput>, ExportReport)> {
    let records = source.get_all(kind.table(), &|r| kind.selects(r, config))?;
    tracing::info!("Compiling {} {:?} records", records.len(), kind);

    let results: Vec<(&Value, Result<EntityOutput>)> = records
        .par_iter()
        .map(|record| (record, kind.assemble(record, source, config)))
        .collect();

    let mut outputs = Vec::with_capacity(results.len());
    let mut report = ExportReport::default();
    for (record, result) in results {
        match result {
            Ok(output) => {
                report.missing_endlag.extend(
                    output
                        .missing_endlag
                        .iter()
                        .map(|slot| format!("{}: {}", output.name, slot)),
                );
                report.exported += 1;
                outputs.push(output);
            }
            Err(e) => {
                let name = record_name(record);
                tracing::error!("Failed to compile {:?} {}: {}", kind, name, e);
                report.failures.push(ExportFailure {
                    kind,
                    id: record.record_id(),
                    name,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok((outputs, report))
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Compile and write every entity of `kind` under `out_dir/<kind dir>`.
///
/// Adventurers and bases get one file each; dragons are grouped into one
/// file per element.
pub fn export_kind(
    kind: EntityKind,
    source: &dyn RecordSource,
    config: &CompilerConfig,
    out_dir: &Path,
) -> Result<ExportReport> {
    let (outputs, report) = compile_batch(kind, source, config)?;
    let dir = out_dir.join(kind.dir_name());
    fs::create_dir_all(&dir)?;

    match kind {
        EntityKind::Dragon => {
            let mut by_element: Map<String, Value> = Map::new();
            for element in ["flame", "water", "wind", "light", "shadow"] {
                by_element.insert(element.to_string(), Value::Object(Map::new()));
            }
            for output in outputs {
                let element = output
                    .slots
                    .get("d")
                    .and_then(|d| d.get("ele"))
                    .and_then(Value::as_str)
                    .unwrap_or("none")
                    .to_string();
                let group = by_element
                    .entry(element)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(group) = group {
                    group.insert(output.name, Value::Object(slot_order(output.slots)));
                }
            }
            for (element, dragons) in by_element {
                let dragons = match dragons {
                    Value::Object(map) => Value::Object(slot_order(map)),
                    other => other,
                };
                write_json(&dir.join(format!("{}.json", element)), &dragons)?;
            }
        }
        _ => {
            for output in outputs {
                let path = dir.join(format!("{}.json", output.name));
                write_json(&path, &Value::Object(slot_order(output.slots)))?;
            }
        }
    }

    tracing::info!(
        "Exported {} {:?} ({} failed, {} missing endlag)",
        report.exported,
        kind,
        report.failures.len(),
        report.missing_endlag.len()
    );
    Ok(report)
}

/// Compile one entity by id
pub fn compile_entity(
    kind: EntityKind,
    source: &dyn RecordSource,
    config: &CompilerConfig,
    id: u64,
) -> Result<EntityOutput> {
    let record = source.require(kind.table(), id)?;
    let mut output = kind.assemble(&record, source, config)?;
    output.slots = slot_order(output.slots);
    Ok(output)
}

/// A single action to compile on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionTarget {
    Skill { id: u64, level: u32 },
    Burst { id: u64 },
    Combo { id: u64 },
}

/// Compile one skill, burst or combo hit by id
pub fn compile_action(
    target: ActionTarget,
    source: &dyn RecordSource,
    config: &CompilerConfig,
) -> Result<SlotMap> {
    let mut slots = SlotMap::new();
    match target {
        ActionTarget::Skill { id, level } => {
            let skill = source.require(Table::SkillData, id)?;
            let conf = compile_skill_action(&skill, level, config, &mut NoAltForms)?;
            slots.insert(snakey(&record_name(&skill)), conf.to_value());
        }
        ActionTarget::Burst { id } => {
            let burst = source.require(Table::PlayerAction, id)?;
            let marker = match burst.record("_BurstMarkerId") {
                Some(marker) => Some(marker.clone()),
                None => source.get_record(Table::PlayerAction, id + 4)?,
            };
            for (slot, conf) in compile_burst(&burst, marker.as_ref(), config)? {
                slots.insert(slot, conf.to_value());
            }
        }
        ActionTarget::Combo { id } => {
            let action = source.require(Table::PlayerAction, id)?;
            let conf = compile_combo(&action, ComboOptions::adventurer(), config)?;
            slots.insert(format!("x{}", id % 10), conf.to_value());
        }
    }
    if slots.is_empty() {
        return Err(ExportError::missing(format!("{:?}", target), "_Parts"));
    }
    Ok(slots)
}
