//! Dragons

use serde_json::{json, Value};

use super::context::CompileContext;
use super::{insert_slot, linked_record, linked_records, snakey, EntityOutput, SlotMap};
use crate::abilities::{convert_ability, ConvertedAbilities};
use crate::compile::{compile_combo, compile_skill_action, ComboOptions};
use crate::core::{fr, num, CompilerConfig, ExportError, Num, Result};
use crate::effects::hitattr::NoAltForms;
use crate::records::mappings::{element_name, enum_label};
use crate::records::{record_name, Fields, RecordSource, Table};
use crate::timeline::{action_parts, resolve_timing, TimingOptions};

/// Compile one dragon, `d` block included
pub fn assemble_dragon(
    dragon: &Value,
    source: &dyn RecordSource,
    config: &CompilerConfig,
) -> Result<EntityOutput> {
    let mut ctx = CompileContext::new(config);
    let mut slots = SlotMap::new();
    let name = dragon
        .text("_SecondName")
        .or_else(|| dragon.text("_Name"))
        .ok_or_else(|| ExportError::missing(record_name(dragon), "_Name"))?
        .to_string();

    slots.insert("d".to_string(), dragon_block(dragon, &name, source)?);
    dragon_actions(dragon, source, &mut ctx, &mut slots)?;

    Ok(EntityOutput {
        name: snakey(&name),
        slots,
        missing_endlag: ctx.missing_endlag,
    })
}

fn dragon_block(dragon: &Value, name: &str, source: &dyn RecordSource) -> Result<Value> {
    let mut abilities = ConvertedAbilities::default();
    for i in 1..=2 {
        if let Some(ability) = linked_record(source, Table::AbilityData, dragon, &format!("_Abilities{}5", i))? {
            abilities.extend(convert_ability(&ability));
        }
    }
    let element = dragon
        .field("_ElementalType")
        .and_then(|v| enum_label(v, element_name))
        .ok_or_else(|| ExportError::missing(name, "_ElementalType"))?;

    let mut block = json!({
        "name": name,
        "icon": format!(
            "{}_{:02}",
            dragon.id_of("_BaseId").unwrap_or(0),
            dragon.id_of("_VariationId").unwrap_or(0)
        ),
        "att": num(dragon.number_or_zero("_MaxAtk")),
        "hp": num(dragon.number_or_zero("_MaxHp")),
        "ele": element,
        "a": abilities.converted,
    });
    if !abilities.skipped.is_empty() {
        block["skipped"] = serde_json::to_value(&abilities.skipped)?;
    }
    Ok(block)
}

/// Everything but the `d` block: common actions, combo and skills. Shared
/// with adventurers that transform into a unique dragon.
pub fn dragon_actions(
    dragon: &Value,
    source: &dyn RecordSource,
    ctx: &mut CompileContext<'_>,
    slots: &mut SlotMap,
) -> Result<()> {
    let config = ctx.config;
    let defaults = &config.dragon_defaults;

    let mut dodge: Option<f64> = None;
    let mut backdash: Option<f64> = None;
    let common = [
        ("dodge", "_AvoidActionFront", defaults.dodge),
        ("dodgeb", "_AvoidActionBack", defaults.dodgeb),
        ("dshift", "_Transform", defaults.dshift),
    ];
    for (slot, key, default) in common {
        let Some(action) = linked_record(source, Table::PlayerAction, dragon, key)? else {
            continue;
        };
        let recovery = resolve_timing(&action_parts(&action), &TimingOptions::dragon_motion()).recovery;
        if recovery == Some(fr(default)) {
            continue;
        }
        let Some(recovery) = recovery else {
            ctx.note_missing_endlag(slot);
            continue;
        };
        match slot {
            "dodge" => dodge = Some(recovery),
            "dodgeb" => backdash = Some(recovery),
            _ => {
                slots.insert(slot.to_string(), json!({ "recovery": num(recovery) }));
            }
        }
    }
    // a backdash replaces the dodge when it recovers sooner
    match (dodge, backdash) {
        (Some(front), Some(back)) if front > back => {
            slots.insert("dodge".to_string(), json!({"recovery": num(back), "backdash": true}));
        }
        (None, Some(back)) => {
            slots.insert("dodge".to_string(), json!({"recovery": num(back), "backdash": true}));
        }
        (Some(front), _) => {
            slots.insert("dodge".to_string(), json!({ "recovery": num(front) }));
        }
        (None, None) => {}
    }

    let combos = linked_records(source, Table::PlayerAction, dragon, "_DefaultSkill")?;
    for (n, combo) in combos.iter().enumerate() {
        let compiled = compile_combo(combo, ComboOptions::dragon(), config);
        insert_slot(ctx, slots, format!("dx{}", n + 1), compiled)?;
    }

    for (slot, key) in [("ds", "_Skill1"), ("ds_final", "_SkillFinalAttack")] {
        let Some(skill) = linked_record(source, Table::SkillData, dragon, key)? else {
            continue;
        };
        let compiled = compile_skill_action(&skill, 2, config, &mut NoAltForms).map(|mut conf| {
            conf.uses = Some(Num(skill.number("_MaxUseNum").unwrap_or(1.0)));
            conf
        });
        insert_slot(ctx, slots, slot.to_string(), compiled)?;
    }
    Ok(())
}
