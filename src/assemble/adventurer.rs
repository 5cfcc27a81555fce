//! Adventurers
//!
//! Compiles the `c` block, bursts, mode combos and the full skill chain:
//! base skills seed a work-list, and every skill compiled may queue the
//! enhanced skills it unlocks. Chains that lead back to an earlier skill are
//! flattened into phases at the end.

use deunicode::deunicode;
use serde_json::{json, Value};

use super::context::{ChainEntry, CompileContext, ProcessedSkill};
use super::dragon::dragon_actions;
use super::loops::flatten_loops;
use super::modes::{mode_burst, unique_combos};
use super::{insert_bursts, insert_slot, linked_record, snakey, EntityOutput, SlotMap};
use crate::abilities::{convert_ability, AbilityEffect, AbilityKind, ConvertedAbilities};
use crate::compile::{compile_burst, compile_combo, compile_skill_action, ComboOptions};
use crate::core::{num, CompilerConfig, ExportError, Result};
use crate::effects::{AttrEntry, ConvertedAttr, LabelPattern};
use crate::records::mappings::{element_name, enum_label, weapon_type_name};
use crate::records::{record_name, Fields, RecordSource, Table};

/// Slot of the edit (shared) skill
pub const EDIT_SKILL_SEQ: u32 = 99;

/// Identity and stats of an adventurer, the `c` block
#[derive(Debug, Clone)]
struct Profile {
    name: String,
    spiral: bool,
    block: Value,
}

pub fn assemble_adventurer(
    chara: &Value,
    source: &dyn RecordSource,
    config: &CompilerConfig,
) -> Result<EntityOutput> {
    let mut ctx = CompileContext::new(config);
    let mut slots = SlotMap::new();

    let abilities = ability_records(chara, source)?;
    let mut profile = profile(chara, &abilities)?;
    tracing::debug!("Assembling {}", profile.name);

    ability_alt_forms(&mut ctx, &abilities, &profile.name);

    if let Some(burst) = linked_record(source, Table::PlayerAction, chara, "_BurstAttack")? {
        if let Some(marker) = linked_record(source, Table::PlayerAction, &burst, "_BurstMarkerId")? {
            let compiled = compile_burst(&burst, Some(&marker), config);
            insert_bursts(&mut ctx, &mut slots, "", compiled)?;
        }
    }

    seed_skills(&mut ctx, chara, source)?;
    let guns = modes(&mut ctx, &mut slots, chara, source, profile.spiral)?;
    if let Some(gun) = profile.block.get_mut("gun") {
        *gun = json!(guns);
    }

    drain_skills(&mut ctx, &mut slots, chara, source, profile.spiral)?;

    for enhanced in ctx.enhanced_bursts.clone() {
        let marker = linked_record(source, Table::PlayerAction, &enhanced.burst, "_BurstMarkerId")?;
        let compiled = compile_burst(&enhanced.burst, marker.as_ref(), config);
        insert_bursts(&mut ctx, &mut slots, &format!("_{}", enhanced.group), compiled)?;
    }

    let chara_id = chara.record_id().unwrap_or(0);
    if config.loop_exclusions.contains(&chara_id) {
        tracing::debug!("Loop flattening skipped for {}", profile.name);
    } else {
        flatten_loops(&ctx.processed, &ctx.loops, &mut slots);
    }

    if let Some(dragon) = linked_record(source, Table::DragonData, chara, "_UniqueDragonId")? {
        let mut dragonform = SlotMap::new();
        dragon_actions(&dragon, source, &mut ctx, &mut dragonform)?;
        slots.insert("dragonform".to_string(), Value::Object(dragonform));
    }

    let mut out = SlotMap::new();
    out.insert("c".to_string(), std::mem::take(&mut profile.block));
    out.extend(slots);
    Ok(EntityOutput {
        name: snakey(&profile.name),
        slots: out,
        missing_endlag: ctx.missing_endlag,
    })
}

/// Highest unlocked ability of each of the three ability slots
fn ability_records(chara: &Value, source: &dyn RecordSource) -> Result<Vec<Value>> {
    let mut abilities = Vec::new();
    for i in 1..=3 {
        for j in [3, 2, 1] {
            let key = format!("_Abilities{}{}", i, j);
            if let Some(ability) = linked_record(source, Table::AbilityData, chara, &key)? {
                abilities.push(ability);
                break;
            }
        }
    }
    Ok(abilities)
}

fn profile(chara: &Value, abilities: &[Value]) -> Result<Profile> {
    let name = chara
        .text("_SecondName")
        .or_else(|| chara.text("_Name"))
        .ok_or_else(|| ExportError::missing(record_name(chara), "_Name"))?
        .to_string();
    let element = chara
        .field("_ElementalType")
        .and_then(|v| enum_label(v, element_name))
        .ok_or_else(|| ExportError::missing(&name, "_ElementalType"))?;
    let weapon = chara
        .field("_WeaponType")
        .and_then(|v| enum_label(v, weapon_type_name))
        .ok_or_else(|| ExportError::missing(&name, "_WeaponType"))?;
    let spiral = chara.number_or_zero("_MaxLimitBreakCount") == 5.0;

    let mut converted = ConvertedAbilities::default();
    for ability in abilities {
        converted.extend(convert_ability(ability));
    }

    let mut block = json!({
        "name": name,
        "icon": format!(
            "{:06}_{:02}_r{:02}",
            chara.id_of("_BaseId").unwrap_or(0),
            chara.id_of("_VariationId").unwrap_or(0),
            chara.id_of("_Rarity").unwrap_or(0)
        ),
        "att": num(chara.number_or_zero("_MaxAtk")),
        "hp": num(chara.number_or_zero("_MaxHp")),
        "ele": element,
        "wt": weapon,
        "spiral": spiral,
        "a": converted.converted,
        "skipped": serde_json::to_value(&converted.skipped)?,
    });
    if weapon == "gun" {
        block["gun"] = json!([]);
    }
    Ok(Profile {
        name,
        spiral,
        block,
    })
}

/// Enhanced skills and bursts granted by passive abilities (type 14).
///
/// Queued skills get a group named after the adventurer; when the ability
/// is tied to a skill slot the matching alt-form buffs are recorded so the
/// slot's skills can announce them.
fn ability_alt_forms(ctx: &mut CompileContext<'_>, abilities: &[Value], name: &str) {
    let unique = snakey(&name.to_lowercase()).replace('_', "");
    for ability in abilities {
        let on_skill = ability.id_of("_OnSkill").and_then(|s| u32::try_from(s).ok());
        for index in 1..=3 {
            let Some(effect) = AbilityEffect::read(ability, index) else {
                continue;
            };
            if effect.kind != AbilityKind::ActionCondition {
                continue;
            }
            let Some(actcond) = effect.var_a.filter(|v| v.is_object()).or(effect.var_str) else {
                continue;
            };
            let announce = on_skill.filter(|_| !actcond.flag("_CoolDownTimeSec"));
            let tail = duration_tail(actcond);
            let mut group: Option<String> = None;

            for (field, slot) in crate::effects::hitattr::ENHANCED_SKILL_FIELDS {
                let Some(skill) = actcond.record(field) else {
                    continue;
                };
                let Some(id) = skill.record_id() else {
                    continue;
                };
                let label = ctx.skill_groups.next_label(&unique);
                let group = group.get_or_insert(label).clone();
                ctx.enqueue(
                    id,
                    ChainEntry {
                        label: format!("s{}_{}", slot, group),
                        seq: slot,
                        skill: skill.clone(),
                        prev: None,
                        group: Some(group.clone()),
                    },
                );
                if let Some(sid) = announce {
                    let mut buff = vec![json!("sAlt"), json!(group), json!(format!("s{}", slot))];
                    buff.extend(tail.iter().cloned());
                    ctx.alt_buffs.entry(sid).or_default().push(Value::from(buff));
                }
            }

            if let Some(burst) = actcond.record("_EnhancedBurstAttack") {
                let group = ctx.enhanced_burst_group(burst, &unique);
                if let Some(sid) = announce {
                    let mut buff = vec![json!("fsAlt"), json!(group)];
                    buff.extend(tail.iter().cloned());
                    ctx.alt_buffs.entry(sid).or_default().push(Value::from(buff));
                }
            }
        }
    }
}

/// `[-1, count]` for count-limited buffs, `[seconds]` for timed ones
fn duration_tail(actcond: &Value) -> Vec<Value> {
    if let Some(count) = actcond.number("_DurationNum") {
        vec![json!(-1), num(count)]
    } else if let Some(seconds) = actcond.number("_Duration") {
        vec![num(seconds)]
    } else {
        Vec::new()
    }
}

/// Queue s1, s2 and the edit skill
fn seed_skills(ctx: &mut CompileContext<'_>, chara: &Value, source: &dyn RecordSource) -> Result<()> {
    for (seq, key) in [(1, "_Skill1"), (2, "_Skill2")] {
        let skill = linked_record(source, Table::SkillData, chara, key)?
            .ok_or_else(|| ExportError::missing(record_name(chara), key))?;
        let id = skill
            .record_id()
            .ok_or_else(|| ExportError::missing(record_name(&skill), "_Id"))?;
        ctx.enqueue(id, base_entry(format!("s{}", seq), seq, skill));
    }
    if let Some(edit) = linked_record(source, Table::SkillData, chara, "_EditSkillId")? {
        if let Some(id) = edit.record_id().filter(|id| !ctx.pending.contains(*id)) {
            ctx.enqueue(id, base_entry("s99".to_string(), EDIT_SKILL_SEQ, edit));
        }
    }
    Ok(())
}

fn base_entry(label: String, seq: u32, skill: Value) -> ChainEntry {
    ChainEntry {
        label,
        seq,
        skill,
        prev: None,
        group: None,
    }
}

/// Short name of a mode, taken from the text of the condition it applies
fn mode_name(chara: &Value, mode: &Value, m: u32) -> String {
    let text = mode
        .record("_ActionId")
        .and_then(|action| match action.field("_Parts")? {
            Value::Array(parts) => parts.first(),
            _ => None,
        })
        .and_then(|part| part.record("_actionConditionId"))
        .and_then(|actcond| actcond.text("_Text"))
        .and_then(|text| text.split(' ').next())
        .filter(|word| !word.is_empty());
    match text {
        Some(word) => deunicode(&word.to_lowercase()),
        None if chara.id_of("_ModeChangeType") == Some(3) => "ddrive".to_string(),
        None => format!("mode{}", m),
    }
}

/// Mode skills, bursts and unique combos. Returns the gun kinds seen.
fn modes(
    ctx: &mut CompileContext<'_>,
    slots: &mut SlotMap,
    chara: &Value,
    source: &dyn RecordSource,
    spiral: bool,
) -> Result<Vec<u64>> {
    let config = ctx.config;
    let mut guns: Vec<u64> = Vec::new();
    let spiral_pattern = if spiral {
        Some(LabelPattern::burst_hits()?)
    } else {
        None
    };

    for m in 1..=4 {
        let Some(mode) = linked_record(source, Table::CharaModeData, chara, &format!("_ModeId{}", m))? else {
            continue;
        };
        let mode_skills: Vec<(u32, Value)> = [1, 2]
            .into_iter()
            .filter_map(|s| mode.record(&format!("_Skill{}Id", s)).map(|skill| (s, skill.clone())))
            .collect();
        if let Some(gun) = mode.id_of("_GunMode") {
            if !guns.contains(&gun) {
                guns.push(gun);
            }
            if mode_skills.is_empty() {
                continue;
            }
        }

        let name = mode_name(chara, &mode, m);
        for (seq, skill) in mode_skills {
            if let Some(id) = skill.record_id() {
                ctx.enqueue(id, base_entry(format!("s{}_{}", seq, name), seq, skill));
            }
        }
        if let Some((burst, marker)) = mode_burst(source, &mode)? {
            let compiled = compile_burst(&burst, marker.as_ref(), config);
            insert_bursts(ctx, slots, &format!("_{}", name), compiled)?;
        }
        for (slot, action) in unique_combos(source, &mode, &name)? {
            let options = ComboOptions::adventurer().with_pattern(spiral_pattern.as_ref());
            let mut compiled = compile_combo(&action, options, config);
            // spiral hit labels are missing on some combos
            if spiral_pattern.is_some() && compiled.as_ref().is_ok_and(|c| c.attr.is_empty()) {
                compiled = compile_combo(&action, ComboOptions::adventurer(), config);
            }
            insert_slot(ctx, slots, slot, compiled)?;
        }
    }
    guns.sort_unstable();
    Ok(guns)
}

fn skill_level(chara: &Value, entry: &ChainEntry, spiral: bool, config: &CompilerConfig) -> Result<u32> {
    let seq = if entry.seq == EDIT_SKILL_SEQ {
        chara
            .id_of("_EditSkillLevelNum")
            .and_then(|lv| u32::try_from(lv).ok())
            .ok_or_else(|| ExportError::missing(record_name(chara), "_EditSkillLevelNum"))?
    } else {
        entry.seq
    };
    config
        .skill_levels
        .level(spiral, seq)
        .ok_or_else(|| ExportError::missing(record_name(&entry.skill), "_SkillLevel"))
}

/// Compile queued skills until the work-list is empty
fn drain_skills(
    ctx: &mut CompileContext<'_>,
    slots: &mut SlotMap,
    chara: &Value,
    source: &dyn RecordSource,
    spiral: bool,
) -> Result<()> {
    let config = ctx.config;
    while let Some((id, entry)) = ctx.pending.pop() {
        let lv = skill_level(chara, &entry, spiral, config)?;
        ctx.processed.insert(
            id,
            ProcessedSkill {
                label: entry.label.clone(),
                seq: entry.seq,
                prev: entry.prev,
            },
        );

        let mut conf = compile_skill_action(&entry.skill, lv, config, &mut ctx.skill_scope(id))?;
        let label = transformations(ctx, id, &entry).unwrap_or_else(|| entry.label.clone());
        alt_skill(ctx, source, id, &entry.skill, lv)?;

        if let Some(buffs) = ctx.alt_buffs.get(&entry.seq).filter(|b| !b.is_empty()) {
            let mut buff = buffs.clone();
            buff.push(json!("-refresh"));
            conf.attr.push(AttrEntry::Hit(ConvertedAttr {
                buff: Some(Value::from(buff)),
                ..Default::default()
            }));
        }

        if let Some(processed) = ctx.processed.get_mut(&id) {
            processed.label = label.clone();
        }
        tracing::debug!("Compiled {} ({}) at level {}", label, id, lv);
        insert_slot(ctx, slots, label, Ok(conf))?;
    }
    Ok(())
}

/// Queue the phases of a transforming skill. Returns the skill's own label
/// when it has phases.
fn transformations(ctx: &mut CompileContext<'_>, id: u64, entry: &ChainEntry) -> Option<String> {
    let phases: Vec<(u64, &Value)> = match entry.skill.field("_TransSkill")? {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| v.is_object())
            .map(|(k, v)| (k.parse().ok().or_else(|| v.record_id()).unwrap_or(0), v))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|v| Some((v.record_id()?, v)))
            .collect(),
        _ => return None,
    };
    for (idx, (phase_id, phase)) in phases.into_iter().enumerate() {
        if phase_id == 0 || phase_id == id {
            continue;
        }
        ctx.enqueue(
            phase_id,
            ChainEntry {
                label: format!("s{}_phase{}", entry.seq, idx + 1),
                seq: entry.seq,
                skill: phase.clone(),
                prev: Some(id),
                group: None,
            },
        );
    }
    if entry.label.contains("_phase") {
        Some(entry.label.clone())
    } else {
        Some(format!("s{}_phase1", entry.seq))
    }
}

/// Alternate skill granted by the skill's own ability (type 44)
fn alt_skill(
    ctx: &mut CompileContext<'_>,
    source: &dyn RecordSource,
    id: u64,
    skill: &Value,
    lv: u32,
) -> Result<()> {
    let Some(ability) = linked_record(source, Table::AbilityData, skill, &format!("_Ability{}", lv))? else {
        return Ok(());
    };
    if ability.id_of("_AbilityType1").map(AbilityKind::from_code) != Some(AbilityKind::AltSkill) {
        return Ok(());
    }
    let slot = ability
        .text("_TargetAction1")
        .and_then(|t| t.chars().last())
        .and_then(|c| c.to_digit(10));
    let Some(slot) = slot else {
        return Ok(());
    };
    let Some(alt) = ability.record("_VariousId1a") else {
        return Ok(());
    };
    let Some(alt_id) = alt.record_id() else {
        return Ok(());
    };
    if ctx.processed.contains_key(&alt_id) || ctx.pending.contains(alt_id) {
        return Ok(());
    }
    let group = ctx.skill_groups.next_label("enhanced");
    ctx.enqueue(
        alt_id,
        ChainEntry {
            label: format!("s{}_{}", slot, group),
            seq: slot,
            skill: alt.clone(),
            prev: Some(id),
            group: Some(group),
        },
    );
    Ok(())
}
