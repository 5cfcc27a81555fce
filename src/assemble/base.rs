//! Weapon-type base configs: shared burst and normal combo per weapon

use serde_json::{json, Value};

use super::context::CompileContext;
use super::modes::{mode_burst, unique_combos};
use super::{insert_bursts, insert_slot, linked_record, EntityOutput, SlotMap};
use crate::compile::{compile_burst, compile_charge_cancel, compile_combo, ComboOptions};
use crate::core::{CompilerConfig, ExportError, Result};
use crate::effects::hitattr::NoAltForms;
use crate::effects::{convert_action_attrs, AttrEntry, LabelPattern};
use crate::records::{record_name, Fields, RecordSource, Table};

/// Character mode ids of the three gun styles
pub const GUN_MODES: [u64; 3] = [40, 41, 42];

/// Output name of a weapon label
pub fn weapon_label_name(label: &str) -> Option<&'static str> {
    Some(match label {
        "AXE" => "axe",
        "BOW" => "bow",
        "CAN" => "staff",
        "DAG" => "dagger",
        "KAT" => "blade",
        "LAN" => "lance",
        "ROD" => "wand",
        "SWD" => "sword",
        "GUN" => "gun",
        _ => return None,
    })
}

pub fn assemble_base(
    weapon: &Value,
    source: &dyn RecordSource,
    config: &CompilerConfig,
) -> Result<EntityOutput> {
    let label = weapon
        .text("_Label")
        .ok_or_else(|| ExportError::missing(record_name(weapon), "_Label"))?;
    let name = weapon_label_name(label)
        .ok_or_else(|| ExportError::missing(record_name(weapon), "_Label"))?;

    let mut ctx = CompileContext::new(config);
    let mut slots = SlotMap::new();
    let mut lv2 = SlotMap::new();

    if label == "GUN" {
        for mode_id in GUN_MODES {
            let Some(mode) = source.get_record(Table::CharaModeData, mode_id)? else {
                continue;
            };
            let mode_name = format!("gun{}", mode.id_of("_GunMode").unwrap_or(mode_id));
            if let Some((burst, marker)) = mode_burst(source, &mode)? {
                let compiled = compile_burst(&burst, marker.as_ref(), config);
                insert_bursts(&mut ctx, &mut slots, &format!("_{}", mode_name), compiled)?;
            }
            for (slot, action) in unique_combos(source, &mode, &mode_name)? {
                add_combo(&mut ctx, &mut slots, &mut lv2, slot, &action)?;
            }
        }
    } else {
        let burst = linked_record(source, Table::PlayerAction, weapon, "_BurstPhase1")?;
        if let Some(burst) = &burst {
            let marker = linked_record(source, Table::PlayerAction, weapon, "_ChargeMarker")?;
            let compiled = compile_burst(burst, marker.as_ref(), config);
            insert_bursts(&mut ctx, &mut slots, "", compiled)?;
        }
        if let Some(cancel) = linked_record(source, Table::PlayerAction, weapon, "_ChargeCancel")? {
            let fsf = compile_charge_cancel(&cancel, burst.as_ref(), config);
            slots.insert("fsf".to_string(), fsf.to_value());
        }
        for n in 1..=5 {
            let key = format!("_DefaultSkill0{}", n);
            let Some(action) = linked_record(source, Table::PlayerAction, weapon, &key)? else {
                break;
            };
            add_combo(&mut ctx, &mut slots, &mut lv2, format!("x{}", n), &action)?;
        }
    }

    let mut out = SlotMap::new();
    out.insert("lv2".to_string(), Value::Object(lv2));
    out.extend(slots);
    Ok(EntityOutput {
        name: name.to_string(),
        slots: out,
        missing_endlag: ctx.missing_endlag,
    })
}

/// Compile a combo hit and its level 2 (post-upgrade) hit attributes
fn add_combo(
    ctx: &mut CompileContext<'_>,
    slots: &mut SlotMap,
    lv2: &mut SlotMap,
    slot: String,
    action: &Value,
) -> Result<()> {
    let compiled = compile_combo(action, ComboOptions::adventurer(), ctx.config);
    let startup = compiled.as_ref().ok().map(|conf| conf.startup());
    insert_slot(ctx, slots, slot.clone(), compiled)?;

    let Some(startup) = startup else {
        return Ok(());
    };
    let pattern = LabelPattern::burst_hits()?;
    let mut attrs = convert_action_attrs(action, Some(&pattern), &mut NoAltForms);
    if attrs.is_empty() {
        return Ok(());
    }
    for attr in attrs.iter_mut().filter_map(AttrEntry::as_hit_mut) {
        attr.rebase(startup);
    }
    lv2.insert(slot, json!({ "attr": attrs }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordStore;

    fn hit(label: &str, seconds: f64, dmg: f64) -> Value {
        json!({"commandType": "HIT_ATTRIBUTE", "_seconds": seconds,
               "_hitAttrLabel": [{"_Id": format!("{}_LV01", label), "_DamageAdjustment": dmg},
                                 {"_Id": format!("{}_LV02", label), "_DamageAdjustment": dmg * 2.0}]})
    }

    #[test]
    fn test_sword_base() {
        let weapon = json!({
            "_Id": 1, "_Label": "SWD",
            "_BurstPhase1": {"_Id": 100005, "_Parts": [
                {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.5,
                 "_hitLabel": {"_Id": "SWD_BURST_H01_LV02", "_DamageAdjustment": 0.9}},
                {"commandType": "ACTIVE_CANCEL", "_seconds": 1.0}
            ]},
            "_DefaultSkill01": {"_Id": 100001, "_Parts": [
                hit("SWD_NRM_H01", 0.2, 1.0),
                {"commandType": "ACTIVE_CANCEL", "_seconds": 0.6}
            ]}
        });
        let out = assemble_base(&weapon, &RecordStore::new(), &CompilerConfig::default()).unwrap();
        assert_eq!(out.name, "sword");
        let keys: Vec<&str> = out.slots.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["lv2", "fs", "x1"]);
        assert_eq!(out.slots["x1"]["attr"], json!([{"dmg": 1}]));
        assert_eq!(out.slots["lv2"], json!({"x1": {"attr": [{"dmg": 2}]}}));
    }

    #[test]
    fn test_unknown_label_fails() {
        let weapon = json!({"_Id": 1, "_Label": "XYZ"});
        assert!(assemble_base(&weapon, &RecordStore::new(), &CompilerConfig::default()).is_err());
    }
}
