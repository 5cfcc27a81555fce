//! Dragon and weapon base batches, file layout and single-action helpers

use action_timeline::core::CompilerConfig;
use action_timeline::export::{
    compile_action, compile_batch, export_kind, ActionTarget, EntityKind,
};
use action_timeline::records::{RecordStore, Table};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn out_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("actconf-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn dragon(id: u64, name: &str, element: u64, dew: u64) -> Value {
    json!({
        "_Id": id, "_EmblemId": id, "_Name": name, "_Rarity": 5, "_IsPlayable": 1,
        "_SellDewPoint": dew, "_ElementalType": element,
        "_BaseId": 210000 + id % 100, "_VariationId": 1,
        "_MaxAtk": 120, "_MaxHp": 350,
        "_DefaultSkill": [{"_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.3,
             "_hitLabel": {"_Id": "D_H01", "_DamageAdjustment": 1.5}},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 0.9, "_actionId": 6}
        ]}],
        "_Skill1": {"_Id": id + 1, "_Sp": 1, "_ActionId1": {"_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 1.0,
             "_hitLabel": {"_Id": "DS_LV02", "_DamageAdjustment": 8.0}},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 2.0}
        ]}}
    })
}

fn sword() -> Value {
    json!({
        "_Id": 1, "_Label": "SWD",
        "_BurstPhase1": {"_Id": 100005, "_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.5,
             "_hitLabel": {"_Id": "SWD_BURST_H01_LV02", "_DamageAdjustment": 0.9}},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 0.2, "_actionId": 6},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.0}
        ]},
        "_ChargeCancel": {"_Parts": [{"commandType": "ACTIVE_CANCEL", "_duration": 0.1}]},
        "_DefaultSkill01": {"_Id": 100001, "_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.2, "_hitAttrLabel": [
                {"_Id": "SWD_NRM_H01_LV01", "_DamageAdjustment": 1.0},
                {"_Id": "SWD_NRM_H01_LV02", "_DamageAdjustment": 1.2}]},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 0.6}
        ]},
        "_DefaultSkill02": {"_Id": 100002, "_Parts": [
            {"commandType": "ACTIVE_CANCEL", "_seconds": 0.6}
        ]}
    })
}

#[test]
fn test_dragon_batch_selection_and_grouping() {
    let mut variant = dragon(20040102, "Agni Variant", 1, 8500);
    variant["_EmblemId"] = json!(20040101);
    let store = RecordStore::new()
        .with(Table::DragonData, dragon(20040101, "Agni", 1, 8500))
        .with(Table::DragonData, dragon(20040201, "Leviathan", 2, 8500))
        .with(Table::DragonData, dragon(20040301, "Gift Dragon", 3, 5000))
        .with(Table::DragonData, variant);

    let dir = out_dir("drg");
    let report = export_kind(EntityKind::Dragon, &store, &CompilerConfig::default(), &dir).unwrap();
    assert_eq!(report.exported, 2);
    assert!(report.is_clean());

    let flame = read_json(&dir.join("drg").join("flame.json"));
    assert_eq!(flame.as_object().unwrap().len(), 1);
    assert_eq!(flame["Agni"]["d"]["ele"], "flame");
    assert_eq!(flame["Agni"]["dx1"]["recovery"], json!(0.6));
    assert_eq!(flame["Agni"]["ds"]["uses"], json!(1));

    let water = read_json(&dir.join("drg").join("water.json"));
    assert!(water.get("Leviathan").is_some());
    let wind = read_json(&dir.join("drg").join("wind.json"));
    assert_eq!(wind, json!({}));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_base_export_writes_one_file_per_weapon() {
    let store = RecordStore::new().with(Table::WeaponType, sword());
    let dir = out_dir("base");
    let report = export_kind(EntityKind::Base, &store, &CompilerConfig::default(), &dir).unwrap();
    assert_eq!(report.exported, 1);
    // the second combo hit never connects
    assert_eq!(report.missing_endlag, vec!["sword: x2".to_string()]);

    let base = read_json(&dir.join("base").join("sword.json"));
    let keys: Vec<&str> = base.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["fs", "fsf", "lv2", "x1"]);
    assert!(base["fs"].get("interrupt").is_none());
    assert_eq!(base["fs"]["recovery"], json!(0.5));
    assert_eq!(base["fsf"]["charge"], json!(0.2));
    assert_eq!(base["fsf"]["interrupt"], json!({"s": 0, "dodge": 0.2}));
    assert_eq!(base["x1"]["attr"], json!([{"dmg": 1}]));
    assert_eq!(base["lv2"]["x1"]["attr"], json!([{"dmg": 1.2}]));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_batch_of_unknown_labels_reports_failures() {
    let store = RecordStore::new()
        .with(Table::WeaponType, sword())
        .with(Table::WeaponType, json!({"_Id": 2, "_Label": "XYZ"}));
    let (outputs, report) = compile_batch(EntityKind::Base, &store, &CompilerConfig::default()).unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, Some(2));
}

#[test]
fn test_single_action_helpers() {
    let config = CompilerConfig::default();
    let store = RecordStore::new()
        .with(Table::SkillData, json!({"_Id": 103401, "_Name": "Blade Rush", "_SpLv2": 2500,
            "_ActionId1": {"_Parts": [
                {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.6, "_hitAttrLabel": [
                    {"_Id": "S_LV01", "_DamageAdjustment": 4.0},
                    {"_Id": "S_LV02", "_DamageAdjustment": 6.0}]},
                {"commandType": "ACTIVE_CANCEL", "_seconds": 1.8}
            ]}}))
        .with(Table::PlayerAction, json!({"_Id": 100001, "_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.2,
             "_hitLabel": {"_Id": "X_H01", "_DamageAdjustment": 1.0}},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 0.7}
        ]}))
        .with(Table::PlayerAction, json!({"_Id": 100005, "_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.4,
             "_hitLabel": {"_Id": "FS_H01_LV02", "_DamageAdjustment": 2.0}},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.0}
        ]}));

    let skill = compile_action(ActionTarget::Skill { id: 103401, level: 2 }, &store, &config).unwrap();
    assert_eq!(skill["Blade_Rush"]["sp"], json!(2500));
    assert_eq!(skill["Blade_Rush"]["attr"], json!([{"dmg": 6, "iv": 0.6}]));

    let combo = compile_action(ActionTarget::Combo { id: 100001 }, &store, &config).unwrap();
    assert_eq!(combo["x1"]["recovery"], json!(0.5));

    let burst = compile_action(ActionTarget::Burst { id: 100005 }, &store, &config).unwrap();
    assert_eq!(burst["fs"]["startup"], json!(0.4));

    assert!(compile_action(ActionTarget::Combo { id: 1 }, &store, &config).is_err());
}

#[test]
fn test_sample_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("compiler.toml");
    let config = CompilerConfig::load(&path).unwrap();
    assert_eq!(config.dodge_actions, vec![6, 40]);
    assert_eq!(config.extra_dragons.len(), 6);
}
