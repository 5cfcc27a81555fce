//! Hit attribute normalizer

use serde_json::Value;

use super::attr::ConvertedAttr;
use super::condition::{self, DISPEL, TARGET_ENEMY, TARGET_SELF};
use super::ledger::{GrantLedger, Resource};
use crate::core::{fr, num, Num};
use crate::records::Fields;
use crate::timeline::{ActionPart, CommandType};

const KILLER_STATES: [&str; 3] = ["_KillerState1", "_KillerState2", "_KillerState3"];

/// Action condition fields that unlock an enhanced skill, with their slot
pub const ENHANCED_SKILL_FIELDS: [(&str, u32); 2] = [("_EnhancedSkill1", 1), ("_EnhancedSkill2", 2)];

/// Receives enhanced forms discovered while converting a character skill
pub trait AltFormSink {
    /// An enhanced skill for slot `slot`. Returns the group label when the
    /// skill was queued for compilation, `None` when nothing was queued.
    fn enhanced_skill(&mut self, slot: u32, skill: &Value) -> Option<String>;

    /// An enhanced burst attack. Returns its group label when queued.
    fn enhanced_burst(&mut self, burst: &Value) -> Option<String>;
}

/// Sink for actions that are not character skills
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAltForms;

impl AltFormSink for NoAltForms {
    fn enhanced_skill(&mut self, _slot: u32, _skill: &Value) -> Option<String> {
        None
    }

    fn enhanced_burst(&mut self, _burst: &Value) -> Option<String> {
        None
    }
}

/// Convert one hit attribute into an effect instance.
///
/// Resource recovery and action conditions already in `ledger` are skipped.
/// Returns `None` when nothing survives.
pub fn convert_hitattr(
    hitattr: &Value,
    part: &ActionPart<'_>,
    action: &Value,
    ledger: &mut GrantLedger,
    sink: &mut dyn AltFormSink,
) -> Option<ConvertedAttr> {
    let mut attr = ConvertedAttr::default();
    let target = hitattr.id_of("_TargetGroup").unwrap_or(0);
    let resets_ledger = hitattr.flag("_IgnoreFirstHitCheck");
    if resets_ledger {
        ledger.clear();
    }

    if target != TARGET_SELF {
        if let Some(dmg) = hitattr.number("_DamageAdjustment") {
            attr.dmg = Some(Num::rounded(dmg));
            let killers: Vec<String> = KILLER_STATES
                .iter()
                .filter_map(|k| hitattr.text(k))
                .map(str::to_lowercase)
                .collect();
            if !killers.is_empty() {
                let rate = hitattr.number("_KillerStateDamageRate").unwrap_or(1.0);
                attr.killer = Some((Num::rounded(rate - 1.0), killers));
            }
            if let Some(crisis) = hitattr.number("_CrisisLimitRate") {
                attr.crisis = Some(Num::rounded(crisis - 1.0));
            }
            if let Some(bufc) = hitattr.number("_DamageUpRateByBuffCount") {
                attr.bufc = Some(Num::rounded(bufc));
            }
        }
    }

    convert_resources(hitattr, ledger, &mut attr);

    if let Some(hp) = hitattr.number("_HpDrainLimitRate") {
        attr.hp = Some(Num::rounded(hp * 100.0));
    }
    if let Some(cp) = hitattr.number("_RecoveryCP") {
        attr.cp = Some(Num(cp));
    }
    if part.command() == (CommandType::Bullet { stock: true }) {
        if let Some(stock) = action.number("_MaxStockBullet").filter(|&s| s > 1.0) {
            attr.extra = Some(Num(stock));
        }
    }
    let attenuation = part.number_or_zero("_attenuationRate");
    if 0.0 < attenuation && attenuation < 1.0 {
        attr.fade = Some(Num::rounded(attenuation));
    }

    if let Some(actcond) = hitattr.record("_ActionCondition1") {
        let id = actcond.record_id().unwrap_or(0);
        if ledger.grant_condition(id) {
            if let Some(link) = actcond.record("_DamageLink") {
                return convert_hitattr(link, part, action, ledger, sink);
            }
            apply_condition(&mut attr, actcond, part, target, sink);
        }
    }

    if resets_ledger {
        ledger.clear();
    }

    if attr.is_empty() {
        return None;
    }
    let iv = fr(part.seconds() + part.delay_time());
    if iv > 0.0 {
        attr.iv = Some(Num(iv));
    }
    if part.command().is_bullet() {
        attr.msl = Some(1);
    }
    Some(attr)
}

/// sp, dp and utp; the first grant of each wins for the whole action
fn convert_resources(hitattr: &Value, ledger: &mut GrantLedger, attr: &mut ConvertedAttr) {
    if !ledger.has_resource(Resource::Sp) {
        if let Some(sp) = hitattr.number("_AdditionRecoverySp") {
            attr.sp = Some(num(sp));
            ledger.grant_resource(Resource::Sp);
        } else if let Some(ratio) = hitattr.number("_RecoverySpRatio") {
            let mut sp = vec![num(ratio), Value::from("%")];
            if let Some(idx) = hitattr.id_of("_RecoverySpSkillIndex") {
                sp.push(Value::from(format!("s{}", idx)));
            }
            attr.sp = Some(Value::from(sp));
            ledger.grant_resource(Resource::Sp);
        }
    }

    if !ledger.has_resource(Resource::Dp) {
        if let Some(dp) = hitattr.number("_AdditionRecoveryDpLv1") {
            attr.dp = Some(Num(dp));
            ledger.grant_resource(Resource::Dp);
        }
    }

    if !ledger.has_resource(Resource::Utp) {
        let utp = hitattr
            .number("_AddUtp")
            .or_else(|| hitattr.number("_AdditionRecoveryUtp"));
        if let Some(utp) = utp {
            attr.utp = Some(Num(utp));
            ledger.grant_resource(Resource::Utp);
        }
    }
}

fn apply_condition(
    attr: &mut ConvertedAttr,
    actcond: &Value,
    part: &ActionPart<'_>,
    target: u64,
    sink: &mut dyn AltFormSink,
) {
    if actcond.id_of("_EfficacyType") == Some(DISPEL) {
        if let Some(rate) = actcond.number("_Rate") {
            attr.dispel = Some(Num(rate));
            return;
        }
    }

    let alt_buffs = discover_alt_forms(actcond, sink);

    match actcond.text("_Type") {
        Some(kind) if target == TARGET_ENEMY => {
            attr.afflic = Some(condition::affliction(&kind.to_lowercase(), actcond));
        }
        _ if condition::is_bleed(actcond) => {
            attr.bleed = Some(condition::bleed(actcond));
        }
        _ => {
            attr.buff = condition::buffs(actcond, part, target, alt_buffs);
        }
    }
}

fn discover_alt_forms(actcond: &Value, sink: &mut dyn AltFormSink) -> Vec<Vec<Value>> {
    let mut alt_buffs = Vec::new();
    for (field, slot) in ENHANCED_SKILL_FIELDS {
        if !actcond.flag(field) {
            continue;
        }
        let Some(skill) = actcond.field(field) else {
            continue;
        };
        if let Some(group) = sink.enhanced_skill(slot, skill) {
            alt_buffs.push(vec![
                Value::from("sAlt"),
                Value::from(group),
                Value::from(format!("s{}", slot)),
            ]);
        }
    }
    if let Some(burst) = actcond.record("_EnhancedBurstAttack") {
        if let Some(group) = sink.enhanced_burst(burst) {
            alt_buffs.push(vec![Value::from("fsAlt"), Value::from(group)]);
        }
    }
    alt_buffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(hitattr: Value, part: Value, ledger: &mut GrantLedger) -> Option<ConvertedAttr> {
        let action = json!({});
        convert_hitattr(&hitattr, &ActionPart::new(&part), &action, ledger, &mut NoAltForms)
    }

    fn hit_part(seconds: f64) -> Value {
        json!({"commandType": "HIT_ATTRIBUTE", "_seconds": seconds})
    }

    #[test]
    fn test_damage_with_killer_and_crisis() {
        let mut ledger = GrantLedger::new();
        let attr = convert(
            json!({"_TargetGroup": 3, "_DamageAdjustment": 2.5,
                "_KillerState1": "Burn", "_KillerStateDamageRate": 1.3,
                "_CrisisLimitRate": 1.5}),
            hit_part(0.4),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&attr).unwrap(),
            json!({"dmg": 2.5, "killer": [0.3, ["burn"]], "crisis": 0.5, "iv": 0.4})
        );
    }

    #[test]
    fn test_self_target_has_no_damage() {
        let mut ledger = GrantLedger::new();
        let attr = convert(
            json!({"_TargetGroup": 5, "_DamageAdjustment": 1.0}),
            hit_part(0.1),
            &mut ledger,
        );
        assert!(attr.is_none());
    }

    #[test]
    fn test_sp_granted_once_per_action() {
        let mut ledger = GrantLedger::new();
        let hit = json!({"_TargetGroup": 3, "_DamageAdjustment": 1.0, "_AdditionRecoverySp": 130});
        let first = convert(hit.clone(), hit_part(0.2), &mut ledger).unwrap();
        let second = convert(hit, hit_part(0.4), &mut ledger).unwrap();
        assert_eq!(first.sp, Some(json!(130)));
        assert_eq!(second.sp, None);
    }

    #[test]
    fn test_ignore_first_hit_check_resets_grants() {
        let mut ledger = GrantLedger::new();
        let hit = json!({"_DamageAdjustment": 1.0, "_AdditionRecoverySp": 130});
        let reset = json!({"_DamageAdjustment": 1.0, "_AdditionRecoverySp": 130, "_IgnoreFirstHitCheck": 1});
        convert(hit, hit_part(0.2), &mut ledger).unwrap();
        let again = convert(reset, hit_part(0.4), &mut ledger).unwrap();
        assert_eq!(again.sp, Some(json!(130)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_percent_sp_with_skill_index() {
        let mut ledger = GrantLedger::new();
        let attr = convert(
            json!({"_RecoverySpRatio": 0.2, "_RecoverySpSkillIndex": 2}),
            hit_part(0.0),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(attr.sp, Some(json!([0.2, "%", "s2"])));
        assert_eq!(attr.iv, None);
    }

    #[test]
    fn test_poison_with_default_duration() {
        let mut ledger = GrantLedger::new();
        let attr = convert(
            json!({"_TargetGroup": 3, "_ActionCondition1": {
                "_Id": 401, "_Type": "POISON", "_Rate": 100, "_DurationSec": 15}}),
            hit_part(0.3),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(attr.afflic, Some(vec![json!("poison"), json!(100)]));
    }

    #[test]
    fn test_condition_granted_once() {
        let mut ledger = GrantLedger::new();
        let hit = json!({"_TargetGroup": 3, "_DamageAdjustment": 1.0, "_ActionCondition1": {
            "_Id": 401, "_Type": "Burn", "_Rate": 120, "_DurationSec": 12}});
        let first = convert(hit.clone(), hit_part(0.3), &mut ledger).unwrap();
        let second = convert(hit, hit_part(0.6), &mut ledger).unwrap();
        assert!(first.afflic.is_some());
        assert!(second.afflic.is_none());
        assert!(second.dmg.is_some());
    }

    #[test]
    fn test_dispel_and_bleed() {
        let mut ledger = GrantLedger::new();
        let dispel = convert(
            json!({"_ActionCondition1": {"_Id": 1, "_EfficacyType": 100, "_Rate": 100}}),
            hit_part(0.1),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(dispel.dispel, Some(Num(100.0)));

        let bleed = convert(
            json!({"_TargetGroup": 3, "_ActionCondition1": {"_Id": 2, "_Text": "Bleeding",
                "_Rate": 80, "_SlipDamagePower": 1.32}}),
            hit_part(0.1),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(bleed.bleed, Some((Num(80.0), Num(1.32))));
    }

    #[test]
    fn test_damage_link_replaces_attribute() {
        let mut ledger = GrantLedger::new();
        let attr = convert(
            json!({"_DamageAdjustment": 1.0, "_ActionCondition1": {"_Id": 9,
                "_DamageLink": {"_DamageAdjustment": 3.0, "_TargetGroup": 3}}}),
            hit_part(0.5),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(attr.dmg, Some(Num(3.0)));
        assert!(ledger.has_condition(9));
    }

    #[test]
    fn test_bullet_marks_missile_and_stock() {
        let mut ledger = GrantLedger::new();
        let part = json!({"commandType": "FIRE_STOCK_BULLET", "_seconds": 0.2, "_delayTime": 0.1});
        let action = json!({"_MaxStockBullet": 3});
        let attr = convert_hitattr(
            &json!({"_DamageAdjustment": 0.5}),
            &ActionPart::new(&part),
            &action,
            &mut ledger,
            &mut NoAltForms,
        )
        .unwrap();
        assert_eq!(attr.msl, Some(1));
        assert_eq!(attr.extra, Some(Num(3.0)));
        assert_eq!(attr.iv, Some(Num(0.3)));
    }

    struct Recording {
        skills: Vec<u32>,
    }

    impl AltFormSink for Recording {
        fn enhanced_skill(&mut self, slot: u32, _skill: &Value) -> Option<String> {
            self.skills.push(slot);
            Some("enhanced".to_string())
        }

        fn enhanced_burst(&mut self, _burst: &Value) -> Option<String> {
            Some("enhanced".to_string())
        }
    }

    #[test]
    fn test_enhanced_skill_discovery_emits_alt_buff() {
        let mut ledger = GrantLedger::new();
        let mut sink = Recording { skills: Vec::new() };
        let part = hit_part(0.0);
        let hit = json!({"_TargetGroup": 1, "_ActionCondition1": {"_Id": 5, "_DurationSec": 20,
            "_EnhancedSkill1": {"_Id": 1001}}});
        let attr = convert_hitattr(&hit, &ActionPart::new(&part), &json!({}), &mut ledger, &mut sink)
            .unwrap();
        assert_eq!(sink.skills, vec![1]);
        assert_eq!(attr.buff, Some(json!(["sAlt", "enhanced", "s1", 20])));
    }
}
