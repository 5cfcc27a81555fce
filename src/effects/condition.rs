//! Action condition classification: afflictions, bleed, buffs and debuffs

use serde_json::Value;

use crate::core::{fr, num, Num};
use crate::records::mappings::element_from_bitmap;
use crate::records::Fields;
use crate::timeline::ActionPart;

/// `_EfficacyType` of a dispel
pub const DISPEL: u64 = 100;

/// Target groups
pub const TARGET_SELF: u64 = 5;
pub const TARGET_ENEMY: u64 = 3;
pub const TARGET_TEAM: u64 = 2;
pub const TARGET_TEAM_ALL: u64 = 6;

/// Documented affliction duration. Types without an entry never match.
pub fn default_duration(affliction: &str) -> Option<f64> {
    Some(match affliction {
        "poison" => 15.0,
        "burn" => 12.0,
        "paralysis" => 13.0,
        "frostbite" => 21.0,
        "flashburn" => 21.0,
        "blind" => 8.0,
        "bog" => 8.0,
        "freeze" => 4.5,
        "stun" => 6.5,
        "sleep" => 4.5,
        "shadowblight" => 21.0,
        "stormlash" => 21.0,
        _ => return None,
    })
}

/// Documented tick interval; only damage-over-time afflictions tick
pub fn default_interval(affliction: &str) -> Option<f64> {
    Some(match affliction {
        "poison" => 2.9,
        "burn" => 3.9,
        "paralysis" => 3.9,
        "frostbite" => 2.9,
        "flashburn" => 2.9,
        "shadowblight" => 2.9,
        "stormlash" => 2.9,
        _ => return None,
    })
}

/// Buff fields: `(field, modifier, kind)`
pub const BUFF_ARGS: [(&str, &str, &str); 11] = [
    ("_RateAttack", "att", "buff"),
    ("_RateDefense", "defense", "buff"),
    ("_RateHP", "maxhp", "buff"),
    ("_RateCritical", "crit", "chance"),
    ("_EnhancedCritical", "crit", "damage"),
    ("_SlipDamageRatio", "regen", "buff"),
    ("_RateRecoverySp", "sp", "passive"),
    ("_RateAttackSpeed", "spd", "passive"),
    ("_RateChargeSpeed", "cspd", "passive"),
    ("_RateBurst", "fs", "buff"),
    ("_RateSkill", "s", "buff"),
];

/// Debuff fields on enemies: `(field, modifier)`
pub const DEBUFF_ARGS: [(&str, &str); 3] = [
    ("_RateDefense", "def"),
    ("_RateDefenseB", "defb"),
    ("_RateAttack", "attack"),
];

/// Affliction resistance fields: `(field, affliction)`
pub const AFFRES_ARGS: [(&str, &str); 9] = [
    ("_RatePoison", "poison"),
    ("_RateBurn", "burn"),
    ("_RateFreeze", "freeze"),
    ("_RateDarkness", "blind"),
    ("_RateSwoon", "stun"),
    ("_RateSlowMove", "bog"),
    ("_RateSleep", "sleep"),
    ("_RateFrostbite", "frostbite"),
    ("_RateFlashheat", "flashburn"),
];

pub const TENSION_ARGS: [(&str, &str); 2] = [("_Tension", "energy"), ("_Inspiration", "inspiration")];

/// `[name, rate, dot?, duration?, interval?]`
///
/// Duration is the mean of the declared and minimum durations. Duration and
/// interval are left out when they equal the documented defaults; a
/// non-default interval still needs the duration in front of it.
pub fn affliction(name: &str, actcond: &Value) -> Vec<Value> {
    let mut out = vec![Value::from(name), num(actcond.number_or_zero("_Rate"))];
    if let Some(dot) = actcond.number("_SlipDamagePower") {
        out.push(num(dot));
    }

    let declared = actcond.number_or_zero("_DurationSec");
    let minimum = actcond.number("_MinDurationSec").unwrap_or(declared);
    let duration = fr((declared + minimum) / 2.0);
    let duration_is_default = default_duration(name) == Some(duration);
    if !duration_is_default {
        out.push(num(duration));
    }

    if let Some(iv) = actcond.number("_SlipDamageIntervalSec").map(fr) {
        if default_interval(name) != Some(iv) {
            if duration_is_default {
                out.push(num(duration));
            }
            out.push(num(iv));
        }
    }
    out
}

/// `[rate, dot]` of a bleed
pub fn bleed(actcond: &Value) -> (Num, Num) {
    (
        Num(actcond.number_or_zero("_Rate")),
        Num::rounded(actcond.number_or_zero("_SlipDamagePower")),
    )
}

pub fn is_bleed(actcond: &Value) -> bool {
    actcond.text("_Text") == Some("Bleeding")
}

/// Who a buff applies to, and for how long
#[derive(Debug, Clone, PartialEq)]
struct BuffScope {
    name: &'static str,
    /// seconds, hit count for `next`, or -1 for permanent
    duration: f64,
}

fn buff_scope(actcond: &Value, part: &ActionPart<'_>, target: u64) -> BuffScope {
    if let Some(lifetime) = part.number("_lifetime") {
        return BuffScope {
            name: "zone",
            duration: fr(lifetime),
        };
    }
    match actcond.number("_DurationNum") {
        Some(count) if actcond.number("_DurationSec").is_none() => BuffScope {
            name: "next",
            duration: count,
        },
        _ => BuffScope {
            name: if target == TARGET_TEAM || target == TARGET_TEAM_ALL {
                "team"
            } else {
                "self"
            },
            duration: fr(actcond.number("_DurationSec").unwrap_or(-1.0)),
        },
    }
}

/// Buff / debuff payload of an action condition, with alternate form
/// tuples (`sAlt`, `fsAlt`) prepended. `None` when nothing applies.
pub fn buffs(
    actcond: &Value,
    part: &ActionPart<'_>,
    target: u64,
    mut alt_buffs: Vec<Vec<Value>>,
) -> Option<Value> {
    let mut out: Vec<Vec<Value>> = TENSION_ARGS
        .iter()
        .filter_map(|(field, kind)| {
            let v = actcond.number(field)?;
            let mut tuple = vec![Value::from(*kind), num(v)];
            if target == TARGET_TEAM_ALL {
                tuple.push(Value::from("team"));
            }
            Some(tuple)
        })
        .collect();

    if out.is_empty() {
        let scope = buff_scope(actcond, part, target);

        for alt in alt_buffs.iter_mut() {
            if scope.name == "next" && alt.first().and_then(Value::as_str) == Some("fsAlt") {
                alt.push(Value::from(-1));
                alt.push(num(scope.duration));
            } else if scope.duration > -1.0 {
                alt.push(num(scope.duration));
            }
        }
        out.append(&mut alt_buffs);

        if target == TARGET_ENEMY {
            let rate = actcond.number_or_zero("_Rate") / 100.0;
            for (field, modifier) in DEBUFF_ARGS {
                if let Some(v) = actcond.number(field) {
                    out.push(vec![
                        "debuff".into(),
                        num(v),
                        num(scope.duration),
                        num(rate),
                        modifier.into(),
                    ]);
                }
            }
            for (field, aff) in AFFRES_ARGS {
                if let Some(v) = actcond.number(field) {
                    out.push(vec!["affres".into(), num(v), num(scope.duration), aff.into()]);
                }
            }
        } else {
            let element = actcond
                .id_of("_TargetElemental")
                .and_then(element_from_bitmap)
                .filter(|_| scope.name != "self");
            for (field, modifier, kind) in BUFF_ARGS {
                let Some(v) = actcond.number(field) else {
                    continue;
                };
                let tuple = match element {
                    Some(ele) => vec![
                        "ele".into(),
                        num(v),
                        num(scope.duration),
                        modifier.into(),
                        kind.into(),
                        ele.to_lowercase().into(),
                    ],
                    None => {
                        let v = if field == "_SlipDamageRatio" { -v } else { v };
                        vec![
                            scope.name.into(),
                            num(v),
                            num(scope.duration),
                            modifier.into(),
                            kind.into(),
                        ]
                    }
                };
                out.push(tuple);
            }
        }
    }

    if out.is_empty() {
        return None;
    }

    let mut payload: Vec<Value> = if out.len() == 1 {
        out.pop().unwrap_or_default()
    } else {
        out.into_iter().map(Value::from).collect()
    };
    if let Some(group) = actcond.id_of("_OverwriteGroupId") {
        payload.push(Value::from(format!("-overwrite_{}", group)));
    } else if actcond.flag("_Overwrite") {
        payload.push(Value::from("-refresh"));
    }
    Some(Value::from(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn part(raw: &Value) -> ActionPart<'_> {
        ActionPart::new(raw)
    }

    #[test]
    fn test_default_poison_omits_duration() {
        let actcond = json!({"_Type": "Poison", "_Rate": 100, "_DurationSec": 15,
            "_SlipDamagePower": 0.396, "_SlipDamageIntervalSec": 2.9});
        assert_eq!(affliction("poison", &actcond), vec![json!("poison"), json!(100), json!(0.396)]);
    }

    #[test]
    fn test_nondefault_interval_keeps_duration() {
        let actcond = json!({"_Rate": 110, "_DurationSec": 12, "_SlipDamagePower": 0.97,
            "_SlipDamageIntervalSec": 3.0});
        assert_eq!(
            affliction("burn", &actcond),
            vec![json!("burn"), json!(110), json!(0.97), json!(12), json!(3)]
        );
    }

    #[test]
    fn test_duration_is_mean_of_declared_and_minimum() {
        let actcond = json!({"_Rate": 120, "_DurationSec": 8, "_MinDurationSec": 6});
        assert_eq!(affliction("stun", &actcond), vec![json!("stun"), json!(120), json!(7)]);
        let actcond = json!({"_Rate": 120, "_DurationSec": 8});
        assert_eq!(affliction("stun", &actcond), vec![json!("stun"), json!(120), json!(8)]);
    }

    #[test]
    fn test_mean_duration_equal_to_default_is_omitted() {
        let actcond = json!({"_Rate": 120, "_DurationSec": 7, "_MinDurationSec": 6});
        assert_eq!(affliction("stun", &actcond), vec![json!("stun"), json!(120)]);
    }

    #[test]
    fn test_self_attack_buff_collapses_to_tuple() {
        let raw = json!({"commandType": "HIT_ATTRIBUTE"});
        let actcond = json!({"_DurationSec": 15, "_RateAttack": 0.2});
        assert_eq!(
            buffs(&actcond, &part(&raw), 1, Vec::new()),
            Some(json!(["self", 0.2, 15, "att", "buff"]))
        );
    }

    #[test]
    fn test_team_buffs_with_overwrite_group() {
        let raw = json!({"commandType": "HIT_ATTRIBUTE"});
        let actcond = json!({"_DurationSec": 10, "_RateDefense": 0.15,
            "_RateCritical": 0.1, "_OverwriteGroupId": 3});
        assert_eq!(
            buffs(&actcond, &part(&raw), TARGET_TEAM_ALL, Vec::new()),
            Some(json!([
                ["team", 0.15, 10, "defense", "buff"],
                ["team", 0.1, 10, "crit", "chance"],
                "-overwrite_3"
            ]))
        );
    }

    #[test]
    fn test_zone_scope_and_regen_negated() {
        let raw = json!({"commandType": "BUFFFIELD_ATTACHMENT", "_lifetime": 10.0});
        let actcond = json!({"_SlipDamageRatio": -0.02, "_Overwrite": 1});
        assert_eq!(
            buffs(&actcond, &part(&raw), 1, Vec::new()),
            Some(json!(["zone", 0.02, 10, "regen", "buff", "-refresh"]))
        );
    }

    #[test]
    fn test_next_scope_for_counted_duration() {
        let raw = json!({"commandType": "HIT_ATTRIBUTE"});
        let actcond = json!({"_DurationNum": 1, "_RateSkill": 0.3});
        let alts = vec![vec![json!("fsAlt"), json!("enhanced")]];
        assert_eq!(
            buffs(&actcond, &part(&raw), 1, alts),
            Some(json!([
                ["fsAlt", "enhanced", -1, 1],
                ["next", 0.3, 1, "s", "buff"]
            ]))
        );
    }

    #[test]
    fn test_elemental_buff() {
        let raw = json!({"commandType": "HIT_ATTRIBUTE"});
        let actcond = json!({"_DurationSec": 20, "_RateAttack": 0.1, "_TargetElemental": 2});
        assert_eq!(
            buffs(&actcond, &part(&raw), TARGET_TEAM, Vec::new()),
            Some(json!(["ele", 0.1, 20, "att", "buff", "water"]))
        );
    }

    #[test]
    fn test_enemy_debuff_and_resistance() {
        let raw = json!({"commandType": "HIT_ATTRIBUTE"});
        let actcond = json!({"_DurationSec": 10, "_Rate": 100, "_RateDefense": -0.1, "_RateBurn": -0.05});
        assert_eq!(
            buffs(&actcond, &part(&raw), TARGET_ENEMY, Vec::new()),
            Some(json!([
                ["debuff", -0.1, 10, 1, "def"],
                ["affres", -0.05, 10, "burn"]
            ]))
        );
    }

    #[test]
    fn test_tension_team() {
        let raw = json!({"commandType": "HIT_ATTRIBUTE"});
        let actcond = json!({"_Tension": 1});
        assert_eq!(
            buffs(&actcond, &part(&raw), TARGET_TEAM_ALL, Vec::new()),
            Some(json!(["energy", 1, "team"]))
        );
    }
}
