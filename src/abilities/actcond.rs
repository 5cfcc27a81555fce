//! Action-condition abilities (type 14)
//!
//! The tag comes from the ability's trigger, the suffix and value from the
//! strongest-listed modifier of the granted condition.

use serde_json::Value;

use super::kind::AbilityEffect;
use crate::core::{fr, num};
use crate::records::mappings::{affliction_name, enum_label};
use crate::records::Fields;

/// Default affliction-proc buff duration and cooldown
const PROC_DURATION: f64 = 15.0;
const PROC_COOLDOWN: f64 = 10.0;

/// `(field, suffix)` of the modifier that names the buff, in priority order
const MODIFIERS: [(&str, &str); 6] = [
    ("_Tension", "energy"),
    ("_RateAttack", "att"),
    ("_RateCritical", "crit_chance"),
    ("_EnhancedCritical", "crit_damage"),
    ("_RateDefense", "defense"),
    ("_SlipDamageRatio", "regen"),
];

pub fn convert(effect: &AbilityEffect<'_>) -> Option<Vec<Value>> {
    let ability = effect.ability;
    let actcond = effect
        .var_a
        .filter(|v| v.is_object())
        .or_else(|| effect.var_str?.record("_ActionCondition1"));
    let targets_burst = ability.text("_TargetAction") == Some("force strike");
    let mut extra: Vec<Value> = Vec::new();

    let tag = match ability.text("_ConditionType")? {
        "doublebuff" if ability.flag("_CoolTime") => "bcc".to_string(),
        "doublebuff" => "bc".to_string(),
        "hp drop under" if ability.flag("_OccurenceNum") => "lo".to_string(),
        "hp drop under" => "ro".to_string(),
        "every combo" if targets_burst => {
            let sp = effect.var_str?.number("_RecoverySpRatio")?;
            return Some(vec![
                Value::from("fsprep"),
                ability.field("_OccurenceNum").cloned().unwrap_or(Value::Null),
                num(sp),
            ]);
        }
        "every combo" => {
            actcond?.number("_Tension")?;
            let hits = ability.number_or_zero("_ConditionValue") as i64;
            return Some(vec![Value::from("ecombo"), Value::from(hits)]);
        }
        "prep" => {
            let tension = actcond?.number("_Tension")?;
            return Some(vec![Value::from("eprep"), Value::from(tension as i64)]);
        }
        "claws" => {
            let actcond = actcond?;
            let tag = if actcond.number("_RateSkill").is_some() {
                "dcs"
            } else if actcond.number("_RateDefense").is_some() {
                "dcd"
            } else {
                "dc"
            };
            return Some(vec![Value::from(tag), Value::from(3)]);
        }
        "primed" => "primed".to_string(),
        "slayer/striker" if targets_burst => "sts".to_string(),
        "slayer/striker" => "sls".to_string(),
        "affliction proc" => {
            let affliction = enum_label(ability.field("_ConditionValue")?, affliction_name)?;
            let team = effect.var_str.and_then(|h| h.id_of("_TargetGroup")) == Some(6);
            let duration = actcond?.number_or_zero("_DurationSec");
            let cooldown = ability.number_or_zero("_CoolTime");
            if duration != PROC_DURATION {
                extra.push(num(duration));
            }
            if cooldown != PROC_COOLDOWN {
                if extra.is_empty() {
                    extra.push(num(duration));
                }
                extra.push(num(cooldown));
            }
            format!("{}_{}", if team { "affteam" } else { "affself" }, affliction)
        }
        _ => return None,
    };

    let actcond = actcond?;
    let (field, suffix) = MODIFIERS
        .iter()
        .find(|(field, _)| actcond.number(field).is_some())?;
    let raw = actcond.number(field)?;
    let value = match *suffix {
        "energy" => Value::from(raw as i64),
        "regen" => num(fr(raw * -100.0)),
        _ => num(raw),
    };

    let mut tuple = vec![Value::from(format!("{}_{}", tag, suffix)), value];
    tuple.extend(extra);
    Some(tuple)
}
