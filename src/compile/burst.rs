//! Burst (force strike) attacks, charge levels and the charge cancel

use serde_json::Value;

use super::combo::attach_attrs;
use super::SkillTimingConfig;
use crate::core::{fr, CompilerConfig, ExportError, Num, Result};
use crate::effects::hitattr::NoAltForms;
use crate::effects::{convert_action_attrs, LabelPattern};
use crate::records::{record_name, Fields};
use crate::timeline::{action_parts, follow_windows, resolve_timing, Timing, TimingOptions};

/// Compiled burst slots in output order: `fs`, `fs1`.. and `fsf`
pub type BurstSlots = Vec<(String, SkillTimingConfig)>;

/// Skills can always cut into a charged burst
const BURST_FOLLOW_DEFAULTS: [&str; 1] = ["s"];

/// Compile a burst attack.
///
/// Without a charge `marker` the burst is a single slot. With one, each
/// charge level that carries hit attributes becomes `fs<n>` and the base
/// `fs` is replaced by the first level once more than one level exists.
/// When no level carries hit attributes a bare `fs` keeps the charge and
/// timing.
pub fn compile_burst(
    burst: &Value,
    marker: Option<&Value>,
    config: &CompilerConfig,
) -> Result<BurstSlots> {
    let parts = action_parts(burst);
    let timing = resolve_timing(&parts, &TimingOptions::default());
    let startup = timing
        .startup
        .ok_or_else(|| ExportError::MissingStartup(record_name(burst)))?;

    let Some(marker) = marker else {
        let pattern = LabelPattern::burst()?;
        return Ok(level(burst, &timing, startup, None, &pattern)
            .map(|conf| vec![("fs".to_string(), conf)])
            .unwrap_or_default());
    };

    let charge = marker_part(marker)
        .and_then(|p| p.number("_chargeSec"))
        .unwrap_or(config.default_charge_sec);
    let charge_levels = marker_part(marker).and_then(|p| charge_levels(p.field("_chargeLvSec")?));

    let Some(extra_levels) = charge_levels else {
        let pattern = LabelPattern::burst_hits()?;
        let Some(mut conf) = level(burst, &timing, startup, Some(charge), &pattern) else {
            return Ok(Vec::new());
        };
        set_windows(&mut conf, startup, &timing, config);
        return Ok(vec![("fs".to_string(), conf)]);
    };

    let mut slots: BurstSlots = Vec::new();
    let mut total_charge = 0.0;
    let levels = std::iter::once(charge).chain(extra_levels);
    for (idx, level_charge) in levels.enumerate() {
        let pattern = if idx == 0 {
            LabelPattern::burst()?
        } else {
            LabelPattern::charge_level(idx + 1)?
        };
        total_charge += level_charge;
        if let Some(mut conf) = level(burst, &timing, startup, Some(charge), &pattern) {
            conf.charge = Some(Num::rounded(total_charge));
            set_windows(&mut conf, startup, &timing, config);
            slots.push((format!("fs{}", idx + 1), conf));
        }
    }

    if slots.is_empty() {
        let mut bare = SkillTimingConfig {
            charge: Some(Num::rounded(charge)),
            startup: Some(Num(startup)),
            recovery: timing.recovery.map(Num),
            ..Default::default()
        };
        attach_attrs(&mut bare, startup, Vec::new());
        return Ok(vec![("fs".to_string(), bare)]);
    }

    let has_second = slots.iter().any(|(name, _)| name == "fs2");
    if !has_second {
        if let Some((name, _)) = slots.iter_mut().find(|(name, _)| name == "fs1") {
            *name = "fs".to_string();
        }
    }
    Ok(slots)
}

/// Cancel out of the burst charge: a zero length action that ends the
/// charge. Follow-up windows are those of the `burst` being charged.
pub fn compile_charge_cancel(
    cancel: &Value,
    burst: Option<&Value>,
    config: &CompilerConfig,
) -> SkillTimingConfig {
    let duration = action_parts(cancel).first().map_or(0.0, |p| p.duration());
    let (startup, followed_by) = match burst {
        Some(burst) => {
            let timing = resolve_timing(&action_parts(burst), &TimingOptions::default());
            (timing.startup.unwrap_or(0.0), timing.followed_by)
        }
        None => (0.0, Vec::new()),
    };
    let windows = follow_windows(startup, &followed_by, &BURST_FOLLOW_DEFAULTS, config);
    SkillTimingConfig {
        charge: Some(Num(fr(config.charge_cancel_padding + duration))),
        startup: Some(Num(0.0)),
        recovery: Some(Num(0.0)),
        interrupt: Some(windows.interrupt),
        cancel: Some(windows.cancel),
        ..Default::default()
    }
}

fn marker_part(marker: &Value) -> Option<&Value> {
    match marker.field("_Parts")? {
        Value::Array(parts) => parts.first(),
        _ => None,
    }
}

/// Extra charge durations past the first level. Stored either as a JSON
/// list or as a string holding one.
fn charge_levels(raw: &Value) -> Option<Vec<f64>> {
    let levels: Vec<f64> = match raw {
        Value::String(text) => serde_json::from_str(text).ok()?,
        Value::Array(items) => items.iter().filter_map(Value::as_f64).collect(),
        _ => return None,
    };
    (!levels.is_empty()).then_some(levels)
}

/// One charge level; `None` when no hit attribute matches `pattern`
fn level(
    burst: &Value,
    timing: &Timing,
    startup: f64,
    charge: Option<f64>,
    pattern: &LabelPattern,
) -> Option<SkillTimingConfig> {
    let attrs = convert_action_attrs(burst, Some(pattern), &mut NoAltForms);
    if attrs.is_empty() {
        return None;
    }
    let mut conf = SkillTimingConfig {
        charge: charge.map(Num),
        startup: Some(Num(startup)),
        recovery: timing.recovery.map(Num),
        ..Default::default()
    };
    attach_attrs(&mut conf, startup, attrs);
    Some(conf)
}

fn set_windows(conf: &mut SkillTimingConfig, startup: f64, timing: &Timing, config: &CompilerConfig) {
    let windows = follow_windows(startup, &timing.followed_by, &BURST_FOLLOW_DEFAULTS, config);
    conf.interrupt = Some(windows.interrupt);
    conf.cancel = Some(windows.cancel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn charged_burst() -> Value {
        json!({"_Id": 100005, "_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.4, "_hitAttrLabel": [
                {"_Id": "DAG_CHR_01_H01_LV02", "_DamageAdjustment": 1.0},
                {"_Id": "DAG_CHR_01_H01_LV02_CHLV02", "_DamageAdjustment": 2.5}
            ]},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 0.3, "_actionId": 6},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.0}
        ]})
    }

    #[test]
    fn test_uncharged_burst() {
        let burst = json!({"_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.5,
             "_hitLabel": {"_Id": "SWD_BURST_H01_LV02", "_DamageAdjustment": 0.9}},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.2}
        ]});
        let slots = compile_burst(&burst, None, &CompilerConfig::default()).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].0, "fs");
        assert_eq!(
            slots[0].1.to_value(),
            json!({"startup": 0.5, "recovery": 0.7, "attr": [{"dmg": 0.9}]})
        );
    }

    #[test]
    fn test_charge_levels_replace_base_burst() {
        let marker = json!({"_Parts": [{"_chargeSec": 0.5, "_chargeLvSec": "[1.0]"}]});
        let slots = compile_burst(&charged_burst(), Some(&marker), &CompilerConfig::default()).unwrap();
        let names: Vec<&str> = slots.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["fs1", "fs2"]);
        assert_eq!(slots[0].1.charge, Some(Num(0.5)));
        assert_eq!(slots[1].1.charge, Some(Num(1.5)));
        assert_eq!(slots[1].1.attr.len(), 1);
        assert_eq!(
            slots[1].1.interrupt.as_ref().and_then(|w| w.get("dodge")),
            Some(&json!(0.3))
        );
    }

    #[test]
    fn test_single_charge_level_becomes_fs() {
        let marker = json!({"_Parts": [{"_chargeLvSec": [2.0]}]});
        let burst = json!({"_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.4, "_hitLabel": [
                {"_Id": "X_H01_LV01", "_DamageAdjustment": 0.5},
                {"_Id": "X_H01_LV02", "_DamageAdjustment": 1.0}
            ]},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.0}
        ]});
        let slots = compile_burst(&burst, Some(&marker), &CompilerConfig::default()).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].0, "fs");
        assert_eq!(slots[0].1.charge, Some(Num(0.5)));
    }

    #[test]
    fn test_unmatched_charge_levels_keep_bare_burst() {
        let marker = json!({"_Parts": [{"_chargeSec": 0.5, "_chargeLvSec": "[1.0]"}]});
        let burst = json!({"_Parts": [
            {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.4,
             "_hitLabel": [
                {"_Id": "Y_H01_LV01", "_DamageAdjustment": 0.5},
                {"_Id": "Y_H01_LV03", "_DamageAdjustment": 1.5}
             ]},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.0}
        ]});
        let slots = compile_burst(&burst, Some(&marker), &CompilerConfig::default()).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].0, "fs");
        assert_eq!(
            slots[0].1.to_value(),
            json!({"charge": 0.5, "startup": 0.4, "recovery": 0.6})
        );
    }

    #[test]
    fn test_charge_cancel_uses_burst_windows() {
        let cancel = json!({"_Parts": [{"commandType": "ACTIVE_CANCEL", "_duration": 0.2}]});
        let conf = compile_charge_cancel(&cancel, Some(&charged_burst()), &CompilerConfig::default());
        assert_eq!(conf.charge, Some(Num(0.3)));
        assert_eq!(conf.recovery(), Some(0.0));
        assert_eq!(conf.to_value()["interrupt"], json!({"s": 0, "dodge": 0.3}));
        assert_eq!(conf.to_value()["cancel"], json!({"s": 0, "dodge": 0}));
    }
}
