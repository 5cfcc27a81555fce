//! Skills
//!
//! Skills have a fixed startup and take their recovery from the first
//! untargeted cancel (or the animation length). Hit attribute times stay
//! absolute.

use serde_json::Value;

use super::SkillTimingConfig;
use crate::core::{CompilerConfig, ExportError, Num, Result};
use crate::effects::{convert_action_attrs, AltFormSink, LabelPattern};
use crate::records::{record_name, Fields};
use crate::timeline::{action_parts, resolve_skill_recovery};

/// Timing of a skill plus the action its effects are read from
#[derive(Debug, Clone)]
pub struct CompiledSkill {
    pub conf: SkillTimingConfig,
    /// The skill action with any chained next action appended
    pub action: Value,
}

/// Pick the action for skill level `lv` and resolve its timing
pub fn skill_action(skill: &Value, lv: u32, config: &CompilerConfig) -> Result<CompiledSkill> {
    let action = skill
        .record("_AdvancedActionId1")
        .or_else(|| skill.record("_ActionId1"))
        .ok_or_else(|| ExportError::missing(record_name(skill), "_ActionId1"))?;
    let mut action = action.clone();

    let recovery = resolve_skill_recovery(&action_parts(&action));
    let sp = skill
        .number(&format!("_SpLv{}", lv))
        .or_else(|| skill.number("_Sp"))
        .unwrap_or(0.0);
    let mut conf = SkillTimingConfig {
        sp: Some(Num(sp)),
        startup: Some(Num(config.skill_startup)),
        recovery: recovery.map(Num),
        ..Default::default()
    };

    if let Some(next) = action.record("_NextAction").cloned() {
        append_next_action(&mut action, next, recovery.unwrap_or(0.0));
        conf.merged_next_action = true;
    }
    Ok(CompiledSkill { conf, action })
}

/// Shift the next action's parts by `offset` and append them
fn append_next_action(action: &mut Value, mut next: Value, offset: f64) {
    let mut shifted: Vec<Value> = match next.get_mut("_Parts") {
        Some(Value::Array(parts)) => std::mem::take(parts),
        _ => Vec::new(),
    };
    for part in shifted.iter_mut() {
        let seconds = part.number_or_zero("_seconds") + offset;
        if let Value::Object(map) = part {
            map.insert("_seconds".to_string(), Value::from(seconds));
        }
    }
    match action.get_mut("_Parts") {
        Some(Value::Array(parts)) => parts.extend(shifted),
        _ => {
            if let Value::Object(map) = action {
                map.insert("_Parts".to_string(), Value::Array(shifted));
            }
        }
    }
}

/// Compile skill level `lv`: timing, level `lv` hit attributes and whether
/// a damage-less skill can be energized
pub fn compile_skill_action(
    skill: &Value,
    lv: u32,
    config: &CompilerConfig,
    sink: &mut dyn AltFormSink,
) -> Result<SkillTimingConfig> {
    let CompiledSkill { mut conf, action } = skill_action(skill, lv, config)?;
    let pattern = LabelPattern::skill_level(lv)?;
    conf.attr = convert_action_attrs(&action, Some(&pattern), sink);
    if !conf.has_damage() && skill.flag(&format!("_IsAffectedByTensionLv{}", lv)) {
        conf.energizable = true;
    }
    Ok(conf)
}
