//! Ability effect kinds and their handlers

use serde_json::Value;

use super::actcond;
use super::cond::condition_suffix;
use crate::core::num;
use crate::records::mappings::{affliction_name, enum_label};
use crate::records::Fields;

/// What one `_AbilityType{i}` code means
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityKind {
    /// Flat stat modifier keyed by `_VariousId{i}a`
    Stat,
    AfflictionEdge,
    /// Skill / burst / bleed / overdrive / break damage
    Damage,
    /// Buff granted when a condition triggers
    ActionCondition,
    AfflictionKiller,
    /// `[tag, value / div]`
    Scaled { tag: &'static str, div: Option<f64> },
    /// Holds up to three sub-abilities
    Nested,
    /// Alternate skill, resolved while assembling the adventurer
    AltSkill,
    Unknown(u64),
}

impl AbilityKind {
    pub fn from_code(code: u64) -> Self {
        let scaled = |tag, div| AbilityKind::Scaled { tag, div };
        match code {
            1 => AbilityKind::Stat,
            3 => AbilityKind::AfflictionEdge,
            6 => AbilityKind::Damage,
            7 => scaled("cc", Some(100.0)),
            11 => scaled("spf", Some(100.0)),
            14 => AbilityKind::ActionCondition,
            17 => scaled("prep", None),
            18 => scaled("bt", Some(100.0)),
            19 => scaled("dbt", Some(100.0)),
            20 => AbilityKind::AfflictionKiller,
            26 => scaled("cd", Some(100.0)),
            27 => scaled("dp", None),
            36 => scaled("da", Some(100.0)),
            43 => AbilityKind::Nested,
            44 => AbilityKind::AltSkill,
            59 => scaled("dbt", Some(100.0)),
            other => AbilityKind::Unknown(other),
        }
    }
}

fn stat_name(code: u64) -> Option<&'static str> {
    Some(match code {
        1 => "hp",
        2 => "a",
        4 => "sp",
        5 => "dh",
        8 => "dt",
        10 => "spd",
        12 => "cspd",
        _ => return None,
    })
}

/// One of the three effect slots of an ability record
#[derive(Debug, Clone, Copy)]
pub struct AbilityEffect<'a> {
    pub kind: AbilityKind,
    pub ability: &'a Value,
    pub target: Option<&'a str>,
    pub upval: Option<f64>,
    pub var_a: Option<&'a Value>,
    pub var_str: Option<&'a Value>,
}

impl<'a> AbilityEffect<'a> {
    /// Effect slot `index` (1-based), if the ability declares one
    pub fn read(ability: &'a Value, index: u32) -> Option<Self> {
        let code = ability.id_of(&format!("_AbilityType{}", index))?;
        Some(Self {
            kind: AbilityKind::from_code(code),
            ability,
            target: ability.text(&format!("_TargetAction{}", index)),
            upval: ability.number(&format!("_AbilityType{}UpValue", index)),
            var_a: ability.field(&format!("_VariousId{}a", index)),
            var_str: ability.record(&format!("_VariousId{}str", index)),
        })
    }

    /// Condensed tuple, `None` when the effect has nothing usable
    pub fn convert(&self) -> Option<Vec<Value>> {
        match self.kind {
            AbilityKind::Stat => {
                let stat = stat_name(self.var_a?.as_u64()?)?;
                self.with_suffix(vec![Value::from(stat), num(self.upval? / 100.0)])
            }
            AbilityKind::AfflictionEdge => {
                let affliction = enum_label(self.var_a?, affliction_name)?;
                Some(vec![
                    Value::from(format!("edge_{}", affliction)),
                    self.upval.map_or(Value::Null, num),
                ])
            }
            AbilityKind::Damage => self.damage(),
            AbilityKind::ActionCondition => actcond::convert(self),
            AbilityKind::AfflictionKiller => {
                let affliction = enum_label(self.var_a?, affliction_name)?;
                self.with_suffix(vec![
                    Value::from(format!("k_{}", affliction)),
                    num(self.upval? / 100.0),
                ])
            }
            AbilityKind::Scaled { tag, div } => {
                let upval = self.upval?;
                let value = div.map_or(upval, |d| upval / d);
                self.with_suffix(vec![Value::from(tag), num(value)])
            }
            AbilityKind::Nested | AbilityKind::AltSkill | AbilityKind::Unknown(_) => None,
        }
    }

    fn damage(&self) -> Option<Vec<Value>> {
        let value = num(self.upval? / 100.0);
        let tag = match self.target {
            Some("skill") => "s",
            Some("force strike") => "fs",
            _ => match self.ability.text("_ConditionType")? {
                "bleed" => "bleed",
                "overdrive" => "od",
                "break" => "bk",
                _ => return None,
            },
        };
        self.with_suffix(vec![Value::from(tag), value])
    }

    fn with_suffix(&self, mut tuple: Vec<Value>) -> Option<Vec<Value>> {
        if let Some(suffix) = condition_suffix(self.ability) {
            tuple.push(Value::from(suffix));
        }
        Some(tuple)
    }
}
