//! Action parts and their command tags

use serde_json::Value;

use crate::records::Fields;

/// Part fields that carry hit attributes, in the order they are read
pub const HIT_LABELS: [&str; 4] = [
    "_hitLabel",
    "_hitAttrLabel",
    "_hitAttrLabelSubList",
    "_abHitAttrLabel",
];

/// What a part does on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// Direct hit check
    Hit,
    /// Projectile spawn; `stock` marks stocked bullets fired on demand
    Bullet { stock: bool },
    SendSignal,
    ActiveCancel,
    Timestop,
    Timecurve,
    PartsMotion,
    Other,
}

impl CommandType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SEND_SIGNAL" => CommandType::SendSignal,
            "ACTIVE_CANCEL" => CommandType::ActiveCancel,
            "TIMESTOP" => CommandType::Timestop,
            "TIMECURVE" => CommandType::Timecurve,
            "PARTS_MOTION" => CommandType::PartsMotion,
            n if n.contains("BULLET") => CommandType::Bullet {
                stock: n == "FIRE_STOCK_BULLET",
            },
            n if n.contains("HIT") => CommandType::Hit,
            _ => CommandType::Other,
        }
    }

    /// Hits and bullets are the events that define startup
    pub fn is_hit_like(self) -> bool {
        matches!(self, CommandType::Hit | CommandType::Bullet { .. })
    }

    pub fn is_bullet(self) -> bool {
        matches!(self, CommandType::Bullet { .. })
    }
}

/// Hit attributes found under one hit label
#[derive(Debug, Clone)]
pub enum HitGroup<'a> {
    Single(&'a Value),
    List(Vec<&'a Value>),
}

/// Borrowed view of one part record
#[derive(Debug, Clone, Copy)]
pub struct ActionPart<'a> {
    raw: &'a Value,
    command: CommandType,
}

impl<'a> ActionPart<'a> {
    pub fn new(raw: &'a Value) -> Self {
        let command = raw
            .text("commandType")
            .map_or(CommandType::Other, CommandType::from_name);
        Self { raw, command }
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn command(&self) -> CommandType {
        self.command
    }

    pub fn seq(&self) -> f64 {
        self.raw.number_or_zero("_seq")
    }

    pub fn seconds(&self) -> f64 {
        self.raw.number_or_zero("_seconds")
    }

    pub fn delay_time(&self) -> f64 {
        self.raw.number_or_zero("_delayTime")
    }

    pub fn duration(&self) -> f64 {
        self.raw.number_or_zero("_duration")
    }

    /// Follow-up / signal action id
    pub fn action_id(&self) -> Option<u64> {
        self.raw.id_of("_actionId")
    }

    pub fn motion_end(&self) -> bool {
        self.raw.flag("_motionEnd")
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.raw.number(key)
    }

    pub fn number_or_zero(&self, key: &str) -> f64 {
        self.raw.number_or_zero(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.raw.flag(key)
    }

    /// Hit attribute groups in label order; a one-element list is a single
    pub fn hit_groups(&self) -> Vec<HitGroup<'a>> {
        HIT_LABELS
            .iter()
            .filter_map(|label| match self.raw.field(label)? {
                v @ Value::Object(_) => Some(HitGroup::Single(v)),
                Value::Array(items) => {
                    let mut records: Vec<&Value> =
                        items.iter().filter(|v| v.is_object()).collect();
                    match records.len() {
                        0 => None,
                        1 => records.pop().map(HitGroup::Single),
                        _ => Some(HitGroup::List(records)),
                    }
                }
                _ => None,
            })
            .collect()
    }
}

/// Parts of an action record in timeline order
pub fn action_parts(action: &Value) -> Vec<ActionPart<'_>> {
    match action.field("_Parts") {
        Some(Value::Array(parts)) => parts.iter().map(ActionPart::new).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_tags() {
        assert_eq!(CommandType::from_name("HIT_ATTRIBUTE"), CommandType::Hit);
        assert_eq!(
            CommandType::from_name("FIRE_STOCK_BULLET"),
            CommandType::Bullet { stock: true }
        );
        assert_eq!(
            CommandType::from_name("MULTI_BULLET"),
            CommandType::Bullet { stock: false }
        );
        assert_eq!(CommandType::from_name("ACTIVE_CANCEL"), CommandType::ActiveCancel);
        assert_eq!(CommandType::from_name("SOUND"), CommandType::Other);
        assert!(CommandType::from_name("ARRANGE_BULLET").is_hit_like());
    }

    #[test]
    fn test_hit_groups_collapse_single_lists() {
        let part = json!({
            "commandType": "HIT_ATTRIBUTE",
            "_hitLabel": [{"_Id": "A"}],
            "_hitAttrLabel": [{"_Id": "B_LV01"}, {"_Id": "B_LV02"}],
            "_abHitAttrLabel": {"_Id": "C"}
        });
        let groups = ActionPart::new(&part).hit_groups();
        assert_eq!(groups.len(), 3);
        assert!(matches!(groups[0], HitGroup::Single(_)));
        assert!(matches!(&groups[1], HitGroup::List(l) if l.len() == 2));
        assert!(matches!(groups[2], HitGroup::Single(_)));
    }
}
