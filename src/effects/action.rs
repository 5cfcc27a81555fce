//! Effect conversion across a whole action

use serde_json::Value;

use super::attr::AttrEntry;
use super::hitattr::{convert_hitattr, AltFormSink};
use super::ledger::GrantLedger;
use super::pattern::LabelPattern;
use super::repeat::{append_bullet_marker, expand_repetitions};
use crate::timeline::{action_parts, HitGroup};

/// Convert every part of `action` into effect instances.
///
/// With a `pattern`, every matching attribute of a labelled list counts
/// (one list usually holds one attribute per skill level). Without one,
/// only the first attribute of a list that converts to anything counts.
pub fn convert_action_attrs(
    action: &Value,
    pattern: Option<&LabelPattern>,
    sink: &mut dyn AltFormSink,
) -> Vec<AttrEntry> {
    let mut ledger = GrantLedger::new();
    let mut all = Vec::new();

    for part in action_parts(action) {
        let mut entries: Vec<AttrEntry> = Vec::new();
        for group in part.hit_groups() {
            match group {
                HitGroup::Single(hitattr) => {
                    if let Some(attr) = convert_hitattr(hitattr, &part, action, &mut ledger, sink) {
                        entries.push(AttrEntry::Hit(attr));
                    }
                }
                HitGroup::List(hitattrs) => {
                    for hitattr in hitattrs {
                        let label = hitattr.get("_Id").and_then(Value::as_str).unwrap_or("");
                        if pattern.is_some_and(|p| !p.matches(label)) {
                            continue;
                        }
                        if let Some(attr) = convert_hitattr(hitattr, &part, action, &mut ledger, sink) {
                            entries.push(AttrEntry::Hit(attr));
                            if pattern.is_none() {
                                break;
                            }
                        }
                    }
                }
            }
        }
        if entries.is_empty() {
            continue;
        }
        append_bullet_marker(&part, &mut entries, &ledger);
        expand_repetitions(&part, &mut entries, &ledger);
        all.extend(entries);
    }

    all
}
