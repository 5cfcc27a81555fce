//! Static id -> name tables for enumerations stored as numbers

use serde_json::Value;

pub fn element_name(id: u64) -> Option<&'static str> {
    Some(match id {
        1 => "Flame",
        2 => "Water",
        3 => "Wind",
        4 => "Light",
        5 => "Shadow",
        99 => "None",
        _ => return None,
    })
}

pub fn weapon_type_name(id: u64) -> Option<&'static str> {
    Some(match id {
        1 => "Sword",
        2 => "Blade",
        3 => "Dagger",
        4 => "Axe",
        5 => "Lance",
        6 => "Bow",
        7 => "Wand",
        8 => "Staff",
        9 => "Gun",
        _ => return None,
    })
}

pub fn affliction_name(id: u64) -> Option<&'static str> {
    Some(match id {
        1 => "Poison",
        2 => "Burn",
        3 => "Freeze",
        4 => "Paralysis",
        5 => "Blind",
        6 => "Stun",
        7 => "Curse",
        8 => "UNKNOWN08",
        9 => "Bog",
        10 => "Sleep",
        11 => "Frostbite",
        12 => "Flashburn",
        13 => "Stormlash",
        14 => "Shadowblight",
        15 => "Scorchrend",
        _ => return None,
    })
}

/// Element named by the lowest set bit of a target-element bitmap
pub fn element_from_bitmap(bitmap: u64) -> Option<&'static str> {
    if bitmap == 0 {
        return None;
    }
    element_name(u64::from(bitmap.trailing_zeros()) + 1)
}

/// Lower-cased name of an enumeration field that may be stored either as a
/// number or as an already resolved string
pub fn enum_label(value: &Value, table: fn(u64) -> Option<&'static str>) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.to_lowercase()),
        Value::Number(n) => {
            let id = n.as_u64()?;
            Some(table(id).map_or_else(|| id.to_string(), str::to_lowercase))
        }
        _ => None,
    }
}
