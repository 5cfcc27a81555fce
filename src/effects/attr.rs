//! Normalized effect instances

use serde::Serialize;
use serde_json::Value;

use crate::core::{fr, Num};

/// One effect instance of an action
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConvertedAttr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmg: Option<Num>,
    /// `[rate bonus, [states]]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer: Option<(Num, Vec<String>)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bufc: Option<Num>,
    /// Flat amount or `[percent, "%", skill?]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utp: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cp: Option<Num>,
    /// Stocked bullet count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispel: Option<Num>,
    /// `[name, rate, dot?, duration?, interval?]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub afflic: Option<Vec<Value>>,
    /// `[rate, dot]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bleed: Option<(Num, Num)>,
    /// A single buff tuple or a list of them, with an optional marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buff: Option<Value>,
    /// Seconds since startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<Num>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msl: Option<u8>,
}

impl ConvertedAttr {
    pub fn is_empty(&self) -> bool {
        *self == ConvertedAttr::default()
    }

    pub fn iv(&self) -> f64 {
        self.iv.map_or(0.0, Num::value)
    }

    pub fn set_iv(&mut self, iv: f64) {
        self.iv = Some(Num::rounded(iv));
    }

    pub fn deals_damage(&self) -> bool {
        self.dmg.is_some()
    }

    /// Whether any once-per-action category is present
    pub fn has_once_per_action(&self) -> bool {
        self.sp.is_some()
            || self.dp.is_some()
            || self.utp.is_some()
            || self.buff.is_some()
            || self.afflic.is_some()
            || self.bleed.is_some()
            || self.extra.is_some()
            || self.dispel.is_some()
    }

    /// Drop `sp, dp, utp, buff, afflic, bleed, extra, dispel`.
    /// Returns whether anything was removed.
    pub fn strip_once_per_action(&mut self) -> bool {
        let had = self.has_once_per_action();
        self.sp = None;
        self.dp = None;
        self.utp = None;
        self.buff = None;
        self.afflic = None;
        self.bleed = None;
        self.extra = None;
        self.dispel = None;
        had
    }

    /// Move `iv` so it is relative to `startup`; a zero offset drops the key
    pub fn rebase(&mut self, startup: f64) {
        if let Some(iv) = self.iv {
            let shifted = fr(iv.value() - startup);
            self.iv = (shifted != 0.0).then_some(Num(shifted));
        }
    }
}

/// An entry of an `attr` list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrEntry {
    Hit(ConvertedAttr),
    /// Repeat marker for the preceding instance
    Count(u32),
}

impl AttrEntry {
    pub fn as_hit(&self) -> Option<&ConvertedAttr> {
        match self {
            AttrEntry::Hit(attr) => Some(attr),
            AttrEntry::Count(_) => None,
        }
    }

    pub fn as_hit_mut(&mut self) -> Option<&mut ConvertedAttr> {
        match self {
            AttrEntry::Hit(attr) => Some(attr),
            AttrEntry::Count(_) => None,
        }
    }
}
