//! Hit label patterns used to select one skill level or charge level

use regex::Regex;

use crate::core::Result;

/// A regex matched from the start of a hit attribute `_Id`
#[derive(Debug, Clone)]
pub struct LabelPattern(Regex);

impl LabelPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self(Regex::new(&format!("^(?:{})", pattern))?))
    }

    /// Level `lv` hit labels, e.g. `BOW_110_04_H01_LV03`
    pub fn skill_level(lv: u32) -> Result<Self> {
        Self::new(&format!(".*LV0{}$", lv))
    }

    /// Level 2 burst hits of any charge
    pub fn burst() -> Result<Self> {
        Self::new(r".*_LV02$")
    }

    /// Level 2 burst hits numbered `H0n`
    pub fn burst_hits() -> Result<Self> {
        Self::new(r".*H0\d_LV02$")
    }

    /// Level 2 burst hits of charge level `clv` (2-based)
    pub fn charge_level(clv: usize) -> Result<Self> {
        Self::new(&format!(".*_LV02_CHLV0{}$", clv))
    }

    pub fn matches(&self, label: &str) -> bool {
        self.0.is_match(label)
    }
}
