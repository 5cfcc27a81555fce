//! Compiler configuration with documented constants
//!
//! Values that are facts about the source data (and not derivable from it)
//! are collected here. Defaults match the current game data; a TOML file can
//! override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ExportError, Result};

/// Configuration for one export run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    // === CHAIN RESOLUTION ===
    /// Characters whose skill chains are never flattened into phases
    ///
    /// Their transformation data points back at an earlier skill without
    /// actually cycling in game, so loop detection gives wrong phases.
    pub loop_exclusions: Vec<u64>,

    // === FOLLOW-UP WINDOWS ===
    /// Action ids that are dodges when they appear as a cancel target
    pub dodge_actions: Vec<u64>,

    // === SKILL LEVELS ===
    /// Level used for s1/s2 (and the edit skill by `_EditSkillLevelNum`)
    pub skill_levels: SkillLevels,

    // === TIMING ===
    /// Startup assigned to every skill; skills have no meaningful first hit
    pub skill_startup: f64,

    /// Charge time used when a burst marker omits `_chargeSec`
    pub default_charge_sec: f64,

    /// Extra charge added to a charge-cancel duration
    pub charge_cancel_padding: f64,

    /// Dragon common action recoveries that are not worth emitting
    pub dragon_defaults: DragonDefaults,

    // === BATCH SELECTION ===
    /// Dragons exported even though they are not regular summons
    pub extra_dragons: Vec<u64>,
}

/// Skill level per skill slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillLevels {
    /// `[s1, s2]` levels before mana spiral
    pub normal: [u32; 2],
    /// `[s1, s2]` levels after mana spiral
    pub spiral: [u32; 2],
}

impl Default for SkillLevels {
    fn default() -> Self {
        Self {
            normal: [3, 2],
            spiral: [4, 3],
        }
    }
}

impl SkillLevels {
    /// Level for skill slot `seq` (1 or 2)
    pub fn level(&self, spiral: bool, seq: u32) -> Option<u32> {
        let table = if spiral { &self.spiral } else { &self.normal };
        let idx = usize::try_from(seq).ok()?.checked_sub(1)?;
        table.get(idx).copied()
    }
}

/// Recovery defaults for dragon dodge / backdash / shift
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DragonDefaults {
    pub dodge: f64,
    pub dodgeb: f64,
    pub dshift: f64,
}

impl Default for DragonDefaults {
    fn default() -> Self {
        Self {
            dodge: 0.66667,
            dodgeb: 0.66667,
            dshift: 0.69444,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            loop_exclusions: vec![
                10350302, // summer norwin
                10650101, // gala sarisse
            ],
            dodge_actions: vec![6, 40],
            skill_levels: SkillLevels::default(),
            skill_startup: 0.1,
            default_charge_sec: 0.5,
            charge_cancel_padding: 0.1,
            dragon_defaults: DragonDefaults::default(),
            extra_dragons: vec![20050102, 20050202, 20050302, 20050402, 20050502, 20050507],
        }
    }
}

impl CompilerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: CompilerConfig = toml::from_str(&contents)
            .map_err(|e| ExportError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
        config.validate().map_err(ExportError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.skill_startup < 0.0 {
            return Err(format!(
                "skill_startup ({}) must not be negative",
                self.skill_startup
            ));
        }

        if self.default_charge_sec <= 0.0 {
            return Err("default_charge_sec must be positive".into());
        }

        let levels = self
            .skill_levels
            .normal
            .iter()
            .chain(self.skill_levels.spiral.iter());
        for lv in levels {
            if !(1..=9).contains(lv) {
                return Err(format!("skill level {} is outside 1..=9", lv));
            }
        }

        Ok(())
    }

    pub fn is_dodge(&self, action_id: u64) -> bool {
        self.dodge_actions.contains(&action_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CompilerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CompilerConfig = toml::from_str("loop_exclusions = [1, 2]").unwrap();
        assert_eq!(config.loop_exclusions, vec![1, 2]);
        assert_eq!(config.dodge_actions, vec![6, 40]);
        assert_eq!(config.skill_levels.level(true, 1), Some(4));
    }

    #[test]
    fn test_skill_level_lookup() {
        let levels = SkillLevels::default();
        assert_eq!(levels.level(false, 1), Some(3));
        assert_eq!(levels.level(false, 2), Some(2));
        assert_eq!(levels.level(false, 3), None);
        assert_eq!(levels.level(false, 0), None);
    }

    #[test]
    fn test_invalid_skill_level_rejected() {
        let mut config = CompilerConfig::default();
        config.skill_levels.normal = [0, 2];
        assert!(config.validate().is_err());
    }
}
