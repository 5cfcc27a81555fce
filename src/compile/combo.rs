//! Normal attack combo hits

use serde_json::Value;

use super::SkillTimingConfig;
use crate::core::{fr, CompilerConfig, ExportError, Num, Result};
use crate::effects::hitattr::NoAltForms;
use crate::effects::{convert_action_attrs, AttrEntry, LabelPattern};
use crate::records::record_name;
use crate::timeline::{action_parts, follow_windows, resolve_timing, TimingOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct ComboOptions<'p> {
    /// Restrict hit attributes to matching labels
    pub pattern: Option<&'p LabelPattern>,
    /// Emit interrupt / cancel windows
    pub follow_windows: bool,
    pub is_dragon: bool,
}

impl<'p> ComboOptions<'p> {
    pub fn adventurer() -> Self {
        Self {
            pattern: None,
            follow_windows: true,
            is_dragon: false,
        }
    }

    pub fn dragon() -> Self {
        Self {
            pattern: None,
            follow_windows: false,
            is_dragon: true,
        }
    }

    pub fn with_pattern(mut self, pattern: Option<&'p LabelPattern>) -> Self {
        self.pattern = pattern;
        self
    }
}

/// Attach effect instances and move every time to be relative to `startup`
pub fn attach_attrs(conf: &mut SkillTimingConfig, startup: f64, mut attrs: Vec<AttrEntry>) {
    conf.recovery = conf.recovery.map(|r| Num(fr(r.value() - startup)));
    for attr in attrs.iter_mut().filter_map(AttrEntry::as_hit_mut) {
        attr.rebase(startup);
    }
    conf.attr = attrs;
}

/// Compile one combo hit. An action without any hit is malformed data.
pub fn compile_combo(
    action: &Value,
    options: ComboOptions<'_>,
    config: &CompilerConfig,
) -> Result<SkillTimingConfig> {
    let parts = action_parts(action);
    let timing_options = if options.is_dragon {
        TimingOptions::dragon_combo()
    } else {
        TimingOptions::combo()
    };
    let timing = resolve_timing(&parts, &timing_options);
    let startup = timing
        .startup
        .ok_or_else(|| ExportError::MissingStartup(record_name(action)))?;

    let mut conf = SkillTimingConfig {
        startup: Some(Num(startup)),
        recovery: timing.recovery.map(Num),
        ..Default::default()
    };
    let attrs = convert_action_attrs(action, options.pattern, &mut NoAltForms);
    attach_attrs(&mut conf, startup, attrs);

    if options.follow_windows {
        let windows = follow_windows(startup, &timing.followed_by, &["s"], config);
        conf.interrupt = Some(windows.interrupt);
        conf.cancel = Some(windows.cancel);
    }
    Ok(conf)
}
