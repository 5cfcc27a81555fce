//! Startup and recovery resolution
//!
//! Recovery has several competing sources in the data. In priority order:
//! 1. dragon actions with a motion-end cancel use that cancel
//! 2. dragon actions with an unnormalized time curve use the last positive
//!    cancel by descending `_seq`
//! 3. cancels answering a signal this action sent (latest one wins)
//! 4. the last cancel in the list, when 3 found nothing or found one at or
//!    before startup
//!
//! A timestop extends recovery to the end of the stop. A recovery that still
//! lands before startup is left unresolved.

use ahash::AHashSet;
use serde_json::Value;

use super::part::{ActionPart, CommandType};
use crate::core::fr;

/// Motion states of the generic buff animations, which all last one second
pub const GENERIC_BUFF_MOTIONS: [&str; 5] =
    ["skill_A", "skill_B", "skill_C", "skill_D", "skill_006_01"];

/// Resolved timing of one part list (absolute seconds)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timing {
    /// First hit or bullet; `None` means the action never connects
    pub startup: Option<f64>,
    /// `None` is "missing endlag"
    pub recovery: Option<f64>,
    /// `(time, action id)` of every cancel that names a follow-up action
    pub followed_by: Vec<(f64, u64)>,
}

#[derive(Debug, Clone, Default)]
pub struct TimingOptions {
    /// Correlate cancels with the signals this action sends
    pub correlate_signals: bool,
    pub is_dragon: bool,
    /// Signal ids whose cancel counts as motion end; `None` matches cancels
    /// without a target action
    pub signal_end: AHashSet<Option<u64>>,
}

impl TimingOptions {
    /// Normal attack hit: cancels answer this action's own signals
    pub fn combo() -> Self {
        Self {
            correlate_signals: true,
            ..Self::default()
        }
    }

    /// Dragon combo hit
    pub fn dragon_combo() -> Self {
        Self {
            correlate_signals: true,
            is_dragon: true,
            ..Self::default()
        }
    }

    /// Dragon dodge / shift: any untargeted cancel ends the motion
    pub fn dragon_motion() -> Self {
        let mut signal_end = AHashSet::new();
        signal_end.insert(None);
        Self {
            correlate_signals: false,
            is_dragon: true,
            signal_end,
        }
    }
}

/// Compute startup, recovery and follow-up candidates for one part list
pub fn resolve_timing(parts: &[ActionPart<'_>], options: &TimingOptions) -> Timing {
    let mut startup: Option<f64> = None;
    let mut timestop = 0.0;
    let mut timecurve: Option<f64> = None;
    let mut followed_by: Vec<(f64, u64)> = Vec::new();
    // insertion ordered (signal id, cancel time); -1 until answered
    let mut signals: Vec<(u64, f64)> = Vec::new();
    let mut signal_end = options.signal_end.clone();
    let mut motion_end: Option<f64> = None;

    for part in parts {
        match part.command() {
            CommandType::SendSignal => {
                let id = part.action_id().unwrap_or(0);
                match signals.iter_mut().find(|(sid, _)| *sid == id) {
                    Some(entry) => entry.1 = -1.0,
                    None => signals.push((id, -1.0)),
                }
                if part.motion_end() {
                    signal_end.insert(Some(id));
                }
            }
            cmd if cmd.is_hit_like() && startup.is_none() => {
                startup = Some(fr(part.seconds()));
            }
            CommandType::ActiveCancel => {
                let at = part.seconds();
                let target = part.action_id();
                if options.correlate_signals {
                    if let Some(id) = target {
                        if let Some(entry) = signals.iter_mut().find(|(sid, _)| *sid == id) {
                            entry.1 = at;
                        }
                    }
                }
                if (target.is_some() && part.motion_end()) || signal_end.contains(&target) {
                    motion_end = Some(at);
                }
                if let Some(id) = target {
                    if !followed_by.contains(&(at, id)) {
                        followed_by.push((at, id));
                    }
                }
            }
            CommandType::Timestop => {
                timestop = part.seconds() + part.duration();
            }
            CommandType::Timecurve if options.is_dragon && !part.flag("_isNormalizeCurve") => {
                timecurve = Some(part.duration());
            }
            _ => {}
        }
    }

    let recovery = match motion_end {
        Some(end) if options.is_dragon => Some(end),
        _ => {
            let found = if timecurve.is_some() {
                last_positive_cancel_by_seq(parts)
            } else {
                let signalled = signals
                    .iter()
                    .filter(|(id, _)| !signal_end.contains(&Some(*id)))
                    .map(|&(_, t)| t)
                    .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))));
                match signalled {
                    Some(r) if r >= 0.0 && !startup.is_some_and(|s| r <= s) => Some(r),
                    _ => last_cancel(parts),
                }
            };
            found.or(motion_end).map(|r| r.max(timestop))
        }
    };

    // a recovery ending before the first hit is bad data, not a negative endlag
    let recovery = recovery
        .map(fr)
        .filter(|&r| startup.map_or(true, |s| r >= s));
    Timing {
        startup,
        recovery,
        followed_by,
    }
}

fn last_positive_cancel_by_seq(parts: &[ActionPart<'_>]) -> Option<f64> {
    let mut ordered: Vec<&ActionPart<'_>> = parts.iter().collect();
    ordered.sort_by(|a, b| b.seq().total_cmp(&a.seq()));
    ordered
        .into_iter()
        .find(|p| p.command() == CommandType::ActiveCancel && p.seconds() > 0.0)
        .map(|p| p.seconds())
}

fn last_cancel(parts: &[ActionPart<'_>]) -> Option<f64> {
    parts
        .iter()
        .rev()
        .find(|p| p.command() == CommandType::ActiveCancel)
        .map(|p| p.seconds())
}

/// Recovery of a skill action (startup is fixed for skills)
///
/// The first untargeted cancel wins, clamped by any timestop; otherwise the
/// first motion's animation length. `None` means missing endlag.
pub fn resolve_skill_recovery(parts: &[ActionPart<'_>]) -> Option<f64> {
    let mut cancel: Option<f64> = None;
    let mut motion: Option<f64> = None;
    let mut timestop = 0.0;

    for part in parts {
        if part.command() == CommandType::ActiveCancel
            && part.action_id().is_none()
            && cancel.is_none()
        {
            cancel = Some(part.seconds());
        }
        if part.command() == CommandType::PartsMotion && motion.is_none() {
            motion = animation_duration(part.raw());
            let state = part.raw().get("_motionState").and_then(Value::as_str);
            if state.is_some_and(|s| GENERIC_BUFF_MOTIONS.contains(&s)) {
                motion = Some(1.0);
            }
        }
        if part.command() == CommandType::Timestop {
            timestop = part.seconds() + part.duration();
        }
        if is_truthy(cancel) && is_truthy(motion) {
            break;
        }
    }

    let cancel = cancel.filter(|&c| c != 0.0).map(|c| c.max(timestop));
    cancel
        .or(motion.filter(|&m| m != 0.0))
        .map(fr)
}

fn is_truthy(v: Option<f64>) -> bool {
    v.is_some_and(|x| x != 0.0)
}

fn animation_duration(part: &Value) -> Option<f64> {
    let duration = |a: &Value| a.get("duration").and_then(Value::as_f64).unwrap_or(0.0);
    match part.get("_animation")? {
        Value::Array(clips) => Some(clips.iter().map(duration).sum()),
        clip @ Value::Object(_) => Some(duration(clip)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::part::action_parts;
    use serde_json::json;

    fn timing_of(parts: Value, options: &TimingOptions) -> Timing {
        let action = json!({ "_Parts": parts });
        resolve_timing(&action_parts(&action), options)
    }

    #[test]
    fn test_hit_then_cancel() {
        let t = timing_of(
            json!([
                {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.2},
                {"commandType": "ACTIVE_CANCEL", "_seconds": 1.0}
            ]),
            &TimingOptions::combo(),
        );
        assert_eq!(t.startup, Some(0.2));
        assert_eq!(t.recovery, Some(1.0));
        assert!(t.followed_by.is_empty());
    }

    #[test]
    fn test_signal_correlated_cancel_wins_over_last_cancel() {
        let t = timing_of(
            json!([
                {"_seq": 0, "commandType": "SEND_SIGNAL", "_actionId": 100010},
                {"_seq": 1, "commandType": "HIT_ATTRIBUTE", "_seconds": 0.1},
                {"_seq": 2, "commandType": "ACTIVE_CANCEL", "_seconds": 0.6, "_actionId": 100010},
                {"_seq": 3, "commandType": "ACTIVE_CANCEL", "_seconds": 0.9}
            ]),
            &TimingOptions::combo(),
        );
        assert_eq!(t.recovery, Some(0.6));
        assert_eq!(t.followed_by, vec![(0.6, 100010)]);
    }

    #[test]
    fn test_signal_before_startup_falls_back() {
        let t = timing_of(
            json!([
                {"commandType": "SEND_SIGNAL", "_actionId": 7},
                {"commandType": "ACTIVE_CANCEL", "_seconds": 0.05, "_actionId": 7},
                {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.3},
                {"commandType": "ACTIVE_CANCEL", "_seconds": 0.8}
            ]),
            &TimingOptions::combo(),
        );
        assert_eq!(t.recovery, Some(0.8));
    }

    #[test]
    fn test_timestop_extends_recovery() {
        let t = timing_of(
            json!([
                {"commandType": "BULLET", "_seconds": 0.5},
                {"commandType": "TIMESTOP", "_seconds": 0.5, "_duration": 1.0},
                {"commandType": "ACTIVE_CANCEL", "_seconds": 1.2}
            ]),
            &TimingOptions::combo(),
        );
        assert_eq!(t.startup, Some(0.5));
        assert_eq!(t.recovery, Some(1.5));
    }

    #[test]
    fn test_dragon_motion_end() {
        let t = timing_of(
            json!([
                {"commandType": "ACTIVE_CANCEL", "_seconds": 0.4},
                {"commandType": "ACTIVE_CANCEL", "_seconds": 0.9, "_actionId": 6}
            ]),
            &TimingOptions::dragon_motion(),
        );
        assert_eq!(t.startup, None);
        assert_eq!(t.recovery, Some(0.4));
    }

    #[test]
    fn test_dragon_timecurve_uses_last_positive_cancel_by_seq() {
        let t = timing_of(
            json!([
                {"_seq": 0, "commandType": "HIT_ATTRIBUTE", "_seconds": 0.3},
                {"_seq": 3, "commandType": "ACTIVE_CANCEL", "_seconds": 1.4},
                {"_seq": 1, "commandType": "TIMECURVE", "_duration": 0.5},
                {"_seq": 2, "commandType": "ACTIVE_CANCEL", "_seconds": 2.0}
            ]),
            &TimingOptions::dragon_combo(),
        );
        assert_eq!(t.recovery, Some(1.4));
    }

    #[test]
    fn test_cancel_before_first_hit_leaves_recovery_unresolved() {
        let t = timing_of(
            json!([
                {"commandType": "ACTIVE_CANCEL", "_seconds": 0.2},
                {"commandType": "HIT_ATTRIBUTE", "_seconds": 0.5}
            ]),
            &TimingOptions::combo(),
        );
        assert_eq!(t.startup, Some(0.5));
        assert_eq!(t.recovery, None);
    }

    #[test]
    fn test_no_cancel_leaves_recovery_unresolved() {
        let t = timing_of(
            json!([{"commandType": "HIT_ATTRIBUTE", "_seconds": 0.3}]),
            &TimingOptions::combo(),
        );
        assert_eq!(t.startup, Some(0.3));
        assert_eq!(t.recovery, None);
    }

    #[test]
    fn test_skill_recovery_prefers_untargeted_cancel() {
        let action = json!({"_Parts": [
            {"commandType": "PARTS_MOTION", "_animation": {"duration": 2.5}},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.5, "_actionId": 6},
            {"commandType": "ACTIVE_CANCEL", "_seconds": 1.8},
            {"commandType": "TIMESTOP", "_seconds": 1.0, "_duration": 1.0}
        ]});
        assert_eq!(resolve_skill_recovery(&action_parts(&action)), Some(1.8));
    }

    #[test]
    fn test_skill_recovery_from_motion() {
        let action = json!({"_Parts": [
            {"commandType": "PARTS_MOTION", "_animation": [{"duration": 1.0}, {"duration": 0.5}]}
        ]});
        assert_eq!(resolve_skill_recovery(&action_parts(&action)), Some(1.5));

        let buff = json!({"_Parts": [
            {"commandType": "PARTS_MOTION", "_motionState": "skill_A", "_animation": {"duration": 3.0}}
        ]});
        assert_eq!(resolve_skill_recovery(&action_parts(&buff)), Some(1.0));

        let empty = json!({"_Parts": []});
        assert_eq!(resolve_skill_recovery(&action_parts(&empty)), None);
    }
}
