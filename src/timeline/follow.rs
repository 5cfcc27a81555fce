//! Interrupt and cancel windows
//!
//! A follow-up that becomes available before the first hit interrupts the
//! action; one that becomes available at or after it cancels the recovery.
//! Every interrupt is also a cancel.
//!
//! Interrupt times stay absolute; only cancel times are re-based to startup.

use serde_json::{Map, Value};

use crate::core::{fr, num, CompilerConfig};

/// Follow-up name -> earliest time it becomes available
pub type WindowMap = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowWindows {
    /// Absolute times of follow-ups that cut in before startup
    pub interrupt: WindowMap,
    /// Times relative to startup, clamped at zero
    pub cancel: WindowMap,
}

/// Name of a follow-up action id, if it is one the simulator models
fn follow_up_name(action_id: u64, config: &CompilerConfig) -> Option<&'static str> {
    if config.is_dodge(action_id) {
        Some("dodge")
    } else if action_id % 10 == 5 {
        Some("fs")
    } else {
        None
    }
}

/// Split `followed_by` around `startup`. `defaults` are always available.
pub fn follow_windows(
    startup: f64,
    followed_by: &[(f64, u64)],
    defaults: &[&str],
    config: &CompilerConfig,
) -> FollowWindows {
    let mut interrupt: Vec<(String, f64)> = Vec::new();
    let mut cancel: Vec<(String, f64)> = Vec::new();
    for name in defaults {
        upsert(&mut interrupt, name, 0.0);
        upsert(&mut cancel, name, 0.0);
    }

    for &(at, action_id) in followed_by {
        let Some(name) = follow_up_name(action_id, config) else {
            continue;
        };
        if at < startup {
            upsert(&mut interrupt, name, fr(at));
        } else {
            upsert(&mut cancel, name, at);
        }
    }

    for (name, at) in &interrupt {
        upsert(&mut cancel, name, *at);
    }

    FollowWindows {
        interrupt: interrupt.into_iter().map(|(k, t)| (k, num(t))).collect(),
        cancel: cancel
            .into_iter()
            .map(|(k, t)| (k, num((t - startup).max(0.0))))
            .collect(),
    }
}

fn upsert(entries: &mut Vec<(String, f64)>, name: &str, at: f64) {
    match entries.iter_mut().find(|(k, _)| k == name) {
        Some(entry) => entry.1 = at,
        None => entries.push((name.to_string(), at)),
    }
}
