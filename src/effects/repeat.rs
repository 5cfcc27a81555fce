//! Repetition expansion for parts that fire more than once
//!
//! Sources of repetition, first match wins:
//! 1. generator count and delay
//! 2. area duration over hit interval
//! 3. bullet duration over collision interval (plus the first hit)
//! 4. loop flag with loop count, extended by loop seconds
//!
//! Repeated instances never repeat once-per-action grants.

use super::attr::{AttrEntry, ConvertedAttr};
use super::ledger::GrantLedger;
use crate::timeline::ActionPart;

/// Which instances of the part are repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// Every instance the part produced
    All,
    /// The last instance
    Last,
    /// The first instance
    First,
    /// The second instance when there is one (loop bodies)
    Second,
}

/// Detected repetition of one part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repetition {
    /// Total firings, the first one included
    pub firings: u32,
    /// Seconds between firings
    pub delay: f64,
    pub reference: Reference,
}

/// Work out how often a part fires
pub fn detect_repetition(part: &ActionPart<'_>) -> Option<Repetition> {
    if let Some(count) = part.number("_generateNum") {
        return Some(Repetition {
            firings: count as u32,
            delay: part.number_or_zero("_generateDelay"),
            reference: Reference::All,
        });
    }

    let area = part.number_or_zero("_abDuration");
    let area_interval = part.number_or_zero("_abHitInterval");
    if area > area_interval {
        if area_interval <= 0.0 {
            return None;
        }
        return Some(Repetition {
            firings: (area / area_interval).floor() as u32,
            delay: area_interval,
            reference: Reference::Last,
        });
    }

    let bullet = part.number_or_zero("_bulletDuration");
    let collision = part.number_or_zero("_collisionHitInterval");
    if bullet > collision {
        if collision <= 0.0 {
            return None;
        }
        return Some(Repetition {
            firings: (bullet / collision).floor() as u32 + 1,
            delay: collision,
            reference: Reference::First,
        });
    }

    if part.flag("_loopFlag") {
        let loops = part.number_or_zero("_loopNum");
        let delay = part.seconds() + part.number_or_zero("_loopFrame") / 60.0;
        let loops = match part.number("_loopSec") {
            Some(sec) if delay > 0.0 => loops.max((sec / delay).floor()),
            _ => loops,
        };
        return Some(Repetition {
            firings: loops as u32 + 1,
            delay,
            reference: Reference::Second,
        });
    }

    None
}

fn reference_attrs(entries: &[AttrEntry], reference: Reference) -> Vec<ConvertedAttr> {
    let mut hits = entries.iter().filter_map(AttrEntry::as_hit);
    let picked: Vec<&ConvertedAttr> = match reference {
        Reference::All => hits.collect(),
        Reference::Last => hits.last().into_iter().collect(),
        Reference::First => hits.next().into_iter().collect(),
        Reference::Second => {
            let first = entries.first().and_then(AttrEntry::as_hit);
            let second = if entries.len() > 1 {
                entries.get(1).and_then(AttrEntry::as_hit)
            } else {
                None
            };
            second.or(first).into_iter().collect()
        }
    };
    picked.into_iter().cloned().collect()
}

/// Append the instances of every additional firing of `part`
pub fn expand_repetitions(part: &ActionPart<'_>, entries: &mut Vec<AttrEntry>, ledger: &GrantLedger) {
    let Some(rep) = detect_repetition(part) else {
        return;
    };
    if rep.firings == 0 || rep.delay == 0.0 {
        return;
    }

    let refs = reference_attrs(entries, rep.reference);
    let strip = !ledger.is_empty();
    for g in 1..rep.firings {
        for attr in &refs {
            let mut copy = attr.clone();
            if strip {
                copy.strip_once_per_action();
            }
            copy.set_iv(attr.iv() + rep.delay * f64::from(g));
            entries.push(AttrEntry::Hit(copy));
        }
    }
}

/// Multi-bullet parts: mark how many more bullets follow the last instance
pub fn append_bullet_marker(part: &ActionPart<'_>, entries: &mut Vec<AttrEntry>, ledger: &GrantLedger) {
    let Some(bullets) = part.number("_bulletNum").filter(|&n| n > 1.0) else {
        return;
    };
    let Some(AttrEntry::Hit(last)) = entries.last() else {
        return;
    };
    if last.extra.is_some() {
        return;
    }

    let mut copy = last.clone();
    let cleaned = !ledger.is_empty() && copy.strip_once_per_action();
    if cleaned {
        entries.push(AttrEntry::Hit(copy));
    }
    entries.push(AttrEntry::Count(bullets as u32 - 1));
}
