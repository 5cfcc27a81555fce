//! Flattening of self-referential skill transformations into phases

use ahash::AHashMap;

use super::context::ProcessedSkill;
use super::SlotMap;

/// Skills of the loop ending at `loop_id`, first phase first.
///
/// Walks predecessor links back from `loop_id` until a null predecessor or
/// another loop member.
pub fn loop_phases<'p>(
    processed: &'p AHashMap<u64, ProcessedSkill>,
    loops: &[u64],
    loop_id: u64,
) -> Vec<(u64, &'p ProcessedSkill)> {
    let Some(last) = processed.get(&loop_id) else {
        return Vec::new();
    };
    let mut sequence = vec![(loop_id, last)];
    let mut prev = last.prev;
    while let Some(id) = prev {
        if loops.contains(&id) || sequence.iter().any(|(seen, _)| *seen == id) {
            break;
        }
        let Some(skill) = processed.get(&id) else {
            break;
        };
        sequence.push((id, skill));
        prev = skill.prev;
    }
    sequence.reverse();
    sequence
}

/// Relabel every loop's slots as `s{seq}_phase{p}`
pub fn flatten_loops(
    processed: &AHashMap<u64, ProcessedSkill>,
    loops: &[u64],
    slots: &mut SlotMap,
) {
    for &loop_id in loops {
        let phases = loop_phases(processed, loops, loop_id);
        let mut moved = Vec::with_capacity(phases.len());
        for (p, (_, skill)) in phases.iter().enumerate() {
            if let Some(conf) = slots.remove(&skill.label) {
                moved.push((format!("s{}_phase{}", skill.seq, p + 1), conf));
            }
        }
        tracing::debug!(
            "Loop ending at {} flattened into {:?}",
            loop_id,
            moved.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()
        );
        for (phase, conf) in moved {
            slots.insert(phase, conf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skill(label: &str, seq: u32, prev: Option<u64>) -> ProcessedSkill {
        ProcessedSkill {
            label: label.to_string(),
            seq,
            prev,
        }
    }

    #[test]
    fn test_two_phase_loop() {
        let mut processed = AHashMap::new();
        processed.insert(10, skill("s1", 1, None));
        processed.insert(11, skill("s1_enhanced", 1, Some(10)));
        processed.insert(20, skill("s2", 2, None));

        let mut slots = SlotMap::new();
        slots.insert("s1".into(), json!({"sp": 1}));
        slots.insert("s2".into(), json!({"sp": 2}));
        slots.insert("s1_enhanced".into(), json!({"sp": 3}));

        flatten_loops(&processed, &[11], &mut slots);

        assert_eq!(slots.get("s1_phase1"), Some(&json!({"sp": 1})));
        assert_eq!(slots.get("s1_phase2"), Some(&json!({"sp": 3})));
        assert!(slots.get("s1").is_none());
        assert!(slots.get("s1_enhanced").is_none());
        assert_eq!(slots.get("s2"), Some(&json!({"sp": 2})));
    }

    #[test]
    fn test_swapped_phase_labels_do_not_clobber() {
        let mut processed = AHashMap::new();
        processed.insert(1, skill("s1_phase2", 1, None));
        processed.insert(2, skill("s1_phase1", 1, Some(1)));

        let mut slots = SlotMap::new();
        slots.insert("s1_phase2".into(), json!("a"));
        slots.insert("s1_phase1".into(), json!("b"));

        flatten_loops(&processed, &[2], &mut slots);
        assert_eq!(slots.get("s1_phase1"), Some(&json!("a")));
        assert_eq!(slots.get("s1_phase2"), Some(&json!("b")));
    }

    #[test]
    fn test_walk_stops_at_cycles() {
        let mut processed = AHashMap::new();
        processed.insert(1, skill("s1", 1, Some(2)));
        processed.insert(2, skill("s1_enhanced", 1, Some(1)));
        let phases = loop_phases(&processed, &[2], 2);
        let ids: Vec<u64> = phases.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
