//! Per-entity compilation context
//!
//! Holds everything that used to be shared mutable state while compiling one
//! entity: the skill work-list, processed skills, detected loops, group label
//! counters and the enhanced bursts found along the way. A context is built
//! for one entity and dropped afterwards, so nothing leaks between entities.

use ahash::AHashMap;
use serde_json::Value;
use std::collections::VecDeque;

use crate::core::CompilerConfig;
use crate::effects::AltFormSink;
use crate::records::Fields;

/// A skill waiting to be compiled
#[derive(Debug, Clone)]
pub struct ChainEntry {
    /// Output slot, e.g. `s1`, `s2_enhanced`
    pub label: String,
    /// Skill slot the entry belongs to (1, 2, or 99 for the edit skill)
    pub seq: u32,
    pub skill: Value,
    /// Skill that unlocked this one
    pub prev: Option<u64>,
    /// Enhanced group this entry was allocated under
    pub group: Option<String>,
}

/// A compiled skill as seen by loop resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedSkill {
    pub label: String,
    pub seq: u32,
    pub prev: Option<u64>,
}

/// Insertion-ordered queue keyed by skill id; re-inserting an id replaces
/// its entry in place
#[derive(Debug, Default)]
pub struct WorkList {
    order: VecDeque<u64>,
    entries: AHashMap<u64, ChainEntry>,
}

impl WorkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: u64, entry: ChainEntry) {
        if self.entries.insert(id, entry).is_none() {
            self.order.push_back(id);
        }
    }

    pub fn pop(&mut self) -> Option<(u64, ChainEntry)> {
        while let Some(id) = self.order.pop_front() {
            if let Some(entry) = self.entries.remove(&id) {
                return Some((id, entry));
            }
        }
        None
    }

    pub fn get(&self, id: u64) -> Option<&ChainEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Allocates `base`, `base2`, `base3`, ...
#[derive(Debug, Default)]
pub struct GroupCounter {
    issued: u32,
}

impl GroupCounter {
    pub fn next_label(&mut self, base: &str) -> String {
        self.issued += 1;
        if self.issued == 1 {
            base.to_string()
        } else {
            format!("{}{}", base, self.issued)
        }
    }
}

/// Enhanced burst discovered while compiling skills or abilities
#[derive(Debug, Clone)]
pub struct EnhancedBurst {
    pub group: String,
    pub burst: Value,
}

pub struct CompileContext<'c> {
    pub config: &'c CompilerConfig,
    pub pending: WorkList,
    pub processed: AHashMap<u64, ProcessedSkill>,
    /// Skills whose enhanced form leads back into the chain, in discovery order
    pub loops: Vec<u64>,
    pub skill_groups: GroupCounter,
    pub burst_groups: GroupCounter,
    pub enhanced_bursts: Vec<EnhancedBurst>,
    /// Alt-form buffs granted by passive abilities, keyed by skill slot
    pub alt_buffs: AHashMap<u32, Vec<Value>>,
    /// Slots compiled without a resolvable recovery
    pub missing_endlag: Vec<String>,
}

impl<'c> CompileContext<'c> {
    pub fn new(config: &'c CompilerConfig) -> Self {
        Self {
            config,
            pending: WorkList::new(),
            processed: AHashMap::new(),
            loops: Vec::new(),
            skill_groups: GroupCounter::default(),
            burst_groups: GroupCounter::default(),
            enhanced_bursts: Vec::new(),
            alt_buffs: AHashMap::new(),
            missing_endlag: Vec::new(),
        }
    }

    /// Queue a skill unless it was already compiled
    pub fn enqueue(&mut self, id: u64, entry: ChainEntry) -> bool {
        if self.processed.contains_key(&id) {
            tracing::debug!("Skill {} already compiled, not queued again", id);
            return false;
        }
        self.pending.push(id, entry);
        true
    }

    pub fn mark_loop(&mut self, id: u64) {
        if !self.loops.contains(&id) {
            tracing::debug!("Skill {} transforms back into its own chain", id);
            self.loops.push(id);
        }
    }

    pub fn note_missing_endlag(&mut self, slot: &str) {
        tracing::warn!("Missing endlag for {}", slot);
        self.missing_endlag.push(slot.to_string());
    }

    /// Group of an enhanced burst, allocating one the first time it is seen
    pub fn enhanced_burst_group(&mut self, burst: &Value, base: &str) -> String {
        let id = burst.record_id();
        if let Some(known) = self
            .enhanced_bursts
            .iter()
            .find(|e| id.is_some() && e.burst.record_id() == id)
        {
            return known.group.clone();
        }
        let group = self.burst_groups.next_label(base);
        self.enhanced_bursts.push(EnhancedBurst {
            group: group.clone(),
            burst: burst.clone(),
        });
        group
    }

    /// Sink for enhanced forms found while compiling skill `skill_id`
    pub fn skill_scope(&mut self, skill_id: u64) -> SkillScope<'_, 'c> {
        SkillScope { ctx: self, skill_id }
    }
}

/// Routes enhanced forms discovered in one skill's effects into the context
pub struct SkillScope<'a, 'c> {
    ctx: &'a mut CompileContext<'c>,
    skill_id: u64,
}

impl AltFormSink for SkillScope<'_, '_> {
    fn enhanced_skill(&mut self, slot: u32, skill: &Value) -> Option<String> {
        // a bare id is a reference back into the record graph being compiled
        let Some(id) = skill.is_object().then(|| skill.record_id()).flatten() else {
            self.ctx.mark_loop(self.skill_id);
            return None;
        };
        if self.ctx.processed.contains_key(&id) {
            self.ctx.mark_loop(self.skill_id);
            return None;
        }
        if let Some(pending) = self.ctx.pending.get(id) {
            return pending.group.clone();
        }

        let group = self.ctx.skill_groups.next_label("enhanced");
        tracing::debug!("Skill {} unlocks s{}_{} ({})", self.skill_id, slot, group, id);
        self.ctx.pending.push(
            id,
            ChainEntry {
                label: format!("s{}_{}", slot, group),
                seq: slot,
                skill: skill.clone(),
                prev: Some(self.skill_id),
                group: Some(group.clone()),
            },
        );
        Some(group)
    }

    fn enhanced_burst(&mut self, burst: &Value) -> Option<String> {
        Some(self.ctx.enhanced_burst_group(burst, "enhanced"))
    }
}
