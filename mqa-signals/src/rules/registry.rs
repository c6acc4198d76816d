//! Ordered rule registry with a static default instance

use super::builtin::builtin_rules;
use super::{ConsistencyRule, RuleInfo};
use crate::error::{SignalError, SignalResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Minimum normalized Levenshtein similarity for a "did you mean" suggestion
pub const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Canonical registry, built once and never mutated
pub static CONSISTENCY_RULES: Lazy<RuleRegistry> = Lazy::new(RuleRegistry::builtin);

/// Metadata for every rule in the canonical registry
pub fn get_available_rules() -> Vec<RuleInfo> {
    CONSISTENCY_RULES.available_rules()
}

/// Look up a rule in the canonical registry
pub fn get_rule(id: &str) -> Option<&'static dyn ConsistencyRule> {
    CONSISTENCY_RULES.get(id)
}

/// Ordered set of consistency rules with unique ids
///
/// Extension happens while the registry is owned; once shared behind a
/// reference it is read-only.
pub struct RuleRegistry {
    rules: Vec<Box<dyn ConsistencyRule>>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry holding the built-in rules in evaluation order
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for rule in builtin_rules() {
            let id = rule.id.to_string();
            registry.index.insert(id, registry.rules.len());
            registry.rules.push(Box::new(rule));
        }
        registry
    }

    /// Append a rule, rejecting duplicate ids
    pub fn register(&mut self, rule: Box<dyn ConsistencyRule>) -> SignalResult<()> {
        let id = rule.id().to_string();
        if self.index.contains_key(&id) {
            return Err(SignalError::DuplicateRule(id));
        }
        self.index.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Builder-style `register`
    pub fn with_rule(mut self, rule: impl ConsistencyRule + 'static) -> SignalResult<Self> {
        self.register(Box::new(rule))?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&dyn ConsistencyRule> {
        self.index.get(id).map(|&i| self.rules[i].as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ConsistencyRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn available_rules(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(|r| r.info()).collect()
    }

    /// Closest registered id to an unknown one
    ///
    /// Case-insensitive normalized Levenshtein; `None` below [`SUGGESTION_THRESHOLD`].
    pub fn suggest(&self, unknown: &str) -> Option<String> {
        let needle = unknown.to_ascii_uppercase();
        self.rules
            .iter()
            .map(|r| (r.id(), strsim::normalized_levenshtein(&needle, r.id())))
            .filter(|(_, similarity)| *similarity >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id.to_string())
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.ids())
            .finish()
    }
}
