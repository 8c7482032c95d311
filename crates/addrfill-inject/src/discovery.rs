//! Field discovery.
//!
//! Walks an ordered rule table, then one fallback rule, and reports every
//! matching field it has not reported before. Membership in the processed
//! set is keyed on node identity and never revoked for the life of the page.

use std::collections::HashSet;

use tracing::debug;

use crate::dom::{Document, MutationRecord, NodeId};
use crate::selector::{Selector, SelectorError};
use crate::MARKER_ATTR;

/// Fields matching `field` inside containers matching `container`.
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub container: Selector,
    pub field: Selector,
}

impl MatchRule {
    pub fn parse(container: &str, field: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            container: Selector::parse(container)?,
            field: Selector::parse(field)?,
        })
    }
}

/// Broad field match whose container is inferred: the nearest ancestor
/// matching `containers`, else the field's parent.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    pub field: Selector,
    pub containers: Selector,
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<MatchRule>,
    fallback: FallbackRule,
}

impl RuleSet {
    pub fn new(rules: Vec<MatchRule>, fallback: FallbackRule) -> Self {
        Self { rules, fallback }
    }

    /// Address fields of the supported CRM's property forms.
    pub fn address_fields() -> Result<Self, SelectorError> {
        let rules = vec![
            MatchRule::parse(
                r#"[data-selenium-test="property-input-address"]"#,
                r#"input[type="text"]"#,
            )?,
            MatchRule::parse(r#"[data-test-id="address-input-wrapper"]"#, "input")?,
            MatchRule::parse(
                r#".private-form__control-wrapper[data-field="address"]"#,
                "input",
            )?,
        ];
        let fallback = FallbackRule {
            field: Selector::parse(r#"input[data-selenium-test^="property-input-address"]"#)?,
            containers: Selector::parse(".form-group, [data-field]")?,
        };
        Ok(Self::new(rules, fallback))
    }

    /// Every selector the rules mention.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.rules
            .iter()
            .flat_map(|r| [&r.container, &r.field])
            .chain([&self.fallback.field, &self.fallback.containers])
    }
}

/// A field found by a scan, with the host container that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub container: NodeId,
    pub input: NodeId,
}

pub struct FieldDiscovery {
    rules: RuleSet,
    processed: HashSet<NodeId>,
}

impl FieldDiscovery {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            processed: HashSet::new(),
        }
    }

    /// Fields not reported by any earlier scan.
    pub fn scan(&mut self, doc: &dyn Document) -> Vec<FieldMatch> {
        let root = doc.root();
        let mut found = Vec::new();

        for rule in &self.rules.rules {
            for container in rule.container.query_all(doc, root) {
                for input in rule.field.query_all(doc, container) {
                    Self::consider(&mut self.processed, &mut found, doc, container, input);
                }
            }
        }

        let fallback = &self.rules.fallback;
        for input in fallback.field.query_all(doc, root) {
            let parent = doc.parent(input).unwrap_or(root);
            let container = fallback.containers.closest(doc, parent).unwrap_or(parent);
            Self::consider(&mut self.processed, &mut found, doc, container, input);
        }

        if !found.is_empty() {
            debug!(count = found.len(), "Discovered address fields");
        }
        found
    }

    fn consider(
        processed: &mut HashSet<NodeId>,
        found: &mut Vec<FieldMatch>,
        doc: &dyn Document,
        container: NodeId,
        input: NodeId,
    ) {
        if is_ours(doc, input) || !processed.insert(input) {
            return;
        }
        found.push(FieldMatch { container, input });
    }

    /// Whether a mutation batch warrants a rescan: some added node, not one
    /// of ours and not already processed, matches a rule selector or
    /// contains something that does.
    pub fn is_relevant(&self, doc: &dyn Document, records: &[MutationRecord]) -> bool {
        records
            .iter()
            .flat_map(|r| r.added.iter().copied())
            .filter(|node| !is_ours(doc, *node) && !self.processed.contains(node))
            .any(|node| self.rules.selectors().any(|s| s.matches_within(doc, node)))
    }

    pub fn is_processed(&self, node: NodeId) -> bool {
        self.processed.contains(&node)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

fn is_ours(doc: &dyn Document, node: NodeId) -> bool {
    doc.attribute(node, MARKER_ATTR).is_some()
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
