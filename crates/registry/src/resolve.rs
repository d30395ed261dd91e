//! Write-path graph resolution.
//!
//! Incoming batches may carry object graphs: labels with in-memory parent
//! chains, transactions with embedded actors and labels. Storage only knows
//! name references, so before anything is written the graphs are flattened
//! into deduplicated record sets with every relation collapsed to a name.
//!
//! Deduplication is keyed by name and the first occurrence wins: when the
//! same name shows up twice with different flags or headers in one batch,
//! the later copies are dropped without a merge or a warning.

use std::collections::HashSet;

use crate::actors::{Actor, ActorRef};
use crate::labels::{Label, LabelRef};
use crate::transactions::Transaction;

/// Name-keyed label accumulator. Adding a node also adds its whole ancestor
/// chain, root first, so a parent always precedes its children in the
/// resulting batch.
#[derive(Default)]
struct LabelSet {
    seen: HashSet<String>,
    labels: Vec<Label>,
}

impl LabelSet {
    fn add(&mut self, label: &Label) {
        let mut chain = vec![label];
        let mut node = label.parent_node();
        while let Some(parent) = node {
            chain.push(parent);
            node = parent.parent_node();
        }

        for node in chain.into_iter().rev() {
            if self.seen.insert(node.name.clone()) {
                self.labels.push(node.collapsed());
            }
        }
    }

    fn add_name(&mut self, name: &str) {
        if !name.is_empty() && self.seen.insert(name.to_string()) {
            self.labels.push(Label::new(name, None));
        }
    }
}

/// Flatten a label batch into a deduplicated set ready for upsert: every
/// label of every ancestor chain appears exactly once, each with its parent
/// rewritten as a name-only reference.
pub(crate) fn flatten_labels(labels: &[Label]) -> Vec<Label> {
    let mut set = LabelSet::default();
    for label in labels {
        set.add(label);
    }
    set.labels
}

/// The transitive closure of actors and labels a transaction batch refers
/// to, every one of which must exist before the transactions are written.
pub(crate) struct References {
    pub actors: Vec<Actor>,
    pub labels: Vec<Label>,
}

/// Walk a transaction batch and collect every referenced actor and label:
/// embedded records are captured as-is, bare names synthesize minimal
/// records, detail labels count too, and captured labels bring their whole
/// ancestor chain along. Empty names are skipped.
pub(crate) fn extract_references(transactions: &[Transaction]) -> References {
    let mut seen_actors: HashSet<String> = HashSet::new();
    let mut actors: Vec<Actor> = Vec::new();
    let mut labels = LabelSet::default();

    let mut catch_actor = |actor_ref: &ActorRef| {
        let name = actor_ref.name();
        if name.is_empty() || !seen_actors.insert(name.to_string()) {
            return;
        }
        actors.push(
            actor_ref
                .actor()
                .cloned()
                .unwrap_or_else(|| Actor::new(name)),
        );
    };

    fn catch_label(set: &mut LabelSet, label_ref: &LabelRef) {
        match label_ref {
            LabelRef::Label(label) if !label.name.is_empty() => set.add(label),
            LabelRef::Label(_) => {}
            LabelRef::Name(name) => set.add_name(name),
        }
    }

    for tx in transactions {
        catch_actor(&tx.receiver);
        catch_actor(&tx.sender);
        catch_label(&mut labels, &tx.label);

        for detail in &tx.details {
            catch_label(&mut labels, &detail.label);
        }
    }

    References {
        actors,
        labels: labels.labels,
    }
}
