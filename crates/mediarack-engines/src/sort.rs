//! Engine ordering
//!
//! Builds the total order in which the ingestion pipeline attempts the
//! enabled engine instances. Class-level `try_before`/`try_after` hints form
//! a partial order over engine types; a Kahn-style topological sort emits
//! one "round" of unconstrained classes at a time, with the round's
//! instances sorted by ascending instance id so the attempt order is
//! reproducible for a given configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::StorageError;
use crate::traits::StorageEngine;

/// Order the given engine instances for the ingestion pipeline.
///
/// Fails with a configuration error when the hints between the present
/// classes form a cycle; engines are never silently dropped.
pub fn sort_engines(
    engines: Vec<Arc<dyn StorageEngine>>,
) -> Result<Vec<Arc<dyn StorageEngine>>, StorageError> {
    let mut engines = engines;
    // Ascending id within each round; instances of the same class always
    // come out in the same sequence across runs.
    engines.sort_by_key(|e| e.instance_id());

    let mut classes = BTreeMap::new();
    for engine in &engines {
        classes.insert(engine.class().engine_type, engine.class());
    }

    // predecessors[t] = engine types that must be attempted before t.
    // Hints naming absent classes are ignored.
    let mut predecessors: BTreeMap<&'static str, BTreeSet<&'static str>> =
        classes.keys().map(|t| (*t, BTreeSet::new())).collect();
    for class in classes.values() {
        for later in class.try_before {
            if classes.contains_key(later) {
                if let Some(preds) = predecessors.get_mut(later) {
                    preds.insert(class.engine_type);
                }
            }
        }
        for earlier in class.try_after {
            if classes.contains_key(earlier) {
                if let Some(preds) = predecessors.get_mut(class.engine_type) {
                    preds.insert(earlier);
                }
            }
        }
    }

    let mut remaining: BTreeSet<&'static str> = classes.keys().copied().collect();
    let mut ordered = Vec::with_capacity(engines.len());

    while !remaining.is_empty() {
        let ready: Vec<&'static str> = remaining
            .iter()
            .copied()
            .filter(|t| {
                predecessors
                    .get(t)
                    .map(|preds| preds.iter().all(|p| !remaining.contains(p)))
                    .unwrap_or(true)
            })
            .collect();

        if ready.is_empty() {
            let names: Vec<&str> = remaining.iter().copied().collect();
            return Err(StorageError::Config(format!(
                "storage engine ordering contains a cycle involving: {}",
                names.join(", ")
            )));
        }

        for engine in &engines {
            if ready.contains(&engine.class().engine_type) {
                ordered.push(engine.clone());
            }
        }
        for t in ready {
            remaining.remove(t);
        }
    }

    Ok(ordered)
}
