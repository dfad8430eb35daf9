//! In-memory collaborators shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::app::sync::lock;
use crate::app::{PulseError, Result};
use crate::domain::SavedRelation;
use crate::remote::{MutationService, Query, RemoteService};

/// Tables and procedures backed by JSON rows.
///
/// A gate registered under a filter value (a slug, say) or a collection name
/// parks the next query carrying it until the gate is notified.
#[derive(Default)]
pub(crate) struct FakeService {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    procedures: Mutex<HashMap<String, Vec<Value>>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub queries: Mutex<Vec<Query>>,
}

impl FakeService {
    pub fn with_table(self, name: &str, rows: Vec<Value>) -> Self {
        lock(&self.tables).insert(name.to_string(), rows);
        self
    }

    pub fn with_procedure(self, name: &str, rows: Vec<Value>) -> Self {
        lock(&self.procedures).insert(name.to_string(), rows);
        self
    }

    pub fn fail(&self, name: &str) {
        lock(&self.failing).insert(name.to_string());
    }

    pub fn gate(&self, filter_value: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        lock(&self.gates).insert(filter_value.to_string(), gate.clone());
        gate
    }

    pub fn query_count(&self, collection: &str) -> usize {
        lock(&self.queries)
            .iter()
            .filter(|q| q.collection == collection)
            .count()
    }

    fn is_failing(&self, name: &str) -> bool {
        lock(&self.failing).contains(name)
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RemoteService for FakeService {
    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        lock(&self.queries).push(query.clone());

        let gate = {
            let mut gates = lock(&self.gates);
            let key = query
                .filters
                .iter()
                .map(|f| f.value.clone())
                .chain(std::iter::once(query.collection.clone()))
                .find(|key| gates.contains_key(key));
            key.and_then(|key| gates.remove(&key))
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.is_failing(&query.collection) {
            return Err(PulseError::remote(503, format!("{} unavailable", query.collection)));
        }

        let rows: Vec<Value> = lock(&self.tables)
            .get(&query.collection)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| {
                query.filters.iter().all(|f| {
                    row.get(&f.field)
                        .map(|v| cell_text(v) == f.value)
                        .unwrap_or(false)
                })
            })
            .collect();

        let rows = match query.page {
            Some(page) => rows
                .into_iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .collect(),
            None => rows,
        };

        if query.single && rows.len() != 1 {
            return Err(PulseError::remote(406, format!("{} rows for single", rows.len())));
        }
        Ok(rows)
    }

    async fn call(&self, procedure: &str, _args: &Value) -> Result<Vec<Value>> {
        if self.is_failing(procedure) {
            return Err(PulseError::remote(500, format!("{} failed", procedure)));
        }
        Ok(lock(&self.procedures)
            .get(procedure)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory relation table with switchable failure and an optional gate
/// that parks the next write until released.
#[derive(Default)]
pub(crate) struct FakeMutations {
    pub relations: Mutex<HashSet<SavedRelation>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeMutations {
    pub fn failing() -> Self {
        let fake = Self::default();
        fake.fail.store(true, Ordering::SeqCst);
        fake
    }

    async fn write(&self, relation: &SavedRelation, insert: bool) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = lock(&self.gate).take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(PulseError::remote(500, "write rejected"));
        }
        let mut relations = lock(&self.relations);
        if insert {
            relations.insert(relation.clone());
        } else {
            relations.remove(relation);
        }
        Ok(())
    }
}

#[async_trait]
impl MutationService for FakeMutations {
    async fn insert_relation(&self, relation: &SavedRelation) -> Result<()> {
        self.write(relation, true).await
    }

    async fn delete_relation(&self, relation: &SavedRelation) -> Result<()> {
        self.write(relation, false).await
    }
}
