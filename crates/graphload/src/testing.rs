// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory store and source for exercising the loader without a database.

use crate::create_nodes::CreateNodes;
use crate::error::{LoadError, Result, StoreError};
use crate::record::{Record, Value};
use crate::source::RecordSource;
use crate::store::{GraphSession, GraphStore};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// A node as the in-memory store committed it
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub label: String,
    pub properties: Vec<(String, Value)>,
}

impl StoredNode {
    /// Property names, in the order the record supplied them
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.properties.iter().map(|(k, _)| k.as_str()).collect()
    }
}

#[derive(Debug, Default)]
struct MemoryGraph {
    nodes: Vec<StoredNode>,
    attempted: Vec<usize>,
    statements: Vec<String>,
    sessions_opened: usize,
    sessions_closed: usize,
    refuse_connection: bool,
    fail_transaction: Option<usize>,
}

/// Graph store that keeps committed nodes in memory.
///
/// Clones share the same graph, so a test can keep a handle while the
/// loader owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    graph: Arc<Mutex<MemoryGraph>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every `open_session` call
    #[must_use]
    pub fn refusing_connections(self) -> Self {
        self.lock().refuse_connection = true;
        self
    }

    /// Fail the `n`th write transaction (1-based), counted across sessions
    #[must_use]
    pub fn failing_transaction(self, n: usize) -> Self {
        self.lock().fail_transaction = Some(n);
        self
    }

    /// Committed nodes, in commit order
    #[must_use]
    pub fn nodes(&self) -> Vec<StoredNode> {
        self.lock().nodes.clone()
    }

    /// Size of every batch submitted, including a failed one
    #[must_use]
    pub fn attempted_batches(&self) -> Vec<usize> {
        self.lock().attempted.clone()
    }

    /// Statement text of every submitted transaction
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    #[must_use]
    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryGraph> {
        // A panicking test thread must not hide the graph from the assertions
        self.graph
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    type Session = MemorySession;

    async fn open_session(&self) -> std::result::Result<MemorySession, StoreError> {
        let mut graph = self.lock();
        if graph.refuse_connection {
            return Err(StoreError::Connect("connection refused".into()));
        }
        graph.sessions_opened += 1;
        Ok(MemorySession {
            store: self.clone(),
            open: true,
        })
    }
}

/// Session on a [`MemoryStore`]
#[derive(Debug)]
pub struct MemorySession {
    store: MemoryStore,
    open: bool,
}

#[async_trait]
impl GraphSession for MemorySession {
    async fn write_transaction(
        &mut self,
        work: CreateNodes<'_>,
    ) -> std::result::Result<(), StoreError> {
        if !self.open {
            return Err(StoreError::Transaction("session already closed".into()));
        }

        let mut graph = self.store.lock();
        graph.attempted.push(work.rows().len());
        graph.statements.push(work.cypher());

        if graph.fail_transaction == Some(graph.attempted.len()) {
            // Nothing from a failed transaction becomes visible
            return Err(StoreError::Transaction("injected failure".into()));
        }

        let label = work.label().to_string();
        graph.nodes.extend(work.rows().iter().map(|record| StoredNode {
            label: label.clone(),
            // `SET n = row` does not store null properties
            properties: record
                .iter()
                .filter(|(_, v)| !matches!(v, Value::Null))
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }));
        Ok(())
    }

    async fn close(&mut self) -> std::result::Result<(), StoreError> {
        if !self.open {
            return Err(StoreError::Close("session already closed".into()));
        }
        self.open = false;
        self.store.lock().sessions_closed += 1;
        Ok(())
    }
}

/// Source over records held in memory
#[derive(Debug, Clone)]
pub struct VecSource {
    records: Vec<Record>,
    fail_open: Option<String>,
    fail_at: Option<(usize, String)>,
}

impl VecSource {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            fail_open: None,
            fail_at: None,
        }
    }

    /// A source that cannot be opened at all
    #[must_use]
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            fail_open: Some(reason.into()),
            fail_at: None,
        }
    }

    /// Yield a read error in place of the record at `index` and stop there
    #[must_use]
    pub fn failing_at(mut self, index: usize, reason: impl Into<String>) -> Self {
        self.fail_at = Some((index, reason.into()));
        self
    }
}

impl RecordSource for VecSource {
    type Rows = std::vec::IntoIter<Result<Record>>;

    fn open(&self) -> Result<Self::Rows> {
        if let Some(reason) = &self.fail_open {
            return Err(LoadError::source_read(reason.clone()));
        }

        let mut rows: Vec<Result<Record>> = self.records.iter().cloned().map(Ok).collect();
        if let Some((index, reason)) = &self.fail_at {
            rows.truncate(*index);
            rows.push(Err(LoadError::source_read(reason.clone())));
        }
        Ok(rows.into_iter())
    }
}

/// `count` product-like records with columns `id`, `name`, `price`
#[must_use]
pub fn numbered_records(count: usize) -> Vec<Record> {
    let columns: Arc<[String]> = ["id", "name", "price"]
        .iter()
        .map(|c| (*c).to_string())
        .collect();
    (0..count)
        .filter_map(|i| {
            Record::new(
                columns.clone(),
                vec![
                    Value::Integer(i as i64),
                    Value::String(format!("product-{i}")),
                    Value::Float(i as f64 * 0.5),
                ],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_properties_are_not_stored() {
        let store = MemoryStore::new();
        let record = Record::from_pairs([("sku", Value::from("A")), ("note", Value::Null)]);

        let mut session = store.open_session().await.expect("open");
        session
            .write_transaction(CreateNodes::new("Product", std::slice::from_ref(&record)))
            .await
            .expect("write");

        assert_eq!(store.nodes()[0].keys(), ["sku"]);
    }
}
