// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Neo4j backend over Bolt, using `neo4rs`.

use super::{GraphSession, GraphStore};
use crate::config::LoadConfig;
use crate::create_nodes::{CreateNodes, ROWS_PARAM};
use crate::error::StoreError;
use crate::record::{Record, Value};
use async_trait::async_trait;
use diagnostics::*;
use neo4rs::{BoltNull, BoltType, ConfigBuilder, Graph, query};
use std::collections::HashMap;

/// Connection settings for a Neo4j server
#[derive(Clone)]
pub struct Neo4jStore {
    uri: String,
    username: String,
    password: String,
    database: Option<String>,
}

impl Neo4jStore {
    #[must_use]
    pub fn new(config: &LoadConfig) -> Self {
        Self {
            uri: config.creds.uri.clone(),
            username: config.creds.username.clone(),
            password: config.creds.password.clone(),
            database: config.load.database.clone(),
        }
    }

    async fn connect(&self) -> Result<Graph, StoreError> {
        let mut builder = ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(self.username.as_str())
            .password(self.password.as_str())
            // Batches run one after another on a single connection
            .max_connections(1);
        if let Some(database) = &self.database {
            builder = builder.db(database.as_str());
        }
        let config = builder
            .build()
            .map_err(|e| StoreError::Connect(format!("invalid connection settings: {e}")))?;

        Graph::connect(config)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    type Session = Neo4jSession;

    async fn open_session(&self) -> Result<Neo4jSession, StoreError> {
        let uri = self.uri.clone();
        debug!("Connecting to Neo4j at {uri}", uri: uri);

        let graph = self.connect().await?;
        // neo4rs connects lazily; make bad URIs and credentials fail here
        graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| StoreError::Connect(format!("{uri}: {e}")))?;

        info!("Neo4j session opened at {uri}", uri: uri);
        Ok(Neo4jSession { graph: Some(graph) })
    }
}

/// Open Neo4j session; the connection pool is dropped on close
pub struct Neo4jSession {
    graph: Option<Graph>,
}

impl Neo4jSession {
    fn graph(&self) -> Result<&Graph, StoreError> {
        self.graph
            .as_ref()
            .ok_or_else(|| StoreError::Transaction("session already closed".into()))
    }
}

#[async_trait]
impl GraphSession for Neo4jSession {
    async fn write_transaction(&mut self, work: CreateNodes<'_>) -> Result<(), StoreError> {
        let rows: Vec<HashMap<String, BoltType>> = work.rows().iter().map(bolt_row).collect();
        let statement = query(&work.cypher()).param(ROWS_PARAM, rows);

        let mut txn = self
            .graph()?
            .start_txn()
            .await
            .map_err(|e| StoreError::Transaction(format!("failed to begin transaction: {e}")))?;

        if let Err(e) = txn.run(statement).await {
            let reason = e.to_string();
            if let Err(rollback_err) = txn.rollback().await {
                let rollback_reason = rollback_err.to_string();
                warn!(
                    "Rollback after failed batch also failed: {rollback_reason}",
                    rollback_reason: rollback_reason
                );
            }
            return Err(StoreError::Transaction(reason));
        }

        txn.commit()
            .await
            .map_err(|e| StoreError::Transaction(format!("failed to commit transaction: {e}")))
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        match self.graph.take() {
            Some(graph) => {
                drop(graph);
                info!("Neo4j connection closed");
                Ok(())
            }
            None => Err(StoreError::Close("session already closed".into())),
        }
    }
}

/// Record columns as node properties, verbatim
fn bolt_row(record: &Record) -> HashMap<String, BoltType> {
    record
        .iter()
        .map(|(column, value)| (column.to_string(), bolt_value(value)))
        .collect()
}

fn bolt_value(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Boolean(b) => BoltType::from(*b),
        Value::Integer(i) => BoltType::from(*i),
        Value::Float(x) => BoltType::from(*x),
        Value::String(s) => BoltType::from(s.as_str()),
    }
}
