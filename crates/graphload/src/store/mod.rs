// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Graph store abstraction.
//!
//! The loader needs exactly two things from a store: open a session, and run
//! one write transaction per batch on that session. [`neo4j::Neo4jStore`] is
//! the production backend; [`crate::testing::MemoryStore`] records
//! transactions in memory for tests.

pub mod neo4j;

use crate::create_nodes::CreateNodes;
use crate::error::StoreError;
use async_trait::async_trait;

pub use neo4j::Neo4jStore;

/// A graph database that can hand out write sessions
#[async_trait]
pub trait GraphStore: Send + Sync {
    type Session: GraphSession;

    /// Connect and verify the credentials
    async fn open_session(&self) -> Result<Self::Session, StoreError>;
}

/// One open session; used for every batch of a run, then closed
#[async_trait]
pub trait GraphSession: Send {
    /// Run `work` in a single write transaction.
    ///
    /// Either every node in the batch is committed or none is.
    async fn write_transaction(&mut self, work: CreateNodes<'_>) -> Result<(), StoreError>;

    /// Release the session. Called exactly once, also after failures.
    async fn close(&mut self) -> Result<(), StoreError>;
}
