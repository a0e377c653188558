// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! # graphload
//!
//! Loads the rows of a CSV file into a graph database as labeled nodes,
//! one node per row with the row's columns as properties, in fixed-size
//! write transactions.
//!
//! - [`config`]: YAML credentials, source path and load tuning
//! - [`source`]: CSV decoding into [`Record`]s
//! - [`store`]: session and write-transaction interface, Neo4j backend
//! - [`create_nodes`]: the bulk-create statement run per batch
//! - [`loader`]: the batching loop and the complete [`run`]

pub mod config;
pub mod create_nodes;
pub mod error;
pub mod loader;
pub mod record;
pub mod source;
pub mod store;
pub mod testing;

pub use config::{LoadConfig, create_example_config, load_config, validate_config};
pub use create_nodes::CreateNodes;
pub use error::{LoadError, LoadReport, Result, StoreError};
pub use loader::{BatchLoader, LoadOptions, load_source, run};
pub use record::{Record, Value};
pub use source::{CsvSource, RecordSource};
pub use store::{GraphSession, GraphStore, Neo4jStore};
