// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for graphload.

use std::fmt;

/// Alias for Results returning [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;

/// How much of a load reached the store.
///
/// Returned on success, and carried by the errors that can occur after
/// batches have already been committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Write transactions that committed
    pub batches: usize,
    /// Records (and therefore nodes) in those transactions
    pub records: usize,
}

impl LoadReport {
    pub(crate) fn record_commit(&mut self, batch_len: usize) {
        self.batches += 1;
        self.records += batch_len;
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} batches, {} records", self.batches, self.records)
    }
}

/// Top-level error type for a load run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Missing, unreadable or invalid configuration. Raised before any I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The CSV source could not be opened or decoded.
    #[error("Source read error: {reason} ({committed} committed)")]
    SourceRead { reason: String, committed: LoadReport },

    /// The store was unreachable or rejected the credentials.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A write transaction failed; earlier batches stay committed.
    #[error("Batch {batch} failed to write ({committed} committed): {reason}")]
    BatchWrite {
        /// 1-based position of the failed batch
        batch: usize,
        reason: String,
        committed: LoadReport,
    },
}

impl LoadError {
    /// Source failure raised before anything was written
    pub fn source_read(reason: impl Into<String>) -> Self {
        LoadError::SourceRead {
            reason: reason.into(),
            committed: LoadReport::default(),
        }
    }

    /// What had been committed when the error occurred
    #[must_use]
    pub fn committed(&self) -> LoadReport {
        match self {
            LoadError::SourceRead { committed, .. } | LoadError::BatchWrite { committed, .. } => {
                *committed
            }
            LoadError::Config(_) | LoadError::Connection(_) => LoadReport::default(),
        }
    }

    /// True when some batches committed before the failure
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.committed().batches > 0
    }

    pub(crate) fn with_committed(self, report: LoadReport) -> Self {
        match self {
            LoadError::SourceRead { reason, .. } => LoadError::SourceRead {
                reason,
                committed: report,
            },
            LoadError::BatchWrite { batch, reason, .. } => LoadError::BatchWrite {
                batch,
                reason,
                committed: report,
            },
            other => other,
        }
    }
}

/// Failure reported by a [`crate::store::GraphSession`] or [`crate::store::GraphStore`].
///
/// The loader turns these into [`LoadError`] once it knows where in the run they happened.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("write transaction failed: {0}")]
    Transaction(String),

    #[error("failed to close session: {0}")]
    Close(String),
}
