// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Batched loading of records into the graph store.
//!
//! Rows are accumulated until the batch size is reached, then written in one
//! transaction; a final short batch follows once the source is exhausted.
//! Batches run strictly one after another on a single session. A failed
//! batch stops the run: nothing is retried and earlier batches stay
//! committed, so the error carries how far the load got.

use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_LABEL, LoadConfig};
use crate::create_nodes::CreateNodes;
use crate::error::{LoadError, LoadReport, Result};
use crate::record::Record;
use crate::source::RecordSource;
use crate::store::{GraphSession, GraphStore};
use diagnostics::*;

/// Batch size and node label for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub batch_size: usize,
    pub label: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn from_config(config: &LoadConfig) -> Self {
        Self {
            batch_size: config.load.batch_size,
            label: config.load.label.clone(),
        }
    }
}

/// Drains a record sequence into an open session
pub struct BatchLoader<'s, S: GraphSession + ?Sized> {
    session: &'s mut S,
    options: LoadOptions,
    batch: Vec<Record>,
    report: LoadReport,
}

impl<'s, S: GraphSession + ?Sized> BatchLoader<'s, S> {
    /// Fails with [`LoadError::Config`] for a zero batch size
    pub fn new(session: &'s mut S, options: LoadOptions) -> Result<Self> {
        if options.batch_size == 0 {
            return Err(LoadError::Config(
                "batch size must be greater than 0".into(),
            ));
        }
        Ok(Self {
            batch: Vec::with_capacity(options.batch_size),
            session,
            options,
            report: LoadReport::default(),
        })
    }

    /// Load every row, flushing a transaction each time the batch fills.
    pub async fn load<I>(mut self, rows: I) -> Result<LoadReport>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        for row in rows {
            let record = row.map_err(|e| e.with_committed(self.report))?;
            self.batch.push(record);
            if self.batch.len() >= self.options.batch_size {
                self.flush().await?;
            }
        }

        if !self.batch.is_empty() {
            self.flush().await?;
        }
        Ok(self.report)
    }

    async fn flush(&mut self) -> Result<()> {
        let batch_number = self.report.batches + 1;
        let batch_len = self.batch.len();
        debug!("Writing batch {batch_number} with {batch_len} records", batch_number: batch_number, batch_len: batch_len);

        let work = CreateNodes::new(&self.options.label, &self.batch);
        if let Err(e) = self.session.write_transaction(work).await {
            let reason = e.to_string();
            error!("Failed to create nodes for batch {batch_number}: {reason}", batch_number: batch_number, reason: reason);
            return Err(LoadError::BatchWrite {
                batch: batch_number,
                reason,
                committed: self.report,
            });
        }

        self.report.record_commit(batch_len);
        self.batch.clear();
        let total = self.report.records;
        debug!("Committed batch {batch_number} ({total} records so far)", batch_number: batch_number, total: total);
        Ok(())
    }
}

/// Open the source on `session` and load it
pub async fn load_source<S, Src>(
    session: &mut S,
    source: &Src,
    options: LoadOptions,
) -> Result<LoadReport>
where
    S: GraphSession + ?Sized,
    Src: RecordSource + ?Sized,
{
    let rows = source.open()?;
    BatchLoader::new(session, options)?.load(rows).await
}

/// One complete run: open a session, load the source, close the session.
///
/// The session is closed whether or not the load succeeded; a failure to
/// close is logged and does not change the outcome.
pub async fn run<St, Src>(store: &St, source: &Src, options: LoadOptions) -> Result<LoadReport>
where
    St: GraphStore + ?Sized,
    Src: RecordSource + ?Sized,
{
    let mut session = store.open_session().await.map_err(|e| {
        let reason = e.to_string();
        error!("Failed to open graph session: {reason}", reason: reason);
        LoadError::Connection(reason)
    })?;

    let result = load_source(&mut session, source, options).await;

    if let Err(e) = session.close().await {
        let reason = e.to_string();
        warn!("Failed to close graph session: {reason}", reason: reason);
    }

    match &result {
        Ok(report) => {
            let batches = report.batches;
            let records = report.records;
            info!("All data loaded: {records} records in {batches} batches", records: records, batches: batches);
        }
        Err(e) if e.is_partial() => {
            let committed = e.committed().to_string();
            warn!("Load incomplete, partially applied: {committed} committed", committed: committed);
        }
        Err(_) => {}
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, VecSource, numbered_records};

    #[tokio::test]
    async fn test_batch_sizes_follow_ceiling_division() {
        for (rows, batch_size, expected) in [
            (0, 3, vec![]),
            (1, 3, vec![1]),
            (3, 3, vec![3]),
            (7, 3, vec![3, 3, 1]),
            (9, 3, vec![3, 3, 3]),
            (5, 1, vec![1, 1, 1, 1, 1]),
        ] {
            let store = MemoryStore::new();
            let source = VecSource::new(numbered_records(rows));
            let options = LoadOptions {
                batch_size,
                label: "Product".into(),
            };

            let report = run(&store, &source, options).await.expect("load succeeds");
            assert_eq!(store.attempted_batches(), expected, "rows={rows} batch={batch_size}");
            assert_eq!(report.batches, expected.len());
            assert_eq!(report.records, rows);
        }
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected_before_writing() {
        let store = MemoryStore::new();
        let source = VecSource::new(numbered_records(4));
        let options = LoadOptions {
            batch_size: 0,
            label: "Product".into(),
        };

        let err = run(&store, &source, options).await.unwrap_err();
        assert!(matches!(err, LoadError::Config(_)));
        assert!(store.attempted_batches().is_empty());
        assert_eq!(store.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_loader_uses_configured_label() {
        let store = MemoryStore::new();
        let source = VecSource::new(numbered_records(2));
        let options = LoadOptions {
            batch_size: 10,
            label: "Item".into(),
        };

        run(&store, &source, options).await.expect("load succeeds");
        assert!(store.nodes().iter().all(|node| node.label == "Item"));
    }
}
