// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The unit of work run inside each write transaction.

use crate::record::Record;

/// Name of the list parameter bound to the batch rows
pub const ROWS_PARAM: &str = "rows";

/// Bulk creation of one labeled node per record.
///
/// Always creates; there is no lookup or merge, so loading the same file
/// twice produces duplicate nodes.
#[derive(Debug, Clone, Copy)]
pub struct CreateNodes<'a> {
    label: &'a str,
    rows: &'a [Record],
}

impl<'a> CreateNodes<'a> {
    pub fn new(label: &'a str, rows: &'a [Record]) -> Self {
        Self { label, rows }
    }

    #[must_use]
    pub fn label(&self) -> &'a str {
        self.label
    }

    /// The batch payload, in source order
    #[must_use]
    pub fn rows(&self) -> &'a [Record] {
        self.rows
    }

    /// Single parameterized statement over `$rows`
    #[must_use]
    pub fn cypher(&self) -> String {
        format!(
            "UNWIND ${ROWS_PARAM} AS row CREATE (n:{}) SET n = row",
            quote_identifier(self.label)
        )
    }
}

/// Backtick-quote a label so any text is a valid Cypher identifier
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cypher_for_default_label() {
        let rows = [Record::from_pairs([("sku", "A-1")])];
        let work = CreateNodes::new("Product", &rows);
        assert_eq!(
            work.cypher(),
            "UNWIND $rows AS row CREATE (n:`Product`) SET n = row"
        );
        assert_eq!(work.rows().len(), 1);
    }

    #[test]
    fn test_label_is_escaped() {
        assert_eq!(quote_identifier("Line Item"), "`Line Item`");
        assert_eq!(quote_identifier("a`b) DETACH DELETE (x"), "`a``b) DETACH DELETE (x`");
    }
}
