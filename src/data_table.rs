// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tabular step argument.

use derive_more::with_trait::{Display, Error};

/// Error of constructing a [`DataTable`] from rows of unequal width.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("all data table rows must have {expected} cells, found {found}")]
pub struct UnevenRowsError {
    /// Width of the header row.
    pub expected: usize,

    /// Width of the offending row.
    pub found: usize,
}

/// Table attached to a step: a header row plus zero or more body rows, all of
/// equal width.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DataTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a [`DataTable`] out of a header and body rows, rejecting rows
    /// whose width differs from the header's.
    pub fn new(
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, UnevenRowsError> {
        let expected = header.len();
        if let Some(row) = rows.iter().find(|r| r.len() != expected) {
            return Err(UnevenRowsError { expected, found: row.len() });
        }
        Ok(Self { header, rows })
    }

    /// Column names of this table.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Body rows of this table, header excluded.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of body rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether this table has no body rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell at `row` in the column named `column`, if both exist.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.header.iter().position(|h| h == column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        DataTable::new(
            vec!["name".into(), "amount".into()],
            vec![
                vec!["cukes".into(), "3".into()],
                vec!["gherkins".into(), "5".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn lookup_by_column_name() {
        let t = table();
        assert_eq!(t.cell(0, "amount"), Some("3"));
        assert_eq!(t.cell(1, "name"), Some("gherkins"));
        assert_eq!(t.cell(2, "name"), None);
        assert_eq!(t.cell(0, "missing"), None);
    }

    #[test]
    fn uneven_rows_are_rejected() {
        let err = DataTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["only".into()]],
        )
        .unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.found, 1);
    }
}
