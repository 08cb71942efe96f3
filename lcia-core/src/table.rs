//! Flat characterization-factor table.
//!
//! The converter reads exactly one input shape: one row per characterization
//! factor, with the method, indicator and flow denormalized into every row.
//! Cells are kept as strings exactly as read; names pass through to the
//! package unchanged. Whitespace only matters where a cell is used as a key
//! (identifiers and unit symbols trim it) or parsed as a number.

use crate::error::{LciaError, Result};
use indexmap::IndexSet;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

pub const METHOD: &str = "Method";
pub const METHOD_UUID: &str = "Method UUID";
pub const INDICATOR: &str = "Indicator";
pub const INDICATOR_UUID: &str = "Indicator UUID";
pub const INDICATOR_UNIT: &str = "Indicator unit";
pub const CONTEXT: &str = "Context";
pub const FLOW_UUID: &str = "Flow UUID";
pub const FLOWABLE: &str = "Flowable";
pub const CAS_NO: &str = "CAS No";
pub const UNIT: &str = "Unit";
pub const CHARACTERIZATION_FACTOR: &str = "Characterization Factor";

/// Columns every input table must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    METHOD,
    METHOD_UUID,
    INDICATOR,
    INDICATOR_UUID,
    INDICATOR_UNIT,
    CONTEXT,
    FLOW_UUID,
    FLOWABLE,
    CAS_NO,
    UNIT,
    CHARACTERIZATION_FACTOR,
];

/// An in-memory table of string cells with named columns.
#[derive(Clone, Debug, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

/// A borrowed view of one table row.
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    table: &'a Table,
    /// 1-based data row number, used in error messages.
    number: usize,
    cells: &'a [String],
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with empty cells.
    pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.columns.len().max(cells.len()), String::new());
        self.rows.push(cells);
    }

    /// Load a table from CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv.headers()?.clone();
        let mut table = Self::new(headers.iter().map(|h| h.trim()));
        for record in csv.records() {
            let record = record?;
            table.push_row(record.iter());
        }
        Ok(table)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Check that all required columns are present.
    pub fn validate(&self) -> Result<()> {
        match REQUIRED_COLUMNS.iter().find(|c| !self.has_column(c)) {
            Some(missing) => Err(LciaError::MissingColumn {
                column: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(i, cells)| Row {
            table: self,
            number: i + 1,
            cells,
        })
    }

    /// Distinct values of a column in first-seen order.
    pub fn unique(&self, column: &str) -> Result<Vec<String>> {
        let mut seen = IndexSet::new();
        for row in self.rows() {
            seen.insert(row.get(column)?);
        }
        Ok(seen.into_iter().map(str::to_string).collect())
    }
}

impl<'a> Row<'a> {
    pub fn number(&self) -> usize {
        self.number
    }

    /// Raw cell content of `column`.
    pub fn get(&self, column: &str) -> Result<&'a str> {
        let i = *self
            .table
            .index
            .get(column)
            .ok_or_else(|| LciaError::MissingColumn {
                column: column.to_string(),
            })?;
        Ok(self.cells.get(i).map(String::as_str).unwrap_or(""))
    }

    /// Cell content of `column` parsed as a number.
    pub fn value(&self, column: &str) -> Result<f64> {
        let raw = self.get(column)?;
        raw.trim().parse::<f64>().map_err(|_| LciaError::InvalidNumber {
            row: self.number,
            column: column.to_string(),
            value: raw.to_string(),
        })
    }
}
