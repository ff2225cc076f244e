// src/table/mod.rs

//! Row-oriented tables exchanged with the Montage tools.
//!
//! The tools read and write IPAC ASCII tables; [`ipac`] handles that format
//! and [`Table`] is the in-memory form the pipeline builders work with.

pub mod ipac;

use std::path::Path;

use crate::errors::{Result, WorkflowError};
use crate::fs::FileSystem;

/// Column metadata from the IPAC header lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Data type from the second header line (`char`, `int`, `double`...).
    pub kind: Option<String>,
    pub unit: Option<String>,
    pub null: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            unit: None,
            null: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// `\keyword = value` and `\ comment` lines, kept verbatim.
    keywords: Vec<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            keywords: Vec::new(),
            columns,
            rows: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        keywords: Vec<String>,
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            keywords,
            columns,
            rows,
        }
    }

    /// Read and parse an IPAC table.
    pub fn read(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let text = fs.read_to_string(path)?;
        ipac::parse(&text).map_err(|e| match e {
            WorkflowError::TableError(msg) => {
                WorkflowError::TableError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Write the table in IPAC format.
    pub fn write(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        fs.write(path, ipac::format(self).as_bytes())?;
        Ok(())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| WorkflowError::TableError(format!("missing column '{name}'")))
    }

    /// Every value of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            table: self,
            values: values.as_slice(),
        })
    }

    pub fn push_row<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = values.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(WorkflowError::TableError(format!(
                "row has {} values but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a column, or replace the values of an existing one.
    pub fn set_column(&mut self, column: Column, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(WorkflowError::TableError(format!(
                "column '{}' has {} values but the table has {} rows",
                column.name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.columns.iter().position(|c| c.name == column.name) {
            Some(idx) => {
                self.columns[idx] = column;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(column);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}

/// Borrowed view of a single table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    values: &'a [String],
}

impl<'a> Row<'a> {
    pub fn get(&self, name: &str) -> Result<&'a str> {
        let idx = self.table.column_index(name)?;
        Ok(self.values[idx].as_str())
    }
}
