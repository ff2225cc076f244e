// src/table/ipac.rs

//! IPAC ASCII table reader/writer.
//!
//! Layout:
//!
//! ```text
//! \fixlen = T
//! | cntr1 | cntr2 |        plus |       minus |                 diff |
//! | int   | int   | char        | char        | char                 |
//!         0       1  a.fits        b.fits        diff.000000.000001.fits
//! ```
//!
//! Up to four `|` header lines (names, types, units, nulls). Data rows are
//! fixed-width and aligned to the delimiters of the name line.

use crate::errors::{Result, WorkflowError};

use super::{Column, Table};

fn table_error(msg: impl Into<String>) -> WorkflowError {
    WorkflowError::TableError(msg.into())
}

/// Parse an IPAC table.
pub fn parse(text: &str) -> Result<Table> {
    let mut keywords = Vec::new();
    let mut header_lines: Vec<&str> = Vec::new();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('\\') {
            keywords.push(line.to_string());
        } else if line.starts_with('|') {
            if !data_lines.is_empty() {
                return Err(table_error("header line found after data rows"));
            }
            header_lines.push(line);
        } else {
            data_lines.push(line);
        }
    }

    let names_line = header_lines
        .first()
        .ok_or_else(|| table_error("no '|' column header line"))?;
    let names = header_fields(names_line)?;
    if names.iter().any(|n| n.is_empty()) {
        return Err(table_error(format!("empty column name in header: {names_line}")));
    }

    let mut columns: Vec<Column> = names.into_iter().map(Column::new).collect();
    for (line_no, line) in header_lines.iter().enumerate().skip(1).take(3) {
        let fields = header_fields(line)?;
        if fields.len() != columns.len() {
            return Err(table_error(format!(
                "header line {} has {} fields, expected {}",
                line_no + 1,
                fields.len(),
                columns.len()
            )));
        }
        for (column, field) in columns.iter_mut().zip(fields) {
            match line_no {
                1 => column.kind = Some(field),
                2 => column.unit = Some(field),
                _ => column.null = Some(field),
            }
        }
    }

    let delims: Vec<usize> = names_line
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == '|')
        .map(|(i, _)| i)
        .collect();

    let rows = data_lines
        .into_iter()
        .map(|line| split_row(line, &delims, columns.len()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Table::from_parts(keywords, columns, rows))
}

/// Fields between the first and last `|` of a header line, trimmed.
fn header_fields(line: &str) -> Result<Vec<String>> {
    let first = line.find('|');
    let last = line.rfind('|');
    match (first, last) {
        (Some(a), Some(b)) if b > a => Ok(line[a + 1..b]
            .split('|')
            .map(|f| f.trim().to_string())
            .collect()),
        _ => Err(table_error(format!("malformed header line: {line}"))),
    }
}

/// Split a data row into `ncols` values.
///
/// Rows are sliced at the header delimiters: column `i` covers the
/// characters after delimiter `i` up to and including delimiter `i + 1`, so
/// blank values and values with embedded spaces stay in their column. Rows
/// that do not line up with the header (a value running across a delimiter)
/// are split on whitespace instead, which needs exactly one token per column.
fn split_row(line: &str, delims: &[usize], ncols: usize) -> Result<Vec<String>> {
    let chars: Vec<char> = line.chars().collect();
    if lines_up(&chars, delims, ncols) {
        return Ok(slice_row(&chars, delims, ncols));
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != ncols {
        return Err(table_error(format!(
            "row does not line up with the header and has {} values, expected {ncols}: {line}",
            tokens.len()
        )));
    }
    Ok(tokens.into_iter().map(str::to_string).collect())
}

/// Column `i` starts right after delimiter `i`.
fn column_start(delims: &[usize], i: usize) -> Option<usize> {
    delims.get(i).map(|d| d + 1)
}

fn lines_up(chars: &[char], delims: &[usize], ncols: usize) -> bool {
    let is_value = |i: usize| chars.get(i).is_some_and(|c| !c.is_whitespace());
    (1..ncols).all(|i| match column_start(delims, i) {
        Some(start) => !(start > 0 && is_value(start - 1) && is_value(start)),
        None => false,
    })
}

fn slice_row(chars: &[char], delims: &[usize], ncols: usize) -> Vec<String> {
    (0..ncols)
        .map(|i| {
            let start = column_start(delims, i).unwrap_or(chars.len()).min(chars.len());
            let end = if i + 1 == ncols {
                chars.len()
            } else {
                column_start(delims, i + 1).unwrap_or(chars.len())
            };
            let end = end.clamp(start, chars.len());
            chars[start..end].iter().collect::<String>().trim().to_string()
        })
        .collect()
}

/// Render a table in IPAC format. Column widths are sized to the widest of
/// the header fields and the values, so any generated file name fits.
pub fn format(table: &Table) -> String {
    let columns = table.columns();
    let has_null = columns.iter().any(|c| c.null.is_some());
    let has_unit = has_null || columns.iter().any(|c| c.unit.is_some());
    let has_kind = has_unit || columns.iter().any(|c| c.kind.is_some());

    let kinds: Vec<&str> = columns
        .iter()
        .map(|c| c.kind.as_deref().unwrap_or("char"))
        .collect();
    let units: Vec<&str> = columns
        .iter()
        .map(|c| c.unit.as_deref().unwrap_or(""))
        .collect();
    let nulls: Vec<&str> = columns
        .iter()
        .map(|c| c.null.as_deref().unwrap_or("null"))
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut w = c.name.chars().count();
            if has_kind {
                w = w.max(kinds[i].chars().count());
            }
            if has_unit {
                w = w.max(units[i].chars().count());
            }
            if has_null {
                w = w.max(nulls[i].chars().count());
            }
            table
                .rows()
                .filter_map(|r| r.get(&c.name).ok())
                .map(|v| v.chars().count())
                .fold(w, usize::max)
        })
        .collect();

    let mut out = String::new();
    for kw in table.keywords() {
        out.push_str(kw);
        out.push('\n');
    }

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    push_header(&mut out, &names, &widths);
    if has_kind {
        push_header(&mut out, &kinds, &widths);
    }
    if has_unit {
        push_header(&mut out, &units, &widths);
    }
    if has_null {
        push_header(&mut out, &nulls, &widths);
    }

    for row in table.rows() {
        for (c, w) in columns.iter().zip(&widths) {
            let value = row.get(&c.name).unwrap_or("");
            out.push(' ');
            out.push_str(&format!("{value:>w$}", w = *w));
        }
        out.push_str(" \n");
    }

    out
}

fn push_header(out: &mut String, fields: &[&str], widths: &[usize]) {
    for (field, w) in fields.iter().zip(widths) {
        out.push('|');
        out.push_str(&format!("{field:>w$}", w = *w));
    }
    out.push_str("|\n");
}
