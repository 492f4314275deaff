//! Terminal presentation of scan records.

use configscout_core::ConfigRecord;
use std::io::{self, Write};

/// Column headings, in record field order.
pub const COLUMNS: [&str; 5] = ["Config Name", "Value", "Default", "Running", "Description"];

/// Sink that scan results are shown in.
///
/// The scan wiring clears the display before every scan and then appends
/// the report's records in order.
pub trait RecordDisplay {
    /// Removes every row.
    fn clear_all(&mut self);

    /// Appends one row.
    fn append_record(&mut self, record: &ConfigRecord);
}

/// Five aligned columns, rendered on demand.
#[derive(Debug, Default)]
pub struct TerminalTable {
    rows: Vec<[String; 5]>,
}

impl TerminalTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> [usize; 5] {
        let mut widths = COLUMNS.map(|c| c.chars().count());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    /// Writes the heading, a rule and every row.
    ///
    /// The last column is not padded.
    ///
    /// # Errors
    /// Returns any I/O error raised by `out`.
    pub fn render<W: Write>(&self, mut out: W) -> io::Result<()> {
        let widths = self.widths();

        write_row(&mut out, &COLUMNS[..], &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(&mut out, &rule[..], &widths)?;

        for row in &self.rows {
            write_row(&mut out, &row[..], &widths)?;
        }

        out.flush()
    }
}

fn write_row<W: Write, S: AsRef<str>>(
    out: &mut W,
    cells: &[S],
    widths: &[usize; 5],
) -> io::Result<()> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();

    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let cell = cell.as_ref();
        if i == last {
            line.push_str(cell);
        } else {
            let pad = width.saturating_sub(cell.chars().count());
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 2));
        }
    }

    writeln!(out, "{}", line.trim_end())
}

impl RecordDisplay for TerminalTable {
    fn clear_all(&mut self) {
        self.rows.clear();
    }

    fn append_record(&mut self, record: &ConfigRecord) {
        self.rows.push(record.fields().map(ToString::to_string));
    }
}
