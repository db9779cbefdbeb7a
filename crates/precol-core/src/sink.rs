use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::{CanonicalRecord, COLUMNS};

/// Data rows a worksheet can hold below the header.
const MAX_SHEET_ROWS: usize = 1_048_575;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Too many rows for one worksheet: {0}")]
    TooManyRows(usize),
}

pub type SinkResult<T> = Result<T, SinkError>;

/// Persists the final, deduplicated rows. One row per record.
pub trait TabularSink {
    fn write(&mut self, records: &[CanonicalRecord]) -> SinkResult<()>;
}

/// Single-worksheet `.xlsx` file with a header row.
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TabularSink for XlsxSink {
    fn write(&mut self, records: &[CanonicalRecord]) -> SinkResult<()> {
        if records.len() > MAX_SHEET_ROWS {
            return Err(SinkError::TooManyRows(records.len()));
        }

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let header = Format::new().set_bold();

        for (col, name) in (0u16..).zip(COLUMNS) {
            sheet.write_string_with_format(0, col, name, &header)?;
        }
        for (row, record) in (1u32..).zip(records) {
            for (col, value) in (0u16..).zip(record.columns()) {
                sheet.write_string(row, col, value)?;
            }
        }

        workbook.save(&self.path)?;
        Ok(())
    }
}

/// Aligned plain-text table, for terminals.
pub struct TableSink<W: Write> {
    out: W,
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TabularSink for TableSink<W> {
    fn write(&mut self, records: &[CanonicalRecord]) -> SinkResult<()> {
        let mut widths = COLUMNS.map(|c| c.chars().count());
        for record in records {
            for (width, value) in widths.iter_mut().zip(record.columns()) {
                *width = (*width).max(value.chars().count());
            }
        }

        let line = |cells: [&str; 4]| {
            cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(self.out, "{}", line(COLUMNS))?;
        for record in records {
            writeln!(self.out, "{}", line(record.columns()))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<CanonicalRecord>,
    pub writes: usize,
}

impl TabularSink for MemorySink {
    fn write(&mut self, records: &[CanonicalRecord]) -> SinkResult<()> {
        self.rows.extend_from_slice(records);
        self.writes += 1;
        Ok(())
    }
}
