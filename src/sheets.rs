//! Workbook and archive assembly for glossary import/export.
//!
//! Everything here is built fully in memory: a workbook is rendered to a
//! byte buffer before the response is streamed, and the export-all archive
//! bundles those buffers into a single zip stream.

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use calamine::{Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use thiserror::Error;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Fixed header labels shared by the template, the importer and the exporters.
pub const ORIGIN_HEADER: &str = "source term";
pub const TARGET_HEADER: &str = "target term";

pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ZIP_MIME: &str = "application/zip";

#[derive(Debug, Error)]
pub enum SheetReadError {
    /// The uploaded file does not carry the two template columns.
    #[error("missing required columns '{ORIGIN_HEADER}' and '{TARGET_HEADER}'")]
    MissingColumns,

    /// Anything that went wrong while parsing the binary.
    #[error("{0}")]
    Malformed(String),
}

/// Render a two-column glossary workbook: the fixed header row followed by
/// one row per term pair.
pub fn glossary_workbook(rows: &[(String, String)]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    sheet.write_string(0, 0, ORIGIN_HEADER)?;
    sheet.write_string(0, 1, TARGET_HEADER)?;

    for (i, (origin, target)) in rows.iter().enumerate() {
        let row = u32::try_from(i + 1).context("too many rows for a worksheet")?;
        sheet.write_string(row, 0, origin)?;
        sheet.write_string(row, 1, target)?;
    }

    workbook
        .save_to_buffer()
        .context("failed to render workbook")
}

/// The empty import template: header row only.
pub fn template_workbook() -> Result<Vec<u8>> {
    glossary_workbook(&[])
}

/// Read term rows back out of an uploaded workbook.
///
/// The first worksheet's first row must contain both template headers
/// (extra columns are ignored); every following row contributes one
/// (origin, target) pair rendered through the cells' display form.
pub fn read_term_rows(bytes: &[u8]) -> Result<Vec<(String, String)>, SheetReadError> {
    let cursor = Cursor::new(bytes);
    let mut workbook =
        Xlsx::new(cursor).map_err(|e| SheetReadError::Malformed(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SheetReadError::Malformed("workbook has no worksheets".into()))?
        .map_err(|e| SheetReadError::Malformed(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(SheetReadError::MissingColumns)?;

    let position = |label: &str| {
        header
            .iter()
            .position(|cell| cell.to_string().trim() == label)
    };

    let origin_col = position(ORIGIN_HEADER).ok_or(SheetReadError::MissingColumns)?;
    let target_col = position(TARGET_HEADER).ok_or(SheetReadError::MissingColumns)?;

    Ok(rows
        .map(|row| {
            let cell = |col: usize| {
                row.get(col)
                    .map(ToString::to_string)
                    .unwrap_or_default()
            };
            (cell(origin_col), cell(target_col))
        })
        .collect())
}

/// Bundle named workbook buffers into a single zip stream.
pub fn bundle_archive(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, bytes) in files {
        zip.start_file(name.clone(), options)
            .with_context(|| format!("failed to start archive entry {name}"))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write archive entry {name}"))?;
    }

    let cursor = zip.finish().context("failed to finalize archive")?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_through_reader() {
        let bytes = template_workbook().unwrap();
        let rows = read_term_rows(&bytes).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn workbook_rows_round_trip_through_reader() {
        let pairs = vec![
            ("cat".to_string(), "chat".to_string()),
            ("dog".to_string(), "chien".to_string()),
        ];

        let bytes = glossary_workbook(&pairs).unwrap();
        let rows = read_term_rows(&bytes).unwrap();

        assert_eq!(rows, pairs);
    }

    #[test]
    fn reader_rejects_workbook_without_template_columns() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "word").unwrap();
        sheet.write_string(0, 1, "translation").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        assert!(matches!(
            read_term_rows(&bytes),
            Err(SheetReadError::MissingColumns)
        ));
    }

    #[test]
    fn reader_rejects_garbage_bytes() {
        assert!(matches!(
            read_term_rows(b"not a spreadsheet"),
            Err(SheetReadError::Malformed(_))
        ));
    }

    #[test]
    fn archive_contains_one_entry_per_workbook() {
        let files = vec![
            ("a.xlsx".to_string(), template_workbook().unwrap()),
            ("b.xlsx".to_string(), template_workbook().unwrap()),
        ];

        let bytes = bundle_archive(&files).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("a.xlsx").is_ok());
        assert!(archive.by_name("b.xlsx").is_ok());
    }
}
