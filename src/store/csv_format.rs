//! Delimited-text codec for the cheese directory.
//!
//! Reading maps columns by header name, so files with reordered or extra
//! columns still parse. Whole files are written in the canonical header order
//! and rows appended to an existing file follow that file's own header. Output
//! uses RFC 4180 quoting and CRLF line endings, without a byte-order marker.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use super::StoreError;
use crate::record::{CheeseRecord, Column};

/// UTF-8 encoding of U+FEFF.
pub(crate) const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Drops a leading byte-order marker. Input without one is returned whole.
pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(BOM).unwrap_or(bytes)
}

/// Parse a complete dataset. `path` only labels errors.
///
/// Fails on the first row that does not map onto a record and on any id
/// that appears twice; callers decide whether that degrades or propagates.
pub(crate) fn read_records<R: Read>(
    input: R,
    path: &Path,
) -> Result<Vec<CheeseRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for row in reader.deserialize::<CheeseRecord>() {
        let record = row.map_err(|err| read_error(path, err))?;
        if !seen.insert(record.cheese_id) {
            return Err(StoreError::DuplicateKey {
                id: record.cheese_id,
            });
        }
        records.push(record);
    }

    Ok(records)
}

/// Parse a dataset held in memory, skipping a leading byte-order marker.
pub(crate) fn read_bytes(bytes: &[u8], path: &Path) -> Result<Vec<CheeseRecord>, StoreError> {
    read_records(strip_bom(bytes), path)
}

/// Header names of a dataset, skipping a leading byte-order marker. `None`
/// when the input has no header row.
pub(crate) fn read_header(bytes: &[u8], path: &Path) -> Result<Option<Vec<String>>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(strip_bom(bytes));
    let header = reader.headers().map_err(|err| read_error(path, err))?;
    if header.is_empty() {
        return Ok(None);
    }
    Ok(Some(header.iter().map(str::to_string).collect()))
}

/// Serialize `records` to `out`, optionally preceded by the header row.
///
/// Returns the flushed writer so the caller controls when it is released.
pub(crate) fn write_records<W: Write>(
    out: W,
    records: &[CheeseRecord],
    include_header: bool,
) -> Result<W, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);

    if include_header {
        writer.write_record(Column::header()).map_err(write_error)?;
    }
    for record in records {
        writer.serialize(record).map_err(write_error)?;
    }

    writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))
}

/// Serialize `records` as rows laid out under `columns`, the header of the
/// file they are appended to. Names that are not a record column get an empty
/// value.
pub(crate) fn write_rows<W: Write>(
    out: W,
    columns: &[String],
    records: &[CheeseRecord],
) -> Result<W, StoreError> {
    let layout: Vec<Option<Column>> = columns.iter().map(|name| name.parse().ok()).collect();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);

    for record in records {
        let row: Vec<Cow<'_, str>> = layout
            .iter()
            .map(|column| column.map_or(Cow::Borrowed(""), |column| record.value(column)))
            .collect();
        writer
            .write_record(row.iter().map(|field| field.as_bytes()))
            .map_err(write_error)?;
    }

    writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))
}

fn read_error(path: &Path, err: csv::Error) -> StoreError {
    let line = err.position().map(csv::Position::line);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => StoreError::Io(io),
        _ => StoreError::MalformedRow {
            path: path.to_path_buf(),
            line,
            message,
        },
    }
}

fn write_error(err: csv::Error) -> StoreError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => StoreError::Io(io),
        _ => StoreError::Serde(message),
    }
}

/// Whether appending to a file ending in `tail` needs a line break first.
pub(crate) fn needs_line_break(tail: Option<u8>) -> bool {
    !matches!(tail, None | Some(b'\n'))
}
