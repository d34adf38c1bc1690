// CSV/TSV table import/export

use std::io::Read;
use std::path::Path;

use nugget_resolve::{ResolveError, Schema, Table};

use crate::normalize::{is_null_marker, type_column};

/// How to read an input file.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Field delimiter. Sniffed from the content when `None`.
    pub delimiter: Option<u8>,
    /// Columns parsed as timestamps.
    pub date_fields: Vec<String>,
}

impl ReadOptions {
    pub fn for_schema(schema: &Schema) -> Self {
        Self {
            delimiter: None,
            date_fields: schema.all_date_fields().into_iter().map(String::from).collect(),
        }
    }
}

fn io_err(e: impl std::fmt::Display) -> ResolveError {
    ResolveError::Io(e.to_string())
}

/// Read a delimited file with a header row into a typed table.
pub fn read_table(path: &Path, options: &ReadOptions) -> Result<Table, ResolveError> {
    if !path.exists() {
        return Err(ResolveError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = read_file_as_utf8(path)?;
    let table = read_table_from_string(&content, options)?;
    log::info!(
        "read {} row(s), {} column(s) from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

pub fn read_table_from_string(content: &str, options: &ReadOptions) -> Result<Table, ResolveError> {
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(content));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(io_err)?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(io_err)?);
    }

    // Column-major typing: a column is numeric only if all its cells are.
    let mut typed = Vec::with_capacity(columns.len());
    for (col, name) in columns.iter().enumerate() {
        let raw: Vec<Option<&str>> = records
            .iter()
            .map(|r| r.get(col).filter(|s| !is_null_marker(s)))
            .collect();
        let is_date = options.date_fields.iter().any(|f| f == name);
        typed.push(type_column(&raw, is_date));
    }

    let mut table = Table::new(columns);
    for row in 0..records.len() {
        table.push(typed.iter().map(|col| col[row].clone()).collect());
    }
    Ok(table)
}

/// Guess the delimiter from the first ten lines.
///
/// A candidate must split the header into more than one field. Among those,
/// the winner has the most lines matching the header's width, times that width.
fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();

    let width = |line: &str, delim: u8| -> usize {
        csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes())
            .records()
            .next()
            .and_then(|r| r.ok())
            .map_or(1, |r| r.len())
    };

    let mut best = (0usize, b',');
    for delim in CANDIDATES {
        let header_width = match sample.first() {
            Some(header) => width(header, delim),
            None => break,
        };
        if header_width <= 1 {
            continue;
        }
        let agreeing = sample.iter().filter(|&&line| width(line, delim) == header_width).count();
        let score = agreeing * header_width;
        if score > best.0 {
            best = (score, delim);
        }
    }
    best.1
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, ResolveError> {
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            log::warn!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Write a table as comma-separated values with a header row. Nulls are empty cells.
pub fn write_table(table: &Table, path: &Path) -> Result<(), ResolveError> {
    let writer = csv::WriterBuilder::new().from_path(path).map_err(io_err)?;
    write_records(table, writer)
}

pub fn write_table_to_string(table: &Table) -> Result<String, ResolveError> {
    let mut buf = Vec::new();
    write_records(table, csv::WriterBuilder::new().from_writer(&mut buf))?;
    String::from_utf8(buf).map_err(io_err)
}

fn write_records<W: std::io::Write>(table: &Table, mut writer: csv::Writer<W>) -> Result<(), ResolveError> {
    writer.write_record(&table.columns).map_err(io_err)?;
    for row in &table.rows {
        let record: Vec<String> = row
            .cells
            .iter()
            .map(|c| c.as_ref().map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}
