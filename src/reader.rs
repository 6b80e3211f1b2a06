//! Tabular input loading.
//!
//! Reads a delimited file with a header row and keeps the eligible rows:
//! those whose prompt cell is non-empty after trimming. Ineligible rows are
//! dropped before indexing, so record indices are contiguous from 1.

use std::{fs::File, io::Read, path::Path};

use tracing::{debug, warn};

use crate::{ColumnConfig, PromptBatchError, Result, model::Record};

const UTF8_BOM: char = '\u{feff}';

/// Load the eligible records of the file at `path`.
pub fn load_records<T: AsRef<Path>>(
    path: T,
    columns: &ColumnConfig,
) -> Result<Vec<Record>> {
    let file = File::open(path.as_ref()).map_err(|err| PromptBatchError::Input(format!("failed to open input file {:?}: {}", path.as_ref(), err)))?;
    read_records(file, columns)
}

/// Read the eligible records from any delimited source.
pub fn read_records<R: Read>(
    reader: R,
    columns: &ColumnConfig,
) -> Result<Vec<Record>> {
    let mut csv = csv::ReaderBuilder::new().has_headers(true).flexible(true).delimiter(columns.delimiter_byte()?).from_reader(reader);

    let headers = csv.headers()?.clone();
    let position = |column: &str| headers.iter().position(|header| header.trim_start_matches(UTF8_BOM) == column);
    let prompt_idx = position(&columns.prompt);
    let name_idx = position(&columns.name);

    if prompt_idx.is_none() {
        warn!(column = %columns.prompt, "prompt column not found in input header, no rows are eligible");
    }
    if name_idx.is_none() {
        debug!(column = %columns.name, "name column not found in input header, falling back to generated names");
    }

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").trim();

        let prompt = cell(prompt_idx);
        if prompt.is_empty() {
            continue;
        }
        records.push(Record::new(records.len() + 1, prompt, cell(name_idx)));
    }

    Ok(records)
}
