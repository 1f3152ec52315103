use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::table::{Dataset, Record};

/// Header keys of a dataset and where each header field lands in them.
struct Header {
    columns: Arc<[String]>,
    // header field position -> column index
    slots: Vec<usize>,
}

impl Header {
    fn parse(line: &str) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut slots = Vec::new();
        for field in line.split(',') {
            let name = strip_quotes(field.trim()).to_string();
            // A repeated name keeps the position of its first occurrence.
            let slot = match columns.iter().position(|c| *c == name) {
                Some(idx) => idx,
                None => {
                    columns.push(name);
                    columns.len() - 1
                }
            };
            slots.push(slot);
        }
        Self {
            columns: columns.into(),
            slots,
        }
    }

    fn record(&self, fields: Vec<String>) -> Record {
        let mut values = vec![String::new(); self.columns.len()];
        // Later fields overwrite earlier ones mapped to the same column.
        for (slot, value) in self.slots.iter().zip(fields) {
            values[*slot] = value;
        }
        Record::new(self.columns.clone(), values)
    }
}

/// Parse the text of a csv export into a dataset.
///
/// The first line holds the column names and is split on plain commas. Data
/// lines honour double quoted fields, so commas inside quotes stay part of the
/// value. Quotes are never part of a value: `""` is not an escaped quote and a
/// quoted field spanning several lines is split at each line break. Rows where
/// every value is blank are skipped.
pub fn parse_csv(text: &str) -> Dataset {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.is_empty() {
        debug!("Empty export, returning an empty dataset");
        return Dataset::default();
    }
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    // The first line is the header even when it is blank.
    let Some((header_line, data_lines)) = lines.split_first() else {
        return Dataset::default();
    };

    let header = Header::parse(header_line);
    trace!("Header columns: {:?}", header.columns);

    let records: Vec<Record> = data_lines
        .par_iter()
        .map(|line| header.record(split_line(line)))
        .filter(|record| !record.is_blank())
        .collect();

    debug!(
        "Parsed {} records from {} data lines",
        records.len(),
        data_lines.len()
    );
    Dataset::new(header.columns, records)
}

/// Split one data line into its field values.
fn split_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut in_quotes = false;
    let mut current = String::new();

    for chr in line.chars() {
        match chr {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(strip_quotes(&current).to_string());
                current.clear();
            }
            _ => current.push(chr),
        }
    }
    values.push(strip_quotes(&current).to_string());
    values
}

/// Remove one leading and one trailing double quote.
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}
