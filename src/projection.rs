use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{trace, warn};

use crate::table::{Dataset, Record};

/// User controlled projection parameters of the loaded dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    columns: Vec<String>,
    visible_columns: HashSet<String>,
    filter_text: String,
}

impl ViewState {
    /// Every column of `dataset` visible and no filter.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            columns: dataset.columns().to_vec(),
            visible_columns: dataset.columns().iter().cloned().collect(),
            filter_text: String::new(),
        }
    }

    /// All columns of the dataset, in dataset order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Visible columns, in dataset order.
    pub fn visible_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| self.visible_columns.contains(*c))
            .map(String::as_str)
            .collect()
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.visible_columns.contains(column)
    }

    /// Show a hidden column or hide a visible one. Returns the new visibility,
    /// or `None` when the dataset has no such column.
    pub fn toggle_column(&mut self, column: &str) -> Option<bool> {
        if !self.columns.iter().any(|c| c == column) {
            warn!("Ignoring toggle of unknown column \"{column}\"");
            return None;
        }
        let visible = if self.visible_columns.remove(column) {
            false
        } else {
            self.visible_columns.insert(column.to_string());
            true
        };
        trace!("Column \"{column}\" visible: {visible}");
        Some(visible)
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
    }
}

/// What the table shows: visible column names and the matching rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub columns: Vec<String>,
    // dataset column index of each entry in `columns`
    column_indices: Vec<usize>,
    // dataset record index of each displayed row
    rows: Vec<usize>,
}

impl Projection {
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dataset record index of the displayed row `row`.
    pub fn record_index(&self, row: usize) -> Option<usize> {
        self.rows.get(row).copied()
    }

    /// Visible cell values of the displayed row `row`.
    pub fn cells<'a>(&'a self, dataset: &'a Dataset, row: usize) -> Vec<&'a str> {
        let Some(record) = self.record_index(row).and_then(|idx| dataset.records().get(idx))
        else {
            return Vec::new();
        };
        self.column_indices
            .iter()
            .map(|&c| record.value(c).unwrap_or_default())
            .collect()
    }

    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }
}

/// Apply column visibility and the text filter to `dataset`.
///
/// A record is kept when one of its visible values contains the trimmed filter
/// text, ignoring case. Hidden columns never match.
pub fn project(dataset: &Dataset, view: &ViewState) -> Projection {
    let column_indices: Vec<usize> = dataset
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| view.is_visible(name))
        .map(|(idx, _)| idx)
        .collect();
    let columns = column_indices
        .iter()
        .map(|&idx| dataset.columns()[idx].clone())
        .collect();

    let needle = view.filter_text.trim().to_lowercase();
    let rows = dataset
        .records()
        .par_iter()
        .enumerate()
        .filter(|(_, record)| matches(record, &column_indices, &needle))
        .map(|(idx, _)| idx)
        .collect();

    Projection {
        columns,
        column_indices,
        rows,
    }
}

fn matches(record: &Record, columns: &[usize], needle: &str) -> bool {
    columns
        .iter()
        .filter_map(|&c| record.value(c))
        .any(|value| value.to_lowercase().contains(needle))
}
