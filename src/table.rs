use std::sync::Arc;

/// One row of a sheet. Keys are shared with every other record of the same
/// dataset and keep the header order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    pub(crate) fn new(columns: Arc<[String]>, mut values: Vec<String>) -> Self {
        values.resize(columns.len(), String::new());
        Self { columns, values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx].as_str())
    }

    /// Value of the column at `idx` in header order.
    pub fn value(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }
}

/// Records of one csv payload, in source row order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Arc<[String]>,
    records: Vec<Record>,
}

impl Dataset {
    pub(crate) fn new(columns: Arc<[String]>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Build a dataset from positional rows. Blank rows are dropped.
    pub fn from_rows<C, R>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator,
        <R::Item as IntoIterator>::Item: Into<String>,
    {
        let columns: Arc<[String]> = columns.into_iter().map(Into::into).collect();
        let records = rows
            .into_iter()
            .map(|row| Record::new(columns.clone(), row.into_iter().map(Into::into).collect()))
            .filter(|r| !r.is_blank())
            .collect();
        Self::new(columns, records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Widest value per column, header included, in characters.
    pub fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                self.records
                    .iter()
                    .filter_map(|r| r.value(idx))
                    .map(|v| v.chars().count())
                    .fold(name.chars().count(), usize::max)
            })
            .collect()
    }
}
