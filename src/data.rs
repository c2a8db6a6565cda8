use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Marker substring pandas-style writers give to a saved positional index.
pub const INDEX_COLUMN_MARKER: &str = "Unnamed";

/// A single cell of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// A cell counts as missing when it carries no usable value, including NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text used for legend keys and categorical axes.
    pub fn label(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Missing => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self { name: name.into(), values }
    }

    pub fn numeric(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().map(|&v| Value::Number(v)).collect())
    }

    pub fn text(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, values.iter().map(|s| Value::Text(s.to_string())).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric unless some cell holds text. An all-missing column is numeric (all NaN).
    pub fn kind(&self) -> ColumnKind {
        if self.values.iter().any(|v| matches!(v, Value::Text(_))) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Numeric
        }
    }

    /// The column as floats with missing cells as NaN, or None for a categorical column.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        self.values
            .iter()
            .map(|v| match v {
                Value::Number(n) => Some(*n),
                Value::Missing => Some(f64::NAN),
                Value::Text(_) => None,
            })
            .collect()
    }
}

/// Ordered, uniquely named, row-aligned columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(anyhow!("Duplicate column name '{}'", column.name));
            }
            if column.len() != row_count {
                return Err(anyhow!(
                    "Column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    row_count
                ));
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Remove columns whose name marks a serialized positional index.
    /// Returns the names that were dropped.
    pub fn drop_index_columns(&mut self) -> Vec<String> {
        let (dropped, kept): (Vec<Column>, Vec<Column>) = std::mem::take(&mut self.columns)
            .into_iter()
            .partition(|c| c.name.contains(INDEX_COLUMN_MARKER));
        self.columns = kept;
        if self.columns.is_empty() {
            self.row_count = 0;
        }
        dropped.into_iter().map(|c| c.name).collect()
    }

    /// Keep only the rows for which `keep(row_index)` is true.
    pub fn filter_rows<F>(&self, keep: F) -> Dataset
    where
        F: Fn(usize) -> bool,
    {
        let rows: Vec<usize> = (0..self.row_count).filter(|&i| keep(i)).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), rows.iter().map(|&i| c.values[i].clone()).collect()))
            .collect();
        Dataset { columns, row_count: rows.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_rejects_ragged_columns() {
        let res = Dataset::new(vec![
            Column::numeric("a", &[1.0, 2.0]),
            Column::numeric("b", &[1.0]),
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_dataset_rejects_duplicate_names() {
        let res = Dataset::new(vec![
            Column::numeric("a", &[1.0]),
            Column::numeric("a", &[2.0]),
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_column_kind() {
        assert_eq!(Column::numeric("a", &[1.0, f64::NAN]).kind(), ColumnKind::Numeric);
        assert_eq!(Column::new("m", vec![Value::Missing]).kind(), ColumnKind::Numeric);
        assert_eq!(Column::text("s", &["x"]).kind(), ColumnKind::Categorical);
        assert!(Column::text("s", &["x"]).numeric_values().is_none());
    }

    #[test]
    fn test_drop_index_columns() {
        let mut ds = Dataset::new(vec![
            Column::numeric("Unnamed: 0", &[0.0, 1.0]),
            Column::numeric("a", &[1.0, 2.0]),
        ])
        .unwrap();
        let dropped = ds.drop_index_columns();
        assert_eq!(dropped, vec!["Unnamed: 0".to_string()]);
        assert_eq!(ds.column_names(), vec!["a".to_string()]);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_filter_rows() {
        let ds = Dataset::new(vec![
            Column::numeric("a", &[1.0, 2.0, 3.0]),
            Column::text("b", &["p", "q", "r"]),
        ])
        .unwrap();
        let filtered = ds.filter_rows(|i| i != 1);
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.column("b").unwrap().values[1], Value::Text("r".to_string()));
    }

    #[test]
    fn test_value_label() {
        assert_eq!(Value::Number(3.0).label(), "3");
        assert_eq!(Value::Number(2.5).label(), "2.5");
        assert_eq!(Value::Text("setosa".into()).label(), "setosa");
    }
}
