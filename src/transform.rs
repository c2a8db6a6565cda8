use crate::data::{Column, ColumnKind, Value};
use crate::ir::ResolvedRowSet;

/// Axis coordinates for one column: raw numbers, or category indices.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisData {
    pub values: Vec<f64>,
    pub categories: Option<Vec<String>>,
}

/// Convert a column into plottable coordinates.
/// Categorical columns map each distinct label to its first-appearance index.
pub fn axis_data(column: &Column) -> AxisData {
    match column.kind() {
        ColumnKind::Numeric => AxisData {
            values: column.values.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect(),
            categories: None,
        },
        ColumnKind::Categorical => {
            let labels: Vec<String> = column.values.iter().map(Value::label).collect();
            let categories = distinct_in_order(&labels);
            let values = labels
                .iter()
                .map(|l| categories.iter().position(|c| c == l).map(|i| i as f64).unwrap_or(f64::NAN))
                .collect();
            AxisData { values, categories: Some(categories) }
        }
    }
}

/// Rows sharing one symbol/colour combination, rendered as one trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceGroup {
    /// Legend entry; None when nothing splits the rows.
    pub name: Option<String>,
    pub symbol_index: usize,
    /// Index into the discrete palette when colour is categorical.
    pub color_index: Option<usize>,
    pub rows: Vec<usize>,
}

/// Split resolved rows by the symbol column and, when categorical, the colour column.
/// Groups appear in first-appearance order.
pub fn group_rows(rows: &ResolvedRowSet) -> Vec<TraceGroup> {
    let data = &rows.data;
    let symbol_labels = rows
        .encoding
        .symbol
        .as_deref()
        .and_then(|name| data.column(name))
        .map(|c| c.values.iter().map(Value::label).collect::<Vec<_>>());
    let color_labels = rows
        .encoding
        .color
        .as_deref()
        .and_then(|name| data.column(name))
        .filter(|c| c.kind() == ColumnKind::Categorical)
        .map(|c| c.values.iter().map(Value::label).collect::<Vec<_>>());

    if symbol_labels.is_none() && color_labels.is_none() {
        return vec![TraceGroup {
            name: None,
            symbol_index: 0,
            color_index: None,
            rows: (0..data.row_count()).collect(),
        }];
    }

    let symbol_order = symbol_labels.as_deref().map(distinct_in_order).unwrap_or_default();
    let color_order = color_labels.as_deref().map(distinct_in_order).unwrap_or_default();

    let mut groups: Vec<(Option<String>, Option<String>, TraceGroup)> = Vec::new();
    for row in 0..data.row_count() {
        let symbol = symbol_labels.as_ref().map(|l| l[row].clone());
        let color = color_labels.as_ref().map(|l| l[row].clone());

        if let Some((_, _, group)) = groups.iter_mut().find(|(s, c, _)| *s == symbol && *c == color) {
            group.rows.push(row);
            continue;
        }

        let name = [symbol.as_deref(), color.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        let symbol_index = symbol
            .as_ref()
            .and_then(|s| symbol_order.iter().position(|o| o == s))
            .unwrap_or(0);
        let color_index = color.as_ref().and_then(|c| color_order.iter().position(|o| o == c));

        groups.push((
            symbol.clone(),
            color.clone(),
            TraceGroup { name: Some(name), symbol_index, color_index, rows: vec![row] },
        ));
    }

    groups.into_iter().map(|(_, _, g)| g).collect()
}

fn distinct_in_order(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        if !out.contains(label) {
            out.push(label.clone());
        }
    }
    out
}
