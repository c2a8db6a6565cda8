use crate::data::{Column, Dataset, Value};
use crate::ir::{EncodingAssignment, ResolvedRowSet, SizeEncoding};
use crate::normalize::normalize_column;
use crate::registry::{SelectionState, Slot};
use tracing::{debug, info, warn};

/// Name given to the derived marker size column.
pub const SIZE_COLUMN: &str = "marker_size";

/// Resolve a selection against a dataset into plot-ready rows.
///
/// Returns `None` (an empty result) when an axis is unbound or no row has a
/// value in every retained column.
pub fn resolve(dataset: &Dataset, selection: &SelectionState) -> Option<ResolvedRowSet> {
    // 1. Require the axis triple; stale references count as unbound
    let live = |slot: Slot| {
        selection
            .get(slot)
            .filter(|name| dataset.has_column(name))
            .map(str::to_string)
    };
    let x = live(Slot::X)?;
    let y = live(Slot::Y)?;
    let z = live(Slot::Z)?;
    let symbol = live(Slot::Symbol);
    let color = live(Slot::Color);
    let size_source = live(Slot::Size);

    // 2-3. Project onto the axes, then merge optional channels not already present
    let mut columns: Vec<Column> = Vec::new();
    let mut merge = |name: &str| {
        if columns.iter().any(|c| c.name == name) {
            return;
        }
        if let Some(column) = dataset.column(name) {
            columns.push(column.clone());
        }
    };
    for name in [&x, &y, &z] {
        merge(name.as_str());
    }
    for name in [&symbol, &color, &size_source].into_iter().flatten() {
        merge(name.as_str());
    }

    // 4. Replace the size column with its normalized form
    let mut size = None;
    if let Some(source) = size_source {
        let shared = [&x, &y, &z].contains(&&source)
            || symbol.as_ref() == Some(&source)
            || color.as_ref() == Some(&source);
        if !shared {
            columns.retain(|c| c.name != source);
        }

        let normalized = dataset.column(&source).map(normalize_column);
        match normalized {
            Some(Ok(values)) => {
                let name = derived_name(SIZE_COLUMN, &columns);
                let cells = values
                    .into_iter()
                    .map(|v| if v.is_finite() { Value::Number(v) } else { Value::Missing })
                    .collect();
                columns.push(Column::new(name.clone(), cells));
                size = Some(SizeEncoding { source, column: name });
            }
            Some(Err(e)) => {
                info!(column = %source, reason = %e, "Size channel inactive");
            }
            None => {}
        }
    }

    let projected = match Dataset::new(columns) {
        Ok(d) => d,
        Err(e) => {
            warn!("Projection failed: {e}");
            return None;
        }
    };

    // 5. Drop rows with a missing value in any retained column
    let data = projected.filter_rows(|row| projected.columns().iter().all(|c| !c.values[row].is_missing()));
    debug!(
        before = projected.row_count(),
        after = data.row_count(),
        "Dropped rows with missing values"
    );

    // 6. Nothing left to plot
    if data.row_count() == 0 {
        return None;
    }

    Some(ResolvedRowSet {
        data,
        encoding: EncodingAssignment { x, y, z, symbol, color, size },
    })
}

/// `base`, or `base_1`, `base_2`, ... if a column already uses the name.
fn derived_name(base: &str, columns: &[Column]) -> String {
    let taken = |n: &str| columns.iter().any(|c| c.name == n);
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}_{i}"))
        .find(|n| !taken(n))
        .unwrap_or_else(|| base.to_string())
}
