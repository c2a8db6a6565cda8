use crate::data::Dataset;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// One of the six bindable channel selection points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    X,
    Y,
    Z,
    Symbol,
    Color,
    Size,
}

impl Slot {
    pub const ALL: [Slot; 6] = [Slot::X, Slot::Y, Slot::Z, Slot::Symbol, Slot::Color, Slot::Size];

    pub fn key(&self) -> &'static str {
        match self {
            Slot::X => "x",
            Slot::Y => "y",
            Slot::Z => "z",
            Slot::Symbol => "symbol",
            Slot::Color => "color",
            Slot::Size => "size",
        }
    }

    pub fn is_axis(&self) -> bool {
        matches!(self, Slot::X | Slot::Y | Slot::Z)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Slot::X),
            "y" => Ok(Slot::Y),
            "z" => Ok(Slot::Z),
            "symbol" => Ok(Slot::Symbol),
            "color" | "colour" => Ok(Slot::Color),
            "size" => Ok(Slot::Size),
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no dataset is loaded")]
    NoDataset,
    #[error("column '{column}' is not an option for the {slot} slot")]
    NotAnOption { slot: Slot, column: String },
}

/// The column chosen for each slot, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub symbol: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl SelectionState {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slot_ref(slot).as_deref()
    }

    fn slot_ref(&self, slot: Slot) -> &Option<String> {
        match slot {
            Slot::X => &self.x,
            Slot::Y => &self.y,
            Slot::Z => &self.z,
            Slot::Symbol => &self.symbol,
            Slot::Color => &self.color,
            Slot::Size => &self.size,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::X => &mut self.x,
            Slot::Y => &mut self.y,
            Slot::Z => &mut self.z,
            Slot::Symbol => &mut self.symbol,
            Slot::Color => &mut self.color,
            Slot::Size => &mut self.size,
        }
    }

    /// The axis triple, if all three axes are bound.
    pub fn axes(&self) -> Option<(&str, &str, &str)> {
        Some((self.x.as_deref()?, self.y.as_deref()?, self.z.as_deref()?))
    }
}

/// Column names of the dataset in order; empty when no dataset is loaded.
pub fn available_columns(dataset: Option<&Dataset>) -> Vec<String> {
    dataset.map(Dataset::column_names).unwrap_or_default()
}

/// The options a slot offers given the current selections.
///
/// `y` excludes the `x` column and `z` excludes both; the optional channels
/// are never filtered. References to columns the dataset does not have are
/// treated as absent.
pub fn options_for(slot: Slot, dataset: Option<&Dataset>, selection: &SelectionState) -> Vec<String> {
    let Some(dataset) = dataset else {
        return Vec::new();
    };

    let live = |s: Slot| selection.get(s).filter(|name| dataset.has_column(name));
    let excluded: Vec<&str> = match slot {
        Slot::Y => live(Slot::X).into_iter().collect(),
        Slot::Z => live(Slot::X).into_iter().chain(live(Slot::Y)).collect(),
        _ => Vec::new(),
    };

    dataset
        .column_names()
        .into_iter()
        .filter(|name| !excluded.contains(&name.as_str()))
        .collect()
}

/// Bind `value` to `slot`, then reset dependent axis slots that are no longer valid.
///
/// Returns the slots cleared by the cascade.
pub fn apply_selection(
    dataset: Option<&Dataset>,
    selection: &mut SelectionState,
    slot: Slot,
    value: Option<String>,
) -> Result<Vec<Slot>, SelectionError> {
    if let Some(column) = &value {
        if dataset.is_none() {
            return Err(SelectionError::NoDataset);
        }
        if !options_for(slot, dataset, selection).contains(column) {
            return Err(SelectionError::NotAnOption { slot, column: column.clone() });
        }
    }

    *selection.slot_mut(slot) = value;
    Ok(revalidate(dataset, selection))
}

/// Clear every selection that no longer appears in its slot's options,
/// checking slots in order so that a reset of `y` widens `z`'s options first.
pub fn revalidate(dataset: Option<&Dataset>, selection: &mut SelectionState) -> Vec<Slot> {
    let mut cleared = Vec::new();
    for slot in Slot::ALL {
        let Some(current) = selection.get(slot).map(str::to_string) else {
            continue;
        };
        if !options_for(slot, dataset, selection).contains(&current) {
            debug!(%slot, column = %current, "Selection invalidated");
            *selection.slot_mut(slot) = None;
            cleared.push(slot);
        }
    }
    cleared
}
