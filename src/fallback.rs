// Bundled demonstration dataset shown when the user has nothing to plot

use crate::compiler::compile_figure;
use crate::data::Dataset;
use crate::ingest::{ingest, IngestError};
use crate::ir::{EncodingAssignment, Figure, FigureSource, ResolvedRowSet, SizeEncoding};
use crate::Style;

const IRIS_CSV: &str = include_str!("../assets/iris.csv");

pub const EXAMPLE_TITLE: &str = "Example Plot using \"Iris\" Dataset";

/// Fisher's Iris measurements, 150 rows.
pub fn example_dataset() -> Result<Dataset, IngestError> {
    ingest("iris.csv", IRIS_CSV.as_bytes())
}

/// Three measurement axes, petal length on both colour and size, species as symbol.
pub fn example_encoding() -> EncodingAssignment {
    EncodingAssignment {
        x: "sepal_length".to_string(),
        y: "sepal_width".to_string(),
        z: "petal_width".to_string(),
        symbol: Some("species".to_string()),
        color: Some("petal_length".to_string()),
        size: Some(SizeEncoding {
            source: "petal_length".to_string(),
            column: "petal_length".to_string(),
        }),
    }
}

pub fn example_rows() -> Result<ResolvedRowSet, IngestError> {
    Ok(ResolvedRowSet {
        data: example_dataset()?,
        encoding: example_encoding(),
    })
}

pub fn example_figure(style: &Style) -> Result<Figure, IngestError> {
    let rows = example_rows()?;
    Ok(compile_figure(
        &rows,
        style,
        Some(EXAMPLE_TITLE.to_string()),
        FigureSource::Example,
    ))
}
