use crate::data::{ColumnKind, Dataset};
use crate::ir::{
    Axis, ColorAxis, ColorBar, Figure, FigureSource, Layout, Margin, Marker, MarkerColor, MarkerSize,
    ResolvedRowSet, Scene, Trace,
};
use crate::palette;
use crate::scale::{axis_range, categorical_range, value_range};
use crate::transform::{axis_data, group_rows, AxisData};
use crate::Style;
use tracing::debug;

pub const MARGIN: Margin = Margin { l: 40, r: 30, b: 30, t: 40 };

/// Compile resolved rows into a figure: one trace per symbol/colour group.
pub fn compile_figure(
    rows: &ResolvedRowSet,
    style: &Style,
    title: Option<String>,
    source: FigureSource,
) -> Figure {
    let style = style.clamped();
    let data = &rows.data;
    let enc = &rows.encoding;

    let x = column_axis(data, &enc.x);
    let y = column_axis(data, &enc.y);
    let z = column_axis(data, &enc.z);

    // Marker diameters, area-proportional to the size column
    let sizes: Option<Vec<f64>> = enc
        .size_column()
        .and_then(|name| data.column(name))
        .and_then(|c| c.numeric_values())
        .and_then(|values| {
            let (_, max) = value_range(&values)?;
            if max <= 0.0 {
                return None;
            }
            Some(
                values
                    .iter()
                    .map(|v| style.max_marker_size * (v.max(0.0) / max).sqrt())
                    .collect(),
            )
        });

    // Continuous colour when the colour column is numeric
    let color_values: Option<(String, Vec<f64>)> = enc
        .color
        .as_ref()
        .and_then(|name| data.column(name))
        .filter(|c| c.kind() == ColumnKind::Numeric)
        .and_then(|c| Some((c.name.clone(), c.numeric_values()?)));

    let color_axis = color_values.as_ref().and_then(|(name, values)| {
        let (cmin, cmax) = value_range(values)?;
        Some(ColorAxis {
            title: name.clone(),
            cmin,
            cmax,
            color_scale: palette::color_scale(),
            color_bar: ColorBar {
                x: 0.0,
                y: 1.0,
                y_anchor: "top".to_string(),
                ticks: "outside".to_string(),
            },
        })
    });

    let hover = hover_text(rows);

    let groups = group_rows(rows);
    let traces = groups
        .into_iter()
        .map(|group| {
            let pick = |values: &[f64]| group.rows.iter().map(|&r| values[r]).collect::<Vec<f64>>();

            let size = match &sizes {
                Some(s) => MarkerSize::PerPoint(pick(s.as_slice())),
                None => MarkerSize::Fixed(style.fixed_marker_size()),
            };
            let color = match (&color_values, group.color_index) {
                (Some((_, values)), _) => MarkerColor::Scaled(pick(values.as_slice())),
                (None, Some(i)) => MarkerColor::Solid(palette::color_for(i).to_string()),
                (None, None) => MarkerColor::Solid(palette::color_for(0).to_string()),
            };

            Trace {
                show_legend: group.name.is_some(),
                name: group.name.unwrap_or_default(),
                x: pick(x.values.as_slice()),
                y: pick(y.values.as_slice()),
                z: pick(z.values.as_slice()),
                text: group.rows.iter().map(|&r| hover[r].clone()).collect(),
                marker: Marker {
                    symbol: palette::symbol_for(group.symbol_index).to_string(),
                    opacity: style.opacity,
                    size,
                    color,
                },
            }
        })
        .collect::<Vec<_>>();

    let legend_title = {
        let mut parts = Vec::new();
        if let Some(s) = &enc.symbol {
            parts.push(s.clone());
        }
        if let Some(c) = enc.color.as_ref().filter(|_| color_values.is_none()) {
            if !parts.contains(c) {
                parts.push(c.clone());
            }
        }
        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    };

    debug!(traces = traces.len(), points = rows.row_count(), "Compiled figure");

    Figure {
        traces,
        layout: Layout {
            title,
            margin: MARGIN,
            scene: Scene {
                xaxis: axis(&enc.x, x),
                yaxis: axis(&enc.y, y),
                zaxis: axis(&enc.z, z),
            },
            color_axis,
            legend_title,
        },
        source,
    }
}

/// An empty figure with no data series.
pub fn placeholder_figure() -> Figure {
    let empty = |title: &str| Axis {
        title: title.to_string(),
        range: axis_range(&[]),
        categories: None,
    };
    Figure {
        traces: Vec::new(),
        layout: Layout {
            title: None,
            margin: MARGIN,
            scene: Scene { xaxis: empty("x"), yaxis: empty("y"), zaxis: empty("z") },
            color_axis: None,
            legend_title: None,
        },
        source: FigureSource::Placeholder,
    }
}

fn column_axis(data: &Dataset, name: &str) -> AxisData {
    match data.column(name) {
        Some(column) => axis_data(column),
        None => AxisData { values: vec![f64::NAN; data.row_count()], categories: None },
    }
}

fn axis(title: &str, data: AxisData) -> Axis {
    let range = match &data.categories {
        Some(c) => categorical_range(c.len()),
        None => axis_range(&data.values),
    };
    Axis { title: title.to_string(), range, categories: data.categories }
}

/// One hover line per bound channel, for every row.
fn hover_text(rows: &ResolvedRowSet) -> Vec<String> {
    let enc = &rows.encoding;
    let mut channels: Vec<&str> = vec![enc.x.as_str(), enc.y.as_str(), enc.z.as_str()];
    for name in [&enc.symbol, &enc.color].into_iter().flatten() {
        if !channels.contains(&name.as_str()) {
            channels.push(name);
        }
    }
    if let Some(size) = &enc.size {
        if !channels.contains(&size.source.as_str()) && rows.data.has_column(&size.source) {
            channels.push(&size.source);
        }
    }

    let columns: Vec<_> = channels.iter().filter_map(|name| rows.data.column(name)).collect();
    (0..rows.row_count())
        .map(|r| {
            columns
                .iter()
                .map(|c| format!("{}={}", c.name, c.values[r].label()))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}
