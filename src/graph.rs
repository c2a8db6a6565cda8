use crate::ir::{Figure, MarkerColor, MarkerSize};
use crate::palette;
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::prelude::*;

// 8192x8192 RGB
const MAX_PREVIEW_BYTES: usize = 8192 * 8192 * 3;

/// Render options for the static preview
#[derive(Debug, Clone, Copy)]
pub struct PreviewOptions {
    pub width: u32,
    pub height: u32,
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            yaw: 0.6,
            pitch: 0.3,
        }
    }
}

/// Render a figure as a PNG snapshot from a fixed camera angle.
///
/// The figure's z axis is drawn vertically. No text is rendered so the preview
/// works without system fonts.
pub fn render_preview(figure: &Figure, options: &PreviewOptions) -> Result<Vec<u8>> {
    if options.width == 0 || options.height == 0 {
        anyhow::bail!("Preview size must be non-zero (got {}x{})", options.width, options.height);
    }

    let len = (options.width as usize)
        .checked_mul(options.height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .filter(|&len| len <= MAX_PREVIEW_BYTES)
        .with_context(|| format!("Preview size {}x{} is too large", options.width, options.height))?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let scene = &figure.layout.scene;
        let (x0, x1) = scene.xaxis.range;
        let (y0, y1) = scene.yaxis.range;
        let (z0, z1) = scene.zaxis.range;

        // plotters' vertical axis is y, so swap y and z
        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .build_cartesian_3d(x0..x1, z0..z1, y0..y1)
            .context("Failed to build chart")?;

        let yaw = options.yaw;
        let pitch = options.pitch;
        chart.with_projection(|mut pb| {
            pb.yaw = yaw;
            pb.pitch = pitch;
            pb.scale = 0.8;
            pb.into_matrix()
        });

        chart
            .draw_series(box_edges((x0, x1), (z0, z1), (y0, y1)).into_iter().map(|edge| {
                PathElement::new(edge, RGBColor(200, 200, 210).stroke_width(1))
            }))
            .context("Failed to draw axes")?;

        let color_range = figure.layout.color_axis.as_ref().map(|c| (c.cmin, c.cmax));

        for trace in &figure.traces {
            let opacity = trace.marker.opacity;
            let hollow = trace.marker.symbol.ends_with("-open");
            let points = trace
                .x
                .iter()
                .zip(&trace.y)
                .zip(&trace.z)
                .enumerate()
                .filter(|(_, ((x, y), z))| x.is_finite() && y.is_finite() && z.is_finite())
                .map(|(i, ((&x, &y), &z))| {
                    let color = marker_color(&trace.marker.color, i, color_range).mix(opacity);
                    let style = if hollow { color.stroke_width(1) } else { color.filled() };
                    let radius = (marker_diameter(&trace.marker.size, i) / 2.0).max(1.0);
                    Circle::new((x, z, y), radius.round() as i32, style)
                })
                .collect::<Vec<_>>();

            chart
                .draw_series(points)
                .context("Failed to draw point series")?;
        }

        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, options.width, options.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn marker_diameter(size: &MarkerSize, i: usize) -> f64 {
    match size {
        MarkerSize::Fixed(d) => *d,
        MarkerSize::PerPoint(d) => d.get(i).copied().unwrap_or(0.0),
    }
}

fn marker_color(color: &MarkerColor, i: usize, range: Option<(f64, f64)>) -> RGBColor {
    match color {
        MarkerColor::Solid(hex) => {
            let (r, g, b) = palette::parse_hex(hex).unwrap_or((99, 110, 250));
            RGBColor(r, g, b)
        }
        MarkerColor::Scaled(values) => {
            let v = values.get(i).copied().unwrap_or(f64::NAN);
            let t = match range {
                Some((lo, hi)) if hi > lo => (v - lo) / (hi - lo),
                _ => 0.5,
            };
            let (r, g, b) = palette::sample_scale(t);
            RGBColor(r, g, b)
        }
    }
}

/// The twelve edges of the bounding box.
fn box_edges(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Vec<Vec<(f64, f64, f64)>> {
    let corner = |i: usize| {
        (
            if i & 1 == 0 { x.0 } else { x.1 },
            if i & 2 == 0 { y.0 } else { y.1 },
            if i & 4 == 0 { z.0 } else { z.1 },
        )
    };
    let mut edges = Vec::with_capacity(12);
    for a in 0..8usize {
        for bit in [1usize, 2, 4] {
            if a & bit == 0 {
                edges.push(vec![corner(a), corner(a | bit)]);
            }
        }
    }
    edges
}
