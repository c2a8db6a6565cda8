// Marker symbols and colours for 3-D scatter traces

/// Symbols available for 3-D markers, cycled per symbol group.
pub const SYMBOLS_3D: [&str; 8] = [
    "circle",
    "diamond",
    "square",
    "x",
    "cross",
    "circle-open",
    "diamond-open",
    "square-open",
];

/// Discrete colours, cycled per categorical colour group.
pub const QUALITATIVE: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A",
    "#19d3f3", "#FF6692", "#B6E880", "#FF97FF", "#FECB52",
];

/// Continuous colour scale (plasma), evenly spaced stops.
pub const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786",
    "#d8576b", "#ed7953", "#fb9f3a", "#fdca26", "#f0f921",
];

pub fn symbol_for(index: usize) -> &'static str {
    SYMBOLS_3D[index % SYMBOLS_3D.len()]
}

pub fn color_for(index: usize) -> &'static str {
    QUALITATIVE[index % QUALITATIVE.len()]
}

/// The continuous scale as `(position, colour)` stops over [0, 1].
pub fn color_scale() -> Vec<(f64, String)> {
    let last = (PLASMA.len() - 1) as f64;
    PLASMA
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64 / last, c.to_string()))
        .collect()
}

/// Colour at position `t` in [0, 1] along the continuous scale.
pub fn sample_scale(t: f64) -> (u8, u8, u8) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let last = PLASMA.len() - 1;
    let pos = t * last as f64;
    let lo = (pos.floor() as usize).min(last);
    let hi = (lo + 1).min(last);
    let frac = pos - lo as f64;

    let (r0, g0, b0) = parse_hex(PLASMA[lo]).unwrap_or((0, 0, 0));
    let (r1, g1, b1) = parse_hex(PLASMA[hi]).unwrap_or((0, 0, 0));
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    (mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// Parse `#rrggbb` (or `#rgb`).
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some((r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}
