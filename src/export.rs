// Self-contained HTML export of a figure

use crate::ir::Figure;
use crate::ExportOptions;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

/// Prefix of the download link handed to the presentation layer.
pub const DATA_URI_PREFIX: &str = "data:text/html;base64,";

const VIEWER_JS: &str = include_str!("../assets/viewer.js");

const DEFAULT_TITLE: &str = "3D Scatter Plot";

/// Serialize a figure into a standalone HTML document.
///
/// The figure JSON and the viewer script are inlined; the page loads nothing
/// from the network. Identical inputs produce identical bytes.
pub fn export(figure: &Figure, options: &ExportOptions) -> Result<Vec<u8>> {
    let json = serde_json::to_string(figure).context("Failed to serialize figure")?;
    let title = options
        .title
        .as_deref()
        .or(figure.layout.title.as_deref())
        .unwrap_or(DEFAULT_TITLE);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ margin: 0; font-family: sans-serif; background: #ffffff; }}
        #plot {{ display: block; cursor: grab; }}
        #tooltip {{ position: fixed; display: none; pointer-events: none; white-space: pre-line;
                   background: rgba(255, 255, 255, 0.95); border: 1px solid #888; padding: 4px 6px; font-size: 12px; }}
    </style>
</head>
<body>
    <canvas id="plot" width="{width}" height="{height}"></canvas>
    <div id="tooltip"></div>
    <script type="application/json" id="figure-data">{json}</script>
    <script>
{script}
    </script>
</body>
</html>
"#,
        title = escape_html(title),
        width = options.width,
        height = options.height,
        json = escape_script_json(&json),
        script = VIEWER_JS,
    );

    debug!(bytes = html.len(), traces = figure.traces.len(), "Exported figure");
    Ok(html.into_bytes())
}

/// Base64-encode a document as a `data:text/html` link target.
pub fn to_data_uri(document: &[u8]) -> String {
    format!("{DATA_URI_PREFIX}{}", STANDARD.encode(document))
}

/// Export and encode in one step.
pub fn export_href(figure: &Figure, options: &ExportOptions) -> Result<String> {
    let document = export(figure, options)?;
    Ok(to_data_uri(&document))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Markup characters only occur inside JSON strings, where \u escapes are valid
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile_figure, placeholder_figure};
    use crate::data::{Column, Dataset};
    use crate::ir::{EncodingAssignment, FigureSource, ResolvedRowSet};
    use crate::Style;

    fn sample_figure(x_name: &str) -> Figure {
        let data = Dataset::new(vec![
            Column::numeric(x_name, &[1.0, 2.0]),
            Column::numeric("b", &[3.0, 4.0]),
            Column::numeric("c", &[5.0, 6.0]),
        ])
        .unwrap();
        let rows = ResolvedRowSet {
            data,
            encoding: EncodingAssignment {
                x: x_name.into(),
                y: "b".into(),
                z: "c".into(),
                symbol: None,
                color: None,
                size: None,
            },
        };
        compile_figure(&rows, &Style::default(), None, FigureSource::Dataset)
    }

    fn html(figure: &Figure) -> String {
        String::from_utf8(export(figure, &ExportOptions::default()).unwrap()).unwrap()
    }

    #[test]
    fn test_export_is_self_contained() {
        let doc = html(&sample_figure("a"));
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(r#"id="figure-data""#));
        assert!(doc.contains(r#"width="1000" height="800""#));
        assert!(!doc.contains("<script src"));
        assert!(!doc.contains("http://"));
        assert!(!doc.contains("https://"));
    }

    #[test]
    fn test_export_is_deterministic() {
        let fig = sample_figure("a");
        let opts = ExportOptions::default();
        assert_eq!(export(&fig, &opts).unwrap(), export(&fig, &opts).unwrap());
    }

    #[test]
    fn test_column_names_cannot_close_script() {
        let doc = html(&sample_figure("</script><b>"));
        assert_eq!(doc.matches("</script>").count(), 2);
        assert!(doc.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn test_title_is_escaped() {
        let opts = ExportOptions { title: Some("a < b & \"c\"".into()), ..Default::default() };
        let doc = String::from_utf8(export(&placeholder_figure(), &opts).unwrap()).unwrap();
        assert!(doc.contains("<title>a &lt; b &amp; &quot;c&quot;</title>"));
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(to_data_uri(b"hi"), "data:text/html;base64,aGk=");
        let href = export_href(&sample_figure("a"), &ExportOptions::default()).unwrap();
        assert!(href.starts_with(DATA_URI_PREFIX));
        let payload = STANDARD.decode(&href[DATA_URI_PREFIX.len()..]).unwrap();
        assert!(String::from_utf8(payload).unwrap().contains("<canvas id=\"plot\""));
    }
}
