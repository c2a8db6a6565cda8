use hyperscatter::compiler::placeholder_figure;
use hyperscatter::export::DATA_URI_PREFIX;
use hyperscatter::ingest::{ingest, USER_ERROR_MESSAGE};
use hyperscatter::ir::{FigureSource, MarkerColor, MarkerSize};
use hyperscatter::registry::{options_for, SelectionState, Slot};
use hyperscatter::resolve::resolve;
use hyperscatter::runtime::Session;
use hyperscatter::Style;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Helper to load a fixture into a fresh session
fn session_with(fixture: &str) -> Session {
    let bytes = fs::read(Path::new("test").join(fixture)).expect("Failed to read fixture");
    let mut session = Session::new(Style::default());
    session.upload(fixture, 0, &bytes).expect("Failed to upload fixture");
    session
}

fn bind_axes(session: &mut Session, x: &str, y: &str, z: &str) {
    session.select(Slot::X, Some(x)).unwrap();
    session.select(Slot::Y, Some(y)).unwrap();
    session.select(Slot::Z, Some(z)).unwrap();
}

/// Helper to run the hyperscatter binary
fn run_hyperscatter(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hyperscatter"))
        .args(args)
        .output()
        .expect("Failed to spawn hyperscatter")
}

fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

#[test]
fn test_end_to_end_basic_csv() {
    let mut session = session_with("basic.csv");
    bind_axes(&mut session, "a", "b", "c");

    let rendered = session.recompute().unwrap();
    assert_eq!(rendered.figure.source, FigureSource::Dataset);
    assert_eq!(rendered.figure.traces.len(), 1);
    assert_eq!(rendered.figure.traces[0].x.len(), 5);
    assert_eq!(rendered.figure.point_count(), 5);
    let href = rendered.href.expect("expected a download link");
    assert!(href.starts_with("data:text/html;base64,"));
    assert!(href.starts_with(DATA_URI_PREFIX));
}

#[test]
fn test_end_to_end_xlsx() {
    let mut session = session_with("population.xlsx");
    assert_eq!(session.summary().unwrap().columns, vec!["a", "pop", "g"]);
    session.select(Slot::X, Some("a")).unwrap();
    session.select(Slot::Y, Some("pop")).unwrap();
    session.select(Slot::Z, Some("g")).unwrap();
    session.select(Slot::Size, Some("pop")).unwrap();

    let rendered = session.recompute().unwrap();
    assert_eq!(rendered.figure.source, FigureSource::Dataset);
    assert_eq!(rendered.figure.point_count(), 3);
    assert!(rendered.href.is_some());
}

#[test]
fn test_all_nan_size_uses_fixed_size() {
    let mut session = session_with("nan_size.csv");
    bind_axes(&mut session, "a", "b", "c");
    session.select(Slot::Size, Some("empty")).unwrap();

    let rendered = session.recompute().unwrap();
    assert_eq!(rendered.figure.point_count(), 5);
    let expected = Style::default().max_marker_size / 3.6;
    assert_eq!(rendered.figure.traces[0].marker.size, MarkerSize::Fixed(expected));
    assert!(rendered.href.is_some());
}

#[test]
fn test_example_toggle_without_dataset() {
    let mut session = Session::new(Style::default());
    session.toggle_example();

    let rendered = session.recompute().unwrap();
    assert_eq!(rendered.figure.source, FigureSource::Example);
    assert_eq!(rendered.figure.point_count(), 150);
    assert_eq!(rendered.href, None);
}

#[test]
fn test_no_common_rows_falls_back_or_blanks() {
    let mut session = session_with("disjoint.csv");
    bind_axes(&mut session, "a", "b", "c");

    let blank = session.recompute().unwrap();
    assert_eq!(blank.figure, placeholder_figure());
    assert!(blank.figure.traces.is_empty());
    assert_eq!(blank.href, None);

    session.toggle_example();
    let example = session.recompute().unwrap();
    assert_eq!(example.figure.source, FigureSource::Example);
    assert_eq!(example.href, None);
}

#[test]
fn test_unbound_axes_resolve_empty() {
    let ds = ingest("basic.csv", &fs::read("test/basic.csv").unwrap()).unwrap();
    assert!(resolve(&ds, &SelectionState::default()).is_none());
}

#[test]
fn test_z_options_cardinality() {
    let ds = ingest("basic.csv", &fs::read("test/basic.csv").unwrap()).unwrap();
    let n = ds.column_count();
    let z = |x: Option<&str>, y: Option<&str>| {
        let sel = SelectionState {
            x: x.map(String::from),
            y: y.map(String::from),
            ..Default::default()
        };
        options_for(Slot::Z, Some(&ds), &sel)
    };

    assert_eq!(z(None, None).len(), n);
    assert_eq!(z(Some("a"), None).len(), n - 1);
    assert_eq!(z(Some("a"), Some("a")).len(), n - 1);
    let both = z(Some("a"), Some("b"));
    assert_eq!(both.len(), n - 2);
    assert!(!both.contains(&"a".to_string()));
    assert!(!both.contains(&"b".to_string()));
}

#[test]
fn test_penguins_all_channels() {
    let mut session = session_with("penguins.csv");
    let summary = session.summary().unwrap();
    assert!(!summary.columns.iter().any(|c| c.contains("Unnamed")));
    assert_eq!(summary.row_count, 8);

    bind_axes(&mut session, "bill_length_mm", "bill_depth_mm", "flipper_length_mm");
    session.select(Slot::Symbol, Some("species")).unwrap();
    session.select(Slot::Color, Some("island")).unwrap();
    session.select(Slot::Size, Some("Body Mass (g)")).unwrap();

    let fig = session.recompute().unwrap().figure;
    assert_eq!(fig.point_count(), 7);
    let names: Vec<_> = fig.traces.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Adelie, Torgersen", "Adelie, Dream", "Chinstrap, Dream", "Gentoo, Biscoe"]
    );
    assert_eq!(fig.traces[2].marker.symbol, "diamond");
    assert!(matches!(fig.traces[0].marker.size, MarkerSize::PerPoint(_)));
    assert!(matches!(fig.traces[0].marker.color, MarkerColor::Solid(_)));
    assert!(fig.layout.color_axis.is_none());
}

#[test]
fn test_penguins_numeric_color_scale() {
    let mut session = session_with("penguins.csv");
    bind_axes(&mut session, "bill_length_mm", "bill_depth_mm", "flipper_length_mm");
    session.select(Slot::Color, Some("Body Mass (g)")).unwrap();

    let fig = session.recompute().unwrap().figure;
    let axis = fig.layout.color_axis.expect("expected a colour axis");
    assert_eq!((axis.cmin, axis.cmax), (3450.0, 5700.0));
    assert_eq!(fig.traces.len(), 1);
}

#[test]
fn test_cli_writes_html_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_hyperscatter(&[
        "test/basic.csv",
        "x: a, y: b, z: c",
        "-o",
        dir.path().to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("File Uploaded: \"basic.csv\" from: "));

    let html = fs::read_to_string(dir.path().join("plotly_graph.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("figure-data"));
}

#[test]
fn test_cli_data_uri() {
    let out = run_hyperscatter(&["test/basic.csv", "aes(x: a, y: b, z: c)", "--data-uri"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.trim().starts_with("data:text/html;base64,"));
}

#[test]
fn test_cli_data_uri_matches_written_document() {
    use base64::Engine as _;

    let dir = tempfile::tempdir().unwrap();
    let out = run_hyperscatter(&[
        "test/population.xlsx",
        "x: a, y: pop, z: g",
        "-o",
        dir.path().to_str().unwrap(),
        "--data-uri",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    let payload = stdout.trim().strip_prefix(DATA_URI_PREFIX).expect("expected a data URI");
    let decoded = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();
    assert_eq!(decoded, fs::read(dir.path().join("plotly_graph.html")).unwrap());
}

#[test]
fn test_cli_example_has_no_download() {
    let out = run_hyperscatter(&["--example", "--data-uri"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "None");
    assert!(String::from_utf8_lossy(&out.stderr).contains("Toggle Example Off"));
}

#[test]
fn test_cli_list_columns_excludes_axes() {
    let out = run_hyperscatter(&["test/penguins.csv", "x: species, y: island", "--list-columns"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let z_line = stdout.lines().find(|l| l.starts_with("z: ")).unwrap();
    assert_eq!(
        z_line,
        "z: bill_length_mm, bill_depth_mm, flipper_length_mm, Body Mass (g), sex"
    );
    let y_line = stdout.lines().find(|l| l.starts_with("y: ")).unwrap();
    assert!(!y_line.contains("species"));
    let size_line = stdout.lines().find(|l| l.starts_with("size: ")).unwrap();
    assert!(size_line.contains("species"));
}

#[test]
fn test_cli_rejects_repeated_axis_column() {
    let out = run_hyperscatter(&["test/basic.csv", "x: a, y: a, z: c"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Cannot bind y"));
}

#[test]
fn test_cli_unsupported_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

    let out = run_hyperscatter(&[path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains(USER_ERROR_MESSAGE));
}

#[test]
fn test_cli_nothing_to_export() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_hyperscatter(&["test/disjoint.csv", "x: a, y: b, z: c", "-o", dir.path().to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(!dir.path().join("plotly_graph.html").exists());
}

#[test]
fn test_cli_preview_png() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("preview.png");
    let out = run_hyperscatter(&[
        "test/penguins.csv",
        "x: bill_length_mm, y: bill_depth_mm, z: flipper_length_mm, symbol: species",
        "--preview",
        png.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(is_valid_png(&fs::read(&png).unwrap()));
}

#[test]
fn test_cli_style_file() {
    let dir = tempfile::tempdir().unwrap();
    let style = dir.path().join("style.json");
    fs::write(&style, r#"{"opacity": 0.25}"#).unwrap();
    let out = run_hyperscatter(&[
        "test/basic.csv",
        "x: a, y: b, z: c",
        "--style",
        style.to_str().unwrap(),
        "-o",
        dir.path().to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let html = fs::read_to_string(dir.path().join("plotly_graph.html")).unwrap();
    assert!(html.contains(r#""opacity":0.25"#));
}
