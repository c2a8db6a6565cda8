use anyhow::{Context, Result};
use clap::Parser;
use hyperscatter::export::export;
use hyperscatter::graph::{render_preview, PreviewOptions};
use hyperscatter::parser::parse_encoding;
use hyperscatter::registry::Slot;
use hyperscatter::runtime::Session;
use hyperscatter::{ExportOptions, Style};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "hyperscatter")]
#[command(about = "Bind dataset columns to a 3-D scatter plot and export it as a standalone HTML page", long_about = None)]
struct Args {
    /// Dataset to load (.csv or .xlsx)
    file: Option<PathBuf>,

    /// Channel bindings (e.g. 'x: a, y: b, z: c, size: "Body Mass (g)"')
    encoding: Option<String>,

    /// Print the options available to every channel and exit
    #[arg(long)]
    list_columns: bool,

    /// Show the bundled example when nothing else can be plotted
    #[arg(long)]
    example: bool,

    /// Write the HTML document here (a directory gets the configured file name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the download link, or None when there is nothing to download
    #[arg(long)]
    data_uri: bool,

    /// Write a static PNG preview of the figure
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Marker style as JSON (e.g. '{"opacity": 0.5}')
    #[arg(long)]
    style: Option<PathBuf>,

    /// Export size and naming as JSON
    #[arg(long)]
    export_options: Option<PathBuf>,

    /// Marker opacity, 0 to 1
    #[arg(long)]
    opacity: Option<f64>,

    /// Largest marker diameter, 0 to 50
    #[arg(long)]
    max_marker_size: Option<f64>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut style: Style = match &args.style {
        Some(path) => read_json(path).context("Failed to load style")?,
        None => Style::default(),
    };
    if let Some(opacity) = args.opacity {
        style.opacity = opacity;
    }
    if let Some(max) = args.max_marker_size {
        style.max_marker_size = max;
    }
    let export_options: ExportOptions = match &args.export_options {
        Some(path) => read_json(path).context("Failed to load export options")?,
        None => ExportOptions::default(),
    };

    let mut session = Session::new(style).with_export_options(export_options);

    if let Some(path) = &args.file {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match session.upload(&name, modified_secs(path), &bytes) {
            Ok(summary) => eprintln!("{}", summary.info_line()),
            Err(e) => {
                eprintln!("{}", e.user_message());
                std::process::exit(1);
            }
        }
    }

    if args.example {
        session.toggle_example();
    }

    if let Some(text) = &args.encoding {
        let expr = match parse_encoding(text) {
            Ok(expr) => expr,
            Err(e) => {
                eprintln!("Parse error: {e}");
                std::process::exit(1);
            }
        };
        for (slot, column) in expr.in_slot_order() {
            match session.select(slot, Some(column)) {
                Ok(cleared) if !cleared.is_empty() => {
                    warn!(%slot, ?cleared, "Binding reset dependent channels");
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Cannot bind {slot} to '{column}': {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    if args.list_columns {
        for slot in Slot::ALL {
            println!("{}: {}", slot, session.options(slot).join(", "));
        }
        return Ok(());
    }

    let rendered = session.recompute().context("Failed to build figure")?;
    info!(
        source = ?rendered.figure.source,
        traces = rendered.figure.traces.len(),
        points = rendered.figure.point_count(),
        "Figure ready"
    );
    eprintln!("Example button: {}", session.example_label());

    if let Some(path) = &args.output {
        if rendered.href.is_none() {
            eprintln!("Nothing to export: bind x, y and z to columns of the loaded dataset");
            std::process::exit(1);
        }
        let path = if path.is_dir() {
            path.join(&session.export_options().file_name)
        } else {
            path.clone()
        };
        let document = export(&rendered.figure, session.export_options())?;
        fs::write(&path, document)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }

    if args.data_uri {
        let clicks = session.record_download();
        debug!(clicks, "Download requested");
        println!("{}", rendered.href.as_deref().unwrap_or("None"));
    }

    if let Some(path) = &args.preview {
        let options = PreviewOptions {
            width: session.export_options().width,
            height: session.export_options().height,
            ..Default::default()
        };
        let png = render_preview(&rendered.figure, &options).context("Failed to render preview")?;
        fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn modified_secs(path: &Path) -> i64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
