// Session state and the recompute pipeline

use crate::compiler::{compile_figure, placeholder_figure};
use crate::data::Dataset;
use crate::export::export_href;
use crate::fallback::example_figure;
use crate::ingest::{ingest, IngestError};
use crate::ir::{Figure, FigureSource};
use crate::registry::{self, SelectionError, SelectionState, Slot};
use crate::resolve::resolve;
use crate::{ExportOptions, Style};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use tracing::{debug, info, warn};

pub const TOGGLE_ON_LABEL: &str = "Toggle Example On";
pub const TOGGLE_OFF_LABEL: &str = "Toggle Example Off";

/// What the presentation layer shows about the last successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSummary {
    pub filename: String,
    /// Seconds since the Unix epoch.
    pub last_modified: i64,
    pub columns: Vec<String>,
    pub row_count: usize,
}

impl UploadSummary {
    /// `File Uploaded: "<name>" from: <local time>`
    pub fn info_line(&self) -> String {
        let when = DateTime::<Utc>::from_timestamp(self.last_modified, 0)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.last_modified.to_string());
        format!("File Uploaded: \"{}\" from: {}", self.filename, when)
    }
}

/// The result of one recomputation pass.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub figure: Figure,
    /// `data:text/html;base64,...`, or None when there is nothing to download.
    pub href: Option<String>,
}

/// Build the figure for the current state.
///
/// Real data wins; otherwise the example is shown when the toggle is on, or an
/// empty placeholder when it is off. Only figures of uploaded data are exported.
pub fn recompute(
    dataset: Option<&Dataset>,
    selection: &SelectionState,
    style: &Style,
    show_example: bool,
    options: &ExportOptions,
) -> Result<Rendered> {
    if let Some(rows) = dataset.and_then(|d| resolve(d, selection)) {
        let figure = compile_figure(&rows, style, None, FigureSource::Dataset);
        let href = export_href(&figure, options).context("Failed to export figure")?;
        return Ok(Rendered { figure, href: Some(href) });
    }

    if show_example {
        info!("No plottable rows, showing example dataset");
        let figure = example_figure(style).context("Failed to load example dataset")?;
        return Ok(Rendered { figure, href: None });
    }

    debug!("No plottable rows, showing placeholder");
    Ok(Rendered { figure: placeholder_figure(), href: None })
}

/// One user's dataset, selections and settings.
#[derive(Debug, Clone, Default)]
pub struct Session {
    dataset: Option<Dataset>,
    summary: Option<UploadSummary>,
    selection: SelectionState,
    style: Style,
    export_options: ExportOptions,
    show_example: bool,
    download_requests: u32,
}

impl Session {
    pub fn new(style: Style) -> Self {
        Self { style: style.clamped(), ..Default::default() }
    }

    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn summary(&self) -> Option<&UploadSummary> {
        self.summary.as_ref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn export_options(&self) -> &ExportOptions {
        &self.export_options
    }

    /// Load an uploaded file, replacing the current dataset.
    ///
    /// An unsupported extension leaves the session untouched. Malformed
    /// content unloads the dataset and clears every selection.
    pub fn upload(
        &mut self,
        filename: &str,
        last_modified: i64,
        bytes: &[u8],
    ) -> Result<&UploadSummary, IngestError> {
        match ingest(filename, bytes) {
            Ok(dataset) => {
                let summary = UploadSummary {
                    filename: filename.to_string(),
                    last_modified,
                    columns: dataset.column_names(),
                    row_count: dataset.row_count(),
                };
                self.dataset = Some(dataset);

                let cleared = registry::revalidate(self.dataset.as_ref(), &mut self.selection);
                if !cleared.is_empty() {
                    info!(?cleared, "Cleared selections not present in new dataset");
                }

                Ok(self.summary.insert(summary))
            }
            Err(e @ IngestError::UnsupportedFormat { .. }) => {
                warn!("{e}");
                Err(e)
            }
            Err(e) => {
                warn!("{e}");
                self.dataset = None;
                self.summary = None;
                self.selection = SelectionState::default();
                Err(e)
            }
        }
    }

    pub fn options(&self, slot: Slot) -> Vec<String> {
        registry::options_for(slot, self.dataset.as_ref(), &self.selection)
    }

    /// Bind (or clear) a slot. Returns the dependent slots reset by the change.
    pub fn select(&mut self, slot: Slot, column: Option<&str>) -> Result<Vec<Slot>, SelectionError> {
        let axes_were_complete = self.selection.axes().is_some();
        let cleared = registry::apply_selection(
            self.dataset.as_ref(),
            &mut self.selection,
            slot,
            column.map(str::to_string),
        )?;
        if slot.is_axis() && !axes_were_complete {
            self.sync_example_toggle();
        }
        Ok(cleared)
    }

    pub fn show_example(&self) -> bool {
        self.show_example
    }

    /// Flip the example toggle, returning the new state.
    pub fn toggle_example(&mut self) -> bool {
        self.show_example = !self.show_example;
        self.show_example
    }

    /// Label for the toggle button: the action a click would take.
    pub fn example_label(&self) -> &'static str {
        if self.show_example { TOGGLE_OFF_LABEL } else { TOGGLE_ON_LABEL }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.style = Style { opacity, ..self.style }.clamped();
    }

    pub fn set_max_marker_size(&mut self, max_marker_size: f64) {
        self.style = Style { max_marker_size, ..self.style }.clamped();
    }

    pub fn download_requests(&self) -> u32 {
        self.download_requests
    }

    /// Count a click on the download button, returning the new total.
    pub fn record_download(&mut self) -> u32 {
        self.download_requests += 1;
        self.download_requests
    }

    /// Register a download click and return the current link, if any.
    pub fn request_download(&mut self) -> Result<Option<String>> {
        self.record_download();
        Ok(self.recompute()?.href)
    }

    pub fn recompute(&self) -> Result<Rendered> {
        recompute(
            self.dataset.as_ref(),
            &self.selection,
            &self.style,
            self.show_example,
            &self.export_options,
        )
    }

    // Real axes take over from the example the moment the last one is bound
    fn sync_example_toggle(&mut self) {
        if self.show_example && self.selection.axes().is_some() {
            debug!("Axis selections complete, turning example off");
            self.show_example = false;
        }
    }
}
