use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::{self, AnalysisOutcome, AnalysisRequest};
use crate::data::categories::{self, Dimension};
use crate::data::filter::FilterChoice;
use crate::data::geo::BoundaryDocument;
use crate::data::loader::DatasetCache;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which central-panel view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTab {
    Summary,
    Charts,
    Map,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Directory holding the yearly extracts and the boundary file.
    pub data_dir: PathBuf,

    /// Keyed cache of loaded tables and boundaries.
    pub cache: DatasetCache,

    /// Selected exam year.
    pub year: u16,

    /// Selected filter dimension (`None` = no filter).
    pub dimension: Option<Dimension>,

    /// Selected filter value within the dimension.
    pub value: Option<String>,

    /// Active central-panel view.
    pub view: ViewTab,

    /// Result of the last "generate" run.
    pub outcome: Option<AnalysisOutcome>,

    /// Boundary document for the choropleth, when available.
    pub boundaries: Option<Arc<BoundaryDocument>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache: DatasetCache::new(),
            year: 2024,
            dimension: None,
            value: None,
            view: ViewTab::Summary,
            outcome: None,
            boundaries: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Point the dashboard at another data directory. Cached tables belong
    /// to the old directory, so the cache starts over.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("data directory set to {}", dir.display());
        self.data_dir = dir;
        self.cache = DatasetCache::new();
        self.boundaries = None;
        self.outcome = None;
        self.status_message = None;
    }

    /// Select a filter dimension and reset the value to its first label.
    pub fn set_dimension(&mut self, dimension: Option<Dimension>) {
        self.dimension = dimension;
        self.value = dimension
            .and_then(|d| categories::labels(d).first().copied())
            .map(String::from);
    }

    /// The filter implied by the current selections.
    pub fn filter_choice(&self) -> FilterChoice {
        match (self.dimension, &self.value) {
            (Some(dimension), Some(value)) => FilterChoice::Value {
                dimension,
                label: value.clone(),
            },
            _ => FilterChoice::None,
        }
    }

    /// Snapshot the selections into an immutable request.
    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest {
            year: self.year,
            filter: self.filter_choice(),
        }
    }

    pub fn boundary_path(&self) -> PathBuf {
        self.data_dir.join("municipios.geojson")
    }

    /// Run the pipeline for the current selections and store the outcome.
    pub fn generate(&mut self) {
        let request = self.request();
        let data_dir = self.data_dir.clone();
        match analysis::run(&mut self.cache, &data_dir, &request) {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("analysis failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        }

        // The map degrades to a hint when the boundary file is absent.
        match self.cache.boundaries(&self.boundary_path()) {
            Ok(doc) => self.boundaries = Some(doc),
            Err(e) => {
                log::warn!("boundary document unavailable: {e}");
                self.boundaries = None;
            }
        }
    }
}
