//! Template-matching results lookup.
//!
//! The panel treats the result store as an external collaborator behind
//! [`ResultsSource`]. The bundled implementation resolves a database id
//! through a JSON catalog whose entries point at a local records file
//! or a remote URL.

use crate::error::TempestError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TM_CATALOG_PATH: &str = "assets/tm_databases.json";

/// One row of a template-matching run, serialized record-oriented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmResultRecord {
    pub job_id: u32,
    pub job_name: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symmetry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score: Option<f64>,
}

/// Tabular result of one lookup, in source row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TmResults {
    records: Vec<TmResultRecord>,
}

impl TmResults {
    pub fn new(records: Vec<TmResultRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TmResultRecord] {
        &self.records
    }

    pub fn from_records_json(text: &str) -> Result<Self, TempestError> {
        let records: Vec<TmResultRecord> = serde_json::from_str(text)?;
        Ok(Self { records })
    }

    /// Record-oriented JSON array text, the exact form embedded into
    /// the injected script.
    pub fn to_records_json(&self) -> Result<String, TempestError> {
        Ok(serde_json::to_string(&self.records)?)
    }
}

/// The external data collaborator the panel queries on `load_database`.
pub trait ResultsSource {
    fn tm_results(&self, database_id: &str) -> Result<TmResults, TempestError>;
}

/// Catalog entry describing where to fetch one run's results.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct TmDatabaseEntry {
    pub description: Option<String>,
    pub results_local: Option<String>,
    pub results_remote: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TmDatabaseCatalog {
    entries: HashMap<String, TmDatabaseEntry>,
    catalog_base_dir: PathBuf,
}

impl TmDatabaseCatalog {
    pub fn from_json_file(path: &str) -> Result<Self, TempestError> {
        let text = fs::read_to_string(path).map_err(|e| {
            TempestError::Database(format!("Could not read TM database catalog '{path}': {e}"))
        })?;
        let entries: HashMap<String, TmDatabaseEntry> =
            serde_json::from_str(&text).map_err(|e| {
                TempestError::Database(format!(
                    "Could not parse TM database catalog '{path}': {e}"
                ))
            })?;
        let base = Path::new(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            entries,
            catalog_base_dir: base,
        })
    }

    pub fn list_databases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn entry(&self, database_id: &str) -> Result<&TmDatabaseEntry, TempestError> {
        self.entries.get(database_id).ok_or_else(|| {
            TempestError::Database(format!("unknown TM database '{database_id}'"))
        })
    }

    // Relative local paths are relative to the catalog file.
    fn local_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.catalog_base_dir.join(path)
        }
    }

    fn load_local(&self, database_id: &str, raw: &str) -> Result<TmResults, TempestError> {
        let path = self.local_path(raw);
        let text = fs::read_to_string(&path).map_err(|e| {
            TempestError::Database(format!(
                "Could not read results of TM database '{database_id}' from '{}': {e}",
                path.display()
            ))
        })?;
        TmResults::from_records_json(&text).map_err(|e| {
            TempestError::Database(format!(
                "Could not parse results of TM database '{database_id}' from '{}': {e}",
                path.display()
            ))
        })
    }

    fn fetch_remote(&self, database_id: &str, url: &str) -> Result<TmResults, TempestError> {
        let text = reqwest::blocking::get(url)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| {
                TempestError::Database(format!(
                    "Could not fetch results of TM database '{database_id}' from '{url}': {e}"
                ))
            })?;
        TmResults::from_records_json(&text).map_err(|e| {
            TempestError::Database(format!(
                "Could not parse results of TM database '{database_id}' from '{url}': {e}"
            ))
        })
    }
}

impl ResultsSource for TmDatabaseCatalog {
    fn tm_results(&self, database_id: &str) -> Result<TmResults, TempestError> {
        let entry = self.entry(database_id)?;
        if let Some(local) = &entry.results_local {
            return self.load_local(database_id, local);
        }
        if let Some(remote) = &entry.results_remote {
            return self.fetch_remote(database_id, remote);
        }
        Err(TempestError::Database(format!(
            "TM database '{database_id}' has no results source"
        )))
    }
}

/// Results source that re-reads the catalog on every lookup, so edits
/// to the catalog file take effect without restarting the panel.
#[derive(Debug, Clone)]
pub struct CatalogResultsSource {
    catalog_path: String,
}

impl CatalogResultsSource {
    pub fn new(catalog_path: impl Into<String>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
        }
    }
}

impl Default for CatalogResultsSource {
    fn default() -> Self {
        Self::new(DEFAULT_TM_CATALOG_PATH)
    }
}

impl ResultsSource for CatalogResultsSource {
    fn tm_results(&self, database_id: &str) -> Result<TmResults, TempestError> {
        TmDatabaseCatalog::from_json_file(&self.catalog_path)?.tm_results(database_id)
    }
}
