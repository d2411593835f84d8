//! Residual-error lookup for regression equations.
//!
//! Each regression fitted to a chart has a residual record: an overall RMSE
//! and maximum error, plus RMSE values binned by input variable. The RMSE is
//! used as a proxy for one standard deviation of the regression's error.
//!
//! When several input variables land in bins, their RMSEs are treated as
//! independent, orthogonal error sources and combined by root-sum-square.

use std::{collections::HashMap, fs, path::Path, sync::Arc};

use serde::Deserialize;
use thiserror::Error;

/// Errors that may occur when loading or querying residual data.
#[derive(Debug, Error)]
pub enum ResidualError {
    /// The residual dataset has no entry for a table.
    #[error("no residual data for table {0:?}")]
    UnknownTable(String),

    /// The residual dataset is not valid JSON or has the wrong shape.
    #[error("malformed residual dataset")]
    Parse(#[from] serde_json::Error),

    /// The residual dataset file could not be read.
    #[error("failed to read residual dataset {path:?}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One bin of residual statistics over a half-open range `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ResidualBin {
    pub range: [f64; 2],
    pub rmse: f64,
    pub max_error: f64,
}

impl ResidualBin {
    fn contains(&self, x: f64) -> bool {
        let [lo, hi] = self.range;
        lo <= x && x < hi
    }
}

/// Residual statistics for one regression table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResidualData {
    pub overall_rmse: f64,
    pub overall_max_error: f64,
    #[serde(default)]
    pub bins: HashMap<String, Vec<ResidualBin>>,
}

impl ResidualData {
    /// Returns the RMSE for the given bin parameters.
    ///
    /// For each `(name, value)` pair, the first bin of that name containing
    /// the value contributes its RMSE. Contributions are combined by
    /// root-sum-square. With no parameters, or no matching bins, the overall
    /// RMSE is returned.
    pub fn rmse<'a>(&self, parameters: impl IntoIterator<Item = (&'a str, f64)>) -> f64 {
        let matched: Vec<f64> = parameters
            .into_iter()
            .filter_map(|(name, x)| self.first_bin(name, x))
            .map(|bin| bin.rmse)
            .collect();

        if matched.is_empty() {
            self.overall_rmse
        } else {
            matched.iter().map(|rmse| rmse * rmse).sum::<f64>().sqrt()
        }
    }

    /// Returns the maximum error of the first parameter that lands in a bin,
    /// or the overall maximum error if none does.
    pub fn max_error<'a>(&self, parameters: impl IntoIterator<Item = (&'a str, f64)>) -> f64 {
        parameters
            .into_iter()
            .find_map(|(name, x)| self.first_bin(name, x))
            .map_or(self.overall_max_error, |bin| bin.max_error)
    }

    fn first_bin(&self, name: &str, x: f64) -> Option<&ResidualBin> {
        self.bins.get(name)?.iter().find(|bin| bin.contains(x))
    }
}

/// Residual statistics for every regression table, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ResidualDataset(HashMap<String, Arc<ResidualData>>);

impl ResidualDataset {
    /// Parses a residual dataset from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ResidualError::Parse`] if the JSON is malformed.
    pub fn from_json(text: &str) -> Result<Self, ResidualError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a residual dataset file.
    ///
    /// # Errors
    ///
    /// Returns a [`ResidualError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ResidualError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ResidualError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json(&text)?;
        tracing::debug!(?path, tables = dataset.0.len(), "loaded residual dataset");
        Ok(dataset)
    }

    /// Adds or replaces the residual data for a table.
    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, data: ResidualData) -> Self {
        self.0.insert(name.into(), Arc::new(data));
        self
    }

    /// Looks up the residual data for a table.
    pub fn get(&self, table: &str) -> Option<&Arc<ResidualData>> {
        self.0.get(table)
    }
}

/// Looks up regression uncertainty from a shared residual dataset.
///
/// The dataset is injected at construction so tests can substitute
/// synthetic data.
#[derive(Debug, Clone, Default)]
pub struct ResidualErrorCalculator {
    dataset: Arc<ResidualDataset>,
}

impl ResidualErrorCalculator {
    #[must_use]
    pub fn new(dataset: Arc<ResidualDataset>) -> Self {
        Self { dataset }
    }

    /// Resolves the residual data for a table.
    ///
    /// # Errors
    ///
    /// Returns [`ResidualError::UnknownTable`] if the dataset has no entry.
    pub fn table(&self, table: &str) -> Result<Arc<ResidualData>, ResidualError> {
        self.dataset
            .get(table)
            .cloned()
            .ok_or_else(|| ResidualError::UnknownTable(table.to_owned()))
    }

    /// Returns the combined RMSE for a table and bin parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ResidualError::UnknownTable`] if the dataset has no entry.
    pub fn rmse<'a>(
        &self,
        table: &str,
        parameters: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<f64, ResidualError> {
        Ok(self.table(table)?.rmse(parameters))
    }

    /// Returns the single-bin maximum error for a table and bin parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ResidualError::UnknownTable`] if the dataset has no entry.
    pub fn max_error<'a>(
        &self,
        table: &str,
        parameters: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<f64, ResidualError> {
        Ok(self.table(table)?.max_error(parameters))
    }
}
