//! Loads variants from a reference data directory.
//!
//! The directory holds one subdirectory per generation plus a shared
//! residual dataset:
//!
//! ```text
//! residuals.json
//! g1/ g2+/
//!   takeoff/
//!     ground run.csv          weight, altitude, temperature -> ft
//!     total distance.csv
//!     adjustments/            headwind, tailwind, uphill, downhill, unpaved
//!   takeoff climb/
//!     gradient.csv            optional, ft/nmi
//!     rate.csv                optional, ft/min
//!   landing/
//!     100/ 50/ 50 ice/        ground run, total distance, go around
//!     adjustments/
//!     contamination/          water, slush, wet snow, dry snow, compact snow
//!   vref/
//!     100.csv 50.csv 50 ice.csv
//!   enroute climb/
//!     normal/ ice contaminated/   gradient, rate, speed
//! ```
//!
//! Tabular variants read `.csv` charts. Regression variants read `.json`
//! equations with the same stems and use the `.csv` ground run charts as
//! bounds references. Adjustment factors may be either: a `.csv` chart
//! indexed by weight or a `.json` equation.

mod error;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::support::{
    regression::RegressionEquation,
    residual::{ResidualDataset, ResidualErrorCalculator},
    table::{DataTable, TableError},
};

pub use error::DatasetError;

use super::{
    adjustments::{Adjustments, Factor},
    bounds::BoundsChecker,
    conditions::ContaminationKind,
    contamination::ContaminationCalculator,
    model::PerformanceModel,
    source::{Axis, Source},
    variant::{
        Distance, EnrouteData, FlapSetting, Generation, GoAround, Icing, LandingData, ModelKind,
        TakeoffData, Variant,
    },
};

const RESIDUALS_FILE: &str = "residuals.json";

const TAKEOFF: &str = "takeoff";
const TAKEOFF_CLIMB: &str = "takeoff climb";
const LANDING: &str = "landing";
const ADJUSTMENTS: &str = "adjustments";
const GROUND_RUN: &str = "ground run";
const TOTAL_DISTANCE: &str = "total distance";
const GO_AROUND: &str = "go around";

/// A reference data directory.
#[derive(Debug, Clone)]
pub struct DataDirectory {
    root: PathBuf,
    residuals: ResidualErrorCalculator,
}

impl DataDirectory {
    /// Opens a data directory, loading its residual dataset if present.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Residual`] if the residual dataset exists but
    /// cannot be parsed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let root = root.into();
        let path = root.join(RESIDUALS_FILE);
        let dataset = if path.is_file() {
            ResidualDataset::load(&path)?
        } else {
            tracing::debug!(?path, "no residual dataset");
            ResidualDataset::default()
        };
        Ok(Self::with_residuals(root, Arc::new(dataset)))
    }

    /// Uses the given residual dataset instead of the directory's own.
    #[must_use]
    pub fn with_residuals(root: impl Into<PathBuf>, residuals: Arc<ResidualDataset>) -> Self {
        Self {
            root: root.into(),
            residuals: ResidualErrorCalculator::new(residuals),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads a variant's descriptor bundle.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if required data is missing or any file is
    /// malformed.
    pub fn load(&self, generation: Generation, kind: ModelKind) -> Result<Variant, DatasetError> {
        let loader = Loader {
            dir: self.root.join(generation.dir_name()),
            kind,
            residuals: &self.residuals,
        };

        let takeoff = loader.takeoff()?;
        let landing = loader.landing()?;
        let contamination = loader
            .contamination()?
            .with_wet_runway(generation.has_wet_runway_data());
        let enroute = loader.enroute()?;
        let bounds = match kind {
            ModelKind::Tabular => None,
            ModelKind::Regression => Some(loader.bounds(landing.keys().copied())?),
        };

        tracing::debug!(
            %generation,
            ?kind,
            flaps = ?landing.keys().collect::<Vec<_>>(),
            enroute = ?enroute.keys().collect::<Vec<_>>(),
            "loaded variant"
        );

        Ok(Variant {
            generation,
            kind,
            takeoff,
            landing,
            contamination,
            enroute,
            bounds,
        })
    }

    /// Loads a variant and wraps it in a [`PerformanceModel`].
    ///
    /// # Errors
    ///
    /// See [`DataDirectory::load`].
    pub fn model(&self, generation: Generation, kind: ModelKind) -> Result<PerformanceModel, DatasetError> {
        self.load(generation, kind).map(PerformanceModel::new)
    }
}

struct Loader<'a> {
    dir: PathBuf,
    kind: ModelKind,
    residuals: &'a ResidualErrorCalculator,
}

impl Loader<'_> {
    fn takeoff(&self) -> Result<TakeoffData, DatasetError> {
        let dir = self.dir.join(TAKEOFF);
        let climb = self.dir.join(TAKEOFF_CLIMB);
        let adjustments = self.adjustments(&dir.join(ADJUSTMENTS))?;
        Ok(TakeoffData {
            ground_run: Distance::new(self.required(&dir, GROUND_RUN)?)
                .with_adjustments(adjustments.clone()),
            total_distance: Distance::new(self.required(&dir, TOTAL_DISTANCE)?)
                .with_adjustments(adjustments),
            climb_gradient: self.source(&climb, "gradient")?,
            climb_rate: self.source(&climb, "rate")?,
        })
    }

    fn landing(&self) -> Result<BTreeMap<FlapSetting, LandingData>, DatasetError> {
        let landing = self.dir.join(LANDING);
        let vref = self.dir.join("vref");
        let adjustments = self.adjustments(&landing.join(ADJUSTMENTS))?;

        let mut settings = BTreeMap::new();
        for flaps in FlapSetting::ALL {
            let dir = landing.join(flaps.dir_name());
            if !dir.is_dir() {
                continue;
            }
            let go_around = match (self.kind, file(&dir, GO_AROUND, "json")) {
                (_, Some(path)) => GoAround::Classifier(Arc::new(self.equation(&path)?)),
                (ModelKind::Tabular, None) => GoAround::FromLandingChart,
                (ModelKind::Regression, None) => {
                    return Err(DatasetError::Missing {
                        path: dir.join(format!("{GO_AROUND}.json")),
                    });
                }
            };
            settings.insert(
                flaps,
                LandingData {
                    vref: self.source(&vref, flaps.dir_name())?,
                    ground_run: Distance::new(self.required(&dir, GROUND_RUN)?)
                        .with_adjustments(adjustments.clone()),
                    total_distance: Distance::new(self.required(&dir, TOTAL_DISTANCE)?)
                        .with_adjustments(adjustments.clone()),
                    go_around,
                },
            );
        }
        Ok(settings)
    }

    fn contamination(&self) -> Result<ContaminationCalculator, DatasetError> {
        let dir = self.dir.join(LANDING).join("contamination");
        let mut calculator = match self.kind {
            ModelKind::Tabular => ContaminationCalculator::tables(),
            ModelKind::Regression => ContaminationCalculator::formulas(),
        };
        for kind in ContaminationKind::CHARTED {
            let stem = kind.file_stem();
            calculator = match self.kind {
                ModelKind::Tabular => match file(&dir, stem, "csv") {
                    Some(path) => {
                        let table = self.table(&path)?;
                        calculator
                            .with_table(kind, table)
                            .map_err(|source| DatasetError::Table { path, source })?
                    }
                    None => calculator,
                },
                ModelKind::Regression => match file(&dir, stem, "json") {
                    Some(path) => calculator.with_formula(kind, self.equation(&path)?),
                    None => calculator,
                },
            };
        }
        Ok(calculator)
    }

    fn enroute(&self) -> Result<BTreeMap<Icing, EnrouteData>, DatasetError> {
        let mut enroute = BTreeMap::new();
        for icing in Icing::ALL {
            let dir = self.dir.join("enroute climb").join(icing.dir_name());
            if !dir.is_dir() {
                continue;
            }
            enroute.insert(
                icing,
                EnrouteData {
                    gradient: self.required(&dir, "gradient")?,
                    rate: self.required(&dir, "rate")?,
                    speed: self.required(&dir, "speed")?,
                },
            );
        }
        Ok(enroute)
    }

    fn bounds(&self, flaps: impl Iterator<Item = FlapSetting>) -> Result<BoundsChecker, DatasetError> {
        let chart = |dir: PathBuf| dir.join(format!("{GROUND_RUN}.csv"));

        let path = chart(self.dir.join(TAKEOFF));
        let reference = self.table(&path)?;
        let mut checker =
            BoundsChecker::new(reference).map_err(|source| DatasetError::Table { path, source })?;

        for flaps in flaps {
            let path = chart(self.dir.join(LANDING).join(flaps.dir_name()));
            let reference = self.table(&path)?;
            checker = checker
                .with_landing(flaps, reference)
                .map_err(|source| DatasetError::Table { path, source })?;
        }
        Ok(checker)
    }

    fn adjustments(&self, dir: &Path) -> Result<Adjustments, DatasetError> {
        Ok(Adjustments {
            headwind: self.factor(dir, "headwind")?,
            tailwind: self.factor(dir, "tailwind")?,
            uphill: self.factor(dir, "uphill")?,
            downhill: self.factor(dir, "downhill")?,
            unpaved: self.factor(dir, "unpaved")?,
        })
    }

    /// A factor from an equation if one exists, otherwise from a chart.
    fn factor(&self, dir: &Path, name: &str) -> Result<Option<Factor>, DatasetError> {
        if let Some(path) = file(dir, name, "json") {
            return Ok(Some(Factor::equation(self.equation(&path)?)));
        }
        let Some(path) = file(dir, name, "csv") else {
            return Ok(None);
        };
        let table = self.table(&path)?;
        Factor::table(table)
            .map(Some)
            .map_err(|source| DatasetError::Table { path, source })
    }

    fn required(&self, dir: &Path, name: &str) -> Result<Source, DatasetError> {
        self.source(dir, name)?.ok_or_else(|| DatasetError::Missing {
            path: dir.join(format!("{name}.{}", self.extension())),
        })
    }

    fn source(&self, dir: &Path, name: &str) -> Result<Option<Source>, DatasetError> {
        let Some(path) = file(dir, name, self.extension()) else {
            return Ok(None);
        };
        match self.kind {
            ModelKind::Tabular => {
                let table = self.table(&path)?;
                let source = match table.n_inputs() {
                    1 => Source::table(table, [Axis::Weight]),
                    3 => Source::chart(table),
                    actual => Err(TableError::Dimensionality {
                        expected: 3,
                        actual,
                    }),
                };
                source
                    .map(Some)
                    .map_err(|source| DatasetError::Table { path, source })
            }
            ModelKind::Regression => Ok(Some(Source::equation(self.equation(&path)?))),
        }
    }

    fn extension(&self) -> &'static str {
        match self.kind {
            ModelKind::Tabular => "csv",
            ModelKind::Regression => "json",
        }
    }

    fn table(&self, path: &Path) -> Result<DataTable, DatasetError> {
        DataTable::load(path).map_err(|source| DatasetError::Table {
            path: path.to_path_buf(),
            source,
        })
    }

    fn equation(&self, path: &Path) -> Result<RegressionEquation, DatasetError> {
        RegressionEquation::load(path, self.residuals).map_err(|source| DatasetError::Equation {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `dir/name.extension`, if it exists.
fn file(dir: &Path, name: &str, extension: &str) -> Option<PathBuf> {
    let path = dir.join(format!("{name}.{extension}"));
    path.is_file().then_some(path)
}
