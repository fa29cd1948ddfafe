//! User settings stored as JSON and the logger set up from them.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::angle::parse_angle;
use crate::crs::{GeoidModel, ProjectionDefinition};
use crate::error::Result;
use crate::geodesy::ProjEngine;
use crate::surveying::EstimatorOptions;

/// Environment variable naming a log file; overrides `logging.file`.
pub const LOG_ENV: &str = "GENWKT_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter, e.g. `info` or `genwkt=debug`. `RUST_LOG` wins.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Defaults for a pinned projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Decimal degrees or `"D M S"`.
    pub central_meridian: Option<String>,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub latitude_of_origin: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            central_meridian: None,
            scale_factor: 1.0,
            false_easting: 0.0,
            false_northing: 0.0,
            latitude_of_origin: 0.0,
        }
    }
}

impl ProjectionSettings {
    /// The configured projection, or `None` when no central meridian is set.
    pub fn definition(&self) -> Result<Option<ProjectionDefinition>> {
        let Some(cm) = &self.central_meridian else {
            return Ok(None);
        };
        let definition =
            ProjectionDefinition::new(parse_angle(cm)?, self.false_easting, self.false_northing)
                .with_scale(self.scale_factor)
                .with_latitude_of_origin(self.latitude_of_origin);
        definition.validate()?;
        Ok(Some(definition))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoidSettings {
    /// Geoid grid file, or the name of a grid in PROJ's search path.
    pub grid: Option<String>,
}

impl GeoidSettings {
    /// The configured grid, else the EGM2008 grid of the PROJ data package.
    pub fn grid(&self) -> &str {
        self.grid
            .as_deref()
            .unwrap_or(GeoidModel::Egm2008.default_grid())
    }

    /// Engine applying geoid corrections with [`GeoidSettings::grid`].
    pub fn engine(&self) -> ProjEngine {
        ProjEngine::new().with_geoid_grid(self.grid())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub max_iterations: usize,
    pub x_tolerance: f64,
    pub f_tolerance: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        let defaults = EstimatorOptions::default();
        Self {
            max_iterations: defaults.max_iterations,
            x_tolerance: defaults.x_tolerance,
            f_tolerance: defaults.f_tolerance,
        }
    }
}

impl OptimizerSettings {
    pub fn estimator_options(&self, fixed_scale: bool) -> EstimatorOptions {
        EstimatorOptions {
            fixed_scale,
            max_iterations: self.max_iterations,
            x_tolerance: self.x_tolerance,
            f_tolerance: self.f_tolerance,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub projection: ProjectionSettings,
    pub geoid: GeoidSettings,
    pub optimizer: OptimizerSettings,
}

impl Settings {
    /// `~/.genwkt/settings.json`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".genwkt").join("settings.json"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Writes the settings, creating the parent directory when needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Installs `env_logger`. The log goes to the file named by `GENWKT_LOG`
/// or `logging.file` when set, otherwise to stderr. Calling it twice is
/// harmless.
pub fn init_logging(settings: &LoggingSettings) {
    let env = env_logger::Env::default().default_filter_or(settings.level.as_str());
    let mut builder = env_logger::Builder::from_env(env);
    let file = std::env::var_os(LOG_ENV)
        .map(PathBuf::from)
        .or_else(|| settings.file.clone());
    if let Some(path) = file {
        match File::create(&path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Failed to create log file {}: {}", path.display(), e),
        }
    }
    let _ = builder.try_init();
}
