//! Helmert parameters and Transverse Mercator definitions for local
//! coordinate systems on the Krassovsky ellipsoid, estimated from control
//! points surveyed in WGS84 and in the local grid.

pub mod angle;
pub mod calculation;
pub mod config;
pub mod converter;
pub mod crs;
pub mod error;
pub mod geodesy;
pub mod geometry;
pub mod io;
pub mod surveying;

pub use calculation::{CalculationOutcome, CalculationRequest, Calculator, ComparisonRow, SolvedModel};
pub use converter::{CoordinateConverter, ExternalConversion};
pub use crs::ProjectionDefinition;
pub use error::{GeoError, Result, Stage};
pub use surveying::HelmertParameters;
