//! Point types exchanged between the converter and the estimators.

pub mod point;
pub use point::{GeodeticPoint, ProjectedPoint};

pub mod point3;
pub use point3::{CartesianPoint, Frame};
