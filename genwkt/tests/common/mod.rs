#![allow(dead_code)]

use genwkt::angle::parse_angle;
use genwkt::geometry::{GeodeticPoint, ProjectedPoint};
use genwkt::ProjectionDefinition;

pub const WGS84_TABLE: &str = "\
1,55.9132151,28.7827337,148.13
2,55.9177362,28.8195407,153.07
3,55.8997317,28.8448859,150.32
4,55.8879009,28.8148194,144.81
5,55.8993879,28.7702963,140.8
";

pub const MSK_TABLE: &str = "\
1\t7686.0995773235\t-8996.72764806\t128.313878864
2\t8149.5516395103\t-6686.6830560778\t133.2730658024
3\t6118.3181298608\t-5135.559022994\t130.5397422902
4\t4832.9892219482\t-7038.7691853523\t125.0153974839
5\t6160.4605288561\t-9801.7721945621\t120.9794011708
";

pub const CM_TEXT: &str = "29 59 59.91779";
pub const FALSE_EASTING: f64 = 67119.6943;
pub const FALSE_NORTHING: f64 = -6191992.4462;

pub fn wgs84_points() -> Vec<GeodeticPoint> {
    genwkt::io::parse_geodetic_points(WGS84_TABLE).unwrap()
}

pub fn msk_points() -> Vec<ProjectedPoint> {
    genwkt::io::parse_projected_points(MSK_TABLE).unwrap()
}

pub fn msk_projection() -> ProjectionDefinition {
    ProjectionDefinition::new(parse_angle(CM_TEXT).unwrap(), FALSE_EASTING, FALSE_NORTHING)
}
