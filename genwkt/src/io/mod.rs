//! File input and output helpers for point lists and CRS text.

pub mod wkt;

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GeoError, Result};
use crate::geometry::{GeodeticPoint, ProjectedPoint};

static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\t]").unwrap());

/// Reads a file to string.
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes `text` to `path`, replacing any existing file.
pub fn write_string(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

/// One data row of a control point table: `id, first, second, height`.
///
/// For WGS84 tables `first`/`second` are latitude/longitude, for local
/// tables they are northing/easting.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub first: f64,
    pub second: f64,
    pub height: f64,
}

impl TableRow {
    pub fn to_geodetic(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.id.clone(), self.first, self.second, self.height)
    }

    pub fn to_projected(&self) -> ProjectedPoint {
        ProjectedPoint::new(self.id.clone(), self.first, self.second, self.height)
    }
}

fn number(field: &str, line_no: usize, line: &str) -> Result<f64> {
    field.parse::<f64>().map_err(|_| {
        GeoError::parse(
            line.to_string(),
            format!("line {}: '{}' is not a number", line_no, field),
        )
    })
}

/// Parses a comma or tab separated point table.
///
/// Lines with fewer than four non-empty fields are skipped; extra fields are
/// ignored.
pub fn parse_point_table(text: &str) -> Result<Vec<TableRow>> {
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let fields: Vec<&str> = TABLE_SEPARATOR
            .split(line)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() < 4 {
            if !line.trim().is_empty() {
                log::debug!("skipping line {}: {:?}", idx + 1, line);
            }
            continue;
        }
        rows.push(TableRow {
            id: fields[0].to_string(),
            first: number(fields[1], idx + 1, line)?,
            second: number(fields[2], idx + 1, line)?,
            height: number(fields[3], idx + 1, line)?,
        });
    }
    Ok(rows)
}

pub fn parse_geodetic_points(text: &str) -> Result<Vec<GeodeticPoint>> {
    Ok(parse_point_table(text)?.iter().map(TableRow::to_geodetic).collect())
}

pub fn parse_projected_points(text: &str) -> Result<Vec<ProjectedPoint>> {
    Ok(parse_point_table(text)?.iter().map(TableRow::to_projected).collect())
}

/// A line of conversion input, with or without a point label.
#[derive(Debug, Clone, PartialEq)]
pub enum PointRow {
    Tagged { id: String, lat: f64, lon: f64, height: f64 },
    Untagged { lat: f64, lon: f64, height: f64 },
}

impl PointRow {
    pub fn id(&self) -> &str {
        match self {
            PointRow::Tagged { id, .. } => id,
            PointRow::Untagged { .. } => "",
        }
    }

    pub fn to_geodetic(&self) -> GeodeticPoint {
        match self {
            PointRow::Tagged { id, lat, lon, height } => {
                GeodeticPoint::new(id.clone(), *lat, *lon, *height)
            }
            PointRow::Untagged { lat, lon, height } => GeodeticPoint::new("", *lat, *lon, *height),
        }
    }
}

/// Classifies one conversion input line.
///
/// | fields | shape                      | result                     |
/// |--------|----------------------------|----------------------------|
/// | ≥ 4    | id, lat, lon, h            | `Tagged`                   |
/// | 3      | all numeric                | `Untagged(lat, lon, h)`    |
/// | 3      | non-numeric first          | `Tagged(id, lat, lon, 0)`  |
/// | 2      | lat, lon                   | `Untagged(lat, lon, 0)`    |
///
/// Anything else, including coordinates that do not parse, yields `None`.
pub fn parse_point_row(line: &str) -> Option<PointRow> {
    let line = line.trim();
    let fields: Vec<&str> = if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    };
    fn num(s: &str) -> Option<f64> {
        s.parse().ok()
    }
    match fields.as_slice() {
        [id, lat, lon, h, ..] => Some(PointRow::Tagged {
            id: id.to_string(),
            lat: num(lat)?,
            lon: num(lon)?,
            height: num(h)?,
        }),
        [a, b, c] => match num(a) {
            Some(lat) => Some(PointRow::Untagged {
                lat,
                lon: num(b)?,
                height: num(c)?,
            }),
            None => Some(PointRow::Tagged {
                id: a.to_string(),
                lat: num(b)?,
                lon: num(c)?,
                height: 0.0,
            }),
        },
        [lat, lon] => Some(PointRow::Untagged {
            lat: num(lat)?,
            lon: num(lon)?,
            height: 0.0,
        }),
        _ => None,
    }
}
