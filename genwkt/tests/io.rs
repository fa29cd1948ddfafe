mod common;

use assert_fs::prelude::*;
use genwkt::io::{parse_point_row, parse_point_table, read_to_string, write_string, PointRow};
use predicates::prelude::*;

#[test]
fn fixture_tables_parse() {
    let wgs = common::wgs84_points();
    let msk = common::msk_points();
    assert_eq!(wgs.len(), 5);
    assert_eq!(msk.len(), 5);
    assert_eq!(wgs[4].id, "5");
    assert_eq!(wgs[4].height, 140.8);
    assert_eq!(msk[0].northing, 7686.0995773235);
    assert_eq!(msk[0].easting, -8996.72764806);
}

#[test]
fn header_and_blank_lines_are_skipped() {
    let text = "name,lat,lon\n\n  \nA, 55.1 ,28.2, 10,remark\nB\t55.2\t28.3\t11\n";
    let rows = parse_point_table(text).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "A");
    assert_eq!(rows[0].first, 55.1);
    assert_eq!(rows[1].second, 28.3);
}

#[test]
fn conversion_rows_in_a_file() {
    let text = "p1,55.9,28.8,150\n55.8 28.7 140\np3 55.7 28.6\n55.6,28.5\nnoise\n";
    let rows: Vec<PointRow> = text.lines().filter_map(parse_point_row).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].id(), "p1");
    assert_eq!(rows[1].id(), "");
    assert_eq!(rows[2].to_geodetic().height, 0.0);
    assert_eq!(rows[3].to_geodetic().lat, 55.6);
}

#[test]
fn write_then_read_prj() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("msk.prj");
    write_string(file.path(), "PROJCS[\"MSK\"]").unwrap();
    file.assert(predicate::str::contains("PROJCS[\"MSK\"]"));
    assert_eq!(read_to_string(file.path()).unwrap(), "PROJCS[\"MSK\"]");
    assert!(read_to_string(dir.child("missing.prj").path()).is_err());
}
