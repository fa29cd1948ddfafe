mod common;

use genwkt::io::wkt::{parse_wkt, resolve_wkt};
use genwkt::surveying::helmert::generate_projected_crs_text;
use genwkt::{CoordinateConverter, GeoError, HelmertParameters};

fn params() -> HelmertParameters {
    HelmertParameters::from_array([22.9047, 75.5036, 71.1819, -1.30497, -0.37148, 1.23274, -0.08957])
}

#[test]
fn structure_of_projected_crs() {
    let text = generate_projected_crs_text(&params(), &common::msk_projection(), "MSK", false);
    assert!(text.starts_with("PROJCS[\"MSK\","));
    assert!(text.contains("SPHEROID[\"Krassovsky, 1942\",6378245,298.3]"));
    assert_eq!(text.matches("TOWGS84[").count(), 1);
    assert!(text.contains(
        "TOWGS84[-22.904700000,-75.503600000,-71.181900000,-1.304970000,-0.371480000,1.232740000,0.089570000]"
    ));
    assert!(text.contains("PARAMETER[\"central_meridian\",29.99997716"));
    assert!(text.contains("PARAMETER[\"false_easting\",67119.6943]"));
    assert!(text.contains("PARAMETER[\"false_northing\",-6191992.4462]"));
    assert!(text.contains("PARAMETER[\"scale_factor\",1]"));
    assert!(text.contains("PARAMETER[\"latitude_of_origin\",0]"));
}

#[test]
fn towgs84_has_seven_nine_decimal_fields() {
    let text = generate_projected_crs_text(&params(), &common::msk_projection(), "MSK", false);
    let start = text.find("TOWGS84[").unwrap() + "TOWGS84[".len();
    let end = start + text[start..].find(']').unwrap();
    let fields: Vec<&str> = text[start..end].split(',').collect();
    assert_eq!(fields.len(), 7);
    for f in fields {
        let decimals = f.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 9, "{}", f);
    }
}

#[test]
fn geoid_variant_wraps_plain_text() {
    let plain = generate_projected_crs_text(&params(), &common::msk_projection(), "My CRS", false);
    let compound = generate_projected_crs_text(&params(), &common::msk_projection(), "My CRS", true);
    assert!(compound.len() > plain.len());
    assert!(compound.contains(&plain));
    assert!(compound.starts_with("COMPD_CS[\"My CRS + EGM2008 geoid height\""));
    assert!(compound.contains("VERT_CS[\"EGM2008 geoid height\""));
    assert!(!plain.contains("EGM2008"));
}

#[test]
fn name_appears_in_projected_and_geographic_crs() {
    let text = generate_projected_crs_text(&params(), &common::msk_projection(), "My CRS", false);
    assert!(text.contains("PROJCS[\"My CRS\""));
    assert!(text.contains("GEOGCS[\"My CRS\""));
}

#[test]
fn generated_text_resolves_back() {
    let text = generate_projected_crs_text(&params(), &common::msk_projection(), "MSK", true);
    let tree = parse_wkt(&text).unwrap();
    assert_eq!(tree.keyword, "COMPD_CS");
    let crs = resolve_wkt(&text).unwrap();
    assert_eq!(crs.name, "MSK");
    assert!(crs.is_compound());
    assert!(crs.geoid.is_some());
    let horizontal = parse_wkt(&crs.horizontal).unwrap();
    assert_eq!(horizontal.keyword, "PROJCS");
    assert!(crs.horizontal.contains("TOWGS84[-22.9047,"));
}

#[test]
fn esri_gauss_kruger_zone() {
    let text = r#"PROJCS["Pulkovo_1942_GK_Zone_7",GEOGCS["GCS_Pulkovo_1942",DATUM["D_Pulkovo_1942",SPHEROID["Krasovsky_1940",6378245.0,298.3]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Gauss_Kruger"],PARAMETER["False_Easting",7500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",39.0],PARAMETER["Scale_Factor",1.0],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;
    let converter = CoordinateConverter::new();
    let out = converter.apply_external_definition(text, 55.0, 39.0, 100.0).unwrap();
    assert!((out.northing - 6_097_337.0).abs() < 10_000.0);
    assert!((out.easting - 7_500_000.0).abs() < 1.0);
    assert_eq!(out.height, 100.0);
    assert!(!out.geoid_applied);
}

#[test]
fn malformed_definitions() {
    let converter = CoordinateConverter::new();
    for text in ["", "INVALID WKT", "PROJCS[\"x\",", "GEOGCS[\"WGS 84\",DATUM[\"d\",SPHEROID[\"s\",6378137,298.257223563]]]"] {
        assert!(
            matches!(
                converter.apply_external_definition(text, 55.0, 29.0, 0.0),
                Err(GeoError::Definition(_))
            ),
            "{:?}",
            text
        );
    }
}
