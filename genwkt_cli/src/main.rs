use clap::{Parser, Subcommand};
use genwkt::angle::{format_angle, parse_angle};
use genwkt::config::{init_logging, GeoidSettings, ProjectionSettings, Settings};
use genwkt::geodesy::GeodesyEngine;
use genwkt::io::{parse_geodetic_points, parse_point_row, parse_projected_points, read_to_string, write_string};
use genwkt::{
    CalculationOutcome, CalculationRequest, Calculator, CoordinateConverter, GeoError,
    HelmertParameters, ProjectionDefinition, Result,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "genwkt", version)]
struct Cli {
    /// Settings file (defaults to ~/.genwkt/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the projection and Helmert parameters of a local system from
    /// control points (id,lat,lon,h and id,northing,easting,h files).
    Calculate {
        wgs: PathBuf,
        msk: PathBuf,
        /// Pin the central meridian (decimal degrees or "D M S").
        #[arg(long, allow_hyphen_values = true)]
        cm: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        scale: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        fe: Option<f64>,
        #[arg(long = "fn", allow_hyphen_values = true)]
        false_northing: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lat0: Option<f64>,
        /// Pin the transform: TX,TY,TZ,RX,RY,RZ,PPM
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        helmert: Option<Vec<f64>>,
        /// Fit the scale factor too when estimating the projection.
        #[arg(long)]
        estimate_scale: bool,
        #[arg(long, default_value = "")]
        name: String,
        /// Wrap the WKT in a compound CRS with EGM2008 heights.
        #[arg(long)]
        geoid: bool,
        /// Write the WKT to this .prj file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Convert WGS84 points with a WKT projection file.
    Convert {
        prj: PathBuf,
        points: PathBuf,
        /// Geoid grid (file or PROJ grid name) used when the WKT declares
        /// EGM2008 heights.
        #[arg(long)]
        geoid_grid: Option<String>,
    },
    /// Angle conversions.
    Angle {
        #[command(subcommand)]
        command: AngleCommand,
    },
}

#[derive(Subcommand)]
enum AngleCommand {
    /// Decimal degrees from "D M S" or decimal text.
    Parse {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// "D MM SS.sssss" from decimal degrees.
    Format {
        #[arg(allow_hyphen_values = true)]
        degrees: f64,
    },
}

struct PinnedProjection<'a> {
    cm: Option<&'a str>,
    scale: Option<f64>,
    fe: Option<f64>,
    fn_: Option<f64>,
    lat0: Option<f64>,
}

impl PinnedProjection<'_> {
    /// Command line values over settings; `None` when no meridian is given.
    fn resolve(&self, settings: &Settings) -> Result<Option<ProjectionDefinition>> {
        let defaults = &settings.projection;
        ProjectionSettings {
            central_meridian: self
                .cm
                .map(str::to_string)
                .or_else(|| defaults.central_meridian.clone()),
            scale_factor: self.scale.unwrap_or(defaults.scale_factor),
            false_easting: self.fe.unwrap_or(defaults.false_easting),
            false_northing: self.fn_.unwrap_or(defaults.false_northing),
            latitude_of_origin: self.lat0.unwrap_or(defaults.latitude_of_origin),
        }
        .definition()
    }
}

fn print_outcome(outcome: &CalculationOutcome) {
    let p = outcome.projection();
    println!("Projection:");
    println!(
        "  central meridian  {} ({:.9})",
        format_angle(p.central_meridian),
        p.central_meridian
    );
    println!("  scale factor      {}", p.scale_factor);
    println!("  false easting     {:.4}", p.false_easting);
    println!("  false northing    {:.4}", p.false_northing);
    if let Some(fit) = &outcome.projection_fit {
        println!(
            "  (estimated, {} iterations, cost {:.6} m^2)",
            fit.iterations, fit.cost
        );
    }
    let h = outcome.helmert();
    println!("Helmert (WGS84 -> local):");
    println!("  tx {:.4} m  ty {:.4} m  tz {:.4} m", h.tx, h.ty, h.tz);
    println!("  rx {:.6}\"  ry {:.6}\"  rz {:.6}\"", h.rx, h.ry, h.rz);
    println!("  scale {:.6} ppm", h.scale_ppm);
    println!("Residuals (local - recomputed, m):");
    println!("id,dN,dE,dH");
    for row in &outcome.rows {
        println!(
            "{},{:.4},{:.4},{:.4}",
            row.id, row.d_northing, row.d_easting, row.d_height
        );
    }
    println!(
        "RMS horizontal {:.4} m, height {:.4} m",
        outcome.rms_horizontal, outcome.rms_height
    );
    for warning in &outcome.warnings {
        eprintln!("Warning: {}", warning);
    }
}

#[allow(clippy::too_many_arguments)]
fn calculate(
    settings: &Settings,
    wgs: &Path,
    msk: &Path,
    pinned: PinnedProjection<'_>,
    helmert: Option<Vec<f64>>,
    estimate_scale: bool,
    name: &str,
    geoid: bool,
    output: Option<&Path>,
) -> Result<()> {
    let wgs84 = parse_geodetic_points(&read_to_string(wgs)?)?;
    let local = parse_projected_points(&read_to_string(msk)?)?;
    let mut request = CalculationRequest::new(wgs84, local).with_estimate_scale(estimate_scale);
    if let Some(projection) = pinned.resolve(settings)? {
        request = request.with_projection(projection);
    }
    if let Some(values) = helmert {
        let array: [f64; 7] = values.as_slice().try_into().map_err(|_| {
            GeoError::Validation(format!("--helmert needs 7 values, got {}", values.len()))
        })?;
        request = request.with_helmert(HelmertParameters::from_array(array));
    }

    let calculator = Calculator::new()
        .with_options(settings.optimizer.estimator_options(!estimate_scale));
    let outcome = calculator.calculate(&request)?;
    print_outcome(&outcome);

    let wkt = outcome.model.projected_crs_text(name, geoid);
    println!("{}", wkt);
    if let Some(path) = output {
        write_string(path, &wkt)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn convert<E: GeodesyEngine>(
    converter: &CoordinateConverter<E>,
    prj: &Path,
    points: &Path,
) -> Result<()> {
    let crs = converter.resolve(&read_to_string(prj)?)?;
    let text = read_to_string(points)?;
    let mut warned = false;
    println!("id,northing,easting,height");
    for row in text.lines().filter_map(parse_point_row) {
        let p = row.to_geodetic();
        let out = converter.convert_with(&crs, p.lat, p.lon, p.height)?;
        if let (Some(w), false) = (&out.warning, warned) {
            eprintln!("Warning: {}", w);
            warned = true;
        }
        println!(
            "{},{:.4},{:.4},{:.4}",
            row.id(),
            out.northing,
            out.easting,
            out.height
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let settings = match cli.config.clone().or_else(Settings::default_path) {
        Some(path) => Settings::load_or_default(&path),
        None => Settings::default(),
    };
    init_logging(&settings.logging);

    match cli.command {
        Commands::Calculate {
            wgs,
            msk,
            cm,
            scale,
            fe,
            false_northing,
            lat0,
            helmert,
            estimate_scale,
            name,
            geoid,
            output,
        } => {
            let pinned = PinnedProjection {
                cm: cm.as_deref(),
                scale,
                fe,
                fn_: false_northing,
                lat0,
            };
            calculate(
                &settings,
                &wgs,
                &msk,
                pinned,
                helmert,
                estimate_scale,
                &name,
                geoid,
                output.as_deref(),
            )
        }
        Commands::Convert {
            prj,
            points,
            geoid_grid,
        } => {
            let geoid = match geoid_grid {
                Some(grid) => GeoidSettings { grid: Some(grid) },
                None => settings.geoid.clone(),
            };
            let converter = CoordinateConverter::with_engine(geoid.engine());
            convert(&converter, &prj, &points)
        }
        Commands::Angle { command } => {
            match command {
                AngleCommand::Parse { text } => println!("{:.9}", parse_angle(&text)?),
                AngleCommand::Format { degrees } => println!("{}", format_angle(degrees)),
            }
            Ok(())
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
