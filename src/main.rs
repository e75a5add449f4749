use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{
    error,
    info,
    warn
};
use tracing_subscriber::EnvFilter;

use ecdfmodel::configuration::Configuration;
use ecdfmodel::distribution::curvebuilder::{
    CurveBuilder,
    CurveType
};
use ecdfmodel::distribution::parametriccdf::DistributionFamily;
use ecdfmodel::error::modelerror::ModelError;
use ecdfmodel::fit::cancellation::CancellationToken;
use ecdfmodel::fit::fitpoint::FitPoint;
use ecdfmodel::fit::parametersearch::ParameterSearch;
use ecdfmodel::math::curve::curve::Curve;
use ecdfmodel::math::curve::plot::Plot;
use ecdfmodel::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use ecdfmodel::sample::sampleparser::parse_table;
use ecdfmodel::sample::sampletable::SampleTable;

#[derive(Parser)]
#[command(name = "ecdfmodel", about = "Fit 2-parameter distributions to samples by Kolmogorov-Smirnov score")]
struct Cli {
    /// Whitespace/comma separated samples, or a JSON [[value, count], ...] table
    samples: PathBuf,
    /// JSON configuration file
    config: Option<PathBuf>,
}

const REPORTED_QUANTILES: [f64; 5] = [0.1, 0.25, 0.5, 0.75, 0.9];

#[derive(Serialize)]
struct QuantileReport {
    q: f64,
    value: Option<f64>,
}

#[derive(Serialize)]
struct SampleReport {
    distinct: usize,
    total: u64,
    mean: Option<f64>,
    stddev: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    quantiles: Vec<QuantileReport>,
}

#[derive(Serialize)]
struct CurveReport {
    curve_type: CurveType,
    min_x: f64,
    max_x: f64,
    points: Vec<Point2D>,
}

#[derive(Serialize)]
struct SurfaceReport {
    family: DistributionFamily,
    resolution: usize,
    rows: usize,
    columns: usize,
    best_cell: (usize, usize),
}

#[derive(Serialize)]
struct FitReport {
    best: FitPoint,
    best_curve: Vec<Point2D>,
    refined: Option<FitPoint>,
    surface: SurfaceReport,
}

#[derive(Serialize)]
struct Report {
    samples: SampleReport,
    curve: CurveReport,
    fit: Option<FitReport>,
}

fn sample_report(table: &SampleTable) -> SampleReport {
    let mean = table.mean();
    let ecdf = table.interpolate();
    let quantiles = REPORTED_QUANTILES
        .iter()
        .map(|&q| {
            let value = ecdf.quantile(q);
            QuantileReport { q, value: value.is_finite().then_some(value) }
        })
        .collect();
    SampleReport {
        distinct: table.len(),
        total: table.total(),
        mean,
        stddev: mean.and_then(|m| table.stddev(m)),
        min: table.min(),
        max: table.max(),
        quantiles,
    }
}

fn fit_report(
    config: &Configuration,
    table: &SampleTable,
    plot: &Plot,
) -> Result<Option<FitReport>, ModelError> {
    let mut search = ParameterSearch::from_configuration(config.search())?;
    search.set_samples(table.clone());
    let surface = match search.scan(&CancellationToken::new()) {
        Ok(surface) => surface,
        Err(ModelError::InsufficientSamples { required, actual }) => {
            warn!(required, actual, "not enough observations for a parameter search");
            return Ok(None);
        }
        Err(error) => return Err(error),
    };
    let (rows, columns) = surface.p_values().shape();
    let best = surface.best().clone();
    let surface = SurfaceReport {
        family: surface.family(),
        resolution: surface.resolution(),
        rows,
        columns,
        best_cell: surface.best_cell(),
    };
    let refined = if config.search().refine() {
        Some(search.refine()?.clone())
    } else {
        None
    };
    let best_curve = best.cdf().tabulate(plot.min_x(), plot.max_x(), config.curve().columns());
    Ok(Some(FitReport { best, best_curve, refined, surface }))
}

fn run(cli: &Cli) -> Result<Report, ModelError> {
    let config = match &cli.config {
        Some(path) => Configuration::from_reader(path)?,
        None => Configuration::new(),
    };
    let text = fs::read_to_string(&cli.samples)?;
    let table = parse_table(&text)?;
    info!(distinct = table.len(), total = table.total(), "samples loaded");

    let curve_config = config.curve();
    let plot = CurveBuilder::from_configuration(curve_config).build(&table, curve_config.curve_type());
    let fit = fit_report(&config, &table, &plot)?;
    let curve = CurveReport {
        curve_type: curve_config.curve_type(),
        min_x: plot.min_x(),
        max_x: plot.max_x(),
        points: plot.sample(curve_config.columns()),
    };

    Ok(Report {
        samples: sample_report(&table),
        curve,
        fit,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = run(&cli).and_then(|report| Ok(serde_json::to_string_pretty(&report)?));
    match report {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!(%error, "ecdfmodel failed");
            ExitCode::FAILURE
        }
    }
}
