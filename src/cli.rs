//! Command-line driver.
//!
//! Thin wrapper around the measurement core: resolves a named benchmark and
//! its sample domains, runs either the two-dimensional sampling loop or the
//! fixed-input loop on the benchmark's designated run context, and streams
//! tab-separated rows to stdout. All configuration errors terminate with
//! the usage text and exit status 1 before any measurement begins.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::catalog::{self, BenchmarkSpec, CATALOG};
use crate::input::{self, InputParams};
use crate::sampling::{Domain, Generator};
use crate::stats::SampleStats;
use crate::{ambient, exec, harness};

const DEFAULT_VALUES: Domain = Domain::linear(1, 1_000);
const DEFAULT_OBJECTS: Domain = Domain::linear(10, 100_000);
const DEFAULT_POINTS: usize = 5_000;

#[derive(Parser, Debug)]
#[command(name = "dropmark", disable_version_flag = true)]
struct Cli {
    /// Benchmark name from the catalog.
    benchmark: String,

    /// Ambient-depth domain as MIN:MAX:(linear|logarithmic); empty fields
    /// keep the defaults.
    #[arg(long, value_name = "MIN:MAX:DIST", conflicts_with = "input")]
    values: Option<String>,

    /// Object-count domain, same format as --values.
    #[arg(long, value_name = "MIN:MAX:DIST", conflicts_with = "input")]
    objects: Option<String>,

    /// Number of sample points.
    #[arg(long, value_name = "N", conflicts_with = "input")]
    points: Option<usize>,

    /// Fixed-input file of tab-separated (contextDepth, objectCount) pairs.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Per-node synthetic cleanup cost (fixed-input mode).
    #[arg(long, value_name = "N", requires = "input")]
    ballast: Option<u32>,

    /// Repetitions per input row, aggregated to mean and stddev
    /// (fixed-input mode).
    #[arg(long, value_name = "N", requires = "input")]
    reps: Option<usize>,

    /// Also write every row to FILE as JSON.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

enum Mode {
    Sampled,
    Fixed {
        path: PathBuf,
        ballast: u32,
        reps: usize,
    },
}

struct Config {
    spec: &'static BenchmarkSpec,
    values: Domain,
    objects: Domain,
    points: usize,
    mode: Mode,
    json: Option<PathBuf>,
}

impl Config {
    fn resolve(cli: Cli) -> Result<Self> {
        let spec = catalog::find(&cli.benchmark)
            .ok_or_else(|| anyhow!("invalid benchmark name \"{}\"", cli.benchmark))?;

        let mut values = DEFAULT_VALUES;
        if let Some(s) = &cli.values {
            values.merge_str(s).map_err(|err| anyhow!("--values: {err}"))?;
        }
        let mut objects = DEFAULT_OBJECTS;
        if let Some(s) = &cli.objects {
            objects
                .merge_str(s)
                .map_err(|err| anyhow!("--objects: {err}"))?;
        }

        let points = cli.points.unwrap_or(DEFAULT_POINTS);
        if points == 0 {
            bail!("--points must be positive");
        }

        let mode = match cli.input {
            Some(path) => {
                let reps = cli.reps.unwrap_or(1);
                if reps == 0 {
                    bail!("--reps must be positive");
                }
                Mode::Fixed {
                    path,
                    ballast: cli.ballast.unwrap_or(0),
                    reps,
                }
            }
            None => Mode::Sampled,
        };

        Ok(Self {
            spec,
            values,
            objects,
            points,
            mode,
            json: cli.json,
        })
    }

    /// The resolved invocation, echoed in the output header and JSON dump.
    fn describe(&self) -> String {
        match &self.mode {
            Mode::Sampled => format!(
                "{} --values={} --objects={} --points={}",
                self.spec.name, self.values, self.objects, self.points
            ),
            Mode::Fixed {
                path,
                ballast,
                reps,
            } => format!(
                "{} --input={} --ballast={} --reps={}",
                self.spec.name,
                path.display(),
                ballast,
                reps
            ),
        }
    }
}

/// Duration statistics in integer nanoseconds, for rows and the JSON dump.
#[derive(Debug, Clone, Copy, Serialize)]
struct StatsNs {
    mean_ns: i64,
    sigma_ns: i64,
}

impl From<SampleStats> for StatsNs {
    fn from(stats: SampleStats) -> Self {
        Self {
            mean_ns: nanos(stats.average),
            sigma_ns: nanos(stats.stddev),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct RowDetail {
    test_schedule: StatsNs,
    test_total: StatsNs,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline_schedule: Option<StatsNs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline_total: Option<StatsNs>,
}

/// One output row. `schedule_ns`/`total_ns` are `test − baseline` deltas
/// when the benchmark carries a baseline, raw readings otherwise.
#[derive(Debug, Clone, Serialize)]
struct Row {
    values: usize,
    objects: usize,
    schedule_ns: i64,
    total_ns: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<RowDetail>,
}

#[derive(Serialize)]
struct Report<'a> {
    benchmark: &'a str,
    command: String,
    rows: &'a [Row],
}

fn nanos(duration: Duration) -> i64 {
    duration.as_nanos() as i64
}

/// Entry point for the binary. Returns the process exit status.
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::resolve(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match execute(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!(
        "Usage: dropmark BENCHMARK_NAME [--values=MIN:MAX:(linear|logarithmic)] \
         [--objects=MIN:MAX:(linear|logarithmic)] [--points=POINTS] [--json=FILE]"
    );
    println!("       dropmark BENCHMARK_NAME --input=FILE [--ballast=N] [--reps=N] [--json=FILE]");
    println!("Possible benchmark names:");
    let mut specs: Vec<_> = CATALOG.iter().collect();
    specs.sort_by_key(|spec| spec.name);
    for spec in specs {
        println!("  * {} - {}", spec.name, spec.help);
    }
}

fn execute(config: &Config) -> Result<()> {
    info!(benchmark = config.spec.name, "starting run");
    let rows = match &config.mode {
        Mode::Sampled => run_sampled(config),
        Mode::Fixed {
            path,
            ballast,
            reps,
        } => run_fixed(config, path, *ballast, *reps)?,
    };
    if let Some(path) = &config.json {
        write_json(config, &rows, path)?;
    }
    Ok(())
}

/// Runs `body` on the benchmark's designated run context, or on the calling
/// thread when the spec has none.
fn on_run_context<R, F>(spec: &'static BenchmarkSpec, body: F) -> R
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    match spec.run_context {
        Some(id) => exec::run_on(id, body),
        None => body(),
    }
}

fn run_sampled(config: &Config) -> Vec<Row> {
    let spec = config.spec;
    println!("# {}", config.describe());
    println!("#");
    print_row_header(spec.baseline.is_some(), false);

    let values = config.values;
    let objects = config.objects;
    let points = config.points;

    on_run_context(spec, move || {
        harness::warm_up(spec.topology, spec.test, spec.baseline, 0);
        let mut value_gen = Generator::new(&values);
        let mut object_gen = Generator::new(&objects);
        let mut rows = Vec::with_capacity(points);
        for i in 0..points {
            let depth = value_gen.generate();
            let count = object_gen.generate();
            let row = ambient::with_depth(depth, || single_row(spec, depth, count, 0));
            print_row(&row);
            rows.push(row);
            eprint!("\r{}/{}", i + 1, points);
        }
        eprintln!();
        rows
    })
}

fn run_fixed(config: &Config, path: &Path, ballast: u32, reps: usize) -> Result<Vec<Row>> {
    let spec = config.spec;
    let parsed =
        input::parse_file(path).with_context(|| format!("reading {}", path.display()))?;
    for diagnostic in &parsed.skipped {
        eprintln!("{}: {}", path.display(), diagnostic);
    }

    println!("# {}", config.describe());
    println!("#");
    print_row_header(spec.baseline.is_some(), reps > 1);

    let rows_in = parsed.rows;
    let total = rows_in.len();

    Ok(on_run_context(spec, move || {
        harness::warm_up(spec.topology, spec.test, spec.baseline, ballast);
        let mut rows = Vec::with_capacity(total);
        for (i, params) in rows_in.into_iter().enumerate() {
            let row = ambient::with_depth(params.values, || {
                if reps > 1 {
                    stats_row(spec, params, ballast, reps)
                } else {
                    single_row(spec, params.values, params.objects, ballast)
                }
            });
            print_row(&row);
            rows.push(row);
            eprint!("\r{}/{}", i + 1, total);
        }
        eprintln!();
        rows
    }))
}

fn print_row_header(with_baseline: bool, with_stats: bool) {
    let delta = if with_baseline { "Δ" } else { "" };
    if with_stats {
        if with_baseline {
            println!(
                "# values objects test:schedule(ns) σ test:total(ns) σ \
                 base:schedule(ns) σ base:total(ns) σ Δschedule(ns) Δtotal(ns)"
            );
        } else {
            println!("# values objects schedule(ns) σ total(ns) σ");
        }
    } else {
        println!("# values objects {delta}schedule(ns) {delta}total(ns)");
    }
}

fn print_row(row: &Row) {
    match &row.detail {
        Some(detail) => {
            let mut line = format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.values,
                row.objects,
                detail.test_schedule.mean_ns,
                detail.test_schedule.sigma_ns,
                detail.test_total.mean_ns,
                detail.test_total.sigma_ns,
            );
            if let (Some(schedule), Some(total)) =
                (detail.baseline_schedule, detail.baseline_total)
            {
                line.push_str(&format!(
                    "\t{}\t{}\t{}\t{}\t{}\t{}",
                    schedule.mean_ns,
                    schedule.sigma_ns,
                    total.mean_ns,
                    total.sigma_ns,
                    row.schedule_ns,
                    row.total_ns
                ));
            }
            println!("{line}");
        }
        None => println!(
            "{}\t{}\t{}\t{}",
            row.values, row.objects, row.schedule_ns, row.total_ns
        ),
    }
}

/// Measures test (and baseline, when present) once; rows carry deltas when
/// a baseline exists. Measurement order is fixed test-then-baseline.
fn single_row(spec: &'static BenchmarkSpec, depth: usize, objects: usize, ballast: u32) -> Row {
    let test = harness::measure(spec.topology, spec.test, objects, ballast);
    let (schedule_ns, total_ns) = match spec.baseline {
        Some(baseline) => {
            let base = harness::measure(spec.topology, baseline, objects, ballast);
            (
                nanos(test.schedule) - nanos(base.schedule),
                nanos(test.total) - nanos(base.total),
            )
        }
        None => (nanos(test.schedule), nanos(test.total)),
    };
    Row {
        values: depth,
        objects,
        schedule_ns,
        total_ns,
        detail: None,
    }
}

fn stats_row(spec: &'static BenchmarkSpec, params: InputParams, ballast: u32, reps: usize) -> Row {
    let (test_schedule, test_total) =
        harness::measure_average(spec.topology, spec.test, params.objects, ballast, reps);
    let baseline = spec
        .baseline
        .map(|b| harness::measure_average(spec.topology, b, params.objects, ballast, reps));

    let (schedule_ns, total_ns) = match baseline {
        Some((base_schedule, base_total)) => (
            nanos(test_schedule.average) - nanos(base_schedule.average),
            nanos(test_total.average) - nanos(base_total.average),
        ),
        None => (nanos(test_schedule.average), nanos(test_total.average)),
    };

    Row {
        values: params.values,
        objects: params.objects,
        schedule_ns,
        total_ns,
        detail: Some(RowDetail {
            test_schedule: test_schedule.into(),
            test_total: test_total.into(),
            baseline_schedule: baseline.map(|(schedule, _)| schedule.into()),
            baseline_total: baseline.map(|(_, total)| total.into()),
        }),
    }
}

fn write_json(config: &Config, rows: &[Row], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let report = Report {
        benchmark: config.spec.name,
        command: config.describe(),
        rows,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let mut argv = vec!["dropmark"];
        argv.extend_from_slice(args);
        Config::resolve(Cli::try_parse_from(argv).map_err(|err| anyhow!("{err}"))?)
    }

    #[test]
    fn unknown_benchmark_is_rejected() {
        assert!(parse(&["no_such_benchmark"]).is_err());
    }

    #[test]
    fn defaults_apply_without_flags() {
        let config = parse(&["async_tree"]).unwrap();
        assert_eq!(config.values, DEFAULT_VALUES);
        assert_eq!(config.objects, DEFAULT_OBJECTS);
        assert_eq!(config.points, DEFAULT_POINTS);
        assert!(matches!(config.mode, Mode::Sampled));
    }

    #[test]
    fn domain_flags_merge_over_defaults() {
        let config = parse(&["async_tree", "--values=5:10:logarithmic", "--objects=::"]).unwrap();
        assert_eq!(config.values.min, 5);
        assert_eq!(config.values.max, 10);
        assert_eq!(config.objects, DEFAULT_OBJECTS);
    }

    #[test]
    fn malformed_domain_is_rejected() {
        assert!(parse(&["async_tree", "--values=a:10"]).is_err());
        assert!(parse(&["async_tree", "--objects=10:5"]).is_err());
    }

    #[test]
    fn zero_points_is_rejected() {
        assert!(parse(&["async_tree", "--points=0"]).is_err());
    }

    #[test]
    fn input_mode_carries_ballast_and_reps() {
        let config =
            parse(&["isolated_hop_reset", "--input=pairs.tsv", "--ballast=4", "--reps=3"])
                .unwrap();
        match config.mode {
            Mode::Fixed {
                path,
                ballast,
                reps,
            } => {
                assert_eq!(path, PathBuf::from("pairs.tsv"));
                assert_eq!(ballast, 4);
                assert_eq!(reps, 3);
            }
            Mode::Sampled => panic!("expected fixed-input mode"),
        }
    }

    #[test]
    fn sampling_flags_conflict_with_input() {
        assert!(parse(&["async_tree", "--input=f.tsv", "--points=10"]).is_err());
    }

    #[test]
    fn ballast_requires_input() {
        assert!(parse(&["async_tree", "--ballast=4"]).is_err());
    }
}
