//! # Gardener CLI
//!
//! `include-gardener` scans source trees and prints their include/import
//! dependency graph as Graphviz or GraphML.
//!
//! ```text
//! args + config ──> Settings ──> solver ──> FileDetector ──> StatementDetector
//!                                   │                              │
//!                                   └──────── take_graph <─────────┘
//!                                                 │
//!                                            dot | graphml
//! ```

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gardener_detector::{default_jobs, FileDetector, StatementDetector};
use gardener_graph::{write_graph, OutputFormat};
use gardener_solver::{build_solver, Language, SolverOptions};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

mod config;

pub use config::GardenerConfig;

#[derive(Parser, Debug)]
#[command(name = "include-gardener")]
#[command(about = "Dependency graphs from include and import statements", long_about = None)]
#[command(version)]
struct Cli {
    /// Source directories to scan (also the roots for absolute Python imports)
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Source language: c | python | ruby [default: c]
    #[arg(short, long, value_name = "LANG")]
    language: Option<String>,

    /// Search directory for C includes and Ruby requires (repeatable)
    #[arg(short = 'I', long = "include-path", value_name = "DIR")]
    include_paths: Vec<PathBuf>,

    /// Regex of paths to leave out (repeatable)
    #[arg(short, long, value_name = "REGEX")]
    exclude: Vec<String>,

    /// Maximum directory depth below each PATH (0 = top directory only)
    #[arg(short, long, value_name = "N")]
    recursive_limit: Option<usize>,

    /// Worker threads [default: INCLUDE_GARDENER_JOBS or CPU count]
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Output format: dot | xml [default: dot]
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// Write the graph to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    out_file: Option<PathBuf>,

    /// TOML config file; command-line values take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log errors only
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

/// Effective run settings after merging the config file and the arguments
#[derive(Debug, Clone)]
pub struct Settings {
    pub language: Language,
    pub paths: Vec<PathBuf>,
    pub include_paths: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub recursive_limit: Option<usize>,
    pub jobs: usize,
    pub format: OutputFormat,
    pub out_file: Option<PathBuf>,
}

impl Settings {
    fn resolve(cli: Cli, config: GardenerConfig) -> Result<Self> {
        let language = cli
            .language
            .or(config.language)
            .unwrap_or_else(|| Language::C.as_str().to_string())
            .parse::<Language>()?;

        let format = match cli.format.or(config.format) {
            Some(raw) => raw.parse::<OutputFormat>()?,
            None => OutputFormat::default(),
        };

        let jobs = cli.jobs.or(config.jobs).unwrap_or_else(default_jobs);
        if jobs == 0 {
            return Err(anyhow!("--jobs must be at least 1"));
        }

        let paths = cli
            .paths
            .into_iter()
            .map(|path| match path.canonicalize() {
                Ok(abs) => abs,
                Err(err) => {
                    log::debug!("Cannot canonicalize {}: {err}", path.display());
                    path
                }
            })
            .collect();

        Ok(Self {
            language,
            paths,
            include_paths: config.include_paths.into_iter().chain(cli.include_paths).collect(),
            exclude: config.exclude.into_iter().chain(cli.exclude).collect(),
            recursive_limit: cli.recursive_limit.or(config.recursive_limit),
            jobs,
            format,
            out_file: cli.out_file,
        })
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if verbose == 1 {
        builder.filter_level(log::LevelFilter::Debug);
    } else if verbose > 1 {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.target(env_logger::Target::Stderr).init();
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => GardenerConfig::load(path)?,
        None => GardenerConfig::default(),
    };
    let settings = Settings::resolve(cli, config)?;
    run(&settings)
}

/// Build the graph for `settings` and write it out
pub fn run(settings: &Settings) -> Result<()> {
    let options = SolverOptions::default()
        .with_include_paths(settings.include_paths.iter().cloned())
        .with_process_paths(settings.paths.iter().cloned());
    let solver = build_solver(settings.language, options).context("Failed to create solver")?;

    let files = FileDetector::new(solver.file_pattern(), settings.exclude.as_slice())
        .context("Invalid file filter")?
        .with_process_paths(settings.paths.iter().cloned())
        .with_recursive_limit(settings.recursive_limit)
        .collect(solver.as_ref());

    let detector = StatementDetector::new(Arc::clone(&solver), settings.jobs)
        .context("Failed to start statement detector")?;
    for file in files {
        detector.submit(file);
    }
    detector
        .await_completion()
        .context("Statement detection failed")?;

    let graph = solver.take_graph();
    log::info!(
        "Graph has {} vertices and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    match &settings.out_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_graph(&graph, settings.format, &mut out)?;
            out.flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let mut out = io::stdout().lock();
            if let Err(err) = write_graph(&graph, settings.format, &mut out) {
                if is_broken_pipe(&err) {
                    return Ok(());
                }
                return Err(err.into());
            }
        }
    }
    Ok(())
}

fn is_broken_pipe(err: &gardener_graph::GraphError) -> bool {
    matches!(err, gardener_graph::GraphError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
}
