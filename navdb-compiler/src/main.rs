// navdb-compiler/src/main.rs
// Compiles simulator scenery or X-Plane navigation data into a SQLite
// navigation database.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use navdata_schema::{NavDatabaseErrors, NavDatabaseOptions, NavDbObjectType, SimulatorType};
use navdb_compiler::{NavDatabase, Outcome, ProgressHandler, ProgressReport, Step};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI args
// ---------------------------------------------------------------------------

/// Flags override the values of the options file.
#[derive(Parser)]
#[command(name = "navdb-compiler", version, about = "Build a navigation database from simulator scenery")]
struct Args {
    /// JSON file with compile options
    #[arg(long)] options:            Option<PathBuf>,
    /// FSX, FSXSE, P3DV3, P3DV4, P3DV5, MSFS, MSFS2024, XP11 or XP12
    #[arg(long)] simulator:          Option<SimulatorType>,
    #[arg(long)] base_path:          Option<PathBuf>,
    #[arg(long)] scenery_file:       Option<PathBuf>,
    #[arg(long = "addon-dir")] addon_directories: Vec<PathBuf>,
    /// Object type to leave out, like BOUNDARY or AIRPORT_MSA
    #[arg(long = "exclude-object")] excluded_objects: Vec<NavDbObjectType>,
    #[arg(long = "include-path")] include_paths: Vec<String>,
    #[arg(long = "exclude-path")] exclude_paths: Vec<String>,
    #[arg(long)] read_inactive:      bool,
    #[arg(long)] no_addon_xml:       bool,
    #[arg(long)] no_resolve_airways: bool,
    #[arg(long)] no_deduplicate:     bool,
    #[arg(long)] route_tables:       bool,
    #[arg(long)] write_incomplete:   bool,
    /// Log table counts, duplicates and invalid coordinates at the end
    #[arg(long)] report:             bool,
    #[arg(long)] autocommit:         bool,
    /// Write the collected file errors as JSON
    #[arg(long)] errors_json:        Option<PathBuf>,
    #[arg(short, long)] verbose:     bool,
    #[arg(short, long)] output:      PathBuf,
}

impl Args {
    fn compile_options(&self) -> Result<NavDatabaseOptions> {
        let mut options = match &self.options {
            Some(path) => NavDatabaseOptions::from_json_file(path)?,
            None => NavDatabaseOptions::default(),
        };

        if let Some(simulator) = self.simulator {
            options.simulator = simulator;
        }
        if let Some(base_path) = &self.base_path {
            options.base_path = base_path.clone();
        }
        if self.scenery_file.is_some() {
            options.scenery_file = self.scenery_file.clone();
        }
        if !self.addon_directories.is_empty() {
            options.addon_directories = self.addon_directories.clone();
        }
        for object in &self.excluded_objects {
            options.exclude(*object);
        }
        if !self.include_paths.is_empty() || !self.exclude_paths.is_empty() {
            options.set_path_filters(self.include_paths.clone(), self.exclude_paths.clone())?;
        }

        options.read_inactive |= self.read_inactive;
        options.read_addon_xml &= !self.no_addon_xml;
        options.resolve_airways &= !self.no_resolve_airways;
        options.deduplicate &= !self.no_deduplicate;
        options.create_route_tables |= self.route_tables;
        options.write_incomplete |= self.write_incomplete;
        options.database_report |= self.report;
        options.autocommit |= self.autocommit;
        options.verbose |= self.verbose;
        options.validate()?;
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    let options = args.compile_options().context("Invalid options")?;

    let level = if options.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if args.output.exists() {
        std::fs::remove_file(&args.output)
            .with_context(|| format!("Failed to remove {}", args.output.display()))?;
    }
    let conn = Connection::open(&args.output).context("Failed to open output database")?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

    let mut progress = ProgressHandler::new(|report: &ProgressReport| {
        match report.step {
            Step::SceneryArea(area) => eprintln!("[{}/{}] {}", report.current, report.total, area.title),
            Step::Other(message) => eprintln!("[{}/{}] {message}", report.current, report.total),
            Step::File(_) | Step::Finished => {}
        }
        false
    });
    let mut errors = NavDatabaseErrors::default();

    let outcome = NavDatabase::new(&conn, &options)
        .create(&mut progress, &mut errors)
        .context("Compiling the navigation database failed")?;
    if outcome == Outcome::Aborted {
        bail!("Compilation aborted");
    }

    let c = progress.counters;
    eprintln!("Done. Counts:");
    eprintln!("  files:      {}", c.files);
    eprintln!("  airports:   {}", c.airports);
    eprintln!("  vors:       {}", c.vors);
    eprintln!("  ils:        {}", c.ils);
    eprintln!("  ndbs:       {}", c.ndbs);
    eprintln!("  markers:    {}", c.markers);
    eprintln!("  waypoints:  {}", c.waypoints);
    eprintln!("  boundaries: {}", c.boundaries);
    eprintln!("  procedures: {}", c.procedures);
    eprintln!("  errors:     {}", c.errors);

    for area in &errors.scenery_errors {
        eprintln!("Errors in {}", area.scenery.describe());
        for message in &area.messages {
            eprintln!("  {message}");
        }
        for file in &area.file_errors {
            match file.line {
                Some(line) => eprintln!("  {}:{line}: {}", file.filepath, file.message),
                None => eprintln!("  {}: {}", file.filepath, file.message),
            }
        }
    }

    if let Some(path) = &args.errors_json {
        let json = serde_json::to_string_pretty(&errors)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
