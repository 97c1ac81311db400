use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

use crate::analyzers::TemporalAnalyzer;
use crate::cli::args::{parse_date, parse_district, Cli, Commands};
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::models::District;
use crate::store::{Selection, TemporalRecordStore};
use crate::utils::progress::ProgressReporter;
use crate::views::{format_count, no_data_message, selection_header, TableView};
use crate::writers::export;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    execute(cli)
}

/// Dispatch a parsed command line with logging already configured
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = PortalConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir.to_string_lossy());
    }

    let today = Local::now().date_naive();
    let mut store = TemporalRecordStore::new(config);

    match cli.command {
        Commands::Districts => {
            println!("Data directory: {}", store.config().data_dir().display());
            for district in District::ALL {
                let status = if store.config().district_path(district).exists() {
                    "available"
                } else {
                    "missing"
                };
                println!("  {:<14} {}", district.name(), status);
            }
        }

        Commands::Show {
            district,
            date,
            limit,
            json,
        } => {
            let selection = select_with_progress(&mut store, district, date, today, cli.quiet)?;
            let stdout = io::stdout();
            write_selection(&mut stdout.lock(), &selection, limit, json)?;
        }

        Commands::Export {
            district,
            date,
            format,
            output_dir,
        } => {
            let selection = select_with_progress(&mut store, district, date, today, cli.quiet)?;

            if selection.is_empty() {
                println!("No temporal data available for download.");
                return Ok(());
            }

            let artifact = export(&selection.records, format)?;
            let path = artifact
                .write_to_dir(&output_dir)
                .with_context(|| format!("Failed to write export to {}", output_dir.display()))?;

            println!(
                "Exported {} records for {} on {}",
                format_count(selection.len()),
                district,
                date
            );
            println!("{}", artifact.summary());
            println!("Written to: {}", path.display());
        }

        Commands::Info { district } => {
            let path = store.config().district_path(district);
            let progress =
                ProgressReporter::new_spinner(&format!("Loading {} data...", district), cli.quiet);
            let loaded = store.table_for(district);
            progress.clear();
            let loaded = loaded?;

            println!("District: {}", district);
            println!("File: {}", path.display());
            print!("{}", loaded.report.summary());

            match loaded.table.time_range() {
                Some((first, last)) => {
                    println!("Records: {}", format_count(loaded.table.len()));
                    println!("Time span: {} to {}", first, last);
                    println!(
                        "Distinct days: {}",
                        format_count(loaded.table.distinct_dates().len())
                    );
                }
                None => println!("No usable records"),
            }
        }

        Commands::Explore { limit } => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            explore(&mut store, stdin.lock(), stdout.lock(), today, limit)?;
        }
    }

    Ok(())
}

fn select_with_progress(
    store: &mut TemporalRecordStore,
    district: District,
    date: NaiveDate,
    today: NaiveDate,
    quiet: bool,
) -> crate::error::Result<Selection> {
    let progress = ProgressReporter::new_spinner(&format!("Loading {} data...", district), quiet);
    let selection = store.query(district, date, today);
    progress.clear();
    selection
}

/// Print one `show` selection: header, table, summary and chart span, or the
/// summary as JSON. An empty selection still states that no data matched.
pub fn write_selection<W: Write>(
    out: &mut W,
    selection: &Selection,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let analyzer = TemporalAnalyzer::new();
    let summary = analyzer.summarize(&selection.records);

    if json {
        let value = match summary {
            Some(summary) => serde_json::to_value(summary)?,
            None => serde_json::json!({
                "district": selection.district,
                "date": selection.date,
                "record_count": 0,
                "message": no_data_message(selection.district, selection.date),
            }),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    writeln!(out, "{}", selection_header(selection))?;
    writeln!(out)?;
    writeln!(out, "{}", TableView::new().with_limit(Some(limit)).render(selection))?;

    if let Some(summary) = summary {
        writeln!(out)?;
        writeln!(out, "{}", summary.detailed_summary())?;

        let title = format!(
            "PM2.5 Concentration on {} ({})",
            selection.date, selection.district
        );
        let chart = analyzer.chart_series(&selection.records, &title);
        writeln!(out, "{}", chart.describe())?;
    }

    Ok(())
}

/// Serve `<District> <YYYY-MM-DD>` selections from `input` until a blank line
/// or EOF. Recoverable problems are reported and the session carries on.
pub fn explore<R: BufRead, W: Write>(
    store: &mut TemporalRecordStore,
    input: R,
    mut output: W,
    today: NaiveDate,
    limit: usize,
) -> anyhow::Result<()> {
    let view = TableView::new().with_limit(Some(limit));

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let mut parts = line.split_whitespace();
        let (Some(district), Some(date), None) = (parts.next(), parts.next(), parts.next()) else {
            writeln!(output, "Expected '<District> <YYYY-MM-DD>', got '{}'", line)?;
            continue;
        };

        let (district, date) = match (parse_district(district), parse_date(date)) {
            (Ok(district), Ok(date)) => (district, date),
            (Err(e), _) | (_, Err(e)) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };

        match store.query(district, date, today) {
            Ok(selection) => {
                writeln!(output, "{}", selection_header(&selection))?;
                writeln!(output, "{}", view.render(&selection))?;
            }
            Err(e) if e.is_recoverable() => writeln!(output, "{}", e)?,
            Err(e) => return Err(e.into()),
        }
    }

    output.flush()?;
    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

/// True when `err` should end only the current request
pub fn is_recoverable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PortalError>()
        .is_some_and(PortalError::is_recoverable)
}

/// Line printed to stderr before exiting with a failure status
pub fn error_message(err: &anyhow::Error) -> String {
    if is_recoverable(err) {
        err.to_string()
    } else {
        format!("Error: {:#}", err)
    }
}
