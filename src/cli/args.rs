use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::District;
use crate::writers::ExportFormat;

#[derive(Parser)]
#[command(name = "pm25-portal")]
#[command(about = "Explore district-level PM2.5 ground-station measurements")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the loading spinner")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file [default: pm25-portal.toml]")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Directory holding Cleaned_<District> files (overrides configuration)"
    )]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List districts and whether their data file is present
    Districts,

    /// Show the records for one district on one date
    Show {
        #[arg(short, long, value_parser = parse_district)]
        district: District,

        #[arg(short = 't', long, value_parser = parse_date, help = "Date as YYYY-MM-DD")]
        date: NaiveDate,

        #[arg(short, long, help = "Maximum rows to print (0 = all)", default_value = "0")]
        limit: usize,

        #[arg(long, help = "Print the summary as JSON instead of a table")]
        json: bool,
    },

    /// Export one district's records for a date as CSV or Excel
    Export {
        #[arg(short, long, value_parser = parse_district)]
        district: District,

        #[arg(short = 't', long, value_parser = parse_date, help = "Date as YYYY-MM-DD")]
        date: NaiveDate,

        #[arg(short, long, value_parser = parse_format, default_value = "csv")]
        format: ExportFormat,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },

    /// Describe a district's data file
    Info {
        #[arg(short, long, value_parser = parse_district)]
        district: District,
    },

    /// Read `<District> <YYYY-MM-DD>` selections from stdin, one per line
    Explore {
        #[arg(short, long, help = "Maximum rows to print per selection (0 = all)", default_value = "0")]
        limit: usize,
    },
}

pub fn parse_district(value: &str) -> Result<District, String> {
    value.parse::<District>().map_err(|e| e.to_string())
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

pub fn parse_format(value: &str) -> Result<ExportFormat, String> {
    value.parse::<ExportFormat>().map_err(|e| e.to_string())
}
