use clap::{Parser, Subcommand, ValueEnum};
use emolens_telemetry::ExportFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "emolens")]
#[command(
    author,
    version,
    about = "Emotion classification for free text, with a visit and prediction monitor"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        env = "EMOLENS_CONFIG",
        default_value = "emolens.yaml"
    )]
    pub config: PathBuf,

    /// SQLite database holding the visit and prediction logs
    #[arg(long, global = true, env = "EMOLENS_DATABASE")]
    pub database: Option<PathBuf>,

    /// Model artifact (JSON); the built-in lexicon is used when unset
    #[arg(short, long, global = true)]
    pub model: Option<PathBuf>,

    /// Label table version the model was trained with
    #[arg(long, global = true)]
    pub label_table: Option<String>,

    /// Classify blank or whitespace-only text instead of rejecting it
    #[arg(long, global = true)]
    pub allow_blank: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Listen address
        #[arg(short, long)]
        address: Option<String>,

        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify one piece of text and print the result as JSON
    Classify {
        /// Text to classify
        text: String,

        /// Also append the prediction to the log
        #[arg(long)]
        record: bool,
    },

    /// Dump a log table
    Export {
        /// Which log to dump
        #[arg(value_enum)]
        table: LogTable,

        /// Output format: jsonl, json or csv
        #[arg(short, long, default_value = "jsonl", value_parser = parse_format)]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTable {
    Visits,
    Predictions,
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|e: emolens_core::Error| e.to_string())
}
