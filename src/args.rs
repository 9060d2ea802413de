use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command line arguments for the warded daemon.
#[derive(Parser, Clone, Debug)]
#[command(name = "warded", about = "Home monitoring status daemon")]
pub struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, default_value_t = 5001)]
    pub port: u16,

    /// Directory for per-event snapshot images
    #[arg(long, default_value = "events")]
    pub events_dir: PathBuf,

    /// Path of the persisted danger list
    #[arg(long, default_value = "danger_list.json")]
    pub danger_list: PathBuf,

    /// Logging verbosity level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
        }
    }
}
