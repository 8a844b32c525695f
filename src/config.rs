//! Configuration handling for the ThermoHub client.
//!
//! This module provides the library-level [`ClientOptions`] and the command line
//! configuration of the `thermohub` binary (CLI arguments and environment variables).

use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BATCH_SIZE: u32 = 1000;
pub const MAX_BATCH_SIZE: u32 = 10_000;
/// Relative directory ThermoFun reads databases from.
pub const DEFAULT_OUTPUT_DIR: &str = "Resources/databases";

/// Options that shape how a client talks to ThermoHub and where it saves datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Documents per cursor batch
    pub batch_size: u32,
    /// Directory used by save operations without an explicit file
    pub output_dir: PathBuf,
}

impl ClientOptions {
    /// Get the request timeout as a Duration.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the connect timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Batch size clamped to [1, MAX_BATCH_SIZE].
    pub fn effective_batch_size(&self) -> u32 {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }

    /// Validate options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout must be greater than 0".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout must be greater than 0".to_string());
        }
        if self.connect_timeout_secs > self.timeout_secs {
            return Err(format!(
                "connect_timeout ({}) cannot exceed timeout ({})",
                self.connect_timeout_secs, self.timeout_secs
            ));
        }
        Ok(())
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Commands of the `thermohub` binary.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the ThermoDataSet symbols available on the server
    Datasets,
    /// Print the ArangoDB server version
    Version,
    /// List the elements of a ThermoDataSet
    Elements { dataset: String },
    /// List the substances of a ThermoDataSet
    Substances { dataset: String },
    /// List the distinct substance classes of a ThermoDataSet
    Classes { dataset: String },
    /// List the distinct aggregate states of a ThermoDataSet
    States { dataset: String },
    /// Print the whole ThermoDataSet database as JSON
    Database { dataset: String },
    /// Save a ThermoDataSet database to a JSON file
    Save {
        dataset: String,
        /// Output file (default: <output-dir>/<dataset>.json)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Save the part of a ThermoDataSet built from the given elements
    Subset {
        dataset: String,
        /// Element symbols, comma separated (unknown symbols are ignored)
        #[arg(short, long, value_delimiter = ',', required = true)]
        elements: Vec<String>,
        /// Output file (default: <output-dir>/<dataset>-<elements>.json)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Parse a chemical formula and print its element composition
    Formula {
        formula: String,
        /// Parse sublattice moieties instead of elements
        #[arg(long)]
        moieties: bool,
    },
}

/// Configuration for the `thermohub` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "thermohub",
    about = "Query ThermoHub thermodatasets and save them as local JSON databases",
    version,
    author
)]
pub struct Config {
    /// JSON connection configuration file (default: public ThermoHub server)
    #[arg(short, long, value_name = "FILE", env = "THERMOHUB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory for saved databases
    #[arg(
        short,
        long,
        default_value = DEFAULT_OUTPUT_DIR,
        env = "THERMOHUB_OUTPUT_DIR",
        global = true
    )]
    pub output_dir: PathBuf,

    /// Request timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "THERMOHUB_TIMEOUT",
        global = true
    )]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "THERMOHUB_CONNECT_TIMEOUT",
        global = true
    )]
    pub connect_timeout: u64,

    /// Documents fetched per cursor batch
    #[arg(
        long,
        default_value_t = DEFAULT_BATCH_SIZE,
        env = "THERMOHUB_BATCH_SIZE",
        global = true
    )]
    pub batch_size: u32,

    /// Output format for listings
    #[arg(
        short,
        long,
        value_enum,
        default_value = "plain",
        env = "THERMOHUB_FORMAT",
        global = true
    )]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "THERMOHUB_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "THERMOHUB_JSON_LOGS", global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Client options derived from the command line.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout_secs: self.timeout,
            connect_timeout_secs: self.connect_timeout,
            batch_size: self.batch_size,
            output_dir: self.output_dir.clone(),
        }
    }
}
