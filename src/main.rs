//! ThermoHub client - command line entry point.
//!
//! Lists the contents of ThermoHub thermodatasets and saves them as local JSON
//! databases. Data goes to stdout, logs to stderr.

use serde_json::{Value as JsonValue, json};
use std::process::ExitCode;
use thermohub_client::config::{Command, Config};
use thermohub_client::format::{ColumnInfo, OutputFormat, Row, render_list, render_rows};
use thermohub_client::formula::{parse_formula, parse_moieties};
use thermohub_client::{ConnectionConfig, DatabaseClient, HubResult, SavedDatabase};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse_args();
    init_tracing(&config);

    debug!(
        command = ?config.command,
        format = %config.format,
        "Starting thermohub v{}",
        env!("CARGO_PKG_VERSION")
    );

    match run(&config).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> HubResult<String> {
    let format = config.format;

    // Formula parsing is local, so the client is only built by commands that query ThermoHub.
    let client = || -> HubResult<DatabaseClient> {
        let connection = ConnectionConfig::resolve(config.config.as_deref())?;
        debug!(server = %connection.masked_url(), "Resolved connection");
        DatabaseClient::with_config(connection, config.client_options())
    };

    let output = match &config.command {
        Command::Formula { formula, moieties } => {
            if *moieties {
                render_moieties(format, formula)?
            } else {
                render_formula(format, formula)?
            }
        }
        Command::Datasets => {
            let symbols = client()?.thermo_dataset_symbols().await?;
            render_plain_strings(format, "thermodataset", symbols)
        }
        Command::Version => {
            let version = client()?.server_version().await?;
            render_plain_strings(format, "version", vec![version])
        }
        Command::Elements { dataset } => render_list(
            format,
            "element",
            &client()?.elements_in_thermo_dataset(dataset).await?,
        ),
        Command::Substances { dataset } => render_list(
            format,
            "substance",
            &client()?.substances_in_thermo_dataset(dataset).await?,
        ),
        Command::Classes { dataset } => render_list(
            format,
            "class",
            &client()?
                .substance_classes_in_thermo_dataset(dataset)
                .await?,
        ),
        Command::States { dataset } => render_list(
            format,
            "aggregate_state",
            &client()?
                .substance_aggregate_states_in_thermo_dataset(dataset)
                .await?,
        ),
        Command::Database { dataset } => {
            let mut text = client()?.database_json(dataset).await?;
            text.push('\n');
            text
        }
        Command::Save { dataset, file } => {
            let client = client()?;
            let saved = match file {
                Some(path) => client.save_database_to(dataset, path).await?,
                None => client.save_database(dataset).await?,
            };
            render_saved(format, &saved)
        }
        Command::Subset {
            dataset,
            elements,
            file,
        } => {
            let client = client()?;
            let saved = match file {
                Some(path) => {
                    client
                        .save_database_subset_to(dataset, elements.as_slice(), path)
                        .await?
                }
                None => {
                    client
                        .save_database_subset(dataset, elements.as_slice())
                        .await?
                }
            };
            render_saved(format, &saved)
        }
    };

    Ok(output)
}

/// Listings of plain strings; JSON-encode them so `render_list` sees raw JSON text.
fn render_plain_strings(format: OutputFormat, header: &str, values: Vec<String>) -> String {
    let items: Vec<String> = values
        .into_iter()
        .map(|v| match format {
            OutputFormat::Plain => v,
            _ => JsonValue::String(v).to_string(),
        })
        .collect();
    render_list(format, header, &items)
}

fn render_saved(format: OutputFormat, saved: &SavedDatabase) -> String {
    let columns = ["path", "size", "elements", "substances", "reactions", "saved_at"]
        .map(ColumnInfo::new);
    let saved_row = row(json!({
        "path": saved.path.display().to_string(),
        "size": saved.human_size(),
        "elements": saved.elements,
        "substances": saved.substances,
        "reactions": saved.reactions,
        "saved_at": saved.saved_at.to_rfc3339(),
    }));
    render_rows(format, &columns, &[saved_row])
}

fn render_formula(format: OutputFormat, formula: &str) -> HubResult<String> {
    let columns = ["symbol", "isotope", "valence", "stoich"].map(ColumnInfo::new);
    let rows: Vec<Row> = parse_formula(formula)?
        .into_iter()
        .map(|e| {
            row(json!({
                "symbol": e.symbol,
                "isotope": e.isotope,
                "valence": e.valence,
                "stoich": e.stoich,
            }))
        })
        .collect();
    Ok(render_rows(format, &columns, &rows))
}

fn render_moieties(format: OutputFormat, formula: &str) -> HubResult<String> {
    let columns = ["name", "site", "occupancy"].map(ColumnInfo::new);
    let (_, moieties) = parse_moieties(formula)?;
    let rows: Vec<Row> = moieties
        .into_iter()
        .map(|m| {
            row(json!({
                "name": m.name,
                "site": m.site,
                "occupancy": m.occupancy,
            }))
        })
        .collect();
    Ok(render_rows(format, &columns, &rows))
}

fn row(value: JsonValue) -> Row {
    match value {
        JsonValue::Object(map) => map,
        _ => Row::new(),
    }
}
