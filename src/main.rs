use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use imageflow_bridge::config::merged::MergedQuery;
use imageflow_bridge::config::query::{Query, QueryFile, validate_endpoint};
use imageflow_bridge::config::settings::Settings;
use imageflow_bridge::config::{self};
use imageflow_bridge::error::BridgeError;
use imageflow_bridge::ffi::imageflow::Context;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: imageflow_bridge <queries.yaml>...");
        eprintln!("  Send JSON queries to the native imageflow engine and print responses.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("imageflow_bridge {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();

    let mut has_error = false;

    for query_file_arg in &args {
        let query_file_path = Path::new(query_file_arg);

        // Load settings from the same directory as the query file.
        let settings = match config::load_settings_for_queries(query_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {query_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Read and parse the query YAML file.
        let yaml_content = match std::fs::read_to_string(query_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read query file {query_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let query_file: QueryFile = match serde_yml::from_str(&yaml_content) {
            Ok(qf) => qf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse query file {query_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Resolve query file directory for relative body_file paths.
        let query_dir = query_file_path.parent().unwrap_or_else(|| Path::new("."));

        if !run_query_file(&settings, &query_file, query_dir, query_file_arg) {
            has_error = true;
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Runs every query in one file against a fresh engine context.
/// Returns false if any query failed.
fn run_query_file(
    settings: &Settings,
    query_file: &QueryFile,
    query_dir: &Path,
    source: &str,
) -> bool {
    let (abi_major, abi_minor) = match settings.abi_pair() {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("ERROR: {source}: {e}");
            return false;
        }
    };

    let mut context = match Context::create_with_version(abi_major, abi_minor) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {source}: {e}");
            return false;
        }
    };

    let mut ok = true;
    for (index, query) in query_file.queries.iter().enumerate() {
        let merged = MergedQuery::new(settings, query);
        match run_query(&context, query, &merged, query_dir) {
            Ok(status) => {
                eprintln!("OK: {source}#{index} {} (status {status})", query.endpoint);
            }
            Err(e) => {
                eprintln!("ERROR: {source}#{index} {}: {e}", query.endpoint);
                ok = false;
                if merged.halt_on_error {
                    return false;
                }
                // An errored context taints later results; start fresh.
                context = match Context::create_with_version(abi_major, abi_minor) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("ERROR: {source}: {e}");
                        return false;
                    }
                };
            }
        }
    }
    ok
}

/// Sends one query and prints its JSON payload to stdout.
/// Returns the response status code on success.
fn run_query(
    context: &Context,
    query: &Query,
    merged: &MergedQuery,
    query_dir: &Path,
) -> imageflow_bridge::Result<i64> {
    validate_endpoint(&query.endpoint)?;
    let payload = query.resolve_body(query_dir)?;

    let response = context.send(&query.endpoint, payload.as_bytes())?;
    let body = response.read()?;

    if body.status != merged.expect_status {
        return Err(BridgeError::status(format!(
            "expected status {}, got {}: {}",
            merged.expect_status,
            body.status,
            String::from_utf8_lossy(body.bytes)
        )));
    }

    let value: serde_json::Value = serde_json::from_slice(body.bytes)?;
    if merged.pretty {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{value}");
    }

    Ok(body.status)
}
