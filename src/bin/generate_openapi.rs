//! Prints the service's OpenAPI document.
//!
//!   cargo run --bin generate_openapi > openapi.json
//!   cargo run --bin generate_openapi -- --output openapi.json

use std::{env, fs, io::Write, path::PathBuf, process::ExitCode};

use greenhouse_telemetry::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn main() -> ExitCode {
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("failed to serialise OpenAPI document: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut args = env::args().skip(1);
    let mut output: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        if arg == "--output" {
            output = args.next().map(PathBuf::from);
        }
    }

    let written = match &output {
        Some(path) => fs::write(path, &json),
        None => std::io::stdout().write_all(json.as_bytes()),
    };

    match (written, output) {
        (Ok(()), Some(path)) => {
            eprintln!("OpenAPI document written to {}", path.display());
            ExitCode::SUCCESS
        }
        (Ok(()), None) => ExitCode::SUCCESS,
        (Err(e), _) => {
            eprintln!("failed to write OpenAPI document: {e}");
            ExitCode::FAILURE
        }
    }
}
