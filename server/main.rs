/// ferrite-food HTTP server
///
/// Upload a photo, get back the recognized food and a confidence score.
/// Served by a synchronous tiny_http server, one thread per request.
///
/// Run with:
///   cargo run --bin server --release -- --model-dir modelos_salvos
/// Then open http://127.0.0.1:5000
mod handlers;
mod routes;
mod state;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tiny_http::Server;
use tracing::{error, info};

use ferrite_food::{logging, ModelArtifacts, Predictor, ServiceConfig};
use state::AppState;

#[derive(Parser)]
#[command(name = "server", about = "HTTP front end for the food recognizer", long_about = None)]
struct Args {
    /// JSON service configuration; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured model directory.
    #[arg(long)]
    model_dir: Option<PathBuf>,
    /// Overrides the configured bind address, e.g. 127.0.0.1:8080.
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let mut config = match ServiceConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    if let Err(e) = std::fs::create_dir_all(&config.upload_dir) {
        error!(dir = %config.upload_dir.display(), "cannot create upload directory: {}", e);
        return ExitCode::FAILURE;
    }

    let artifacts = ModelArtifacts::load(&config.artifact_paths());
    let predictor = Predictor::new(artifacts, config.extraction.clone())
        .with_worker_limit(config.max_prediction_workers);

    let server = match Server::http(config.bind_addr.as_str()) {
        Ok(server) => server,
        Err(e) => {
            error!(addr = %config.bind_addr, "failed to bind HTTP server: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %config.bind_addr, "server listening");

    let shared_state = Arc::new(AppState::new(predictor, config));

    // Each request runs on its own thread so a slow prediction does not
    // stall page loads.
    for request in server.incoming_requests() {
        let state_clone = Arc::clone(&shared_state);
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    ExitCode::SUCCESS
}
