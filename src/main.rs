//! Command-line front end for the recognizer.
//!
//!   ferrite-food predict photos/pizza.jpg
//!   ferrite-food --model-dir modelos_salvos inspect

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ferrite_food::{logging, ModelArtifacts, Predictor, ServiceConfig};

#[derive(Parser)]
#[command(name = "ferrite-food", about = "Recognize food in photos with pretrained models", long_about = None)]
struct Args {
    /// JSON service configuration; defaults apply to missing fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured model directory.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the food in one or more images, one JSON line per image
    Predict {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Show which artifacts loaded and the candidate feature lengths
    Inspect,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let mut config = match ServiceConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }

    let artifacts = ModelArtifacts::load(&config.artifact_paths());
    let predictor = Predictor::new(artifacts, config.extraction.clone());

    match args.command {
        Command::Predict { images } => predict(&predictor, &images),
        Command::Inspect => inspect(&predictor),
    }
}

fn predict(predictor: &Predictor, images: &[PathBuf]) -> ExitCode {
    let mut code = ExitCode::SUCCESS;
    for path in images {
        match predictor.predict(path) {
            Ok(result) => {
                let line = serde_json::json!({
                    "image": path.display().to_string(),
                    "label": result.label,
                    "confidence": result.confidence,
                    "outcome": result.outcome,
                });
                println!("{}", line);
            }
            Err(e) => {
                eprintln!("error: {}", e);
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}

fn inspect(predictor: &Predictor) -> ExitCode {
    let status = predictor.artifacts().status();
    println!("classifier     : {}", if status.classifier_loaded { "loaded" } else { "missing" });
    println!("scaler         : {}", if status.scaler_loaded { "loaded" } else { "missing" });
    println!("label encoder  : {}", if status.label_encoder_loaded { "loaded" } else { "missing" });
    match status.expected_features {
        Some(n) => println!("expected length: {}", n),
        None => println!("expected length: unknown"),
    }
    if let Some(description) = &status.scaler_description {
        println!("scaler note    : {}", description);
    }
    if !status.classes.is_empty() {
        println!("classes ({})   : {}", status.classes.len(), status.classes.join(", "));
    }

    println!();
    println!("{:<24}  {:>8}  {}", "Candidate", "Length", "");
    println!("{}", "-".repeat(44));
    for candidate in predictor.plan().candidates() {
        let len = candidate.feature_len();
        let marker = match (len, status.expected_features) {
            (Some(l), Some(e)) if l == e => "<- match",
            _ => "",
        };
        let len = len.map_or_else(|| "n/a".to_owned(), |l| l.to_string());
        println!("{:<24}  {:>8}  {}", candidate.to_string(), len, marker);
    }
    ExitCode::SUCCESS
}
