//! Command-line front end: generate one case-study deck and print its path.
//!
//! # Usage
//!
//! ```sh
//! casedeck --company-name "Acme Rail" \
//!     --company-description "Regional rail operator modernizing its maintenance" \
//!     --size 2
//! ```
//!
//! The API key is read from `--api-key`, `OPENAI_API_KEY` or a `.env` file.
//! `RUST_LOG` overrides the `-v` log level.

use std::path::PathBuf;

use casedeck::config::AppConfig;
use casedeck::pipeline::{GenerationRequest, Generator};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Generate a PowerPoint deck of case studies tailored to a company
#[derive(Parser, Debug)]
#[command(name = "casedeck", version)]
struct Args {
    /// Company the deck is for
    #[arg(long)]
    company_name: String,

    /// What the company does; guides case selection
    #[arg(long)]
    company_description: String,

    /// Number of case studies: 1, 2 or 4 (0 keeps every template slide)
    #[arg(long, default_value_t = 4)]
    size: u8,

    /// Presentation template
    #[arg(long, value_name = "PATH")]
    template: Option<PathBuf>,

    /// Case-study catalog (JSON)
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Directory the deck is written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("casedeck={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> casedeck::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::with_root(&std::env::current_dir()?),
    };
    if let Some(template) = &args.template {
        config.paths.template = template.clone();
    }
    if let Some(data) = &args.data {
        config.paths.data = data.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir = output_dir.clone();
    }
    Ok(config)
}

fn run(args: Args) -> casedeck::Result<PathBuf> {
    let config = load_config(&args)?;
    let output_dir = config.paths.output_dir.clone();
    let generator = Generator::with_api_key(config, args.api_key.as_deref())?;
    let request = GenerationRequest::new(args.company_name, args.company_description, args.size);
    generator.generate_to_dir(&request, &output_dir)
}

fn main() {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        },
    }
}
