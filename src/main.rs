use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use credit_risk::config::Config;
use credit_risk::scoring::LoanApplication;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the scoring API over HTTP (default if no subcommand)
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port and $PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate a synthetic dataset of scored applications as CSV
    Generate {
        /// Number of applications (defaults to dataset.applications)
        #[arg(short = 'n', long, value_parser = parse_count)]
        count: Option<usize>,

        /// Output CSV path (defaults to dataset.output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Score one application read from a JSON file, or stdin if omitted
    Score {
        file: Option<PathBuf>,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "credit-risk")]
#[command(about = "Rule-based credit risk scoring for loan applications", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/credit-risk/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Same rule as `dataset.applications`: at least one row.
fn parse_count(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let mut config = match credit_risk::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(e) = config.override_port(std::env::var("PORT").ok().as_deref()) {
        eprintln!("Config error: {:#}", e);
        std::process::exit(EXIT_CONFIG);
    }

    // Validate config at startup
    if let Err(errors) = credit_risk::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let code = match command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Generate {
            count,
            output,
            seed,
        } => generate(&config, count, output, seed),
        Commands::Score { file, json } => score(file, json, cli.verbose),
    };

    std::process::exit(code);
}

async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> i32 {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = match credit_risk::server::AppState::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            return EXIT_CONFIG;
        }
    };

    let addr = (config.server.host.as_str(), config.server.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "Failed to bind {}:{}: {}",
                config.server.host, config.server.port, e
            );
            return EXIT_IO;
        }
    };

    match listener.local_addr() {
        Ok(local) => info!(addr = %local, "credit risk service listening"),
        Err(_) => info!("credit risk service listening"),
    }

    let shutdown = async {
        // A failed signal handler install only means we run until killed
        let _ = tokio::signal::ctrl_c().await;
    };

    match credit_risk::server::run(listener, Arc::new(state), shutdown).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Server error: {:#}", e);
            EXIT_IO
        }
    }
}

fn generate(
    config: &Config,
    count: Option<usize>,
    output: Option<PathBuf>,
    seed: Option<u64>,
) -> i32 {
    let count = count.unwrap_or(config.dataset.applications);
    let output = output.unwrap_or_else(|| config.dataset.output.clone());
    let today = chrono::Local::now().date_naive();

    info!(count, seed = ?seed, "generating loan applications");

    let mut generator = match credit_risk::dataset::DatasetGenerator::with_seed(seed, today) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Generator error: {:#}", e);
            return EXIT_CONFIG;
        }
    };
    let rows = generator.generate(count);

    if let Err(e) = credit_risk::dataset::save_dataset(&output, &rows) {
        eprintln!("Failed to write dataset: {:#}", e);
        return EXIT_IO;
    }

    println!("Saved {} applications to {}", rows.len(), output.display());
    EXIT_SUCCESS
}

fn score(file: Option<PathBuf>, as_json: bool, verbose: bool) -> i32 {
    let mut input = String::new();
    let read = match &file {
        Some(path) => std::fs::read_to_string(path).map(|s| input = s),
        None => std::io::stdin().read_to_string(&mut input).map(|_| ()),
    };
    if let Err(e) = read {
        eprintln!("Failed to read application: {}", e);
        return EXIT_IO;
    }

    let application: LoanApplication = match serde_json::from_str(&input) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Invalid application JSON: {}", e);
            return EXIT_INPUT;
        }
    };

    let record = match credit_risk::scoring::validate_application(&application) {
        Ok(r) => r,
        Err(errors) => {
            eprintln!("Invalid application:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            return EXIT_INPUT;
        }
    };

    let assessment = credit_risk::scoring::assess(&record);

    if as_json {
        match serde_json::to_string_pretty(&assessment) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize assessment: {}", e);
                return EXIT_IO;
            }
        }
        return EXIT_SUCCESS;
    }

    let use_colors = credit_risk::output::should_use_colors();
    println!("{}", credit_risk::output::format_assessment(&assessment, use_colors));

    if verbose {
        let result = credit_risk::scoring::score_applicant(&record);
        println!();
        println!("  Breakdown (base {}):", credit_risk::scoring::engine::BASE_SCORE);
        println!(
            "{}",
            credit_risk::output::format_breakdown(&result.breakdown, use_colors)
        );
    }

    EXIT_SUCCESS
}
