//! zentinel-routes CLI tool.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use zentinel_routes::{compile_str, get_clean_urls, Error, Normalized, Result};

#[derive(Parser)]
#[command(name = "zentinel-routes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that routing configs compile
    Check {
        /// Config file or glob pattern (e.g. "sites/*/routes.json")
        #[arg(short, long)]
        config: String,
    },

    /// Print the compiled rule list
    Compile {
        /// Path to config file
        #[arg(short, long)]
        config: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print clean URLs for a list of file paths
    CleanUrls {
        /// File paths relative to the output directory
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Check { config } => check_configs(&config),
        Commands::Compile { config, pretty } => compile_config(&config, pretty),
        Commands::CleanUrls { paths } => print_clean_urls(&paths),
    }
}

fn load(path: &Path) -> Result<Normalized> {
    let input = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    compile_str(&input)
}

fn check_configs(pattern: &str) -> Result<()> {
    info!("Checking routing configs matching {}", pattern);

    let paths = glob::glob(pattern).map_err(|e| Error::Glob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut checked = 0;
    let mut failed = 0;
    for entry in paths {
        let path = entry.map_err(|e| Error::Glob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        if !path.is_file() {
            continue;
        }
        checked += 1;

        match load(&path)?.error {
            None => println!("OK   {}", path.display()),
            Some(rule_error) => {
                failed += 1;
                println!("FAIL {} [{}]", path.display(), rule_error.code);
                for line in rule_error.message().lines() {
                    println!("     {}", line);
                }
            }
        }
    }

    println!("\nChecked {} configs, {} failed", checked, failed);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn compile_config(path: &Path, pretty: bool) -> Result<()> {
    info!("Compiling routing config from {:?}", path);

    let compiled = load(path)?;
    if let Some(rule_error) = &compiled.error {
        error!(code = %rule_error.code, "routing config is invalid");
    }

    let output = if pretty {
        serde_json::to_string_pretty(&compiled.rules)
    } else {
        serde_json::to_string(&compiled.rules)
    }
    .map_err(Error::Output)?;
    println!("{}", output);

    match compiled.error {
        Some(rule_error) => Err(rule_error.into()),
        None => Ok(()),
    }
}

fn print_clean_urls(paths: &[String]) -> Result<()> {
    for url in get_clean_urls(paths) {
        println!("{} -> {}", url.html, url.clean);
    }
    Ok(())
}
