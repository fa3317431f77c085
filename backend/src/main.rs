//! kaspapool CLI - Pool dashboard configuration and bridge settings
//!
//! # Main Commands
//!
//! ```bash
//! kaspapool show -e production         # Print the resolved record as JSON
//! kaspapool serve                      # Start HTTP server (port 3000)
//! kaspapool validate --all             # Check every environment
//! kaspapool bridge -c config.yaml      # Print effective bridge settings
//! ```
//!
//! The environment defaults to `POOL_ENV`, then `development`. A `.env`
//! file in the working directory is loaded first.

use clap::{ArgAction, Args, Parser, Subcommand};
use kaspapool::{
    parse_duration, validate_record, AppOverrides, BridgeConfig, BridgeFlags,
    ConfigurationProvider, Environment,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kaspapool")]
#[command(about = "Kaspa pool dashboard configuration and stratum bridge settings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where a record comes from.
#[derive(Args)]
struct SourceArgs {
    /// Environment to resolve
    #[arg(short, long, env = "POOL_ENV", default_value = "development")]
    environment: String,

    /// Override table (.json, .yaml or .yml)
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Refuse environments other than development, test and production
    #[arg(long)]
    strict: bool,

    /// Ignore POOL_* variables
    #[arg(long)]
    no_env: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration record as JSON
    Show {
        #[command(flatten)]
        source: SourceArgs,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Validate the resolved configuration record
    Validate {
        #[command(flatten)]
        source: SourceArgs,

        /// Validate development, test and production
        #[arg(long)]
        all: bool,
    },

    /// List the recognized environments
    Environments,

    /// Load, normalize and print the stratum bridge settings
    Bridge {
        /// Bridge configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Stratum port to listen on
        #[arg(long)]
        stratum: Option<String>,

        /// Address of the kaspad node
        #[arg(long)]
        kaspa: Option<String>,

        /// Wait before manually requesting a new block, e.g. 500ms
        #[arg(long, value_parser = parse_wait)]
        blockwait: Option<Duration>,

        /// Minimum share difficulty accepted from miners
        #[arg(long)]
        mindiff: Option<u32>,

        /// Extranonce size in bytes
        #[arg(long)]
        extranonce: Option<u32>,

        /// Write errors to a log file (`--log` alone means true)
        #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
        log: Option<bool>,

        /// Pool wallet; empty means the client wallet
        #[arg(long)]
        pwallet: Option<String>,

        /// Share database connect string
        #[arg(long)]
        pconnect: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Show { source, compact } => cmd_show(&source, compact),

        Commands::Validate { source, all } => cmd_validate(&source, all),

        Commands::Environments => cmd_environments(),

        Commands::Bridge {
            config,
            stratum,
            kaspa,
            blockwait,
            mindiff,
            extranonce,
            log,
            pwallet,
            pconnect,
        } => cmd_bridge(
            &config,
            BridgeFlags {
                stratum_port: stratum,
                rpc_server: kaspa,
                block_wait_time: blockwait,
                min_share_diff: mindiff,
                extranonce_size: extranonce,
                use_log_file: log,
                pool_wallet: pwallet,
                db_connect: pconnect,
            },
        ),

        Commands::Serve { port, source } => cmd_serve(port, &source).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_wait(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

fn build_provider(source: &SourceArgs) -> Result<ConfigurationProvider, Box<dyn std::error::Error>> {
    let mut provider = ConfigurationProvider::new().strict(source.strict);

    if let Some(path) = &source.overrides {
        provider = provider.with_override_file(path)?;
    }
    if !source.no_env {
        provider = provider.with_env_layer(AppOverrides::from_env()?);
    }

    Ok(provider)
}

fn cmd_show(source: &SourceArgs, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(source)?;
    let record = provider.resolve(&source.environment)?;

    let json = if compact {
        serde_json::to_string(&record)?
    } else {
        serde_json::to_string_pretty(&record)?
    };
    println!("{}", json);

    Ok(())
}

fn cmd_validate(source: &SourceArgs, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(source)?;

    let records = if all {
        provider.resolve_all()?
    } else {
        vec![provider.resolve(&source.environment)?]
    };

    let mut invalid = 0;
    for record in &records {
        match validate_record(record) {
            Ok(()) => eprintln!("✅ {}: valid", record.environment),
            Err(errors) => {
                invalid += 1;
                eprintln!("\n❌ {}: {} problem(s)", record.environment, errors.len());
                for err in &errors {
                    eprintln!("   - {}", err);
                }
            }
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", records.len() - invalid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_environments() -> Result<(), Box<dyn std::error::Error>> {
    for env in Environment::KNOWN.iter() {
        println!("{}", env);
    }
    Ok(())
}

fn cmd_bridge(config: &Path, flags: BridgeFlags) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading bridge config @ `{}`", config.display());

    let mut cfg = BridgeConfig::load(config)?;
    cfg.apply_flags(flags);
    let cfg = cfg.normalize();

    println!("----------------------------------");
    println!("initializing bridge");
    for line in cfg.summary_lines() {
        println!("\t{}", line);
    }
    println!("----------------------------------");

    Ok(())
}

async fn cmd_serve(port: u16, source: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(source)?;
    let environment = Environment::parse(&source.environment);
    kaspapool::server::start_server(port, provider, environment).await?;
    Ok(())
}
