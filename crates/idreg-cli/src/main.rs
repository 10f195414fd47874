//! # idreg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use idreg_cli::digest::{run_hash, HashArgs};
use idreg_cli::identity::{
    run_create, run_get, run_history, run_kyc_level, run_owner, run_update, run_verified,
    run_verify, CreateArgs, IdArgs, OwnerArgs, UpdateArgs, VerifyArgs,
};
use idreg_cli::init::{run_init, InitArgs};
use idreg_cli::state_file::DEFAULT_STATE_FILE;

/// Identity registry CLI.
///
/// One identity per principal, evidenced by a document hash and verified
/// by a single verifier at a KYC level.
#[derive(Parser, Debug)]
#[command(name = "idreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Registry state file.
    #[arg(long, global = true, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty registry state file.
    Init(InitArgs),

    /// Claim the caller's identity with a document hash.
    Create(CreateArgs),

    /// Replace the document hash of an identity (owner only).
    Update(UpdateArgs),

    /// Verify an identity at a KYC level (verifier only).
    Verify(VerifyArgs),

    /// Show an identity record.
    Get(IdArgs),

    /// Show whether an identity is verified.
    Verified(IdArgs),

    /// Show the KYC level of an identity.
    #[command(name = "kyc-level")]
    KycLevel(IdArgs),

    /// Show the journal of an identity.
    History(IdArgs),

    /// Show the identity owned by a principal.
    Owner(OwnerArgs),

    /// Compute the SHA-256 hash of a document.
    Hash(HashArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(state = %cli.state.display(), "idreg starting");

    let state = cli.state.as_path();
    let result = match &cli.command {
        Commands::Init(args) => run_init(args, state),
        Commands::Create(args) => run_create(args, state),
        Commands::Update(args) => run_update(args, state),
        Commands::Verify(args) => run_verify(args, state),
        Commands::Get(args) => run_get(args, state),
        Commands::Verified(args) => run_verified(args, state),
        Commands::KycLevel(args) => run_kyc_level(args, state),
        Commands::History(args) => run_history(args, state),
        Commands::Owner(args) => run_owner(args, state),
        Commands::Hash(args) => run_hash(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
