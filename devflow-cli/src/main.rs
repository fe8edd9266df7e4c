//! devflow CLI - operational tooling for the devflow backend.
//!
//! Currently exposes one command:
//! - `test-connection`: verify connectivity to the document store and report
//!   the database it reached.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use devflow_db::{test_connection, Connector, DbConfig, MongoStore, TestOutcome};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "devflow",
    author,
    version,
    about = "Operational tooling for the devflow backend"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify connectivity to the document store and report its identity
    TestConnection(TestConnectionArgs),
}

#[derive(Args, Debug)]
struct TestConnectionArgs {
    /// Emit the result as JSON instead of the human-readable report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; a missing file is not an error.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(err) = tracing_setup::init_tracing(cli.debug) {
        eprintln!("failed to initialize tracing: {err}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Commands::TestConnection(args) => run_test_connection(args).await,
    }
}

async fn run_test_connection(args: TestConnectionArgs) -> ExitCode {
    tracing::info!("starting database connection test");

    let config = DbConfig::from_env();
    let store = MongoStore::new(config.app_name());
    let connector = Connector::new(config, store);

    let outcome = test_connection(&connector).await;
    report(&outcome, args.json);

    // Exit status mirrors the reported outcome.
    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report(outcome: &TestOutcome, json: bool) {
    if json {
        match serde_json::to_string_pretty(outcome) {
            Ok(body) => println!("{body}"),
            Err(err) => eprintln!("failed to serialize outcome: {err}"),
        }
        return;
    }

    if outcome.success {
        println!("=== DATABASE CONNECTION SUCCESSFUL ===");
        if let Some(details) = &outcome.details {
            println!("Database: {}", details.database);
            println!("Host: {}", details.host);
            println!("Port: {}", details.port);
        }
        println!("======================================");
    } else {
        println!("=== DATABASE CONNECTION FAILED ===");
        println!("Reason: {}", outcome.message);
        println!("==================================");
    }
}
