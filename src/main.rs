//
//  graph-client
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use graph_client::api::common::ApiError;
use graph_client::cli::{Cli, Commands};
use graph_client::exit_codes;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("GRAPH_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Api(cmd) => cmd.run(&cli.global).await,
        Commands::Object(cmd) => cmd.run(&cli.global).await,
        Commands::Publish(cmd) => cmd.run(&cli.global).await,
        Commands::Batch(cmd) => cmd.run(&cli.global).await,
        Commands::Auth(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("graph version {}", graph_client::VERSION);
            Ok(())
        }
    }
}

/// Maps API error kinds to exit codes.
fn exit_code(error: &anyhow::Error) -> i32 {
    let Some(api) = error.chain().find_map(|e| e.downcast_ref::<ApiError>()) else {
        return exit_codes::ERROR;
    };
    match api {
        ApiError::Authentication(_) => exit_codes::AUTH_ERROR,
        ApiError::Client(_) if api.http_status() == Some(404) => exit_codes::NOT_FOUND,
        ApiError::Server(_) | ApiError::BadResponse(_) => exit_codes::SERVER_ERROR,
        _ => exit_codes::ERROR,
    }
}
