//! Mint client terminal front end.
//!
//! A thin presentation layer over the session controller: it renders
//! snapshots, forwards user intents, and drains the mint-event stream. It
//! owns no state of its own and makes no chain calls.
//!
//! # Architecture Overview
//!
//! ```text
//!   stdin intents ──▶ ┌───────────────────────────────┐
//!                     │     MintSessionController      │
//!   rendered state ◀──│  session ─ handle ─ events     │
//!                     └──────┬───────────┬────────────┘
//!                            │           │
//!                     ┌──────▼─────┐ ┌───▼──────────┐
//!                     │   wallet   │ │   contract    │
//!                     │  provider  │ │   gateway     │
//!                     └──────┬─────┘ └───┬──────────┘
//!                            │           │
//!                            ▼           ▼
//!                         chain RPC ── mint events
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use mint_client::config::loader::load_config;
use mint_client::contract::MintEvent;
use mint_client::session::{MintOutcome, SessionPhase};
use mint_client::{wallet, MintConfig, MintSessionController, Session, SessionError};

#[derive(Parser)]
#[command(name = "mint-client")]
#[command(about = "Mint a token from a limited-supply collection", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults target the reference
    /// deployment.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MintConfig::default(),
    };

    mint_client::observability::logging::init(&config.observability.log_filter);
    tracing::info!("mint-client v0.1.0 starting");

    let provider = wallet::detect(&config.wallet);
    let mut controller = MintSessionController::new(config, provider);

    if let Err(e) = controller.bootstrap().await {
        report(&e);
    }
    render(&controller.snapshot());
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        enum Step {
            Input(Option<String>),
            Event(Option<MintEvent>),
        }

        let step = tokio::select! {
            line = lines.next_line() => Step::Input(line?),
            event = controller.next_event() => Step::Event(event),
        };

        match step {
            Step::Input(None) => break,
            Step::Input(Some(line)) => {
                if !dispatch(&mut controller, line.trim()).await {
                    break;
                }
            }
            Step::Event(Some(event)) => {
                controller.handle_mint_event(event).await;
                render(&controller.snapshot());
            }
            Step::Event(None) => {}
        }
    }

    tracing::info!("mint-client exiting");
    Ok(())
}

/// Handle one line of user input. Returns false to exit.
async fn dispatch(controller: &mut MintSessionController, intent: &str) -> bool {
    match intent {
        "connect" => match controller.connect().await {
            Ok(()) => render(&controller.snapshot()),
            Err(e) => report(&e),
        },
        "mint" => match controller.mint().await {
            Ok(MintOutcome::Mined { tx_hash }) => {
                println!("Mint confirmed (transaction {}).", tx_hash);
                println!("The asset link appears here once the mint event arrives.");
            }
            Ok(MintOutcome::Failed { .. }) => {
                // already reported at diagnostic level; session is back to idle
            }
            Err(e) => report(&e),
        },
        "collection" => match controller.collection_url() {
            Ok(url) => println!("View the collection: {}", url),
            Err(e) => tracing::warn!(error = %e, "collection link unavailable"),
        },
        "asset" => match controller.minted_asset_url() {
            Some(url) => println!("Your minted asset: {}", url),
            None => println!("Nothing minted in this session yet."),
        },
        "status" => render(&controller.snapshot()),
        "help" => print_help(),
        "quit" | "exit" => return false,
        "" => {}
        other => println!("Unknown command '{}'. Type 'help' for commands.", other),
    }
    true
}

fn render(session: &Session) {
    if let Some(banner) = session.supply_banner() {
        println!("{}", banner);
    }
    match session.phase {
        SessionPhase::Disconnected => println!("Not connected. Type 'connect' to begin."),
        SessionPhase::Connecting => println!("Connecting..."),
        SessionPhase::Idle => {
            if let Some(account) = session.account {
                println!("Connected as {}. Type 'mint' to mint.", account);
            }
            if session.asset_link.is_some() {
                println!("Minted! Type 'asset' for the link.");
            }
        }
        SessionPhase::Minting => println!("Minting... please wait."),
    }
}

fn report(error: &SessionError) {
    if error.is_blocking() {
        println!("{}", user_notice(error));
    } else {
        tracing::warn!(error = %error, "intent failed");
    }
}

fn user_notice(error: &SessionError) -> String {
    match error {
        SessionError::ProviderAbsent => {
            "No wallet found. Configure a signing key to continue.".to_string()
        }
        SessionError::NetworkMismatch(e) => format!("{}. Switch networks and retry.", e),
        SessionError::SoldOut { total } => format!(
            "All {} tokens have been minted. You can still browse the collection.",
            total
        ),
        other => other.to_string(),
    }
}

fn print_help() {
    println!("commands: connect | mint | collection | asset | status | help | quit");
}
