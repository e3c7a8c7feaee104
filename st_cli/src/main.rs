//! Command-line front end for the Swiss tournament engine.
//!
//! Each invocation runs one command against the PostgreSQL store and
//! prints the result, as text or as JSON.

mod commands;
mod logging;
mod output;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Error};
use chrono::Utc;
use log::info;
use pico_args::Arguments;
use swiss_tourney::{
    config::EngineConfig,
    db::Database,
    tournament::{TournamentConfig, TournamentError, TournamentManager},
};

use commands::{Command, parse_command};

const HELP: &str = "\
Run Swiss-style tournaments

USAGE:
  st_cli [OPTIONS] COMMAND [ARGS]

COMMANDS:
  create NAME [HOURS]                  Create a tournament starting now [default: 4 hours]
  enroll TOURNAMENT NAME...            Enroll players (before round 1 only)
  round TOURNAMENT                     Pair and start the next round
  record MATCH RESULT (WINNER|draw)    Record a result; RESULT is 0x0, 1x1, 1x0, 2x0 or 2x1
  finalize TOURNAMENT                  Close the tournament
  winner TOURNAMENT                    Show the current winner
  standings TOURNAMENT                 Show the standings table
  show TOURNAMENT                      Show roster, rounds and matches
  list                                 List tournaments

OPTIONS:
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --json                   Print results as JSON
  -h, --help               Print help information

ENVIRONMENT:
  DATABASE_URL                 PostgreSQL connection string
  DB_MAX_CONNECTIONS           Pool size [default: 10]
  TOURNEY_MAX_ROUND_RETRIES    Retries when a round is created concurrently [default: 3]
  RUST_LOG                     Log filter
  (A .env file in the working directory is read too)
";

struct Args {
    database_url: Option<String>,
    json: bool,
    command: Command,
}

fn parse_args() -> Result<Args, Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let json = pargs.contains("--json");
    let database_url = pargs.opt_value_from_str("--db-url")?;

    let free = pargs
        .finish()
        .into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| anyhow::anyhow!("Argument is not valid UTF-8: {:?}", arg))
        })
        .collect::<Result<Vec<String>, Error>>()?;
    let command = parse_command(&free)?;

    Ok(Args {
        database_url,
        json,
        command,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute(manager: &TournamentManager, command: Command, json: bool) -> Result<(), Error> {
    match command {
        Command::Create {
            name,
            duration_hours,
        } => {
            // Parsing caps the hours so this cannot overflow
            let duration_secs = duration_hours * 3600;
            let config = TournamentConfig::new(name, Utc::now(), duration_secs);
            let id = manager.create_tournament(config).await?;
            if json {
                print_json(&manager.get_tournament(id).await?)?;
            } else {
                println!("Created tournament #{id}");
            }
        }
        Command::Enroll { tournament, names } => {
            let players = manager.enroll_players(tournament, names).await?;
            if json {
                print_json(&players)?;
            } else {
                for player in players {
                    println!("{}  {}", player.id, player.name);
                }
            }
        }
        Command::Round { tournament } => {
            let round = manager.start_round(tournament).await?;
            if json {
                print_json(&round)?;
            } else {
                let snapshot = manager.get_tournament(tournament).await?;
                print!("{}", output::render_round(&snapshot, &round));
            }
        }
        Command::Record {
            match_id,
            sub_result,
            winner,
        } => {
            let recorded = manager.record_result(match_id, sub_result, winner).await?;
            if json {
                print_json(&recorded)?;
            } else {
                println!(
                    "Recorded match {}: {} ({})",
                    recorded.id,
                    recorded.outcome.as_str(),
                    sub_result
                );
            }
        }
        Command::Finalize { tournament } => {
            manager.finalize_tournament(tournament).await?;
            if !json {
                println!("Tournament #{tournament} finalized");
            }
        }
        Command::Winner { tournament } => {
            let winner = manager.determine_winner(tournament).await?;
            if json {
                print_json(&winner)?;
            } else {
                match winner {
                    Some(player) => println!(
                        "{} ({} wins, {} points)",
                        player.name, player.wins, player.points
                    ),
                    None => println!("No winner yet"),
                }
            }
        }
        Command::Standings { tournament } => {
            let rows = manager.standings(tournament).await?;
            if json {
                print_json(&rows)?;
            } else {
                print!("{}", output::render_standings(&rows));
            }
        }
        Command::Show { tournament } => {
            let snapshot = manager.get_tournament(tournament).await?;
            if json {
                print_json(&snapshot)?;
            } else {
                print!("{}", output::render_tournament(&snapshot));
            }
        }
        Command::List => {
            let infos = manager.list_tournaments().await?;
            if json {
                print_json(&infos)?;
            } else {
                print!("{}", output::render_list(&infos));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    logging::init();

    let config = EngineConfig::from_env(args.database_url)?;
    let db = Database::connect(&config.database)
        .await
        .context("Failed to open tournament database")?;
    info!("Database ready");

    let manager =
        TournamentManager::new(Arc::new(db.tournament_repository())).with_config(config.manager);

    let name = args.command.name();
    let started = Instant::now();
    let result = execute(&manager, args.command, args.json).await;
    logging::log_command(name, started.elapsed().as_millis() as u64);
    db.close().await;

    match result {
        Ok(()) => Ok(()),
        // Rule violations are the caller's fault; report them plainly
        Err(e) => match e.downcast_ref::<TournamentError>() {
            Some(err) if err.is_caller_error() => {
                eprintln!("error: {}", err.client_message());
                std::process::exit(1);
            }
            _ => Err(e),
        },
    }
}
