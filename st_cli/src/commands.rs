use std::fmt;
use swiss_tourney::tournament::{MatchId, PlayerId, SubResult, TournamentId};

/// Default tournament length when `create` gets no duration
pub const DEFAULT_DURATION_HOURS: u32 = 4;

/// Longest tournament whose length in seconds still fits a `u32`
pub const MAX_DURATION_HOURS: u32 = u32::MAX / 3600;

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        name: String,
        duration_hours: u32,
    },
    Enroll {
        tournament: TournamentId,
        names: Vec<String>,
    },
    Round {
        tournament: TournamentId,
    },
    Record {
        match_id: MatchId,
        sub_result: SubResult,
        /// `None` for a draw
        winner: Option<PlayerId>,
    },
    Finalize {
        tournament: TournamentId,
    },
    Winner {
        tournament: TournamentId,
    },
    Standings {
        tournament: TournamentId,
    },
    Show {
        tournament: TournamentId,
    },
    List,
}

impl Command {
    /// Command name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Enroll { .. } => "enroll",
            Self::Round { .. } => "round",
            Self::Record { .. } => "record",
            Self::Finalize { .. } => "finalize",
            Self::Winner { .. } => "winner",
            Self::Standings { .. } => "standings",
            Self::Show { .. } => "show",
            Self::List => "list",
        }
    }
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No command given.
    MissingCommand,
    /// Command is missing an argument; carries the usage line.
    MissingArgument(&'static str),
    /// Tournament ID is not a number.
    InvalidTournamentId(String),
    /// Match or player ID is not a UUID.
    InvalidUuid(String),
    /// Unknown best-of-3 result code.
    InvalidSubResult(String),
    /// Duration is zero, too long or not a number of hours.
    InvalidDuration(String),
    /// Extra arguments after a complete command.
    UnexpectedArgument(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "No command given. Use --help to see commands"),
            Self::MissingArgument(usage) => write!(f, "Missing argument. Usage: {}", usage),
            Self::InvalidTournamentId(value) => {
                write!(f, "Invalid tournament ID '{}'. Must be a number", value)
            }
            Self::InvalidUuid(value) => write!(f, "Invalid ID '{}'. Must be a UUID", value),
            Self::InvalidSubResult(value) => write!(
                f,
                "Invalid result '{}'. Use one of 0x0, 1x1, 1x0, 2x0, 2x1",
                value
            ),
            Self::InvalidDuration(value) => write!(
                f,
                "Invalid duration '{}'. Must be between 1 and {} hours",
                value, MAX_DURATION_HOURS
            ),
            Self::UnexpectedArgument(value) => write!(f, "Unexpected argument '{}'", value),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Use --help to see commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

const CREATE_USAGE: &str = "create NAME [HOURS]";
const ENROLL_USAGE: &str = "enroll TOURNAMENT NAME...";
const RECORD_USAGE: &str = "record MATCH RESULT (WINNER|draw)";

/// Parse the free arguments left after option parsing.
pub fn parse_command(args: &[String]) -> Result<Command, ParseError> {
    let (name, rest) = args.split_first().ok_or(ParseError::MissingCommand)?;

    match name.as_str() {
        "create" => parse_create(rest),
        "enroll" => parse_enroll(rest),
        "record" => parse_record(rest),
        "list" => {
            expect_end(rest)?;
            Ok(Command::List)
        }
        "round" | "finalize" | "winner" | "standings" | "show" => {
            let tournament = tournament_arg(rest, "COMMAND TOURNAMENT")?;
            expect_end(&rest[1..])?;
            Ok(match name.as_str() {
                "round" => Command::Round { tournament },
                "finalize" => Command::Finalize { tournament },
                "winner" => Command::Winner { tournament },
                "standings" => Command::Standings { tournament },
                _ => Command::Show { tournament },
            })
        }
        other => Err(ParseError::UnrecognizedCommand(other.to_string())),
    }
}

fn expect_end(rest: &[String]) -> Result<(), ParseError> {
    match rest.first() {
        Some(extra) => Err(ParseError::UnexpectedArgument(extra.clone())),
        None => Ok(()),
    }
}

fn tournament_arg(rest: &[String], usage: &'static str) -> Result<TournamentId, ParseError> {
    let value = rest.first().ok_or(ParseError::MissingArgument(usage))?;
    value
        .parse()
        .map_err(|_| ParseError::InvalidTournamentId(value.clone()))
}

fn uuid_arg(value: &str) -> Result<uuid::Uuid, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::InvalidUuid(value.to_string()))
}

/// Parse "create NAME [HOURS]"
fn parse_create(rest: &[String]) -> Result<Command, ParseError> {
    let name = rest
        .first()
        .filter(|n| !n.trim().is_empty())
        .ok_or(ParseError::MissingArgument(CREATE_USAGE))?;

    let duration_hours = match rest.get(1) {
        Some(value) => match value.parse::<u32>() {
            Ok(hours) if hours > 0 && hours <= MAX_DURATION_HOURS => hours,
            _ => return Err(ParseError::InvalidDuration(value.clone())),
        },
        None => DEFAULT_DURATION_HOURS,
    };
    expect_end(rest.get(2..).unwrap_or_default())?;

    Ok(Command::Create {
        name: name.clone(),
        duration_hours,
    })
}

/// Parse "enroll TOURNAMENT NAME..."
fn parse_enroll(rest: &[String]) -> Result<Command, ParseError> {
    let tournament = tournament_arg(rest, ENROLL_USAGE)?;
    let names = rest[1..].to_vec();
    if names.is_empty() {
        return Err(ParseError::MissingArgument(ENROLL_USAGE));
    }
    Ok(Command::Enroll { tournament, names })
}

/// Parse "record MATCH RESULT (WINNER|draw)"
fn parse_record(rest: &[String]) -> Result<Command, ParseError> {
    let [match_id, sub_result, winner, extra @ ..] = rest else {
        return Err(ParseError::MissingArgument(RECORD_USAGE));
    };
    expect_end(extra)?;

    let match_id = uuid_arg(match_id)?;
    let sub_result = sub_result
        .parse::<SubResult>()
        .map_err(|e| ParseError::InvalidSubResult(e.0))?;
    let winner = match winner.as_str() {
        "draw" => None,
        id => Some(uuid_arg(id)?),
    };

    Ok(Command::Record {
        match_id,
        sub_result,
        winner,
    })
}
