//! UCI command parsing.

use std::path::PathBuf;
use std::time::Duration;

use sparring_core::Position;

use crate::error::UciError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` uses the difficulty profile's limits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Search to this depth only.
    pub depth: Option<i32>,
    /// Search for at most this duration.
    pub movetime: Option<Duration>,
    /// Search this many nodes only.
    pub nodes: Option<u64>,
    /// `go infinite`: search with the profile's limits.
    pub infinite: bool,
}

/// Options settable with `setoption`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOption {
    /// `Difficulty`, 1 to 5.
    Difficulty(u8),
    /// `Weights`, path to a TOML file of evaluation weights.
    Weights(PathBuf),
    /// `OwnBook`, whether to play from the built-in opening book.
    OwnBook(bool),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a position with optional moves applied.
    Position(Box<Position>),
    /// `go` -- search with the given parameters.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(UciOption),
    /// `stop` -- searches are synchronous, so there is nothing to stop.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (silently ignored per UCI convention).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(args),
        "go" => parse_go(args),
        "setoption" => parse_setoption(args).map(Command::SetOption),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
///
/// Moves are played, not just applied, so the position carries the SAN
/// history the opening book is keyed on.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let moves_at = tokens
        .iter()
        .position(|&t| t == "moves")
        .unwrap_or(tokens.len());
    let (setup, rest) = tokens.split_at(moves_at);

    let mut position = match setup {
        ["startpos"] => Position::new(),
        ["fen", fields @ ..] if !fields.is_empty() => Position::from_fen(&fields.join(" "))?,
        _ => return Err(UciError::MalformedPosition),
    };

    for uci_move in rest.iter().skip(1) {
        position.play_uci(uci_move)?;
    }

    Ok(Command::Position(Box::new(position)))
}

/// Parse the `go` command arguments.
///
/// Supports depth, movetime, nodes and infinite. Clock parameters and
/// unknown tokens are skipped together with their values.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                params.depth = Some(parse_value(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "movetime" => {
                let ms: u64 = parse_value(tokens.get(i + 1), "movetime")?;
                params.movetime = Some(Duration::from_millis(ms));
                i += 2;
            }
            "nodes" => {
                params.nodes = Some(parse_value(tokens.get(i + 1), "nodes")?);
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            "wtime" | "btime" | "winc" | "binc" | "movestogo" | "mate" => i += 2,
            _ => i += 1,
        }
    }

    Ok(Command::Go(params))
}

/// Parse a numeric value following a `go` keyword.
fn parse_value<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

/// Parse `setoption name <name> [value <value>]`. Names are matched
/// case-insensitively.
fn parse_setoption(tokens: &[&str]) -> Result<UciOption, UciError> {
    let ["name", rest @ ..] = tokens else {
        return Err(UciError::MalformedOption);
    };
    let value_at = rest
        .iter()
        .position(|&t| t == "value")
        .unwrap_or(rest.len());
    let name = rest[..value_at].join(" ");
    let value = rest.get(value_at + 1..).unwrap_or_default().join(" ");

    let invalid = || UciError::InvalidOptionValue {
        name: name.clone(),
        value: value.clone(),
    };

    match name.to_ascii_lowercase().as_str() {
        "difficulty" => value.parse().map(UciOption::Difficulty).map_err(|_| invalid()),
        "weights" if !value.is_empty() => Ok(UciOption::Weights(PathBuf::from(&value))),
        "weights" => Err(invalid()),
        "ownbook" => match value.as_str() {
            "true" => Ok(UciOption::OwnBook(true)),
            "false" => Ok(UciOption::OwnBook(false)),
            _ => Err(invalid()),
        },
        _ => Err(UciError::UnknownOption { name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(parse_command("ucinewgame").unwrap(), Command::UciNewGame));
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn parse_position_startpos_with_moves_records_san() {
        let Command::Position(pos) = parse_command("position startpos moves e2e4 e7e5 g1f3").unwrap()
        else {
            panic!("expected Position");
        };
        assert_eq!(pos.san_history(), ["e4", "e5", "Nf3"]);
        assert!(pos.is_from_start());
    }

    #[test]
    fn parse_position_fen() {
        let Command::Position(pos) = parse_command(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1 moves e7e5",
        )
        .unwrap() else {
            panic!("expected Position");
        };
        assert!(!pos.is_from_start());
        assert_eq!(pos.san_history(), ["e5"]);
    }

    #[test]
    fn parse_position_errors() {
        assert!(matches!(
            parse_command("position"),
            Err(UciError::MalformedPosition)
        ));
        assert!(matches!(
            parse_command("position fen invalid"),
            Err(UciError::Position(_))
        ));
        assert!(matches!(
            parse_command("position startpos moves e2e5"),
            Err(UciError::Position(_))
        ));
    }

    #[test]
    fn parse_go_limits() {
        let Command::Go(params) = parse_command("go depth 6 nodes 1000 movetime 250").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(params.depth, Some(6));
        assert_eq!(params.nodes, Some(1000));
        assert_eq!(params.movetime, Some(Duration::from_millis(250)));
    }

    #[test]
    fn parse_go_skips_clock_values() {
        let Command::Go(params) = parse_command("go wtime 300000 btime 300000 depth 3").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(params, GoParams { depth: Some(3), ..GoParams::default() });
    }

    #[test]
    fn parse_go_bad_values() {
        assert!(matches!(
            parse_command("go depth"),
            Err(UciError::MissingGoValue { .. })
        ));
        assert!(matches!(
            parse_command("go depth abc"),
            Err(UciError::InvalidGoValue { .. })
        ));
    }

    #[test]
    fn parse_setoption_variants() {
        let opt = |line: &str| match parse_command(line).unwrap() {
            Command::SetOption(opt) => opt,
            other => panic!("expected SetOption, got {other:?}"),
        };
        assert_eq!(opt("setoption name Difficulty value 2"), UciOption::Difficulty(2));
        assert_eq!(opt("setoption name OwnBook value false"), UciOption::OwnBook(false));
        assert_eq!(
            opt("setoption name Weights value /tmp/my weights.toml"),
            UciOption::Weights(PathBuf::from("/tmp/my weights.toml"))
        );
    }

    #[test]
    fn parse_setoption_errors() {
        assert!(matches!(
            parse_command("setoption Difficulty 2"),
            Err(UciError::MalformedOption)
        ));
        assert!(matches!(
            parse_command("setoption name Hash value 16"),
            Err(UciError::UnknownOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption name Difficulty value hard"),
            Err(UciError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert!(matches!(parse_command("foobar").unwrap(), Command::Unknown(_)));
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }
}
