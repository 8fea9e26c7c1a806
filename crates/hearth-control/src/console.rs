//! Console command parsing.
//!
//! Commands are one per line, whitespace separated, case-insensitive:
//!
//! ```text
//! UpPress 1      DnPress 2      route 1 3      pause
//! UpRelease 1    DnRelease 2    alloff         resume
//!                                              stop
//! ```

use std::str::FromStr;

use hearth_core::{PortIndex, SourceNumber, ZoneNumber};
use hearth_hardware::ButtonState;

use crate::actions::Cue;
use crate::error::{ControlError, Result};
use crate::system::ProgramStatus;

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Same effect as the keypad button for `cue` on `port`.
    Cue {
        cue: Cue,
        state: ButtonState,
        port: PortIndex,
    },
    Route {
        zone: ZoneNumber,
        source: SourceNumber,
    },
    AllOff,
    Program(ProgramStatus),
    Help,
}

impl ConsoleCommand {
    pub const HELP: &'static str = "\
Commands:
  UpPress <port>        UpRelease <port>
  DnPress <port>        DnRelease <port>
  route <zone> <source> alloff
  pause  resume  stop   help";
}

impl FromStr for ConsoleCommand {
    type Err = ControlError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ControlError::UnknownCommand(String::new()));
        };
        let args: Vec<&str> = words.collect();

        let cue = |cue, state| -> Result<Self> {
            let [port] = expect_args::<1>(name, &args)?;
            let port = parse_arg(name, "port", port, PortIndex::new)?;
            Ok(Self::Cue { cue, state, port })
        };

        match name.to_ascii_lowercase().as_str() {
            "uppress" => cue(Cue::Up, ButtonState::Pressed),
            "uprelease" => cue(Cue::Up, ButtonState::Released),
            "dnpress" => cue(Cue::Down, ButtonState::Pressed),
            "dnrelease" => cue(Cue::Down, ButtonState::Released),
            "route" => {
                let [zone, source] = expect_args::<2>(name, &args)?;
                Ok(Self::Route {
                    zone: parse_arg(name, "zone", zone, ZoneNumber::new)?,
                    source: parse_arg(name, "source", source, SourceNumber::new)?,
                })
            }
            "alloff" => no_args(name, &args, Self::AllOff),
            "pause" => no_args(name, &args, Self::Program(ProgramStatus::Paused)),
            "resume" => no_args(name, &args, Self::Program(ProgramStatus::Resumed)),
            "stop" | "quit" => no_args(name, &args, Self::Program(ProgramStatus::Stopping)),
            "help" | "?" => Ok(Self::Help),
            _ => Err(ControlError::UnknownCommand(name.to_string())),
        }
    }
}

fn expect_args<'a, const N: usize>(command: &str, args: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        ControlError::invalid_arguments(
            command,
            format!("expected {} argument(s), got {}", N, args.len()),
        )
    })
}

fn no_args(command: &str, args: &[&str], parsed: ConsoleCommand) -> Result<ConsoleCommand> {
    expect_args::<0>(command, args).map(|[]| parsed)
}

fn parse_arg<N, T>(
    command: &str,
    what: &str,
    raw: &str,
    build: impl FnOnce(N) -> hearth_core::Result<T>,
) -> Result<T>
where
    N: FromStr,
{
    let number = raw.parse::<N>().map_err(|_| {
        ControlError::invalid_arguments(command, format!("{} '{}' is not a number", what, raw))
    })?;
    build(number).map_err(|e| ControlError::invalid_arguments(command, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn port(n: u8) -> PortIndex {
        PortIndex::new(n).unwrap()
    }

    #[rstest]
    #[case("UpPress 1", Cue::Up, ButtonState::Pressed, 1)]
    #[case("UpRelease 2", Cue::Up, ButtonState::Released, 2)]
    #[case("dnpress 1", Cue::Down, ButtonState::Pressed, 1)]
    #[case("  DNRELEASE   4 ", Cue::Down, ButtonState::Released, 4)]
    fn test_cue_commands(
        #[case] line: &str,
        #[case] cue: Cue,
        #[case] state: ButtonState,
        #[case] n: u8,
    ) {
        assert_eq!(
            line.parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Cue {
                cue,
                state,
                port: port(n)
            }
        );
    }

    #[rstest]
    #[case("pause", ProgramStatus::Paused)]
    #[case("Resume", ProgramStatus::Resumed)]
    #[case("stop", ProgramStatus::Stopping)]
    #[case("quit", ProgramStatus::Stopping)]
    fn test_program_commands(#[case] line: &str, #[case] status: ProgramStatus) {
        assert_eq!(
            line.parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Program(status)
        );
    }

    #[test]
    fn test_route() {
        assert_eq!(
            "route 2 7".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Route {
                zone: ZoneNumber::new(2).unwrap(),
                source: SourceNumber::new(7).unwrap(),
            }
        );
        assert_eq!(
            "alloff".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::AllOff
        );
    }

    #[rstest]
    #[case("UpPress")]
    #[case("UpPress 1 2")]
    #[case("UpPress x")]
    #[case("UpPress 0")]
    #[case("route 1")]
    #[case("route 65 1")]
    #[case("stop now")]
    fn test_invalid_arguments(#[case] line: &str) {
        let err = line.parse::<ConsoleCommand>().unwrap_err();
        assert!(
            matches!(err, ControlError::InvalidArguments { .. }),
            "{line}: {err}"
        );
    }

    #[rstest]
    #[case("Jump 1")]
    #[case("")]
    #[case("   ")]
    fn test_unknown_command(#[case] line: &str) {
        let err = line.parse::<ConsoleCommand>().unwrap_err();
        assert!(matches!(err, ControlError::UnknownCommand(_)));
    }
}
