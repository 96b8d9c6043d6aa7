use thiserror::Error;

use crate::{error::ValidationError, structs::timer::TimerId};

/// Something the user typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddGlass,
    ResetGlasses,
    SetGoal(i64),
    DismissCompletion,
    AddTimer {
        name: String,
        hour: i64,
        minute: i64,
    },
    EditTimer {
        id: TimerId,
        name: String,
        hour: i64,
        minute: i64,
    },
    ToggleTimer(TimerId),
    DeleteTimer(TimerId),
    List,
    Status,
    ToggleTheme,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub const HELP: &str = "\
glass                      log a glass of water
reset                      reset today's count
goal <1-20>                set the daily goal
done                       dismiss the goal-reached notice
add <name> <HH:MM>         add a daily reminder
edit <id> <name> <HH:MM>   change a reminder
toggle <id>                turn a reminder on or off
delete <id>                delete a reminder (asks first)
list                       show reminders
status                     show today's progress
theme                      switch between light and dark
quit                       exit";

fn parse_number(raw: &str) -> Result<i64, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_owned()))
}

/// Parses `HH:MM`. Range checks are left to the timer manager.
pub fn parse_time(raw: &str) -> Result<(i64, i64), ValidationError> {
    let invalid = || ValidationError::InvalidTime(raw.to_owned());

    let (hour, minute) = raw.split_once(':').ok_or_else(invalid)?;
    let hour = hour.trim().parse().map_err(|_| invalid())?;
    let minute = minute.trim().parse().map_err(|_| invalid())?;
    Ok((hour, minute))
}

/// Splits `<name words...> <HH:MM>`; the time is always the last token.
fn parse_name_and_time(args: &[&str]) -> Result<(String, i64, i64), CommandError> {
    let (time, name) = args
        .split_last()
        .ok_or(CommandError::MissingArgument("time (HH:MM)"))?;
    let (hour, minute) = parse_time(time)?;
    Ok((name.join(" "), hour, minute))
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CommandError::MissingArgument("command"));
    };
    let args: Vec<&str> = words.collect();

    let id_arg = |args: &[&str]| -> Result<TimerId, CommandError> {
        parse_number(args.first().ok_or(CommandError::MissingArgument("timer id"))?)
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "glass" | "drink" | "+" => Command::AddGlass,
        "reset" => Command::ResetGlasses,
        "goal" => Command::SetGoal(parse_number(
            args.first().ok_or(CommandError::MissingArgument("goal"))?,
        )?),
        "done" | "dismiss" => Command::DismissCompletion,
        "add" => {
            let (name, hour, minute) = parse_name_and_time(&args)?;
            Command::AddTimer { name, hour, minute }
        }
        "edit" => {
            let id = id_arg(&args)?;
            let (name, hour, minute) = parse_name_and_time(&args[1..])?;
            Command::EditTimer {
                id,
                name,
                hour,
                minute,
            }
        }
        "toggle" => Command::ToggleTimer(id_arg(&args)?),
        "delete" | "rm" => Command::DeleteTimer(id_arg(&args)?),
        "list" | "ls" => Command::List,
        "status" => Command::Status,
        "theme" => Command::ToggleTheme,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_owned())),
    };

    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse("glass"), Ok(Command::AddGlass));
        assert_eq!(parse("  GOAL 12 "), Ok(Command::SetGoal(12)));
        assert_eq!(parse("toggle 42"), Ok(Command::ToggleTimer(42)));
        assert_eq!(parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn timer_names_may_have_spaces() {
        assert_eq!(
            parse("add After lunch 13:05"),
            Ok(Command::AddTimer {
                name: "After lunch".into(),
                hour: 13,
                minute: 5,
            })
        );
        assert_eq!(
            parse("edit 7 08:30"),
            Ok(Command::EditTimer {
                id: 7,
                name: String::new(),
                hour: 8,
                minute: 30,
            })
        );
    }

    #[test]
    fn out_of_range_times_still_parse() {
        assert_eq!(
            parse("add Late 25:00"),
            Ok(Command::AddTimer {
                name: "Late".into(),
                hour: 25,
                minute: 0,
            })
        );
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(parse(""), Err(CommandError::MissingArgument("command")));
        assert_eq!(parse("fly"), Err(CommandError::Unknown("fly".into())));
        assert_eq!(parse("goal"), Err(CommandError::MissingArgument("goal")));
        assert_eq!(
            parse("goal lots"),
            Err(CommandError::InvalidNumber("lots".into()))
        );
        assert_eq!(
            parse("add Morning eight"),
            Err(CommandError::Invalid(ValidationError::InvalidTime(
                "eight".into()
            )))
        );
        assert_eq!(
            parse("add"),
            Err(CommandError::MissingArgument("time (HH:MM)"))
        );
    }
}
