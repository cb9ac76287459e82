//! Line commands read from stdin.

use kurbo::Point;
use thiserror::Error;

/// Command parse errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// One user command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create { username: Option<String> },
    Join { room_id: String, username: Option<String> },
    Destroy,
    Leave,
    Color(String),
    Size(f64),
    Eraser,
    Clear,
    Down(Point),
    Move(Point),
    Up,
    /// Pointer left the canvas.
    Out,
    Colors,
    Who,
    Status,
    Snapshot(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  create [username]          create a room
  join <room> [username]     join a room
  destroy                    destroy the room (creator only)
  leave                      leave the room locally
  color <name>               select a color
  size <n>                   set the brush size
  eraser                     toggle the eraser
  clear                      clear your own strokes
  down|move <x> <y>          pointer input
  up | out                   release / leave the canvas
  colors | who | status      show palette, members, session state
  snapshot <file.png>        write the canvas to a PNG
  quit";

/// Parse one line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let cmd = match name.to_ascii_lowercase().as_str() {
        "create" => Command::Create {
            username: words.next().map(str::to_string),
        },
        "join" => Command::Join {
            room_id: words
                .next()
                .ok_or(CommandError::MissingArgument("room"))?
                .to_string(),
            username: words.next().map(str::to_string),
        },
        "destroy" => Command::Destroy,
        "leave" => Command::Leave,
        "color" => Command::Color(
            words
                .next()
                .ok_or(CommandError::MissingArgument("color"))?
                .to_string(),
        ),
        "size" => Command::Size(number(words.next(), "size")?),
        "eraser" => Command::Eraser,
        "clear" => Command::Clear,
        "down" => Command::Down(point(&mut words)?),
        "move" => Command::Move(point(&mut words)?),
        "up" => Command::Up,
        "out" => Command::Out,
        "colors" => Command::Colors,
        "who" => Command::Who,
        "status" => Command::Status,
        "snapshot" => Command::Snapshot(
            words
                .next()
                .ok_or(CommandError::MissingArgument("file"))?
                .to_string(),
        ),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

fn number(word: Option<&str>, what: &'static str) -> Result<f64, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(what))?;
    word.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::InvalidNumber(word.to_string()))
}

fn point<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Point, CommandError> {
    let x = number(words.next(), "x")?;
    let y = number(words.next(), "y")?;
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_pointer_commands() {
        assert_eq!(
            parse_command("down 10 20.5"),
            Ok(Some(Command::Down(Point::new(10.0, 20.5))))
        );
        assert_eq!(parse_command("MOVE 1 2"), Ok(Some(Command::Move(Point::new(1.0, 2.0)))));
        assert_eq!(parse_command("up"), Ok(Some(Command::Up)));
    }

    #[test]
    fn test_join_with_optional_username() {
        assert_eq!(
            parse_command("join abc"),
            Ok(Some(Command::Join { room_id: "abc".to_string(), username: None }))
        );
        assert_eq!(
            parse_command("join abc ada"),
            Ok(Some(Command::Join {
                room_id: "abc".to_string(),
                username: Some("ada".to_string())
            }))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_command("join"), Err(CommandError::MissingArgument("room")));
        assert_eq!(
            parse_command("size big"),
            Err(CommandError::InvalidNumber("big".to_string()))
        );
        assert_eq!(parse_command("down 1"), Err(CommandError::MissingArgument("y")));
        assert_eq!(parse_command("size NaN"), Err(CommandError::InvalidNumber("NaN".to_string())));
        assert_eq!(parse_command("fly"), Err(CommandError::Unknown("fly".to_string())));
    }
}
