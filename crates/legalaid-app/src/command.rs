//! Terminal command parsing.
//!
//! Lines starting with `/` are commands; anything else is a question to
//! send. Card and scenario numbers are 1-based as printed.

use legalaid_chat::CategoryFilter;
use legalaid_core::NarrationSection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRef {
    /// Position in the full card list.
    Number(usize),
    Title(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Topics(CategoryFilter),
    Open(CardRef),
    Pick(usize),
    Close,
    Send,
    Draft,
    ClearDraft,
    Reset,
    History,
    /// `message` is the 1-based position in the history; `None` means the
    /// latest assistant answer.
    Speak {
        section: NarrationSection,
        message: Option<usize>,
    },
    StopSpeaking,
    Listen,
    Health,
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: /{0} (try /help)")]
    Unknown(String),
    #[error("/{command} needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("invalid argument for /{command}: {value}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

pub const HELP: &str = "\
Type a question and press Enter to send it.

  /topics [all|housing|employment|consumer]  list topic cards
  /open <n|title>                            show example scenarios for a card
  /pick <n>                                  put scenario n into the draft
  /close                                     close the scenario list
  /send                                      send the current draft
  /draft                                     show the current draft
  /clear                                     discard the current draft
  /reset                                     start a new conversation
  /history                                   show the conversation
  /speak <section> [message#]                read a section aloud
                                             (answer, simple, laws, plan)
  /stop-speaking                             stop reading aloud
  /listen                                    toggle voice input
  /health                                    check the backend
  /help                                      show this help
  /quit                                      exit";

fn positive(command: &'static str, value: &str) -> Result<usize, CommandError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::InvalidArgument {
            command,
            value: value.to_string(),
        }),
    }
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Ask(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "topics" => {
            if arg.is_empty() {
                return Ok(Command::Topics(CategoryFilter::All));
            }
            arg.parse()
                .map(Command::Topics)
                .map_err(|_| CommandError::InvalidArgument {
                    command: "topics",
                    value: arg.to_string(),
                })
        }
        "open" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "open",
                    what: "a card number or title",
                });
            }
            match arg.parse::<usize>() {
                Ok(_) => positive("open", arg).map(|n| Command::Open(CardRef::Number(n))),
                Err(_) => Ok(Command::Open(CardRef::Title(arg.to_string()))),
            }
        }
        "pick" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "pick",
                    what: "a scenario number",
                });
            }
            positive("pick", arg).map(Command::Pick)
        }
        "speak" => {
            let mut parts = arg.split_whitespace();
            let section = parts.next().ok_or(CommandError::MissingArgument {
                command: "speak",
                what: "a section (answer, simple, laws, plan)",
            })?;
            let section = section
                .parse::<NarrationSection>()
                .map_err(|_| CommandError::InvalidArgument {
                    command: "speak",
                    value: section.to_string(),
                })?;
            let message = parts.next().map(|n| positive("speak", n)).transpose()?;
            Ok(Command::Speak { section, message })
        }
        "close" => Ok(Command::Close),
        "send" => Ok(Command::Send),
        "draft" => Ok(Command::Draft),
        "clear" => Ok(Command::ClearDraft),
        "reset" | "new" => Ok(Command::Reset),
        "history" => Ok(Command::History),
        "stop-speaking" | "stop" => Ok(Command::StopSpeaking),
        "listen" => Ok(Command::Listen),
        "health" => Ok(Command::Health),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
