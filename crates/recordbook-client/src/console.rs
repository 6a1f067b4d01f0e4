//! Line commands accepted by the `watch` front end.

use crate::form::FormField;
use crate::refresh::ViewCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Commands(Vec<ViewCommand>),
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  page N                      go to page N
  next | prev                 move one page
  search TERM                 filter by name, e-mail or message (empty clears)
  add NAME | EMAIL | MESSAGE  submit a new record
  reload                      reload now
  quit                        exit";

/// Parse one line typed by the user.
pub fn parse(line: &str) -> ConsoleInput {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => ConsoleInput::Commands(Vec::new()),
        "next" | "n" => ConsoleInput::Commands(vec![ViewCommand::NextPage]),
        "prev" | "p" => ConsoleInput::Commands(vec![ViewCommand::PrevPage]),
        "reload" | "r" => ConsoleInput::Commands(vec![ViewCommand::Reload]),
        "search" | "s" => ConsoleInput::Commands(vec![ViewCommand::Search(rest.to_string())]),
        "page" => match rest.parse::<u32>() {
            Ok(page) => ConsoleInput::Commands(vec![ViewCommand::SetPage(page)]),
            Err(_) => ConsoleInput::Unknown(line.to_string()),
        },
        "add" => {
            let parts: Vec<&str> = rest.splitn(3, '|').map(str::trim).collect();
            let [name, email, message] = parts.as_slice() else {
                return ConsoleInput::Unknown(line.to_string());
            };
            ConsoleInput::Commands(vec![
                ViewCommand::Edit(FormField::Name, (*name).to_string()),
                ViewCommand::Edit(FormField::Email, (*email).to_string()),
                ViewCommand::Edit(FormField::Message, (*message).to_string()),
                ViewCommand::Submit,
            ])
        }
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" | "q" => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(line.to_string()),
    }
}
