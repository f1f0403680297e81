//! Console command grammar.
//!
//! One command per line, whitespace separated. Parsing is pure; nothing here
//! touches the supervisor.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::id::ItemId;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Search(String),
    /// Track the n-th (1-based) hit of the last search.
    AddResult(usize),
    Add {
        id: ItemId,
        name: String,
        join_price: Decimal,
    },
    List,
    Pause(ItemId),
    Resume(ItemId),
    Remove(ItemId),
    /// `None` clears the target.
    Target {
        id: ItemId,
        price: Option<Decimal>,
    },
    Percent {
        id: ItemId,
        percentage: i64,
    },
    Interval(u64),
    Default {
        percentage: i64,
        apply_to_all: bool,
    },
    Token(String),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{value}' is not a valid {expected}")]
    Invalid {
        value: String,
        expected: &'static str,
    },
}

pub const HELP: &str = "\
search <keyword>            search the catalog
add <n>                     track the n-th result of the last search
add <id> <name> <price>     track an item by id
list                        show tracked tasks
pause <id>                  stop polling a task
resume <id>                 start polling a task again
remove <id>                 stop and forget a task
target <id> <price|clear>   set or clear the absolute target price
percent <id> <n>            set the task's percentage (10-100)
interval <secs>             set the polling interval (1-60)
default <n> [all]           set the default percentage, optionally for every task
token <value>               replace the marketplace access token
help                        show this text
quit                        stop all workers and exit";

/// Parse one line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown commands, missing arguments, or
/// arguments that do not parse.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            if args.is_empty() {
                return Err(ParseError::Usage("search <keyword>"));
            }
            ConsoleCommand::Search(args.join(" "))
        }
        "add" | "a" => parse_add(&args)?,
        "list" | "ls" => ConsoleCommand::List,
        "pause" => ConsoleCommand::Pause(one_id(&args, "pause <id>")?),
        "resume" => ConsoleCommand::Resume(one_id(&args, "resume <id>")?),
        "remove" | "rm" => ConsoleCommand::Remove(one_id(&args, "remove <id>")?),
        "target" => match args.as_slice() {
            [id, "clear" | "none" | "-"] => ConsoleCommand::Target {
                id: ItemId::from(*id),
                price: None,
            },
            [id, price] => ConsoleCommand::Target {
                id: ItemId::from(*id),
                price: Some(number(price, "price")?),
            },
            _ => return Err(ParseError::Usage("target <id> <price|clear>")),
        },
        "percent" | "pct" => match args.as_slice() {
            [id, value] => ConsoleCommand::Percent {
                id: ItemId::from(*id),
                percentage: number(value, "percentage")?,
            },
            _ => return Err(ParseError::Usage("percent <id> <n>")),
        },
        "interval" => match args.as_slice() {
            [secs] => ConsoleCommand::Interval(number(secs, "number of seconds")?),
            _ => return Err(ParseError::Usage("interval <secs>")),
        },
        "default" => match args.as_slice() {
            [value] => ConsoleCommand::Default {
                percentage: number(value, "percentage")?,
                apply_to_all: false,
            },
            [value, "all"] => ConsoleCommand::Default {
                percentage: number(value, "percentage")?,
                apply_to_all: true,
            },
            _ => return Err(ParseError::Usage("default <n> [all]")),
        },
        "token" => match args.as_slice() {
            [token] => ConsoleCommand::Token((*token).to_string()),
            _ => return Err(ParseError::Usage("token <value>")),
        },
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_add(args: &[&str]) -> Result<ConsoleCommand, ParseError> {
    match args {
        [n] => {
            let index: usize = number(n, "result number")?;
            if index == 0 {
                return Err(ParseError::Invalid {
                    value: (*n).to_string(),
                    expected: "result number",
                });
            }
            Ok(ConsoleCommand::AddResult(index))
        }
        [id, name @ .., price] if !name.is_empty() => Ok(ConsoleCommand::Add {
            id: ItemId::from(*id),
            name: name.join(" "),
            join_price: number(price, "price")?,
        }),
        _ => Err(ParseError::Usage("add <n> | add <id> <name> <price>")),
    }
}

fn one_id(args: &[&str], usage: &'static str) -> Result<ItemId, ParseError> {
    match args {
        [id] => Ok(ItemId::from(*id)),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn number<T: FromStr>(value: &str, expected: &'static str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::Invalid {
        value: value.to_string(),
        expected,
    })
}
