//! Interactive reader commands.
//!
//! The reader is deliberately forgiving: any lookup or parse failure is
//! reported as `Unknown command` and the session continues.

use crate::model::{Collection, Coordinates, ModelError};
use crate::output;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Books,
    Quit,
    Quote(Coordinates),
}

impl FromStr for Command {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let query = s.trim();
        match query.to_lowercase().as_str() {
            "help" | "?" => Ok(Command::Help),
            "books" => Ok(Command::Books),
            "quit" | "exit" => Ok(Command::Quit),
            _ => query.parse().map(Command::Quote),
        }
    }
}

/// What the session should do after a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Vec<String>),
    Quit(Vec<String>),
}

impl Outcome {
    pub fn lines(&self) -> &[String] {
        match self {
            Outcome::Continue(lines) | Outcome::Quit(lines) => lines,
        }
    }
}

/// Run one query against `collection`.
pub fn process(collection: &Collection, query: &str) -> Outcome {
    let result = query.parse::<Command>().and_then(|command| match command {
        Command::Help => Ok(Outcome::Continue(output::format_help())),
        Command::Books => Ok(Outcome::Continue(vec![output::format_book_keys(
            collection,
        )])),
        Command::Quit => Ok(Outcome::Quit(vec![
            "Good bye. Have a nice day.".to_string(),
        ])),
        Command::Quote(coords) => collection
            .lookup(&coords)
            .map(|passage| Outcome::Continue(output::format_passage(&passage))),
    });
    result.unwrap_or_else(|err| {
        tracing::debug!(query, %err, "query failed");
        Outcome::Continue(vec!["Unknown command".to_string()])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_collection;

    #[test]
    fn parse_commands() {
        assert_eq!("help".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("?".parse::<Command>().unwrap(), Command::Help);
        assert_eq!(" books ".parse::<Command>().unwrap(), Command::Books);
        assert_eq!("EXIT".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(
            "Gen 1 1".parse::<Command>().unwrap(),
            Command::Quote(Coordinates::verse("Gen", 1, 1))
        );
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn quote_verse() {
        let outcome = process(&sample_collection(), "Gen 1 2");
        assert_eq!(
            outcome,
            Outcome::Continue(vec![
                "[Gen 1:2] The earth was formless and empty.".to_string()
            ])
        );
    }

    #[test]
    fn books_lists_short_names() {
        let outcome = process(&sample_collection(), "books");
        assert_eq!(outcome.lines(), ["Gen Exod".to_string()]);
    }

    #[test]
    fn quit_ends_session() {
        assert!(matches!(
            process(&sample_collection(), "quit"),
            Outcome::Quit(_)
        ));
    }

    #[test]
    fn failures_are_unknown_command() {
        let collection = sample_collection();
        for query in ["", "Lev 1 1", "Gen 99 1", "Gen 1 99", "a b c d"] {
            assert_eq!(
                process(&collection, query),
                Outcome::Continue(vec!["Unknown command".to_string()]),
                "query {query:?}"
            );
        }
    }
}
