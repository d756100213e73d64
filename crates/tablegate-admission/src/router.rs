//! Command routing
//!
//! Classifies a raw command by its leading verb and extracts the target
//! table: the first whitespace-delimited token after the verb's
//! table-reference keyword. Verbs are matched ASCII case-insensitively.

use tablegate_common::{TableName, TableNameError};
use thiserror::Error;

/// Kind of operation a command performs on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Read,
    Write,
    /// Not a table read or write; sent to storage unmodified
    Passthrough,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Write => "write",
            OperationKind::Passthrough => "passthrough",
        }
    }
}

/// Where a command goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Read(TableName),
    Write(TableName),
    Passthrough,
}

impl Route {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Route::Read(_) => OperationKind::Read,
            Route::Write(_) => OperationKind::Write,
            Route::Passthrough => OperationKind::Passthrough,
        }
    }
}

/// Command parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("missing {keyword} clause")]
    MissingKeyword { keyword: &'static str },
    #[error("no table name after {keyword}")]
    MissingTable { keyword: &'static str },
    #[error("invalid table name: {0}")]
    InvalidTableName(#[from] TableNameError),
}

/// Classify a command and extract its target table
pub fn route(command: &str) -> Result<Route, ParseError> {
    let mut tokens = command.split_whitespace();
    let verb = tokens.next().ok_or(ParseError::Empty)?;

    if verb.eq_ignore_ascii_case("SELECT") {
        Ok(Route::Read(table_after(tokens, "FROM")?))
    } else if verb.eq_ignore_ascii_case("INSERT") {
        Ok(Route::Write(table_after(tokens, "INTO")?))
    } else if verb.eq_ignore_ascii_case("DELETE") {
        Ok(Route::Write(table_after(tokens, "FROM")?))
    } else if verb.eq_ignore_ascii_case("UPDATE") {
        // UPDATE names its table directly
        Ok(Route::Write(table_name(tokens.next(), "UPDATE")?))
    } else {
        Ok(Route::Passthrough)
    }
}

fn table_after<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    keyword: &'static str,
) -> Result<TableName, ParseError> {
    if !tokens.any(|t| t.eq_ignore_ascii_case(keyword)) {
        return Err(ParseError::MissingKeyword { keyword });
    }
    table_name(tokens.next(), keyword)
}

fn table_name(token: Option<&str>, keyword: &'static str) -> Result<TableName, ParseError> {
    // `t1(name, ...)` and `t1;` both reference t1
    let name = token
        .map(|t| t.split('(').next().unwrap_or_default().trim_end_matches(';'))
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::MissingTable { keyword })?;
    Ok(TableName::new(name)?)
}
