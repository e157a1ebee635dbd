//! Statement validation and matching for Maildir searches
//!
//! Statements are checked up front, the way a server rejects a malformed
//! SEARCH before looking at any message, then evaluated as a conjunction.

use crate::error::{MailError, Result};
use crate::message::{FLAG_ANSWERED, FLAG_DELETED, FLAG_FLAGGED, FLAG_SEEN};
use crate::query::{SearchKey, Statement, DATE_FORMAT};
use chrono::NaiveDate;
use mail_parser::{Address, Message as ParsedMessage};

/// Character sets the local matcher can honour
const SUPPORTED_CHARSETS: &[&str] = &["UTF-8", "US-ASCII"];

/// Alternative date syntax accepted for date keys (e.g. "8-Apr-2018")
const IMAP_DATE_FORMAT: &str = "%d-%b-%Y";

/// A validated search statement
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    All,
    HasFlag(&'static str),
    LacksFlag(&'static str),
    Recent,
    Old,
    New,
    Keyword(String),
    Unkeyword(String),
    Header {
        field: HeaderField,
        needle: String,
    },
    Body(String),
    Text(String),
    Before(NaiveDate),
    On(NaiveDate),
    Since(NaiveDate),
}

/// Headers searchable by value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Bcc,
    Cc,
    From,
    To,
    Subject,
}

/// Decoded header values of one message
///
/// Address headers keep one entry per mailbox, written as `Name <address>`
/// when the display name is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderValues {
    pub subject: Option<String>,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl HeaderValues {
    pub fn from_parsed(parsed: &ParsedMessage<'_>) -> Self {
        Self {
            subject: parsed.subject().map(|s| s.to_string()),
            from: mailboxes(parsed.from()),
            to: mailboxes(parsed.to()),
            cc: mailboxes(parsed.cc()),
            bcc: mailboxes(parsed.bcc()),
        }
    }

    pub fn values(&self, field: HeaderField) -> Vec<&str> {
        match field {
            HeaderField::Subject => self.subject.iter().map(String::as_str).collect(),
            HeaderField::From => self.from.iter().map(String::as_str).collect(),
            HeaderField::To => self.to.iter().map(String::as_str).collect(),
            HeaderField::Cc => self.cc.iter().map(String::as_str).collect(),
            HeaderField::Bcc => self.bcc.iter().map(String::as_str).collect(),
        }
    }

    fn all_values(&self) -> impl Iterator<Item = &str> {
        self.subject
            .iter()
            .chain(&self.from)
            .chain(&self.to)
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }
}

fn mailboxes(address: Option<&Address<'_>>) -> Vec<String> {
    let Some(address) = address else {
        return Vec::new();
    };

    address
        .clone()
        .into_list()
        .into_iter()
        .filter_map(|addr| match (addr.name, addr.address) {
            (Some(name), Some(email)) => Some(format!("{} <{}>", name, email)),
            (Some(name), None) => Some(name.into_owned()),
            (None, Some(email)) => Some(email.into_owned()),
            (None, None) => None,
        })
        .collect()
}

/// What a criterion is evaluated against
pub struct Candidate<'a> {
    pub flags: &'a [String],
    pub recent: bool,
    pub headers: &'a HeaderValues,
    pub body: &'a str,
    pub raw: &'a str,
    pub date: Option<NaiveDate>,
}

pub fn validate_charset(charset: Option<&str>) -> Result<()> {
    match charset {
        Some(cs) if !SUPPORTED_CHARSETS.iter().any(|s| s.eq_ignore_ascii_case(cs)) => Err(
            MailError::SearchValidation(format!("Unsupported charset: {}", cs)),
        ),
        _ => Ok(()),
    }
}

/// Parse a date value as written by the query builder, or in IMAP date syntax
pub fn parse_search_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, IMAP_DATE_FORMAT))
        .map_err(|_| MailError::SearchValidation(format!("Invalid search date: {}", value)))
}

/// Validate the statements and turn them into criteria
pub fn compile(statements: &[Statement]) -> Result<Vec<Criterion>> {
    statements.iter().map(compile_statement).collect()
}

fn compile_statement(statement: &Statement) -> Result<Criterion> {
    let key: SearchKey = statement.key().parse()?;

    let value = match (key.takes_value(), statement.value()) {
        (true, Some(value)) => value.to_string(),
        (true, None) => {
            return Err(MailError::SearchValidation(format!(
                "{} requires a value",
                key
            )))
        }
        (false, Some(_)) => {
            return Err(MailError::SearchValidation(format!(
                "{} does not take a value",
                key
            )))
        }
        (false, None) => String::new(),
    };

    let criterion = match key {
        SearchKey::All => Criterion::All,
        SearchKey::Answered => Criterion::HasFlag(FLAG_ANSWERED),
        SearchKey::Unanswered => Criterion::LacksFlag(FLAG_ANSWERED),
        SearchKey::Deleted => Criterion::HasFlag(FLAG_DELETED),
        SearchKey::Undeleted => Criterion::LacksFlag(FLAG_DELETED),
        SearchKey::Flagged => Criterion::HasFlag(FLAG_FLAGGED),
        SearchKey::Unflagged => Criterion::LacksFlag(FLAG_FLAGGED),
        SearchKey::Seen => Criterion::HasFlag(FLAG_SEEN),
        SearchKey::Unseen => Criterion::LacksFlag(FLAG_SEEN),
        SearchKey::Recent => Criterion::Recent,
        SearchKey::Old => Criterion::Old,
        SearchKey::New => Criterion::New,
        SearchKey::Keyword => Criterion::Keyword(value),
        SearchKey::Unkeyword => Criterion::Unkeyword(value),
        SearchKey::Bcc => Criterion::Header {
            field: HeaderField::Bcc,
            needle: value,
        },
        SearchKey::Cc => Criterion::Header {
            field: HeaderField::Cc,
            needle: value,
        },
        SearchKey::From => Criterion::Header {
            field: HeaderField::From,
            needle: value,
        },
        SearchKey::To => Criterion::Header {
            field: HeaderField::To,
            needle: value,
        },
        SearchKey::Subject => Criterion::Header {
            field: HeaderField::Subject,
            needle: value,
        },
        SearchKey::Body => Criterion::Body(value),
        SearchKey::Text => Criterion::Text(value),
        SearchKey::Before => Criterion::Before(parse_search_date(&value)?),
        SearchKey::On => Criterion::On(parse_search_date(&value)?),
        SearchKey::Since => Criterion::Since(parse_search_date(&value)?),
    };

    Ok(criterion)
}

fn has_flag(flags: &[String], flag: &str) -> bool {
    flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Criterion {
    pub fn matches(&self, candidate: &Candidate<'_>) -> bool {
        match self {
            Criterion::All => true,
            Criterion::HasFlag(flag) => has_flag(candidate.flags, flag),
            Criterion::LacksFlag(flag) => !has_flag(candidate.flags, flag),
            Criterion::Recent => candidate.recent,
            Criterion::Old => !candidate.recent,
            Criterion::New => candidate.recent && !has_flag(candidate.flags, FLAG_SEEN),
            Criterion::Keyword(keyword) => has_flag(candidate.flags, keyword),
            Criterion::Unkeyword(keyword) => !has_flag(candidate.flags, keyword),
            Criterion::Header { field, needle } => candidate
                .headers
                .values(*field)
                .into_iter()
                .any(|value| contains_ignore_case(value, needle)),
            Criterion::Body(needle) => contains_ignore_case(candidate.body, needle),
            // Decoded headers and body, then the raw source
            Criterion::Text(needle) => {
                candidate
                    .headers
                    .all_values()
                    .any(|value| contains_ignore_case(value, needle))
                    || contains_ignore_case(candidate.body, needle)
                    || contains_ignore_case(candidate.raw, needle)
            }
            Criterion::Before(date) => candidate.date.map_or(false, |d| d < *date),
            Criterion::On(date) => candidate.date.map_or(false, |d| d == *date),
            Criterion::Since(date) => candidate.date.map_or(false, |d| d >= *date),
        }
    }
}
