//! Search statements
//!
//! A statement is one search term: a keyword from the server vocabulary and
//! at most one value. Values are kept in their server-ready textual form, so
//! dates are formatted as soon as the statement is built.

use crate::error::MailError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;
use std::str::FromStr;

/// Textual date format used for date-valued statements (e.g. "08 Apr 18")
pub const DATE_FORMAT: &str = "%d %b %y";

/// Search keys understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKey {
    All,
    Answered,
    Bcc,
    Before,
    Body,
    Cc,
    Deleted,
    Flagged,
    From,
    Keyword,
    New,
    Old,
    On,
    Recent,
    Seen,
    Since,
    Subject,
    Text,
    To,
    Unanswered,
    Undeleted,
    Unflagged,
    Unkeyword,
    Unseen,
}

impl SearchKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKey::All => "ALL",
            SearchKey::Answered => "ANSWERED",
            SearchKey::Bcc => "BCC",
            SearchKey::Before => "BEFORE",
            SearchKey::Body => "BODY",
            SearchKey::Cc => "CC",
            SearchKey::Deleted => "DELETED",
            SearchKey::Flagged => "FLAGGED",
            SearchKey::From => "FROM",
            SearchKey::Keyword => "KEYWORD",
            SearchKey::New => "NEW",
            SearchKey::Old => "OLD",
            SearchKey::On => "ON",
            SearchKey::Recent => "RECENT",
            SearchKey::Seen => "SEEN",
            SearchKey::Since => "SINCE",
            SearchKey::Subject => "SUBJECT",
            SearchKey::Text => "TEXT",
            SearchKey::To => "TO",
            SearchKey::Unanswered => "UNANSWERED",
            SearchKey::Undeleted => "UNDELETED",
            SearchKey::Unflagged => "UNFLAGGED",
            SearchKey::Unkeyword => "UNKEYWORD",
            SearchKey::Unseen => "UNSEEN",
        }
    }

    /// Whether the key must be followed by exactly one value
    pub fn takes_value(&self) -> bool {
        matches!(
            self,
            SearchKey::Bcc
                | SearchKey::Before
                | SearchKey::Body
                | SearchKey::Cc
                | SearchKey::From
                | SearchKey::Keyword
                | SearchKey::On
                | SearchKey::Since
                | SearchKey::Subject
                | SearchKey::Text
                | SearchKey::To
                | SearchKey::Unkeyword
        )
    }

    pub fn is_date(&self) -> bool {
        matches!(self, SearchKey::Before | SearchKey::On | SearchKey::Since)
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKey {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_ascii_uppercase().as_str() {
            "ALL" => SearchKey::All,
            "ANSWERED" => SearchKey::Answered,
            "BCC" => SearchKey::Bcc,
            "BEFORE" => SearchKey::Before,
            "BODY" => SearchKey::Body,
            "CC" => SearchKey::Cc,
            "DELETED" => SearchKey::Deleted,
            "FLAGGED" => SearchKey::Flagged,
            "FROM" => SearchKey::From,
            "KEYWORD" => SearchKey::Keyword,
            "NEW" => SearchKey::New,
            "OLD" => SearchKey::Old,
            "ON" => SearchKey::On,
            "RECENT" => SearchKey::Recent,
            "SEEN" => SearchKey::Seen,
            "SINCE" => SearchKey::Since,
            "SUBJECT" => SearchKey::Subject,
            "TEXT" => SearchKey::Text,
            "TO" => SearchKey::To,
            "UNANSWERED" => SearchKey::Unanswered,
            "UNDELETED" => SearchKey::Undeleted,
            "UNFLAGGED" => SearchKey::Unflagged,
            "UNKEYWORD" => SearchKey::Unkeyword,
            "UNSEEN" => SearchKey::Unseen,
            _ => {
                return Err(MailError::SearchValidation(format!(
                    "Unknown search key: {}",
                    s
                )))
            }
        };

        Ok(key)
    }
}

/// Value of a statement, already converted to its textual form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchValue(String);

impl SearchValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        SearchValue(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        SearchValue(value)
    }
}

impl From<&String> for SearchValue {
    fn from(value: &String) -> Self {
        SearchValue(value.clone())
    }
}

impl From<NaiveDate> for SearchValue {
    fn from(date: NaiveDate) -> Self {
        SearchValue(date.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveDateTime> for SearchValue {
    fn from(datetime: NaiveDateTime) -> Self {
        SearchValue(datetime.format(DATE_FORMAT).to_string())
    }
}

// The date is taken in the value's own timezone.
impl<Tz: TimeZone> From<DateTime<Tz>> for SearchValue
where
    Tz::Offset: fmt::Display,
{
    fn from(datetime: DateTime<Tz>) -> Self {
        SearchValue(datetime.format(DATE_FORMAT).to_string())
    }
}

macro_rules! search_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SearchValue {
                fn from(value: $t) -> Self {
                    SearchValue(value.to_string())
                }
            }
        )*
    };
}

search_value_from_int!(i32, i64, u32, u64, usize);

/// One search term: a keyword and an optional value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    key: String,
    value: Option<String>,
}

impl Statement {
    pub fn new(key: impl Into<String>, value: Option<SearchValue>) -> Self {
        Self {
            key: key.into(),
            value: value.map(SearchValue::into_string),
        }
    }

    /// Statement made of a keyword alone
    pub fn key_only(key: impl Into<String>) -> Self {
        Self::new(key, None)
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<SearchValue>) -> Self {
        Self::new(key, Some(value.into()))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {:?}", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}
