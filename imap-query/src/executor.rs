//! Search execution boundary
//!
//! A [`SearchExecutor`] owns everything the query builder does not: the
//! connection to the mailbox, the translation of statements into the
//! protocol's search syntax, and the fetch of the matched messages.

use crate::error::Result;
use crate::message::Message;
use crate::query::{FetchMode, Statement};

/// Runs a search against one mailbox and fetches the matches
///
/// Implementations receive the statements in the order they were added and
/// combine them as a conjunction. `FetchMode::Default` is resolved by the
/// implementation from its own configuration. Connection, validation and
/// fetch failures are reported through [`MailError`](crate::error::MailError)
/// and reach the caller of [`QueryBuilder::get`](crate::query::QueryBuilder::get)
/// untouched.
#[cfg_attr(test, mockall::automock)]
pub trait SearchExecutor {
    fn search_messages(
        &self,
        statements: Vec<Statement>,
        fetch_mode: FetchMode,
        fetch_body: bool,
        charset: Option<String>,
        fetch_attachments: bool,
    ) -> Result<Vec<Message>>;
}
