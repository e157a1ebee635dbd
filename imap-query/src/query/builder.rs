//! Fluent search query builder
//!
//! Each predicate method appends one statement and hands the builder back,
//! so a query reads as a chain:
//!
//! ```no_run
//! use imap_query::maildir::MaildirFolder;
//! use imap_query::config::DefaultFetch;
//! use imap_query::query::QueryBuilder;
//! use chrono::NaiveDate;
//!
//! # fn main() -> imap_query::Result<()> {
//! let inbox = MaildirFolder::open("/var/mail", "john@example.com", "INBOX", DefaultFetch::Peek);
//! let messages = QueryBuilder::in_mailbox(&inbox)
//!     .unseen()
//!     .from("alice@example.com")
//!     .since(NaiveDate::from_ymd_opt(2018, 4, 8).unwrap())
//!     .leave_unread()
//!     .get()?;
//! # Ok(())
//! # }
//! ```
//!
//! A builder is meant to be driven by a single owner. It only borrows its
//! target, so several builders may run against the same mailbox; ordering
//! between them is up to the executor.

use super::options::{ExecutionOptions, FetchMode};
use super::statement::{SearchKey, SearchValue, Statement};
use crate::error::Result;
use crate::executor::SearchExecutor;
use crate::message::Message;
use tracing::debug;

/// Accumulates search statements and execution options for one mailbox
pub struct QueryBuilder<'a, E: SearchExecutor + ?Sized> {
    /// Mailbox the search runs against, only touched by `get`
    target: &'a E,
    statements: Vec<Statement>,
    options: ExecutionOptions,
}

impl<'a, E: SearchExecutor + ?Sized> QueryBuilder<'a, E> {
    /// Start an empty query against `target`
    pub fn in_mailbox(target: &'a E) -> Self {
        Self {
            target,
            statements: Vec::new(),
            options: ExecutionOptions::default(),
        }
    }

    /// Statements added so far, in order
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.options.fetch_mode
    }

    /// Append a statement with any keyword
    ///
    /// The keyword is not checked against the search vocabulary; the named
    /// predicate methods are the checked surface. Date values arrive here
    /// already formatted through their [`SearchValue`] conversion.
    pub fn add_statement(mut self, key: impl Into<String>, value: Option<SearchValue>) -> Self {
        self.statements.push(Statement::new(key, value));
        self
    }

    fn flag(self, key: SearchKey) -> Self {
        self.add_statement(key.as_str(), None)
    }

    fn keyed(self, key: SearchKey, value: impl Into<SearchValue>) -> Self {
        self.add_statement(key.as_str(), Some(value.into()))
    }

    /// Match all messages
    pub fn all(self) -> Self {
        self.flag(SearchKey::All)
    }

    /// Match messages with the \Answered flag set
    pub fn answered(self) -> Self {
        self.flag(SearchKey::Answered)
    }

    /// Match messages that have not been answered
    pub fn unanswered(self) -> Self {
        self.flag(SearchKey::Unanswered)
    }

    /// Match messages with `expression` in the Bcc: field
    pub fn bcc(self, expression: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Bcc, expression)
    }

    /// Match messages dated before `date` (a chrono date or a preformatted string)
    pub fn before(self, date: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Before, date)
    }

    /// Match messages with `expression` in the body
    pub fn body(self, expression: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Body, expression)
    }

    /// Match messages with `expression` in the Cc: field
    pub fn cc(self, expression: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Cc, expression)
    }

    pub fn deleted(self) -> Self {
        self.flag(SearchKey::Deleted)
    }

    pub fn undeleted(self) -> Self {
        self.flag(SearchKey::Undeleted)
    }

    /// Match messages with the \Flagged (important) flag set
    pub fn flagged(self) -> Self {
        self.flag(SearchKey::Flagged)
    }

    pub fn unflagged(self) -> Self {
        self.flag(SearchKey::Unflagged)
    }

    /// Match messages with `expression` in the From: field
    pub fn from(self, expression: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::From, expression)
    }

    /// Match messages carrying `keyword`
    pub fn contains_keyword(self, keyword: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Keyword, keyword)
    }

    /// Match messages not carrying `keyword`
    pub fn does_not_contain_keyword(self, keyword: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Unkeyword, keyword)
    }

    /// Match recent messages that have not been seen
    pub fn new(self) -> Self {
        self.flag(SearchKey::New)
    }

    /// Match messages that are not recent
    pub fn old(self) -> Self {
        self.flag(SearchKey::Old)
    }

    /// Match messages dated on `date`
    pub fn on(self, date: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::On, date)
    }

    pub fn recent(self) -> Self {
        self.flag(SearchKey::Recent)
    }

    /// Match messages that have been read (\Seen set)
    pub fn seen(self) -> Self {
        self.flag(SearchKey::Seen)
    }

    /// Alias for [`seen`](Self::seen)
    pub fn read(self) -> Self {
        self.seen()
    }

    /// Match messages that have not been read yet
    pub fn unseen(self) -> Self {
        self.flag(SearchKey::Unseen)
    }

    /// Alias for [`unseen`](Self::unseen)
    pub fn unread(self) -> Self {
        self.unseen()
    }

    /// Match messages dated on or after `date`
    pub fn since(self, date: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Since, date)
    }

    pub fn subject(self, expression: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Subject, expression)
    }

    /// Match messages containing `text` in headers or body
    pub fn text(self, text: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::Text, text)
    }

    pub fn to(self, expression: impl Into<SearchValue>) -> Self {
        self.keyed(SearchKey::To, expression)
    }

    /// Mark messages as read when fetching them
    pub fn mark_as_read(mut self) -> Self {
        self.options.fetch_mode = FetchMode::MarkAsRead;
        self
    }

    /// Fetch messages without marking them as read
    pub fn leave_unread(mut self) -> Self {
        self.options.fetch_mode = FetchMode::LeavePeek;
        self
    }

    /// Character set the server uses when matching strings
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.options.charset = Some(charset.into());
        self
    }

    pub fn fetch_body(mut self, fetch: bool) -> Self {
        self.options.fetch_body = fetch;
        self
    }

    pub fn fetch_attachments(mut self, fetch: bool) -> Self {
        self.options.fetch_attachments = fetch;
        self
    }

    /// Run the search and return the messages found
    ///
    /// The executor's result is returned as is, errors included. Calling
    /// `get` again runs the same search again.
    pub fn get(&self) -> Result<Vec<Message>> {
        debug!(
            "Executing search with {} statement(s), fetch mode {:?}",
            self.statements.len(),
            self.options.fetch_mode
        );

        self.target.search_messages(
            self.statements.clone(),
            self.options.fetch_mode,
            self.options.fetch_body,
            self.options.charset.clone(),
            self.options.fetch_attachments,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MailError;
    use crate::executor::MockSearchExecutor;
    use chrono::NaiveDate;

    fn april_8() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 4, 8).unwrap()
    }

    fn flag(key: &str) -> Vec<Statement> {
        vec![Statement::key_only(key)]
    }

    fn keyed(key: &str, value: &str) -> Vec<Statement> {
        vec![Statement::with_value(key, value)]
    }

    #[test]
    fn test_add_statement_with_key_and_value() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target).add_statement("key", Some("value".into()));

        assert_eq!(query.statements(), keyed("key", "value"));
    }

    #[test]
    fn test_add_statement_with_date() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target).add_statement("key", Some(april_8().into()));

        assert_eq!(query.statements(), keyed("key", "08 Apr 18"));
    }

    #[test]
    fn test_add_statement_with_key_only() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target).add_statement("key", None);

        assert_eq!(query.statements(), flag("key"));
        assert_eq!(query.statements()[0].value(), None);
    }

    #[test]
    fn test_add_two_statements_keeps_order() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target)
            .add_statement("foo", Some("bar".into()))
            .add_statement("baz", None);

        assert_eq!(
            query.statements(),
            vec![
                Statement::with_value("foo", "bar"),
                Statement::key_only("baz")
            ]
        );
    }

    #[test]
    fn test_unknown_keys_are_accepted() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target)
            .add_statement("X-GM-RAW", Some("has:attachment".into()));

        assert_eq!(query.statements(), keyed("X-GM-RAW", "has:attachment"));
    }

    #[test]
    fn test_flag_predicates() {
        let target = MockSearchExecutor::new();
        let q = || QueryBuilder::in_mailbox(&target);

        assert_eq!(q().all().statements(), flag("ALL"));
        assert_eq!(q().answered().statements(), flag("ANSWERED"));
        assert_eq!(q().unanswered().statements(), flag("UNANSWERED"));
        assert_eq!(q().deleted().statements(), flag("DELETED"));
        assert_eq!(q().undeleted().statements(), flag("UNDELETED"));
        assert_eq!(q().flagged().statements(), flag("FLAGGED"));
        assert_eq!(q().unflagged().statements(), flag("UNFLAGGED"));
        assert_eq!(q().new().statements(), flag("NEW"));
        assert_eq!(q().old().statements(), flag("OLD"));
        assert_eq!(q().recent().statements(), flag("RECENT"));
        assert_eq!(q().seen().statements(), flag("SEEN"));
        assert_eq!(q().unseen().statements(), flag("UNSEEN"));
    }

    #[test]
    fn test_value_predicates() {
        let target = MockSearchExecutor::new();
        let q = || QueryBuilder::in_mailbox(&target);

        assert_eq!(q().from("john@example.com").statements(), keyed("FROM", "john@example.com"));
        assert_eq!(q().to("john@example.com").statements(), keyed("TO", "john@example.com"));
        assert_eq!(q().cc("john@example.com").statements(), keyed("CC", "john@example.com"));
        assert_eq!(q().bcc("john@example.com").statements(), keyed("BCC", "john@example.com"));
        assert_eq!(q().body("lorem ipsum").statements(), keyed("BODY", "lorem ipsum"));
        assert_eq!(q().subject("foo").statements(), keyed("SUBJECT", "foo"));
        assert_eq!(q().text("foo").statements(), keyed("TEXT", "foo"));
        assert_eq!(q().contains_keyword("foo").statements(), keyed("KEYWORD", "foo"));
        assert_eq!(q().does_not_contain_keyword("foo").statements(), keyed("UNKEYWORD", "foo"));
    }

    #[test]
    fn test_date_predicates() {
        let target = MockSearchExecutor::new();
        let q = || QueryBuilder::in_mailbox(&target);

        assert_eq!(q().before(april_8()).statements(), keyed("BEFORE", "08 Apr 18"));
        assert_eq!(q().on(april_8()).statements(), keyed("ON", "08 Apr 18"));
        assert_eq!(q().since(april_8()).statements(), keyed("SINCE", "08 Apr 18"));
        assert_eq!(q().since("01 Jan 20").statements(), keyed("SINCE", "01 Jan 20"));
    }

    #[test]
    fn test_aliases_match_canonical_methods() {
        let target = MockSearchExecutor::new();
        let q = || QueryBuilder::in_mailbox(&target);

        assert_eq!(q().read().statements(), q().seen().statements());
        assert_eq!(q().read().statements(), flag("SEEN"));
        assert_eq!(q().unread().statements(), q().unseen().statements());
        assert_eq!(q().unread().statements(), flag("UNSEEN"));
    }

    #[test]
    fn test_fetch_mode_defaults_to_configuration() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target);

        assert_eq!(query.fetch_mode(), FetchMode::Default);
        assert_eq!(query.options(), &ExecutionOptions::default());
        assert!(query.options().fetch_body);
        assert!(query.options().fetch_attachments);
    }

    #[test]
    fn test_fetch_mode_reflects_last_call() {
        let target = MockSearchExecutor::new();

        let query = QueryBuilder::in_mailbox(&target).mark_as_read();
        assert_eq!(query.fetch_mode(), FetchMode::MarkAsRead);

        let query = QueryBuilder::in_mailbox(&target).leave_unread();
        assert_eq!(query.fetch_mode(), FetchMode::LeavePeek);

        let query = QueryBuilder::in_mailbox(&target).leave_unread().mark_as_read();
        assert_eq!(query.fetch_mode(), FetchMode::MarkAsRead);
    }

    #[test]
    fn test_setting_charset() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target).charset("UTF-8");

        assert_eq!(query.options().charset.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_options_do_not_add_statements() {
        let target = MockSearchExecutor::new();
        let query = QueryBuilder::in_mailbox(&target)
            .charset("UTF-8")
            .mark_as_read()
            .fetch_body(false)
            .fetch_attachments(false);

        assert!(query.statements().is_empty());
        assert!(!query.options().fetch_body);
        assert!(!query.options().fetch_attachments);
    }

    #[test]
    fn test_get_forwards_state_and_result() {
        let mut target = MockSearchExecutor::new();
        target
            .expect_search_messages()
            .withf(|statements, fetch_mode, fetch_body, charset, fetch_attachments| {
                *statements
                    == vec![
                        Statement::key_only("UNSEEN"),
                        Statement::with_value("FROM", "john@example.com"),
                        Statement::with_value("SINCE", "08 Apr 18"),
                    ]
                    && *fetch_mode == FetchMode::LeavePeek
                    && *fetch_body
                    && charset.as_deref() == Some("UTF-8")
                    && !*fetch_attachments
            })
            .times(1)
            .returning(|_, _, _, _, _| {
                Ok(vec![Message {
                    sequence: 3,
                    uid: "1523174400.M1.host".to_string(),
                    subject: Some("Hello".to_string()),
                    ..Default::default()
                }])
            });

        let messages = QueryBuilder::in_mailbox(&target)
            .unseen()
            .from("john@example.com")
            .since(april_8())
            .leave_unread()
            .charset("UTF-8")
            .fetch_attachments(false)
            .get()
            .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sequence, 3);
        assert_eq!(messages[0].subject.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_get_passes_default_options() {
        let mut target = MockSearchExecutor::new();
        target
            .expect_search_messages()
            .withf(|statements, fetch_mode, fetch_body, charset, fetch_attachments| {
                statements.is_empty()
                    && *fetch_mode == FetchMode::Default
                    && *fetch_body
                    && charset.is_none()
                    && *fetch_attachments
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok(Vec::new()));

        let messages = QueryBuilder::in_mailbox(&target).get().unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_get_propagates_errors_unchanged() {
        let mut target = MockSearchExecutor::new();
        target
            .expect_search_messages()
            .times(1)
            .returning(|_, _, _, _, _| {
                Err(MailError::SearchValidation("Unknown search key: FOO".to_string()))
            });

        let result = QueryBuilder::in_mailbox(&target).add_statement("FOO", None).get();

        match result {
            Err(MailError::SearchValidation(msg)) => assert_eq!(msg, "Unknown search key: FOO"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_get_can_run_twice() {
        let mut target = MockSearchExecutor::new();
        target
            .expect_search_messages()
            .times(2)
            .returning(|_, _, _, _, _| Ok(Vec::new()));

        let query = QueryBuilder::in_mailbox(&target).all();
        query.get().unwrap();
        query.get().unwrap();

        assert_eq!(query.statements(), flag("ALL"));
    }

    #[test]
    fn test_works_with_trait_objects() {
        let mut target = MockSearchExecutor::new();
        target
            .expect_search_messages()
            .times(1)
            .returning(|_, _, _, _, _| Ok(Vec::new()));

        let target: &dyn SearchExecutor = &target;
        assert!(QueryBuilder::in_mailbox(target).recent().get().unwrap().is_empty());
    }
}
