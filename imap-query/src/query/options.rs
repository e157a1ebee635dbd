//! Execution options of a query

/// How matched messages are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Left to the executor's configured default
    #[default]
    Default,
    /// Mark messages as read while fetching them
    MarkAsRead,
    /// Fetch messages without changing their read flag
    LeavePeek,
}

/// Options applied when a query is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub fetch_mode: FetchMode,
    /// Character set used by the server for string matching, `None` for its default
    pub charset: Option<String>,
    pub fetch_body: bool,
    pub fetch_attachments: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            fetch_mode: FetchMode::Default,
            charset: None,
            fetch_body: true,
            fetch_attachments: true,
        }
    }
}
