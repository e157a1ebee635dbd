//! imap-query: fluent message search queries
//!
//! Build IMAP-style search criteria with a chainable API and hand them to a
//! search target that runs them and fetches the matching messages.
//!
//! # Features
//!
//! - **Query builder**: one method per search key, executed as a conjunction
//! - **Server-ready terms**: dates are formatted as soon as they are added
//! - **Fetch options**: peek or mark-as-read, charset, body and attachment toggles
//! - **Maildir target**: run the same queries against a local Maildir folder
//!
//! # Example
//!
//! ```no_run
//! use imap_query::config::Config;
//! use imap_query::maildir::MaildirFolder;
//! use imap_query::query::QueryBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let inbox = MaildirFolder::open(
//!         &config.maildir.root,
//!         "john@example.com",
//!         "INBOX",
//!         config.options.fetch,
//!     );
//!
//!     let messages = QueryBuilder::in_mailbox(&inbox)
//!         .unseen()
//!         .subject("invoice")
//!         .mark_as_read()
//!         .get()?;
//!
//!     for msg in messages {
//!         println!("{} {:?}", msg.sequence, msg.subject);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`query`]: Statements, options and the query builder
//! - [`executor`]: The search execution boundary
//! - [`message`]: Fetched message type
//! - [`maildir`]: Maildir folder search target
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling

pub mod config;
pub mod error;
pub mod executor;
pub mod maildir;
pub mod message;
pub mod query;

// Re-export commonly used types
pub use config::Config;
pub use error::{MailError, Result};
pub use executor::SearchExecutor;
pub use message::Message;
pub use query::{FetchMode, QueryBuilder, Statement};
