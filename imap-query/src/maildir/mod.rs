//! Maildir-backed search target
//!
//! [`MaildirFolder`] runs queries against a local Maildir folder, applying
//! the same statement vocabulary a remote server would.

pub mod criteria;
pub mod folder;

pub use criteria::Criterion;
pub use folder::MaildirFolder;
