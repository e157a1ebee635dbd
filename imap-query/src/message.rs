//! Fetched message representation
//!
//! Every [`SearchExecutor`](crate::executor::SearchExecutor) returns its
//! matches as a list of [`Message`] values, in mailbox order.

use chrono::NaiveDate;

pub const FLAG_SEEN: &str = "\\Seen";
pub const FLAG_ANSWERED: &str = "\\Answered";
pub const FLAG_FLAGGED: &str = "\\Flagged";
pub const FLAG_DELETED: &str = "\\Deleted";
pub const FLAG_DRAFT: &str = "\\Draft";

/// A message returned by a search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    /// Sequence number (1-indexed)
    pub sequence: usize,
    /// Unique ID
    pub uid: String,
    /// Message flags after the fetch (e.g., \Seen, \Flagged)
    pub flags: Vec<String>,
    /// Raw message size in bytes
    pub size: usize,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Calendar date of the Date: header
    pub date: Option<NaiveDate>,
    /// Text body, only present when the body was requested
    pub body: Option<String>,
    /// Attachments, only populated when attachments were requested
    pub attachments: Vec<Attachment>,
}

/// An attachment of a fetched message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Message {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    pub fn is_seen(&self) -> bool {
        self.has_flag(FLAG_SEEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_lookup_ignores_case() {
        let msg = Message {
            flags: vec!["\\SEEN".to_string(), "$Work".to_string()],
            ..Default::default()
        };

        assert!(msg.is_seen());
        assert!(msg.has_flag("$work"));
        assert!(!msg.has_flag(FLAG_FLAGGED));
    }
}
