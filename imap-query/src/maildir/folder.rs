//! Maildir folder search target
//!
//! Handles reading messages from one Maildir folder and running searches
//! against them.

use super::criteria::{self, Candidate, HeaderValues};
use crate::config::DefaultFetch;
use crate::error::{MailError, Result};
use crate::executor::SearchExecutor;
use crate::message::{Attachment, Message, FLAG_SEEN};
use crate::query::{FetchMode, Statement};
use chrono::NaiveDate;
use mail_parser::{MessageParser, MimeHeaders};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Keyword names for the lowercase flag letters, as kept by Dovecot
const KEYWORDS_FILE: &str = "dovecot-keywords";

/// Message file loaded from new/ or cur/
#[derive(Debug, Clone)]
struct StoredMessage {
    sequence: usize,
    path: PathBuf,
    file_name: String,
    /// Still in new/
    recent: bool,
    flags: Vec<String>,
    content: Vec<u8>,
}

/// One Maildir folder used as a search target
pub struct MaildirFolder {
    /// Folder name (e.g., "INBOX")
    pub name: String,
    path: PathBuf,
    /// Applied when a query leaves the fetch mode unset
    fetch_default: DefaultFetch,
}

impl MaildirFolder {
    /// Bind a folder for a given user
    ///
    /// # Arguments
    /// * `maildir_root` - Root directory holding one maildir per user
    /// * `user` - Mailbox owner (e.g., "john@example.com")
    /// * `name` - Folder name (e.g., "INBOX", "Sent", "Archive")
    /// * `fetch_default` - How `FetchMode::Default` is resolved
    ///
    /// Nothing is read until a search runs.
    pub fn open(
        maildir_root: impl AsRef<Path>,
        user: &str,
        name: &str,
        fetch_default: DefaultFetch,
    ) -> Self {
        let maildir_path = maildir_root.as_ref().join(user);

        // INBOX -> <user>/{new,cur}, others -> <user>/.Name/{new,cur}
        let path = if name.eq_ignore_ascii_case("INBOX") {
            maildir_path
        } else {
            maildir_path.join(format!(".{}", name))
        };

        Self {
            name: name.to_string(),
            path,
            fetch_default,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all messages, new/ first, each directory in file name order
    fn load_messages(&self) -> Result<Vec<StoredMessage>> {
        if !self.path.is_dir() {
            return Err(MailError::ConnectionFailed(format!(
                "Mailbox '{}' not found at {}",
                self.name,
                self.path.display()
            )));
        }

        let keywords = self.load_keywords();
        let mut messages = Vec::new();

        for (dir, recent) in [("new", true), ("cur", false)] {
            let dir_path = self.path.join(dir);
            if !dir_path.is_dir() {
                continue;
            }

            let mut entries: Vec<_> = fs::read_dir(&dir_path)?
                .flatten()
                .filter(|e| e.path().is_file())
                .collect();
            entries.sort_by_key(|e| e.file_name());

            for entry in entries {
                let path = entry.path();
                let file_name = entry.file_name().to_string_lossy().to_string();

                let content = match fs::read(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Skipping unreadable message {}: {}", path.display(), e);
                        continue;
                    }
                };

                let flags = if recent {
                    Vec::new()
                } else {
                    parse_maildir_flags(&file_name, &keywords)
                };

                messages.push(StoredMessage {
                    sequence: messages.len() + 1,
                    path,
                    file_name,
                    recent,
                    flags,
                    content,
                });
            }
        }

        info!(
            "Loaded {} message(s) from folder {}",
            messages.len(),
            self.name
        );

        Ok(messages)
    }

    /// Read keyword names indexed by flag letter (0 = 'a')
    fn load_keywords(&self) -> Vec<String> {
        let Ok(content) = fs::read_to_string(self.path.join(KEYWORDS_FILE)) else {
            return Vec::new();
        };

        let mut keywords = vec![String::new(); 26];
        for line in content.lines() {
            if let Some((index, name)) = line.split_once(' ') {
                if let Ok(index) = index.trim().parse::<usize>() {
                    if index < keywords.len() {
                        keywords[index] = name.trim().to_string();
                    }
                }
            }
        }
        keywords
    }

    fn resolve_fetch_mode(&self, fetch_mode: FetchMode) -> FetchMode {
        match (fetch_mode, self.fetch_default) {
            (FetchMode::Default, DefaultFetch::MarkAsRead) => FetchMode::MarkAsRead,
            (FetchMode::Default, DefaultFetch::Peek) => FetchMode::LeavePeek,
            (mode, _) => mode,
        }
    }

    /// Add \Seen to every fetched message, moving each file to cur/
    ///
    /// Either all renames happen or, on the first failure, the ones already
    /// done are moved back.
    fn mark_seen(&self, fetched: &mut [(StoredMessage, Message)]) -> Result<()> {
        let cur_dir = self.path.join("cur");
        let mut renamed: Vec<(PathBuf, PathBuf)> = Vec::new();

        for (stored, _) in fetched.iter() {
            if stored.flags.iter().any(|f| f == FLAG_SEEN) {
                continue;
            }

            let new_path = cur_dir.join(with_flag_letter(&stored.file_name, 'S'));
            let moved = fs::create_dir_all(&cur_dir)
                .and_then(|_| fs::rename(&stored.path, &new_path));

            if let Err(e) = moved {
                for (old_path, new_path) in renamed.iter().rev() {
                    if let Err(e) = fs::rename(new_path, old_path) {
                        warn!(
                            "Cannot restore {} after failed fetch: {}",
                            old_path.display(),
                            e
                        );
                    }
                }
                return Err(MailError::GetMessagesFailed(format!(
                    "Cannot mark {} as read: {}",
                    stored.file_name, e
                )));
            }

            renamed.push((stored.path.clone(), new_path));
        }

        for (stored, message) in fetched.iter_mut() {
            if !stored.flags.iter().any(|f| f == FLAG_SEEN) {
                stored.flags.push(FLAG_SEEN.to_string());
                message.flags.push(FLAG_SEEN.to_string());
                debug!("Marked {} as read", stored.file_name);
            }
        }

        Ok(())
    }
}

impl SearchExecutor for MaildirFolder {
    fn search_messages(
        &self,
        statements: Vec<Statement>,
        fetch_mode: FetchMode,
        fetch_body: bool,
        charset: Option<String>,
        fetch_attachments: bool,
    ) -> Result<Vec<Message>> {
        criteria::validate_charset(charset.as_deref())?;
        let criteria = criteria::compile(&statements)?;

        debug!(
            "Searching folder {} with criteria: {:?}",
            self.name, criteria
        );

        let messages = self.load_messages()?;
        let parser = MessageParser::default();
        let mut fetched = Vec::new();

        for msg in messages {
            let message = {
                let Some(parsed) = parser.parse(&msg.content) else {
                    warn!("Skipping unparseable message {}", msg.path.display());
                    continue;
                };

                let raw = String::from_utf8_lossy(&msg.content);
                let headers = HeaderValues::from_parsed(&parsed);
                let body = parsed
                    .body_text(0)
                    .map(|b| b.to_string())
                    .unwrap_or_default();

                let candidate = Candidate {
                    flags: &msg.flags,
                    recent: msg.recent,
                    headers: &headers,
                    body: &body,
                    raw: &raw,
                    date: message_date(&parsed),
                };

                if !criteria.iter().all(|c| c.matches(&candidate)) {
                    continue;
                }

                debug!("Message {} matches", msg.sequence);
                to_message(&parsed, &msg, fetch_body, fetch_attachments)
            };
            fetched.push((msg, message));
        }

        // Flags change only once every matched message has been built
        if self.resolve_fetch_mode(fetch_mode) == FetchMode::MarkAsRead {
            self.mark_seen(&mut fetched)?;
        }

        let results: Vec<Message> = fetched.into_iter().map(|(_, message)| message).collect();

        info!(
            "Search in {} matched {} message(s)",
            self.name,
            results.len()
        );

        Ok(results)
    }
}

/// Parse Maildir flags from filename
/// Maildir format: unique:2,FLAGS where FLAGS can be:
/// - D (Draft)
/// - F (Flagged)
/// - R (Replied)
/// - S (Seen)
/// - T (Trashed/Deleted)
/// - a-z (keywords listed in dovecot-keywords)
fn parse_maildir_flags(filename: &str, keywords: &[String]) -> Vec<String> {
    let mut flags = Vec::new();

    if let Some(flags_part) = filename.split(":2,").nth(1) {
        for c in flags_part.chars() {
            match c {
                'D' => flags.push("\\Draft".to_string()),
                'F' => flags.push("\\Flagged".to_string()),
                'R' => flags.push("\\Answered".to_string()),
                'S' => flags.push(FLAG_SEEN.to_string()),
                'T' => flags.push("\\Deleted".to_string()),
                'a'..='z' => {
                    let index = (c as u8 - b'a') as usize;
                    if let Some(name) = keywords.get(index).filter(|n| !n.is_empty()) {
                        flags.push(name.clone());
                    }
                }
                _ => {}
            }
        }
    }

    flags
}

/// File name with `letter` added to the info suffix, letters kept sorted
fn with_flag_letter(filename: &str, letter: char) -> String {
    let (base, flags_part) = match filename.split_once(":2,") {
        Some((base, flags)) => (base, flags),
        None => (filename, ""),
    };

    let mut letters: Vec<char> = flags_part.chars().collect();
    if !letters.contains(&letter) {
        letters.push(letter);
    }
    letters.sort_unstable();

    let mut name = format!("{}:2,", base);
    name.extend(letters);
    name
}

fn message_date(parsed: &mail_parser::Message<'_>) -> Option<NaiveDate> {
    parsed
        .date()
        .and_then(|d| NaiveDate::from_ymd_opt(d.year as i32, d.month as u32, d.day as u32))
}

/// Build the fetched message, honouring the body and attachment toggles
fn to_message(
    parsed: &mail_parser::Message<'_>,
    msg: &StoredMessage,
    fetch_body: bool,
    fetch_attachments: bool,
) -> Message {
    let uid = msg
        .file_name
        .split(":2,")
        .next()
        .unwrap_or(&msg.file_name)
        .to_string();

    let body = if fetch_body {
        parsed.body_text(0).map(|b| b.to_string())
    } else {
        None
    };

    let attachments = if fetch_attachments {
        parsed
            .attachments()
            .map(|part| Attachment {
                filename: part.attachment_name().map(|n| n.to_string()),
                content_type: part.content_type().map(|ct| match ct.subtype() {
                    Some(subtype) => format!("{}/{}", ct.ctype(), subtype),
                    None => ct.ctype().to_string(),
                }),
                data: part.contents().to_vec(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Message {
        sequence: msg.sequence,
        uid,
        flags: msg.flags.clone(),
        size: msg.content.len(),
        subject: parsed.subject().map(|s| s.to_string()),
        from: parsed
            .from()
            .and_then(|f| f.first())
            .and_then(|a| a.address())
            .map(|s| s.to_string()),
        to: parsed
            .to()
            .and_then(|t| t.first())
            .and_then(|a| a.address())
            .map(|s| s.to_string()),
        date: message_date(parsed),
        body,
        attachments,
    }
}
