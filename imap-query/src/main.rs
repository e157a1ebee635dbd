//! CLI tool for searching a Maildir folder
//!
//! # Usage
//!
//! ```bash
//! # Unread mail from alice since April 8th, without touching the \Seen flag
//! imap-query --user john@example.com --unseen --from alice --since 2018-04-08 --leave-unread
//!
//! # Flagged messages in the Archive folder, headers only
//! imap-query --user john@example.com --folder Archive --flagged --no-body --no-attachments
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use imap_query::config::{Config, LoggingConfig};
use imap_query::maildir::MaildirFolder;
use imap_query::query::QueryBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imap-query")]
#[command(about = "Search messages in a Maildir folder", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Maildir root, overrides the configuration
    #[arg(long)]
    root: Option<String>,

    /// Mailbox owner (e.g., john@example.com)
    #[arg(short, long)]
    user: String,

    /// Folder to search
    #[arg(short, long, default_value = "INBOX")]
    folder: String,

    #[arg(long)]
    all: bool,
    #[arg(long)]
    answered: bool,
    #[arg(long)]
    unanswered: bool,
    #[arg(long)]
    deleted: bool,
    #[arg(long)]
    undeleted: bool,
    #[arg(long)]
    flagged: bool,
    #[arg(long)]
    unflagged: bool,
    #[arg(long)]
    new: bool,
    #[arg(long)]
    old: bool,
    #[arg(long)]
    recent: bool,
    #[arg(long)]
    seen: bool,
    #[arg(long)]
    unseen: bool,

    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    cc: Option<String>,
    #[arg(long)]
    bcc: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    body: Option<String>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long)]
    unkeyword: Option<String>,

    /// Messages dated before this day (YYYY-MM-DD)
    #[arg(long)]
    before: Option<NaiveDate>,
    /// Messages dated on this day (YYYY-MM-DD)
    #[arg(long)]
    on: Option<NaiveDate>,
    /// Messages dated on or after this day (YYYY-MM-DD)
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Character set for string matching
    #[arg(long)]
    charset: Option<String>,

    /// Mark matched messages as read
    #[arg(long, conflicts_with = "leave_unread")]
    mark_as_read: bool,
    /// Keep matched messages unread
    #[arg(long)]
    leave_unread: bool,

    /// Do not fetch message bodies
    #[arg(long)]
    no_body: bool,
    /// Do not fetch attachments
    #[arg(long)]
    no_attachments: bool,
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None if std::path::Path::new("config.toml").exists() => Config::from_file("config.toml")?,
        None => Config::default(),
    };
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    let root = cli.root.clone().unwrap_or_else(|| config.maildir.root.clone());
    info!("Searching {} for {} under {}", cli.folder, cli.user, root);

    let folder = MaildirFolder::open(&root, &cli.user, &cli.folder, config.options.fetch);
    let mut query = QueryBuilder::in_mailbox(&folder)
        .fetch_body(config.options.fetch_body && !cli.no_body)
        .fetch_attachments(config.options.fetch_attachments && !cli.no_attachments);

    let flags = [
        (cli.all, "ALL"),
        (cli.answered, "ANSWERED"),
        (cli.unanswered, "UNANSWERED"),
        (cli.deleted, "DELETED"),
        (cli.undeleted, "UNDELETED"),
        (cli.flagged, "FLAGGED"),
        (cli.unflagged, "UNFLAGGED"),
        (cli.new, "NEW"),
        (cli.old, "OLD"),
        (cli.recent, "RECENT"),
        (cli.seen, "SEEN"),
        (cli.unseen, "UNSEEN"),
    ];
    for (set, key) in flags {
        if set {
            query = query.add_statement(key, None);
        }
    }

    if let Some(v) = &cli.from {
        query = query.from(v);
    }
    if let Some(v) = &cli.to {
        query = query.to(v);
    }
    if let Some(v) = &cli.cc {
        query = query.cc(v);
    }
    if let Some(v) = &cli.bcc {
        query = query.bcc(v);
    }
    if let Some(v) = &cli.subject {
        query = query.subject(v);
    }
    if let Some(v) = &cli.body {
        query = query.body(v);
    }
    if let Some(v) = &cli.text {
        query = query.text(v);
    }
    if let Some(v) = &cli.keyword {
        query = query.contains_keyword(v);
    }
    if let Some(v) = &cli.unkeyword {
        query = query.does_not_contain_keyword(v);
    }
    if let Some(date) = cli.before {
        query = query.before(date);
    }
    if let Some(date) = cli.on {
        query = query.on(date);
    }
    if let Some(date) = cli.since {
        query = query.since(date);
    }

    if let Some(charset) = cli.charset.clone().or_else(|| config.options.charset.clone()) {
        query = query.charset(charset);
    }
    if cli.mark_as_read {
        query = query.mark_as_read();
    } else if cli.leave_unread {
        query = query.leave_unread();
    }

    if query.statements().is_empty() {
        query = query.all();
    }

    let messages = query.get()?;

    for msg in &messages {
        println!(
            "{:>5} {:<24} {:<10} {:<30} {}",
            msg.sequence,
            msg.flags.join(" "),
            msg.date.map(|d| d.to_string()).unwrap_or_default(),
            msg.from.as_deref().unwrap_or(""),
            msg.subject.as_deref().unwrap_or("")
        );
    }
    println!("\nTotal: {} message(s)", messages.len());

    Ok(())
}
