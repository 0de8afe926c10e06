//! Append-only, human-readable conversation transcript.
//!
//! Each chat turn is written as a block:
//!
//! ```text
//!
//! [2024-11-01T10:00:00.000Z]
//! User: how do I sleep better?
//! Bot: Here are a few ideas...
//! ----------------------------------------
//! ```
//!
//! Lines after the first line of a message are written indented by
//! [`CONTINUATION_INDENT`], so message text can never be read back as a
//! header, a `User:`/`Bot:` line or the delimiter.
//!
//! There is no locking between writers and readers. A read racing an append
//! can see a half-written block; the parser tolerates that.

use crate::error::AppError;
use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

pub const DELIMITER: &str = "----------------------------------------";
pub const CONTINUATION_INDENT: &str = "  ";

lazy_static! {
    static ref HEADER_RE: Regex = Regex::new(r"^\[([^\]]+)\]$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Turn {
        timestamp: Option<DateTime<Utc>>,
        user: String,
        bot: String,
    },
    /// A non-blank line that is not part of any block.
    FreeText(String),
}

impl LogEntry {
    /// The text fed to the sentiment scorer: what the user said, or the
    /// reply when the user line is missing.
    pub fn scored_text(&self) -> &str {
        match self {
            LogEntry::Turn { user, bot, .. } => {
                if user.trim().is_empty() {
                    bot
                } else {
                    user
                }
            }
            LogEntry::FreeText(text) => text,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            LogEntry::Turn { timestamp, .. } => *timestamp,
            LogEntry::FreeText(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversationLog {
    path: PathBuf,
}

impl ConversationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, user_message: &str, bot_response: &str) -> std::io::Result<()> {
        let entry = format_entry(Utc::now(), user_message, bot_response);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await
    }

    /// Reads and parses the whole file.
    pub async fn read_entries(&self) -> Result<Vec<LogEntry>, AppError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!(path = %self.path.display(), "conversation log not found");
                return Err(AppError::NotFound(
                    "The conversation log file could not be located".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if data.trim().is_empty() {
            tracing::warn!(path = %self.path.display(), "conversation log is empty");
            return Err(AppError::EmptyInput("The conversation log file is empty".to_string()));
        }

        let entries = parse_entries(&data);
        if entries.is_empty() {
            return Err(AppError::EmptyInput(
                "The conversation log file contains no conversation".to_string(),
            ));
        }

        Ok(entries)
    }
}

pub fn format_entry(timestamp: DateTime<Utc>, user_message: &str, bot_response: &str) -> String {
    format!(
        "\n[{}]\nUser: {}\nBot: {}\n{}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        indent_continuations(user_message),
        indent_continuations(bot_response),
        DELIMITER
    )
}

fn indent_continuations(text: &str) -> String {
    text.replace('\n', &format!("\n{}", CONTINUATION_INDENT))
}

#[derive(Default)]
struct PendingTurn {
    timestamp: Option<DateTime<Utc>>,
    user: Option<String>,
    bot: Option<String>,
}

impl PendingTurn {
    fn push_continuation(&mut self, line: &str) {
        let target = if self.bot.is_some() { &mut self.bot } else { &mut self.user };
        let text = target.get_or_insert_with(String::new);
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(line);
    }

    fn finish(self) -> Option<LogEntry> {
        if self.user.is_none() && self.bot.is_none() {
            return None;
        }
        Some(LogEntry::Turn {
            timestamp: self.timestamp,
            user: self.user.unwrap_or_default(),
            bot: self.bot.unwrap_or_default(),
        })
    }
}

pub fn parse_entries(data: &str) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<PendingTurn> = None;

    for raw in data.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Indented lines are always message text, never structure.
        if line.starts_with(char::is_whitespace) {
            match pending.as_mut() {
                Some(turn) => {
                    turn.push_continuation(line.strip_prefix(CONTINUATION_INDENT).unwrap_or(trimmed))
                }
                None => entries.push(LogEntry::FreeText(trimmed.to_string())),
            }
        } else if let Some(caps) = HEADER_RE.captures(line) {
            entries.extend(pending.take().and_then(PendingTurn::finish));
            let timestamp = DateTime::parse_from_rfc3339(&caps[1])
                .ok()
                .map(|ts| ts.with_timezone(&Utc));
            pending = Some(PendingTurn { timestamp, ..Default::default() });
        } else if line == DELIMITER {
            entries.extend(pending.take().and_then(PendingTurn::finish));
        } else if let Some(text) = line.strip_prefix("User:") {
            let turn = pending.get_or_insert_with(PendingTurn::default);
            turn.user = Some(text.trim().to_string());
        } else if let Some(text) = line.strip_prefix("Bot:") {
            let turn = pending.get_or_insert_with(PendingTurn::default);
            turn.bot = Some(text.trim().to_string());
        } else if let Some(turn) = pending.as_mut() {
            turn.push_continuation(line);
        } else {
            entries.push(LogEntry::FreeText(trimmed.to_string()));
        }
    }

    // A trailing block without its delimiter (e.g. an append in progress).
    entries.extend(pending.take().and_then(PendingTurn::finish));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_entry_layout() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 1, 10, 0, 0).unwrap();
        let block = format_entry(ts, "hello", "hi there");
        assert_eq!(
            block,
            "\n[2024-11-01T10:00:00.000Z]\nUser: hello\nBot: hi there\n----------------------------------------\n"
        );
    }

    #[test]
    fn test_parse_blocks() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 1, 10, 0, 0).unwrap();
        let data = format!(
            "{}{}",
            format_entry(ts, "I feel sad", "I'm sorry to hear that"),
            format_entry(ts, "Now I am happy", "Great!")
        );
        let entries = parse_entries(&data);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].scored_text(), "Now I am happy");
        assert_eq!(entries[1].timestamp(), Some(ts));
    }

    #[test]
    fn test_parse_free_text_lines() {
        let entries = parse_entries("first thought\n\nsecond thought\n");
        assert_eq!(
            entries,
            vec![
                LogEntry::FreeText("first thought".to_string()),
                LogEntry::FreeText("second thought".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_messages_are_joined() {
        let data = format!(
            "[2024-11-01T10:00:00.000Z]\nUser: line one\nline two\nBot: reply\nmore reply\n---\n{}\n",
            DELIMITER
        );
        let entries = parse_entries(&data);
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            LogEntry::Turn { user, bot, .. } => {
                assert_eq!(user, "line one\nline two");
                assert_eq!(bot, "reply\nmore reply\n---");
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_partial_trailing_block_is_kept() {
        let data = "[2024-11-01T10:00:00.000Z]\nUser: still writing";
        let entries = parse_entries(data);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scored_text(), "still writing");
    }

    #[test]
    fn test_missing_user_line_scores_bot_text() {
        let entries = parse_entries(&format!("[bogus]\nBot: only the reply\n{}\n", DELIMITER));
        assert_eq!(entries[0].scored_text(), "only the reply");
        assert_eq!(entries[0].timestamp(), None);
    }

    #[test]
    fn test_delimiters_alone_yield_nothing() {
        assert!(parse_entries(&format!("{}\n\n{}\n", DELIMITER, DELIMITER)).is_empty());
    }

    #[test]
    fn test_structure_lookalikes_stay_inside_message() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 1, 10, 0, 0).unwrap();
        let reply = "Here are some ideas:\n---\n1. Breathe slowly\n2. Take a walk\n3. Call a friend";
        let data = format!(
            "{}{}",
            format_entry(ts, "I can't relax", reply),
            format_entry(ts, "I am very happy today", "Lovely.")
        );

        let entries = parse_entries(&data);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].scored_text(), "I am very happy today");
        match &entries[0] {
            LogEntry::Turn { bot, .. } => assert_eq!(bot, reply),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_header_and_role_prefixes_in_text() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 1, 10, 0, 0).unwrap();
        let user = "quoting my notes\n[2024-01-01T00:00:00.000Z]\nBot: fake\nUser: also fake";
        let bot = &format!("noted\n{}\nUser: still the bot", DELIMITER);
        let entries = parse_entries(&format_entry(ts, user, bot));

        assert_eq!(
            entries,
            vec![LogEntry::Turn {
                timestamp: Some(ts),
                user: user.to_string(),
                bot: bot.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_append_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path().join("conversation_log.txt"));

        log.append("first", "one").await.unwrap();
        log.append("second", "two").await.unwrap();

        let entries = log.read_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].scored_text(), "first");
        assert_eq!(entries[1].scored_text(), "second");
    }

    #[tokio::test]
    async fn test_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation_log.txt");
        let log = ConversationLog::new(&path);

        assert!(matches!(log.read_entries().await, Err(AppError::NotFound(_))));

        tokio::fs::write(&path, "\n   \n").await.unwrap();
        assert!(matches!(log.read_entries().await, Err(AppError::EmptyInput(_))));
    }
}
