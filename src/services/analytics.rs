// src/services/analytics.rs
use crate::error::AppError;
use crate::models::analytics::{AnalysisResponse, SentimentSample};
use crate::services::conversation_log::{ConversationLog, LogEntry};
use crate::services::sentiment;
use chrono::{Duration, NaiveDate};

/// Scores the last `window` conversation entries and labels them with
/// consecutive weekday names ending at `today`.
///
/// The labels are positional: they do not come from the logged timestamps,
/// which are reported separately on each sample.
pub async fn analyze_conversation(
    log: &ConversationLog,
    window: usize,
    today: NaiveDate,
) -> Result<AnalysisResponse, AppError> {
    let entries = log.read_entries().await?;
    tracing::debug!(entries = entries.len(), window, "scoring conversation log");
    build_series(&entries, window, today)
}

pub fn build_series(
    entries: &[LogEntry],
    window: usize,
    today: NaiveDate,
) -> Result<AnalysisResponse, AppError> {
    let window = window.max(1);
    let recent = &entries[entries.len().saturating_sub(window)..];

    let last_index = recent.len().saturating_sub(1);
    let weekly_data: Vec<SentimentSample> = recent
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let day = today - Duration::days((last_index - i) as i64);
            let scores = sentiment::score(entry.scored_text());
            SentimentSample {
                date: day.format("%a").to_string(),
                sentiment: scores.sentiment,
                anxiety: scores.anxiety,
                depression: scores.depression,
                stress: scores.stress,
                timestamp: entry.timestamp(),
            }
        })
        .collect();

    let current = weekly_data
        .last()
        .cloned()
        .ok_or_else(|| AppError::EmptyInput("No conversation to analyze".to_string()))?;

    Ok(AnalysisResponse {
        sentiment: current.sentiment,
        anxiety: current.anxiety,
        depression: current.depression,
        stress: current.stress,
        weekly_data,
    })
}
