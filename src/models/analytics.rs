use serde::{Deserialize, Serialize};

/// Scores for one piece of text, all on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub sentiment: f64,
    pub anxiety: f64,
    pub depression: f64,
    pub stress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    /// Short weekday label, e.g. "Mon".
    pub date: String,
    pub sentiment: f64,
    pub anxiety: f64,
    pub depression: f64,
    pub stress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub sentiment: f64,
    pub anxiety: f64,
    pub depression: f64,
    pub stress: f64,
    #[serde(rename = "weeklyData")]
    pub weekly_data: Vec<SentimentSample>,
}
