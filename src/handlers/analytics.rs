use crate::error::AppError;
use crate::models::analytics::AnalysisResponse;
use crate::services::analytics::analyze_conversation;
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::get, Router};
use std::sync::Arc;

pub fn analytics_routes() -> Router {
    Router::new().route("/api/analyzeConversation", get(analyze))
}

async fn analyze(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<AnalysisResponse>, AppError> {
    tracing::info!(
        path = %state.conversation_log.path().display(),
        "Attempting to read conversation log"
    );

    let today = chrono::Local::now().date_naive();
    let analysis =
        analyze_conversation(&state.conversation_log, state.analytics_window, today).await?;

    tracing::info!(samples = analysis.weekly_data.len(), "Sentiment analysis completed successfully");
    Ok(Json(analysis))
}
