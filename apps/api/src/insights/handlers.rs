use axum::{extract::State, Json};
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppJson};
use crate::insights::models::{CareerInsightsResponse, UserProfile};
use crate::insights::prompts::{build_user_prompt, system_prompt};
use crate::interpret::{interpret_detailed, ParseMode};
use crate::state::AppState;

/// POST /career-insights
///
/// Sends the profile to the local model and returns its answer as a validated
/// `CareerInsightsResponse`. Unrecoverable model output is a 500 carrying the
/// interpreter's diagnostic.
pub async fn handle_career_insights(
    State(state): State<AppState>,
    AppJson(profile): AppJson<UserProfile>,
) -> Result<Json<CareerInsightsResponse>, AppError> {
    profile.validate().map_err(AppError::Validation)?;

    let user_prompt = build_user_prompt(&profile);
    let raw_output = state
        .llm
        .generate(&state.config.ollama_model, &system_prompt(), &user_prompt)
        .await?;

    debug!(chars = raw_output.len(), "Raw model output:\n{raw_output}");

    match interpret_detailed::<CareerInsightsResponse>(&raw_output) {
        Ok(interpreted) => {
            state.metrics.observe_interpretation(interpreted.mode.as_str());
            if interpreted.mode == ParseMode::Tolerant {
                warn!("Model output was not strict JSON; recovered with the tolerant parser");
            }
            info!(
                roles = interpreted.record.recommended_roles.len(),
                gaps = interpreted.record.skill_gaps.len(),
                "Career insights generated"
            );
            Ok(Json(interpreted.record))
        }
        Err(e) => {
            state.metrics.observe_interpretation(e.kind());
            Err(e.into())
        }
    }
}
