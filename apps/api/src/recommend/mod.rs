//! Topic recommendation — builds the prompt, makes the one-shot completion
//! call, and extracts bullet lines from the free-form model output.

pub mod handlers;
pub mod prompts;

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::recommend::prompts::{RECOMMEND_PROMPT_TEMPLATE, RECOMMEND_SYSTEM};
use crate::settings::DEEPSEEK_API_KEY;
use crate::state::AppState;

/// Builds the deterministic recommendation prompt: every title becomes a
/// `- ` bullet inside the fixed template.
pub fn build_prompt(titles: &[String]) -> String {
    let titles_text = titles
        .iter()
        .map(|title| format!("- {title}"))
        .collect::<Vec<_>>()
        .join("\n");
    RECOMMEND_PROMPT_TEMPLATE.replace("{titles}", &titles_text)
}

/// Keeps only lines that, after trimming, begin with the bullet marker;
/// strips the marker and surrounding whitespace. Count is not enforced —
/// the model may return fewer than requested.
pub fn parse_recommendations(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix('-'))
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Runs the recommendation flow: key lookup → prompt → completion → parse.
pub async fn recommend_titles(
    state: &AppState,
    titles: &[String],
) -> Result<Vec<String>, AppError> {
    let api_key = state
        .store
        .get(DEEPSEEK_API_KEY)?
        .filter(|key| !key.trim().is_empty())
        .ok_or(AppError::MissingApiKey)?;

    let prompt = build_prompt(titles);
    let content = state
        .llm
        .chat(&api_key, RECOMMEND_SYSTEM, &prompt)
        .await
        .map_err(|e| match e {
            LlmError::Api { status, message } => {
                tracing::error!("DeepSeek call failed (status {status}): {message}");
                AppError::Upstream("AI 推荐失败".to_string())
            }
            LlmError::Http(e) => AppError::Internal(e.into()),
        })?;

    Ok(parse_recommendations(&content))
}
