use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::ai::{self, AiTask, TRANSCRIBE_INSTRUCTION};
use crate::api::extract::AppJson;
use crate::api::middleware::AuthUser;
use crate::api::notes::note_not_found;
use crate::api::state::AppState;
use crate::api::upload::read_file_field;
use crate::db::NoteRepository;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct NoteAiRequest {
    pub action: String,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoteAiResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct AiProcessRequest {
    pub text: String,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct AiProcessResponse {
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl NoteAiRequest {
    /// `"summary"` summarises; every other action answers `query`
    pub fn task(self) -> Result<AiTask, AppError> {
        if self.action.trim().eq_ignore_ascii_case("summary") {
            return Ok(AiTask::Summarize { focus: None });
        }

        let question = non_blank(self.query)
            .ok_or_else(|| AppError::Validation("A question is required".to_string()))?;
        Ok(AiTask::Answer { question })
    }
}

impl AiProcessRequest {
    pub fn task(&self) -> Result<AiTask, AppError> {
        let instruction = non_blank(self.instruction.clone());

        match self.kind.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(AiTask::Summarize { focus: instruction }),
            "refine" => Ok(AiTask::Refine { instruction }),
            "query" => instruction
                .map(|instruction| AiTask::Query { instruction })
                .ok_or_else(|| AppError::Validation("An instruction is required".to_string())),
            other => Err(AppError::Validation(format!("Unknown processing type: {}", other))),
        }
    }
}

/// POST /api/notes/:id/ai (requires auth)
pub async fn note_ai(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(req): AppJson<NoteAiRequest>,
) -> Result<Json<NoteAiResponse>, AppError> {
    let note = NoteRepository::get_for_owner(&state.db, &id, &auth.user_id)
        .await?
        .ok_or_else(note_not_found)?;

    let task = req.task()?;
    let generator = state.ai()?;

    let response = ai::run(generator, &task, &note.content).await.map_err(|e| {
        tracing::error!(note_id = %note.id, "❌ AI {} failed: {}", task.kind(), e);
        e
    })?;

    Ok(Json(NoteAiResponse { response }))
}

/// POST /api/ai-process (requires auth)
pub async fn ai_process(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(req): AppJson<AiProcessRequest>,
) -> Result<Json<AiProcessResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".to_string()));
    }

    let task = req.task()?;
    let generator = state.ai()?;

    let result = ai::run(generator, &task, &req.text).await.map_err(|e| {
        tracing::error!(user_id = %auth.user_id, "❌ AI {} failed: {}", task.kind(), e);
        e
    })?;

    Ok(Json(AiProcessResponse { result }))
}

/// POST /api/upload-audio (requires auth, multipart field `audio`)
pub async fn upload_audio(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let upload = read_file_field(multipart, "audio", "audio/mpeg").await?;
    let generator = state.ai()?;

    tracing::info!(
        user_id = %auth.user_id,
        bytes = upload.bytes.len(),
        mime = %upload.mime_type,
        "🎙️ Transcribing audio"
    );

    let transcription = generator
        .transcribe(&upload.bytes, &upload.mime_type, TRANSCRIBE_INSTRUCTION)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %auth.user_id, "❌ Transcription failed: {}", e);
            e
        })?;

    Ok(Json(TranscriptionResponse { transcription }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(kind: &str, instruction: Option<&str>) -> AiProcessRequest {
        AiProcessRequest {
            text: "text".into(),
            instruction: instruction.map(str::to_string),
            kind: kind.into(),
        }
    }

    #[test]
    fn test_note_actions() {
        let summary = NoteAiRequest { action: "summary".into(), query: None };
        assert_eq!(summary.task().unwrap(), AiTask::Summarize { focus: None });

        let question = NoteAiRequest { action: "question".into(), query: Some("Why?".into()) };
        assert_eq!(question.task().unwrap(), AiTask::Answer { question: "Why?".into() });

        let missing = NoteAiRequest { action: "question".into(), query: Some("  ".into()) };
        assert!(matches!(missing.task(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_process_types() {
        assert_eq!(
            process("refine", None).task().unwrap(),
            AiTask::Refine { instruction: None }
        );
        assert_eq!(
            process("query", Some("List names")).task().unwrap(),
            AiTask::Query { instruction: "List names".into() }
        );
        assert!(matches!(process("query", None).task(), Err(AppError::Validation(_))));
        assert!(matches!(process("translate", None).task(), Err(AppError::Validation(_))));
    }
}
