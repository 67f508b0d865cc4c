pub mod gemini;

use async_trait::async_trait;

use crate::error::AppError;

pub use gemini::GeminiClient;

pub const TRANSCRIBE_INSTRUCTION: &str =
    "Transcribe this audio accurately. Return only the transcript text, without commentary.";

/// A text-generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a text prompt
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;

    /// Submit an audio buffer with an instruction and return the text reply
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, AppError>;
}

/// What to ask the model to do with a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiTask {
    Summarize { focus: Option<String> },
    Answer { question: String },
    Refine { instruction: Option<String> },
    Query { instruction: String },
}

impl AiTask {
    pub fn kind(&self) -> &'static str {
        match self {
            AiTask::Summarize { .. } => "summary",
            AiTask::Answer { .. } => "question",
            AiTask::Refine { .. } => "refine",
            AiTask::Query { .. } => "query",
        }
    }

    pub fn prompt(&self, text: &str) -> String {
        match self {
            AiTask::Summarize { focus } => {
                let mut prompt = String::from(
                    "Summarize the following note concisely, highlighting the key points and any action items.",
                );
                if let Some(focus) = focus {
                    prompt.push_str("\nAdditional instructions: ");
                    prompt.push_str(focus);
                }
                format!("{}\n\nNote:\n{}", prompt, text)
            }
            AiTask::Answer { question } => format!(
                "Answer the question using the note below as context.\n\nNote:\n{}\n\nQuestion: {}",
                text, question
            ),
            AiTask::Refine { instruction } => format!(
                "Refine the following transcript. {}\nReturn only the refined text.\n\nTranscript:\n{}",
                instruction
                    .as_deref()
                    .unwrap_or("Fix grammar and punctuation while preserving the meaning."),
                text
            ),
            AiTask::Query { instruction } => {
                format!("{}\n\nContext:\n{}", instruction, text)
            }
        }
    }
}

/// Run a task against the configured generator, returning the raw reply
pub async fn run(
    generator: &dyn TextGenerator,
    task: &AiTask,
    text: &str,
) -> Result<String, AppError> {
    tracing::debug!(kind = task.kind(), chars = text.len(), "AI request");
    generator.generate(&task.prompt(text)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_text() {
        let summary = AiTask::Summarize { focus: None }.prompt("hello world");
        assert!(summary.starts_with("Summarize"));
        assert!(summary.ends_with("hello world"));

        let answer = AiTask::Answer { question: "Who?".into() }.prompt("body");
        assert!(answer.contains("body"));
        assert!(answer.ends_with("Question: Who?"));
    }

    #[test]
    fn test_refine_default_instruction() {
        let prompt = AiTask::Refine { instruction: None }.prompt("raw");
        assert!(prompt.contains("Fix grammar"));

        let custom = AiTask::Refine { instruction: Some("Make it formal.".into()) }.prompt("raw");
        assert!(custom.contains("Make it formal."));
        assert!(!custom.contains("Fix grammar"));
    }

    #[test]
    fn test_summary_focus() {
        let prompt = AiTask::Summarize { focus: Some("bullet points".into()) }.prompt("x");
        assert!(prompt.contains("Additional instructions: bullet points"));
    }
}
