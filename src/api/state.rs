use std::sync::Arc;
use sqlx::{Pool, Sqlite};
use crate::ai::TextGenerator;
use crate::config::Config;
use crate::crypto::TokenService;
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub tokens: Arc<TokenService>,
    /// `None` when no AI credential is configured
    pub ai: Option<Arc<dyn TextGenerator>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn ai(&self) -> Result<&dyn TextGenerator, AppError> {
        self.ai
            .as_deref()
            .ok_or_else(|| AppError::AiUnavailable("AI service is not configured".to_string()))
    }
}
