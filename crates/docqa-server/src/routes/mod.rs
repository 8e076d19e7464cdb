//! HTTP route handlers.

pub mod health;
pub mod workflow;

pub use health::{HealthResponse, health, health_routes};
pub use workflow::{
    QuestionForm, UPLOAD_FIELD, answer_handler, index_handler, reset_handler, upload_handler,
};
