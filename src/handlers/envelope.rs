use serde::Serialize;
use utoipa::ToSchema;

/// Body of every cart API response, successful or not.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResponseEnvelope<T> {
    pub success: bool,
    pub message: String,
    pub result: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            message: String::new(),
            result: Some(result),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            result: None,
        }
    }
}
